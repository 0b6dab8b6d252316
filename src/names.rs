//! Corpus id to display-name mapping.

use std::collections::BTreeMap;
use std::path::Path;

use crate::util::{SigMatchError, SigMatchResult};

/// Name reported for ids missing from the index.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Read-only lookup from corpus item id (file name) to display name.
///
/// Entries iterate in id order, which fixes tie-breaking between equally
/// similar names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameIndex {
    names: BTreeMap<String, String>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a flat JSON object such as `{"signature_1.png": "Jane Doe"}`.
    pub fn from_json_str(text: &str) -> SigMatchResult<Self> {
        let names: BTreeMap<String, String> =
            serde_json::from_str(text).map_err(|err| SigMatchError::NameIndex {
                reason: err.to_string(),
            })?;
        Ok(Self { names })
    }

    /// Reads and parses a JSON mapping file.
    pub fn load<P: AsRef<Path>>(path: P) -> SigMatchResult<Self> {
        let text =
            std::fs::read_to_string(path.as_ref()).map_err(|err| SigMatchError::NameIndex {
                reason: format!("{}: {err}", path.as_ref().display()),
            })?;
        Self::from_json_str(&text)
    }

    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.names.insert(id.into(), name.into());
    }

    /// Resolves an id, falling back to [`UNKNOWN_NAME`].
    pub fn resolve(&self, id: &str) -> &str {
        self.names.get(id).map_or(UNKNOWN_NAME, String::as_str)
    }

    /// Iterates `(id, name)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NameIndex {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NameIndex, UNKNOWN_NAME};
    use crate::util::SigMatchError;

    #[test]
    fn parses_flat_json_and_resolves() {
        let index =
            NameIndex::from_json_str(r#"{"signature_2.png": "Ann Lee", "signature_1.png": "Bo Yu"}"#)
                .unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.resolve("signature_2.png"), "Ann Lee");
        assert_eq!(index.resolve("missing.png"), UNKNOWN_NAME);
        let ids: Vec<&str> = index.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, ["signature_1.png", "signature_2.png"]);
    }

    #[test]
    fn rejects_non_string_values() {
        let err = NameIndex::from_json_str(r#"{"a.png": 3}"#).unwrap_err();
        assert!(matches!(err, SigMatchError::NameIndex { .. }));
    }
}
