//! Ordered collection of known signatures.
//!
//! The corpus is passed into the matcher explicitly; its enumeration order is
//! the tie-break order of the ranking. Items keep their derived features
//! cached, so one corpus serves many queries.

use crate::image::RasterImage;
use crate::signature::Signature;

/// One known signature and its identifier (typically the file name).
#[derive(Debug)]
pub struct CorpusItem {
    id: String,
    signature: Signature,
}

impl CorpusItem {
    pub fn new(id: impl Into<String>, signature: Signature) -> Self {
        Self {
            id: id.into(),
            signature,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

/// A file that could not be turned into a corpus item.
#[derive(Clone, Debug, PartialEq)]
pub struct UnreadableItem {
    pub id: String,
    pub reason: String,
}

/// Ordered corpus handle.
#[derive(Debug, Default)]
pub struct Corpus {
    items: Vec<CorpusItem>,
    unreadable: Vec<UnreadableItem>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item; enumeration order is insertion order.
    pub fn push(&mut self, id: impl Into<String>, image: RasterImage) {
        self.items.push(CorpusItem::new(id, Signature::new(image)));
    }

    /// Appends an already prepared item.
    pub fn push_item(&mut self, item: CorpusItem) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[CorpusItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Files skipped while loading.
    pub fn unreadable(&self) -> &[UnreadableItem] {
        &self.unreadable
    }

    /// Drops all cached features, e.g. after changing the feature config.
    pub fn reset_caches(&mut self) {
        for item in &mut self.items {
            item.signature.reset();
        }
    }
}

impl<S: Into<String>> FromIterator<(S, RasterImage)> for Corpus {
    fn from_iter<I: IntoIterator<Item = (S, RasterImage)>>(iter: I) -> Self {
        let mut corpus = Corpus::new();
        for (id, image) in iter {
            corpus.push(id, image);
        }
        corpus
    }
}

#[cfg(feature = "image-io")]
mod load {
    use super::{Corpus, UnreadableItem};
    use crate::image::io::load_gray_image;
    use crate::trace::{trace_event, trace_warn};
    use crate::util::{SigMatchError, SigMatchResult};
    use std::path::Path;

    const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

    impl Corpus {
        /// Loads every PNG/JPEG file of a directory, sorted by file name.
        ///
        /// Files that fail to decode are recorded in [`Corpus::unreadable`]
        /// and do not abort loading.
        pub fn load_dir<P: AsRef<Path>>(dir: P) -> SigMatchResult<Self> {
            let dir = dir.as_ref();
            let entries = std::fs::read_dir(dir).map_err(|err| SigMatchError::ImageIo {
                reason: format!("{}: {err}", dir.display()),
            })?;

            let mut paths: Vec<_> = entries
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| {
                    path.is_file()
                        && path
                            .extension()
                            .and_then(|ext| ext.to_str())
                            .is_some_and(|ext| {
                                IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
                            })
                })
                .collect();
            paths.sort();

            let mut corpus = Corpus::new();
            for path in paths {
                let id = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                match load_gray_image(&path) {
                    Ok(image) => corpus.push(id, image),
                    Err(err) => {
                        let reason = err.to_string();
                        trace_warn!("corpus_item_unreadable", id = id.as_str(), reason = reason.as_str());
                        corpus.unreadable.push(UnreadableItem { id, reason });
                    }
                }
            }
            trace_event!(
                "corpus_loaded",
                items = corpus.len(),
                unreadable = corpus.unreadable.len()
            );
            Ok(corpus)
        }
    }
}
