//! Quality gate deciding whether a signature carries enough signal to compare.

use crate::keypoint::{DescriptorSet, MIN_DESCRIPTORS_EXCLUSIVE};
use crate::normalize::NormalizedSignature;

/// Ink samples a normalized canvas needs before it is considered matchable.
pub const MIN_INK_EXCLUSIVE: usize = 300;

/// Pluggable acceptance policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QualityPolicy {
    /// Accept iff the keypoint descriptor set has more than `min_exclusive` vectors.
    DescriptorCount { min_exclusive: usize },
    /// Accept iff the normalized canvas has more than `min_exclusive` ink samples.
    InkDensity { min_exclusive: usize },
}

impl QualityPolicy {
    pub const fn descriptor_count() -> Self {
        Self::DescriptorCount {
            min_exclusive: MIN_DESCRIPTORS_EXCLUSIVE,
        }
    }

    pub const fn ink_density() -> Self {
        Self::InkDensity {
            min_exclusive: MIN_INK_EXCLUSIVE,
        }
    }

    fn min_exclusive(&self) -> usize {
        match *self {
            Self::DescriptorCount { min_exclusive } | Self::InkDensity { min_exclusive } => {
                min_exclusive
            }
        }
    }

    /// Judges an already-measured signal against this policy's threshold.
    pub fn judge(&self, measured: usize) -> QualityVerdict {
        QualityVerdict {
            policy: *self,
            measured,
            passed: measured > self.min_exclusive(),
        }
    }

    /// Judges a normalized canvas by its ink count.
    pub fn judge_ink(&self, normalized: &NormalizedSignature) -> QualityVerdict {
        self.judge(normalized.ink_count())
    }

    /// Judges a descriptor set by its size.
    pub fn judge_descriptors(&self, descriptors: &DescriptorSet) -> QualityVerdict {
        self.judge(descriptors.len())
    }
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self::ink_density()
    }
}

/// Outcome of the quality gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QualityVerdict {
    pub policy: QualityPolicy,
    /// Ink samples or descriptor count, depending on the policy.
    pub measured: usize,
    pub passed: bool,
}

impl QualityVerdict {
    /// Human-readable reason for a rejection.
    pub fn reason(&self) -> String {
        match self.policy {
            QualityPolicy::DescriptorCount { min_exclusive } => format!(
                "low quality signature: {} keypoint descriptors, need more than {min_exclusive}",
                self.measured
            ),
            QualityPolicy::InkDensity { min_exclusive } => format!(
                "low quality signature: {} ink samples, need more than {min_exclusive}",
                self.measured
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::QualityPolicy;

    #[test]
    fn thresholds_are_exclusive() {
        let ink = QualityPolicy::ink_density();
        assert!(!ink.judge(300).passed);
        assert!(ink.judge(301).passed);

        let desc = QualityPolicy::descriptor_count();
        assert!(!desc.judge(20).passed);
        assert!(desc.judge(21).passed);
        assert!(desc.judge(3).reason().contains("3 keypoint descriptors"));
    }
}
