//! Limits for bounded field-path decoding.

/// Limits enforced while decoding one field-path chunk.
///
/// Decoders start [`unlimited`](Self::unlimited); the default cap is opt-in
/// for callers that want to reject oversized chunks early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum number of field paths a single chunk may produce.
    pub max_paths: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            // Well above the property count of any real entity class
            max_paths: 4096,
        }
    }
}

impl DecodeLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self { max_paths: 64 }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_paths: usize::MAX,
        }
    }
}
