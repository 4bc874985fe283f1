//! User name normalization for case-insensitive lookups

/// Produces the lookup key stored as a user's normalized name.
///
/// Implementations must be idempotent: normalizing an already normalized name returns it
/// unchanged, so callers may normalize lookup arguments unconditionally.
pub trait LookupNormalizer: Send + Sync + 'static {
    fn normalize_name(&self, name: &str) -> String;
}

/// Trims surrounding whitespace and upper-cases the name.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpperInvariantNormalizer;

impl LookupNormalizer for UpperInvariantNormalizer {
    fn normalize_name(&self, name: &str) -> String {
        name.trim().to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_invariant_normalizer() {
        let normalizer = UpperInvariantNormalizer;
        assert_eq!(normalizer.normalize_name("alice"), "ALICE");
        assert_eq!(normalizer.normalize_name("  Alice "), "ALICE");
        assert_eq!(normalizer.normalize_name("straße"), "STRASSE");
    }

    #[test]
    fn test_normalizer_is_idempotent() {
        let normalizer = UpperInvariantNormalizer;
        let once = normalizer.normalize_name("Mixed Case");
        assert_eq!(normalizer.normalize_name(&once), once);
    }
}
