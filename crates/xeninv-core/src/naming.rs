//! Group-name normalization and entry identity selection

/// Normalize a display label into a group-name token.
///
/// Lower-cases the label and turns each space and each hyphen into an
/// underscore. Total and deterministic; the empty label maps to the empty
/// token.
#[must_use]
pub fn clean_group_name(label: &str) -> String {
    label.to_lowercase().replace([' ', '-'], "_")
}

/// Choose the inventory key for an object.
///
/// The stable UUID is used by default; the human-readable label is used when
/// the per-object-type flag is off. Label keys are not deduplicated, so two
/// objects sharing a label collapse into one entry (last write wins).
#[must_use]
pub fn select_key<'a>(use_uuid: bool, uuid: &'a str, name_label: &'a str) -> &'a str {
    if use_uuid { uuid } else { name_label }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_group_name() {
        assert_eq!(clean_group_name("Pool A"), "pool_a");
        assert_eq!(clean_group_name("my-lab-pool"), "my_lab_pool");
        assert_eq!(clean_group_name("Mixed Case-Label 1"), "mixed_case_label_1");
        assert_eq!(clean_group_name(""), "");
    }

    #[test]
    fn test_clean_group_name_idempotent() {
        for label in ["Pool A", "a-b c", "already_clean", ""] {
            let once = clean_group_name(label);
            assert_eq!(clean_group_name(&once), once);
        }
    }

    #[test]
    fn test_clean_group_name_has_no_separators() {
        let token = clean_group_name("a b-c d-e");
        assert!(!token.contains(' '));
        assert!(!token.contains('-'));
    }

    #[test]
    fn test_select_key() {
        assert_eq!(select_key(true, "u1", "vm1"), "u1");
        assert_eq!(select_key(false, "u1", "vm1"), "vm1");
    }
}
