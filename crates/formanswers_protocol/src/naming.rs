/// Longest file stem we hand to the download responder.
const MAX_STEM_LEN: usize = 100;

/// Returns true if the stem can be used as a file name without changes.
pub fn is_safe_file_stem(stem: &str) -> bool {
    !stem.is_empty()
        && stem.len() <= MAX_STEM_LEN
        && stem
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Reduce a user-supplied file name hint to a filesystem-safe stem.
///
/// Anything outside `[A-Za-z0-9_-]` becomes `_`, runs of `_` collapse, and
/// leading/trailing `_` are dropped. May return an empty string.
pub fn safe_file_stem(hint: &str) -> String {
    let hint = hint.trim();
    if is_safe_file_stem(hint) {
        return hint.to_string();
    }

    let mut stem = String::with_capacity(hint.len());
    let mut last_was_underscore = false;
    for ch in hint.chars() {
        let mapped = if ch.is_ascii_alphanumeric() || ch == '-' {
            ch
        } else {
            '_'
        };

        if mapped == '_' {
            if last_was_underscore {
                continue;
            }
            last_was_underscore = true;
        } else {
            last_was_underscore = false;
        }
        stem.push(mapped);
    }

    let stem = stem.trim_matches('_');
    stem.chars().take(MAX_STEM_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_stem_passthrough() {
        assert_eq!(safe_file_stem("contact_2024-05"), "contact_2024-05");
    }

    #[test]
    fn test_safe_stem_replaces_and_collapses() {
        assert_eq!(safe_file_stem("Anfragen März 2024.csv"), "Anfragen_M_rz_2024_csv");
        assert_eq!(safe_file_stem("  ///  "), "");
    }

    #[test]
    fn test_safe_stem_truncates() {
        let long = "a".repeat(300);
        assert_eq!(safe_file_stem(&long).len(), MAX_STEM_LEN);
    }
}
