//! Name matching used as a low-assurance identity check.

/// Collapses whitespace and capitalizes each word ("nguyen  VAN a" -> "Nguyen Van A").
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// True when both names normalize to the same non-empty string.
pub fn names_match(stored: &str, claimed: &str) -> bool {
    let claimed = normalize_name(claimed);
    !claimed.is_empty() && normalize_name(stored) == claimed
}
