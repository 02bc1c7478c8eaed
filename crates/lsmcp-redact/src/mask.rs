//! Value masking for display.

/// Longest run of asterisks placed between the kept characters.
const MAX_MASK: usize = 8;

/// Mask a secret value, keeping only its first and last character.
///
/// Values of two characters or fewer are returned unchanged. Lengths are
/// counted in characters, not bytes.
pub fn mask_value(value: &str) -> String {
    let count = value.chars().count();
    if count <= 2 {
        return value.to_string();
    }

    let mut chars = value.chars();
    let first = chars.next().unwrap_or_default();
    let last = chars.next_back().unwrap_or_default();
    let stars = (count - 2).min(MAX_MASK);

    let mut masked = String::with_capacity(stars + 8);
    masked.push(first);
    masked.push_str(&"*".repeat(stars));
    masked.push(last);
    masked
}
