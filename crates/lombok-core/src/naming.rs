//! Identifier helpers shared by the tag interpreter and the synthesizer.

/// Uppercase the first letter of each `_`-separated segment and drop the
/// underscores: `user_name` becomes `UserName`, `id` becomes `Id`.
pub fn pascal_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    for part in name.split('_').filter(|part| !part.is_empty()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(chars.as_str());
        }
    }
    result
}

/// Identifier grammar accepted for generated names: `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_valid_ident(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() || first == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Pad `s` with spaces up to `width` characters
pub fn pad_right(s: &str, width: usize) -> String {
    format!("{s:<width$}")
}
