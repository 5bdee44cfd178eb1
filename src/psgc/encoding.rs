//! Repair of double-encoded UTF-8 in PSGC payloads.
//!
//! Some upstream names arrive as UTF-8 bytes that were decoded as Latin-1
//! and re-encoded, so "Dasmariñas" shows up as "DasmariÃ±as".

use std::borrow::Cow;

use serde_json::Value as JsonValue;

/// Undoes one round of Latin-1 double encoding.
///
/// Only strings made entirely of chars up to U+00FF, with at least one at or
/// above U+0080, are candidates. Their chars are taken as bytes and decoded
/// as UTF-8; if that fails the input is returned unchanged.
///
/// # Examples
///
/// ```
/// use hris::psgc::fix_double_encoding;
///
/// assert_eq!(fix_double_encoding("DasmariÃ±as"), "Dasmariñas");
/// assert_eq!(fix_double_encoding("Dasmariñas"), "Dasmariñas");
/// assert_eq!(fix_double_encoding("Quezon City"), "Quezon City");
/// ```
pub fn fix_double_encoding(s: &str) -> Cow<'_, str> {
    let mut has_high = false;
    for c in s.chars() {
        match u32::from(c) {
            0x80..=0xFF => has_high = true,
            0x100.. => return Cow::Borrowed(s),
            _ => {}
        }
    }
    if !has_high {
        return Cow::Borrowed(s);
    }

    let bytes: Vec<u8> = s.chars().map(|c| u32::from(c) as u8).collect();
    match String::from_utf8(bytes) {
        Ok(fixed) => Cow::Owned(fixed),
        Err(_) => Cow::Borrowed(s),
    }
}

/// Applies [`fix_double_encoding`] to every string in a JSON value.
pub fn fix_json(value: &mut JsonValue) {
    match value {
        JsonValue::String(s) => {
            if let Cow::Owned(fixed) = fix_double_encoding(s) {
                *s = fixed;
            }
        }
        JsonValue::Array(items) => items.iter_mut().for_each(fix_json),
        JsonValue::Object(map) => map.values_mut().for_each(fix_json),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_double_encoded_enye_is_repaired() {
        assert_eq!(fix_double_encoding("ParaÃ±aque"), "Parañaque");
    }

    #[test]
    fn test_correct_latin_text_is_unchanged() {
        assert!(matches!(fix_double_encoding("Parañaque"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_chars_beyond_latin1_are_left_alone() {
        assert_eq!(fix_double_encoding("Ã± – dash"), "Ã± – dash");
    }

    #[test]
    fn test_ascii_is_borrowed() {
        assert!(matches!(fix_double_encoding("Makati"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_json_strings_fixed_recursively() {
        let mut value = json!([
            {"code": "042106000", "name": "City of DasmariÃ±as", "nested": {"alt": ["PeÃ±ablanca"]}},
            {"code": "137602000", "name": "City of Las PiÃ±as", "population": 606293}
        ]);

        fix_json(&mut value);

        assert_eq!(value[0]["name"], "City of Dasmariñas");
        assert_eq!(value[0]["nested"]["alt"][0], "Peñablanca");
        assert_eq!(value[1]["name"], "City of Las Piñas");
        assert_eq!(value[1]["population"], 606293);
    }
}
