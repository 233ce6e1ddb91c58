//! Excel `_xHHHH_` escape sequences

/// Decode Excel's `_xHHHH_` escapes (e.g. `_x000d_` for CR, `_x005f_` for `_`).
///
/// Anything that is not a complete escape is kept as written.
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("_x") {
        result.push_str(&rest[..start]);
        let candidate = &rest[start..];

        match decode_one(candidate) {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push('_');
                rest = &candidate[1..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// Decode a single escape at the start of `s` (`_x` + 4 hex digits + `_`)
fn decode_one(s: &str) -> Option<char> {
    let bytes = s.as_bytes();
    if bytes.len() < 7 || bytes[6] != b'_' {
        return None;
    }
    let hex = &s[2..6];
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_control_characters() {
        assert_eq!(decode_excel_escapes("hello_x000d_world"), "hello\rworld");
        assert_eq!(decode_excel_escapes("hello_x000A_world"), "hello\nworld");
        assert_eq!(decode_excel_escapes("col1_x0009_col2"), "col1\tcol2");
        assert_eq!(
            decode_excel_escapes("line1_x000d__x000a_line2"),
            "line1\r\nline2"
        );
    }

    #[test]
    fn test_decode_escaped_underscore() {
        assert_eq!(decode_excel_escapes("under_x005f_score"), "under_score");
    }

    #[test]
    fn test_incomplete_sequences_kept() {
        assert_eq!(decode_excel_escapes("plain text"), "plain text");
        assert_eq!(decode_excel_escapes("_x00"), "_x00");
        assert_eq!(decode_excel_escapes("_x000d"), "_x000d");
        assert_eq!(decode_excel_escapes("_xZZZZ_"), "_xZZZZ_");
        assert_eq!(decode_excel_escapes("a__x0041_"), "a_A");
    }

    #[test]
    fn test_multibyte_text_around_escape() {
        assert_eq!(decode_excel_escapes("é_x0020_ü"), "é ü");
        assert_eq!(decode_excel_escapes("_xé"), "_xé");
    }
}
