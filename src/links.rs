use percent_encoding::percent_decode_str;
use tracing::warn;

use crate::record::ContactRecord;

/// Parse a `mailto:` payload into a record carrying the address.
///
/// Query parameters (subject, body) are informational and dropped. Malformed
/// input yields an empty record rather than an error; the scorer will report
/// the miss as 0.5 confidence.
pub fn parse_mailto(raw: &str) -> ContactRecord {
    let mut record = ContactRecord::default();

    let rest = match strip_prefix_ci(raw, "mailto:") {
        Some(r) => r,
        None => return record,
    };
    let address = rest.split('?').next().unwrap_or("").trim();

    match percent_decode_str(address).decode_utf8() {
        Ok(decoded) if !decoded.is_empty() => record.email = decoded.into_owned(),
        Ok(_) => {}
        Err(e) => warn!("mailto address not valid UTF-8 after decoding: {}", e),
    }

    record
}

/// Parse a `tel:` payload. The cleaned number (digits plus `+ - space ()`)
/// lands in both `phone_number` and `mobile`.
pub fn parse_tel(raw: &str) -> ContactRecord {
    let mut record = ContactRecord::default();

    let rest = match strip_prefix_ci(raw, "tel:") {
        Some(r) => r,
        None => return record,
    };

    let cleaned = clean_phone(rest);

    if !cleaned.is_empty() {
        record.phone_number = cleaned.clone();
        record.mobile = cleaned;
    }

    record
}

/// Link-parser confidence: 1.0 when the target field came out non-empty,
/// 0.5 otherwise.
pub fn score_link(field_populated: bool) -> f64 {
    if field_populated {
        1.0
    } else {
        0.5
    }
}

/// Keep digits plus `+ - space ()`, drop everything else.
pub(crate) fn clean_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
        .collect::<String>()
        .trim()
        .to_string()
}

// `get` returns None on a non-char-boundary slice, so multibyte input in the
// prefix region cannot panic.
fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailto_with_query() {
        let r = parse_mailto("mailto:jane@acme.com?subject=Hi");
        assert_eq!(r.email, "jane@acme.com");
    }

    #[test]
    fn mailto_percent_decoded() {
        let r = parse_mailto("mailto:jane%2Bqr@acme.com");
        assert_eq!(r.email, "jane+qr@acme.com");
    }

    #[test]
    fn mailto_uppercase_prefix() {
        let r = parse_mailto("MAILTO:jane@acme.com");
        assert_eq!(r.email, "jane@acme.com");
    }

    #[test]
    fn mailto_empty_address() {
        let r = parse_mailto("mailto:?subject=Hi");
        assert!(r.email.is_empty());
        assert_eq!(score_link(!r.email.is_empty()), 0.5);
    }

    #[test]
    fn tel_keeps_formatting_chars() {
        let r = parse_tel("tel:+1 (415) 555-0100");
        assert_eq!(r.phone_number, "+1 (415) 555-0100");
        assert_eq!(r.mobile, r.phone_number);
    }

    #[test]
    fn tel_strips_junk() {
        let r = parse_tel("tel:+1.415.555.0100x2");
        assert_eq!(r.phone_number, "+141555501002");
    }

    #[test]
    fn multibyte_near_prefix_boundary_is_rejected_not_panicking() {
        // "é" straddles the byte index where the prefix would end.
        let r = parse_mailto("mailto\u{00e9}jane@acme.com");
        assert!(r.email.is_empty());
        let r = parse_tel("tel\u{00e9}+14155550100");
        assert!(r.phone_number.is_empty());
    }

    #[test]
    fn tel_empty() {
        let r = parse_tel("tel:");
        assert!(r.phone_number.is_empty());
    }
}
