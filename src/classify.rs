use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::record::PayloadKind;

static ENTRY_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Tag a trimmed payload with exactly one [`PayloadKind`].
///
/// Rules run in a fixed priority order. The entry-code test runs first: a
/// short alphanumeric token must be captured before any URL or email
/// heuristic gets a chance to misread it as a domain-less identifier.
pub fn classify(input: &str) -> PayloadKind {
    if is_entry_code(input) {
        return PayloadKind::EntryCode;
    }

    let lower = input.to_lowercase();
    if lower.starts_with("mailto:") {
        return PayloadKind::Mailto;
    }
    if lower.starts_with("tel:") {
        return PayloadKind::Tel;
    }

    if let Ok(url) = Url::parse(input) {
        if matches!(url.scheme(), "http" | "https") {
            return PayloadKind::Url;
        }
    }

    if input.starts_with("BEGIN:VCARD") && input.contains("END:VCARD") {
        return PayloadKind::Vcard;
    }

    PayloadKind::Plaintext
}

/// Length 3–30, `[A-Za-z0-9_-]` only, none of `.` `@` `/`.
pub fn is_entry_code(input: &str) -> bool {
    (3..=30).contains(&input.len())
        && ENTRY_CODE_RE.is_match(input)
        && !input.contains(['.', '@', '/'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_code_range() {
        assert_eq!(classify("ABC123"), PayloadKind::EntryCode);
        assert_eq!(classify("abc"), PayloadKind::EntryCode);
        assert_eq!(classify("a_b-c9"), PayloadKind::EntryCode);
        assert_eq!(classify(&"x".repeat(30)), PayloadKind::EntryCode);
    }

    #[test]
    fn entry_code_bounds() {
        assert_eq!(classify("ab"), PayloadKind::Plaintext);
        assert_eq!(classify(&"x".repeat(31)), PayloadKind::Plaintext);
        assert_eq!(classify("has space"), PayloadKind::Plaintext);
        assert_eq!(classify("dot.ted"), PayloadKind::Plaintext);
    }

    #[test]
    fn entry_code_wins_over_url_lookalikes() {
        // No dot, no scheme: stays an entry code even though it could pass
        // for a hostname fragment.
        assert_eq!(classify("localhost8080"), PayloadKind::EntryCode);
    }

    #[test]
    fn mailto_and_tel_case_insensitive() {
        assert_eq!(classify("mailto:jane@acme.com"), PayloadKind::Mailto);
        assert_eq!(classify("MAILTO:jane@acme.com"), PayloadKind::Mailto);
        assert_eq!(classify("tel:+14155550100"), PayloadKind::Tel);
        assert_eq!(classify("TEL:+14155550100"), PayloadKind::Tel);
    }

    #[test]
    fn http_urls() {
        assert_eq!(classify("https://example.com/card/123"), PayloadKind::Url);
        assert_eq!(classify("http://example.com"), PayloadKind::Url);
        // Other schemes fall through to plaintext.
        assert_eq!(classify("ftp://example.com/file"), PayloadKind::Plaintext);
    }

    #[test]
    fn vcard_markers() {
        let card = "BEGIN:VCARD\nVERSION:3.0\nFN:Jane\nEND:VCARD";
        assert_eq!(classify(card), PayloadKind::Vcard);
        // Missing END: not a card.
        assert_eq!(
            classify("BEGIN:VCARD\nFN:Jane"),
            PayloadKind::Plaintext
        );
    }

    #[test]
    fn fallback_plaintext() {
        assert_eq!(classify("Jane Smith\njane@x.com"), PayloadKind::Plaintext);
    }
}
