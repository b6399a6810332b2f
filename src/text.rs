use std::sync::LazyLock;

use regex::Regex;

use crate::record::ContactRecord;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.+-]+@[\w.-]+\.[A-Za-z]{2,}").unwrap());

// Ordered phone patterns: parenthesized area code, separated digit groups,
// bare international run. A match only counts if its digit count is 7–15.
static PHONE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\+?\d{0,3}[-.\s]?\(\d{2,4}\)[-.\s]?\d{3}[-.\s]?\d{2,4}(?:[-.\s]?\d{2,4})?")
            .unwrap(),
        Regex::new(r"\+?\d{1,4}(?:[-.\s]\d{2,4}){2,4}").unwrap(),
        Regex::new(r"\+?\d{7,15}").unwrap(),
    ]
});

static CODE_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:unique[\s_-]?code|entry[\s_-]?code|code)\s*[:=]\s*([A-Za-z0-9]{9,15})")
        .unwrap()
});
static CODE_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9]{9,15}").unwrap());
static DIGIT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{3}").unwrap());

/// Job-title keywords: a line carrying one of these reads as a position,
/// never as a company name.
pub const POSITION_KEYWORDS: &[&str] = &[
    "CEO", "CTO", "COO", "CFO", "Founder", "Co-Founder", "President", "Director", "Manager",
    "Engineer", "Developer", "Designer", "Consultant", "Analyst", "Head of", "Lead", "Partner",
    "Sales", "Marketing", "Officer",
];

// Legal-form suffixes that make a line read as a company.
const COMPANY_MARKERS: &[&str] = &[
    "Inc", "LLC", "Ltd", "GmbH", "AG", "S.A", "B.V", "Corp", "Co.", "Company", "Group", "Labs",
    "Studio", "Solutions",
];

/// First RFC-ish email address in the text.
pub fn find_email(text: &str) -> Option<String> {
    EMAIL_RE.find(text).map(|m| m.as_str().to_string())
}

/// First phone-looking candidate whose digit count lands in [7,15].
pub fn find_phone(text: &str) -> Option<String> {
    for re in PHONE_RES.iter() {
        for m in re.find_iter(text) {
            // A match clipped out of a longer digit run is not a phone number.
            let before = text[..m.start()].chars().next_back();
            let after = text[m.end()..].chars().next();
            if before.is_some_and(|c| c.is_ascii_digit())
                || after.is_some_and(|c| c.is_ascii_digit())
            {
                continue;
            }
            let digits = m.as_str().chars().filter(|c| c.is_ascii_digit()).count();
            if (7..=15).contains(&digits) {
                return Some(m.as_str().trim().to_string());
            }
        }
    }
    None
}

/// Entry-code extraction: explicit `code=` / `uniqueCode:` markers first,
/// then any standalone 9–15 char alphanumeric token that does not look like
/// a phone number or an email/URL fragment.
pub fn find_entry_code(text: &str) -> Option<String> {
    if let Some(caps) = CODE_MARKER_RE.captures(text) {
        return Some(caps[1].to_string());
    }

    for m in CODE_TOKEN_RE.find_iter(text) {
        if !is_standalone(text, m.start(), m.end()) {
            continue;
        }
        let token = m.as_str();
        let digits = token.chars().filter(|c| c.is_ascii_digit()).count();
        if digits == token.len() {
            continue; // purely numeric: likely a phone number
        }
        if digits > 10 {
            continue;
        }
        if near_marker(text, m.start(), m.end()) {
            continue; // email or URL fragment
        }
        return Some(token.to_string());
    }
    None
}

fn is_standalone(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(|c| c.is_ascii_alphanumeric())
        && !after.is_some_and(|c| c.is_ascii_alphanumeric())
}

/// True when `@`, `http` or `www` occurs within 10 characters of the token
/// span, in either direction.
fn near_marker(text: &str, start: usize, end: usize) -> bool {
    for marker in ["@", "http", "www"] {
        let mut from = 0;
        while let Some(pos) = text[from..].find(marker) {
            let pos = from + pos;
            let marker_end = pos + marker.len();
            if marker_end + 10 >= start && pos <= end + 10 {
                return true;
            }
            from = marker_end;
        }
    }
    false
}

/// Treat the first non-empty line as a name when it is short, has no `@`,
/// and no 3-digit run. Returns (first, remaining-as-last).
pub fn guess_name(text: &str) -> Option<(String, String)> {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    if line.len() >= 50 || line.contains('@') || DIGIT_RUN_RE.is_match(line) {
        return None;
    }
    let mut parts = line.split_whitespace();
    let first = parts.next()?.to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    Some((first, last))
}

/// Position validator: short, keyword-bearing, no contact markers and no
/// company legal-form suffix. Mirrors [`looks_like_company`] so a line can
/// satisfy at most one of the two.
pub fn looks_like_position(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || line.len() >= 60 {
        return false;
    }
    if line.contains('@') || line.contains("http") || DIGIT_RUN_RE.is_match(line) {
        return false;
    }
    if COMPANY_MARKERS.iter().any(|m| line.contains(m)) {
        return false;
    }
    let lower = line.to_lowercase();
    POSITION_KEYWORDS
        .iter()
        .any(|kw| lower.contains(&kw.to_lowercase()))
}

/// Company validator for line scanning: short, no contact markers, and either
/// a legal-form suffix or plain capitalized words. Rejects job-title lines.
pub fn looks_like_company(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || line.len() >= 60 {
        return false;
    }
    if line.contains('@') || line.contains("http") || DIGIT_RUN_RE.is_match(line) {
        return false;
    }
    if looks_like_position(line) {
        return false;
    }
    COMPANY_MARKERS.iter().any(|m| line.contains(m))
        || line
            .split_whitespace()
            .all(|w| w.chars().next().is_some_and(|c| c.is_uppercase()))
}

/// Deterministic extraction over free text: email + phone always, then
/// line-structure guesses for name, position and company, plus the entry
/// code. Also the fallback when the AI analyzer is skipped or comes back
/// empty.
pub fn heuristic_record(text: &str) -> (ContactRecord, Option<String>) {
    let mut record = ContactRecord::default();

    if let Some(email) = find_email(text) {
        record.email = email;
    }
    if let Some(phone) = find_phone(text) {
        record.phone_number = phone;
    }

    let mut name_line_idx = None;
    if let Some((first, last)) = guess_name(text) {
        name_line_idx = text
            .lines()
            .position(|l| !l.trim().is_empty());
        record.first_name = first;
        record.last_name = last;
    }

    // Scan the remaining lines for a position and a company guess.
    for (i, line) in text.lines().enumerate() {
        if Some(i) == name_line_idx {
            continue;
        }
        let line = line.trim();
        if record.position.is_empty() && looks_like_position(line) {
            record.position = line.to_string();
        } else if record.company.is_empty() && looks_like_company(line) {
            record.company = line.to_string();
        }
    }

    let entry_code = find_entry_code(text);
    (record, entry_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_first_match() {
        assert_eq!(
            find_email("reach me: jane@x.com or j.doe+qr@acme.io").as_deref(),
            Some("jane@x.com")
        );
        assert_eq!(find_email("no email here"), None);
    }

    #[test]
    fn phone_parenthesized() {
        assert_eq!(
            find_phone("call (415) 555-0100 today").as_deref(),
            Some("(415) 555-0100")
        );
    }

    #[test]
    fn phone_separated_groups() {
        assert_eq!(find_phone("+49 30 1234 5678").as_deref(), Some("+49 30 1234 5678"));
    }

    #[test]
    fn phone_bare_international() {
        assert_eq!(find_phone("+14155550100").as_deref(), Some("+14155550100"));
    }

    #[test]
    fn phone_digit_bounds() {
        assert_eq!(find_phone("123456"), None); // 6 digits, too short
        assert_eq!(find_phone("1234567890123456"), None); // 16 digits, too long
    }

    #[test]
    fn entry_code_keyed_marker() {
        assert_eq!(
            find_entry_code("your uniqueCode: AB12CD34EF").as_deref(),
            Some("AB12CD34EF")
        );
        assert_eq!(
            find_entry_code("code=XY98ZT12QQ5").as_deref(),
            Some("XY98ZT12QQ5")
        );
    }

    #[test]
    fn entry_code_standalone_token() {
        assert_eq!(
            find_entry_code("Jane Smith\nAB12CD34EF\n").as_deref(),
            Some("AB12CD34EF")
        );
    }

    #[test]
    fn entry_code_rejects_numeric_and_fragments() {
        assert_eq!(find_entry_code("4155550100123"), None); // purely numeric
        assert_eq!(find_entry_code("jane@AB12CD34EF.com"), None); // near @
        assert_eq!(find_entry_code("http://x.co/AB12CD34EF"), None); // near http
    }

    #[test]
    fn name_guess_rules() {
        assert_eq!(
            guess_name("Jane Smith\njane@x.com"),
            Some(("Jane".into(), "Smith".into()))
        );
        assert_eq!(guess_name("jane@x.com\nJane"), None); // @ in first line
        assert_eq!(guess_name("Call 415 555 0100"), None); // digit run
        assert_eq!(guess_name(&"x".repeat(60)), None); // too long
    }

    #[test]
    fn position_and_company_validators() {
        assert!(looks_like_position("Chief Marketing Officer"));
        assert!(looks_like_position("Senior Engineer"));
        assert!(!looks_like_position("Acme GmbH"));
        assert!(looks_like_company("Acme GmbH"));
        assert!(looks_like_company("Blue River Labs"));
        assert!(!looks_like_company("Sales Director")); // title keyword
        assert!(!looks_like_company("jane@x.com"));
    }

    #[test]
    fn position_validator_rejects_contact_and_company_lines() {
        assert!(!looks_like_position("sales@acme.com"));
        assert!(!looks_like_position("https://sales.example.com"));
        assert!(!looks_like_position("Sales desk 415 555 0100"));
        // Legal-form suffix wins over the title keyword.
        assert!(!looks_like_position("Sales Solutions Inc"));
        assert!(looks_like_company("Sales Solutions Inc"));

        let (r, _) = heuristic_record("Jane Smith\nsales@acme.com");
        assert!(r.position.is_empty());
        assert_eq!(r.email, "sales@acme.com");
    }

    #[test]
    fn heuristic_record_assembles_fields() {
        let (r, code) = heuristic_record("Jane Smith\nSales Director\nAcme Inc\njane@x.com\n+14155550100");
        assert_eq!(r.first_name, "Jane");
        assert_eq!(r.last_name, "Smith");
        assert_eq!(r.position, "Sales Director");
        assert_eq!(r.company, "Acme Inc");
        assert_eq!(r.email, "jane@x.com");
        assert_eq!(r.phone_number, "+14155550100");
        assert_eq!(code, None);
    }
}
