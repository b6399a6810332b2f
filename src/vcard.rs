use crate::error::ExtractError;
use crate::record::ContactRecord;
use crate::text;

/// Parse a `BEGIN:VCARD...END:VCARD` payload into the canonical record plus
/// an optional entry code mined from the NOTE field (or, failing that, the
/// raw card text).
///
/// Malformed cards are a hard failure for this branch: the caller surfaces
/// the error as `success: false` instead of a partial record.
pub fn parse_vcard(raw: &str) -> Result<(ContactRecord, Option<String>), ExtractError> {
    let lines = unfold_lines(raw);

    let begin = lines.iter().position(|l| property_name(l) == "BEGIN");
    let end = lines.iter().position(|l| property_name(l) == "END");
    match (begin, end) {
        (Some(b), Some(e)) if b < e => {}
        _ => return Err(ExtractError::Vcard("missing BEGIN/END markers".into())),
    }

    let mut record = ContactRecord::default();
    let mut formatted_name = String::new();
    let mut structured_name: Option<Vec<String>> = None;
    let mut note = String::new();
    let mut properties = 0usize;

    for line in &lines {
        let Some((key, value)) = split_property(line) else {
            continue;
        };
        let (name, params) = split_params(&key);
        let value = unescape(value.trim());
        if value.is_empty() {
            continue;
        }

        match name.as_str() {
            "BEGIN" | "END" | "VERSION" => continue,
            "FN" => formatted_name = value,
            "N" => {
                structured_name = Some(
                    value
                        .split(';')
                        .map(|c| c.trim().to_string())
                        .collect::<Vec<_>>(),
                )
            }
            "ORG" => {
                let mut units = value.split(';').map(str::trim);
                record.company = units.next().unwrap_or("").to_string();
                if let Some(dept) = units.next() {
                    record.department = dept.to_string();
                }
            }
            "TITLE" => record.position = value,
            "EMAIL" => {
                if record.email.is_empty() {
                    record.email = value;
                }
            }
            "TEL" => {
                let is_cell = params.iter().any(|p| p.contains("CELL") || p.contains("MOBILE"));
                if is_cell && record.mobile.is_empty() {
                    record.mobile = value.clone();
                }
                if record.phone_number.is_empty() {
                    record.phone_number = value;
                }
            }
            "URL" => {
                if record.website.is_empty() {
                    record.website = value;
                }
            }
            "ADR" => {
                // po box; extended; street; locality; region; postal; country
                let parts: Vec<&str> = value.split(';').map(str::trim).collect();
                let get = |i: usize| parts.get(i).copied().unwrap_or("").to_string();
                record.address = get(2);
                record.city = get(3);
                record.zipcode = get(5);
                record.country = get(6);
            }
            "NOTE" => note = value,
            _ => {
                properties += 1; // unknown but well-formed property
                continue;
            }
        }
        properties += 1;
    }

    if properties == 0 {
        return Err(ExtractError::Vcard("no parsable properties".into()));
    }

    apply_name(&mut record, structured_name, &formatted_name);

    // Only this branch mines a note/comment field for the secondary code.
    let entry_code = if note.is_empty() {
        text::find_entry_code(raw)
    } else {
        text::find_entry_code(&note).or_else(|| text::find_entry_code(raw))
    };

    Ok((record, entry_code))
}

/// Structured `N` components take precedence over the formatted `FN` when
/// both are present.
fn apply_name(record: &mut ContactRecord, structured: Option<Vec<String>>, formatted: &str) {
    if let Some(parts) = structured {
        let family = parts.first().cloned().unwrap_or_default();
        let given = parts.get(1).cloned().unwrap_or_default();
        let prefix = parts.get(3).cloned().unwrap_or_default();
        if !given.is_empty() || !family.is_empty() {
            record.first_name = given;
            record.last_name = family;
            record.title = prefix;
            return;
        }
    }
    if !formatted.is_empty() {
        let mut words = formatted.split_whitespace();
        record.first_name = words.next().unwrap_or("").to_string();
        record.last_name = words.collect::<Vec<_>>().join(" ");
    }
}

/// Join folded continuation lines (RFC 6350: a line starting with space or
/// tab continues the previous one).
fn unfold_lines(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for line in raw.lines() {
        if let Some(cont) = line.strip_prefix(' ').or_else(|| line.strip_prefix('\t')) {
            if let Some(prev) = out.last_mut() {
                prev.push_str(cont);
                continue;
            }
        }
        let trimmed = line.trim_end_matches('\r');
        if !trimmed.trim().is_empty() {
            out.push(trimmed.to_string());
        }
    }
    out
}

fn split_property(line: &str) -> Option<(String, &str)> {
    let idx = line.find(':')?;
    Some((line[..idx].to_uppercase(), &line[idx + 1..]))
}

fn property_name(line: &str) -> String {
    split_property(line)
        .map(|(key, _)| split_params(&key).0)
        .unwrap_or_default()
}

fn split_params(key: &str) -> (String, Vec<String>) {
    let mut parts = key.split(';');
    let name = parts.next().unwrap_or("").trim().to_string();
    let params = parts.map(|p| p.trim().to_uppercase()).collect();
    (name, params)
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') | Some('N') => out.push('\n'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}
