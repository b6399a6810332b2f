use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::debug;

use crate::links;
use crate::record::ContactRecord;
use crate::text;

use super::vendor;

/// One partial record per extraction source, in priority order. Merging is a
/// single fill-if-empty pass, so the first source to produce a field wins.
#[derive(Debug)]
enum PageSource {
    JsonLd(ContactRecord),
    VendorJson(ContactRecord),
    Selectors(ContactRecord),
    VisibleText(ContactRecord),
}

impl PageSource {
    fn label(&self) -> &'static str {
        match self {
            PageSource::JsonLd(_) => "json-ld",
            PageSource::VendorJson(_) => "vendor-json",
            PageSource::Selectors(_) => "selectors",
            PageSource::VisibleText(_) => "visible-text",
        }
    }

    fn record(&self) -> &ContactRecord {
        match self {
            PageSource::JsonLd(r)
            | PageSource::VendorJson(r)
            | PageSource::Selectors(r)
            | PageSource::VisibleText(r) => r,
        }
    }
}

/// Extract a contact record from page HTML. Pure; the browser strategy calls
/// this on rendered content, the direct-fetch fallback on raw content.
pub fn extract_from_html(html: &str, url: &str) -> ContactRecord {
    let doc = Html::parse_document(html);

    let mut sources = Vec::new();
    if let Some(r) = json_ld_person(&doc) {
        sources.push(PageSource::JsonLd(r));
    }
    if let Some(value) = vendor::find_vendor_json(html) {
        sources.push(PageSource::VendorJson(vendor::map_vendor_profile(&value)));
    }
    let selectors = selector_fields(&doc);
    if !selectors.is_empty() {
        sources.push(PageSource::Selectors(selectors));
    }
    let (fallback, _) = text::heuristic_record(&visible_text(&doc));
    if !fallback.is_empty() {
        sources.push(PageSource::VisibleText(fallback));
    }

    let mut record = ContactRecord::default();
    for source in &sources {
        debug!(
            "page source '{}' contributed {} fields",
            source.label(),
            source.record().populated_fields()
        );
        record.fill_missing_from(source.record());
    }

    if record.website.is_empty() {
        record.website = url.to_string();
    }
    record
}

static JSON_LD_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

/// JSON-LD `Person` structured data, including `@graph`-wrapped and
/// array-valued documents.
fn json_ld_person(doc: &Html) -> Option<ContactRecord> {
    for script in doc.select(&JSON_LD_SEL) {
        let raw = script.text().collect::<String>();
        let Ok(value) = serde_json::from_str::<Value>(raw.trim()) else {
            continue;
        };
        if let Some(person) = find_person(&value) {
            return Some(map_person(person));
        }
    }
    None
}

fn find_person(value: &Value) -> Option<&Value> {
    if is_person(value) {
        return Some(value);
    }
    let candidates = value
        .as_array()
        .map(|a| a.iter().collect::<Vec<_>>())
        .or_else(|| {
            value
                .get("@graph")
                .and_then(|g| g.as_array())
                .map(|a| a.iter().collect())
        })?;
    candidates.into_iter().find(|v| is_person(v))
}

fn is_person(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(s)) => s == "Person",
        Some(Value::Array(arr)) => arr.iter().any(|v| v.as_str() == Some("Person")),
        _ => false,
    }
}

fn map_person(person: &Value) -> ContactRecord {
    let mut record = ContactRecord::default();

    let given = str_field(person, "givenName");
    let family = str_field(person, "familyName");
    if !given.is_empty() || !family.is_empty() {
        record.first_name = given;
        record.last_name = family;
    } else {
        let name = str_field(person, "name");
        let mut words = name.split_whitespace();
        record.first_name = words.next().unwrap_or("").to_string();
        record.last_name = words.collect::<Vec<_>>().join(" ");
    }

    record.title = str_field(person, "honorificPrefix");
    record.position = str_field(person, "jobTitle");
    record.email = str_field(person, "email")
        .trim_start_matches("mailto:")
        .to_string();
    record.phone_number = str_field(person, "telephone");
    record.website = str_field(person, "url");

    // worksFor is either an Organization object or a bare string.
    if let Some(works_for) = person.get("worksFor") {
        record.company = works_for
            .as_str()
            .map(str::to_string)
            .or_else(|| works_for.get("name").and_then(|n| n.as_str()).map(str::to_string))
            .unwrap_or_default();
    }

    if let Some(address) = person.get("address") {
        record.address = str_field(address, "streetAddress");
        record.city = str_field(address, "addressLocality");
        record.zipcode = str_field(address, "postalCode");
        record.country = address
            .get("addressCountry")
            .map(|c| {
                c.as_str()
                    .map(str::to_string)
                    .or_else(|| c.get("name").and_then(|n| n.as_str()).map(str::to_string))
                    .unwrap_or_default()
            })
            .unwrap_or_default();
    }

    record
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .unwrap_or("")
        .to_string()
}

static NAME_SELS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"[itemprop="name"]"#,
        ".vcard .fn",
        ".profile-name",
        ".contact-name",
        "h1",
    ])
});
static MAILTO_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href^="mailto:"]"#).unwrap());
static EMAIL_SELS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&[r#"[itemprop="email"]"#, ".email"]));
static TEL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href^="tel:"]"#).unwrap());
static PHONE_SELS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&[r#"[itemprop="telephone"]"#, ".phone", ".tel"]));
static COMPANY_SELS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"[itemprop="worksFor"]"#,
        r#"[itemprop="affiliation"]"#,
        ".company",
        ".org",
        ".organization",
    ])
});
static POSITION_SELS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[r#"[itemprop="jobTitle"]"#, ".job-title", ".position", ".role"])
});
static ADDRESS_SELS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[r#"[itemprop="streetAddress"]"#, ".street-address", ".address"])
});
static CITY_SELS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&[r#"[itemprop="addressLocality"]"#, ".locality"]));
static COUNTRY_SELS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&[r#"[itemprop="addressCountry"]"#, ".country-name"]));

fn selectors(sources: &[&str]) -> Vec<Selector> {
    sources.iter().map(|s| Selector::parse(s).unwrap()).collect()
}

/// Common CSS/microdata selectors, first non-empty match per field.
fn selector_fields(doc: &Html) -> ContactRecord {
    let mut record = ContactRecord::default();

    if let Some(name) = first_text(doc, &NAME_SELS) {
        if let Some((first, last)) = text::guess_name(&name) {
            record.first_name = first;
            record.last_name = last;
        }
    }

    if let Some(href) = first_href(doc, &MAILTO_SEL) {
        record.email = href
            .trim_start_matches("mailto:")
            .split('?')
            .next()
            .unwrap_or("")
            .to_string();
    } else if let Some(email) = first_text(doc, &EMAIL_SELS).as_deref().and_then(text::find_email)
    {
        record.email = email;
    }

    if let Some(href) = first_href(doc, &TEL_SEL) {
        record.phone_number = links::clean_phone(href.trim_start_matches("tel:"));
    } else if let Some(phone) = first_text(doc, &PHONE_SELS).as_deref().and_then(text::find_phone)
    {
        record.phone_number = phone;
    }

    if let Some(company) = first_text(doc, &COMPANY_SELS) {
        record.company = company;
    }
    if let Some(position) = first_text(doc, &POSITION_SELS) {
        record.position = position;
    }
    if let Some(address) = first_text(doc, &ADDRESS_SELS) {
        record.address = address;
    }
    if let Some(city) = first_text(doc, &CITY_SELS) {
        record.city = city;
    }
    if let Some(country) = first_text(doc, &COUNTRY_SELS) {
        record.country = country;
    }

    record
}

fn first_text(doc: &Html, sels: &[Selector]) -> Option<String> {
    for sel in sels {
        for el in doc.select(sel) {
            let text = collapse_whitespace(&el.text().collect::<String>());
            if !text.is_empty() && text.len() < 120 {
                return Some(text);
            }
        }
    }
    None
}

fn first_href<'a>(doc: &'a Html, sel: &Selector) -> Option<&'a str> {
    doc.select(sel).find_map(|el| el.value().attr("href"))
}

/// Flatten visible text, one line per text node, skipping script/style/head
/// subtrees. The result feeds the same line-position heuristics as the
/// plain-text branch.
fn visible_text(doc: &Html) -> String {
    let mut lines = Vec::new();
    collect_text(doc.root_element(), &mut lines);
    lines.join("\n")
}

fn collect_text(el: ElementRef, lines: &mut Vec<String>) {
    if matches!(
        el.value().name(),
        "script" | "style" | "noscript" | "template" | "head" | "title"
    ) {
        return;
    }
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            let line = collapse_whitespace(text);
            if !line.is_empty() {
                lines.push(line);
            }
        } else if let Some(child_el) = ElementRef::wrap(child) {
            collect_text(child_el, lines);
        }
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
