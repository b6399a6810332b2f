use serde_json::Value;

use crate::record::ContactRecord;
use crate::util::first_json_block;

/// Script-variable marker the card vendor embeds its profile data under.
/// Present in server-rendered pages; client-rendered pages inject the same
/// variable after hydration, so the browser strategy checks again.
pub const VENDOR_MARKER: &str = "window.__CARD_DATA__";

/// Locate the vendor payload in raw HTML: the marker, then the first
/// balanced JSON object after it.
pub fn find_vendor_json(html: &str) -> Option<Value> {
    let at = html.find(VENDOR_MARKER)?;
    let tail = &html[at + VENDOR_MARKER.len()..];
    let block = first_json_block(tail)?;
    serde_json::from_str(block).ok()
}

/// Map the vendor profile shape onto the canonical record: profile
/// name/company/title, contact shortcuts, structured address block, and the
/// short-URL-or-literal website field.
pub fn map_vendor_profile(value: &Value) -> ContactRecord {
    let mut record = ContactRecord::default();

    let profile = value.get("profile");
    if let Some(name) = str_at(profile, "name") {
        let mut words = name.split_whitespace();
        record.first_name = words.next().unwrap_or("").to_string();
        record.last_name = words.collect::<Vec<_>>().join(" ");
    }
    if let Some(company) = str_at(profile, "company") {
        record.company = company;
    }
    if let Some(title) = str_at(profile, "title") {
        record.position = title;
    }
    if let Some(department) = str_at(profile, "department") {
        record.department = department;
    }

    let contact = value.get("contact");
    if let Some(phone) = str_at(contact, "phone") {
        record.phone_number = phone;
    }
    if let Some(mobile) = str_at(contact, "mobile") {
        record.mobile = mobile;
    }
    if let Some(email) = str_at(contact, "email") {
        record.email = email;
    }

    let address = value.get("address");
    if let Some(street) = str_at(address, "street") {
        record.address = street;
    }
    if let Some(city) = str_at(address, "city") {
        record.city = city;
    }
    if let Some(zip) = str_at(address, "zip") {
        record.zipcode = zip;
    }
    if let Some(country) = str_at(address, "country") {
        record.country = country;
    }

    // The short tracking URL is what the card actually points at; prefer it.
    record.website = str_at(Some(value), "shortUrl")
        .or_else(|| str_at(Some(value), "website"))
        .unwrap_or_default();

    record
}

fn str_at(value: Option<&Value>, key: &str) -> Option<String> {
    value?
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head><script>
        window.__CARD_DATA__ = {"profile":{"name":"Jane Smith","company":"Acme","title":"CTO"},
        "contact":{"phone":"+14155550100","email":"jane@acme.com"},
        "address":{"street":"1 Main St","city":"Springfield","zip":"94000","country":"USA"},
        "shortUrl":"https://qr.card/abc123","website":"https://acme.com"};
    </script></head><body></body></html>"#;

    #[test]
    fn finds_and_maps_server_rendered_payload() {
        let value = find_vendor_json(PAGE).expect("marker present");
        let r = map_vendor_profile(&value);
        assert_eq!(r.first_name, "Jane");
        assert_eq!(r.last_name, "Smith");
        assert_eq!(r.company, "Acme");
        assert_eq!(r.position, "CTO");
        assert_eq!(r.phone_number, "+14155550100");
        assert_eq!(r.email, "jane@acme.com");
        assert_eq!(r.address, "1 Main St");
        assert_eq!(r.city, "Springfield");
        assert_eq!(r.zipcode, "94000");
        assert_eq!(r.country, "USA");
        assert_eq!(r.website, "https://qr.card/abc123");
    }

    #[test]
    fn literal_website_when_no_short_url() {
        let value: Value =
            serde_json::from_str(r#"{"profile":{"name":"Jo"},"website":"https://jo.dev"}"#)
                .unwrap();
        let r = map_vendor_profile(&value);
        assert_eq!(r.website, "https://jo.dev");
    }

    #[test]
    fn absent_marker() {
        assert!(find_vendor_json("<html><body>plain page</body></html>").is_none());
    }
}
