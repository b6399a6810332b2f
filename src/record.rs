use serde::{Deserialize, Serialize};

/// Canonical contact shape produced by every branch of the pipeline.
///
/// Fields default to the empty string rather than `Option` so a normalized
/// record always carries the full key set. The entry code is deliberately not
/// a field here; it travels on [`ExtractionResult::entry_code`] only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactRecord {
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub position: String,
    pub department: String,
    pub email: String,
    pub phone_number: String,
    pub mobile: String,
    pub website: String,
    pub address: String,
    pub city: String,
    pub zipcode: String,
    pub country: String,
}

impl ContactRecord {
    /// Number of non-empty canonical fields.
    pub fn populated_fields(&self) -> usize {
        self.field_values().iter().filter(|v| !v.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.populated_fields() == 0
    }

    /// Copy every field from `other` that is still empty on `self`.
    /// First successful source wins per field.
    pub fn fill_missing_from(&mut self, other: &ContactRecord) {
        let dst = self.field_values_mut();
        let src = other.field_values();
        for (d, s) in dst.into_iter().zip(src) {
            if d.is_empty() && !s.is_empty() {
                *d = s.to_string();
            }
        }
    }

    fn field_values(&self) -> [&str; 14] {
        [
            &self.title,
            &self.first_name,
            &self.last_name,
            &self.company,
            &self.position,
            &self.department,
            &self.email,
            &self.phone_number,
            &self.mobile,
            &self.website,
            &self.address,
            &self.city,
            &self.zipcode,
            &self.country,
        ]
    }

    fn field_values_mut(&mut self) -> [&mut String; 14] {
        [
            &mut self.title,
            &mut self.first_name,
            &mut self.last_name,
            &mut self.company,
            &mut self.position,
            &mut self.department,
            &mut self.email,
            &mut self.phone_number,
            &mut self.mobile,
            &mut self.website,
            &mut self.address,
            &mut self.city,
            &mut self.zipcode,
            &mut self.country,
        ]
    }
}

/// Closed tag set assigned by the classifier. Exactly one per input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    EntryCode,
    Mailto,
    Tel,
    Vcard,
    Url,
    Plaintext,
}

/// Outcome of one pipeline invocation. Constructed once, immutable after
/// return; carries no identity beyond the call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub success: bool,
    pub kind: PayloadKind,
    pub raw_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<ContactRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_code: Option<String>,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResult {
    pub fn failure(kind: PayloadKind, raw: &str, error: impl Into<String>) -> Self {
        ExtractionResult {
            success: false,
            kind,
            raw_data: raw.to_string(),
            record: None,
            entry_code: None,
            confidence: 0.0,
            error: Some(error.into()),
        }
    }

    pub fn success(kind: PayloadKind, raw: &str, record: ContactRecord, confidence: f64) -> Self {
        ExtractionResult {
            success: true,
            kind,
            raw_data: raw.to_string(),
            record: Some(record),
            entry_code: None,
            confidence,
            error: None,
        }
    }

    pub fn with_entry_code(mut self, code: Option<String>) -> Self {
        self.entry_code = code.filter(|c| !c.is_empty());
        self
    }
}

/// Expected populated-field counts per payload kind. Link payloads are scored
/// directly (1.0 populated / 0.5 empty) and bypass this table.
pub fn expected_fields(kind: PayloadKind) -> usize {
    match kind {
        PayloadKind::Vcard => 5,
        PayloadKind::Url => 10,
        PayloadKind::Plaintext => 3,
        PayloadKind::EntryCode | PayloadKind::Mailto | PayloadKind::Tel => 1,
    }
}

/// Populated-field count over the per-kind denominator, clamped to [0,1] and
/// rounded to two decimals.
pub fn score_record(record: &ContactRecord, kind: PayloadKind) -> f64 {
    let expected = expected_fields(kind).max(1);
    let ratio = record.populated_fields() as f64 / expected as f64;
    round2(ratio.clamp(0.0, 1.0))
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
