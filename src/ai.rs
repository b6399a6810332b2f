use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::AiProvider;
use crate::record::ContactRecord;
use crate::util::first_json_block;

const AI_TIMEOUT: Duration = Duration::from_secs(15);

const SYSTEM_PROMPT: &str = "You extract contact details from short free-form text, \
usually the payload of a scanned business-card QR code. \
Respond with a single JSON object and nothing else, using exactly these keys: \
firstName, lastName, company, position, emails (array of strings), \
phoneNumbers (array of strings), website, address, city, zipcode, country. \
Use an empty string or empty array for anything not present in the text. \
Do not invent data.";

/// Gate for the remote call: short, simple text is cheaper to handle with the
/// deterministic extractor.
pub fn is_complex(text: &str) -> bool {
    text.contains('|') || text.lines().count() > 3 || text.len() > 100
}

/// Run the extraction prompt against the ordered provider list, first usable
/// answer wins. Returns `None` when every provider is absent, fails, or
/// answers with nothing extractable; the caller falls back to the regex
/// extractor and no error reaches the pipeline result.
pub async fn analyze(
    client: &reqwest::Client,
    providers: &[&AiProvider],
    text: &str,
) -> Option<ContactRecord> {
    for provider in providers {
        match complete(client, provider, text).await {
            Ok(record) if !record.is_empty() => {
                debug!("AI provider '{}' produced a usable record", provider.name);
                return Some(record);
            }
            Ok(_) => {
                warn!("AI provider '{}' returned an empty record", provider.name);
            }
            Err(e) => {
                warn!("AI provider '{}' failed: {}", provider.name, e);
            }
        }
    }
    None
}

/// One chat-completions round trip (OpenAI-compatible shape) with a fixed
/// per-attempt timeout.
async fn complete(
    client: &reqwest::Client,
    provider: &AiProvider,
    text: &str,
) -> Result<ContactRecord> {
    let body = serde_json::json!({
        "model": provider.model,
        "temperature": 0,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": text },
        ],
    });

    let response = client
        .post(&provider.endpoint)
        .bearer_auth(&provider.api_key)
        .json(&body)
        .timeout(AI_TIMEOUT)
        .send()
        .await?
        .error_for_status()?;

    let payload: serde_json::Value = response.json().await?;
    let content = payload
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| anyhow!("no message content in completion response"))?;

    parse_model_reply(content)
}

/// Models wrap JSON in code fences or prose; take the first balanced
/// `{...}` block and parse that.
pub fn parse_model_reply(content: &str) -> Result<ContactRecord> {
    let stripped = strip_code_fences(content);
    let block =
        first_json_block(&stripped).ok_or_else(|| anyhow!("no JSON object in model reply"))?;
    let contact: AiContact = serde_json::from_str(block)?;
    Ok(contact.into_record())
}

fn strip_code_fences(content: &str) -> String {
    content
        .lines()
        .filter(|l| !l.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The constrained shape the prompt asks for. Arrays are reduced to their
/// first element for the single-valued canonical fields.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct AiContact {
    first_name: String,
    last_name: String,
    company: String,
    position: String,
    emails: Vec<String>,
    phone_numbers: Vec<String>,
    website: String,
    address: String,
    city: String,
    zipcode: String,
    country: String,
}

impl AiContact {
    fn into_record(self) -> ContactRecord {
        let mut record = ContactRecord {
            first_name: self.first_name,
            last_name: self.last_name,
            company: self.company,
            position: self.position,
            website: self.website,
            address: self.address,
            city: self.city,
            zipcode: self.zipcode,
            country: self.country,
            ..Default::default()
        };
        if let Some(email) = self.emails.into_iter().find(|e| !e.is_empty()) {
            record.email = email;
        }
        if let Some(phone) = self.phone_numbers.into_iter().find(|p| !p.is_empty()) {
            record.phone_number = phone;
        }
        record
    }
}
