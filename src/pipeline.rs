use tracing::debug;

use crate::classify::classify;
use crate::config::Config;
use crate::error::ExtractError;
use crate::record::{score_record, ExtractionResult, PayloadKind};
use crate::{ai, links, scrape, text, vcard};

/// Run one payload through the pipeline: classify, dispatch to the matching
/// parser, normalize and score. The only `success: false` outcomes are an
/// empty payload and a malformed vCard; every other path returns the best
/// partial record with an honest confidence.
pub async fn extract(raw_text: &str, cfg: &Config) -> ExtractionResult {
    let input = raw_text.trim();
    if input.is_empty() {
        return ExtractionResult::failure(
            PayloadKind::Plaintext,
            raw_text,
            ExtractError::EmptyInput.to_string(),
        );
    }

    let kind = classify(input);
    debug!("payload classified as {:?}", kind);

    match kind {
        PayloadKind::EntryCode => ExtractionResult {
            success: true,
            kind,
            raw_data: input.to_string(),
            record: None,
            entry_code: Some(input.to_string()),
            confidence: 1.0,
            error: None,
        },

        PayloadKind::Mailto => {
            let record = links::parse_mailto(input);
            let confidence = links::score_link(!record.email.is_empty());
            ExtractionResult::success(kind, input, record, confidence)
        }

        PayloadKind::Tel => {
            let record = links::parse_tel(input);
            let confidence = links::score_link(!record.phone_number.is_empty());
            ExtractionResult::success(kind, input, record, confidence)
        }

        PayloadKind::Vcard => match vcard::parse_vcard(input) {
            Ok((record, entry_code)) => {
                let confidence = score_record(&record, kind);
                ExtractionResult::success(kind, input, record, confidence)
                    .with_entry_code(entry_code)
            }
            Err(e) => ExtractionResult::failure(kind, input, e.to_string()),
        },

        PayloadKind::Url => {
            let client = cfg.http_client();
            let record = scrape::scrape_url(cfg, client.as_ref(), input).await;
            let confidence = score_record(&record, kind);
            ExtractionResult::success(kind, input, record, confidence)
        }

        PayloadKind::Plaintext => {
            let (heuristic, entry_code) = text::heuristic_record(input);

            let providers = cfg.ai_providers();
            let record = if !providers.is_empty() && ai::is_complex(input) {
                let client = cfg
                    .http_client()
                    .or_else(|| reqwest::Client::builder().build().ok());
                let analyzed = match client {
                    Some(client) => ai::analyze(&client, &providers, input).await,
                    None => None,
                };
                match analyzed {
                    Some(mut record) => {
                        // The deterministic pass backfills whatever the model
                        // left empty.
                        record.fill_missing_from(&heuristic);
                        record
                    }
                    None => heuristic,
                }
            } else {
                heuristic
            };

            let confidence = score_record(&record, kind);
            ExtractionResult::success(kind, input, record, confidence).with_entry_code(entry_code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline() -> Config {
        Config::default()
    }

    #[tokio::test]
    async fn empty_input_is_failure() {
        let result = extract("   \n ", &offline()).await;
        assert!(!result.success);
        assert_eq!(result.kind, PayloadKind::Plaintext);
        assert_eq!(result.error.as_deref(), Some("empty input"));
        assert_eq!(result.confidence, 0.0);
    }

    #[tokio::test]
    async fn entry_code_payload() {
        let result = extract("AB12CD34EF", &offline()).await;
        assert!(result.success);
        assert_eq!(result.kind, PayloadKind::EntryCode);
        assert_eq!(result.entry_code.as_deref(), Some("AB12CD34EF"));
        assert_eq!(result.confidence, 1.0);
        assert!(result.record.is_none());
    }

    #[tokio::test]
    async fn malformed_vcard_is_failure() {
        let result = extract("BEGIN:VCARD\nEND:VCARD", &offline()).await;
        assert!(!result.success);
        assert_eq!(result.kind, PayloadKind::Vcard);
        assert!(result.error.as_deref().unwrap().contains("vCard"));
    }

    #[tokio::test]
    async fn plaintext_offline_uses_heuristics() {
        let result = extract("Jane Smith\njane@x.com\n+14155550100", &offline()).await;
        assert!(result.success);
        assert_eq!(result.kind, PayloadKind::Plaintext);
        let record = result.record.unwrap();
        assert_eq!(record.first_name, "Jane");
        assert_eq!(record.last_name, "Smith");
        assert_eq!(record.email, "jane@x.com");
        assert_eq!(record.phone_number, "+14155550100");
        assert!(result.confidence > 0.0);
    }
}
