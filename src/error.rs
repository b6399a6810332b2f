use thiserror::Error;

/// Terminal failures — the only ones surfaced as `success: false`.
/// Every strategy-level error (fetch, browser, AI) is recovered internally.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("empty input")]
    EmptyInput,

    #[error("invalid vCard: {0}")]
    Vcard(String),
}
