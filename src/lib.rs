//! Contact extraction pipeline for scanned QR payloads.
//!
//! One entry point: [`extract`] takes the raw decoded text of a QR code and
//! returns a normalized [`ContactRecord`] plus a confidence score. The
//! cheapest strategy that yields usable data wins: structured formats
//! (`mailto:`, `tel:`, vCard) are parsed directly, plain text goes through
//! regex heuristics with an optional AI analyzer for complex payloads, and
//! URLs are scraped (direct fetch first, headless browser only when needed).
//!
//! All external collaborators — HTTP fetch, headless browser, AI providers —
//! are optional; see [`Config`]. With none configured the pipeline still
//! returns its best deterministic result.

pub mod ai;
pub mod classify;
pub mod config;
pub mod error;
pub mod links;
pub mod pipeline;
pub mod record;
pub mod retry;
pub mod scrape;
pub mod text;
pub mod util;
pub mod vcard;

pub use config::{AiProvider, BrowserEndpoint, Config, HttpConfig};
pub use error::ExtractError;
pub use pipeline::extract;
pub use record::{ContactRecord, ExtractionResult, PayloadKind};
