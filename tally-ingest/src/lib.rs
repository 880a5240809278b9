//! tally-ingest: configurable statement/transaction extraction from PDF
//! text.
//!
//! The pipeline: extract text ([`pdf_text`]) → detect the issuing provider
//! ([`detect`], backed by a [`registry::FormatRegistry`]) → isolate the
//! transaction or securities block ([`section`]) → extract structured
//! records ([`extract`]) → reshape for import ([`credit_card`]). Statements
//! no config claims drop to the heuristic [`fallback`] parser.

pub mod credit_card;
pub mod detect;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod formats;
pub mod pdf_text;
pub mod registry;
pub mod section;
pub mod statement;
pub mod types;

pub use credit_card::{format_for_import, CreditCardParser, CreditCardStatement, ImportSummary};
pub use detect::{detect_format, detect_provider, GENERIC_CREDIT_CARD};
pub use error::IngestError;
pub use formats::{
    FormatKind, PatternSet, ProviderConfig, RecordPattern, ScalarPattern, SectionBoundary,
    ValueType,
};
pub use registry::FormatRegistry;
pub use statement::{BankStatement, ParsedStatement, PortfolioStatement, StatementParser};
pub use types::{ExtractedTransaction, Security};
