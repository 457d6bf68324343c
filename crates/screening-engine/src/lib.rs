//! # screening-engine: Screening Decision Engine
//!
//! Turns per-dataset candidate lists into a decision and a durable audit
//! trail.
//!
//! ## Pipeline
//!
//! ```text
//! PersonQuery ─► build_match_request ─► MatchClient::fetch (N datasets)
//!             ─► aggregate ─► classify ─► AuditRecorder::record ─► ScreeningResult
//! ```
//!
//! - [`aggregate`]: merge, deduplicate by `(dataset, entity_id)`, rank.
//! - [`classify`]: pure ordered threshold rules producing decision, risk
//!   tier and reasons.
//! - [`audit`]: the [`AuditSink`] trait, a JSON Lines file sink, an
//!   in-memory sink, and [`AuditRecorder`], which makes writes idempotent
//!   per request id.
//! - [`screening`]: [`Screener`], the orchestration entry point.
//!
//! ## Failure Policy
//!
//! Upstream failures surface as [`ScreeningError`] and never produce a
//! decision. Audit failures are logged and reported as
//! [`AuditStatus::Failed`] but never withhold a computed decision.

pub mod aggregate;
pub mod audit;
pub mod classify;
pub mod config;
pub mod error;
pub mod screening;

pub use aggregate::{aggregate, RankedCandidates};
pub use audit::{
    AuditError, AuditRecorder, AuditSink, AuditStatus, JsonlAuditLog, MemoryAuditLog,
};
pub use classify::{classify, Classification};
pub use config::{ConfigError, ScreeningConfig};
pub use error::ScreeningError;
pub use screening::{Screener, ScreeningOutcome};
