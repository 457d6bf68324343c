//! # screening-core: Data Model for Watchlist Screening
//!
//! Foundational types shared by every crate in the screening workspace.
//! Depends on nothing internal.
//!
//! ## Key Types
//!
//! - [`PersonQuery`]: immutable description of the natural person being
//!   screened. Constructed through [`PersonQueryBuilder`], which enforces the
//!   one hard input rule: a non-empty `full_name`.
//! - [`DatasetScope`]: opaque name of one watchlist partition known to the
//!   matching engine. Configuration, never request data.
//! - [`MatchCandidate`]: one scored entity returned by the matching engine.
//! - [`ScreeningDecision`] / [`RiskLevel`]: totally ordered severity tiers.
//! - [`ScreeningResult`]: the caller-visible outcome of one screen.
//! - [`AuditRecord`]: the append-only snapshot written once per request.
//!
//! ## Crate Policy
//!
//! - No I/O, no async, no global state.
//! - No `.unwrap()` outside tests.
//! - Identifier newtypes, [`PersonQuery`] and [`Thresholds`] validate at
//!   construction and at deserialization.

pub mod audit;
pub mod candidate;
pub mod decision;
pub mod digest;
pub mod error;
pub mod person;
pub mod result;

pub use audit::AuditRecord;
pub use candidate::{DatasetScope, MatchCandidate};
pub use decision::{RiskLevel, ScreeningDecision, Thresholds};
pub use digest::{CanonicalBytes, OutcomeDigest};
pub use error::ValidationError;
pub use person::{PersonQuery, PersonQueryBuilder, RequestId};
pub use result::{InputFieldsProvided, ScreeningMetadata, ScreeningResult};
