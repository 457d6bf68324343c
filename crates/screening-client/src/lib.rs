//! # screening-client: Matching Engine Client
//!
//! The sole gateway between the screening service and the external
//! entity-matching engine. The engine is a black box: it receives a
//! structured person description per watchlist dataset and returns scored
//! candidate entities.
//!
//! ## Modules
//!
//! - [`query`]: builds the engine's match payload from a [`PersonQuery`].
//! - [`types`]: wire records for requests and responses, with strict
//!   per-candidate parsing.
//! - [`engine`]: the [`MatchingEngine`] trait and its reqwest-backed
//!   implementation, [`HttpMatchingEngine`].
//! - [`fanout`]: [`MatchClient`], which probes readiness and then queries
//!   every configured dataset concurrently, failing closed.
//!
//! ## Failure Policy
//!
//! An incomplete screen must never look like a clean one. Any dataset
//! failure (timeout, transport error, non-2xx, unparseable body) fails the
//! whole fan-out. Only individual malformed candidate entries are skipped.
//!
//! [`PersonQuery`]: screening_core::PersonQuery

pub mod config;
pub mod engine;
pub mod error;
pub mod fanout;
pub mod query;
pub mod types;

pub use config::{ConfigError, EngineConfig};
pub use engine::{HttpMatchingEngine, MatchingEngine, Readiness};
pub use error::MatchError;
pub use fanout::{DatasetCandidates, MatchClient};
pub use query::build_match_request;
pub use types::{EntityQuery, MatchRequest, MatchResponse, QueryResponse};
