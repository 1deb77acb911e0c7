//! Personalized Investment Advisory Engine
//!
//! Aggregates a customer's financial profile, derives a deterministic
//! risk/allocation baseline, and augments it with a narrative
//! recommendation from a remote advisory provider:
//! - Profile resolver: normalizes raw customer records
//! - Allocation rules engine: pure decision-table scoring
//! - Advisory gateway: signed requests with bounded fallback synthesis
//! - Response cache: TTL store with pattern invalidation
//! - Orchestrator: the single entry point tying them together
//!
//! PIPELINE:
//! RESOLVE → CACHE LOOKUP → EVALUATE → ADVISE (or FALLBACK) → CACHE WRITE

pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod orchestrator;
pub mod profile;
pub mod rules;

pub use error::{AdvisoryError, Result};

// Re-export common types
pub use gateway::{AdviceProvider, AdvisoryGateway};
pub use models::*;
pub use orchestrator::AdvisoryOrchestrator;
