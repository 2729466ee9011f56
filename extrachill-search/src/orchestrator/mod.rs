//! Search orchestrator: concurrent site queries, fallback, scoring, ranking.
//!
//! This module fans a query out to every target site concurrently, retries
//! with word-level matching when the native search finds nothing, scores
//! records for relevance, and returns one globally ordered window with
//! site provenance attached.

pub mod dispatch;
pub mod fallback;
pub mod merge;
pub mod projection;
pub mod scoring;
pub mod search;
