//! Locator generation
//!
//! This module provides:
//! - Target resolution from a free-text description
//! - Independent locator strategies with uniqueness re-checks
//! - Deterministic ranking into a primary locator plus alternatives
//! - The two-stage pipeline result (`Resolved` or `NeedsFallback`)

pub mod engine;
pub mod ranking;
pub mod strategy;
pub mod target;

pub use engine::{FallbackReason, LocatorEngine, LocatorOutcome, LocatorRequest};
pub use ranking::{rank, rank_with_limit, LocatorResult, DEFAULT_MAX_ALTERNATIVES};
pub use strategy::{LocatorCandidate, Strategy, StrategyContext, StrategyKind};
pub use target::resolve_target;
