//! Per-spoke binary search over radius.
//!
//! Purpose
//! - Drive each spoke's radius toward the distance at which the oracle reports
//!   the target duration, within a tolerance.
//! - Keep the state machine pure: `step` takes a `SpokeState` and an
//!   observation and returns the next state; no I/O happens here.
//!
//! Model
//! - Bracket `[low, high]` seeded from assumed min/max crow-flies speeds.
//! - Too fast → search outward between `current` and `high`; too slow →
//!   inward between `low` and `current`; within tolerance or same resolved
//!   address as last round → hold.
//! - Global convergence when no spoke moved in a round; a round cap turns a
//!   non-converging search into `ConvergenceTimeout` and marks the spokes
//!   that were still moving `Stalled`.
//!
//! Code cross-refs: `orchestrator::solve` (the only driver), `oracle::TravelTime`.

mod step;
mod types;

pub use step::{initial_state, spoke_bearings, step, ConvergenceEngine};
pub use types::{
    IsochroneCfg, Progress, RadiusBracket, SpokeObservation, SpokeState, SpokeStatus,
    DEFAULT_MAX_ROUNDS, DEFAULT_MAX_SPEED_MPH, DEFAULT_MIN_SPEED_MPH, DEFAULT_SPOKES,
    DEFAULT_TOLERANCE_MINUTES,
};
