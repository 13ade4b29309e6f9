//! Data types for the per-spoke radius search.
//!
//! - `IsochroneCfg`: target, tolerance, fan resolution, round cap, speed seeds.
//! - `RadiusBracket`: `[low, high]` plus current/previous radius (miles).
//! - `SpokeObservation`: last oracle answer for the spoke's candidate point.
//! - `SpokeState`: one explicit record per spoke, threaded through `step`.

use serde::Serialize;

use crate::error::{IsochroneError, Result};

/// Default number of spokes in the fan.
pub const DEFAULT_SPOKES: usize = 12;
/// Default acceptance band around the target, in minutes.
pub const DEFAULT_TOLERANCE_MINUTES: f64 = 0.1;
/// Default cap on oracle rounds before giving up.
pub const DEFAULT_MAX_ROUNDS: usize = 30;
/// Crow-flies speed used to seed the first radius guess.
pub const DEFAULT_MIN_SPEED_MPH: f64 = 5.0;
/// Crow-flies speed used to seed the outer bracket bound.
pub const DEFAULT_MAX_SPEED_MPH: f64 = 75.0;

/// Search configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct IsochroneCfg {
    /// Travel-time budget the contour represents, in minutes.
    pub target_minutes: f64,
    /// Number of evenly spaced bearings (>= 3).
    pub spokes: usize,
    /// A duration within `target ± tolerance` is accepted.
    pub tolerance_minutes: f64,
    /// Oracle rounds allowed before `ConvergenceTimeout`.
    pub max_rounds: usize,
    pub min_speed_mph: f64,
    pub max_speed_mph: f64,
}

impl IsochroneCfg {
    pub fn new(target_minutes: f64) -> Self {
        Self {
            target_minutes,
            spokes: DEFAULT_SPOKES,
            tolerance_minutes: DEFAULT_TOLERANCE_MINUTES,
            max_rounds: DEFAULT_MAX_ROUNDS,
            min_speed_mph: DEFAULT_MIN_SPEED_MPH,
            max_speed_mph: DEFAULT_MAX_SPEED_MPH,
        }
    }

    pub fn with_spokes(mut self, spokes: usize) -> Self {
        self.spokes = spokes;
        self
    }

    pub fn with_tolerance(mut self, tolerance_minutes: f64) -> Self {
        self.tolerance_minutes = tolerance_minutes;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_speeds(mut self, min_speed_mph: f64, max_speed_mph: f64) -> Self {
        self.min_speed_mph = min_speed_mph;
        self.max_speed_mph = max_speed_mph;
        self
    }

    /// First radius guess: distance covered at `min_speed_mph` in the budget.
    #[inline]
    pub fn initial_radius(&self) -> f64 {
        self.target_minutes / 60.0 * self.min_speed_mph
    }

    /// Initial outer bound: distance covered at `max_speed_mph` in the budget.
    #[inline]
    pub fn initial_high(&self) -> f64 {
        self.target_minutes / 60.0 * self.max_speed_mph
    }

    /// Reject settings the search cannot run with.
    pub fn validate(&self) -> Result<()> {
        let bad = |msg: String| Err(IsochroneError::InvalidInput(msg));
        if !(self.target_minutes.is_finite() && self.target_minutes > 0.0) {
            return bad(format!(
                "duration must be a positive number of minutes, got {}",
                self.target_minutes
            ));
        }
        if self.spokes < 3 {
            return bad(format!("need at least 3 spokes, got {}", self.spokes));
        }
        if !(self.tolerance_minutes.is_finite() && self.tolerance_minutes >= 0.0) {
            return bad(format!(
                "tolerance must be a non-negative number of minutes, got {}",
                self.tolerance_minutes
            ));
        }
        if self.max_rounds == 0 {
            return bad("round cap must be at least 1".to_string());
        }
        let speed_ok = |v: f64| v.is_finite() && v > 0.0;
        if !(speed_ok(self.min_speed_mph) && speed_ok(self.max_speed_mph))
            || self.min_speed_mph >= self.max_speed_mph
        {
            return bad(format!(
                "speeds must satisfy 0 < min < max, got {} / {}",
                self.min_speed_mph, self.max_speed_mph
            ));
        }
        Ok(())
    }
}

/// Binary-search bracket for one spoke. Invariant: `low <= current <= high`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RadiusBracket {
    pub current: f64,
    pub previous: f64,
    pub low: f64,
    pub high: f64,
}

impl RadiusBracket {
    #[inline]
    pub fn contains_current(&self) -> bool {
        self.low <= self.current && self.current <= self.high
    }

    /// `|current - previous|`.
    #[inline]
    pub fn delta(&self) -> f64 {
        (self.current - self.previous).abs()
    }
}

/// Oracle answer for a spoke's candidate point, sentinel already applied.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpokeObservation {
    pub minutes: f64,
    pub address: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SpokeStatus {
    Searching,
    Converged,
    /// Still moving when the round cap was reached; terminal.
    Stalled,
}

/// Full per-spoke search state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpokeState {
    /// Nominal bearing in degrees.
    pub bearing: f64,
    pub bracket: RadiusBracket,
    /// Previous round's answer; `None` before the first round.
    pub observation: Option<SpokeObservation>,
    pub status: SpokeStatus,
}

/// Outcome of one engine round.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Progress {
    /// Every spoke held its radius this round.
    Converged,
    /// At least one spoke moved; `delta` is the summed absolute radius change.
    Searching { delta: f64 },
}
