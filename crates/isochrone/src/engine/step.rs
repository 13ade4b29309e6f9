//! Spoke transition function and the round-level engine.

use tracing::{debug, trace};

use super::types::{
    IsochroneCfg, Progress, RadiusBracket, SpokeObservation, SpokeState, SpokeStatus,
};
use crate::error::{IsochroneError, Result};

/// Nominal bearings `i · 360 / n` for `i in 0..n`.
pub fn spoke_bearings(n: usize) -> Vec<f64> {
    let step = 360.0 / n as f64;
    (0..n).map(|i| i as f64 * step).collect()
}

/// Fresh search state for one spoke.
pub fn initial_state(bearing: f64, cfg: &IsochroneCfg) -> SpokeState {
    let r0 = cfg.initial_radius();
    SpokeState {
        bearing,
        bracket: RadiusBracket {
            current: r0,
            previous: r0,
            low: 0.0,
            high: cfg.initial_high(),
        },
        observation: None,
        status: SpokeStatus::Searching,
    }
}

/// Advance one spoke given the oracle's answer for its current radius.
///
/// Moves outward when too fast, inward when too slow, and holds when within
/// tolerance or when the provider resolved to the same address as last round.
/// The last rule can freeze a spoke outside the tolerance band.
pub fn step(state: SpokeState, obs: SpokeObservation, cfg: &IsochroneCfg) -> SpokeState {
    let SpokeState {
        bearing,
        mut bracket,
        observation,
        ..
    } = state;
    let new_address = observation
        .as_ref()
        .map_or(true, |prev| prev.address != obs.address);
    let lo_target = cfg.target_minutes - cfg.tolerance_minutes;
    let hi_target = cfg.target_minutes + cfg.tolerance_minutes;

    let r = bracket.current;
    let next = if obs.minutes < lo_target && new_address {
        bracket.low = r;
        (bracket.high + r) / 2.0
    } else if obs.minutes > hi_target && new_address {
        bracket.high = r;
        (bracket.low + r) / 2.0
    } else {
        r
    };
    bracket.previous = r;
    bracket.current = next;
    debug_assert!(bracket.contains_current(), "bracket violated: {bracket:?}");

    let status = if bracket.current == bracket.previous {
        SpokeStatus::Converged
    } else {
        SpokeStatus::Searching
    };
    SpokeState {
        bearing,
        bracket,
        observation: Some(obs),
        status,
    }
}

/// All spokes of one isochrone plus the round counter.
#[derive(Clone, Debug)]
pub struct ConvergenceEngine {
    cfg: IsochroneCfg,
    spokes: Vec<SpokeState>,
    rounds: usize,
}

impl ConvergenceEngine {
    /// Build `cfg.spokes` independent spoke states.
    pub fn new(cfg: IsochroneCfg) -> Result<Self> {
        cfg.validate()?;
        let spokes = spoke_bearings(cfg.spokes)
            .into_iter()
            .map(|b| initial_state(b, &cfg))
            .collect();
        Ok(Self {
            cfg,
            spokes,
            rounds: 0,
        })
    }

    #[inline]
    pub fn cfg(&self) -> &IsochroneCfg {
        &self.cfg
    }

    #[inline]
    pub fn spokes(&self) -> &[SpokeState] {
        &self.spokes
    }

    /// Rounds completed so far.
    #[inline]
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// `(bearing, radius)` to probe this round.
    pub fn probes(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.spokes.iter().map(|s| (s.bearing, s.bracket.current))
    }

    /// Feed one observation per spoke (in spoke order) and advance every spoke.
    ///
    /// Errors with `ConvergenceTimeout` when this round reaches the cap without
    /// global convergence (spokes still searching become `Stalled`), and with
    /// `InvalidInput` on a length mismatch.
    pub fn advance(&mut self, observations: Vec<SpokeObservation>) -> Result<Progress> {
        if observations.len() != self.spokes.len() {
            return Err(IsochroneError::InvalidInput(format!(
                "expected {} observations, got {}",
                self.spokes.len(),
                observations.len()
            )));
        }
        let cfg = self.cfg;
        let prev = std::mem::take(&mut self.spokes);
        self.spokes = prev
            .into_iter()
            .zip(observations)
            .map(|(s, obs)| step(s, obs, &cfg))
            .collect();
        self.rounds += 1;

        for (i, s) in self.spokes.iter().enumerate() {
            trace!(
                round = self.rounds,
                spoke = i,
                bearing = s.bearing,
                radius = s.bracket.current,
                low = s.bracket.low,
                high = s.bracket.high,
                status = ?s.status,
                "spoke"
            );
        }
        let delta: f64 = self.spokes.iter().map(|s| s.bracket.delta()).sum();
        let converged = self
            .spokes
            .iter()
            .filter(|s| s.status == SpokeStatus::Converged)
            .count();
        debug!(round = self.rounds, delta, converged, "round");

        if delta == 0.0 {
            return Ok(Progress::Converged);
        }
        if self.rounds >= self.cfg.max_rounds {
            for s in &mut self.spokes {
                if s.status == SpokeStatus::Searching {
                    s.status = SpokeStatus::Stalled;
                }
            }
            return Err(IsochroneError::ConvergenceTimeout {
                rounds: self.rounds,
            });
        }
        Ok(Progress::Searching { delta })
    }

    pub fn into_spokes(self) -> Vec<SpokeState> {
        self.spokes
    }
}
