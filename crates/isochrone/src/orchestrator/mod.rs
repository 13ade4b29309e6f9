//! Round loop tying geodesy, the oracle, and the convergence engine together.
//!
//! Per round
//! - project every spoke's current radius along its bearing;
//! - ask the oracle for all candidates in one batch;
//! - feed each answer (failures → sentinel minutes) to the engine;
//! - stop when no spoke moved, fail when the round cap is reached.
//!
//! After convergence each spoke's final provider label is re-geocoded, since
//! the provider's snapped location is preferred over the projected guess, and
//! the vertices are sorted by bearing.
//!
//! Code cross-refs: `engine::ConvergenceEngine`, `oracle::{Geocoder, TravelTimeOracle, Pause}`,
//! `sort::sort_points`.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::engine::{ConvergenceEngine, IsochroneCfg, Progress, SpokeObservation, SpokeState};
use crate::error::{IsochroneError, ProviderError, Result};
use crate::geodesy::{destination_point, GeoPoint};
use crate::location::Location;
use crate::oracle::{Geocoder, Pause, TravelTimeOracle};
use crate::sort::sort_points;

/// Final state of one spoke.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpokeSummary {
    pub bearing: f64,
    pub radius_miles: f64,
    pub minutes: f64,
    pub address: String,
    /// Geocoded position of `address`.
    pub point: GeoPoint,
}

/// Solved contour: origin plus vertices in ascending bearing order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Isochrone {
    pub origin: GeoPoint,
    pub target_minutes: f64,
    pub points: Vec<GeoPoint>,
    pub rounds: usize,
    /// Per-spoke diagnostics in nominal bearing order.
    pub spokes: Vec<SpokeSummary>,
}

/// Origin plus search settings; one contour per request.
#[derive(Clone, Debug, PartialEq)]
pub struct IsochroneRequest {
    pub origin: Location,
    pub cfg: IsochroneCfg,
}

impl IsochroneRequest {
    pub fn new(origin: impl Into<Location>, cfg: IsochroneCfg) -> Self {
        Self {
            origin: origin.into(),
            cfg,
        }
    }

    /// Shorthand for [`solve`] on this request.
    pub fn solve<G, O, P>(&self, geocoder: &G, oracle: &O, pause: &P) -> Result<Isochrone>
    where
        G: Geocoder + ?Sized,
        O: TravelTimeOracle + ?Sized,
        P: Pause + ?Sized,
    {
        solve(&self.origin, self.cfg, geocoder, oracle, pause)
    }
}

/// Compute the isochrone around `origin`.
///
/// Settings and the origin are checked before any external call. Provider
/// failures and `ConvergenceTimeout` abort the whole computation.
pub fn solve<G, O, P>(
    origin: &Location,
    cfg: IsochroneCfg,
    geocoder: &G,
    oracle: &O,
    pause: &P,
) -> Result<Isochrone>
where
    G: Geocoder + ?Sized,
    O: TravelTimeOracle + ?Sized,
    P: Pause + ?Sized,
{
    let mut engine = ConvergenceEngine::new(cfg)?;
    let origin = origin.resolve(geocoder)?;
    info!(
        lat = origin.lat,
        lng = origin.lng,
        minutes = cfg.target_minutes,
        spokes = cfg.spokes,
        "solving isochrone"
    );

    loop {
        let candidates: Vec<Location> = engine
            .probes()
            .map(|(b, r)| Location::Coordinate(destination_point(origin, b, r)))
            .collect();
        let answers = oracle.travel_times(origin, &candidates)?;
        if answers.len() != candidates.len() {
            return Err(ProviderError::InvalidResponse(format!(
                "expected {} travel times, got {}",
                candidates.len(),
                answers.len()
            ))
            .into());
        }
        let observations: Vec<SpokeObservation> = answers
            .into_iter()
            .enumerate()
            .map(|(i, t)| {
                if t.minutes.is_none() {
                    warn!(
                        round = engine.rounds() + 1,
                        spoke = i,
                        "destination failed; using sentinel duration"
                    );
                }
                SpokeObservation {
                    minutes: t.minutes_or_sentinel(),
                    address: t.address,
                }
            })
            .collect();
        match engine.advance(observations)? {
            Progress::Converged => break,
            Progress::Searching { delta } => {
                debug!(round = engine.rounds(), delta, "continuing");
            }
        }
    }

    let rounds = engine.rounds();
    info!(rounds, "converged");
    let spokes = resolve_vertices(engine.into_spokes(), geocoder, pause)?;
    let vertices: Vec<GeoPoint> = spokes.iter().map(|s| s.point).collect();
    Ok(Isochrone {
        origin,
        target_minutes: cfg.target_minutes,
        points: sort_points(origin, &vertices),
        rounds,
        spokes,
    })
}

fn resolve_vertices<G, P>(
    spokes: Vec<SpokeState>,
    geocoder: &G,
    pause: &P,
) -> Result<Vec<SpokeSummary>>
where
    G: Geocoder + ?Sized,
    P: Pause + ?Sized,
{
    let mut out = Vec::with_capacity(spokes.len());
    for (i, s) in spokes.into_iter().enumerate() {
        if i > 0 {
            pause.pause();
        }
        let obs = s.observation.ok_or_else(|| {
            IsochroneError::InvalidInput(format!("spoke {i} finished without an observation"))
        })?;
        let point = geocoder.resolve(&obs.address)?;
        out.push(SpokeSummary {
            bearing: s.bearing,
            radius_miles: s.bracket.current,
            minutes: obs.minutes,
            address: obs.address,
            point,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests;
