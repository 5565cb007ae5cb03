//! Sampling policy for price refreshes.
//!
//! Each refresh call looks at one route on one day. Days are drawn with a
//! weight that decays with distance from today, so near-term prices (which
//! move the most) are refreshed most often, while far-out dates still get
//! visited. Routes are drawn uniformly over directed edges, so a busy hub
//! gets refreshed in proportion to how many routes it has.
//!
//! Randomness is always injected so callers (and tests) control the seed.

use rand::Rng;

use crate::domain::Route;
use crate::graph::ConnectivityGraph;

/// Default decay constant `k` in `w(d) = 1 / (1 + k·d/365)`.
pub const DEFAULT_DECAY: f64 = 30.0;

/// Errors from the samplers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SamplingError {
    #[error("invalid day range: min {min} > max {max}")]
    InvalidRange { min: u32, max: u32 },

    #[error("invalid decay constant {0}")]
    InvalidDecay(f64),

    #[error("connectivity graph has no routes")]
    NoRouteAvailable,
}

/// Configuration for date sampling.
#[derive(Debug, Clone)]
pub struct SamplingConfig {
    /// Decay constant `k`
    pub decay: f64,
    /// Smallest day offset from today that gets refreshed
    pub lower_bound: u32,
    /// Largest day offset from today that gets refreshed
    pub horizon_days: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            decay: DEFAULT_DECAY,
            lower_bound: 1,
            horizon_days: 365,
        }
    }
}

/// Weight of day offset `d`.
pub fn day_weight(d: u32, decay: f64) -> f64 {
    1.0 / (1.0 + decay * f64::from(d) / 365.0)
}

/// Draw a day offset in `[min, max]` with probability proportional to
/// [`day_weight`].
///
/// `decay` must be finite and non-negative.
pub fn pick_weighted_offset<R: Rng + ?Sized>(
    rng: &mut R,
    min: u32,
    max: u32,
    decay: f64,
) -> Result<u32, SamplingError> {
    if min > max {
        return Err(SamplingError::InvalidRange { min, max });
    }
    // Negative decay can drive weights to zero or below
    if !decay.is_finite() || decay < 0.0 {
        return Err(SamplingError::InvalidDecay(decay));
    }

    let total: f64 = (min..=max).map(|d| day_weight(d, decay)).sum();
    let target = rng.gen_range(0.0..total);

    let mut cumulative = 0.0;
    for d in min..=max {
        cumulative += day_weight(d, decay);
        if cumulative >= target {
            return Ok(d);
        }
    }

    // Summation order can leave the last cumulative value a hair short of `total`
    Ok(max)
}

/// Draw a route uniformly over all directed edges of the graph.
pub fn pick_random_route<R: Rng + ?Sized>(
    rng: &mut R,
    graph: &ConnectivityGraph,
) -> Result<Route, SamplingError> {
    let edges = graph.edge_count();
    if edges == 0 {
        return Err(SamplingError::NoRouteAvailable);
    }

    let mut target = rng.gen_range(0..edges);
    for airport in graph.airports() {
        let n = airport.connections.len();
        if target < n {
            let destination = airport
                .connections
                .iter()
                .nth(target)
                .copied()
                .ok_or(SamplingError::NoRouteAvailable)?;
            return Route::new(airport.airport_code, destination)
                .map_err(|_| SamplingError::NoRouteAvailable);
        }
        target -= n;
    }

    Err(SamplingError::NoRouteAvailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AirportCode;
    use crate::graph::Airport;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn code(s: &str) -> AirportCode {
        AirportCode::parse(s).unwrap()
    }

    fn airport(c: &str, connections: &[&str]) -> Airport {
        let mut a = Airport::placeholder(code(c), c, "IT");
        a.connections = connections.iter().map(|s| code(s)).collect();
        a
    }

    #[test]
    fn weight_decays() {
        assert_eq!(day_weight(0, DEFAULT_DECAY), 1.0);
        assert!(day_weight(1, DEFAULT_DECAY) > day_weight(2, DEFAULT_DECAY));
        // At d = 365 the weight is 1 / (1 + k)
        let w = day_weight(365, DEFAULT_DECAY);
        assert!((w - 1.0 / 31.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_range() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            pick_weighted_offset(&mut rng, 10, 5, DEFAULT_DECAY),
            Err(SamplingError::InvalidRange { min: 10, max: 5 })
        );
    }

    #[test]
    fn invalid_decay() {
        let mut rng = StdRng::seed_from_u64(0);
        for decay in [-1.0, -365.0, f64::NAN, f64::INFINITY] {
            let result = pick_weighted_offset(&mut rng, 0, 365, decay);
            assert!(
                matches!(result, Err(SamplingError::InvalidDecay(_))),
                "decay {decay} gave {result:?}"
            );
        }
        assert!(pick_weighted_offset(&mut rng, 0, 365, 0.0).is_ok());
    }

    #[test]
    fn single_day_range() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..10 {
            assert_eq!(pick_weighted_offset(&mut rng, 7, 7, DEFAULT_DECAY), Ok(7));
        }
    }

    #[test]
    fn near_days_dominate() {
        let mut rng = StdRng::seed_from_u64(42);
        let draws = 20_000;
        let near = (0..draws)
            .map(|_| pick_weighted_offset(&mut rng, 0, 365, DEFAULT_DECAY).unwrap())
            .filter(|d| *d < 180)
            .count();

        // The first half of the year carries roughly 80% of the weight
        let fraction = near as f64 / draws as f64;
        assert!(fraction > 0.75 && fraction < 0.85, "fraction was {fraction}");
    }

    #[test]
    fn empty_graph_has_no_route() {
        let mut rng = StdRng::seed_from_u64(0);
        let graph = ConnectivityGraph::from_airports([airport("AAA", &[])]);
        assert_eq!(
            pick_random_route(&mut rng, &graph),
            Err(SamplingError::NoRouteAvailable)
        );
        assert_eq!(
            pick_random_route(&mut rng, &ConnectivityGraph::new()),
            Err(SamplingError::NoRouteAvailable)
        );
    }

    #[test]
    fn routes_are_edge_uniform() {
        // A has two routes, B has one
        let graph = ConnectivityGraph::from_airports([
            airport("AAA", &["CCC", "DDD"]),
            airport("BBB", &["CCC"]),
            airport("CCC", &[]),
            airport("DDD", &[]),
        ]);
        let mut rng = StdRng::seed_from_u64(7);

        let mut from_a = 0usize;
        let mut from_b = 0usize;
        for _ in 0..30_000 {
            let route = pick_random_route(&mut rng, &graph).unwrap();
            match route.origin.as_str() {
                "AAA" => from_a += 1,
                "BBB" => from_b += 1,
                other => panic!("unexpected origin {other}"),
            }
        }

        let ratio = from_a as f64 / from_b as f64;
        assert!(ratio > 1.8 && ratio < 2.2, "ratio was {ratio}");
    }

    #[test]
    fn sampled_routes_exist_in_graph() {
        let graph = ConnectivityGraph::from_airports([
            airport("AAA", &["BBB"]),
            airport("BBB", &["AAA", "CCC"]),
            airport("CCC", &[]),
        ]);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let route = pick_random_route(&mut rng, &graph).unwrap();
            assert!(graph.serves(&route.origin, &route.destination));
        }
    }

    proptest! {
        #[test]
        fn offset_stays_in_range(seed: u64, min in 0u32..400, span in 0u32..400, decay in 0.0f64..100.0) {
            let max = min + span;
            let mut rng = StdRng::seed_from_u64(seed);
            let d = pick_weighted_offset(&mut rng, min, max, decay).unwrap();
            prop_assert!(d >= min && d <= max);
        }
    }
}
