pub mod backer;
pub mod config;
pub mod error;
pub mod layout;
pub mod profile;
pub mod rng;
pub mod sampler;
pub mod surface;
pub mod tabs;
pub mod waves;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use backer::BackerPanel;
use config::{Params, SurfaceMode};
use error::RibError;
use layout::{RigidTransform, placement};
use profile::ProfilePolygon;
use sampler::SampleSeries;
use surface::Surface;
use tabs::TabSpan;

/// Everything the solid builder needs for one rib.
#[derive(Clone, Debug, Serialize)]
pub struct RibOutput {
    pub index: usize,
    /// Smoothed free edge (height mode) or centerline (offset mode).
    pub samples: SampleSeries,
    /// Outline in the rib's local plane.
    pub profile: ProfilePolygon,
    pub extrude_distance: f64,
    pub placement: RigidTransform,
}

#[derive(Clone, Debug, Serialize)]
pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct Generation {
    /// The clamped parameters the run actually used.
    pub params: Params,
    /// Successfully built ribs, sorted by index.
    pub ribs: Vec<RibOutput>,
    /// Per-rib failures, sorted by rib index.
    #[serde(serialize_with = "serialize_errors")]
    pub failures: Vec<RibError>,
    /// Non-fatal conditions, e.g. an empty tab configuration.
    #[serde(serialize_with = "serialize_errors")]
    pub warnings: Vec<RibError>,
    /// Notch spans shared by every rib; empty when tabs are inactive.
    pub spans: Vec<TabSpan>,
    pub backer: Option<BackerPanel>,
    /// Set when the run was stopped before every rib was attempted.
    pub cancelled: bool,
    pub timings: Vec<Timing>,
}

fn serialize_errors<S: serde::Serializer>(errors: &[RibError], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(errors.iter().map(|e| e.to_string()))
}

/// Sample, smooth and close one rib. Depends only on its inputs, so any
/// number of ribs can run concurrently against the same `surface`.
pub fn build_rib(
    surface: &Surface,
    params: &Params,
    spans: &[TabSpan],
    index: usize,
) -> Result<RibOutput, RibError> {
    let rib = surface.rib(index);
    let samples = sampler::smooth(
        sampler::sample(|y| rib.value_at(y), params.rib_length, params.samples),
        params.smooth_passes,
    );
    let (profile, extrude_distance) = match params.mode {
        SurfaceMode::Height => (
            profile::build_profile(index, &samples, spans, params.tabs.height)?,
            params.rib_thickness,
        ),
        SurfaceMode::Offset => (
            profile::build_band(index, &samples, 0.5 * params.rib_thickness)?,
            params.rib_height,
        ),
    };
    Ok(RibOutput {
        index,
        samples,
        profile,
        extrude_distance,
        placement: placement(index, params.pitch(), params.stack_axis, params.fixed_rotation),
    })
}

pub fn generate(params: &Params) -> Result<Generation, RibError> {
    generate_with_cancel(params, &AtomicBool::new(false))
}

/// Full run. Only non-finite parameters abort the whole run; rib failures
/// are collected and the remaining ribs still build. `cancel` is polled
/// before each rib.
pub fn generate_with_cancel(params: &Params, cancel: &AtomicBool) -> Result<Generation, RibError> {
    let mut timings = Vec::new();
    let mut warnings = Vec::new();
    let total_start = Instant::now();

    // 1. Clamp every bounded field
    let t = Instant::now();
    let params = params.clamped()?;
    timings.push(Timing {
        name: "validate",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 2. Shared fields, built once for every rib
    let t = Instant::now();
    let surface = Surface::new(&params);
    timings.push(Timing {
        name: "surface",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 3. Tab spans, shared by every rib
    let t = Instant::now();
    let spans = if !params.tabs.enabled {
        Vec::new()
    } else if params.mode == SurfaceMode::Offset {
        warn!("tabs are not cut in offset mode; ignoring tab configuration");
        Vec::new()
    } else {
        let spans = tabs::build_spans(&params.tabs.centers, params.tabs.width, params.rib_length);
        if spans.is_empty() {
            warn!("{}", RibError::EmptyTabConfiguration);
            warnings.push(RibError::EmptyTabConfiguration);
        }
        spans
    };
    timings.push(Timing {
        name: "tab_spans",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 4. Ribs (parallel, order restored by index)
    let t = Instant::now();
    let results: Vec<Option<Result<RibOutput, RibError>>> = (0..params.rib_count)
        .into_par_iter()
        .map(|i| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            Some(build_rib(&surface, &params, &spans, i))
        })
        .collect();
    let mut ribs = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    let mut cancelled = false;
    for result in results {
        match result {
            Some(Ok(rib)) => ribs.push(rib),
            Some(Err(e)) => {
                warn!("{e}");
                failures.push(e);
            }
            None => cancelled = true,
        }
    }
    timings.push(Timing {
        name: "ribs",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 5. Backer plate
    let t = Instant::now();
    let backer = if params.backer.enabled && params.mode == SurfaceMode::Height {
        backer::build_backer(&params, &spans)
    } else {
        None
    };
    timings.push(Timing {
        name: "backer",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
    timings.push(Timing {
        name: "TOTAL",
        ms: total_ms,
    });
    for timing in &timings {
        debug!(stage = timing.name, ms = timing.ms, "stage finished");
    }
    info!(
        built = ribs.len(),
        failed = failures.len(),
        cancelled,
        seed = params.seed,
        "generation finished"
    );

    Ok(Generation {
        params,
        ribs,
        failures,
        warnings,
        spans,
        backer,
        cancelled,
        timings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_run_builds_nothing() {
        let cancel = AtomicBool::new(true);
        let params = Params { rib_count: 5, ..Params::default() };
        let run = generate_with_cancel(&params, &cancel).unwrap();
        assert!(run.cancelled);
        assert!(run.ribs.is_empty());
        assert!(run.failures.is_empty());
    }

    #[test]
    fn every_failure_is_reported() {
        let mut p = Params { rib_count: 12, ..Params::default() };
        p.tabs.centers = vec![20.0, 21.0];
        let run = generate(&p).unwrap();
        assert!(run.ribs.is_empty());
        let failed: Vec<usize> = run.failures.iter().filter_map(RibError::rib).collect();
        assert_eq!(failed, (0..12).collect::<Vec<_>>());
        assert!(run.failures.iter().all(|e| matches!(e, RibError::OverlappingTabSpans { .. })));
    }

    #[test]
    fn rib_results_are_independent_of_the_run() {
        let p = Params { rib_count: 6, ..Params::default() }.clamped().unwrap();
        let surface = Surface::new(&p);
        let spans = tabs::build_spans(&p.tabs.centers, p.tabs.width, p.rib_length);
        let alone = build_rib(&surface, &p, &spans, 4).unwrap();
        let run = generate(&p).unwrap();
        assert_eq!(run.ribs[4].profile, alone.profile);
        assert_eq!(run.ribs[4].samples, alone.samples);
    }

    #[test]
    fn empty_tab_configuration_is_a_warning() {
        let mut p = Params { rib_count: 2, ..Params::default() };
        p.tabs.centers = vec![200.0];
        let run = generate(&p).unwrap();
        assert_eq!(run.warnings, vec![RibError::EmptyTabConfiguration]);
        assert_eq!(run.ribs.len(), 2);
        assert!(run.spans.is_empty());
    }

    #[test]
    fn generation_serializes() {
        let run = generate(&Params { rib_count: 2, ..Params::default() }).unwrap();
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["ribs"].as_array().unwrap().len(), 2);
        assert_eq!(json["params"]["rib_count"], 2);
    }
}
