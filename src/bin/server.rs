use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use flowribs::Generation;
use flowribs::config::{ClampPolicy, FixedRotation, Params, Preset, StackAxis, SurfaceMode};
use flowribs::error::RibError;

#[derive(Deserialize)]
struct GenerateRequest {
    seed: Option<u64>,
    preset: Option<Preset>,
    // Rib array
    rib_count: Option<usize>,
    rib_length: Option<f64>,
    rib_height: Option<f64>,
    rib_thickness: Option<f64>,
    gap: Option<f64>,
    min_web: Option<f64>,
    stack_axis: Option<StackAxis>,
    fixed_rotation: Option<FixedRotation>,
    // Style
    randomness: Option<f64>,
    wildness: Option<f64>,
    smoothness: Option<f64>,
    // Surface
    mode: Option<SurfaceMode>,
    clamp_policy: Option<ClampPolicy>,
    base_amplitude: Option<f64>,
    bend_scale: Option<f64>,
    flow_angle_deg: Option<f64>,
    flow_strength: Option<f64>,
    detail: Option<f64>,
    use_mass: Option<bool>,
    mass_strength: Option<f64>,
    amp_jitter: Option<f64>,
    period_jitter: Option<f64>,
    phase_jitter: Option<f64>,
    fade_power: Option<f64>,
    // Quality
    samples: Option<usize>,
    smooth_passes: Option<usize>,
    // Tabs
    add_tabs: Option<bool>,
    tab_width: Option<f64>,
    tab_height: Option<f64>,
    tab_centers: Option<Vec<f64>>,
    // Backer
    add_backer: Option<bool>,
    backer_thickness: Option<f64>,
    backer_clearance: Option<f64>,
    backer_margin: Option<f64>,
}

impl GenerateRequest {
    /// Request fields over the preset over the defaults.
    fn into_params(self) -> Params {
        let base = Params::default();
        let mut p = match self.preset {
            Some(preset) => preset.apply(base),
            None => base,
        };
        p.seed = self.seed.unwrap_or(p.seed);
        p.rib_count = self.rib_count.unwrap_or(p.rib_count);
        p.rib_length = self.rib_length.unwrap_or(p.rib_length);
        p.rib_height = self.rib_height.unwrap_or(p.rib_height);
        p.rib_thickness = self.rib_thickness.unwrap_or(p.rib_thickness);
        p.gap = self.gap.unwrap_or(p.gap);
        p.min_web = self.min_web.unwrap_or(p.min_web);
        p.stack_axis = self.stack_axis.unwrap_or(p.stack_axis);
        p.fixed_rotation = self.fixed_rotation.or(p.fixed_rotation);
        p.randomness = self.randomness.unwrap_or(p.randomness);
        p.wildness = self.wildness.unwrap_or(p.wildness);
        p.smoothness = self.smoothness.unwrap_or(p.smoothness);
        p.mode = self.mode.unwrap_or(p.mode);
        p.clamp_policy = self.clamp_policy.unwrap_or(p.clamp_policy);
        p.base_amplitude = self.base_amplitude.unwrap_or(p.base_amplitude);
        p.bend_scale = self.bend_scale.unwrap_or(p.bend_scale);
        p.flow_angle = self.flow_angle_deg.map(f64::to_radians).unwrap_or(p.flow_angle);
        p.flow_strength = self.flow_strength.unwrap_or(p.flow_strength);
        p.detail = self.detail.unwrap_or(p.detail);
        p.use_mass = self.use_mass.unwrap_or(p.use_mass);
        p.mass_strength = self.mass_strength.unwrap_or(p.mass_strength);
        p.amp_jitter = self.amp_jitter.unwrap_or(p.amp_jitter);
        p.period_jitter = self.period_jitter.unwrap_or(p.period_jitter);
        p.phase_jitter = self.phase_jitter.unwrap_or(p.phase_jitter);
        p.fade_power = self.fade_power.or(p.fade_power);
        p.samples = self.samples.unwrap_or(p.samples);
        p.smooth_passes = self.smooth_passes.unwrap_or(p.smooth_passes);
        p.tabs.enabled = self.add_tabs.unwrap_or(p.tabs.enabled);
        p.tabs.width = self.tab_width.unwrap_or(p.tabs.width);
        p.tabs.height = self.tab_height.unwrap_or(p.tabs.height);
        if let Some(centers) = self.tab_centers {
            p.tabs.centers = centers;
        }
        p.backer.enabled = self.add_backer.unwrap_or(p.backer.enabled);
        p.backer.thickness = self.backer_thickness.unwrap_or(p.backer.thickness);
        p.backer.clearance = self.backer_clearance.unwrap_or(p.backer.clearance);
        p.backer.margin = self.backer_margin.unwrap_or(p.backer.margin);
        p
    }
}

#[derive(Serialize)]
struct PresetEntry {
    id: Preset,
    label: &'static str,
}

async fn presets_handler() -> Json<Vec<PresetEntry>> {
    Json(
        Preset::ALL
            .into_iter()
            .map(|id| PresetEntry { id, label: id.label() })
            .collect(),
    )
}

async fn generate_handler(
    Json(req): Json<GenerateRequest>,
) -> Result<Json<Generation>, (StatusCode, String)> {
    let params = req.into_params();

    let result = tokio::task::spawn_blocking(move || flowribs::generate(&params))
        .await
        .map_err(|e| {
            error!("generation task failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "generation task failed".to_string())
        })?;

    match result {
        Ok(run) => Ok(Json(run)),
        Err(e @ RibError::InvalidParameter { .. }) => Err((StatusCode::BAD_REQUEST, e.to_string())),
        Err(e) => Err((StatusCode::UNPROCESSABLE_ENTITY, e.to_string())),
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let app = Router::new()
        .route("/api/generate", post(generate_handler))
        .route("/api/presets", get(presets_handler))
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("flowribs server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_request_is_the_defaults() {
        let req: GenerateRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.into_params(), Params::default());
    }

    #[test]
    fn request_reaches_every_nested_field() {
        let body = r#"{
            "clamp_policy": "raw_amplitude",
            "fixed_rotation": { "axis": "z", "angle": -1.5 },
            "period_jitter": 0.3,
            "phase_jitter": 0.6,
            "add_backer": true,
            "backer_thickness": 0.75,
            "backer_clearance": 0.05,
            "backer_margin": 3.0
        }"#;
        let req: GenerateRequest = serde_json::from_str(body).unwrap();
        let p = req.into_params();
        assert_eq!(p.clamp_policy, ClampPolicy::RawAmplitude);
        assert_eq!(p.fixed_rotation, Some(FixedRotation { axis: StackAxis::Z, angle: -1.5 }));
        assert_eq!(p.period_jitter, 0.3);
        assert_eq!(p.phase_jitter, 0.6);
        assert!(p.backer.enabled);
        assert_eq!(p.backer.thickness, 0.75);
        assert_eq!(p.backer.clearance, 0.05);
        assert_eq!(p.backer.margin, 3.0);
    }

    #[test]
    fn request_fields_override_the_preset() {
        let body = r#"{ "preset": "carved_terrain", "randomness": 0.1 }"#;
        let req: GenerateRequest = serde_json::from_str(body).unwrap();
        let p = req.into_params();
        assert_eq!(p.randomness, 0.1);
        assert!(p.use_mass);
    }
}
