use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RibError;

/// Axis the ribs are stacked along in the assembled sculpture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackAxis {
    X,
    Y,
    Z,
}

impl StackAxis {
    pub fn unit(self) -> [f64; 3] {
        match self {
            StackAxis::X => [1.0, 0.0, 0.0],
            StackAxis::Y => [0.0, 1.0, 0.0],
            StackAxis::Z => [0.0, 0.0, 1.0],
        }
    }
}

/// Which physical quantity the synthesized surface drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceMode {
    /// Height of the free edge above a flat back baseline.
    Height,
    /// Lateral offset of the rib centerline in the stacking direction.
    Offset,
}

/// How amplitude is kept inside the physical range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClampPolicy {
    /// Clamp only the final combined value.
    FinalValue,
    /// Also clamp the raw amplitude to the half range before combining.
    RawAmplitude,
}

/// Fixed rotation applied to every rib's placement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixedRotation {
    pub axis: StackAxis,
    /// Radians, right-handed about `axis`.
    pub angle: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabParams {
    pub enabled: bool,
    pub width: f64,
    /// Notch depth below the baseline.
    pub height: f64,
    /// Notch centers measured along the rib length.
    pub centers: Vec<f64>,
}

impl Default for TabParams {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 4.0,
            height: 0.675,
            centers: vec![16.0, 32.0],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackerParams {
    pub enabled: bool,
    pub thickness: f64,
    pub clearance: f64,
    pub margin: f64,
}

impl Default for BackerParams {
    fn default() -> Self {
        Self {
            enabled: false,
            thickness: 0.5,
            clearance: 0.02,
            margin: 2.0,
        }
    }
}

/// All tunable parameters. Lengths in inches, angles in radians.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub seed: u64,

    // Rib array
    pub rib_count: usize,
    pub rib_length: f64,
    pub rib_height: f64,
    pub rib_thickness: f64,
    pub gap: f64,
    /// Least material kept between the back baseline and the free edge.
    pub min_web: f64,
    pub stack_axis: StackAxis,
    pub fixed_rotation: Option<FixedRotation>,

    // Style
    pub randomness: f64,
    pub wildness: f64,
    pub smoothness: f64,

    // Surface
    pub mode: SurfaceMode,
    pub clamp_policy: ClampPolicy,
    pub base_amplitude: f64,
    pub bend_scale: f64,
    pub flow_angle: f64,
    pub flow_strength: f64,
    pub detail: f64,
    pub use_mass: bool,
    pub mass_strength: f64,
    /// Per-rib amplitude variation, scaled by randomness.
    pub amp_jitter: f64,
    /// Per-rib stretch of the wave period, scaled by randomness.
    pub period_jitter: f64,
    /// Per-rib phase shift along the rib, scaled by randomness.
    pub phase_jitter: f64,
    /// Overrides the smoothness-derived end-fade exponent.
    pub fade_power: Option<f64>,

    // Quality
    pub samples: usize,
    pub smooth_passes: usize,

    pub tabs: TabParams,
    pub backer: BackerParams,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            seed: 12345,
            rib_count: 30,
            rib_length: 48.0,
            rib_height: 4.0,
            rib_thickness: 0.75,
            gap: 1.0,
            min_web: 0.5,
            stack_axis: StackAxis::Y,
            fixed_rotation: None,
            randomness: 0.35,
            wildness: 0.25,
            smoothness: 0.80,
            mode: SurfaceMode::Height,
            clamp_policy: ClampPolicy::FinalValue,
            base_amplitude: 1.10,
            bend_scale: 72.0,
            flow_angle: 18.0_f64.to_radians(),
            flow_strength: 0.55,
            detail: 0.35,
            use_mass: false,
            mass_strength: 0.25,
            amp_jitter: 0.0,
            period_jitter: 0.0,
            phase_jitter: 0.0,
            fade_power: None,
            samples: 420,
            smooth_passes: 2,
            tabs: TabParams::default(),
            backer: BackerParams::default(),
        }
    }
}

fn clamp_field(name: &'static str, value: f64, lo: f64, hi: f64) -> Result<f64, RibError> {
    if !value.is_finite() {
        return Err(RibError::InvalidParameter { name, value });
    }
    let clamped = value.clamp(lo, hi);
    if clamped != value {
        debug!(name, value, clamped, "parameter clamped");
    }
    Ok(clamped)
}

fn clamp_count(name: &'static str, value: usize, lo: usize, hi: usize) -> usize {
    let clamped = value.clamp(lo, hi);
    if clamped != value {
        debug!(name, value, clamped, "parameter clamped");
    }
    clamped
}

impl Params {
    /// Center-to-center spacing between adjacent ribs.
    pub fn pitch(&self) -> f64 {
        self.rib_thickness + self.gap
    }

    /// Copy with every bounded field forced into its documented range.
    /// Non-finite values cannot be clamped meaningfully and are rejected.
    pub fn clamped(&self) -> Result<Params, RibError> {
        let rib_height = clamp_field("rib_height", self.rib_height, 0.25, 12.0)?;
        let fade_power = match self.fade_power {
            Some(p) => Some(clamp_field("fade_power", p, 1.0, 4.0)?),
            None => None,
        };
        let fixed_rotation = match self.fixed_rotation {
            Some(r) => Some(FixedRotation {
                axis: r.axis,
                angle: clamp_field("fixed_rotation.angle", r.angle, -PI, PI)?,
            }),
            None => None,
        };
        let centers = self
            .tabs
            .centers
            .iter()
            .map(|&c| {
                if c.is_finite() {
                    Ok(c)
                } else {
                    Err(RibError::InvalidParameter { name: "tabs.centers", value: c })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Params {
            seed: self.seed,
            rib_count: clamp_count("rib_count", self.rib_count, 1, 600),
            rib_length: clamp_field("rib_length", self.rib_length, 1.0, 144.0)?,
            rib_height,
            rib_thickness: clamp_field("rib_thickness", self.rib_thickness, 0.25, 2.0)?,
            gap: clamp_field("gap", self.gap, 0.0, 6.0)?,
            min_web: clamp_field("min_web", self.min_web, 0.0, rib_height * 0.5)?,
            stack_axis: self.stack_axis,
            fixed_rotation,
            randomness: clamp_field("randomness", self.randomness, 0.0, 1.0)?,
            wildness: clamp_field("wildness", self.wildness, 0.0, 1.0)?,
            smoothness: clamp_field("smoothness", self.smoothness, 0.0, 1.0)?,
            mode: self.mode,
            clamp_policy: self.clamp_policy,
            base_amplitude: clamp_field("base_amplitude", self.base_amplitude, 0.0, 12.0)?,
            bend_scale: clamp_field("bend_scale", self.bend_scale, 6.0, 240.0)?,
            flow_angle: clamp_field("flow_angle", self.flow_angle, -PI, PI)?,
            flow_strength: clamp_field("flow_strength", self.flow_strength, 0.0, 1.0)?,
            detail: clamp_field("detail", self.detail, 0.0, 1.0)?,
            use_mass: self.use_mass,
            mass_strength: clamp_field("mass_strength", self.mass_strength, 0.0, 1.0)?,
            amp_jitter: clamp_field("amp_jitter", self.amp_jitter, 0.0, 1.0)?,
            period_jitter: clamp_field("period_jitter", self.period_jitter, 0.0, 1.0)?,
            phase_jitter: clamp_field("phase_jitter", self.phase_jitter, 0.0, 1.0)?,
            fade_power,
            samples: clamp_count("samples", self.samples, 80, 1200),
            smooth_passes: clamp_count("smooth_passes", self.smooth_passes, 0, 10),
            tabs: TabParams {
                enabled: self.tabs.enabled,
                width: clamp_field("tabs.width", self.tabs.width, 0.5, 12.0)?,
                height: clamp_field("tabs.height", self.tabs.height, 0.1, 3.0)?,
                centers,
            },
            backer: BackerParams {
                enabled: self.backer.enabled,
                thickness: clamp_field("backer.thickness", self.backer.thickness, 0.1, 3.0)?,
                clearance: clamp_field("backer.clearance", self.backer.clearance, 0.0, 0.5)?,
                margin: clamp_field("backer.margin", self.backer.margin, 0.0, 24.0)?,
            },
        })
    }
}

/// Parse a comma-separated list of tab centers, e.g. `"16, 32"`.
/// Empty entries are skipped.
pub fn parse_tab_centers(text: &str) -> Result<Vec<f64>, RibError> {
    text.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>()
                .map_err(|_| RibError::TabCenterParse(part.to_string()))
        })
        .collect()
}

/// Named style presets. Each only touches the style knobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    CleanDunes,
    GalleryFlow,
    CarvedTerrain,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::CleanDunes, Preset::GalleryFlow, Preset::CarvedTerrain];

    pub fn label(self) -> &'static str {
        match self {
            Preset::CleanDunes => "Clean Dunes",
            Preset::GalleryFlow => "Gallery Flow",
            Preset::CarvedTerrain => "Carved Terrain",
        }
    }

    /// Accepts the label, the snake_case name, or a kebab-case name.
    pub fn from_name(name: &str) -> Option<Preset> {
        let norm = name.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Preset::ALL.into_iter().find(|p| {
            p.label().to_ascii_lowercase().replace(' ', "_") == norm
        })
    }

    pub fn apply(self, mut params: Params) -> Params {
        let (randomness, wildness, smoothness, detail, flow_strength, bend_scale, mass) =
            match self {
                Preset::CleanDunes => (0.25, 0.15, 0.90, 0.20, 0.45, 90.0, None),
                Preset::GalleryFlow => (0.35, 0.30, 0.80, 0.35, 0.55, 72.0, None),
                Preset::CarvedTerrain => (0.55, 0.45, 0.60, 0.65, 0.65, 48.0, Some(0.30)),
            };
        params.randomness = randomness;
        params.wildness = wildness;
        params.smoothness = smoothness;
        params.detail = detail;
        params.flow_strength = flow_strength;
        params.bend_scale = bend_scale;
        params.use_mass = mass.is_some();
        if let Some(strength) = mass {
            params.mass_strength = strength;
        }
        params
    }
}
