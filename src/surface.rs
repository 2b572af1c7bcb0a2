//! The profile-defining surface: one scalar function of (rib, position along
//! rib) shared by every rib in a run.
//!
//! All random structure is drawn once in [`Surface::new`]. Ribs are cheap
//! views ([`RibSurface`]) that only add a stacking position and per-rib
//! jitter, which is what makes neighbouring ribs read as slices of one
//! continuous surface.

use std::f64::consts::{PI, TAU};

use crate::config::{ClampPolicy, Params, SurfaceMode};
use crate::rng::{Rng, rib_seed, sub_seed};
use crate::waves::{WarpedField, WaveField};

const SALT_COARSE: u64 = 0xC0A2_5E00_F10E_0001;
const SALT_FINE: u64 = 0xF1E0_DE7A_11ED_0002;
const SALT_WARP_U: u64 = 0xDA12_BEEF_0000_CAFE;
const SALT_WARP_V: u64 = 0xDA12_BEEF_0001_CAFE;
const SALT_MASS: u64 = 0x3A55_B0B0_0000_0005;

/// Fine waves relative to the bend scale.
const FINE_WAVELENGTH: f64 = 0.35;
/// Warp waves relative to the bend scale; longer than the base so the warp
/// bends crests rather than adding ripples.
const WARP_WAVELENGTH: f64 = 1.5;
/// Warp displacement at strength 1, relative to the bend scale.
const WARP_SCALE: f64 = 0.25;
const FINE_COMPONENTS: usize = 5;
const WARP_COMPONENTS: usize = 2;
/// Lateral offsets never exceed this share of the gap, so adjacent bands
/// keep at least a tenth of the gap between them.
pub const OFFSET_GAP_FRACTION: f64 = 0.45;
/// Floor on the per-rib period factor.
const MIN_PERIOD_FACTOR: f64 = 0.25;

/// Rotation of the (stacking, length) domain into flow space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowBasis {
    cos: f64,
    sin: f64,
}

impl FlowBasis {
    pub fn new(angle: f64) -> Self {
        Self { cos: angle.cos(), sin: angle.sin() }
    }

    #[inline]
    pub fn to_flow(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.cos + y * self.sin, -x * self.sin + y * self.cos)
    }
}

/// `sin(pi*t)^power`, zero at both ends of the rib.
#[inline]
pub fn end_envelope(t: f64, power: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    (PI * t).sin().max(0.0).powf(power)
}

/// End-fade exponent: the explicit override, or one derived from smoothness.
pub fn fade_power(smoothness: f64, explicit: Option<f64>) -> f64 {
    explicit.unwrap_or(1.4 + 0.8 * smoothness)
}

/// Broad Gaussian bulge in flow space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MassBump {
    pub center: [f64; 2],
    pub sigma: f64,
    pub weight: f64,
}

impl MassBump {
    #[inline]
    pub fn eval(&self, u: f64, v: f64) -> f64 {
        let du = u - self.center[0];
        let dv = v - self.center[1];
        self.weight * (-(du * du + dv * dv) / (2.0 * self.sigma * self.sigma)).exp()
    }
}

/// Value range the synthesized output is clamped into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Levels {
    pub floor: f64,
    pub ceiling: f64,
    /// Value at the rib ends, where the envelope is zero.
    pub baseline: f64,
}

impl Levels {
    fn for_params(params: &Params) -> Self {
        match params.mode {
            SurfaceMode::Height => Levels {
                floor: params.min_web,
                ceiling: params.rib_height,
                baseline: 0.5 * (params.min_web + params.rib_height),
            },
            SurfaceMode::Offset => {
                let limit = OFFSET_GAP_FRACTION * params.gap;
                Levels { floor: -limit, ceiling: limit, baseline: 0.0 }
            }
        }
    }

    fn half_range(&self) -> f64 {
        (self.ceiling - self.baseline).min(self.baseline - self.floor)
    }
}

#[derive(Clone, Debug)]
pub struct Surface {
    seed: u64,
    basis: FlowBasis,
    coarse: WarpedField,
    fine: WarpedField,
    fine_weight: f64,
    fade_power: f64,
    mass: Option<MassBump>,
    amplitude: f64,
    jitter: f64,
    period_jitter: f64,
    phase_jitter: f64,
    bend_scale: f64,
    pitch: f64,
    rib_length: f64,
    levels: Levels,
}

impl Surface {
    /// Build every shared field for a run. `params` must already be clamped.
    pub fn new(params: &Params) -> Self {
        let seed = params.seed;
        let bend = params.bend_scale;
        let pitch = params.pitch();
        let basis = FlowBasis::new(params.flow_angle);

        let warp_wavelength = bend * WARP_WAVELENGTH;
        let warp_field = |salt| {
            WaveField::build(sub_seed(seed, salt), WARP_COMPONENTS, warp_wavelength)
        };
        let warp_u = warp_field(SALT_WARP_U);
        let warp_v = warp_field(SALT_WARP_V);
        let warp_strength = params.wildness * (1.0 - 0.5 * params.smoothness);
        let warp_scale = WARP_SCALE * bend;

        let coarse_count = 3 + (params.wildness * 3.0).round() as usize;
        let coarse = WarpedField::new(
            WaveField::build(sub_seed(seed, SALT_COARSE), coarse_count, bend),
            warp_u.clone(),
            warp_v.clone(),
            warp_strength,
            warp_scale,
        );
        let fine = WarpedField::new(
            WaveField::build(sub_seed(seed, SALT_FINE), FINE_COMPONENTS, bend * FINE_WAVELENGTH),
            warp_u,
            warp_v,
            warp_strength,
            warp_scale,
        );
        let fine_weight =
            params.detail * (0.35 + 0.65 * params.wildness) * (1.0 - 0.75 * params.smoothness);

        let span_x = params.rib_count as f64 * pitch;
        let span_y = params.rib_length;
        let mass = if params.use_mass && params.mass_strength > 0.0 {
            let mut rng = Rng::new(sub_seed(seed, SALT_MASS));
            let cx = span_x * rng.range_f64(0.35, 0.65);
            let cy = span_y * rng.range_f64(0.35, 0.65);
            let sigma = (span_x * span_y).sqrt().max(1e-3) * rng.range_f64(0.14, 0.24);
            let (cu, cv) = basis.to_flow(cx, cy);
            Some(MassBump { center: [cu, cv], sigma, weight: params.mass_strength })
        } else {
            None
        };

        let levels = Levels::for_params(params);
        let mut amplitude =
            params.base_amplitude * (0.55 + 0.75 * params.randomness) * params.flow_strength;
        if params.clamp_policy == ClampPolicy::RawAmplitude {
            amplitude = amplitude.min(levels.half_range());
        }

        Self {
            seed,
            basis,
            coarse,
            fine,
            fine_weight,
            fade_power: fade_power(params.smoothness, params.fade_power),
            mass,
            amplitude,
            jitter: params.amp_jitter * params.randomness,
            period_jitter: params.period_jitter * params.randomness,
            phase_jitter: params.phase_jitter * params.randomness,
            bend_scale: bend,
            pitch,
            rib_length: params.rib_length,
            levels,
        }
    }

    pub fn levels(&self) -> Levels {
        self.levels
    }

    pub fn mass(&self) -> Option<MassBump> {
        self.mass
    }

    /// Mixed field before the end envelope. `y` is in field coordinates.
    fn field(&self, x: f64, y: f64) -> f64 {
        let (u, v) = self.basis.to_flow(x, y);
        let mut s = self.coarse.sample(u, v);
        if self.fine_weight > 0.0 {
            s = (s + self.fine_weight * self.fine.sample(u, v)) / (1.0 + self.fine_weight);
        }
        if let Some(mass) = &self.mass {
            s += mass.eval(u, v);
        }
        s
    }

    fn envelope(&self, y: f64) -> f64 {
        let t = if self.rib_length > 0.0 { y / self.rib_length } else { 0.5 };
        end_envelope(t, self.fade_power)
    }

    /// Enveloped, unscaled signal at stacking position `x`, length position `y`.
    pub fn signal(&self, x: f64, y: f64) -> f64 {
        self.field(x, y) * self.envelope(y)
    }

    /// View for rib `index`, carrying its stacking position and jitter.
    ///
    /// Draw order on the rib stream is amplitude, period, phase; all three are
    /// always drawn so enabling one jitter never shifts another.
    pub fn rib(&self, index: usize) -> RibSurface<'_> {
        let mut rng = Rng::new(rib_seed(self.seed, index));
        let amplitude = (self.amplitude * (1.0 + self.jitter * rng.signed())).max(0.0);
        let period = (1.0 + self.period_jitter * rng.signed()).max(MIN_PERIOD_FACTOR);
        let phase = rng.range_f64(0.0, TAU) * self.phase_jitter;
        RibSurface {
            surface: self,
            index,
            x: index as f64 * self.pitch,
            amplitude,
            stretch: 1.0 / period,
            shift: phase / TAU * self.bend_scale,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RibSurface<'a> {
    surface: &'a Surface,
    pub index: usize,
    /// Position along the stacking axis.
    pub x: f64,
    pub amplitude: f64,
    /// Scale applied to the length coordinate before sampling the field.
    pub stretch: f64,
    /// Shift along the length coordinate, in the same units as the rib.
    pub shift: f64,
}

impl RibSurface<'_> {
    /// Height above the back (or lateral offset) at length position `y`,
    /// clamped into the surface's levels.
    pub fn value_at(&self, y: f64) -> f64 {
        let levels = &self.surface.levels;
        let surface = self.surface;
        let s = surface.field(self.x, y * self.stretch + self.shift) * surface.envelope(y);
        let raw = levels.baseline + self.amplitude * s;
        raw.clamp(levels.floor, levels.ceiling)
    }

    pub fn baseline(&self) -> f64 {
        self.surface.levels.baseline
    }
}
