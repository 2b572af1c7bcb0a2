use std::f64::consts::{PI, TAU};

use serde::Serialize;

use crate::rng::Rng;

/// Smallest normalization divisor; keeps an all-zero draw from dividing by 0.
const MIN_NORM: f64 = 1e-9;

/// One plane wave. Drawn once, never mutated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct WaveComponent {
    /// Unit direction of travel.
    pub dir: [f64; 2],
    pub wavelength: f64,
    pub amplitude: f64,
    pub phase: f64,
}

impl WaveComponent {
    #[inline]
    fn eval(&self, u: f64, v: f64) -> f64 {
        let along = u * self.dir[0] + v * self.dir[1];
        self.amplitude * (TAU * along / self.wavelength + self.phase).sin()
    }
}

/// Normalized sum of plane waves; output stays within [-1, 1] for any
/// component count.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WaveField {
    pub components: Vec<WaveComponent>,
    pub norm: f64,
}

impl WaveField {
    /// Draw `count` components from the stream seeded with `seed`.
    pub fn build(seed: u64, count: usize, base_wavelength: f64) -> Self {
        let mut rng = Rng::new(seed);
        let components: Vec<WaveComponent> = (0..count)
            .map(|_| {
                let angle = rng.range_f64(-PI, PI);
                let wavelength = base_wavelength * rng.range_f64(0.35, 1.25);
                let amplitude = rng.range_f64(0.35, 1.0);
                let phase = rng.range_f64(0.0, TAU);
                WaveComponent {
                    dir: [angle.cos(), angle.sin()],
                    wavelength,
                    amplitude,
                    phase,
                }
            })
            .collect();
        let norm = components
            .iter()
            .map(|c| c.amplitude.abs())
            .sum::<f64>()
            .max(MIN_NORM);
        Self { components, norm }
    }

    #[inline]
    pub fn sample(&self, u: f64, v: f64) -> f64 {
        let sum: f64 = self.components.iter().map(|c| c.eval(u, v)).sum();
        sum / self.norm
    }
}

/// A base field whose input coordinates are pushed around by two other
/// fields before it is sampled.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WarpedField {
    pub base: WaveField,
    pub warp_u: WaveField,
    pub warp_v: WaveField,
    /// Dimensionless, 0 disables warping.
    pub strength: f64,
    /// Displacement in domain units at strength 1.
    pub scale: f64,
}

impl WarpedField {
    pub fn new(
        base: WaveField,
        warp_u: WaveField,
        warp_v: WaveField,
        strength: f64,
        scale: f64,
    ) -> Self {
        Self { base, warp_u, warp_v, strength, scale }
    }

    #[inline]
    pub fn sample(&self, u: f64, v: f64) -> f64 {
        let k = self.strength * self.scale;
        if k == 0.0 {
            return self.base.sample(u, v);
        }
        let du = k * self.warp_u.sample(u, v);
        let dv = k * self.warp_v.sample(u, v);
        self.base.sample(u + du, v + dv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_is_deterministic() {
        let a = WaveField::build(42, 6, 72.0);
        let b = WaveField::build(42, 6, 72.0);
        assert_eq!(a, b);
        for i in 0..50 {
            let (u, v) = (i as f64 * 1.3, i as f64 * -0.7);
            assert_eq!(a.sample(u, v).to_bits(), b.sample(u, v).to_bits());
        }
    }

    #[test]
    fn components_respect_draw_ranges() {
        let f = WaveField::build(9, 64, 10.0);
        assert_eq!(f.components.len(), 64);
        for c in &f.components {
            assert!((3.5..12.5).contains(&c.wavelength));
            assert!((0.35..1.0).contains(&c.amplitude));
            assert!((0.0..TAU).contains(&c.phase));
            let len = (c.dir[0] * c.dir[0] + c.dir[1] * c.dir[1]).sqrt();
            assert!((len - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn output_is_normalized() {
        for count in [1, 3, 12, 40] {
            let f = WaveField::build(count as u64, count, 20.0);
            for i in 0..200 {
                let s = f.sample(i as f64 * 0.37, i as f64 * 1.91);
                assert!(s.abs() <= 1.0 + 1e-12, "count={count} s={s}");
            }
        }
    }

    #[test]
    fn empty_field_is_zero() {
        let f = WaveField::build(1, 0, 20.0);
        assert_eq!(f.sample(3.0, 4.0), 0.0);
    }

    #[test]
    fn zero_strength_warp_is_identity() {
        let base = WaveField::build(1, 5, 30.0);
        let warped = WarpedField::new(
            base.clone(),
            WaveField::build(2, 3, 50.0),
            WaveField::build(3, 3, 50.0),
            0.0,
            18.0,
        );
        for i in 0..100 {
            let (u, v) = (i as f64 * 0.91 - 20.0, i as f64 * 0.43);
            assert_eq!(warped.sample(u, v).to_bits(), base.sample(u, v).to_bits());
        }
    }

    #[test]
    fn nonzero_warp_changes_samples() {
        let base = WaveField::build(1, 5, 30.0);
        let warped = WarpedField::new(
            base.clone(),
            WaveField::build(2, 3, 50.0),
            WaveField::build(3, 3, 50.0),
            1.0,
            18.0,
        );
        let differs = (0..50).any(|i| {
            let (u, v) = (i as f64 * 2.1, i as f64 * 0.9);
            (warped.sample(u, v) - base.sample(u, v)).abs() > 1e-6
        });
        assert!(differs);
    }
}
