//! Backer plate the rib tabs plug into.
//!
//! Plate coordinates: x runs along the rib length, y across the stack, and
//! the plate occupies z in [-thickness, 0] so its front face meets the rib
//! backs.

use serde::Serialize;
use tracing::warn;

use crate::config::Params;
use crate::tabs::TabSpan;

/// Axis-aligned rectangle in plate coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn corners(&self) -> [[f64; 2]; 4] {
        [[self.x0, self.y0], [self.x1, self.y0], [self.x1, self.y1], [self.x0, self.y1]]
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x0 >= self.x0 && other.x1 <= self.x1 && other.y0 >= self.y0 && other.y1 <= self.y1
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BackerPanel {
    pub outline: Rect,
    /// One pocket per rib per tab span, rib-major.
    pub pockets: Vec<Rect>,
    pub thickness: f64,
    /// z of the plate's back face; the front face is at 0.
    pub z_offset: f64,
}

/// Lay out the backer for `params` (already clamped) and the run's spans.
/// `None` when there is nothing to plug into.
pub fn build_backer(params: &Params, spans: &[TabSpan]) -> Option<BackerPanel> {
    if !params.tabs.enabled || spans.is_empty() {
        warn!("backer requested but no tab spans are active; skipping backer");
        return None;
    }
    let backer = &params.backer;
    let length = params.rib_length;
    let pitch = params.pitch();
    let thickness = params.rib_thickness;
    let clear = backer.clearance;

    let min_x = spans.iter().map(|s| s.start).fold(f64::INFINITY, f64::min);
    let max_x = spans.iter().map(|s| s.end).fold(f64::NEG_INFINITY, f64::max);
    let x0 = (min_x - backer.margin).max(0.0);
    let x1 = (max_x + backer.margin).min(length);
    if x1 <= x0 {
        warn!(x0, x1, "backer length collapsed; skipping backer");
        return None;
    }
    let stack_span = params.rib_count.saturating_sub(1) as f64 * pitch + thickness;
    let outline = Rect { x0, y0: 0.0, x1, y1: stack_span };

    let mut pockets = Vec::with_capacity(params.rib_count * spans.len());
    for i in 0..params.rib_count {
        let s0 = i as f64 * pitch;
        let s1 = s0 + thickness;
        let (y0, y1) = if s1 - clear > s0 + clear { (s0 + clear, s1 - clear) } else { (s0, s1) };
        for span in spans {
            pockets.push(Rect {
                x0: (span.start - clear).max(0.0),
                y0,
                x1: (span.end + clear).min(length),
                y1,
            });
        }
    }

    Some(BackerPanel {
        outline,
        pockets,
        thickness: backer.thickness,
        z_offset: -backer.thickness,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackerParams;
    use crate::tabs::build_spans;

    fn params() -> Params {
        Params {
            rib_count: 4,
            backer: BackerParams { enabled: true, ..BackerParams::default() },
            ..Params::default()
        }
    }

    #[test]
    fn outline_covers_tabs_plus_margin() {
        let p = params();
        let spans = build_spans(&p.tabs.centers, p.tabs.width, p.rib_length);
        let b = build_backer(&p, &spans).unwrap();
        assert_eq!(b.outline.x0, 12.0);
        assert_eq!(b.outline.x1, 36.0);
        assert!((b.outline.y1 - (3.0 * 1.75 + 0.75)).abs() < 1e-12);
        assert_eq!(b.z_offset, -0.5);
        assert_eq!(b.outline.corners()[2], [36.0, b.outline.y1]);
    }

    #[test]
    fn one_pocket_per_rib_per_span() {
        let p = params();
        let spans = build_spans(&p.tabs.centers, p.tabs.width, p.rib_length);
        let b = build_backer(&p, &spans).unwrap();
        assert_eq!(b.pockets.len(), 8);
        for pocket in &b.pockets {
            assert!(b.outline.contains(pocket));
            assert!((pocket.x1 - pocket.x0 - 4.04).abs() < 1e-9);
            assert!((pocket.y1 - pocket.y0 - 0.71).abs() < 1e-9);
        }
        // Rib 1's pockets start one pitch in.
        assert!((b.pockets[2].y0 - (1.75 + 0.02)).abs() < 1e-12);
    }

    #[test]
    fn large_clearance_falls_back_to_full_thickness() {
        let mut p = params();
        p.backer.clearance = 0.5;
        let spans = build_spans(&p.tabs.centers, p.tabs.width, p.rib_length);
        let b = build_backer(&p, &spans).unwrap();
        assert_eq!(b.pockets[0].y0, 0.0);
        assert_eq!(b.pockets[0].y1, 0.75);
    }

    #[test]
    fn no_backer_without_tabs() {
        let mut p = params();
        assert!(build_backer(&p, &[]).is_none());
        p.tabs.enabled = false;
        let spans = build_spans(&p.tabs.centers, p.tabs.width, p.rib_length);
        assert!(build_backer(&p, &spans).is_none());
    }
}
