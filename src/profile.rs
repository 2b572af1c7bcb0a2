//! Closing a sampled free edge into one simple polygon per rib.

use serde::Serialize;

use crate::error::RibError;
use crate::sampler::SampleSeries;
use crate::tabs::{TabSpan, find_overlap};

/// Ordered outline; the last point connects back to the first.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProfilePolygon {
    pub points: Vec<[f64; 2]>,
}

impl ProfilePolygon {
    /// Shoelace area, positive for counter-clockwise outlines.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        let mut twice = 0.0;
        for i in 0..n {
            let [x0, y0] = self.points[i];
            let [x1, y1] = self.points[(i + 1) % n];
            twice += x0 * y1 - x1 * y0;
        }
        0.5 * twice
    }

    /// True if no two cyclically consecutive points coincide.
    pub fn has_distinct_neighbours(&self) -> bool {
        let n = self.points.len();
        (0..n).all(|i| self.points[i] != self.points[(i + 1) % n])
    }

    /// Brute-force check that no two non-adjacent edges intersect.
    pub fn is_simple(&self) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        for i in 0..n {
            let a = (self.points[i], self.points[(i + 1) % n]);
            for j in (i + 1)..n {
                if j == i + 1 || (i == 0 && j == n - 1) {
                    continue;
                }
                let b = (self.points[j], self.points[(j + 1) % n]);
                if segments_intersect(a.0, a.1, b.0, b.1) {
                    return false;
                }
            }
        }
        true
    }
}

fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

fn on_segment(a: [f64; 2], b: [f64; 2], p: [f64; 2]) -> bool {
    p[0] >= a[0].min(b[0])
        && p[0] <= a[0].max(b[0])
        && p[1] >= a[1].min(b[1])
        && p[1] <= a[1].max(b[1])
}

fn segments_intersect(p1: [f64; 2], p2: [f64; 2], q1: [f64; 2], q2: [f64; 2]) -> bool {
    let d1 = orient(q1, q2, p1);
    let d2 = orient(q1, q2, p2);
    let d3 = orient(p1, p2, q1);
    let d4 = orient(p1, p2, q2);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

/// Appends points, dropping exact repeats of the previous one.
struct Outline {
    points: Vec<[f64; 2]>,
}

impl Outline {
    fn with_capacity(n: usize) -> Self {
        Self { points: Vec::with_capacity(n) }
    }

    fn push(&mut self, x: f64, y: f64) {
        if self.points.last() != Some(&[x, y]) {
            self.points.push([x, y]);
        }
    }

    fn finish(mut self) -> Vec<[f64; 2]> {
        while self.points.len() > 1 && self.points.first() == self.points.last() {
            self.points.pop();
        }
        self.points
    }
}

fn check_free_edge(rib: usize, series: &SampleSeries) -> Result<(), RibError> {
    if series.len() < 2 || series.positions.len() != series.len() {
        return Err(RibError::degenerate(rib, format!("free edge has {} points", series.len())));
    }
    if let Some((x, y)) = series.iter().find(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return Err(RibError::degenerate(rib, format!("non-finite sample ({x}, {y})")));
    }
    if series.positions.windows(2).any(|w| w[1] <= w[0]) {
        return Err(RibError::degenerate(rib, "sample positions are not increasing"));
    }
    Ok(())
}

fn finish_polygon(rib: usize, points: Vec<[f64; 2]>) -> Result<ProfilePolygon, RibError> {
    let polygon = ProfilePolygon { points };
    if polygon.points.len() < 4 {
        let reason = format!("only {} distinct points", polygon.points.len());
        return Err(RibError::degenerate(rib, reason));
    }
    let area = polygon.signed_area();
    if !(area.abs() > 0.0) {
        return Err(RibError::degenerate(rib, "outline encloses no area"));
    }
    Ok(polygon)
}

/// Height-mode outline: the free edge from the near end to the far end, down
/// to the flat back at `y = 0`, back along it with a rectangular notch
/// `notch_depth` deep under every span, and up to the first sample.
///
/// `spans` must be sorted by start, far end first. Overlapping or touching
/// spans are rejected rather than merged.
pub fn build_profile(
    rib: usize,
    series: &SampleSeries,
    spans: &[TabSpan],
    notch_depth: f64,
) -> Result<ProfilePolygon, RibError> {
    check_free_edge(rib, series)?;
    if let Some((x, y)) = series.iter().find(|&(_, y)| y <= 0.0) {
        let reason = format!("free edge touches the back at x = {x} (y = {y})");
        return Err(RibError::degenerate(rib, reason));
    }
    if let Some((first, second)) = find_overlap(spans) {
        return Err(RibError::OverlappingTabSpans {
            rib,
            first_start: first.start,
            first_end: first.end,
            second_start: second.start,
            second_end: second.end,
        });
    }

    let length = series.positions[series.len() - 1];
    let mut out = Outline::with_capacity(series.len() + 2 + spans.len() * 4);
    for (x, y) in series.iter() {
        out.push(x, y);
    }

    let bottom = -notch_depth;
    let mut cur = length;
    out.push(cur, 0.0);
    for span in spans {
        let end = span.end.min(cur);
        let start = span.start.max(0.0);
        if start >= end {
            continue;
        }
        out.push(end, 0.0);
        out.push(end, bottom);
        out.push(start, bottom);
        out.push(start, 0.0);
        cur = start;
    }
    out.push(0.0, 0.0);

    finish_polygon(rib, out.finish())
}

/// Offset-mode outline: a band `half_width` either side of the sampled
/// centerline, upper edge forward and lower edge back.
pub fn build_band(
    rib: usize,
    series: &SampleSeries,
    half_width: f64,
) -> Result<ProfilePolygon, RibError> {
    check_free_edge(rib, series)?;
    if !(half_width > 0.0) {
        return Err(RibError::degenerate(rib, "band has no width"));
    }
    let mut out = Outline::with_capacity(series.len() * 2);
    for (x, y) in series.iter() {
        out.push(x, y + half_width);
    }
    for (&x, &y) in series.positions.iter().zip(&series.values).rev() {
        out.push(x, y - half_width);
    }
    finish_polygon(rib, out.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::sample;
    use crate::tabs::build_spans;

    fn hump(n: usize) -> SampleSeries {
        sample(|x| 2.0 + (x / 48.0 * std::f64::consts::PI).sin(), 48.0, n)
    }

    #[test]
    fn plain_profile_is_closed_and_simple() {
        let poly = build_profile(0, &hump(40), &[], 0.5).unwrap();
        assert_eq!(poly.points.len(), 41 + 2);
        assert!(poly.has_distinct_neighbours());
        assert!(poly.is_simple());
        assert!(poly.signed_area().abs() > 0.0);
        assert_eq!(poly.points[41], [48.0, 0.0]);
        assert_eq!(poly.points[42], [0.0, 0.0]);
    }

    #[test]
    fn notches_are_rectangular_and_at_depth() {
        let spans = build_spans(&[16.0, 32.0], 4.0, 48.0);
        let poly = build_profile(0, &hump(40), &spans, 0.675).unwrap();
        let tail: Vec<[f64; 2]> = poly.points[41..].to_vec();
        assert_eq!(
            tail,
            vec![
                [48.0, 0.0],
                [34.0, 0.0],
                [34.0, -0.675],
                [30.0, -0.675],
                [30.0, 0.0],
                [18.0, 0.0],
                [18.0, -0.675],
                [14.0, -0.675],
                [14.0, 0.0],
                [0.0, 0.0],
            ]
        );
        assert!(poly.is_simple());
        assert!(poly.has_distinct_neighbours());
    }

    #[test]
    fn notch_at_the_rib_ends_keeps_points_distinct() {
        let spans = build_spans(&[0.0, 48.0], 4.0, 48.0);
        let poly = build_profile(0, &hump(20), &spans, 1.0).unwrap();
        assert!(poly.has_distinct_neighbours());
        assert!(poly.is_simple());
    }

    #[test]
    fn overlapping_spans_are_rejected() {
        let spans = build_spans(&[2.0, 3.0], 4.0, 48.0);
        let err = build_profile(4, &hump(20), &spans, 1.0).unwrap_err();
        assert_eq!(
            err,
            RibError::OverlappingTabSpans {
                rib: 4,
                first_start: 1.0,
                first_end: 5.0,
                second_start: 0.0,
                second_end: 4.0,
            }
        );
    }

    #[test]
    fn non_finite_free_edge_fails() {
        let mut s = hump(10);
        s.values[3] = f64::NAN;
        assert!(matches!(
            build_profile(2, &s, &[], 0.5),
            Err(RibError::DegenerateProfile { rib: 2, .. })
        ));
    }

    #[test]
    fn too_few_points_fails() {
        let s = SampleSeries { positions: vec![0.0], values: vec![1.0] };
        assert!(matches!(build_profile(0, &s, &[], 0.5), Err(RibError::DegenerateProfile { .. })));
    }

    #[test]
    fn free_edge_on_the_back_fails() {
        let s = sample(|x| if (20.0..30.0).contains(&x) { 0.0 } else { 1.0 }, 48.0, 48);
        assert!(matches!(build_profile(0, &s, &[], 0.5), Err(RibError::DegenerateProfile { .. })));
    }

    #[test]
    fn band_outline() {
        let s = sample(|x| 0.3 * (x / 10.0).sin(), 48.0, 30);
        let poly = build_band(1, &s, 0.375).unwrap();
        assert_eq!(poly.points.len(), 62);
        assert!(poly.is_simple());
        assert!(poly.has_distinct_neighbours());
        let expected = 48.0 * 0.75;
        assert!((poly.signed_area().abs() - expected).abs() < 1e-9);
    }

    #[test]
    fn shoelace_of_unit_square() {
        let sq = ProfilePolygon { points: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]] };
        assert_eq!(sq.signed_area(), 1.0);
        assert!(sq.is_simple());
        let bowtie =
            ProfilePolygon { points: vec![[0.0, 0.0], [1.0, 1.0], [1.0, 0.0], [0.0, 1.0]] };
        assert!(!bowtie.is_simple());
    }
}
