use serde::Serialize;

/// Notch interval along the rib length, `0 <= start < end <= length`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TabSpan {
    pub start: f64,
    pub end: f64,
}

impl TabSpan {
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Clamp `[c - width/2, c + width/2]` into `[0, length]` for every center and
/// sort the survivors by start, far end first. Overlapping spans are kept
/// as-is; resolving them is the caller's job.
pub fn build_spans(centers: &[f64], width: f64, length: f64) -> Vec<TabSpan> {
    let half = 0.5 * width;
    let mut spans: Vec<TabSpan> = centers
        .iter()
        .filter(|c| c.is_finite())
        .filter_map(|&c| {
            let start = (c - half).max(0.0);
            let end = (c + half).min(length);
            (end > start).then_some(TabSpan { start, end })
        })
        .collect();
    spans.sort_by(|a, b| b.start.total_cmp(&a.start));
    spans
}

/// First adjacent pair (in traversal order) that overlaps or touches.
pub fn find_overlap(spans: &[TabSpan]) -> Option<(TabSpan, TabSpan)> {
    spans
        .windows(2)
        .find(|w| w[1].end >= w[0].start)
        .map(|w| (w[0], w[1]))
}
