use serde::Serialize;

/// Evenly spaced samples along one rib. `positions[0] == 0` and the last
/// position is exactly the rib length.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SampleSeries {
    pub positions: Vec<f64>,
    pub values: Vec<f64>,
}

impl SampleSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.positions.iter().copied().zip(self.values.iter().copied())
    }
}

/// Evaluate `f` at `n_samples + 1` evenly spaced positions in `[0, length]`.
pub fn sample(f: impl Fn(f64) -> f64, length: f64, n_samples: usize) -> SampleSeries {
    let steps = n_samples.max(1);
    let positions: Vec<f64> = (0..=steps)
        .map(|s| if s == steps { length } else { length * s as f64 / steps as f64 })
        .collect();
    let values = positions.iter().map(|&y| f(y)).collect();
    SampleSeries { positions, values }
}

/// Light low-pass: `passes` rounds of the [1/4, 1/2, 1/4] kernel with both
/// endpoints held fixed.
pub fn smooth(mut series: SampleSeries, passes: usize) -> SampleSeries {
    let n = series.values.len();
    if passes == 0 || n < 3 {
        return series;
    }
    let mut scratch = vec![0.0; n];
    for _ in 0..passes {
        scratch[0] = series.values[0];
        scratch[n - 1] = series.values[n - 1];
        for i in 1..n - 1 {
            let v = &series.values;
            scratch[i] = 0.25 * v[i - 1] + 0.5 * v[i] + 0.25 * v[i + 1];
        }
        std::mem::swap(&mut series.values, &mut scratch);
    }
    series
}
