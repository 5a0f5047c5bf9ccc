//! Rolling window statistics shared by the rate of change and attenuated
//! signal tests
//!
//! A [`Window`] turns a series into one index range per sample. Ranges are
//! produced with non-decreasing start and end, which lets the statistics be
//! computed in a single pass: prefix sums for mean and standard deviation,
//! monotonic deques for the minimum and maximum.

use crate::app::models::{check_len, delta_from_secs};
use crate::{Error, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::ops::Range;

/// Which samples a per-index statistic is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WindowSetting", into = "WindowSetting")]
pub enum Window {
    /// Every sample from the start of the series
    Expanding,
    /// The last `n` samples
    Samples(usize),
    /// Samples whose timestamps lie within the duration of the current one
    Duration(TimeDelta),
    /// The whole series, for every index
    Series,
}

/// Serialized form of [`Window`]
///
/// `"expanding"`, `{"samples": 24}`, `{"duration_secs": 86400}` or `"series"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowSetting {
    Expanding,
    Samples(usize),
    DurationSecs(i64),
    Series,
}

impl Window {
    /// Duration window from whole seconds
    pub fn duration_secs(secs: i64) -> Result<Self> {
        let window = Window::Duration(delta_from_secs(secs)?);
        window.validate()?;
        Ok(window)
    }

    /// Validate window parameters
    pub fn validate(&self) -> Result<()> {
        match self {
            Window::Samples(0) => Err(Error::configuration(
                "Sample window must hold at least one sample".to_string(),
            )),
            Window::Duration(d) if *d <= TimeDelta::zero() => Err(Error::configuration(
                format!("Window duration must be positive, got {}s", d.num_seconds()),
            )),
            _ => Ok(()),
        }
    }

    /// True when the window needs timestamps to be resolved
    pub fn requires_times(&self) -> bool {
        matches!(self, Window::Duration(_))
    }

    /// Index range covered by the window ending at each sample.
    ///
    /// With `include_current` the sample itself is part of its window. The
    /// whole-series window always includes it.
    pub fn bounds(
        &self,
        len: usize,
        times: Option<&[DateTime<Utc>]>,
        include_current: bool,
    ) -> Result<Vec<Range<usize>>> {
        let end_of = |i: usize| if include_current { i + 1 } else { i };

        let bounds = match *self {
            Window::Expanding => (0..len).map(|i| 0..end_of(i)).collect(),
            Window::Samples(n) => (0..len)
                .map(|i| {
                    let end = end_of(i);
                    end.saturating_sub(n)..end
                })
                .collect(),
            Window::Series => (0..len).map(|_| 0..len).collect(),
            Window::Duration(duration) => {
                let times = times.ok_or_else(|| {
                    Error::shape("A duration window requires timestamps".to_string())
                })?;
                check_len("times", len, times.len())?;

                let mut start = 0;
                let mut bounds = Vec::with_capacity(len);
                for (i, &t) in times.iter().enumerate() {
                    // A window reaching past the representable range covers all prior samples
                    if let Some(earliest) = t.checked_sub_signed(duration) {
                        while start < i && times[start] < earliest {
                            start += 1;
                        }
                    }
                    let end = end_of(i);
                    bounds.push(start.min(end)..end);
                }
                bounds
            }
        };

        Ok(bounds)
    }
}

impl TryFrom<WindowSetting> for Window {
    type Error = Error;

    fn try_from(setting: WindowSetting) -> Result<Self> {
        let window = match setting {
            WindowSetting::Expanding => Window::Expanding,
            WindowSetting::Samples(n) => Window::Samples(n),
            WindowSetting::DurationSecs(secs) => Window::Duration(delta_from_secs(secs)?),
            WindowSetting::Series => Window::Series,
        };
        window.validate()?;
        Ok(window)
    }
}

impl From<Window> for WindowSetting {
    fn from(window: Window) -> Self {
        match window {
            Window::Expanding => WindowSetting::Expanding,
            Window::Samples(n) => WindowSetting::Samples(n),
            Window::Duration(d) => WindowSetting::DurationSecs(d.num_seconds()),
            Window::Series => WindowSetting::Series,
        }
    }
}

/// Summary of the finite values inside one window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    /// Number of finite values
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl WindowStats {
    /// Peak-to-peak range
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// Statistics of `values` over each window in `bounds`.
///
/// Missing and non-finite values are skipped. Windows with no finite value
/// yield `None`. `bounds` must have non-decreasing starts and ends, as
/// produced by [`Window::bounds`].
pub fn rolling_stats(values: &[Option<f64>], bounds: &[Range<usize>]) -> Vec<Option<WindowStats>> {
    debug_assert!(
        bounds
            .windows(2)
            .all(|w| w[0].start <= w[1].start && w[0].end <= w[1].end)
    );

    let finite: Vec<Option<f64>> = values
        .iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect();

    // Shifted sums keep the variance well conditioned for large offsets
    let shift = finite.iter().flatten().next().copied().unwrap_or(0.0);
    let mut count = vec![0usize; finite.len() + 1];
    let mut sum = vec![0.0f64; finite.len() + 1];
    let mut sum_sq = vec![0.0f64; finite.len() + 1];
    for (i, v) in finite.iter().enumerate() {
        let (c, s, q) = match v {
            Some(x) => (1, x - shift, (x - shift) * (x - shift)),
            None => (0, 0.0, 0.0),
        };
        count[i + 1] = count[i] + c;
        sum[i + 1] = sum[i] + s;
        sum_sq[i + 1] = sum_sq[i] + q;
    }

    let mut max_queue: VecDeque<usize> = VecDeque::new();
    let mut min_queue: VecDeque<usize> = VecDeque::new();
    let mut pushed = 0;

    bounds
        .iter()
        .map(|range| {
            while pushed < range.end {
                if let Some(x) = finite[pushed] {
                    while max_queue.back().is_some_and(|&j| finite[j] <= Some(x)) {
                        max_queue.pop_back();
                    }
                    max_queue.push_back(pushed);
                    while min_queue.back().is_some_and(|&j| finite[j] >= Some(x)) {
                        min_queue.pop_back();
                    }
                    min_queue.push_back(pushed);
                }
                pushed += 1;
            }
            while max_queue.front().is_some_and(|&j| j < range.start) {
                max_queue.pop_front();
            }
            while min_queue.front().is_some_and(|&j| j < range.start) {
                min_queue.pop_front();
            }

            let n = count[range.end] - count[range.start];
            if n == 0 {
                return None;
            }
            let nf = n as f64;
            let s = sum[range.end] - sum[range.start];
            let q = sum_sq[range.end] - sum_sq[range.start];
            let variance = ((q - s * s / nf) / nf).max(0.0);

            Some(WindowStats {
                count: n,
                mean: shift + s / nf,
                std_dev: variance.sqrt(),
                min: min_queue.front().and_then(|&j| finite[j])?,
                max: max_queue.front().and_then(|&j| finite[j])?,
            })
        })
        .collect()
}
