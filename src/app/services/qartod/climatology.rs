//! Climatology test
//!
//! Looks up the first matching climatology span for each observation and
//! applies gross range semantics with that span's bounds. Observations no
//! span covers are flagged UNKNOWN.

use crate::app::models::{FlagSeries, QartodFlag, check_len, check_times_ordered};
use crate::app::services::climatology::ClimatologyConfig;
use crate::Result;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Run the climatology test over a timed value series with optional depths
pub fn climatology_test(
    values: &[Option<f64>],
    times: &[DateTime<Utc>],
    depths: Option<&[Option<f64>]>,
    config: &ClimatologyConfig,
) -> Result<FlagSeries> {
    config.validate()?;
    let n = values.len();
    check_len("times", n, times.len())?;
    check_times_ordered(times)?;
    if let Some(depths) = depths {
        check_len("depth", n, depths.len())?;
    }

    let mut unmatched = 0;
    let flags: FlagSeries = (0..n)
        .map(|i| {
            let value = values[i];
            if value.is_none() {
                return QartodFlag::Missing;
            }
            let depth = depths.and_then(|d| d[i]);
            match config.find(&times[i], depth) {
                Some(span) => span.classify(value),
                None => {
                    unmatched += 1;
                    QartodFlag::Unknown
                }
            }
        })
        .collect();

    debug!(
        "Climatology test: {} values against {} spans, {} unmatched, {} FAIL, {} SUSPECT",
        n,
        config.len(),
        unmatched,
        flags.count(QartodFlag::Fail),
        flags.count(QartodFlag::Suspect)
    );

    Ok(flags)
}
