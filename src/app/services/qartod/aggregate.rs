//! Flag aggregation
//!
//! Reduces several same-length flag series into one by taking the most
//! severe flag at each index.

use crate::app::models::{FlagSeries, QartodFlag, check_len};
use crate::{Error, Result};
use tracing::debug;

/// Collect the series and check they all have length `expected`
/// (or the length of the first one)
fn collect_series<'a, I>(flag_series: I, expected: Option<usize>) -> Result<Vec<&'a FlagSeries>>
where
    I: IntoIterator<Item = &'a FlagSeries>,
{
    let series: Vec<&FlagSeries> = flag_series.into_iter().collect();
    let Some(first) = series.first() else {
        return Err(Error::configuration(
            "Aggregation needs at least one flag series".to_string(),
        ));
    };

    let expected = expected.unwrap_or(first.len());
    for (i, s) in series.iter().enumerate() {
        check_len(&format!("flag series {i}"), expected, s.len())?;
    }
    Ok(series)
}

/// Aggregate per-test flags into one flag per observation.
///
/// Where the raw value is missing the result is `MISSING`, whatever the tests
/// said. Elsewhere it is the most severe contributing flag under
/// `GOOD < UNKNOWN < SUSPECT < FAIL`, a test-contributed `MISSING` counting as
/// `UNKNOWN`.
///
/// # Errors
///
/// Returns a configuration error for an empty collection and a shape error if
/// any series differs in length from `values`.
pub fn aggregate<'a, I>(values: &[Option<f64>], flag_series: I) -> Result<FlagSeries>
where
    I: IntoIterator<Item = &'a FlagSeries>,
{
    let series = collect_series(flag_series, Some(values.len()))?;

    let flags: FlagSeries = values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            if value.is_none() {
                return QartodFlag::Missing;
            }
            series
                .iter()
                .map(|s| match s[i] {
                    QartodFlag::Missing => QartodFlag::Unknown,
                    flag => flag,
                })
                .fold(QartodFlag::Good, QartodFlag::worst)
        })
        .collect();

    debug!(
        "Aggregated {} flag series over {} values: {} FAIL, {} SUSPECT, {} MISSING",
        series.len(),
        values.len(),
        flags.count(QartodFlag::Fail),
        flags.count(QartodFlag::Suspect),
        flags.count(QartodFlag::Missing)
    );

    Ok(flags)
}

/// Aggregate flag series without the raw values.
///
/// Same severity reduction as [`aggregate`]; an index is `MISSING` only when
/// every series marks it missing.
pub fn aggregate_flags<'a, I>(flag_series: I) -> Result<FlagSeries>
where
    I: IntoIterator<Item = &'a FlagSeries>,
{
    let series = collect_series(flag_series, None)?;
    let n = series[0].len();

    Ok((0..n)
        .map(|i| {
            if series.iter().all(|s| s[i].is_missing()) {
                return QartodFlag::Missing;
            }
            series
                .iter()
                .map(|s| match s[i] {
                    QartodFlag::Missing => QartodFlag::Unknown,
                    flag => flag,
                })
                .fold(QartodFlag::Good, QartodFlag::worst)
        })
        .collect())
}
