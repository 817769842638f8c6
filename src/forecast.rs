//! Short-horizon forecasting of a confirmed-case series.
//!
//! The statistical model sits behind the narrow [`Forecaster`] trait so the
//! rest of the pipeline can be exercised with a deterministic stub. The
//! bundled [`LinearTrend`] model fits an additive linear trend by ordinary
//! least squares and derives a 95% prediction band from the regression
//! residuals. Exact numbers are not expected to match other forecasting
//! libraries; the contract is the shape of the output, not the model.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

/// Number of future calendar days predicted past the last observation.
pub const HORIZON_DAYS: usize = 30;

/// One predicted observation with its two-sided uncertainty band.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("need at least 2 distinct dates of history, got {0}")]
    InsufficientData(usize),
    #[error("trend fit failed: {0}")]
    Model(String),
}

/// Contract: given an ordered `(date, value)` series, return predictions for
/// every historical date followed by exactly `horizon_days` further calendar
/// days, in strictly increasing date order. Deterministic for a fixed input.
pub trait Forecaster {
    fn forecast(
        &self,
        series: &[(NaiveDate, u64)],
        horizon_days: usize,
    ) -> Result<Vec<ForecastPoint>, ForecastError>;
}

/// Additive linear trend fitted with `linreg`.
#[derive(Debug, Default)]
pub struct LinearTrend;

impl Forecaster for LinearTrend {
    fn forecast(
        &self,
        series: &[(NaiveDate, u64)],
        horizon_days: usize,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        let distinct = count_distinct_dates(series);
        if distinct < 2 {
            return Err(ForecastError::InsufficientData(distinct));
        }

        let first = series[0].0;
        let last = series[series.len() - 1].0;
        let xs: Vec<f64> = series
            .iter()
            .map(|(d, _)| (*d - first).num_days() as f64)
            .collect();
        let ys: Vec<f64> = series.iter().map(|(_, v)| *v as f64).collect();

        let (slope, intercept): (f64, f64) =
            linreg::linear_regression(&xs, &ys).map_err(|e| ForecastError::Model(format!("{e:?}")))?;

        // Standard prediction-interval half-width around the fitted line;
        // the band widens the further a date sits from the sample mean.
        let n = xs.len() as f64;
        let mean_x = xs.iter().sum::<f64>() / n;
        let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
        let ss_res: f64 = xs
            .iter()
            .zip(&ys)
            .map(|(x, y)| {
                let e = y - (intercept + slope * x);
                e * e
            })
            .sum();
        let dof = xs.len().saturating_sub(2).max(1) as f64;
        let sigma = (ss_res / dof).sqrt();

        let point_at = |date: NaiveDate| {
            let x = (date - first).num_days() as f64;
            // Case counts cannot go negative.
            let predicted = (intercept + slope * x).max(0.0);
            let half = 1.96 * sigma * (1.0 + 1.0 / n + (x - mean_x).powi(2) / sxx).sqrt();
            ForecastPoint {
                date,
                predicted,
                lower: (predicted - half).max(0.0),
                upper: predicted + half,
            }
        };

        let mut points: Vec<ForecastPoint> = Vec::with_capacity(series.len() + horizon_days);
        points.extend(series.iter().map(|(d, _)| point_at(*d)));
        points.extend((1..=horizon_days).map(|k| point_at(last + Duration::days(k as i64))));
        Ok(points)
    }
}

fn count_distinct_dates(series: &[(NaiveDate, u64)]) -> usize {
    let mut distinct = 0;
    let mut prev: Option<NaiveDate> = None;
    for (date, _) in series {
        if prev != Some(*date) {
            distinct += 1;
            prev = Some(*date);
        }
    }
    distinct
}
