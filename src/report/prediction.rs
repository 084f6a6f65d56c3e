//! Prediction table: forecast trajectories summarized per future date.
//!
//! Purpose
//! -------
//! Simulate each successful strategy's draws past the last observed day and
//! summarize daily and cumulative cases and deaths across draws.
//!
//! Key behaviors
//! -------------
//! - Up to `n_samples` draws are taken from the strategy's resampled set
//!   without replacement, using the caller's RNG.
//! - Forecast steps are grid indices `burn_in + n … len − 1`; step `k` is
//!   dated `first_date + (k − burn_in)` days.
//! - Cumulative totals continue from the observed total at the last
//!   observed day.
//! - Each quantity reports mean, population std, and the five percentiles.
use crate::estimation::traits::StrategyKind;
use crate::report::{
    errors::ReportResult,
    summary::{PERCENTILE_LABELS, SummaryStats},
    writers::{cell, write_csv_file, write_json_file},
};
use crate::window::{
    core::{params::ParamVector, series::Series},
    models::moving_window::MovingWindowModel,
};
use chrono::NaiveDate;
use rand::{Rng, seq::index::sample};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Quantities reported for every forecast date, in column order.
pub const QUANTITIES: [&str; 4] = ["total_positive", "total_deceased", "new_positive", "new_deceased"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    pub region: String,
    /// Long strategy name.
    pub model_type: String,
    pub date: NaiveDate,
    pub total_positive: SummaryStats,
    pub total_deceased: SummaryStats,
    pub new_positive: SummaryStats,
    pub new_deceased: SummaryStats,
}

impl PredictionRow {
    fn quantities(&self) -> [&SummaryStats; 4] {
        [&self.total_positive, &self.total_deceased, &self.new_positive, &self.new_deceased]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionTable {
    pub rows: Vec<PredictionRow>,
}

/// Per-draw forecast paths of one strategy; outer index is the draw.
#[derive(Debug, Clone, PartialEq)]
struct Trajectories {
    new_positive: Vec<Vec<f64>>,
    new_deceased: Vec<Vec<f64>>,
    total_positive: Vec<Vec<f64>>,
    total_deceased: Vec<Vec<f64>>,
}

impl PredictionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append forecast rows for every successful strategy of `model`.
    ///
    /// # Errors
    /// `Model` when a draw cannot be simulated.
    pub fn add_model<R: Rng + ?Sized>(
        &mut self, model: &MovingWindowModel, rng: &mut R,
    ) -> ReportResult<()> {
        for (kind, fit) in model.successes() {
            self.add_strategy(model, kind, &fit.samples.resampled, rng)?;
        }
        Ok(())
    }

    fn add_strategy<R: Rng + ?Sized>(
        &mut self, model: &MovingWindowModel, kind: StrategyKind, draws: &[ParamVector],
        rng: &mut R,
    ) -> ReportResult<()> {
        let problem = model.problem();
        let n_draws = problem.options().n_samples.min(draws.len());
        if n_draws == 0 {
            return Ok(());
        }
        let chosen: Vec<&ParamVector> =
            sample(rng, draws.len(), n_draws).into_iter().map(|i| &draws[i]).collect();
        let paths = trajectories(model, &chosen)?;

        let grid = problem.grid();
        let start = grid.forecast_start();
        for step in 0..grid.len() - start {
            let summarize = |paths: &[Vec<f64>]| {
                let column: Vec<f64> = paths.iter().map(|p| p[step]).collect();
                SummaryStats::from_values(&column, true)
            };
            let (Some(total_positive), Some(total_deceased), Some(new_positive), Some(new_deceased)) = (
                summarize(&paths.total_positive),
                summarize(&paths.total_deceased),
                summarize(&paths.new_positive),
                summarize(&paths.new_deceased),
            ) else {
                continue;
            };
            let offset = (start + step - grid.burn_in()) as i64;
            self.rows.push(PredictionRow {
                region: model.region().to_string(),
                model_type: kind.name().to_string(),
                date: problem.series().date_at(offset),
                total_positive,
                total_deceased,
                new_positive,
                new_deceased,
            });
        }
        Ok(())
    }

    pub fn header() -> Vec<String> {
        let mut header = vec!["date".to_string(), "region".to_string(), "model_type".to_string()];
        for q in QUANTITIES {
            header.push(format!("{q}_mean"));
            header.push(format!("{q}_std"));
            header.extend(PERCENTILE_LABELS.iter().map(|p| format!("{q}_{p}")));
        }
        header
    }

    pub fn records(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = vec![
                    row.date.format("%Y-%m-%d").to_string(),
                    row.region.clone(),
                    row.model_type.clone(),
                ];
                for stats in row.quantities() {
                    record.push(cell(Some(stats.mean)));
                    record.push(cell(stats.std_err));
                    record.extend(stats.percentiles().iter().map(|&v| cell(Some(v))));
                }
                record
            })
            .collect()
    }

    pub fn write_csv(&self, path: &Path) -> ReportResult<()> {
        write_csv_file(path, &Self::header(), &self.records())
    }

    pub fn write_json(&self, path: &Path) -> ReportResult<()> {
        write_json_file(path, self)
    }
}

fn trajectories(model: &MovingWindowModel, draws: &[&ParamVector]) -> ReportResult<Trajectories> {
    let problem = model.problem();
    let start = problem.grid().forecast_start();
    let observed_pos = problem.series().cumulative_total(Series::Positive);
    let observed_dec = problem.series().cumulative_total(Series::Deceased);

    let mut out = Trajectories {
        new_positive: Vec::with_capacity(draws.len()),
        new_deceased: Vec::with_capacity(draws.len()),
        total_positive: Vec::with_capacity(draws.len()),
        total_deceased: Vec::with_capacity(draws.len()),
    };
    for params in draws {
        let curves = problem.simulate(params)?;
        let new_pos: Vec<f64> = curves.positive.iter().skip(start).copied().collect();
        let new_dec: Vec<f64> = curves.deceased.iter().skip(start).copied().collect();
        out.total_positive.push(running_total(observed_pos, &new_pos));
        out.total_deceased.push(running_total(observed_dec, &new_dec));
        out.new_positive.push(new_pos);
        out.new_deceased.push(new_dec);
    }
    Ok(out)
}

fn running_total(start: f64, daily: &[f64]) -> Vec<f64> {
    daily
        .iter()
        .scan(start, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_total_continues_from_observed() {
        assert_eq!(running_total(10.0, &[1.0, 2.0, 3.0]), vec![11.0, 13.0, 16.0]);
        assert!(running_total(5.0, &[]).is_empty());
    }

    #[test]
    fn header_lists_every_quantity() {
        let header = PredictionTable::header();
        assert_eq!(header.len(), 3 + 4 * 7);
        assert_eq!(header[3], "total_positive_mean");
        assert_eq!(header[4], "total_positive_std");
        assert_eq!(header.last().map(String::as_str), Some("new_deceased_p95"));
    }
}
