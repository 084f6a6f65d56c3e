//! Parameter summary table: one row per (region, parameter).
//!
//! Purpose
//! -------
//! Collect, for every fitted region and every named parameter, the mean,
//! standard error, and percentiles of each successful strategy's draws.
//!
//! Key behaviors
//! -------------
//! - Columns are `region`, `param`, then per strategy `{abbr}_mean`,
//!   `{abbr}_std_err` (regression, Laplace and posterior only), and
//!   `{abbr}_p5 … {abbr}_p95`.
//! - A strategy that failed or was not run leaves its cells empty in CSV and
//!   absent in JSON, never zero.
//! - Parameters follow the model's ordering; regions appear in the order
//!   they were added.
use crate::estimation::traits::StrategyKind;
use crate::report::{
    errors::ReportResult,
    summary::{PERCENTILE_LABELS, SummaryStats},
    writers::{cell, write_csv_file, write_csv_records, write_json_file},
};
use crate::window::models::moving_window::MovingWindowModel;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, io::Write, path::Path};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRow {
    pub region: String,
    pub param: String,
    pub cells: BTreeMap<StrategyKind, SummaryStats>,
}

impl ParameterRow {
    pub fn get(&self, kind: StrategyKind) -> Option<&SummaryStats> {
        self.cells.get(&kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterReport {
    /// Column groups, in this order.
    pub strategies: Vec<StrategyKind>,
    pub rows: Vec<ParameterRow>,
}

impl ParameterReport {
    pub fn new(strategies: Vec<StrategyKind>) -> Self {
        Self { strategies, rows: Vec::new() }
    }

    /// Append one row per parameter of `model`.
    pub fn add_model(&mut self, model: &MovingWindowModel) {
        let names = model.problem().codec().order().names();
        for (i, name) in names.iter().enumerate() {
            let cells = self
                .strategies
                .iter()
                .filter_map(|&kind| {
                    let samples = model.status(kind)?.samples()?;
                    let values: Vec<f64> = samples.resampled.iter().map(|p| p.get(i)).collect();
                    SummaryStats::from_values(&values, kind.reports_std_err()).map(|s| (kind, s))
                })
                .collect();
            self.rows.push(ParameterRow {
                region: model.region().to_string(),
                param: name.clone(),
                cells,
            });
        }
    }

    pub fn rows_for_param<'a>(&'a self, param: &'a str) -> impl Iterator<Item = &'a ParameterRow> {
        self.rows.iter().filter(move |r| r.param == param)
    }

    pub fn header(&self) -> Vec<String> {
        let mut header = vec!["region".to_string(), "param".to_string()];
        for kind in &self.strategies {
            let abbr = kind.abbreviation();
            header.push(format!("{abbr}_mean"));
            if kind.reports_std_err() {
                header.push(format!("{abbr}_std_err"));
            }
            header.extend(PERCENTILE_LABELS.iter().map(|p| format!("{abbr}_{p}")));
        }
        header
    }

    pub fn records(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = vec![row.region.clone(), row.param.clone()];
                for kind in &self.strategies {
                    let stats = row.get(*kind);
                    record.push(cell(stats.map(|s| s.mean)));
                    if kind.reports_std_err() {
                        record.push(cell(stats.and_then(|s| s.std_err)));
                    }
                    for i in 0..PERCENTILE_LABELS.len() {
                        record.push(cell(stats.map(|s| s.percentiles()[i])));
                    }
                }
                record
            })
            .collect()
    }

    pub fn to_csv_writer<W: Write>(&self, writer: W) -> ReportResult<()> {
        write_csv_records(writer, &self.header(), &self.records())
    }

    pub fn write_csv(&self, path: &Path) -> ReportResult<()> {
        write_csv_file(path, &self.header(), &self.records())
    }

    pub fn write_json(&self, path: &Path) -> ReportResult<()> {
        write_json_file(path, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Column layout and empty cells for absent strategies. Population from
    // fitted models is covered by the integration tests.
    // -------------------------------------------------------------------------

    fn stats(mean: f64, std_err: Option<f64>) -> SummaryStats {
        SummaryStats { mean, std_err, p5: 1.0, p25: 2.0, p50: 3.0, p75: 4.0, p95: 5.0 }
    }

    #[test]
    fn header_has_std_err_only_for_gaussian_strategies() {
        let report = ParameterReport::new(vec![StrategyKind::Regression, StrategyKind::Bootstrap]);
        let header = report.header();
        assert_eq!(header.len(), 2 + 7 + 6);
        assert_eq!(&header[..4], ["region", "param", "SM_mean", "SM_std_err"]);
        assert_eq!(header[9], "BS_mean");
        assert_eq!(header.last().map(String::as_str), Some("BS_p95"));
    }

    #[test]
    // Purpose
    // -------
    // A strategy missing from a row produces empty cells, never zeros.
    //
    // Given
    // -----
    // - A row with regression stats only, in a report over SM and MCMC.
    //
    // Expect
    // ------
    // - All six MCMC cells are empty strings; the JSON omits MCMC.
    fn absent_strategy_cells_are_empty() {
        // Arrange
        let mut report =
            ParameterReport::new(vec![StrategyKind::Regression, StrategyKind::RandomWalk]);
        report.rows.push(ParameterRow {
            region: "R".into(),
            param: "positive_slope".into(),
            cells: [(StrategyKind::Regression, stats(0.5, Some(0.1)))].into_iter().collect(),
        });

        // Act
        let records = report.records();
        let json = serde_json::to_string(&report.rows[0]).expect("json");

        // Assert
        assert_eq!(records[0][2], "0.5");
        assert_eq!(records[0][3], "0.1");
        assert!(records[0][9..].iter().all(String::is_empty));
        assert_eq!(records[0].len(), report.header().len());
        assert!(json.contains("\"SM\""));
        assert!(!json.contains("MCMC"));
    }
}
