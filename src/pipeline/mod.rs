//! pipeline — batch fitting over regions.
//!
//! Purpose
//! -------
//! Fit one [`MovingWindowModel`] per region, contain region-level failures,
//! and hand back an explicit [`RunContext`] from which the reports are
//! built and written.
//!
//! Key behaviors
//! -------------
//! - [`run_regions`] fits regions one after another. A region whose model
//!   cannot be built is recorded as [`RegionOutcome::Failed`] and the batch
//!   continues.
//! - [`RunContext::write_reports`] writes the parameter table, the forecast
//!   table, and the box/whisker summaries as CSV and JSON, then marks every
//!   reported model as such.
//! - [`loader::load_region_series_csv`] reads region series from CSV.
//!
//! Invariants & assumptions
//! ------------------------
//! - Single process, single thread; the optional file cache assumes it is the
//!   only writer.
//! - No state outlives the returned [`RunContext`].
pub mod loader;

pub use self::loader::{SeriesThresholds, load_region_series_csv};

use crate::cache::JsonFileCache;
use crate::estimation::traits::StrategyKind;
use crate::report::{
    errors::ReportResult,
    parameter_report::ParameterReport,
    plots::{BoxSummary, box_summaries, whisker_plot_filename},
    prediction::PredictionTable,
    writers::write_json_file,
};
use crate::window::{
    core::{options::ModelOptions, series::RegionSeries},
    errors::{ModelError, ModelResult},
    models::moving_window::MovingWindowModel,
};
use rand::{SeedableRng, rngs::StdRng};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

/// Batch configuration shared by every region.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub options: ModelOptions,
    /// Run only regression (and the posterior when configured).
    pub simplified: bool,
    /// Directory of the posterior sample cache; `None` disables caching.
    pub cache_dir: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { options: ModelOptions::default(), simplified: false, cache_dir: None }
    }
}

impl RunConfig {
    /// Strategies this configuration attempts, in execution order.
    pub fn strategies(&self) -> Vec<StrategyKind> {
        StrategyKind::ALL
            .into_iter()
            .filter(|k| self.options.includes(*k))
            .filter(|k| {
                !self.simplified || matches!(k, StrategyKind::Regression | StrategyKind::Posterior)
            })
            .collect()
    }
}

#[derive(Debug)]
pub enum RegionOutcome {
    Fitted(MovingWindowModel),
    Failed(ModelError),
}

impl RegionOutcome {
    pub fn model(&self) -> Option<&MovingWindowModel> {
        match self {
            RegionOutcome::Fitted(m) => Some(m),
            RegionOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ModelError> {
        match self {
            RegionOutcome::Fitted(_) => None,
            RegionOutcome::Failed(e) => Some(e),
        }
    }
}

/// Paths written by [`RunContext::write_reports`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub parameters_csv: PathBuf,
    pub parameters_json: PathBuf,
    pub predictions_csv: PathBuf,
    pub predictions_json: PathBuf,
    pub box_summaries_json: PathBuf,
}

/// Everything one batch produced, keyed by region.
#[derive(Debug)]
pub struct RunContext {
    config: RunConfig,
    outcomes: BTreeMap<String, RegionOutcome>,
}

/// Fit every region in `series` under `config`.
pub fn run_regions(series: impl IntoIterator<Item = RegionSeries>, config: RunConfig) -> RunContext {
    let mut outcomes = BTreeMap::new();
    for s in series {
        let region = s.region().to_string();
        let outcome = match fit_region(s, &config) {
            Ok(model) => {
                info!(
                    region = %region,
                    succeeded = model.successes().count(),
                    attempted = model.results().len(),
                    "region.fitted"
                );
                RegionOutcome::Fitted(model)
            }
            Err(e) => {
                warn!(region = %region, error = %e, "region.failed");
                RegionOutcome::Failed(e)
            }
        };
        outcomes.insert(region, outcome);
    }
    RunContext { config, outcomes }
}

fn fit_region(series: RegionSeries, config: &RunConfig) -> ModelResult<MovingWindowModel> {
    let mut model = MovingWindowModel::new(series, config.options.clone())?;
    if let Some(dir) = &config.cache_dir {
        model = model.with_cache(Box::new(JsonFileCache::new(dir.clone())));
    }
    if config.simplified {
        model.run_fits_simplified()?;
    } else {
        model.run_fits()?;
    }
    Ok(model)
}

impl RunContext {
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn outcomes(&self) -> &BTreeMap<String, RegionOutcome> {
        &self.outcomes
    }

    pub fn get(&self, region: &str) -> Option<&RegionOutcome> {
        self.outcomes.get(region)
    }

    /// Fitted models in region order.
    pub fn models(&self) -> impl Iterator<Item = &MovingWindowModel> {
        self.outcomes.values().filter_map(RegionOutcome::model)
    }

    /// Regions whose model could not be built or fitted.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &ModelError)> {
        self.outcomes.iter().filter_map(|(r, o)| o.error().map(|e| (r.as_str(), e)))
    }

    pub fn parameter_report(&self) -> ParameterReport {
        let mut report = ParameterReport::new(self.config.strategies());
        for model in self.models() {
            report.add_model(model);
        }
        report
    }

    /// Forecast table; draws are chosen with an RNG seeded from the options.
    pub fn prediction_table(&self) -> ReportResult<PredictionTable> {
        let mut rng = StdRng::seed_from_u64(self.config.options.seed);
        let mut table = PredictionTable::new();
        for model in self.models() {
            table.add_model(model, &mut rng)?;
        }
        Ok(table)
    }

    /// Box summaries per plot file, one file per parameter.
    pub fn box_summaries(&self, report: &ParameterReport) -> BTreeMap<String, Vec<BoxSummary>> {
        let strategies = self.config.strategies();
        let Some(model) = self.models().next() else {
            return BTreeMap::new();
        };
        model
            .problem()
            .codec()
            .order()
            .names()
            .iter()
            .map(|param| {
                (whisker_plot_filename(param, &strategies), box_summaries(report, param, &strategies))
            })
            .collect()
    }

    /// Write all reports into `dir` and mark the models as reported.
    ///
    /// # Errors
    /// Any [`ReportError`](crate::report::errors::ReportError) from building
    /// or writing a table.
    pub fn write_reports(&mut self, dir: &Path) -> ReportResult<ReportPaths> {
        let paths = ReportPaths {
            parameters_csv: dir.join("parameters.csv"),
            parameters_json: dir.join("parameters.json"),
            predictions_csv: dir.join("predictions.csv"),
            predictions_json: dir.join("predictions.json"),
            box_summaries_json: dir.join("box_summaries.json"),
        };

        let report = self.parameter_report();
        report.write_csv(&paths.parameters_csv)?;
        report.write_json(&paths.parameters_json)?;

        let predictions = self.prediction_table()?;
        predictions.write_csv(&paths.predictions_csv)?;
        predictions.write_json(&paths.predictions_json)?;

        write_json_file(&paths.box_summaries_json, &self.box_summaries(&report))?;

        for outcome in self.outcomes.values_mut() {
            if let RegionOutcome::Fitted(model) = outcome {
                if !model.results().is_empty() {
                    model.mark_reported()?;
                }
            }
        }
        info!(
            dir = %dir.display(),
            regions = self.outcomes.len(),
            failed = self.failures().count(),
            "reports.written"
        );
        Ok(paths)
    }
}
