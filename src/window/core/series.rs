//! Region series — validated daily case/death counts for one region.
//!
//! Purpose
//! -------
//! Hold the observed daily counts the window model fits, together with the
//! calendar origin and the threshold indices that bound each moving window.
//! All input validation for raw counts happens in [`RegionSeries::new`] so
//! downstream code can assume clean data.
//!
//! Key behaviors
//! -------------
//! - Enforces equal-length, non-empty, finite, non-negative count series.
//! - Records the first observed date; index `i` is `first_date + i` days.
//! - [`threshold_index`] derives the first day a cumulative count reaches a
//!   minimum, the usual way threshold indices are produced upstream.
//!
//! Invariants & assumptions
//! ------------------------
//! - Threshold indices satisfy `index <= len`; an index equal to `len` is
//!   accepted here and turns into an empty window at model construction.
//! - Population is finite and > 0.
//!
//! Conventions
//! -----------
//! - Series labels are [`Series::Positive`] (new cases) and
//!   [`Series::Deceased`] (new deaths).
use crate::window::errors::{ModelError, ModelResult};
use chrono::{Duration, NaiveDate};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// The two observed series every region carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Series {
    Positive,
    Deceased,
}

impl Series {
    pub const ALL: [Series; 2] = [Series::Positive, Series::Deceased];

    /// Label used in parameter names and error messages.
    pub fn label(self) -> &'static str {
        match self {
            Series::Positive => "positive",
            Series::Deceased => "deceased",
        }
    }
}

/// `RegionSeries` — observed daily counts plus calendar and threshold metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSeries {
    region: String,
    first_date: NaiveDate,
    new_positive: Array1<f64>,
    new_deceased: Array1<f64>,
    population: f64,
    case_threshold_index: usize,
    death_threshold_index: usize,
}

impl RegionSeries {
    /// Validate and build a region series.
    ///
    /// # Errors
    /// - `EmptySeries`, `SeriesLengthMismatch` for shape problems.
    /// - `NonFiniteCount`, `NegativeCount` for bad entries.
    /// - `InvalidPopulation` for a non-finite or non-positive population.
    /// - `ThresholdOutOfRange` when a threshold index exceeds the length.
    pub fn new(
        region: impl Into<String>, first_date: NaiveDate, new_positive: Array1<f64>,
        new_deceased: Array1<f64>, population: f64, case_threshold_index: usize,
        death_threshold_index: usize,
    ) -> ModelResult<Self> {
        if new_positive.is_empty() || new_deceased.is_empty() {
            return Err(ModelError::EmptySeries);
        }
        if new_positive.len() != new_deceased.len() {
            return Err(ModelError::SeriesLengthMismatch {
                positive: new_positive.len(),
                deceased: new_deceased.len(),
            });
        }
        validate_counts(Series::Positive, &new_positive)?;
        validate_counts(Series::Deceased, &new_deceased)?;
        if !population.is_finite() || population <= 0.0 {
            return Err(ModelError::InvalidPopulation { value: population });
        }
        let len = new_positive.len();
        for (series, index) in
            [(Series::Positive, case_threshold_index), (Series::Deceased, death_threshold_index)]
        {
            if index > len {
                return Err(ModelError::ThresholdOutOfRange { series: series.label(), index, len });
            }
        }

        Ok(Self {
            region: region.into(),
            first_date,
            new_positive,
            new_deceased,
            population,
            case_threshold_index,
            death_threshold_index,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn first_date(&self) -> NaiveDate {
        self.first_date
    }

    /// Date of the last observation.
    pub fn last_date(&self) -> NaiveDate {
        self.date_at(self.len() as i64 - 1)
    }

    /// Calendar date at series offset `offset` (negative offsets reach into
    /// the burn-in period).
    pub fn date_at(&self, offset: i64) -> NaiveDate {
        self.first_date + Duration::days(offset)
    }

    pub fn len(&self) -> usize {
        self.new_positive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.new_positive.is_empty()
    }

    pub fn population(&self) -> f64 {
        self.population
    }

    pub fn counts(&self, series: Series) -> &Array1<f64> {
        match series {
            Series::Positive => &self.new_positive,
            Series::Deceased => &self.new_deceased,
        }
    }

    pub fn threshold_index(&self, series: Series) -> usize {
        match series {
            Series::Positive => self.case_threshold_index,
            Series::Deceased => self.death_threshold_index,
        }
    }

    /// Cumulative count through the last observation.
    pub fn cumulative_total(&self, series: Series) -> f64 {
        self.counts(series).sum()
    }
}

/// First index at which the running total of `counts` reaches `minimum`;
/// `counts.len()` when it never does.
pub fn threshold_index(counts: &[f64], minimum: f64) -> usize {
    let mut total = 0.0;
    for (i, &c) in counts.iter().enumerate() {
        total += c;
        if total >= minimum {
            return i;
        }
    }
    counts.len()
}

// ---- Helper methods ----

fn validate_counts(series: Series, counts: &Array1<f64>) -> ModelResult<()> {
    for (index, &value) in counts.iter().enumerate() {
        if !value.is_finite() {
            return Err(ModelError::NonFiniteCount { series: series.label(), index, value });
        }
        if value < 0.0 {
            return Err(ModelError::NegativeCount { series: series.label(), index, value });
        }
    }
    Ok(())
}
