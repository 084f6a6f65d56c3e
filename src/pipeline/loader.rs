//! CSV input for region series.
//!
//! Expected columns: `region,date,new_positive,new_deceased,population`,
//! one row per region and day. Dates are `%Y-%m-%d`. Rows may arrive in
//! any order; each region's days must be consecutive once sorted.
use crate::window::core::series::{RegionSeries, threshold_index};
use anyhow::{Context, bail};
use chrono::NaiveDate;
use ndarray::Array1;
use serde::Deserialize;
use std::{collections::BTreeMap, path::Path};
use tracing::info;

#[derive(Debug, Deserialize)]
struct SeriesRow {
    region: String,
    date: String,
    new_positive: f64,
    new_deceased: f64,
    population: f64,
}

/// Running totals a region must reach before its windows may start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesThresholds {
    pub cases: f64,
    pub deaths: f64,
}

impl Default for SeriesThresholds {
    /// First reported case and first reported death.
    fn default() -> Self {
        Self { cases: 1.0, deaths: 1.0 }
    }
}

/// Load every region in `path`, sorted by region name.
pub fn load_region_series_csv(
    path: impl AsRef<Path>, thresholds: SeriesThresholds,
) -> anyhow::Result<Vec<RegionSeries>> {
    let path = path.as_ref();
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open series CSV: {}", path.display()))?;

    let mut by_region: BTreeMap<String, Vec<(NaiveDate, SeriesRow)>> = BTreeMap::new();
    for (line, result) in rdr.deserialize::<SeriesRow>().enumerate() {
        let row = result.with_context(|| format!("Bad row {} in {}", line + 1, path.display()))?;
        let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
            .with_context(|| format!("Bad date '{}' for region {}", row.date, row.region))?;
        by_region.entry(row.region.clone()).or_default().push((date, row));
    }

    let mut out = Vec::with_capacity(by_region.len());
    for (region, mut rows) in by_region {
        rows.sort_by_key(|(d, _)| *d);
        for pair in rows.windows(2) {
            let gap = (pair[1].0 - pair[0].0).num_days();
            if gap != 1 {
                bail!("Region {region}: dates {} and {} are not consecutive", pair[0].0, pair[1].0);
            }
        }
        let first_date = rows[0].0;
        let population = rows[rows.len() - 1].1.population;
        let positive: Vec<f64> = rows.iter().map(|(_, r)| r.new_positive).collect();
        let deceased: Vec<f64> = rows.iter().map(|(_, r)| r.new_deceased).collect();
        let case_idx = threshold_index(&positive, thresholds.cases);
        let death_idx = threshold_index(&deceased, thresholds.deaths);
        let series = RegionSeries::new(
            region.clone(),
            first_date,
            Array1::from(positive),
            Array1::from(deceased),
            population,
            case_idx,
            death_idx,
        )
        .with_context(|| format!("Invalid series for region {region}"))?;
        info!(region = %region, days = series.len(), case_idx, death_idx, "series.loaded");
        out.push(series);
    }
    Ok(out)
}
