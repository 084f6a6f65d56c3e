//! Box/whisker summaries for plot renderers.
//!
//! Images are not rendered here. [`box_summaries`] produces the five-number
//! rows a renderer draws, and [`whisker_plot_filename`] fixes the output
//! name. Whiskers are the 5th and 95th percentiles, the box spans the 25th
//! to 75th, and the median line is the 50th.
use crate::estimation::traits::StrategyKind;
use crate::report::parameter_report::{ParameterReport, ParameterRow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSummary {
    pub param: String,
    pub region: String,
    /// Long strategy name.
    pub label: String,
    pub whislo: f64,
    pub q1: f64,
    pub med: f64,
    pub q3: f64,
    pub whishi: f64,
}

/// Boxes for `param`, one per (region, strategy) with results.
///
/// Regions are ordered by the median of the first strategy in `strategies`
/// (regions without it last, in report order); within a region boxes follow
/// `strategies`.
pub fn box_summaries(
    report: &ParameterReport, param: &str, strategies: &[StrategyKind],
) -> Vec<BoxSummary> {
    let mut rows: Vec<_> = report.rows_for_param(param).collect();
    if let Some(&first) = strategies.first() {
        rows.sort_by(|a, b| {
            let key = |r: &ParameterRow| r.get(first).map(|s| s.p50);
            match (key(*a), key(*b)) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        });
    }

    rows.into_iter()
        .flat_map(|row| {
            strategies.iter().filter_map(move |&kind| {
                let s = row.get(kind)?;
                Some(BoxSummary {
                    param: row.param.clone(),
                    region: row.region.clone(),
                    label: kind.name().to_string(),
                    whislo: s.p5,
                    q1: s.p25,
                    med: s.p50,
                    q3: s.p75,
                    whishi: s.p95,
                })
            })
        })
        .collect()
}

/// `boxplot_for_{param}_{long names joined by _}.png`.
pub fn whisker_plot_filename(param: &str, strategies: &[StrategyKind]) -> String {
    let names: Vec<&str> = strategies.iter().map(|k| k.name()).collect();
    format!("boxplot_for_{param}_{}.png", names.join("_"))
}
