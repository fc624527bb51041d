//! Figure preparation.
//!
//! Every chart reads the cleaned table and reduces it to a [`Figure`]: binned
//! counts, per-group means or quartiles, sampled point clouds, a correlation
//! matrix or per-year means. Rows missing a plotted value are skipped.

use crate::catalogue::ChartKind;
use crate::error::{ChartError, Result};
use crate::figure::{Bar, Bin, BoxStats, Figure, FitLine, Plot, PointGroup, Trace};
use burden_processing::PipelineConfig;
use burden_processing::cleaner::classify_disease;
use burden_processing::schema::{
    AGE_GROUP, COUNTRY, DALYS, DISEASE_CATEGORY, DISEASE_TYPE, DOCTORS, EDUCATION, GENDER,
    HEALTHCARE_ACCESS, HOSPITAL_BEDS, INCOME, INCOME_GROUP, INCOME_GROUP_LABELS, TREATMENT_TYPE,
    URBANIZATION, YEAR,
};
use burden_processing::statistics::correlation::pearson;
use burden_processing::statistics::descriptive::{mean, quantile_sorted, sample_std};
use burden_processing::statistics::regression::ols;
use burden_processing::utils::{numeric_values, paired_values, sorted, string_values};
use polars::prelude::DataFrame;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;
use tracing::debug;

pub const HISTOGRAM_BINS: usize = 30;
pub const TOP_COUNTRIES: usize = 10;
const DENSITY_POINTS: usize = 200;
const WHISKER_MULTIPLIER: f64 = 1.5;
const FIT_LABEL: &str = "Regression Line";

/// Columns of the correlation heatmap, in axis order.
pub const CORRELATION_COLUMNS: [&str; 4] = [DALYS, INCOME, EDUCATION, URBANIZATION];

/// Sampling settings for scatter charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrepareOptions {
    /// Maximum number of points drawn.
    pub sample_size: usize,
    /// `None` draws a different sample every time.
    pub sample_seed: Option<u64>,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            sample_size: 5000,
            sample_seed: Some(42),
        }
    }
}

impl From<&PipelineConfig> for PrepareOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            sample_size: config.sample_size,
            sample_seed: config.sample_seed,
        }
    }
}

/// Build the figure for `kind`. Columns are assumed present.
pub(crate) fn figure(kind: ChartKind, df: &DataFrame, options: &PrepareOptions) -> Result<Figure> {
    let no_data = || ChartError::NoData(kind.name().to_string());

    let (x_label, y_label, plot) = match kind {
        ChartKind::DalysHistogram => {
            let values: Vec<f64> = numeric_values(df, DALYS)?.into_iter().flatten().collect();
            if values.is_empty() {
                return Err(no_data());
            }
            (DALYS, "Count", histogram_plot(&values))
        }
        ChartKind::DalysByGender => (GENDER, DALYS, mean_bars(df, GENDER, false, no_data)?),
        ChartKind::DalysByCategory => (
            DISEASE_CATEGORY,
            DALYS,
            mean_bars(df, DISEASE_CATEGORY, false, no_data)?,
        ),
        ChartKind::TopCountries => ("Average DALYs", COUNTRY, mean_bars(df, COUNTRY, true, no_data)?),
        ChartKind::DalysByAgeGroup => (AGE_GROUP, DALYS, boxes(df, AGE_GROUP, no_data)?),
        ChartKind::DalysByTreatment => (TREATMENT_TYPE, DALYS, boxes(df, TREATMENT_TYPE, no_data)?),
        ChartKind::DalysByDiseaseType => {
            let types = disease_types(df)?;
            let groups = grouped(types, numeric_values(df, DALYS)?);
            (DISEASE_TYPE, DALYS, box_plot(groups).ok_or_else(no_data)?)
        }
        ChartKind::IncomeVsDalys => (INCOME, DALYS, scatter(df, INCOME, None, true, options, no_data)?),
        ChartKind::EducationVsDalys => (
            EDUCATION,
            DALYS,
            scatter(df, EDUCATION, Some(DISEASE_CATEGORY), false, options, no_data)?,
        ),
        ChartKind::UrbanizationVsDalys => (
            URBANIZATION,
            DALYS,
            scatter(df, URBANIZATION, Some(DISEASE_CATEGORY), false, options, no_data)?,
        ),
        ChartKind::DalysVsDoctors => (
            DOCTORS,
            DALYS,
            scatter(df, DOCTORS, Some(DISEASE_CATEGORY), false, options, no_data)?,
        ),
        ChartKind::DalysVsHospitalBeds => (
            HOSPITAL_BEDS,
            DALYS,
            scatter(df, HOSPITAL_BEDS, None, false, options, no_data)?,
        ),
        ChartKind::DalysVsHealthcareAccess => (
            HEALTHCARE_ACCESS,
            DALYS,
            scatter(df, HEALTHCARE_ACCESS, None, false, options, no_data)?,
        ),
        ChartKind::CorrelationMatrix => ("", "", correlation_matrix(df)?),
        ChartKind::DalysOverTime => {
            let points = yearly_means(&numeric_values(df, YEAR)?, &numeric_values(df, DALYS)?);
            if points.is_empty() {
                return Err(no_data());
            }
            let traces = vec![Trace {
                label: None,
                points,
            }];
            (YEAR, DALYS, Plot::Lines { traces })
        }
        ChartKind::DalysOverTimeByIncome => {
            let traces = income_traces(df)?;
            if traces.is_empty() {
                return Err(no_data());
            }
            (YEAR, DALYS, Plot::Lines { traces })
        }
    };

    debug!(chart = kind.name(), "figure prepared");
    Ok(Figure::new(kind.title(), x_label, y_label, plot))
}

// =============================================================================
// Distributions
// =============================================================================

fn histogram_plot(values: &[f64]) -> Plot {
    let bins = histogram(values, HISTOGRAM_BINS);
    let width = bins.first().map_or(0.0, |b| b.end - b.start);
    let scale = values.len() as f64 * width;
    let density = gaussian_kde(values, DENSITY_POINTS)
        .into_iter()
        .map(|(x, d)| (x, d * scale))
        .collect();
    Plot::Histogram { bins, density }
}

/// Equal-width bins over `[min, max]`; the last bin is closed on the right.
/// A constant sample gets a unit-wide range centred on its value.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    let Some((lo, hi)) = min_max(values) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    let (lo, hi) = if lo == hi { (lo - 0.5, hi + 0.5) } else { (lo, hi) };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for value in values {
        let index = (((value - lo) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            start: lo + i as f64 * width,
            end: if i + 1 == bins { hi } else { lo + (i + 1) as f64 * width },
            count,
        })
        .collect()
}

/// Gaussian kernel density with Scott's bandwidth, evaluated at `points`
/// evenly spaced positions across the data range.
///
/// Fewer than two values or no spread gives an empty curve.
pub fn gaussian_kde(values: &[f64], points: usize) -> Vec<(f64, f64)> {
    let Some(std) = sample_std(values).filter(|s| s.is_finite() && *s > 0.0) else {
        return Vec::new();
    };
    let Some((lo, hi)) = min_max(values) else {
        return Vec::new();
    };
    if points < 2 {
        return Vec::new();
    }

    let n = values.len() as f64;
    let bandwidth = std * n.powf(-0.2);
    let norm = 1.0 / (n * bandwidth * (2.0 * PI).sqrt());
    let step = (hi - lo) / (points - 1) as f64;

    (0..points)
        .map(|i| {
            let x = lo + step * i as f64;
            let sum: f64 = values
                .iter()
                .map(|v| {
                    let z = (x - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum();
            (x, sum * norm)
        })
        .collect()
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

// =============================================================================
// Categories
// =============================================================================

/// Pair keys with values, grouping in order of first appearance.
/// Rows missing either side are skipped.
pub fn grouped(keys: Vec<Option<String>>, values: Vec<Option<f64>>) -> Vec<(String, Vec<f64>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();

    for (key, value) in keys.into_iter().zip(values) {
        let (Some(key), Some(value)) = (key, value) else {
            continue;
        };
        let slot = match index.get(&key) {
            Some(slot) => *slot,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, Vec::new()));
                groups.len() - 1
            }
        };
        groups[slot].1.push(value);
    }
    groups
}

/// Mean DALYs per value of `group_col`, in order of first appearance.
pub fn group_means(df: &DataFrame, group_col: &str) -> Result<Vec<Bar>> {
    let groups = grouped(string_values(df, group_col)?, numeric_values(df, DALYS)?);
    Ok(groups
        .into_iter()
        .filter_map(|(label, values)| mean(&values).map(|value| Bar { label, value }))
        .collect())
}

/// The `limit` highest bars, highest first. Ties keep their original order.
pub fn top_bars(mut bars: Vec<Bar>, limit: usize) -> Vec<Bar> {
    bars.sort_by(|a, b| b.value.total_cmp(&a.value));
    bars.truncate(limit);
    bars
}

fn mean_bars(
    df: &DataFrame,
    group_col: &str,
    top: bool,
    no_data: impl Fn() -> ChartError,
) -> Result<Plot> {
    let mut bars = group_means(df, group_col)?;
    if top {
        bars = top_bars(bars, TOP_COUNTRIES);
    }
    if bars.is_empty() {
        return Err(no_data());
    }
    Ok(Plot::Bars {
        bars,
        horizontal: top,
    })
}

fn boxes(df: &DataFrame, group_col: &str, no_data: impl Fn() -> ChartError) -> Result<Plot> {
    let groups = grouped(string_values(df, group_col)?, numeric_values(df, DALYS)?);
    box_plot(groups).ok_or_else(no_data)
}

fn box_plot(groups: Vec<(String, Vec<f64>)>) -> Option<Plot> {
    let boxes: Vec<BoxStats> = groups
        .into_iter()
        .filter_map(|(label, values)| box_stats(label, &values))
        .collect();
    (!boxes.is_empty()).then_some(Plot::Boxes { boxes })
}

/// Quartiles, whiskers and fliers of one group. `None` when empty.
pub fn box_stats(label: String, values: &[f64]) -> Option<BoxStats> {
    let values = sorted(values);
    let q1 = quantile_sorted(&values, 0.25)?;
    let median = quantile_sorted(&values, 0.5)?;
    let q3 = quantile_sorted(&values, 0.75)?;

    let iqr = q3 - q1;
    let low_fence = q1 - WHISKER_MULTIPLIER * iqr;
    let high_fence = q3 + WHISKER_MULTIPLIER * iqr;

    let lower_whisker = values
        .iter()
        .copied()
        .find(|v| *v >= low_fence)
        .unwrap_or(q1);
    let upper_whisker = values
        .iter()
        .rev()
        .copied()
        .find(|v| *v <= high_fence)
        .unwrap_or(q3);
    let fliers = values
        .iter()
        .copied()
        .filter(|v| *v < low_fence || *v > high_fence)
        .collect();

    Some(BoxStats {
        label,
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        fliers,
    })
}

/// Disease type recomputed from the category, so the chart also works on
/// tables cleaned without derived columns.
fn disease_types(df: &DataFrame) -> Result<Vec<Option<String>>> {
    Ok(string_values(df, DISEASE_CATEGORY)?
        .iter()
        .map(|category| Some(classify_disease(category.as_deref()).to_string()))
        .collect())
}

// =============================================================================
// Scatter
// =============================================================================

/// Ascending row indices of a sample of `min(sample_size, n)` rows drawn
/// without replacement.
pub fn sample_indices(n: usize, options: &PrepareOptions) -> Vec<usize> {
    let amount = options.sample_size.min(n);
    let mut rng = match options.sample_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let indices: Vec<usize> = (0..n).collect();
    let mut picked: Vec<usize> = indices
        .choose_multiple(&mut rng, amount)
        .copied()
        .collect();
    picked.sort_unstable();
    picked
}

fn scatter(
    df: &DataFrame,
    x_col: &str,
    hue_col: Option<&str>,
    with_fit: bool,
    options: &PrepareOptions,
    no_data: impl Fn() -> ChartError,
) -> Result<Plot> {
    let xs = numeric_values(df, x_col)?;
    let ys = numeric_values(df, DALYS)?;
    let hues = match hue_col {
        Some(column) => string_values(df, column)?,
        None => vec![None; xs.len()],
    };

    let rows: Vec<(f64, f64, Option<String>)> = xs
        .into_iter()
        .zip(ys)
        .zip(hues)
        .filter_map(|((x, y), hue)| match (x, y) {
            (Some(x), Some(y)) if hue_col.is_none() || hue.is_some() => Some((x, y, hue)),
            _ => None,
        })
        .collect();
    if rows.is_empty() {
        return Err(no_data());
    }

    let sample: Vec<&(f64, f64, Option<String>)> = sample_indices(rows.len(), options)
        .into_iter()
        .map(|i| &rows[i])
        .collect();
    debug!(column = x_col, sampled = sample.len(), of = rows.len(), "scatter sample");

    let fit = if with_fit {
        let x: Vec<f64> = sample.iter().map(|r| r.0).collect();
        let y: Vec<f64> = sample.iter().map(|r| r.1).collect();
        Some(fit_line(&x, &y)?)
    } else {
        None
    };

    let groups = match hue_col {
        Some(_) => {
            let mut index: HashMap<&str, usize> = HashMap::new();
            let mut groups: Vec<PointGroup> = Vec::new();
            for (x, y, hue) in sample.iter().map(|r| (r.0, r.1, r.2.as_deref().unwrap_or(""))) {
                let slot = *index.entry(hue).or_insert_with(|| {
                    groups.push(PointGroup {
                        label: Some(hue.to_string()),
                        points: Vec::new(),
                    });
                    groups.len() - 1
                });
                groups[slot].points.push((x, y));
            }
            groups
        }
        None => vec![PointGroup {
            label: None,
            points: sample.iter().map(|r| (r.0, r.1)).collect(),
        }],
    };

    Ok(Plot::Scatter { groups, fit })
}

/// Least-squares line through the points, spanning their x range.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Result<FitLine> {
    let (coefficients, intercept, _) = ols(&[xs.to_vec()], ys)?;
    let (x_min, x_max) = min_max(xs).unwrap_or((0.0, 0.0));
    Ok(FitLine {
        label: FIT_LABEL.to_string(),
        slope: coefficients.first().copied().unwrap_or(0.0),
        intercept,
        x_min,
        x_max,
    })
}

// =============================================================================
// Matrix and time series
// =============================================================================

/// Pairwise Pearson r of [`CORRELATION_COLUMNS`].
pub fn correlation_matrix(df: &DataFrame) -> Result<Plot> {
    let n = CORRELATION_COLUMNS.len();
    let mut values = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in i..n {
            let (a, b) = (CORRELATION_COLUMNS[i], CORRELATION_COLUMNS[j]);
            let (xs, ys) = paired_values(df, a, b)?;
            let (r, _) = pearson(&xs, &ys, a, b)?;
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(Plot::Heatmap {
        labels: CORRELATION_COLUMNS.iter().map(|c| c.to_string()).collect(),
        values,
    })
}

/// Mean of `values` per year, ascending by year.
pub fn yearly_means(years: &[Option<f64>], values: &[Option<f64>]) -> Vec<(f64, f64)> {
    let mut sums: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for (year, value) in years.iter().zip(values) {
        if let (Some(year), Some(value)) = (year, value) {
            let entry = sums.entry(year.round() as i64).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(year, (sum, count))| (year as f64, sum / count as f64))
        .collect()
}

/// One yearly-mean trace per income group, lowest group first.
fn income_traces(df: &DataFrame) -> Result<Vec<Trace>> {
    let years = numeric_values(df, YEAR)?;
    let values = numeric_values(df, DALYS)?;
    let groups = string_values(df, INCOME_GROUP)?;

    Ok(INCOME_GROUP_LABELS
        .iter()
        .filter_map(|label| {
            let (years, values): (Vec<Option<f64>>, Vec<Option<f64>>) = years
                .iter()
                .zip(&values)
                .zip(&groups)
                .filter(|(_, group)| group.as_deref() == Some(*label))
                .map(|((year, value), _)| (*year, *value))
                .unzip();
            let points = yearly_means(&years, &values);
            (!points.is_empty()).then(|| Trace {
                label: Some(label.to_string()),
                points,
            })
        })
        .collect())
}
