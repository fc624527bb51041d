//! Backend-independent figure description.
//!
//! A [`Figure`] holds everything a renderer needs and nothing about how it is
//! drawn, so preparation can be tested without a drawing backend.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub plot: Plot,
}

impl Figure {
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        plot: Plot,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            plot,
        }
    }
}

/// The drawable content of a figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Plot {
    /// Equal-width bins with a density curve scaled to counts.
    Histogram { bins: Vec<Bin>, density: Vec<(f64, f64)> },
    /// One bar per category. Horizontal bars list the first category on top.
    Bars { bars: Vec<Bar>, horizontal: bool },
    /// One box per category.
    Boxes { boxes: Vec<BoxStats> },
    /// Point clouds, optionally with a fitted line.
    Scatter {
        groups: Vec<PointGroup>,
        fit: Option<FitLine>,
    },
    /// One polyline per group.
    Lines { traces: Vec<Trace> },
    /// Square matrix with the same labels on both axes.
    Heatmap {
        labels: Vec<String>,
        values: Vec<Vec<f64>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

/// Tukey box: whiskers reach the furthest points within 1.5 IQR of the box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub label: String,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub fliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointGroup {
    /// Legend entry; `None` for an unlabelled single group.
    pub label: Option<String>,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitLine {
    pub label: String,
    pub slope: f64,
    pub intercept: f64,
    pub x_min: f64,
    pub x_max: f64,
}

impl FitLine {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub label: Option<String>,
    pub points: Vec<(f64, f64)>,
}
