//! Rendering figures to image files.
//!
//! [`FigureRenderer`] is the seam between prepared figures and a drawing
//! backend. [`PlottersRenderer`] draws PNG through the bitmap backend and SVG
//! through the SVG backend. PDF is drawn as SVG in memory and converted with
//! `svg2pdf`.

use crate::catalogue::ChartKind;
use crate::error::{ChartError, Result, render_error};
use crate::figure::{Bar, Bin, BoxStats, Figure, FitLine, Plot, PointGroup, Trace};
use crate::prepare::PrepareOptions;
use plotters::coord::Shift;
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use polars::prelude::DataFrame;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::info;

const CAPTION_FONT: (&str, u32) = ("sans-serif", 28);
const BAR_COLOR: RGBColor = RGBColor(76, 114, 176);
const FIT_COLOR: RGBColor = RGBColor(196, 78, 82);

/// Seaborn's default categorical palette.
const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// Image formats recognised on export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
    Pdf,
}

impl ImageFormat {
    /// Format from the file extension, case-insensitively. No extension means PNG.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            None | Some("png") => Ok(Self::Png),
            Some("svg") => Ok(Self::Svg),
            Some("pdf") => Ok(Self::Pdf),
            Some(other) => Err(ChartError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
        }
    }
}

/// Writes a prepared figure to `path`.
pub trait FigureRenderer {
    fn render(&self, figure: &Figure, path: &Path) -> Result<()>;
}

/// Renderer backed by plotters.
#[derive(Debug, Clone, Copy)]
pub struct PlottersRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for PlottersRenderer {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 800,
        }
    }
}

impl FigureRenderer for PlottersRenderer {
    fn render(&self, figure: &Figure, path: &Path) -> Result<()> {
        let format = ImageFormat::from_path(path)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let size = (self.width, self.height);
        match format {
            ImageFormat::Png => draw(BitMapBackend::new(path, size).into_drawing_area(), figure),
            ImageFormat::Svg => draw(SVGBackend::new(path, size).into_drawing_area(), figure),
            ImageFormat::Pdf => {
                let mut svg = String::new();
                draw(SVGBackend::with_string(&mut svg, size).into_drawing_area(), figure)?;
                std::fs::write(path, svg_to_pdf(&svg)?)?;
                Ok(())
            }
        }
    }
}

fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &options).map_err(render_error)?;
    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(render_error)
}

/// Prepare every chart and render it into `dir` under its catalogue file name.
///
/// Stops at the first chart that fails.
pub fn render_catalogue<R: FigureRenderer + ?Sized>(
    df: &DataFrame,
    options: &PrepareOptions,
    renderer: &R,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(ChartKind::ALL.len());
    for kind in ChartKind::ALL {
        let figure = kind.prepare(df, options)?;
        let path = dir.join(kind.file_name());
        renderer.render(&figure, &path)?;
        info!(chart = kind.name(), path = %path.display(), "chart saved");
        written.push(path);
    }
    Ok(written)
}

fn draw<DB: DrawingBackend>(root: DrawingArea<DB, Shift>, figure: &Figure) -> Result<()> {
    root.fill(&WHITE).map_err(render_error)?;
    match &figure.plot {
        Plot::Histogram { bins, density } => draw_histogram(&root, figure, bins, density)?,
        Plot::Bars { bars, horizontal } => draw_bars(&root, figure, bars, *horizontal)?,
        Plot::Boxes { boxes } => draw_boxes(&root, figure, boxes)?,
        Plot::Scatter { groups, fit } => draw_scatter(&root, figure, groups, fit.as_ref())?,
        Plot::Lines { traces } => draw_lines(&root, figure, traces)?,
        Plot::Heatmap { labels, values } => draw_heatmap(&root, figure, labels, values)?,
    }
    root.present().map_err(render_error)?;
    Ok(())
}

fn draw_histogram<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    bins: &[Bin],
    density: &[(f64, f64)],
) -> Result<()> {
    let x_range = padded(
        bins.first().map_or(0.0, |b| b.start),
        bins.last().map_or(1.0, |b| b.end),
    );
    let y_max = bins
        .iter()
        .map(|b| b.count as f64)
        .chain(density.iter().map(|p| p.1))
        .fold(1.0, f64::max);

    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, CAPTION_FONT)
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, 0.0..y_max * 1.05)
        .map_err(render_error)?;
    chart
        .configure_mesh()
        .x_desc(&figure.x_label)
        .y_desc(&figure.y_label)
        .draw()
        .map_err(render_error)?;

    chart
        .draw_series(bins.iter().map(|b| {
            Rectangle::new(
                [(b.start, 0.0), (b.end, b.count as f64)],
                BAR_COLOR.mix(0.6).filled(),
            )
        }))
        .map_err(render_error)?;
    if !density.is_empty() {
        chart
            .draw_series(LineSeries::new(
                density.iter().copied(),
                BAR_COLOR.stroke_width(2),
            ))
            .map_err(render_error)?;
    }
    Ok(())
}

fn draw_bars<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    bars: &[Bar],
    horizontal: bool,
) -> Result<()> {
    let n = bars.len();
    let low = bars.iter().map(|b| b.value).fold(0.0, f64::min);
    let high = bars.iter().map(|b| b.value).fold(0.0, f64::max);
    let values = low..high * 1.05 + f64::EPSILON;
    let mut labels: Vec<String> = bars.iter().map(|b| b.label.clone()).collect();

    let mut builder = ChartBuilder::on(root);
    builder
        .caption(&figure.title, CAPTION_FONT)
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(if horizontal { 130 } else { 70 });

    if horizontal {
        // First bar on top.
        labels.reverse();
        let mut chart = builder
            .build_cartesian_2d(values, category_axis(n))
            .map_err(render_error)?;
        chart
            .configure_mesh()
            .y_labels(n)
            .y_label_formatter(&|y| label_at(&labels, *y))
            .x_desc(&figure.x_label)
            .y_desc(&figure.y_label)
            .draw()
            .map_err(render_error)?;
        chart
            .draw_series(bars.iter().enumerate().map(|(i, b)| {
                let y = (n - 1 - i) as f64;
                Rectangle::new([(0.0, y - 0.4), (b.value, y + 0.4)], BAR_COLOR.filled())
            }))
            .map_err(render_error)?;
    } else {
        let mut chart = builder
            .build_cartesian_2d(category_axis(n), values)
            .map_err(render_error)?;
        chart
            .configure_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| label_at(&labels, *x))
            .x_desc(&figure.x_label)
            .y_desc(&figure.y_label)
            .draw()
            .map_err(render_error)?;
        chart
            .draw_series(bars.iter().enumerate().map(|(i, b)| {
                let x = i as f64;
                Rectangle::new([(x - 0.4, 0.0), (x + 0.4, b.value)], BAR_COLOR.filled())
            }))
            .map_err(render_error)?;
    }
    Ok(())
}

fn draw_boxes<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    boxes: &[BoxStats],
) -> Result<()> {
    let n = boxes.len();
    let labels: Vec<String> = boxes.iter().map(|b| b.label.clone()).collect();
    let low = boxes
        .iter()
        .flat_map(|b| b.fliers.iter().copied().chain([b.lower_whisker]))
        .fold(f64::INFINITY, f64::min);
    let high = boxes
        .iter()
        .flat_map(|b| b.fliers.iter().copied().chain([b.upper_whisker]))
        .fold(f64::NEG_INFINITY, f64::max);

    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, CAPTION_FONT)
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(category_axis(n), padded(low, high))
        .map_err(render_error)?;
    chart
        .configure_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| label_at(&labels, *x))
        .x_desc(&figure.x_label)
        .y_desc(&figure.y_label)
        .draw()
        .map_err(render_error)?;

    for (i, b) in boxes.iter().enumerate() {
        let x = i as f64;
        let color = PALETTE[i % PALETTE.len()];
        chart
            .draw_series([
                Rectangle::new([(x - 0.3, b.q1), (x + 0.3, b.q3)], color.mix(0.7).filled()),
                Rectangle::new([(x - 0.3, b.q1), (x + 0.3, b.q3)], BLACK.stroke_width(1)),
            ])
            .map_err(render_error)?;
        chart
            .draw_series([
                PathElement::new(vec![(x - 0.3, b.median), (x + 0.3, b.median)], BLACK.stroke_width(2)),
                PathElement::new(vec![(x, b.q3), (x, b.upper_whisker)], BLACK.stroke_width(1)),
                PathElement::new(vec![(x, b.q1), (x, b.lower_whisker)], BLACK.stroke_width(1)),
                PathElement::new(
                    vec![(x - 0.15, b.upper_whisker), (x + 0.15, b.upper_whisker)],
                    BLACK.stroke_width(1),
                ),
                PathElement::new(
                    vec![(x - 0.15, b.lower_whisker), (x + 0.15, b.lower_whisker)],
                    BLACK.stroke_width(1),
                ),
            ])
            .map_err(render_error)?;
        chart
            .draw_series(
                b.fliers
                    .iter()
                    .map(|v| Circle::new((x, *v), 3, BLACK.stroke_width(1))),
            )
            .map_err(render_error)?;
    }
    Ok(())
}

fn draw_scatter<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    groups: &[PointGroup],
    fit: Option<&FitLine>,
) -> Result<()> {
    let points = groups.iter().flat_map(|g| g.points.iter().copied());
    let fit_ends = fit
        .map(|f| vec![(f.x_min, f.at(f.x_min)), (f.x_max, f.at(f.x_max))])
        .unwrap_or_default();
    let (x_range, y_range) = bounds(points.chain(fit_ends.iter().copied()));

    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, CAPTION_FONT)
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)
        .map_err(render_error)?;
    chart
        .configure_mesh()
        .x_desc(&figure.x_label)
        .y_desc(&figure.y_label)
        .draw()
        .map_err(render_error)?;

    let mut legend = false;
    for (i, group) in groups.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let series = chart
            .draw_series(
                group
                    .points
                    .iter()
                    .map(|p| Circle::new(*p, 2, color.mix(0.4).filled())),
            )
            .map_err(render_error)?;
        if let Some(label) = &group.label {
            series
                .label(label.as_str())
                .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
            legend = true;
        }
    }

    if let Some(fit) = fit {
        chart
            .draw_series(LineSeries::new(fit_ends, FIT_COLOR.stroke_width(2)))
            .map_err(render_error)?
            .label(fit.label.as_str())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], FIT_COLOR.stroke_width(2)));
        legend = true;
    }

    if legend {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_error)?;
    }
    Ok(())
}

fn draw_lines<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    traces: &[Trace],
) -> Result<()> {
    let (x_range, y_range) = bounds(traces.iter().flat_map(|t| t.points.iter().copied()));

    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, CAPTION_FONT)
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)
        .map_err(render_error)?;
    chart
        .configure_mesh()
        .x_label_formatter(&|x| format!("{x:.0}"))
        .x_desc(&figure.x_label)
        .y_desc(&figure.y_label)
        .draw()
        .map_err(render_error)?;

    let mut legend = false;
    for (i, trace) in traces.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let series = chart
            .draw_series(LineSeries::new(
                trace.points.iter().copied(),
                color.stroke_width(2),
            ))
            .map_err(render_error)?;
        if let Some(label) = &trace.label {
            series
                .label(label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
            legend = true;
        }
    }

    if legend {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_error)?;
    }
    Ok(())
}

fn draw_heatmap<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    labels: &[String],
    values: &[Vec<f64>],
) -> Result<()> {
    let n = labels.len();
    let rows: Vec<String> = labels.iter().rev().cloned().collect();

    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, CAPTION_FONT)
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(190)
        .build_cartesian_2d(category_axis(n), category_axis(n))
        .map_err(render_error)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n)
        .y_labels(n)
        .x_label_formatter(&|x| label_at(labels, *x))
        .y_label_formatter(&|y| label_at(&rows, *y))
        .draw()
        .map_err(render_error)?;

    let annotation = TextStyle::from(("sans-serif", 16).into_font())
        .pos(Pos::new(HPos::Center, VPos::Center));

    for (row, cells) in values.iter().enumerate() {
        let y = (n - 1 - row) as f64;
        for (column, value) in cells.iter().enumerate() {
            let x = column as f64;
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                    coolwarm(*value).filled(),
                )))
                .map_err(render_error)?;
            chart
                .draw_series(std::iter::once(Text::new(
                    format!("{value:.5}"),
                    (x, y),
                    annotation.clone(),
                )))
                .map_err(render_error)?;
        }
    }
    Ok(())
}

/// Category positions `0..count`, each centred in a unit-wide slot.
///
/// Ticks land on the integer positions only, so label formatters see exact
/// category indices.
#[derive(Debug, Clone, Copy)]
struct CategoryAxis {
    count: usize,
}

fn category_axis(count: usize) -> CategoryAxis {
    CategoryAxis { count }
}

impl Ranged for CategoryAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        let range = self.range();
        let share = (value - range.start) / (range.end - range.start);
        limit.0 + (share * f64::from(limit.1 - limit.0)).round() as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        let max = hint.max_num_points();
        if max == 0 {
            return Vec::new();
        }
        let step = self.count.div_ceil(max).max(1);
        (0..self.count).step_by(step).map(|i| i as f64).collect()
    }

    fn range(&self) -> Range<f64> {
        -0.5..self.count.max(1) as f64 - 0.5
    }
}

fn label_at(labels: &[String], position: f64) -> String {
    let index = position.round();
    if (position - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

/// Axis ranges covering all points with a small margin.
fn bounds(points: impl Iterator<Item = (f64, f64)>) -> (Range<f64>, Range<f64>) {
    let (mut x_lo, mut x_hi, mut y_lo, mut y_hi) = (
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
    );
    for (x, y) in points {
        x_lo = x_lo.min(x);
        x_hi = x_hi.max(x);
        y_lo = y_lo.min(y);
        y_hi = y_hi.max(y);
    }
    (padded(x_lo, x_hi), padded(y_lo, y_hi))
}

/// `[lo, hi]` widened by 5%; a degenerate or empty range becomes a unit range.
fn padded(lo: f64, hi: f64) -> Range<f64> {
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    if hi <= lo {
        return lo - 0.5..hi + 0.5;
    }
    let margin = (hi - lo) * 0.05;
    lo - margin..hi + margin
}

/// Diverging blue-white-red colour for a correlation in `[-1, 1]`.
fn coolwarm(value: f64) -> RGBColor {
    const COLD: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const NEUTRAL: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    let t = if value.is_finite() { value.clamp(-1.0, 1.0) } else { 0.0 };
    let (from, to, weight) = if t < 0.0 {
        (NEUTRAL, COLD, -t)
    } else {
        (NEUTRAL, WARM, t)
    };
    let mix = |a: f64, b: f64| (a + (b - a) * weight).round() as u8;
    RGBColor(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn figure() -> Figure {
        Figure::new(
            "t",
            "x",
            "y",
            Plot::Bars {
                bars: vec![Bar {
                    label: "a".into(),
                    value: 1.0,
                }],
                horizontal: false,
            },
        )
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ImageFormat::from_path(Path::new("a/b.PNG")).unwrap(), ImageFormat::Png);
        assert_eq!(ImageFormat::from_path(Path::new("chart")).unwrap(), ImageFormat::Png);
        assert_eq!(ImageFormat::from_path(Path::new("c.svg")).unwrap(), ImageFormat::Svg);
        assert_eq!(ImageFormat::from_path(Path::new("c.pdf")).unwrap(), ImageFormat::Pdf);

        let err = ImageFormat::from_path(Path::new("c.jpg")).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_pdf_is_written_into_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/chart.pdf");

        PlottersRenderer::default().render(&figure(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_categorical_charts_render_to_png() {
        let dir = tempfile::tempdir().unwrap();
        let labels = vec!["Low".to_string(), "Medium".to_string(), "High".to_string()];
        let bars: Vec<Bar> = labels
            .iter()
            .zip([3.0, 1.5, 2.0])
            .map(|(label, value)| Bar {
                label: label.clone(),
                value,
            })
            .collect();
        let boxes: Vec<BoxStats> = labels
            .iter()
            .map(|label| BoxStats {
                label: label.clone(),
                q1: 1.0,
                median: 2.0,
                q3: 3.0,
                lower_whisker: 0.0,
                upper_whisker: 4.0,
                fliers: vec![6.0],
            })
            .collect();
        let plots = [
            ("bars.png", Plot::Bars { bars: bars.clone(), horizontal: false }),
            ("bars_horizontal.png", Plot::Bars { bars, horizontal: true }),
            ("boxes.png", Plot::Boxes { boxes }),
            (
                "heatmap.png",
                Plot::Heatmap {
                    labels: labels.clone(),
                    values: vec![
                        vec![1.0, 0.5, -0.2],
                        vec![0.5, 1.0, 0.1],
                        vec![-0.2, 0.1, 1.0],
                    ],
                },
            ),
        ];

        let renderer = PlottersRenderer { width: 400, height: 300 };
        for (name, plot) in plots {
            let path = dir.path().join(name);
            renderer
                .render(&Figure::new("t", "x", "y", plot), &path)
                .unwrap();
            assert!(std::fs::metadata(&path).unwrap().len() > 0, "{name}");
        }
    }

    #[test]
    fn test_category_axis_ticks_on_integers() {
        let axis = category_axis(4);
        assert_eq!(axis.range(), -0.5..3.5);
        assert_eq!(axis.key_points(4usize), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(axis.key_points(2usize), vec![0.0, 2.0]);
        assert_eq!(axis.map(&-0.5, (0, 400)), 0);
        assert_eq!(axis.map(&1.5, (0, 400)), 200);
    }

    #[test]
    fn test_label_at_integer_positions_only() {
        let labels = vec!["a".to_string(), "b".to_string()];
        assert_eq!(label_at(&labels, 1.0), "b");
        assert_eq!(label_at(&labels, 0.5), "");
        assert_eq!(label_at(&labels, 2.0), "");
        assert_eq!(label_at(&labels, -1.0), "");
    }

    #[test]
    fn test_padded_ranges() {
        assert_eq!(padded(0.0, 10.0), -0.5..10.5);
        assert_eq!(padded(3.0, 3.0), 2.5..3.5);
        assert_eq!(padded(f64::INFINITY, f64::NEG_INFINITY), 0.0..1.0);
    }

    #[test]
    fn test_coolwarm_endpoints() {
        assert_eq!(coolwarm(0.0), RGBColor(221, 221, 221));
        assert_eq!(coolwarm(1.0), RGBColor(180, 4, 38));
        assert_eq!(coolwarm(-1.0), RGBColor(59, 76, 192));
        assert_eq!(coolwarm(f64::NAN), RGBColor(221, 221, 221));
    }
}
