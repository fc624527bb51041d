//! Chart catalogue for the disease-burden analyzer.
//!
//! Sixteen fixed charts, each prepared from the cleaned table into a
//! backend-independent [`Figure`] and drawn by a [`FigureRenderer`].
//!
//! ```rust,ignore
//! use burden_charts::{ChartKind, PlottersRenderer, PrepareOptions, FigureRenderer};
//!
//! let kind: ChartKind = "Income vs DALYs".parse()?;
//! let figure = kind.prepare(&cleaned.df, &PrepareOptions::default())?;
//! PlottersRenderer::default().render(&figure, "assets/income_regression.png".as_ref())?;
//! ```

pub mod catalogue;
pub mod error;
pub mod figure;
pub mod prepare;
pub mod render;

pub use catalogue::ChartKind;
pub use error::{ChartError, Result as ChartResult};
pub use figure::{Bar, Bin, BoxStats, Figure, FitLine, Plot, PointGroup, Trace};
pub use prepare::PrepareOptions;
pub use render::{FigureRenderer, ImageFormat, PlottersRenderer, render_catalogue};
