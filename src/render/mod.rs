/// Chart rendering: two labelled series in, one image file out.
///
/// [`Renderer`] is the seam the orchestrator calls through; [`PlotRenderer`]
/// is the real implementation, drawing with `plotters` into an RGB buffer
/// and encoding it with `image`.

pub mod font;
pub mod plot;
pub mod style;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::data::model::Series;

pub use plot::PlotRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to draw chart: {0}")]
    Draw(String),

    #[error("failed to write {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("cannot use font {}: {reason}", path.display())]
    Font { path: PathBuf, reason: String },

    #[error("no usable font found for chart text; pass one with --font")]
    NoFont,
}

/// A series together with its legend entry.
#[derive(Debug, Clone, Copy)]
pub struct Labeled<'a> {
    pub label: &'a str,
    pub series: &'a Series,
}

impl<'a> Labeled<'a> {
    pub fn new(label: &'a str, series: &'a Series) -> Self {
        Labeled { label, series }
    }
}

/// Draws two series on one figure and writes it to `output`, replacing
/// whatever was there. Returns only once the file is fully written.
pub trait Renderer {
    fn render(&self, a: Labeled<'_>, b: Labeled<'_>, output: &Path) -> Result<(), RenderError>;
}
