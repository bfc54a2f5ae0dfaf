use std::ops::Range;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use plotters::chart::SeriesAnno;
use plotters::coord::ranged1d::Ranged;
use plotters::coord::types::RangedCoordf64;
use plotters::element::{Cross, Pixel, Polygon, TriangleMarker};
use plotters::prelude::*;

use super::font::{self, FAMILY};
use super::style::{Marker, LINE_WIDTH, MARKER_SIZE, SERIES_OPACITY};
use super::{Labeled, RenderError, Renderer};
use crate::color::{resolve_color, UnknownColor};
use crate::config::ChartConfig;
use crate::data::model::Series;

/// Number of labelled ticks (and grid lines) per axis.
const TICKS: usize = 10;
/// Pixel distance between grid dots.
const GRID_DOT_SPACING: u32 = 4;

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

// ---------------------------------------------------------------------------
// PlotRenderer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct SlotStyle {
    color: RGBColor,
    marker: Marker,
}

/// Renders the comparison chart as a PNG.
#[derive(Debug, Clone)]
pub struct PlotRenderer {
    width: u32,
    height: u32,
    title: String,
    font: Option<PathBuf>,
    /// Styles for the first and second series.
    slots: [SlotStyle; 2],
}

impl PlotRenderer {
    pub fn new(chart: &ChartConfig) -> Result<Self, UnknownColor> {
        Ok(PlotRenderer {
            width: chart.width,
            height: chart.height,
            title: chart.title.clone(),
            font: chart.font.clone(),
            slots: [
                SlotStyle {
                    color: resolve_color(&chart.cubic.color)?,
                    marker: chart.cubic.marker,
                },
                SlotStyle {
                    color: resolve_color(&chart.newreno.color)?,
                    marker: chart.newreno.marker,
                },
            ],
        })
    }

    fn draw(&self, buf: &mut [u8], series: [Labeled<'_>; 2]) -> Result<(), RenderError> {
        let root = BitMapBackend::with_buffer(buf, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let (x_range, y_range) = axis_ranges(series.iter().map(|l| l.series));

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption(&self.title, (FAMILY, 28).into_font())
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d(x_range.clone(), y_range.clone())
            .map_err(draw_err)?;

        let x_digits = tick_precision(&x_range);
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(TICKS)
            .y_labels(TICKS)
            .x_desc("time in seconds")
            .y_desc("congestion window in bytes")
            .axis_desc_style((FAMILY, 18))
            .label_style((FAMILY, 14))
            .x_label_formatter(&|t| format!("{t:.x_digits$}"))
            .y_label_formatter(&|w| format!("{w:.0}"))
            .draw()
            .map_err(draw_err)?;

        draw_dotted_grid(&mut chart, &x_range, &y_range)?;

        for (labeled, slot) in series.iter().zip(self.slots.iter()) {
            let faded = slot.color.mix(SERIES_OPACITY);

            let anno = chart
                .draw_series(LineSeries::new(
                    labeled.series.points(),
                    faded.stroke_width(LINE_WIDTH),
                ))
                .map_err(draw_err)?
                .label(labeled.label);
            set_legend(anno, slot.marker, slot.color);

            draw_markers(&mut chart, labeled.series, slot.marker, faded.filled())?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font((FAMILY, 16))
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
        Ok(())
    }
}

impl Renderer for PlotRenderer {
    fn render(&self, a: Labeled<'_>, b: Labeled<'_>, output: &Path) -> Result<(), RenderError> {
        let len = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|px| px.checked_mul(3))
            .ok_or_else(|| {
                RenderError::Draw(format!("chart size {}x{} is too large", self.width, self.height))
            })?;
        font::ensure_font(self.font.as_deref())?;

        let mut buf = vec![0u8; len];
        self.draw(&mut buf, [a, b])?;

        let image = RgbImage::from_raw(self.width, self.height, buf)
            .ok_or_else(|| RenderError::Draw("pixel buffer does not match chart size".to_string()))?;
        image
            .save_with_format(output, ImageFormat::Png)
            .map_err(|source| RenderError::Encode {
                path: output.to_path_buf(),
                source,
            })?;

        log::debug!("wrote {}x{} chart to {}", self.width, self.height, output.display());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Drawing helpers
// ---------------------------------------------------------------------------

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

/// Axis ranges covering every sample of every series. The y axis always
/// starts at zero; empty or flat data gets a unit-wide range.
pub(crate) fn axis_ranges<'a>(series: impl IntoIterator<Item = &'a Series>) -> (Range<f64>, Range<f64>) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_max = 0.0_f64;

    for s in series {
        for (t, w) in s.points() {
            x_min = x_min.min(t);
            x_max = x_max.max(t);
            y_max = y_max.max(w);
        }
    }

    if !x_min.is_finite() {
        x_min = 0.0;
        x_max = 1.0;
    } else if x_max - x_min < f64::EPSILON {
        x_max = x_min + 1.0;
    }
    let y_top = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };

    (x_min..x_max, 0.0..y_top)
}

/// Decimal places needed for tick labels on `range` to stay distinct.
pub(crate) fn tick_precision(range: &Range<f64>) -> usize {
    let step = (range.end - range.start) / TICKS as f64;
    if !step.is_finite() || step <= 0.0 {
        return 1;
    }
    (-step.log10().floor()).clamp(0.0, 9.0) as usize
}

/// Legend sample: a short line with the series marker in the middle.
fn set_legend<'a, DB: DrawingBackend + 'a>(anno: &mut SeriesAnno<'a, DB>, marker: Marker, color: RGBColor) {
    let line = color.stroke_width(LINE_WIDTH);
    let fill = color.filled();
    let s = MARKER_SIZE;
    let segment = vec![(0, 0), (20, 0)];

    match marker {
        Marker::Circle => anno.legend(move |c| {
            EmptyElement::at(c) + PathElement::new(segment.clone(), line) + Circle::new((10, 0), s, fill)
        }),
        Marker::TriangleUp => anno.legend(move |c| {
            EmptyElement::at(c)
                + PathElement::new(segment.clone(), line)
                + Polygon::new(vec![(10 - s, s), (10 + s, s), (10, -s)], fill)
        }),
        Marker::TriangleDown => anno.legend(move |c| {
            EmptyElement::at(c)
                + PathElement::new(segment.clone(), line)
                + Polygon::new(vec![(10 - s, -s), (10 + s, -s), (10, s)], fill)
        }),
        Marker::Square => anno.legend(move |c| {
            EmptyElement::at(c)
                + PathElement::new(segment.clone(), line)
                + Rectangle::new([(10 - s, -s), (10 + s, s)], fill)
        }),
        Marker::Cross => anno.legend(move |c| {
            EmptyElement::at(c)
                + PathElement::new(segment.clone(), line)
                + PathElement::new(vec![(10 - s, -s), (10 + s, s)], line)
        }),
    };
}

/// Grid lines at the same positions the mesh puts its tick labels,
/// drawn as evenly spaced faint dots.
fn draw_dotted_grid<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    x_range: &Range<f64>,
    y_range: &Range<f64>,
) -> Result<(), RenderError> {
    let (w_px, h_px) = chart.plotting_area().dim_in_pixel();
    let style = RGBColor(0x80, 0x80, 0x80).mix(0.6).filled();

    let x_ticks = RangedCoordf64::from(x_range.clone()).key_points(TICKS);
    let y_ticks = RangedCoordf64::from(y_range.clone()).key_points(TICKS);

    let along = |range: &Range<f64>, px: u32| -> Vec<f64> {
        let n = (px / GRID_DOT_SPACING).max(1);
        let step = (range.end - range.start) / n as f64;
        (0..=n).map(|i| range.start + step * i as f64).collect()
    };
    let ys = along(y_range, h_px);
    let xs = along(x_range, w_px);

    let mut dots = Vec::with_capacity(x_ticks.len() * ys.len() + y_ticks.len() * xs.len());
    for &x in &x_ticks {
        dots.extend(ys.iter().map(|&y| (x, y)));
    }
    for &y in &y_ticks {
        dots.extend(xs.iter().map(|&x| (x, y)));
    }

    chart
        .draw_series(dots.into_iter().map(|p| Pixel::new(p, style)))
        .map_err(draw_err)?;
    Ok(())
}

fn draw_markers<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    series: &Series,
    marker: Marker,
    style: ShapeStyle,
) -> Result<(), RenderError> {
    let s = MARKER_SIZE;
    let points = series.points();

    match marker {
        Marker::Circle => chart
            .draw_series(points.map(|p| Circle::new(p, s, style)))
            .map(|_| ()),
        Marker::TriangleUp => chart
            .draw_series(points.map(|p| TriangleMarker::new(p, s, style)))
            .map(|_| ()),
        Marker::Cross => chart
            .draw_series(points.map(|p| Cross::new(p, s, style)))
            .map(|_| ()),
        Marker::Square => chart
            .draw_series(
                points.map(|p| EmptyElement::at(p) + Rectangle::new([(-s, -s), (s, s)], style)),
            )
            .map(|_| ()),
        // Backend y grows downwards, so the apex at +s points down.
        Marker::TriangleDown => chart
            .draw_series(
                points.map(|p| EmptyElement::at(p) + Polygon::new(vec![(-s, -s), (s, -s), (0, s)], style)),
            )
            .map(|_| ()),
    }
    .map_err(draw_err)
}
