//! Temperature line chart
//!
//! Every call owns its pixel buffer and drawing area, so concurrent
//! requests never share plotting state. Layout:
//! 1. Title centered on top (only with a registered font)
//! 2. Temperature over Year as a line with circle markers
//! 3. Grid lines at the major ticks of both axes

use std::ops::Range;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use plotters::coord::Shift;
use plotters::prelude::*;

use super::font::FONT_FAMILY;
use crate::data::ClimateTable;
use crate::error::{ClimateError, Result};

const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);
const GRID_COLOR: RGBColor = RGBColor(220, 220, 220);
const MARKER_RADIUS: u32 = 4;
const TARGET_TICKS: usize = 10;

/// Rendering parameters for one chart
#[derive(Debug, Clone, Copy)]
pub struct ChartOptions<'a> {
    pub width: u32,
    pub height: u32,
    pub title: &'a str,
    /// Draw title, axis descriptions and tick labels; needs a registered font
    pub labels: bool,
}

/// Render the chart and return it as base64 PNG text
pub fn render_chart_base64(table: &ClimateTable, opts: &ChartOptions<'_>) -> Result<String> {
    let png = render_chart_png(table, opts)?;
    Ok(STANDARD.encode(png))
}

/// Render the chart to PNG bytes
pub fn render_chart_png(table: &ClimateTable, opts: &ChartOptions<'_>) -> Result<Vec<u8>> {
    if opts.width == 0 || opts.height == 0 {
        return Err(ClimateError::Render(format!(
            "invalid chart size {}x{}",
            opts.width, opts.height
        )));
    }
    if table.records().is_empty() {
        return Err(ClimateError::NothingToPlot);
    }

    let mut pixels = vec![0u8; opts.width as usize * opts.height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (opts.width, opts.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;
        draw_chart(&root, table, opts)?;
        root.present().map_err(render_error)?;
    }

    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(
        &pixels,
        opts.width,
        opts.height,
        ExtendedColorType::Rgb8,
    )?;
    Ok(png)
}

fn draw_chart(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    table: &ClimateTable,
    opts: &ChartOptions<'_>,
) -> Result<()> {
    let x_range = year_range(table);
    let y_range = temperature_range(table);

    let mut builder = ChartBuilder::on(root);
    builder.margin(20);
    if opts.labels {
        builder
            .caption(opts.title, (FONT_FAMILY, 24))
            .x_label_area_size(45)
            .y_label_area_size(60);
    }
    let mut chart = builder
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(render_error)?;

    if opts.labels {
        chart
            .configure_mesh()
            .x_desc("Year")
            .y_desc("Temperature (°C)")
            .x_labels(TARGET_TICKS)
            .y_labels(TARGET_TICKS)
            .x_label_formatter(&|year| year.to_string())
            .y_label_formatter(&|temp| format!("{temp:.1}"))
            .bold_line_style(GRID_COLOR)
            .light_line_style(WHITE)
            .draw()
            .map_err(render_error)?;
    } else {
        // Mesh drawing always emits tick text, so lay the grid out by hand
        let years = year_ticks(&x_range);
        let temps = ticks(y_range.start, y_range.end, TARGET_TICKS);
        chart
            .draw_series(years.into_iter().map(|x| {
                PathElement::new(vec![(x, y_range.start), (x, y_range.end)], GRID_COLOR)
            }))
            .map_err(render_error)?;
        chart
            .draw_series(temps.into_iter().map(|y| {
                PathElement::new(vec![(x_range.start, y), (x_range.end, y)], GRID_COLOR)
            }))
            .map_err(render_error)?;
    }

    let points: Vec<(i64, f64)> = table
        .records()
        .iter()
        .map(|r| (r.year, r.temperature))
        .collect();

    chart
        .draw_series(LineSeries::new(
            points.iter().copied(),
            LINE_COLOR.stroke_width(2),
        ))
        .map_err(render_error)?;
    chart
        .draw_series(
            points
                .iter()
                .map(|&point| Circle::new(point, MARKER_RADIUS, LINE_COLOR.filled())),
        )
        .map_err(render_error)?;

    Ok(())
}

fn render_error(e: impl std::fmt::Display) -> ClimateError {
    ClimateError::Render(e.to_string())
}

/// Year axis with a 5% margin on both sides, at least one year
///
/// Saturates at the ends of `i64` so extreme years still give `start < end`.
fn year_range(table: &ClimateTable) -> Range<i64> {
    let (lo, hi) = table.year_bounds().unwrap_or((0, 1));
    let pad = (hi.saturating_sub(lo) / 20).max(1);
    lo.saturating_sub(pad)..hi.saturating_add(pad)
}

/// Temperature axis with a 5% margin, widened when all values are equal
fn temperature_range(table: &ClimateTable) -> Range<f64> {
    let (lo, hi) = table.temperature_bounds().unwrap_or((0.0, 1.0));
    let span = hi - lo;
    let pad = if span > 0.0 { span * 0.05 } else { 1.0 };
    (lo - pad)..(hi + pad)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn year_ticks(range: &Range<i64>) -> Vec<i64> {
    let span = range.end.saturating_sub(range.start);
    let step = nice_step(span as f64, TARGET_TICKS).max(1.0) as i64;
    let first = range.start.div_euclid(step).saturating_mul(step);
    std::iter::successors(Some(first), |y| y.checked_add(step))
        .skip_while(|y| *y < range.start)
        .take_while(|y| *y <= range.end)
        .collect()
}

/// Multiples of a "nice" step (1, 2, 5 x 10^n) inside `lo..=hi`
fn ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    let step = nice_step(hi - lo, target);
    if !step.is_finite() || step <= 0.0 {
        return vec![lo];
    }
    let first = (lo / step).ceil() * step;
    (0_i32..)
        .map(|i| f64::from(i).mul_add(step, first))
        .take_while(|v| *v <= hi)
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn nice_step(range: f64, target_steps: usize) -> f64 {
    let raw_step = range / target_steps as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let normalized = raw_step / magnitude;

    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };

    nice * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ClimateRecord;

    fn table(rows: &[(i64, f64)]) -> ClimateTable {
        ClimateTable::from_records(
            rows.iter()
                .map(|&(year, temperature)| ClimateRecord { year, temperature })
                .collect(),
        )
    }

    fn options() -> ChartOptions<'static> {
        ChartOptions {
            width: 1000,
            height: 600,
            title: "Temperature Changes Over Years",
            labels: false,
        }
    }

    #[test]
    fn test_png_has_figure_size() {
        let png = render_chart_png(&table(&[(2020, 14.2), (2021, 14.5)]), &options()).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), 1000);
        assert_eq!(decoded.height(), 600);
    }

    #[test]
    fn test_base64_decodes_to_png() {
        let encoded =
            render_chart_base64(&table(&[(1990, 13.9), (2000, 14.3), (2010, 14.6)]), &options())
                .unwrap();
        let bytes = STANDARD.decode(encoded).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn test_line_is_drawn() {
        let png = render_chart_png(&table(&[(2000, 10.0), (2010, 20.0)]), &options()).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_rgb8();
        let has_line_pixel = img
            .pixels()
            .any(|p| p.0 == [LINE_COLOR.0, LINE_COLOR.1, LINE_COLOR.2]);
        assert!(has_line_pixel);
    }

    #[test]
    fn test_single_point_and_flat_series() {
        render_chart_png(&table(&[(2020, 14.2)]), &options()).unwrap();
        render_chart_png(&table(&[(2019, 14.0), (2020, 14.0)]), &options()).unwrap();
    }

    #[test]
    fn test_nothing_to_plot() {
        assert!(matches!(
            render_chart_png(&table(&[]), &options()),
            Err(ClimateError::NothingToPlot)
        ));
    }

    #[test]
    fn test_extreme_years_do_not_overflow() {
        let t = table(&[(i64::MIN, 1.0), (i64::MAX, 2.0)]);
        let range = year_range(&t);
        assert_eq!(range, i64::MIN..i64::MAX);

        let ticks = year_ticks(&range);
        assert!(!ticks.is_empty());
        assert!(ticks.windows(2).all(|w| w[0] < w[1]));

        render_chart_png(&t, &options()).unwrap();
    }

    #[test]
    fn test_zero_size_rejected() {
        let mut opts = options();
        opts.width = 0;
        assert!(matches!(
            render_chart_png(&table(&[(2020, 14.2)]), &opts),
            Err(ClimateError::Render(_))
        ));
    }

    #[test]
    fn test_axis_ranges_are_padded() {
        let t = table(&[(1900, 10.0), (2000, 20.0)]);
        assert_eq!(year_range(&t), 1895..2005);
        let temps = temperature_range(&t);
        assert!((temps.start - 9.5).abs() < 1e-9);
        assert!((temps.end - 20.5).abs() < 1e-9);

        let flat = table(&[(2020, 14.0)]);
        assert_eq!(year_range(&flat), 2019..2021);
        assert_eq!(temperature_range(&flat), 13.0..15.0);
    }

    #[test]
    fn test_ticks() {
        assert_eq!(ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        // 110 years / 10 ticks rounds up to a step of 20
        assert_eq!(
            year_ticks(&(1895..2005)),
            vec![1900, 1920, 1940, 1960, 1980, 2000]
        );
        assert_eq!(year_ticks(&(2019..2021)), vec![2019, 2020, 2021]);
    }
}
