//! Plotters rendering of the report charts into PNG images.
//!
//! Charts are drawn into an in-memory RGB buffer (no temp files) and encoded
//! with the `image` PNG encoder, ready to embed in the workbook.

use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::error::AppError;
use crate::plot::charts::{BarChart, LineChart};

/// Encoded chart image.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Drawing backend seam; the report only ever needs PNG bytes back.
pub trait ChartBackend {
    fn render_line(&self, chart: &LineChart) -> Result<RenderedImage, AppError>;
    fn render_bar(&self, chart: &BarChart) -> Result<RenderedImage, AppError>;
}

/// matplotlib's default cycle, so the charts look like the usual notebook output.
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

const FONT: &str = "sans-serif";

#[derive(Debug, Clone, Copy)]
pub struct PlottersBackend {
    pub line_size: (u32, u32),
    pub bar_size: (u32, u32),
}

impl Default for PlottersBackend {
    fn default() -> Self {
        Self {
            line_size: (1200, 600),
            bar_size: (1000, 600),
        }
    }
}

impl ChartBackend for PlottersBackend {
    fn render_line(&self, chart: &LineChart) -> Result<RenderedImage, AppError> {
        let (width, height) = self.line_size;
        let mut buf = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
            draw_line_chart(&root, chart)
                .and_then(|_| root.present())
                .map_err(|e| AppError::Render(format!("'{}': {e}", chart.title)))?;
        }
        encode_png(&buf, width, height)
    }

    fn render_bar(&self, chart: &BarChart) -> Result<RenderedImage, AppError> {
        let (width, height) = self.bar_size;
        let mut buf = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
            draw_bar_chart(&root, chart)
                .and_then(|_| root.present())
                .map_err(|e| AppError::Render(format!("'{}': {e}", chart.title)))?;
        }
        encode_png(&buf, width, height)
    }
}

fn draw_line_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &LineChart,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let points = chart.series.iter().flat_map(|s| s.points.iter());
    let (mut x0, mut x1) = (i32::MAX, i32::MIN);
    let (mut y0, mut y1) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points {
        x0 = x0.min(x);
        x1 = x1.max(x);
        y0 = y0.min(y);
        y1 = y1.max(y);
    }
    if x0 == x1 {
        x0 -= 1;
        x1 += 1;
    }
    let (y0, y1) = padded(y0, y1);

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, (FONT, 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    ctx.configure_mesh()
        .x_desc(&chart.x_label)
        .y_desc(&chart.y_label)
        .x_labels((x1 - x0 + 1) as usize)
        .x_label_formatter(&|year| year.to_string())
        .y_label_formatter(&|v| format!("{v:.1}"))
        .label_style((FONT, 14))
        .draw()?;

    for (idx, series) in chart.series.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        ctx.draw_series(LineSeries::new(series.points.iter().copied(), color.stroke_width(2)))?
            .label(series.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        ctx.draw_series(
            series
                .points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, color.filled())),
        )?;
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font((FONT, 14))
        .draw()?;

    Ok(())
}

fn draw_bar_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &BarChart,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let n = chart.bars.len() as i32;
    let lo = chart.bars.iter().map(|b| b.value).fold(0.0, f64::min);
    let hi = chart.bars.iter().map(|b| b.value).fold(0.0, f64::max);
    let (y0, y1) = padded(lo, hi);
    let names: Vec<&str> = chart.bars.iter().map(|b| b.label.as_str()).collect();

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, (FONT, 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0..n).into_segmented(), y0..y1)?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_desc(&chart.x_label)
        .y_desc(&chart.y_label)
        .x_labels(names.len())
        .x_label_formatter(&|segment| match segment {
            SegmentValue::CenterOf(i) => names.get(*i as usize).map(|s| s.to_string()).unwrap_or_default(),
            _ => String::new(),
        })
        .y_label_formatter(&|v| format!("{v:.1}"))
        .label_style((FONT, 14))
        .draw()?;

    ctx.draw_series(chart.bars.iter().enumerate().map(|(i, bar)| {
        let i = i as i32;
        let mut rect = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), bar.value)],
            PALETTE[0].filled(),
        );
        rect.set_margin(0, 0, 12, 12);
        rect
    }))?;

    let annotation = TextStyle::from((FONT, 14).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    ctx.draw_series(chart.bars.iter().enumerate().map(|(i, bar)| {
        Text::new(
            bar.annotation.clone(),
            (SegmentValue::CenterOf(i as i32), bar.value),
            annotation.clone(),
        )
    }))?;

    Ok(())
}

/// Value range with 10% headroom; never degenerate.
fn padded(lo: f64, hi: f64) -> (f64, f64) {
    if !(lo.is_finite() && hi.is_finite()) {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    if span <= f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    (lo - span * 0.1, hi + span * 0.1)
}

pub(crate) fn encode_png(rgb: &[u8], width: u32, height: u32) -> Result<RenderedImage, AppError> {
    if rgb.len() != width as usize * height as usize * 3 {
        return Err(AppError::Render(format!(
            "chart buffer holds {} bytes, expected {width}x{height} RGB",
            rgb.len()
        )));
    }
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(rgb, width, height, image::ExtendedColorType::Rgb8)
        .map_err(|e| AppError::Render(format!("PNG encoding failed: {e}")))?;
    Ok(RenderedImage { png, width, height })
}
