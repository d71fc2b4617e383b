use crate::ir::{AxisOrient, AxisScene, ChartScene, MarkShape};
use crate::palette::Rgb;
use crate::OutputFormat;
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

const FONT: &str = "sans-serif";
const TICK_SIZE: i32 = 6;
const TICK_FONT_SIZE: f64 = 10.0;
const AXIS_TITLE_FONT_SIZE: f64 = 12.0;
const TITLE_FONT_SIZE: f64 = 14.0;
const AXIS_COLOR: RGBColor = RGBColor(0x33, 0x33, 0x33);

/// Encode a scene in the requested format
pub fn render_scene(scene: &ChartScene, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Svg => render_svg(scene).map(String::into_bytes),
        OutputFormat::Png => render_png(scene),
    }
}

pub fn render_svg(scene: &ChartScene) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (scene.width, scene.height)).into_drawing_area();
        draw_scene(&root, scene)?;
        root.present().context("Failed to present drawing")?;
    }
    Ok(svg)
}

/// Rasterize into an RGB buffer and encode it as PNG
pub fn render_png(scene: &ChartScene) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; (scene.width as usize) * (scene.height as usize) * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (scene.width, scene.height))
            .into_drawing_area();
        draw_scene(&root, scene)?;
        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, scene.width, scene.height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }

    Ok(png_bytes)
}

/// Draw the whole scene in surface pixel coordinates
pub fn draw_scene<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, scene: &ChartScene) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;

    let left = scene.margins.left;
    let top = scene.margins.top;

    if !scene.title.is_empty() {
        let style = (FONT, TITLE_FONT_SIZE)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));
        root.draw(&Text::new(
            scene.title.clone(),
            (px(scene.width as f64 / 2.0), 2),
            style,
        ))
        .context("Failed to draw title")?;
    }

    for mark in &scene.marks {
        let color = to_color(mark.fill);
        match mark.shape {
            MarkShape::Rect { x, y, width, height } => {
                root.draw(&Rectangle::new(
                    [
                        (px(left + x), px(top + y)),
                        (px(left + x + width), px(top + y + height)),
                    ],
                    color.filled(),
                ))
                .context("Failed to draw bar")?;
            }
            MarkShape::Circle { cx, cy, r } => {
                root.draw(&Circle::new((px(left + cx), px(top + cy)), px(r), color.filled()))
                    .context("Failed to draw point")?;
            }
        }
    }

    draw_axis(root, scene, &scene.x_axis)?;
    draw_axis(root, scene, &scene.y_axis)?;
    Ok(())
}

fn draw_axis<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scene: &ChartScene,
    axis: &AxisScene,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let left = scene.margins.left;
    let top = scene.margins.top;
    let bottom = top + scene.plot.height;
    let right = left + scene.plot.width;

    let line_style = AXIS_COLOR.stroke_width(1);
    let tick_font = (FONT, TICK_FONT_SIZE).into_font();

    match axis.orient {
        AxisOrient::Bottom => {
            root.draw(&PathElement::new(vec![(px(left), px(bottom)), (px(right), px(bottom))], line_style))
                .context("Failed to draw x axis")?;

            for tick in &axis.ticks {
                let x = px(left + tick.position);
                let y = px(bottom);
                root.draw(&PathElement::new(vec![(x, y), (x, y + TICK_SIZE)], line_style))
                    .context("Failed to draw x tick")?;
                if axis.rotate_labels {
                    draw_slanted_label(root, &tick.label, (x, y + TICK_SIZE + 3))?;
                } else {
                    let style = tick_font.color(&AXIS_COLOR).pos(Pos::new(HPos::Center, VPos::Top));
                    root.draw(&Text::new(tick.label.clone(), (x, y + TICK_SIZE + 3), style))
                        .context("Failed to draw x tick label")?;
                }
            }

            let style = (FONT, AXIS_TITLE_FONT_SIZE)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            root.draw(&Text::new(
                axis.title.clone(),
                (px(left + scene.plot.width / 2.0), scene.height as i32 - 4),
                style,
            ))
            .context("Failed to draw x axis title")?;
        }
        AxisOrient::Left => {
            root.draw(&PathElement::new(vec![(px(left), px(top)), (px(left), px(bottom))], line_style))
                .context("Failed to draw y axis")?;

            for tick in &axis.ticks {
                let x = px(left);
                let y = px(top + tick.position);
                root.draw(&PathElement::new(vec![(x - TICK_SIZE, y), (x, y)], line_style))
                    .context("Failed to draw y tick")?;
                let style = tick_font.color(&AXIS_COLOR).pos(Pos::new(HPos::Right, VPos::Center));
                root.draw(&Text::new(tick.label.clone(), (x - TICK_SIZE - 3, y), style))
                    .context("Failed to draw y tick label")?;
            }

            let style = (FONT, AXIS_TITLE_FONT_SIZE)
                .into_font()
                .transform(FontTransform::Rotate270)
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Top));
            root.draw(&Text::new(axis.title.clone(), (4, px(top + scene.plot.height / 2.0)), style))
                .context("Failed to draw y axis title")?;
        }
    }
    Ok(())
}

/// Band labels run up and to the right at 45 degrees, ending at the tick.
/// Glyphs stay upright and step diagonally since the backends only rotate
/// text by right angles.
fn draw_slanted_label<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    label: &str,
    (x, y): (i32, i32),
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let step = TICK_FONT_SIZE * 0.6 * std::f64::consts::FRAC_1_SQRT_2;
    let style = (FONT, TICK_FONT_SIZE)
        .into_font()
        .color(&AXIS_COLOR)
        .pos(Pos::new(HPos::Right, VPos::Top));
    let glyphs: Vec<char> = label.chars().collect();
    let n = glyphs.len();
    for (i, ch) in glyphs.into_iter().enumerate() {
        if ch.is_whitespace() {
            continue;
        }
        let back = (n - 1 - i) as f64 * step;
        root.draw(&Text::new(ch.to_string(), (x - back.round() as i32, y + back.round() as i32), style.clone()))
            .context("Failed to draw x tick label")?;
    }
    Ok(())
}

fn px(v: f64) -> i32 {
    v.round() as i32
}

fn to_color(Rgb(r, g, b): Rgb) -> RGBColor {
    RGBColor(r, g, b)
}
