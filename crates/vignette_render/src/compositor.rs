//! Slide compositor.

use crate::layout::{clamp_block_y, wrap_words};
use ab_glyph::{FontRef, PxScale};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::io::Cursor;
use vignette_error::{RenderError, VignetteResult};

/// Output canvas width in pixels.
pub const SLIDE_WIDTH: u32 = 1080;
/// Output canvas height in pixels.
pub const SLIDE_HEIGHT: u32 = 1920;

/// Margin added on every side before drawing so glyph strokes near the
/// canvas edge are not clipped, cropped away afterwards.
const EDGE_PADDING: u32 = 200;

const HOOK_FONT_SIZE: f32 = 76.0;
const HOOK_LINE_HEIGHT: i32 = 95;
const HOOK_MAX_WIDTH_FRACTION: f32 = 0.85;
const HOOK_SAFE_TOP: i32 = 150;
const HOOK_STROKE: i32 = 10;

const TITLE_FONT_SIZE: f32 = 72.0;
const TITLE_LINE_HEIGHT: i32 = 100;
const TITLE_BODY_GAP: i32 = 40;
const TITLE_STROKE: i32 = 8;
const BODY_FONT_SIZE: f32 = 40.0;
const BODY_LINE_SPACING: i32 = 55;
const BODY_STROKE: i32 = 5;
const CONTENT_PAD_LEFT: i32 = 70;
const CONTENT_PAD_RIGHT: i32 = 120;
const CONTENT_SAFE_TOP: i32 = 180;

const SAFE_BOTTOM_MARGIN: i32 = 320;

const STROKE_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const FILL_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Burns slide text into photos inside the platform safe zones.
///
/// Holds the bundled display fonts; construct once and reuse across
/// slides. All drawing happens on an edge-padded canvas so wide strokes
/// at the borders survive, then the canvas is cropped back to
/// [`SLIDE_WIDTH`] x [`SLIDE_HEIGHT`].
///
/// # Examples
///
/// ```rust,ignore
/// let compositor = Compositor::new()?;
/// let png = compositor.render_slide(&photo_bytes, "why routines fail", true)?;
/// std::fs::write("slide_01.png", png)?;
/// ```
pub struct Compositor {
    display_font: FontRef<'static>,
    body_font: FontRef<'static>,
}

impl Compositor {
    /// Load the bundled fonts.
    ///
    /// # Errors
    ///
    /// Fails if the embedded font data cannot be parsed, which indicates a
    /// corrupted build.
    pub fn new() -> VignetteResult<Self> {
        let display_font = FontRef::try_from_slice(include_bytes!("../assets/DejaVuSans-Bold.ttf"))
            .map_err(|e| RenderError::new(format!("Failed to load display font: {e}")))?;
        let body_font = FontRef::try_from_slice(include_bytes!("../assets/DejaVuSans.ttf"))
            .map_err(|e| RenderError::new(format!("Failed to load body font: {e}")))?;
        Ok(Self {
            display_font,
            body_font,
        })
    }

    /// Decode raw image bytes and normalize them to the 9:16 canvas.
    ///
    /// Off-ratio inputs are center-cropped before the Lanczos resize so
    /// nothing is stretched.
    ///
    /// # Errors
    ///
    /// Fails when the bytes are not a decodable image.
    pub fn prepare(&self, bytes: &[u8]) -> VignetteResult<RgbImage> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| RenderError::new(format!("Failed to decode slide image: {e}")))?;
        Ok(resize_to_canvas(decoded))
    }

    /// Composite slide text onto a prepared canvas.
    ///
    /// Hook slides get centered text in the display font with a slight
    /// brightness/contrast adjustment underneath; content slides get a
    /// left-aligned title line plus body lines in the smaller font.
    #[tracing::instrument(skip(self, img, text), fields(chars = text.len()))]
    pub fn composite(&self, img: RgbImage, text: &str, is_hook: bool) -> RgbImage {
        let mut img = img;
        // Slight darkening keeps white text legible without muting the photo.
        adjust_brightness(&mut img, 0.95);
        if is_hook {
            adjust_contrast(&mut img, 1.1);
        }

        let (width, height) = img.dimensions();
        let mut canvas = RgbImage::from_pixel(
            width + EDGE_PADDING * 2,
            height + EDGE_PADDING * 2,
            Rgb([0, 0, 0]),
        );
        imageops::replace(&mut canvas, &img, i64::from(EDGE_PADDING), i64::from(EDGE_PADDING));

        if is_hook {
            self.draw_hook(&mut canvas, text, width, height);
        } else {
            self.draw_content(&mut canvas, text, width, height);
        }

        imageops::crop_imm(&canvas, EDGE_PADDING, EDGE_PADDING, width, height).to_image()
    }

    /// Decode, normalize, composite, and encode one slide to PNG bytes.
    ///
    /// # Errors
    ///
    /// Fails on undecodable input bytes or a PNG encoding failure.
    pub fn render_slide(&self, bytes: &[u8], text: &str, is_hook: bool) -> VignetteResult<Vec<u8>> {
        let prepared = self.prepare(bytes)?;
        let composited = self.composite(prepared, text, is_hook);
        let mut out = Vec::new();
        composited
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .map_err(|e| RenderError::new(format!("Failed to encode slide PNG: {e}")))?;
        Ok(out)
    }

    fn draw_hook(&self, canvas: &mut RgbImage, text: &str, width: u32, height: u32) {
        let scale = PxScale::from(HOOK_FONT_SIZE);
        let max_width = (width as f32 * HOOK_MAX_WIDTH_FRACTION) as u32;
        let lines = wrap_words(&self.display_font, scale, max_width, text);

        let total_height = lines.len() as i32 * HOOK_LINE_HEIGHT;
        let centered = (height as i32 - total_height) / 2;
        let safe_bottom = height as i32 - SAFE_BOTTOM_MARGIN;
        let mut y = clamp_block_y(centered, HOOK_SAFE_TOP, safe_bottom, total_height);

        for line in &lines {
            let (line_width, _) = text_size(scale, &self.display_font, line);
            let x = (width as i32 - line_width as i32) / 2;
            self.draw_stroked(canvas, x, y, scale, &self.display_font, line, HOOK_STROKE);
            y += HOOK_LINE_HEIGHT;
        }
    }

    fn draw_content(&self, canvas: &mut RgbImage, text: &str, width: u32, height: u32) {
        // First line is the title; everything after (blank separator
        // included) is body copy.
        let mut parts = text.splitn(2, '\n');
        let title = parts.next().unwrap_or_default();
        let body = parts.next().unwrap_or_default();

        let title_scale = PxScale::from(TITLE_FONT_SIZE);
        let body_scale = PxScale::from(BODY_FONT_SIZE);
        let max_width = (width as i32 - CONTENT_PAD_LEFT - CONTENT_PAD_RIGHT) as u32;

        let title_lines = wrap_words(&self.display_font, title_scale, max_width, title);
        let body_lines = wrap_words(&self.body_font, body_scale, max_width, body);

        let title_height = title_lines.len() as i32 * TITLE_LINE_HEIGHT;
        let body_height = body_lines.len() as i32 * BODY_LINE_SPACING;
        let total_height = title_height + TITLE_BODY_GAP + body_height;

        let centered = (height as i32 - total_height) / 2;
        let safe_bottom = height as i32 - SAFE_BOTTOM_MARGIN;
        let mut y = clamp_block_y(centered, CONTENT_SAFE_TOP, safe_bottom, total_height);
        let x = CONTENT_PAD_LEFT;

        for line in &title_lines {
            self.draw_stroked(canvas, x, y, title_scale, &self.display_font, line, TITLE_STROKE);
            y += TITLE_LINE_HEIGHT;
        }
        y += TITLE_BODY_GAP;
        for line in &body_lines {
            self.draw_stroked(canvas, x, y, body_scale, &self.body_font, line, BODY_STROKE);
            y += BODY_LINE_SPACING;
        }
    }

    /// Multi-directional stroke: the glyph run is drawn at every offset in
    /// the square [-w, w]^2 except the origin in the stroke color, then
    /// once at the origin in the fill color. Native outline primitives do
    /// not cover every glyph this renderer has to handle.
    fn draw_stroked(
        &self,
        canvas: &mut RgbImage,
        x: i32,
        y: i32,
        scale: PxScale,
        font: &FontRef<'static>,
        text: &str,
        stroke_width: i32,
    ) {
        let pad = EDGE_PADDING as i32;
        for dx in -stroke_width..=stroke_width {
            for dy in -stroke_width..=stroke_width {
                if dx == 0 && dy == 0 {
                    continue;
                }
                draw_text_mut(canvas, STROKE_COLOR, x + pad + dx, y + pad + dy, scale, font, text);
            }
        }
        draw_text_mut(canvas, FILL_COLOR, x + pad, y + pad, scale, font, text);
    }
}

/// Center-crop to 9:16 then Lanczos-resize to the canvas size.
fn resize_to_canvas(img: DynamicImage) -> RgbImage {
    let img = img.to_rgb8();
    let (w, h) = img.dimensions();
    let target_ratio = SLIDE_WIDTH as f64 / SLIDE_HEIGHT as f64;
    let img_ratio = w as f64 / h as f64;

    let cropped = if (img_ratio - target_ratio).abs() > 0.01 {
        if img_ratio > target_ratio {
            let new_w = (h as f64 * target_ratio) as u32;
            let left = (w - new_w) / 2;
            imageops::crop_imm(&img, left, 0, new_w, h).to_image()
        } else {
            let new_h = (w as f64 / target_ratio) as u32;
            let top = (h - new_h) / 2;
            imageops::crop_imm(&img, 0, top, w, new_h).to_image()
        }
    } else {
        img
    };

    imageops::resize(&cropped, SLIDE_WIDTH, SLIDE_HEIGHT, FilterType::Lanczos3)
}

fn adjust_brightness(img: &mut RgbImage, factor: f32) {
    for pixel in img.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            *channel = (f32::from(*channel) * factor).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Contrast around the mean luminance so overall exposure is preserved.
fn adjust_contrast(img: &mut RgbImage, factor: f32) {
    let mut sum = 0.0f64;
    for pixel in img.pixels() {
        let [r, g, b] = pixel.0;
        sum += 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
    }
    let pixel_count = (img.width() * img.height()) as f64;
    if pixel_count == 0.0 {
        return;
    }
    let mean = (sum / pixel_count) as f32;

    for pixel in img.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            let adjusted = mean + factor * (f32::from(*channel) - mean);
            *channel = adjusted.round().clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_canvas(value: u8) -> RgbImage {
        RgbImage::from_pixel(SLIDE_WIDTH, SLIDE_HEIGHT, Rgb([value, value, value]))
    }

    /// Rows containing any pixel that differs from the (uniform) background.
    fn text_row_bounds(img: &RgbImage) -> Option<(u32, u32)> {
        let background = *img.get_pixel(0, 0);
        let mut bounds = None;
        for (_, y, pixel) in img.enumerate_pixels() {
            if *pixel != background {
                bounds = Some(match bounds {
                    None => (y, y),
                    Some((top, _)) => (top, y),
                });
            }
        }
        bounds
    }

    #[test]
    fn hook_text_stays_inside_safe_zones() {
        let compositor = Compositor::new().unwrap();
        let out = compositor.composite(
            flat_canvas(120),
            "the bedtime mistake almost every exhausted parent makes without realizing it at all",
            true,
        );
        let (top, bottom) = text_row_bounds(&out).expect("hook text must be drawn");
        assert!(top >= (HOOK_SAFE_TOP - HOOK_STROKE) as u32, "text starts at row {top}");
        assert!(bottom <= (SLIDE_HEIGHT as i32 - SAFE_BOTTOM_MARGIN) as u32, "text ends at row {bottom}");
    }

    #[test]
    fn content_text_stays_inside_safe_zones() {
        let compositor = Compositor::new().unwrap();
        let body = "explanation here ".repeat(30);
        let out = compositor.composite(flat_canvas(120), &format!("tip 1\n\n{body}"), false);
        let (top, bottom) = text_row_bounds(&out).expect("content text must be drawn");
        assert!(top >= (CONTENT_SAFE_TOP - TITLE_STROKE) as u32, "text starts at row {top}");
        assert!(bottom <= (SLIDE_HEIGHT as i32 - SAFE_BOTTOM_MARGIN) as u32, "text ends at row {bottom}");
    }

    #[test]
    fn content_text_respects_horizontal_padding() {
        let compositor = Compositor::new().unwrap();
        let out = compositor.composite(
            flat_canvas(120),
            "tip 1\n\nput the phone away before you start the whole routine tonight",
            false,
        );
        let background = *out.get_pixel(0, 0);
        for (x, _, pixel) in out.enumerate_pixels() {
            if *pixel != background {
                assert!(x >= (CONTENT_PAD_LEFT - TITLE_STROKE) as u32);
                assert!(x < SLIDE_WIDTH - (CONTENT_PAD_RIGHT - TITLE_STROKE) as u32);
            }
        }
    }

    #[test]
    fn prepare_normalizes_landscape_input() {
        let compositor = Compositor::new().unwrap();
        let wide = RgbImage::from_pixel(400, 200, Rgb([50, 80, 120]));
        let mut bytes = Vec::new();
        wide.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        let prepared = compositor.prepare(&bytes).unwrap();
        assert_eq!(prepared.dimensions(), (SLIDE_WIDTH, SLIDE_HEIGHT));
    }

    #[test]
    fn prepare_rejects_garbage_bytes() {
        let compositor = Compositor::new().unwrap();
        assert!(compositor.prepare(b"not an image").is_err());
    }

    #[test]
    fn brightness_darkens_uniformly() {
        let mut img = RgbImage::from_pixel(4, 4, Rgb([200, 100, 0]));
        adjust_brightness(&mut img, 0.95);
        assert_eq!(*img.get_pixel(0, 0), Rgb([190, 95, 0]));
    }

    #[test]
    fn contrast_leaves_flat_images_alone() {
        let mut img = RgbImage::from_pixel(4, 4, Rgb([120, 120, 120]));
        adjust_contrast(&mut img, 1.1);
        assert_eq!(*img.get_pixel(0, 0), Rgb([120, 120, 120]));
    }
}
