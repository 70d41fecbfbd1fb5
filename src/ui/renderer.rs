//! Tower rendering
//!
//! Converts a [`TowerLayout`] into pixel geometry and rasterises it with
//! tiny-skia. Scene calculation is kept apart from drawing so the geometry
//! can be tested without touching pixels. Labels are drawn with ab_glyph
//! when a font is available and skipped otherwise.

use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use thiserror::Error;
use tiny_skia::{
    Color, ColorU8, Paint, PathBuilder, Pixmap, PremultipliedColorU8, Rect as SkiaRect, Stroke,
    Transform,
};
use tracing::debug;

use crate::domain::book::Rgb;
use crate::domain::tower::TowerLayout;

/// Rendering errors
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Failed to create a {width}x{height} pixmap for rendering")]
    PixmapCreationFailed { width: u32, height: u32 },

    #[error("Failed to read font file {path}: {source}")]
    FontRead {
        path: String,
        source: std::io::Error,
    },

    #[error("Font file {path} is not a usable font")]
    InvalidFont { path: String },

    #[error("Failed to write PNG: {0}")]
    Encode(String),

    #[error("Failed to remove stale image {path}: {source}")]
    RemoveStale {
        path: String,
        source: std::io::Error,
    },
}

/// Label placement within a spine
#[derive(Debug, Clone)]
pub struct LabelPosition {
    pub text: String,
    /// Center of the spine in pixels
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub color: Color,
}

/// A book spine in pixel space
#[derive(Debug, Clone)]
pub struct Spine {
    pub rect: SkiaRect,
    pub fill: Color,
    pub outline: Color,
    pub label: LabelPosition,
}

/// Pre-calculated pixel geometry for one tower
#[derive(Debug, Clone)]
pub struct TowerScene {
    /// Spines from the bottom of the tower to the top
    pub spines: Vec<Spine>,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl TowerScene {
    pub const MIN_FONT_SIZE: f32 = 10.0;
    pub const MAX_FONT_SIZE: f32 = 28.0;

    /// Builds the scene, or `None` when the layout has nothing to draw
    ///
    /// Layout units have y pointing up; pixel rows grow downwards, so the
    /// bottom book ends up at the bottom of the canvas.
    pub fn from_layout(layout: &TowerLayout, pixels_per_unit: f32) -> Option<Self> {
        let bounds = layout.bounds?;
        let scale = pixels_per_unit.max(f32::EPSILON);

        let canvas_width = ((bounds.w * scale).round() as u32).max(1);
        let canvas_height = ((bounds.h * scale).round() as u32).max(1);

        let spines = layout
            .books
            .iter()
            .filter_map(|book| {
                let x = (book.x - bounds.x) * scale;
                let y = (bounds.top() - (book.y + book.height)) * scale;
                let width = book.width * scale;
                let height = book.height * scale;
                let rect = SkiaRect::from_xywh(x, y, width, height)?;

                Some(Spine {
                    rect,
                    fill: to_skia(book.color),
                    outline: to_skia(darken(book.color, 0.7)),
                    label: LabelPosition {
                        text: book.label.clone(),
                        x: x + width / 2.0,
                        y: y + height / 2.0,
                        font_size: (height * 0.45).clamp(Self::MIN_FONT_SIZE, Self::MAX_FONT_SIZE),
                        color: label_ink(book.color),
                    },
                })
            })
            .collect();

        Some(Self {
            spines,
            canvas_width,
            canvas_height,
        })
    }
}

/// tiny-skia renderer for book towers
#[derive(Debug, Clone)]
pub struct TowerRenderer {
    font: Option<FontArc>,
    background: Color,
}

impl TowerRenderer {
    /// Renderer without a font; spines are drawn, labels are not
    pub fn new() -> Self {
        Self {
            font: None,
            background: Color::from_rgba8(250, 247, 240, 255),
        }
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    /// Loads a TrueType/OpenType font for labels
    pub fn with_font_file(self, path: impl AsRef<Path>) -> Result<Self, RendererError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| RendererError::FontRead {
            path: path.display().to_string(),
            source,
        })?;
        let font = FontArc::try_from_vec(bytes).map_err(|_| RendererError::InvalidFont {
            path: path.display().to_string(),
        })?;
        Ok(self.with_font(font))
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Lays out and draws in one go; `Ok(None)` for an empty tower
    pub fn render_layout(
        &self,
        layout: &TowerLayout,
        pixels_per_unit: f32,
    ) -> Result<Option<Pixmap>, RendererError> {
        match TowerScene::from_layout(layout, pixels_per_unit) {
            Some(scene) => self.render(&scene).map(Some),
            None => Ok(None),
        }
    }

    /// Draws a scene to a new pixmap
    pub fn render(&self, scene: &TowerScene) -> Result<Pixmap, RendererError> {
        let mut pixmap = Pixmap::new(scene.canvas_width, scene.canvas_height).ok_or(
            RendererError::PixmapCreationFailed {
                width: scene.canvas_width,
                height: scene.canvas_height,
            },
        )?;
        pixmap.fill(self.background);

        for spine in &scene.spines {
            self.render_spine(&mut pixmap, spine);
        }

        debug!(
            spines = scene.spines.len(),
            width = scene.canvas_width,
            height = scene.canvas_height,
            labels = self.font.is_some(),
            "rendered tower"
        );

        Ok(pixmap)
    }

    /// Renders `layout` to a PNG at `path`
    ///
    /// An empty tower has no image, so any file left at `path` by an earlier
    /// draw is removed instead. Returns whether an image was written.
    pub fn render_to_file(
        &self,
        layout: &TowerLayout,
        pixels_per_unit: f32,
        path: impl AsRef<Path>,
    ) -> Result<bool, RendererError> {
        let path = path.as_ref();
        match self.render_layout(layout, pixels_per_unit)? {
            Some(pixmap) => {
                Self::save_png(&pixmap, path)?;
                Ok(true)
            }
            None => {
                match std::fs::remove_file(path) {
                    Ok(()) => debug!(path = %path.display(), "removed stale tower image"),
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                    Err(source) => {
                        return Err(RendererError::RemoveStale {
                            path: path.display().to_string(),
                            source,
                        });
                    }
                }
                Ok(false)
            }
        }
    }

    /// Writes a rendered pixmap as PNG
    pub fn save_png(pixmap: &Pixmap, path: impl AsRef<Path>) -> Result<(), RendererError> {
        pixmap
            .save_png(path)
            .map_err(|err| RendererError::Encode(err.to_string()))
    }

    /// Raw RGBA bytes (premultiplied) for handing to another surface
    pub fn pixmap_to_rgba(pixmap: &Pixmap) -> Vec<u8> {
        pixmap.data().to_vec()
    }

    fn render_spine(&self, pixmap: &mut Pixmap, spine: &Spine) {
        let mut paint = Paint::default();
        paint.set_color(spine.fill);
        paint.anti_alias = false;
        pixmap.fill_rect(spine.rect, &paint, Transform::identity(), None);

        let outline = PathBuilder::from_rect(spine.rect);
        let mut stroke_paint = Paint::default();
        stroke_paint.set_color(spine.outline);
        let stroke = Stroke {
            width: 1.0,
            ..Stroke::default()
        };
        pixmap.stroke_path(&outline, &stroke_paint, &stroke, Transform::identity(), None);

        if let Some(font) = &self.font {
            draw_label(pixmap, font, &spine.label);
        }
    }
}

impl Default for TowerRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Draws `label` centered on its position
fn draw_label(pixmap: &mut Pixmap, font: &FontArc, label: &LabelPosition) {
    let scale = PxScale::from(label.font_size);
    let scaled = font.as_scaled(scale);

    let mut text_width = 0.0;
    let mut previous = None;
    for ch in label.text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            text_width += scaled.kern(prev, id);
        }
        text_width += scaled.h_advance(id);
        previous = Some(id);
    }

    // descent is negative, so this centers the ascent-descent box on y
    let baseline = label.y + (scaled.ascent() + scaled.descent()) / 2.0;
    let mut caret = label.x - text_width / 2.0;
    let ink = label.color.to_color_u8();

    let mut previous = None;
    for ch in label.text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, baseline));
        caret += scaled.h_advance(id);
        previous = Some(id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i32 + gx as i32;
                let y = bounds.min.y as i32 + gy as i32;
                blend_pixel(pixmap, x, y, ink, coverage);
            });
        }
    }
}

/// Source-over blend of an opaque ink color at partial coverage
fn blend_pixel(pixmap: &mut Pixmap, x: i32, y: i32, ink: ColorU8, coverage: f32) {
    let (width, height) = (pixmap.width() as i32, pixmap.height() as i32);
    if x < 0 || y < 0 || x >= width || y >= height {
        return;
    }

    let alpha = coverage.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }

    let index = y as usize * width as usize + x as usize;
    let pixels = pixmap.pixels_mut();
    let dst = pixels[index];
    let mix = |src: u8, dst: u8| (src as f32 * alpha + dst as f32 * (1.0 - alpha)).round() as u8;

    if let Some(blended) = PremultipliedColorU8::from_rgba(
        mix(ink.red(), dst.red()),
        mix(ink.green(), dst.green()),
        mix(ink.blue(), dst.blue()),
        mix(u8::MAX, dst.alpha()),
    ) {
        pixels[index] = blended;
    }
}

fn to_skia(color: Rgb) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, 255)
}

fn darken(color: Rgb, factor: f32) -> Rgb {
    let scale = |channel: u8| (channel as f32 * factor).round() as u8;
    Rgb::new(scale(color.r), scale(color.g), scale(color.b))
}

/// Black text on light spines, white on dark ones
fn label_ink(fill: Rgb) -> Color {
    if fill.luminance() > 0.55 {
        Color::from_rgba8(20, 20, 20, 255)
    } else {
        Color::from_rgba8(255, 255, 255, 255)
    }
}
