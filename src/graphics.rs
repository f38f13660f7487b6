// Graphics context abstraction
// The seam between the toolkit and whatever owns the GPU device and draw calls

use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Errors reported by a graphics backend
#[derive(Debug, Error)]
pub enum GraphicsError {
    /// A GPU resource (pipeline, buffer, texture) could not be created
    #[error("failed to create {what}: {reason}")]
    ResourceCreation { what: &'static str, reason: String },
    /// The presentation surface could not provide a frame
    #[error("surface error: {0}")]
    Surface(String),
}

/// Straight (non-premultiplied) RGBA color with components in 0.0 - 1.0
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const CLEAR: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Same color with a different alpha
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Color from hue (degrees), saturation and value, fully opaque
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let c = value * saturation;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = value - c;
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        Self::rgb(r + m, g + m, b + m)
    }

    /// 8-bit RGBA, clamping out-of-range components
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Blend state applied to subsequent draw calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Blending {
    /// Source replaces destination
    #[default]
    Disabled,
    /// src * src_alpha + dst * (1 - src_alpha)
    Alpha,
}

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// CPU-side RGBA8 image that a backend can show as a full-viewport overlay.
///
/// `generation` changes on every mutation and is never shared by two
/// different canvases, so backends can skip re-uploading unchanged pixels.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    generation: u64,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
            generation: next_generation(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Resize, discarding contents. No-op if the size is unchanged.
    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![0; (width * height * 4) as usize];
        self.generation = next_generation();
    }

    pub fn fill(&mut self, color: Color) {
        let rgba = color.to_rgba8();
        for pixel in self.pixels.chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
        self.generation = next_generation();
    }

    /// Fill an axis-aligned rectangle, clipped to the canvas
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) {
        let rgba = color.to_rgba8();
        let x0 = x.max(0) as u32;
        let y0 = y.max(0) as u32;
        let x1 = (x + w as i32).clamp(0, self.width as i32) as u32;
        let y1 = (y + h as i32).clamp(0, self.height as i32) as u32;
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend_pixel(px, py, rgba);
            }
        }
        self.generation = next_generation();
    }

    /// Alpha-blend one pixel over the existing contents
    pub fn blend_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        let alpha = rgba[3] as u32;
        if alpha == 255 {
            self.pixels[idx..idx + 4].copy_from_slice(&rgba);
            return;
        }
        let inv = 255 - alpha;
        for c in 0..3 {
            let dst = self.pixels[idx + c] as u32;
            self.pixels[idx + c] = ((rgba[c] as u32 * alpha + dst * inv) / 255) as u8;
        }
        let dst_a = self.pixels[idx + 3] as u32;
        self.pixels[idx + 3] = (alpha + dst_a * inv / 255).min(255) as u8;
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        let mut out = [0; 4];
        out.copy_from_slice(&self.pixels[idx..idx + 4]);
        Some(out)
    }
}

/// Host graphics context.
///
/// Draw calls apply to the frame currently being rendered. Resources created
/// through the context are owned by the caller and released when dropped.
pub trait Graphics {
    /// Full-viewport quad with a flat-color shader
    type FlatQuad;

    /// Current viewport size in pixels
    fn viewport(&self) -> (u32, u32);

    /// Clear the whole viewport
    fn clear(&mut self, color: Color);

    fn set_blending(&mut self, blending: Blending);

    fn create_flat_quad(&mut self) -> Result<Self::FlatQuad, GraphicsError>;

    /// Draw `quad` over the whole viewport in `color`, using the current blending
    fn draw_flat_quad(&mut self, quad: &Self::FlatQuad, color: Color);

    /// Draw `canvas` stretched over the whole viewport
    fn draw_canvas(&mut self, canvas: &Canvas);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsv_primaries() {
        assert_eq!(Color::from_hsv(0.0, 1.0, 1.0).to_rgba8(), [255, 0, 0, 255]);
        assert_eq!(Color::from_hsv(120.0, 1.0, 1.0).to_rgba8(), [0, 255, 0, 255]);
        assert_eq!(Color::from_hsv(240.0, 1.0, 1.0).to_rgba8(), [0, 0, 255, 255]);
        assert_eq!(Color::from_hsv(360.0, 1.0, 1.0).to_rgba8(), [255, 0, 0, 255]);
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_rect(-2, -2, 4, 4, Color::WHITE);
        assert_eq!(canvas.pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(1, 1), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(2, 2), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(4, 0), None);
    }

    #[test]
    fn generation_tracks_mutations() {
        let mut canvas = Canvas::new(2, 2);
        let start = canvas.generation();
        canvas.resize(2, 2);
        assert_eq!(canvas.generation(), start);
        canvas.fill(Color::BLACK);
        assert!(canvas.generation() > start);
        assert_ne!(Canvas::new(2, 2).generation(), Canvas::new(2, 2).generation());
    }

    #[test]
    fn half_alpha_blends_over_black() {
        let mut canvas = Canvas::new(1, 1);
        canvas.fill(Color::BLACK);
        canvas.blend_pixel(0, 0, [255, 255, 255, 128]);
        let [r, g, b, a] = canvas.pixel(0, 0).unwrap();
        assert_eq!((r, g, b), (128, 128, 128));
        assert_eq!(a, 255);
    }
}
