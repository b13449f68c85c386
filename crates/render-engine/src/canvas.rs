//! Square drawing surface with premultiplied source-over blending.
//!
//! Pixels are stored as premultiplied `f32` RGBA in `[0, 1]`, so translucent
//! pixels survive the trip through the canvas without quantization. Values
//! are rounded back to straight-alpha RGBA8 once, when a snapshot is taken.

use image::imageops::FilterType;
use image::RgbaImage;
use shadowcaster_common::config::ResizeFilter;

/// Premultiplied RGBA, each channel in `[0, 1]`.
pub type PremulRgba = [f32; 4];

/// An owned, fixed-size square buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    size: u32,
    premul: Vec<PremulRgba>,
}

impl Canvas {
    /// Allocate a fully transparent canvas.
    pub fn new(size: u32) -> Self {
        Self {
            size,
            premul: vec![[0.0; 4]; size as usize * size as usize],
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.premul.fill([0.0; 4]);
    }

    /// Stretch `src` to the full canvas and draw it with `opacity`.
    pub fn draw_fitted(&mut self, src: &RgbaImage, opacity: f32, filter: ResizeFilter) {
        if src.width() == self.size && src.height() == self.size {
            self.draw_exact(src, opacity);
        } else {
            let fitted = image::imageops::resize(src, self.size, self.size, filter_type(filter));
            self.draw_exact(&fitted, opacity);
        }
    }

    fn draw_exact(&mut self, src: &RgbaImage, opacity: f32) {
        debug_assert_eq!(src.dimensions(), (self.size, self.size));
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity == 0.0 {
            return;
        }
        for (dst, px) in self.premul.iter_mut().zip(src.pixels()) {
            *dst = over(*dst, premultiply(px.0), opacity);
        }
    }

    /// Copy the canvas out as a straight-alpha image.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.size, self.size);
        for (px, premul) in out.pixels_mut().zip(&self.premul) {
            px.0 = unpremultiply(*premul);
        }
        out
    }
}

/// Source-over with the opacity folded into the source.
///
/// `out = src * opacity + dst * (1 - src_alpha * opacity)`, channel-wise on
/// premultiplied values.
pub fn over(dst: PremulRgba, src: PremulRgba, opacity: f32) -> PremulRgba {
    let keep = 1.0 - src[3] * opacity;
    let mut out = [0.0; 4];
    for (o, (s, d)) in out.iter_mut().zip(src.iter().zip(dst.iter())) {
        *o = (s * opacity + d * keep).clamp(0.0, 1.0);
    }
    out
}

pub fn premultiply(px: [u8; 4]) -> PremulRgba {
    let a = f32::from(px[3]) / 255.0;
    [
        f32::from(px[0]) / 255.0 * a,
        f32::from(px[1]) / 255.0 * a,
        f32::from(px[2]) / 255.0 * a,
        a,
    ]
}

pub fn unpremultiply(px: PremulRgba) -> [u8; 4] {
    let a = px[3];
    if a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let channel = |c: f32| to_u8(c / a);
    [channel(px[0]), channel(px[1]), channel(px[2]), to_u8(a)]
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn filter_type(filter: ResizeFilter) -> FilterType {
    match filter {
        ResizeFilter::Nearest => FilterType::Nearest,
        ResizeFilter::Triangle => FilterType::Triangle,
        ResizeFilter::CatmullRom => FilterType::CatmullRom,
        ResizeFilter::Lanczos3 => FilterType::Lanczos3,
    }
}
