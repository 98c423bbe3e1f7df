use std::sync::Arc;

use crate::foundation::core::Affine;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::{mul_div255_u16, unit_to_u8};

/// Fixed brightness/saturation boost applied to scene images.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorAdjust {
    /// RGB multiplier; `1.0` is identity.
    pub brightness: f32,
    /// Saturation factor; `1.0` is identity, `0.0` is greyscale.
    pub saturation: f32,
}

impl Default for ColorAdjust {
    fn default() -> Self {
        Self {
            brightness: 1.05,
            saturation: 1.12,
        }
    }
}

impl ColorAdjust {
    /// Identity adjustment.
    pub const IDENTITY: Self = Self {
        brightness: 1.0,
        saturation: 1.0,
    };

    /// 4x5 row-major color matrix (straight alpha), saturate then brighten.
    pub(crate) fn matrix(self) -> [f32; 20] {
        let s = self.saturation;
        let b = self.brightness;
        let (lr, lg, lb) = (0.213f32, 0.715f32, 0.072f32);
        [
            (lr + (1.0 - lr) * s) * b,
            (lg - lg * s) * b,
            (lb - lb * s) * b,
            0.0,
            0.0,
            (lr - lr * s) * b,
            (lg + (1.0 - lg) * s) * b,
            (lb - lb * s) * b,
            0.0,
            0.0,
            (lr - lr * s) * b,
            (lg - lg * s) * b,
            (lb + (1.0 - lb) * s) * b,
            0.0,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
            0.0,
        ]
    }

    /// Apply to premultiplied RGBA8 bytes, producing a new premultiplied buffer.
    pub(crate) fn apply_premul(self, src: &[u8]) -> Vec<u8> {
        let mut dst = vec![0u8; src.len()];
        if self == Self::IDENTITY {
            dst.copy_from_slice(src);
        } else {
            color_matrix_rgba8_premul(src, &mut dst, self.matrix());
        }
        dst
    }
}

fn color_matrix_rgba8_premul(src: &[u8], dst: &mut [u8], m: [f32; 20]) {
    debug_assert_eq!(src.len(), dst.len());
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let pr = s[0] as f32 / 255.0;
        let pg = s[1] as f32 / 255.0;
        let pb = s[2] as f32 / 255.0;
        let pa = s[3] as f32 / 255.0;

        // premul -> straight
        let inv_a = if pa > 0.0 { 1.0 / pa } else { 0.0 };
        let r = pr * inv_a;
        let g = pg * inv_a;
        let b = pb * inv_a;
        let a = pa;

        let out_r = (m[0] * r + m[1] * g + m[2] * b + m[3] * a + m[4]).clamp(0.0, 1.0);
        let out_g = (m[5] * r + m[6] * g + m[7] * b + m[8] * a + m[9]).clamp(0.0, 1.0);
        let out_b = (m[10] * r + m[11] * g + m[12] * b + m[13] * a + m[14]).clamp(0.0, 1.0);
        let out_a = (m[15] * r + m[16] * g + m[17] * b + m[18] * a + m[19]).clamp(0.0, 1.0);

        d[0] = unit_to_u8(out_r * out_a);
        d[1] = unit_to_u8(out_g * out_a);
        d[2] = unit_to_u8(out_b * out_a);
        d[3] = unit_to_u8(out_a);
    }
}

/// Bottom-weighted black scrim behind the text block.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scrim {
    /// Fraction of the frame height where the gradient begins.
    pub start: f64,
    /// `(offset, alpha)` stops over the gradient span, offsets ascending in `[0, 1]`.
    pub stops: Vec<(f32, f32)>,
}

impl Default for Scrim {
    fn default() -> Self {
        Self {
            start: 0.45,
            stops: vec![(0.0, 0.02), (0.45, 0.5), (1.0, 0.86)],
        }
    }
}

impl Scrim {
    /// Alpha at `t` in `[0, 1]` along the gradient span, piecewise linear between stops.
    pub fn alpha_at(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let Some(&(first_off, first_a)) = self.stops.first() else {
            return 0.0;
        };
        if t <= first_off {
            return first_a;
        }
        for pair in self.stops.windows(2) {
            let (o0, a0) = pair[0];
            let (o1, a1) = pair[1];
            if t <= o1 {
                let span = (o1 - o0).max(f32::EPSILON);
                return a0 + (a1 - a0) * ((t - o0) / span);
            }
        }
        self.stops.last().map(|&(_, a)| a).unwrap_or(0.0)
    }

    /// Premultiplied RGBA8 gradient image of `width` x `height`, top to bottom.
    pub(crate) fn premul_bytes(&self, width: u32, height: u32) -> Vec<u8> {
        let mut bytes = vec![0u8; (width as usize).saturating_mul(height as usize).saturating_mul(4)];
        let h1 = (height.max(1) - 1) as f32;
        for y in 0..height {
            let t = if h1 <= 0.0 { 0.0 } else { (y as f32) / h1 };
            // Black premultiplied: only alpha is non-zero.
            let a = unit_to_u8(self.alpha_at(t));
            let row = (y as usize) * (width as usize) * 4;
            for x in 0..width as usize {
                bytes[row + x * 4 + 3] = a;
            }
        }
        bytes
    }
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> ReelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ReelError::configuration("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ReelError::configuration("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(ReelError::configuration("pixmap byte len mismatch"));
    }
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

pub(crate) fn premul_bytes_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> ReelResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn cpu_color(c: crate::foundation::core::Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

/// Composite one premultiplied pixel over an opaque `bg` colour.
pub(crate) fn premul_over_opaque(px: [u8; 4], bg: [u8; 3]) -> [u8; 4] {
    let a = u16::from(px[3]);
    if a == 255 {
        return px;
    }
    let inv = 255 - a;
    let ch = |s: u8, b: u8| (u16::from(s) + mul_div255_u16(u16::from(b), inv)).min(255) as u8;
    [ch(px[0], bg[0]), ch(px[1], bg[1]), ch(px[2], bg[2]), 255]
}

/// Flatten premultiplied RGBA8 in place over `bg` so every alpha is 255.
///
/// Antialiased edges from the u8 raster pipeline can leave alpha at 253/254 even over an
/// opaque clear.
pub(crate) fn flatten_over_in_place(data: &mut [u8], bg: crate::foundation::core::Rgba8) {
    let bg = [bg.r, bg.g, bg.b];
    for px in data.chunks_exact_mut(4) {
        if px[3] != 255 {
            let out = premul_over_opaque([px[0], px[1], px[2], px[3]], bg);
            px.copy_from_slice(&out);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/color.rs"]
mod tests;
