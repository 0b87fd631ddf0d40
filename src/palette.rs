use glam::Vec3A;

use crate::block::{Bc1Block, IndexList, R5G6B5Color};
use crate::color::rgb8_to_vec;

/// The palette-interpolation rule used to reconstruct a block.
///
/// Real hardware does not agree on the interpolation arithmetic. The
/// reference rule is the ideal one (and the one the encoder optimizes for);
/// the vendor rules reproduce the fixed-point shortcuts of two widespread
/// decoder families bit-exactly, so callers can measure the error their
/// target hardware will actually display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Decoder {
    /// Ideal interpolation: entry 2 is (2·p0+p1)/3, entry 3 is (p0+2·p1)/3.
    #[default]
    Reference,
    /// Fixed-point interpolation with per-channel bias terms.
    VendorA,
    /// Fixed-point interpolation with a +32 rounding bias.
    VendorB,
}

/// The four reconstructed RGBA palette entries of a block.
///
/// In 3-color mode entry 3 is transparent black.
pub(crate) fn evaluate_palette(c0: R5G6B5Color, c1: R5G6B5Color, decoder: Decoder) -> [[u8; 4]; 4] {
    let p0 = c0.to_rgb8();
    let p1 = c1.to_rgb8();

    let mut palette = [
        [p0[0], p0[1], p0[2], 255],
        [p1[0], p1[1], p1[2], 255],
        [0, 0, 0, 255],
        [0, 0, 0, 255],
    ];

    if c0.to_u16() > c1.to_u16() {
        match decoder {
            Decoder::Reference => {
                for ch in 0..3 {
                    palette[2][ch] = ((2 * p0[ch] as u16 + p1[ch] as u16) / 3) as u8;
                    palette[3][ch] = ((2 * p1[ch] as u16 + p0[ch] as u16) / 3) as u8;
                }
            }
            Decoder::VendorA => {
                // R and B interpolate on the raw 5-bit fields; green runs
                // through a 256-scaled path with a signed bias.
                let gdiff = p1[1] as i32 - p0[1] as i32;
                palette[2][0] = (((2 * c0.r as i32 + c1.r as i32) * 22) / 8) as u8;
                palette[2][1] = ((256 * p0[1] as i32 + gdiff / 4 + 128 + gdiff * 80) / 256) as u8;
                palette[2][2] = (((2 * c0.b as i32 + c1.b as i32) * 22) / 8) as u8;
                palette[3][0] = (((2 * c1.r as i32 + c0.r as i32) * 22) / 8) as u8;
                palette[3][1] = ((256 * p1[1] as i32 - gdiff / 4 + 128 - gdiff * 80) / 256) as u8;
                palette[3][2] = (((2 * c1.b as i32 + c0.b as i32) * 22) / 8) as u8;
            }
            Decoder::VendorB => {
                for ch in 0..3 {
                    palette[2][ch] = ((43 * p0[ch] as i32 + 21 * p1[ch] as i32 + 32) / 8) as u8;
                    palette[3][ch] = ((43 * p1[ch] as i32 + 21 * p0[ch] as i32 + 32) / 8) as u8;
                }
            }
        }
    } else {
        match decoder {
            Decoder::Reference => {
                for ch in 0..3 {
                    palette[2][ch] = ((p0[ch] as u16 + p1[ch] as u16) / 2) as u8;
                }
            }
            Decoder::VendorA => {
                let gdiff = p1[1] as i32 - p0[1] as i32;
                palette[2][0] = (((c0.r as i32 + c1.r as i32) * 33) / 8) as u8;
                palette[2][1] = ((256 * p0[1] as i32 + gdiff / 4 + 128 + gdiff * 128) / 256) as u8;
                palette[2][2] = (((c0.b as i32 + c1.b as i32) * 33) / 8) as u8;
            }
            Decoder::VendorB => {
                // Midpoint on the raw packed fields.
                palette[2][0] = ((c0.r as i32 + c1.r as i32 + 1) / 2) as u8;
                palette[2][1] = ((c0.g as i32 + c1.g as i32 + 1) / 2) as u8;
                palette[2][2] = ((c0.b as i32 + c1.b as i32 + 1) / 2) as u8;
            }
        }
        palette[3] = [0, 0, 0, 0];
    }

    palette
}

/// Palette entries as colors in [0, 1] for the compression-time metric.
/// Derived from the integer palette so the scores match what the decoder
/// reconstructs; the transparent entry contributes its color, black.
pub(crate) struct FloatPalette {
    pub colors: [Vec3A; 4],
    pub four_color: bool,
}

pub(crate) fn float_palette(c0: R5G6B5Color, c1: R5G6B5Color) -> FloatPalette {
    let palette = evaluate_palette(c0, c1, Decoder::Reference);
    FloatPalette {
        colors: palette.map(|p| rgb8_to_vec([p[0], p[1], p[2]])),
        four_color: c0.to_u16() > c1.to_u16(),
    }
}

/// Weighted squared distance in the scaled 8-bit domain.
#[inline]
pub(crate) fn distance_sqr(p: Vec3A, c: Vec3A, channel_weights: Vec3A) -> f32 {
    let d = (p - c) * channel_weights * 255.0;
    d.dot(d)
}

impl FloatPalette {
    /// Nearest palette entry for every texel, packed into the 32-bit index
    /// field.
    ///
    /// Four-color palettes use a branchless comparison network. Three-color
    /// palettes fall back to a nearest-of-four scan in which the transparent
    /// entry competes as black, but only when `allow_transparent_black`
    /// permits the punch-through.
    pub(crate) fn block_indices(
        &self,
        colors: &[Vec3A; 16],
        channel_weights: Vec3A,
        allow_transparent_black: bool,
    ) -> u32 {
        if self.four_color {
            self.block_indices4(colors, channel_weights)
        } else {
            self.block_indices3(colors, channel_weights, allow_transparent_black)
        }
    }

    fn block_indices4(&self, colors: &[Vec3A; 16], channel_weights: Vec3A) -> u32 {
        let mut indices = 0_u32;
        for (i, &c) in colors.iter().enumerate() {
            let d0 = distance_sqr(self.colors[0], c, channel_weights);
            let d1 = distance_sqr(self.colors[1], c, channel_weights);
            let d2 = distance_sqr(self.colors[2], c, channel_weights);
            let d3 = distance_sqr(self.colors[3], c, channel_weights);

            let b0 = (d0 > d3) as u32;
            let b1 = (d1 > d2) as u32;
            let b2 = (d0 > d2) as u32;
            let b3 = (d1 > d3) as u32;
            let b4 = (d2 > d3) as u32;

            let x0 = b1 & b2;
            let x1 = b0 & b3;
            let x2 = b0 & b4;

            indices |= (x2 | ((x0 | x1) << 1)) << (2 * i);
        }
        indices
    }

    fn block_indices3(
        &self,
        colors: &[Vec3A; 16],
        channel_weights: Vec3A,
        allow_transparent_black: bool,
    ) -> u32 {
        let mut list = IndexList::default();
        for (i, &c) in colors.iter().enumerate() {
            let d0 = distance_sqr(self.colors[0], c, channel_weights);
            let d1 = distance_sqr(self.colors[1], c, channel_weights);
            let d2 = distance_sqr(self.colors[2], c, channel_weights);
            let d3 = if allow_transparent_black {
                distance_sqr(self.colors[3], c, channel_weights)
            } else {
                f32::INFINITY
            };

            let index = if d0 < d1 && d0 < d2 && d0 < d3 {
                0
            } else if d1 < d2 && d1 < d3 {
                1
            } else if d2 < d3 {
                2
            } else {
                3
            };
            list.set(i, index);
        }
        list.data
    }
}

/// Weighted mean-square reconstruction error of an encoded block against the
/// original texels, under the reference rule, in the scaled 8-bit domain.
pub(crate) fn evaluate_block_error(
    block: Bc1Block,
    colors: &[Vec3A; 16],
    weights: &[f32; 16],
    channel_weights: Vec3A,
) -> f32 {
    let palette = float_palette(
        R5G6B5Color::from_u16(block.col0),
        R5G6B5Color::from_u16(block.col1),
    );

    let mut error = 0.0;
    for i in 0..16 {
        let index = ((block.indices >> (2 * i)) & 0b11) as usize;
        error += weights[i] * distance_sqr(palette.colors[index], colors[i], channel_weights);
    }
    error
}

/// Decodes a block into its sixteen RGBA texels under the selected decoder
/// rule.
pub fn decode_block(block: Bc1Block, decoder: Decoder) -> [[u8; 4]; 16] {
    let palette = evaluate_palette(
        R5G6B5Color::from_u16(block.col0),
        R5G6B5Color::from_u16(block.col1),
        decoder,
    );

    let mut pixels = [[0_u8; 4]; 16];
    for (i, pixel) in pixels.iter_mut().enumerate() {
        let index = ((block.indices >> (2 * i)) & 0b11) as usize;
        *pixel = palette[index];
    }
    pixels
}

/// Total squared RGB error of an encoded block against raw 8-bit texels,
/// unweighted, under the selected decoder rule. Alpha is ignored.
pub fn evaluate_error(rgba: &[u8; 64], block: Bc1Block, decoder: Decoder) -> f32 {
    let palette = evaluate_palette(
        R5G6B5Color::from_u16(block.col0),
        R5G6B5Color::from_u16(block.col1),
        decoder,
    );

    let mut error = 0_i64;
    for i in 0..16 {
        let index = ((block.indices >> (2 * i)) & 0b11) as usize;
        let p = palette[index];
        for ch in 0..3 {
            let d = p[ch] as i64 - rgba[4 * i + ch] as i64;
            error += d * d;
        }
    }
    error as f32
}
