use glam::Vec3A;

use crate::block::{Bc1Block, R5G6B5Color};
use crate::cluster::{cluster_fit_three, cluster_fit_four};
use crate::color::to_rgb8;
use crate::palette::{evaluate_block_error, float_palette};
use crate::reduce::{reduce_colors, skip_blacks, ColorSet};
use crate::refine::{optimize_end_points, refine_endpoints, FACTORS4};
use crate::sat::compute_sat;
use crate::single::{compress_single_color, single_color_endpoints_three};

/// Options for [`compress`](crate::compress).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bc1Options {
    /// Whether the encoder may emit 3-color blocks.
    ///
    /// The 3-color palette trades one interpolated entry for transparent
    /// black, which pays off for blocks that mix near-black texels with
    /// another color. Disable this for BC2/BC3 color data, where index 3
    /// must never be transparent.
    pub three_color_mode: bool,
    /// Whether to run the endpoint refinement pass.
    ///
    /// Refinement walks the 5-6-5 lattice around the best candidate and
    /// escapes quantization-local minima. It costs up to 256 extra index
    /// assignments per block.
    pub high_quality: bool,
}

impl Default for Bc1Options {
    fn default() -> Self {
        Self {
            three_color_mode: true,
            high_quality: true,
        }
    }
}

pub(crate) struct InputBlock {
    pub colors: [Vec3A; 16],
    pub weights: [f32; 16],
    pub channel_weights: Vec3A,
}

impl InputBlock {
    pub(crate) fn new(colors: &[f32; 64], weights: &[f32; 16], channel_weights: &[f32; 3]) -> Self {
        let mut block = InputBlock {
            colors: [Vec3A::ZERO; 16],
            weights: *weights,
            channel_weights: Vec3A::from_array(*channel_weights),
        };
        for i in 0..16 {
            block.colors[i] = Vec3A::new(colors[4 * i], colors[4 * i + 1], colors[4 * i + 2]);
        }
        block
    }

    fn error(&self, block: Bc1Block) -> f32 {
        evaluate_block_error(block, &self.colors, &self.weights, self.channel_weights)
    }
}

/// Packs a 4-color block from two endpoint colors: quantize, order, assign
/// nearest indices.
fn output_block4(input: &InputBlock, v0: Vec3A, v1: Vec3A, allow_transparent_black: bool) -> Bc1Block {
    let mut color0 = R5G6B5Color::from_vec(v0);
    let mut color1 = R5G6B5Color::from_vec(v1);

    if color0.to_u16() < color1.to_u16() {
        std::mem::swap(&mut color0, &mut color1);
    }

    let palette = float_palette(color0, color1);
    Bc1Block {
        col0: color0.to_u16(),
        col1: color1.to_u16(),
        indices: palette.block_indices(&input.colors, input.channel_weights, allow_transparent_black),
    }
}

/// Packs a 3-color block: same as [`output_block4`] with the opposite
/// endpoint order.
fn output_block3(input: &InputBlock, v0: Vec3A, v1: Vec3A, allow_transparent_black: bool) -> Bc1Block {
    let mut color0 = R5G6B5Color::from_vec(v0);
    let mut color1 = R5G6B5Color::from_vec(v1);

    if color0.to_u16() > color1.to_u16() {
        std::mem::swap(&mut color0, &mut color1);
    }

    let palette = float_palette(color0, color1);
    Bc1Block {
        col0: color0.to_u16(),
        col1: color1.to_u16(),
        indices: palette.block_indices(&input.colors, input.channel_weights, allow_transparent_black),
    }
}

// find minimum and maximum colors based on bounding box in color space
fn fit_colors_bbox(colors: &[Vec3A]) -> (Vec3A, Vec3A) {
    let mut c0 = Vec3A::ZERO;
    let mut c1 = Vec3A::ONE;
    for &c in colors {
        c0 = c0.max(c);
        c1 = c1.min(c);
    }
    (c0, c1)
}

fn inset_bbox(c0: &mut Vec3A, c1: &mut Vec3A) {
    let bias = (8.0 / 255.0) / 16.0;
    let inset = (*c0 - *c1) / 16.0 - Vec3A::splat(bias);
    *c0 = (*c0 - inset).clamp(Vec3A::ZERO, Vec3A::ONE);
    *c1 = (*c1 + inset).clamp(Vec3A::ZERO, Vec3A::ONE);
}

/// Flips the box diagonal in x and/or y so the endpoint line follows the
/// sign of the R/B and G/B covariances.
fn select_diagonal(colors: &[Vec3A], c0: &mut Vec3A, c1: &mut Vec3A) {
    let center = (*c0 + *c1) * 0.5;

    let mut cov_xz = 0.0;
    let mut cov_yz = 0.0;
    for &c in colors {
        let t = c - center;
        cov_xz += t.x * t.z;
        cov_yz += t.y * t.z;
    }

    let (mut x0, mut y0) = (c0.x, c0.y);
    let (mut x1, mut y1) = (c1.x, c1.y);

    if cov_xz < 0.0 {
        std::mem::swap(&mut x0, &mut x1);
    }
    if cov_yz < 0.0 {
        std::mem::swap(&mut y0, &mut y1);
    }

    *c0 = Vec3A::new(x0, y0, c0.z);
    *c1 = Vec3A::new(x1, y1, c1.z);
}

/// Runs the 4-cluster fit and, when enabled, the 3-cluster fit, returning
/// the best block either finds.
fn compress_cluster_fit(
    input: &InputBlock,
    set: &ColorSet,
    three_color_mode: bool,
) -> (Bc1Block, f32) {
    let metric_sqr = input.channel_weights * input.channel_weights;
    let allow_transparent_black = three_color_mode && set.any_black;

    let sat = compute_sat(&set.colors, &set.weights, set.count);
    let fit = cluster_fit_four(&sat, set.count, metric_sqr);

    let mut best = output_block4(input, fit.start, fit.end, allow_transparent_black);
    let mut best_error = input.error(best);

    if three_color_mode {
        let three = if set.any_black {
            // Blacks ride the transparent entry, so the endpoints only have
            // to serve the remaining colors.
            let (colors, weights, count) = skip_blacks(
                &set.colors[..set.count],
                &set.weights[..set.count],
            );
            match count {
                0 => None,
                1 => {
                    // A single surviving color is out of reach for the
                    // cluster fit; pair the endpoints so the midpoint
                    // reconstructs it optimally instead.
                    let (col0, col1) = single_color_endpoints_three(to_rgb8(colors[0]));
                    let c0 = R5G6B5Color::from_u16(col0);
                    let c1 = R5G6B5Color::from_u16(col1);
                    let palette = float_palette(c0, c1);
                    Some(Bc1Block {
                        col0,
                        col1,
                        indices: palette.block_indices(
                            &input.colors,
                            input.channel_weights,
                            true,
                        ),
                    })
                }
                _ => {
                    let sat = compute_sat(&colors, &weights, count);
                    let fit = cluster_fit_three(&sat, count, metric_sqr);
                    Some(output_block3(input, fit.start, fit.end, true))
                }
            }
        } else {
            let fit = cluster_fit_three(&sat, set.count, metric_sqr);
            Some(output_block3(input, fit.start, fit.end, false))
        };

        if let Some(three_block) = three {
            let three_error = input.error(three_block);
            if three_error < best_error {
                best = three_block;
                best_error = three_error;
            }
        }
    }

    (best, best_error)
}

/// Compresses one block, trying progressively more expensive strategies and
/// keeping whichever wins.
pub(crate) fn compress(input: &InputBlock, options: Bc1Options) -> (Bc1Block, f32) {
    let set = reduce_colors(&input.colors, &input.weights);

    if set.count == 0 {
        return (Bc1Block::ZERO, 0.0);
    }

    // The cluster fit cannot handle single color blocks, so encode them
    // optimally right away.
    if set.count == 1 {
        let block = compress_single_color(to_rgb8(set.colors[0]));
        let error = input.error(block);
        return (block, error);
    }

    // Index 3 may stand in for transparent black only when the block has
    // near-black content and the caller tolerates 3-color blocks at all.
    let allow_transparent_black = options.three_color_mode && set.any_black;

    // Quick end point selection.
    let (mut c0, mut c1) = fit_colors_bbox(&set.colors[..set.count]);
    inset_bbox(&mut c0, &mut c1);
    select_diagonal(&set.colors[..set.count], &mut c0, &mut c1);

    let mut block = output_block4(input, c0, c1, allow_transparent_black);
    let mut error = input.error(block);

    // Refine the endpoints for the indices the seed picked.
    if let Some((a, b)) =
        optimize_end_points(block.indices, &input.colors, &input.weights, FACTORS4)
    {
        let optimized = output_block4(input, a, b, allow_transparent_black);
        let optimized_error = input.error(optimized);
        if optimized_error < error {
            block = optimized;
            error = optimized_error;
        }
    }

    let (cluster_block, cluster_error) =
        compress_cluster_fit(input, &set, options.three_color_mode);
    if cluster_error < error {
        block = cluster_block;
        error = cluster_error;
    }

    if options.high_quality {
        error = refine_endpoints(
            &input.colors,
            &input.weights,
            input.channel_weights,
            options.three_color_mode,
            allow_transparent_black,
            error,
            &mut block,
        );
    }

    (block, error)
}

/// The fast path: bounding-box seed plus one least-squares refit, no cluster
/// fit and no refinement.
pub(crate) fn compress_fast(input: &InputBlock) -> (Bc1Block, f32) {
    let (mut c0, mut c1) = fit_colors_bbox(&input.colors);
    if c0 == c1 {
        let block = compress_single_color(to_rgb8(c0));
        let error = input.error(block);
        return (block, error);
    }
    inset_bbox(&mut c0, &mut c1);
    select_diagonal(&input.colors, &mut c0, &mut c1);

    let mut block = output_block4(input, c0, c1, false);

    if let Some((a, b)) =
        optimize_end_points(block.indices, &input.colors, &input.weights, FACTORS4)
    {
        block = output_block4(input, a, b, false);
    }

    let error = input.error(block);
    (block, error)
}
