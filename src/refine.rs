use glam::Vec3A;

use crate::block::{Bc1Block, R5G6B5Color};
use crate::palette::{evaluate_block_error, float_palette};

/// Alpha factors of the 4-color palette entries, in index order.
pub(crate) const FACTORS4: [f32; 4] = [1.0, 0.0, 2.0 / 3.0, 1.0 / 3.0];

/// Least-squares endpoints for a fixed index assignment.
///
/// Every texel contributes its interpolation coefficient `alpha = factors[idx]`
/// scaled by the texel weight; minimizing the weighted residual gives a 2x2
/// system per channel. Returns `None` when the system is singular (all texels
/// on one endpoint), in which case the caller keeps its current block.
pub(crate) fn optimize_end_points(
    indices: u32,
    colors: &[Vec3A; 16],
    weights: &[f32; 16],
    factors: [f32; 4],
) -> Option<(Vec3A, Vec3A)> {
    let mut alpha2_sum = 0.0;
    let mut beta2_sum = 0.0;
    let mut alphabeta_sum = 0.0;
    let mut alphax_sum = Vec3A::ZERO;
    let mut betax_sum = Vec3A::ZERO;

    for i in 0..16 {
        let idx = ((indices >> (2 * i)) & 0b11) as usize;
        let alpha = factors[idx];
        let beta = 1.0 - alpha;
        let w = weights[i];

        alpha2_sum += w * alpha * alpha;
        beta2_sum += w * beta * beta;
        alphabeta_sum += w * alpha * beta;
        alphax_sum += colors[i] * (w * alpha);
        betax_sum += colors[i] * (w * beta);
    }

    let denom = alpha2_sum * beta2_sum - alphabeta_sum * alphabeta_sum;
    if denom.abs() < 1e-4 {
        return None;
    }
    let factor = 1.0 / denom;

    let a = (alphax_sum * beta2_sum - betax_sum * alphabeta_sum) * factor;
    let b = (betax_sum * alpha2_sum - alphax_sum * alphabeta_sum) * factor;

    Some((
        a.clamp(Vec3A::ZERO, Vec3A::ONE),
        b.clamp(Vec3A::ZERO, Vec3A::ONE),
    ))
}

/// The perturbation schedule: single-channel steps first, then the paired
/// diagonals that tend to survive 5-6-5 quantization.
const DELTAS: [[i8; 3]; 16] = [
    [1, 0, 0],
    [0, 1, 0],
    [0, 0, 1],
    [-1, 0, 0],
    [0, -1, 0],
    [0, 0, -1],
    [1, 1, 0],
    [1, 0, 1],
    [0, 1, 1],
    [-1, -1, 0],
    [-1, 0, -1],
    [0, -1, -1],
    [-1, 1, 0],
    [1, -1, 0],
    [0, -1, 1],
    [0, 1, -1],
];

/// Bounded local search around an already-good endpoint pair.
///
/// Each step nudges one endpoint by one lattice delta, alternating endpoints
/// every 16 steps, and keeps the perturbed block only on a strict error
/// improvement. Stops after 256 steps or 32 consecutive non-improvements.
pub(crate) fn refine_endpoints(
    colors: &[Vec3A; 16],
    weights: &[f32; 16],
    channel_weights: Vec3A,
    three_color_mode: bool,
    allow_transparent_black: bool,
    input_error: f32,
    block: &mut Bc1Block,
) -> f32 {
    let mut best_error = input_error;

    let mut last_improvement = 0;
    for i in 0..256 {
        let delta = DELTAS[i % 16];

        let mut col0 = R5G6B5Color::from_u16(block.col0);
        let mut col1 = R5G6B5Color::from_u16(block.col1);
        if (i / 16) & 1 == 1 {
            col0 = col0.wrapping_add(delta);
        } else {
            col1 = col1.wrapping_add(delta);
        }

        let mut refined = Bc1Block {
            col0: col0.to_u16(),
            col1: col1.to_u16(),
            indices: 0,
        };

        if !three_color_mode {
            // Keep the block in 4-color mode.
            if refined.col0 == refined.col1 {
                col1 = col1.wrapping_add([0, 1, 0]);
                refined.col1 = col1.to_u16();
            }
            if refined.col0 < refined.col1 {
                std::mem::swap(&mut refined.col0, &mut refined.col1);
            }
        }

        let palette = float_palette(
            R5G6B5Color::from_u16(refined.col0),
            R5G6B5Color::from_u16(refined.col1),
        );
        refined.indices = palette.block_indices(colors, channel_weights, allow_transparent_black);

        let refined_error = evaluate_block_error(refined, colors, weights, channel_weights);
        if refined_error < best_error {
            best_error = refined_error;
            *block = refined;
            last_improvement = i;
        }

        if i - last_improvement > 32 {
            break;
        }
    }

    best_error
}
