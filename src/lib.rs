//! A high-quality BC1 (DXT1) block encoder.
//!
//! BC1 stores a 4x4 block of texels in 64 bits: two RGB-565 endpoint colors
//! and sixteen 2-bit indices into the 4-entry palette the hardware
//! interpolates from those endpoints. This crate searches that space
//! properly: it enumerates every ordered partition of the block's colors
//! along their principal axis, solves a weighted least-squares problem for
//! each candidate partition through a summed-area table, and polishes the
//! winner with a local search on the 5-6-5 lattice.
//!
//! The encoder works on one block at a time and keeps no state between
//! blocks, so callers are free to parallelize across blocks however they
//! like. Call [`init`] once before encoding to build the shared lookup
//! tables.
//!
//! ```
//! bc1_enc::init();
//!
//! let colors = [0.5_f32; 64]; // 16 RGBA texels
//! let weights = [1.0_f32; 16];
//! let channel_weights = [1.0_f32; 3];
//!
//! let (block, error) = bc1_enc::compress(
//!     &colors,
//!     &weights,
//!     &channel_weights,
//!     bc1_enc::Bc1Options::default(),
//! );
//! assert!(error < 13.0);
//! let _bytes: [u8; 8] = block.to_bytes();
//! ```

#![forbid(unsafe_code)]

mod block;
mod cluster;
mod color;
mod compress;
mod palette;
mod partitions;
mod pca;
mod reduce;
mod refine;
mod sat;
mod single;

pub use block::Bc1Block;
pub use compress::Bc1Options;
pub use palette::{decode_block, evaluate_error, Decoder};

use compress::InputBlock;

/// Builds the process-wide lookup tables: the single-color endpoint tables
/// and the cluster partition enumeration.
///
/// Idempotent and safe to call from multiple threads. Encoding works without
/// an explicit call (the tables are built lazily on first use), but calling
/// this up front keeps the first block off the slow path.
pub fn init() {
    partitions::partition_tables();
    single::match_tables();
}

/// Compresses a block of 16 RGBA texels to a BC1 block, returning the block
/// and its weighted mean-square reconstruction error.
///
/// `colors` holds the texels as RGBA floats in [0, 1], texel 0 first; alpha
/// is ignored. `weights` scales each texel's contribution to the error (a
/// zero weight removes the texel entirely), and `channel_weights` sets the
/// relative perceptual importance of R, G and B.
///
/// The returned error is in the summed, 0-255-squared-per-texel domain and
/// quantifies reconstruction quality; compression itself cannot fail.
pub fn compress(
    colors: &[f32; 64],
    weights: &[f32; 16],
    channel_weights: &[f32; 3],
    options: Bc1Options,
) -> (Bc1Block, f32) {
    let input = InputBlock::new(colors, weights, channel_weights);
    compress::compress(&input, options)
}

/// Compresses a block with the fast strategy: a bounding-box endpoint seed
/// followed by a single least-squares refit.
///
/// Roughly an order of magnitude faster than [`compress`], at a noticeable
/// quality cost. Always emits 4-color blocks (except for single-color
/// input).
pub fn compress_fast(
    colors: &[f32; 64],
    weights: &[f32; 16],
    channel_weights: &[f32; 3],
) -> (Bc1Block, f32) {
    let input = InputBlock::new(colors, weights, channel_weights);
    compress::compress_fast(&input)
}

/// [`compress_fast`] for raw 8-bit RGBA texels, with uniform texel and
/// channel weights.
pub fn compress_fast_u8(colors: &[u8; 64]) -> Bc1Block {
    let mut colors_f32 = [0.0_f32; 64];
    for (f, &b) in colors_f32.iter_mut().zip(colors.iter()) {
        *f = b as f32 * (1.0 / 255.0);
    }

    let input = InputBlock::new(&colors_f32, &[1.0; 16], &[1.0; 3]);
    compress::compress_fast(&input).0
}
