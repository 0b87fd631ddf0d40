use std::sync::OnceLock;

use crate::block::Bc1Block;
use crate::color::{n5, n6};

/// Optimal endpoint pairs for single-color blocks, indexed by the 8-bit
/// target value. Entry 0 is the `col0` field, entry 1 the `col1` field.
///
/// `match5`/`match6` assume the block reconstructs through palette entry 2 of
/// 4-color mode, `(2·p0 + p1) / 3`. `match5_half`/`match6_half` assume the
/// 3-color midpoint `(p0 + p1) / 2` instead, for single-color content that
/// shares a block with punch-through black texels.
pub(crate) struct MatchTables {
    pub match5: [[u8; 2]; 256],
    pub match6: [[u8; 2]; 256],
    pub match5_half: [[u8; 2]; 256],
    pub match6_half: [[u8; 2]; 256],
}

static TABLES: OnceLock<MatchTables> = OnceLock::new();

pub(crate) fn match_tables() -> &'static MatchTables {
    TABLES.get_or_init(build_tables)
}

fn lerp13(a: i32, b: i32) -> i32 {
    (a * 2 + b) / 3
}

fn prepare_opt_table(
    size: usize,
    expand: impl Fn(u8) -> u8,
    interpolate: impl Fn(i32, i32) -> i32,
) -> [[u8; 2]; 256] {
    let mut table = [[0_u8; 2]; 256];

    for (target, entry) in table.iter_mut().enumerate() {
        let mut best_err = 256 * 100;

        for min in 0..size {
            for max in 0..size {
                let mine = expand(min as u8) as i32;
                let maxe = expand(max as u8) as i32;

                let mut err = (interpolate(maxe, mine) - target as i32).abs() * 100;

                // The DX10 spec allows interpolation to be off by 3% of the
                // correct result, so spread between the endpoints carries a
                // small penalty.
                err += (max as i32 - min as i32).abs() * 3;

                if err < best_err {
                    best_err = err;
                    *entry = [max as u8, min as u8];
                }
            }
        }
    }

    table
}

fn build_tables() -> MatchTables {
    MatchTables {
        match5: prepare_opt_table(32, n5::n8, lerp13),
        match6: prepare_opt_table(64, n6::n8, lerp13),
        match5_half: prepare_opt_table(32, n5::n8, |a, b| (a + b) / 2),
        match6_half: prepare_opt_table(64, n6::n8, |a, b| (a + b) / 2),
    }
}

/// Encodes a block that collapses to a single 8-bit color.
///
/// All sixteen texels point at palette entry 2; if the table pair packs in
/// the wrong order, swapping the endpoints and flipping the low index bit of
/// every texel keeps the block in 4-color mode.
pub(crate) fn compress_single_color(rgb: [u8; 3]) -> Bc1Block {
    let tables = match_tables();

    let m5r = tables.match5[rgb[0] as usize];
    let m6g = tables.match6[rgb[1] as usize];
    let m5b = tables.match5[rgb[2] as usize];

    let mut block = Bc1Block {
        col0: (m5r[0] as u16) << 11 | (m6g[0] as u16) << 5 | m5b[0] as u16,
        col1: (m5r[1] as u16) << 11 | (m6g[1] as u16) << 5 | m5b[1] as u16,
        indices: 0xAAAA_AAAA,
    };

    if block.col0 < block.col1 {
        std::mem::swap(&mut block.col0, &mut block.col1);
        block.indices ^= 0x5555_5555;
    }

    block
}

/// The 3-color-mode sibling of [`compress_single_color`]: the given color
/// reconstructs through the midpoint entry, leaving index 3 free for
/// punch-through black. Texel indices are assigned by the caller.
pub(crate) fn single_color_endpoints_three(rgb: [u8; 3]) -> (u16, u16) {
    let tables = match_tables();

    let m5r = tables.match5_half[rgb[0] as usize];
    let m6g = tables.match6_half[rgb[1] as usize];
    let m5b = tables.match5_half[rgb[2] as usize];

    let a = (m5r[0] as u16) << 11 | (m6g[0] as u16) << 5 | m5b[0] as u16;
    let b = (m5r[1] as u16) << 11 | (m6g[1] as u16) << 5 | m5b[1] as u16;

    // 3-color mode wants col0 <= col1.
    (a.min(b), a.max(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::R5G6B5Color;
    use crate::palette::{evaluate_palette, Decoder};

    #[test]
    fn tables_minimize_the_biased_metric() {
        let tables = match_tables();

        for target in 0..256_i32 {
            let [max, min] = tables.match5[target as usize];
            let table_err =
                (lerp13(n5::n8(max) as i32, n5::n8(min) as i32) - target).abs() * 100
                    + (max as i32 - min as i32).abs() * 3;

            for a in 0..32_u8 {
                for b in 0..32_u8 {
                    let err = (lerp13(n5::n8(a) as i32, n5::n8(b) as i32) - target).abs() * 100
                        + (a as i32 - b as i32).abs() * 3;
                    assert!(table_err <= err, "target {target}: ({a},{b}) beats table");
                }
            }
        }
    }

    #[test]
    fn match6_is_optimal_for_a_sample() {
        let tables = match_tables();
        for target in (0..256_i32).step_by(7) {
            let [max, min] = tables.match6[target as usize];
            let table_err =
                (lerp13(n6::n8(max) as i32, n6::n8(min) as i32) - target).abs() * 100
                    + (max as i32 - min as i32).abs() * 3;
            for a in 0..64_u8 {
                for b in 0..64_u8 {
                    let err = (lerp13(n6::n8(a) as i32, n6::n8(b) as i32) - target).abs() * 100
                        + (a as i32 - b as i32).abs() * 3;
                    assert!(table_err <= err);
                }
            }
        }
    }

    #[test]
    fn single_color_blocks_stay_in_four_color_mode() {
        for value in 0..=255_u8 {
            let block = compress_single_color([value, value, value]);
            assert!(
                block.col0 > block.col1 || block.col0 == block.col1,
                "inverted endpoint order for {value}"
            );
            if block.col0 == block.col1 {
                continue;
            }
            assert!(block.is_four_color());

            // Every texel must decode to the same palette entry.
            let palette = evaluate_palette(
                R5G6B5Color::from_u16(block.col0),
                R5G6B5Color::from_u16(block.col1),
                Decoder::Reference,
            );
            let first = (block.indices & 0b11) as usize;
            for i in 1..16 {
                let index = ((block.indices >> (2 * i)) & 0b11) as usize;
                assert_eq!(palette[index], palette[first]);
            }
        }
    }

    #[test]
    fn midpoint_tables_beat_direct_quantization_where_possible() {
        // 204 = 0.8 * 255. A 6-bit midpoint pair reconstructs it exactly,
        // which no single 6-bit level does.
        let tables = match_tables();
        let [max, min] = tables.match6_half[204];
        let mid = (n6::n8(max) as i32 + n6::n8(min) as i32) / 2;
        assert_eq!(mid, 204);
    }
}
