use glam::Vec3A;

/// Functions for converting **FROM Unorm5** values to other formats.
///
/// The 8-bit expansion replicates the high bits into the low bits, exactly as
/// BC1 hardware does.
pub(crate) mod n5 {
    #[inline(always)]
    pub fn n8(x: u8) -> u8 {
        debug_assert!(x <= 31);
        (x << 3) | (x >> 2)
    }
}

/// Functions for converting **FROM Unorm6** values to other formats.
pub(crate) mod n6 {
    #[inline(always)]
    pub fn n8(x: u8) -> u8 {
        debug_assert!(x <= 63);
        (x << 2) | (x >> 4)
    }
}

/// Midpoints between the 8-bit expansions of adjacent 5-bit levels, in [0, 1].
///
/// `MIDPOINTS5[i]` separates level `i` from level `i + 1`. The last entry is
/// 1.0 so the top level never advances.
pub(crate) static MIDPOINTS5: [f32; 32] = build_midpoints5();
/// Same as [`MIDPOINTS5`], for the 6-bit green channel.
pub(crate) static MIDPOINTS6: [f32; 64] = build_midpoints6();

const fn expand5(x: u8) -> u8 {
    (x << 3) | (x >> 2)
}
const fn expand6(x: u8) -> u8 {
    (x << 2) | (x >> 4)
}

const fn build_midpoints5() -> [f32; 32] {
    let mut mid = [0.0_f32; 32];
    let mut i = 0;
    while i < 31 {
        let f0 = expand5(i as u8) as f32 / 255.0;
        let f1 = expand5(i as u8 + 1) as f32 / 255.0;
        mid[i] = (f0 + f1) * 0.5;
        i += 1;
    }
    mid[31] = 1.0;
    mid
}

const fn build_midpoints6() -> [f32; 64] {
    let mut mid = [0.0_f32; 64];
    let mut i = 0;
    while i < 63 {
        let f0 = expand6(i as u8) as f32 / 255.0;
        let f1 = expand6(i as u8 + 1) as f32 / 255.0;
        mid[i] = (f0 + f1) * 0.5;
        i += 1;
    }
    mid[63] = 1.0;
    mid
}

/// Quantizes a color in [0, 1] to the 5-6-5 grid, returning the quantized
/// levels normalized back into [0, 1] (`r / 31`, `g / 63`, `b / 31`).
///
/// This is *perfect* rounding: the selected level is the one whose 8-bit
/// bit-replicated expansion is nearest to `v * 255`, which is not the same as
/// rounding to the nearest multiple of 1/31.
pub(crate) fn round_565(v: Vec3A) -> Vec3A {
    // Truncate, then bump past the midpoint.
    let mut r = (v.x * 31.0).clamp(0.0, 31.0) as usize;
    let mut g = (v.y * 63.0).clamp(0.0, 63.0) as usize;
    let mut b = (v.z * 31.0).clamp(0.0, 31.0) as usize;
    r += (v.x > MIDPOINTS5[r]) as usize;
    g += (v.y > MIDPOINTS6[g]) as usize;
    b += (v.z > MIDPOINTS5[b]) as usize;

    Vec3A::new(r as f32 / 31.0, g as f32 / 63.0, b as f32 / 31.0)
}

/// Rounds a color in [0, 1] to 8 bits per channel.
pub(crate) fn to_rgb8(v: Vec3A) -> [u8; 3] {
    [
        (v.x.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        (v.y.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        (v.z.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
    ]
}

pub(crate) fn rgb8_to_vec(rgb: [u8; 3]) -> Vec3A {
    const F: f32 = 1.0 / 255.0;
    Vec3A::new(rgb[0] as f32 * F, rgb[1] as f32 * F, rgb[2] as f32 * F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expansion_is_bit_replication() {
        for x in 0..32_u8 {
            assert_eq!(n5::n8(x), (x << 3) | (x >> 2));
        }
        for x in 0..64_u8 {
            assert_eq!(n6::n8(x), (x << 2) | (x >> 4));
        }
        assert_eq!(n5::n8(0), 0);
        assert_eq!(n5::n8(31), 255);
        assert_eq!(n6::n8(0), 0);
        assert_eq!(n6::n8(63), 255);
    }

    #[test]
    fn expansion_is_monotone() {
        for x in 1..32_u8 {
            assert!(n5::n8(x) > n5::n8(x - 1));
        }
        for x in 1..64_u8 {
            assert!(n6::n8(x) > n6::n8(x - 1));
        }
    }

    #[test]
    fn midpoints_separate_levels() {
        for i in 0..31 {
            let lo = n5::n8(i as u8) as f32 / 255.0;
            let hi = n5::n8(i as u8 + 1) as f32 / 255.0;
            assert!(lo < MIDPOINTS5[i] && MIDPOINTS5[i] < hi);
        }
        assert_eq!(MIDPOINTS5[31], 1.0);
        for i in 0..63 {
            let lo = n6::n8(i as u8) as f32 / 255.0;
            let hi = n6::n8(i as u8 + 1) as f32 / 255.0;
            assert!(lo < MIDPOINTS6[i] && MIDPOINTS6[i] < hi);
        }
        assert_eq!(MIDPOINTS6[63], 1.0);
    }

    #[test]
    fn round_565_is_perfect() {
        // The quantized level must have the nearest 8-bit expansion for every
        // sampled value, for all three channels.
        for k in 0..=4096_u32 {
            let v = k as f32 / 4096.0;
            let q = round_565(Vec3A::splat(v));

            let r = (q.x * 31.0).round() as u8;
            let g = (q.y * 63.0).round() as u8;

            let best5 = (0..32_u8)
                .min_by(|&a, &b| {
                    let da = (n5::n8(a) as f32 - v * 255.0).abs();
                    let db = (n5::n8(b) as f32 - v * 255.0).abs();
                    da.partial_cmp(&db).unwrap()
                })
                .unwrap();
            let best6 = (0..64_u8)
                .min_by(|&a, &b| {
                    let da = (n6::n8(a) as f32 - v * 255.0).abs();
                    let db = (n6::n8(b) as f32 - v * 255.0).abs();
                    da.partial_cmp(&db).unwrap()
                })
                .unwrap();

            let err5 = (n5::n8(r) as f32 - v * 255.0).abs();
            let err6 = (n6::n8(g) as f32 - v * 255.0).abs();
            assert!(err5 <= (n5::n8(best5) as f32 - v * 255.0).abs() + 1e-5);
            assert!(err6 <= (n6::n8(best6) as f32 - v * 255.0).abs() + 1e-5);
        }
    }
}
