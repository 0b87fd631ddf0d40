use glam::Vec3A;

/// The reduced color set of one block: unique colors with combined weights.
#[derive(Debug, Clone)]
pub(crate) struct ColorSet {
    pub colors: [Vec3A; 16],
    pub weights: [f32; 16],
    pub count: usize,
    /// Whether any contributing texel was near-black in all three channels.
    pub any_black: bool,
}

/// Texels darker than this in every channel count as black for the
/// punch-through heuristic. The threshold is deliberately large; these texels
/// are not forced to black, they are merely candidates for palette index 3.
fn is_black(c: Vec3A) -> bool {
    c.x < 1.0 / 8.0 && c.y < 1.0 / 8.0 && c.z < 1.0 / 8.0
}

/// Finds similar colors and combines them, accumulating their weights.
///
/// Zero-weight texels are dropped entirely. Two colors match when they are
/// within 1/256 of each other in every channel, so the merge is lossy only
/// below the 8-bit quantization step.
pub(crate) fn reduce_colors(input_colors: &[Vec3A; 16], input_weights: &[f32; 16]) -> ColorSet {
    const THRESHOLD: f32 = 1.0 / 256.0;

    let mut set = ColorSet {
        colors: [Vec3A::ZERO; 16],
        weights: [0.0; 16],
        count: 0,
        any_black: false,
    };

    for i in 0..16 {
        let ci = input_colors[i];
        let wi = input_weights[i];
        if wi <= 0.0 {
            continue;
        }

        let matching = set.colors[..set.count]
            .iter()
            .position(|&c| (c - ci).abs().max_element() < THRESHOLD);
        match matching {
            Some(j) => set.weights[j] += wi,
            None => {
                set.colors[set.count] = ci;
                set.weights[set.count] = wi;
                set.count += 1;
            }
        }

        if is_black(ci) {
            set.any_black = true;
        }
    }

    debug_assert!(set.count <= 16);
    set
}

/// Filters near-black colors out of a reduced set, for the 3-color fit where
/// they will be carried by the transparent-black palette entry instead.
pub(crate) fn skip_blacks(
    colors: &[Vec3A],
    weights: &[f32],
) -> ([Vec3A; 16], [f32; 16], usize) {
    let mut out_colors = [Vec3A::ZERO; 16];
    let mut out_weights = [0.0; 16];
    let mut n = 0;

    for (&c, &w) in colors.iter().zip(weights) {
        if is_black(c) {
            continue;
        }
        out_colors[n] = c;
        out_weights[n] = w;
        n += 1;
    }

    (out_colors, out_weights, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_near_identical_colors() {
        let mut colors = [Vec3A::splat(0.5); 16];
        colors[3] = Vec3A::splat(0.5 + 0.4 / 256.0);
        colors[9] = Vec3A::new(0.9, 0.5, 0.5);
        let weights = [1.0; 16];

        let set = reduce_colors(&colors, &weights);
        assert_eq!(set.count, 2);
        assert_eq!(set.weights[0], 15.0);
        assert_eq!(set.weights[1], 1.0);
        assert!(!set.any_black);
    }

    #[test]
    fn zero_weight_texels_are_dropped() {
        let mut colors = [Vec3A::splat(0.5); 16];
        colors[0] = Vec3A::new(0.0, 0.0, 0.0);
        let mut weights = [1.0; 16];
        weights[0] = 0.0;

        let set = reduce_colors(&colors, &weights);
        assert_eq!(set.count, 1);
        // The zero-weight black texel must not set the flag either.
        assert!(!set.any_black);
    }

    #[test]
    fn detects_near_black() {
        let mut colors = [Vec3A::splat(0.8); 16];
        colors[5] = Vec3A::new(0.05, 0.1, 0.0);
        let weights = [1.0; 16];

        let set = reduce_colors(&colors, &weights);
        assert!(set.any_black);

        let (_, _, n) = skip_blacks(&set.colors[..set.count], &set.weights[..set.count]);
        assert_eq!(n, 1);
    }
}
