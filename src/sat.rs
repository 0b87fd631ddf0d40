use glam::Vec3A;

use crate::pca::compute_principal_component;

/// Prefix sums of weighted R, G, B and weight over the colors sorted along
/// their principal axis.
///
/// Entries at and beyond `count` hold `f32::MAX`, so a lookup past the end
/// produces an error that dominates any comparison instead of a wrong
/// candidate. This keeps batched partition evaluation free of bounds
/// branches.
pub(crate) struct SummedAreaTable {
    pub r: [f32; 16],
    pub g: [f32; 16],
    pub b: [f32; 16],
    pub w: [f32; 16],
}

impl SummedAreaTable {
    /// Cumulative sums over the first `c` sorted colors; `c == 0` is the
    /// implicit zero row.
    #[inline]
    pub(crate) fn row(&self, c: u8) -> (Vec3A, f32) {
        if c == 0 {
            (Vec3A::ZERO, 0.0)
        } else {
            let i = c as usize - 1;
            (Vec3A::new(self.r[i], self.g[i], self.b[i]), self.w[i])
        }
    }

    pub(crate) fn total(&self, count: usize) -> (Vec3A, f32) {
        debug_assert!(count > 0);
        let i = count - 1;
        (Vec3A::new(self.r[i], self.g[i], self.b[i]), self.w[i])
    }
}

/// Projects the colors onto their principal axis, stably sorts them by
/// projection and builds the summed-area table in that order.
pub(crate) fn compute_sat(colors: &[Vec3A], weights: &[f32], count: usize) -> SummedAreaTable {
    let principal = compute_principal_component(&colors[..count], &weights[..count]);

    let mut order = [0_usize; 16];
    let mut dps = [0.0_f32; 16];
    for i in 0..count {
        order[i] = i;
        dps[i] = colors[i].dot(principal);
    }

    // Stable insertion sort; ties keep their original order.
    for i in 0..count {
        let mut j = i;
        while j > 0 && dps[j] < dps[j - 1] {
            dps.swap(j, j - 1);
            order.swap(j, j - 1);
            j -= 1;
        }
    }

    let mut sat = SummedAreaTable {
        r: [f32::MAX; 16],
        g: [f32::MAX; 16],
        b: [f32::MAX; 16],
        w: [f32::MAX; 16],
    };

    let mut acc = Vec3A::ZERO;
    let mut acc_w = 0.0;
    for i in 0..count {
        let p = order[i];
        acc += colors[p] * weights[p];
        acc_w += weights[p];
        sat.r[i] = acc.x;
        sat.g[i] = acc.y;
        sat.b[i] = acc.z;
        sat.w[i] = acc_w;
    }

    sat
}
