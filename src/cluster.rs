use glam::Vec3A;

use crate::color::round_565;
use crate::partitions::partition_tables;
use crate::sat::SummedAreaTable;

/// Best endpoint pair found by a cluster fit, still on the normalized 5-6-5
/// grid.
pub(crate) struct FitResult {
    pub start: Vec3A,
    pub end: Vec3A,
}

/// Solves the two-endpoint weighted least-squares problem for one partition
/// and scores it, keeping the running minimum.
///
/// A partition that leaves one side of the system empty makes the 2x2 system
/// singular; the division then produces a non-finite error which loses every
/// `<` comparison, so no explicit singularity branch is needed. The same
/// mechanism discards reads into the `f32::MAX` SAT padding.
struct Best {
    error: f32,
    start: Vec3A,
    end: Vec3A,
}

impl Best {
    fn new() -> Self {
        Self {
            error: f32::MAX,
            start: Vec3A::ZERO,
            end: Vec3A::ZERO,
        }
    }

    #[inline]
    fn consider(
        &mut self,
        alpha2_sum: f32,
        beta2_sum: f32,
        alphabeta_sum: f32,
        alphax_sum: Vec3A,
        betax_sum: Vec3A,
        metric_sqr: Vec3A,
    ) {
        let factor = 1.0 / (alpha2_sum * beta2_sum - alphabeta_sum * alphabeta_sum);

        let a = (alphax_sum * beta2_sum - betax_sum * alphabeta_sum) * factor;
        let b = (betax_sum * alpha2_sum - alphax_sum * alphabeta_sum) * factor;

        // clamp to the grid
        let a = round_565(a.clamp(Vec3A::ZERO, Vec3A::ONE));
        let b = round_565(b.clamp(Vec3A::ZERO, Vec3A::ONE));

        // closed-form residual of the quantized pair
        let e = a * a * alpha2_sum
            + b * b * beta2_sum
            + (a * b * alphabeta_sum - a * alphax_sum - b * betax_sum) * 2.0;
        let error = e.dot(metric_sqr);

        // Strictly-less keeps the first of equal candidates, which makes the
        // lexicographic table order the deterministic tie-break.
        if error < self.error {
            self.error = error;
            self.start = a;
            self.end = b;
        }
    }
}

/// Enumerates every ordered 4-cluster partition of the sorted colors and
/// returns the least-squares endpoint pair with the lowest weighted error.
///
/// Cluster interpolation coefficients are 1, 2/3, 1/3, 0 along the endpoint
/// line; all cluster sums come from O(1) SAT row differences.
pub(crate) fn cluster_fit_four(
    sat: &SummedAreaTable,
    count: usize,
    metric_sqr: Vec3A,
) -> FitResult {
    let tables = partition_tables();
    let (x_sum, w_sum) = sat.total(count);

    let mut best = Best::new();

    for p in &tables.four[..tables.four_total[count - 1]] {
        let (x0, w0) = sat.row(p.c0);
        let (x1, w1) = sat.row(p.c1);
        let (x2, w2) = sat.row(p.c2);

        let w3 = w_sum - w2;
        let x2 = x2 - x1;
        let w2 = w2 - w1;
        let x1 = x1 - x0;
        let w1 = w1 - w0;

        let alpha2_sum = w0 + w1 * (4.0 / 9.0) + w2 * (1.0 / 9.0);
        let beta2_sum = w3 + w2 * (4.0 / 9.0) + w1 * (1.0 / 9.0);
        let alphabeta_sum = (w1 + w2) * (2.0 / 9.0);

        let alphax_sum = x0 + x1 * (2.0 / 3.0) + x2 * (1.0 / 3.0);
        let betax_sum = x_sum - alphax_sum;

        best.consider(
            alpha2_sum,
            beta2_sum,
            alphabeta_sum,
            alphax_sum,
            betax_sum,
            metric_sqr,
        );
    }

    FitResult {
        start: best.start,
        end: best.end,
    }
}

/// The 3-cluster variant: interpolation coefficients 1, 1/2, 0. Used for
/// blocks encoded in 3-color mode.
pub(crate) fn cluster_fit_three(
    sat: &SummedAreaTable,
    count: usize,
    metric_sqr: Vec3A,
) -> FitResult {
    let tables = partition_tables();
    let (x_sum, w_sum) = sat.total(count);

    let mut best = Best::new();

    for p in &tables.three[..tables.three_total[count - 1]] {
        let (x0, w0) = sat.row(p.c0);
        let (x1, w1) = sat.row(p.c1);

        let w2 = w_sum - w1;
        let x1 = x1 - x0;
        let w1 = w1 - w0;

        let alphabeta_sum = w1 * 0.25;
        let alpha2_sum = w0 + alphabeta_sum;
        let beta2_sum = w2 + alphabeta_sum;

        let alphax_sum = x0 + x1 * 0.5;
        let betax_sum = x_sum - alphax_sum;

        best.consider(
            alpha2_sum,
            beta2_sum,
            alphabeta_sum,
            alphax_sum,
            betax_sum,
            metric_sqr,
        );
    }

    FitResult {
        start: best.start,
        end: best.end,
    }
}
