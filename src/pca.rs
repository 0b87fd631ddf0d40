use glam::Vec3A;

fn compute_centroid(colors: &[Vec3A], weights: &[f32]) -> Vec3A {
    let mut centroid = Vec3A::ZERO;
    let mut total = 0.0;
    for (&c, &w) in colors.iter().zip(weights) {
        total += w;
        centroid += c * w;
    }
    centroid * (1.0 / total)
}

/// The six unique entries of the weighted covariance matrix:
/// `[xx, xy, xz, yy, yz, zz]`.
fn compute_covariance(colors: &[Vec3A], weights: &[f32]) -> [f32; 6] {
    let centroid = compute_centroid(colors, weights);

    let mut cov = [0.0_f32; 6];
    for (&c, &w) in colors.iter().zip(weights) {
        let a = c - centroid;
        let b = a * w;

        cov[0] += a.x * b.x;
        cov[1] += a.x * b.y;
        cov[2] += a.x * b.z;
        cov[3] += a.y * b.y;
        cov[4] += a.y * b.z;
        cov[5] += a.z * b.z;
    }
    cov
}

fn estimate_principal_component(m: &[f32; 6]) -> Vec3A {
    let row0 = Vec3A::new(m[0], m[1], m[2]);
    let row1 = Vec3A::new(m[1], m[3], m[4]);
    let row2 = Vec3A::new(m[2], m[4], m[5]);

    let r0 = row0.length_squared();
    let r1 = row1.length_squared();
    let r2 = row2.length_squared();

    if r0 > r1 && r0 > r2 {
        return row0;
    }
    if r1 > r2 {
        return row1;
    }
    row2
}

fn first_eigen_vector(m: &[f32; 6]) -> Vec3A {
    if m[0] == 0.0 && m[3] == 0.0 && m[5] == 0.0 {
        // Degenerate distribution. The caller falls back to its bounding-box
        // estimate.
        return Vec3A::ZERO;
    }

    let mut v = estimate_principal_component(m);
    for _ in 0..8 {
        let x = v.x * m[0] + v.y * m[1] + v.z * m[2];
        let y = v.x * m[1] + v.y * m[3] + v.z * m[4];
        let z = v.x * m[2] + v.y * m[4] + v.z * m[5];

        // Only the direction is consumed, so an infinity-norm rescale is
        // enough to keep the iteration stable.
        let norm = x.abs().max(y.abs()).max(z.abs());

        v = Vec3A::new(x, y, z) * (1.0 / norm);
    }
    v
}

/// First principal component of the weighted color distribution, found with
/// eight rounds of power iteration. Eight is plenty for the near-collinear
/// distributions typical of 4x4 blocks, and the result is only used as a sort
/// key, never as a unit vector.
pub(crate) fn compute_principal_component(colors: &[Vec3A], weights: &[f32]) -> Vec3A {
    let cov = compute_covariance(colors, weights);
    first_eigen_vector(&cov)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_dominant_axis() {
        // Colors spread along the red axis with slight noise in green.
        let colors = [
            Vec3A::new(0.1, 0.50, 0.3),
            Vec3A::new(0.3, 0.52, 0.3),
            Vec3A::new(0.6, 0.49, 0.3),
            Vec3A::new(0.9, 0.51, 0.3),
        ];
        let weights = [1.0; 4];

        let v = compute_principal_component(&colors, &weights);
        assert!(v.x.abs() > 10.0 * v.y.abs());
        assert!(v.x.abs() > 10.0 * v.z.abs());
    }

    #[test]
    fn degenerate_distribution_yields_zero() {
        let colors = [Vec3A::splat(0.25); 3];
        let weights = [1.0; 3];
        assert_eq!(compute_principal_component(&colors, &weights), Vec3A::ZERO);
    }

    #[test]
    fn respects_weights() {
        // The heavy pair dominates the direction.
        let colors = [
            Vec3A::new(0.0, 0.0, 0.0),
            Vec3A::new(1.0, 0.0, 0.0),
            Vec3A::new(0.5, 0.0, 0.0),
            Vec3A::new(0.5, 0.0, 0.4),
        ];
        let weights = [10.0, 10.0, 0.1, 0.1];

        let v = compute_principal_component(&colors, &weights);
        assert!(v.x.abs() > v.z.abs());
    }
}
