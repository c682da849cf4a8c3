/// Utility function to compute the Euclidean distance between two points.
///
/// Example:
/// ```
/// use pointfit_3d::ops::euclidean_distance;
///
/// let a = [1.0, 2.0, 3.0];
/// let b = [4.0, 6.0, 3.0];
/// assert_eq!(euclidean_distance(&a, &b), 5.0);
/// ```
pub fn euclidean_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    squared_euclidean_distance(a, b).sqrt()
}

/// Squared Euclidean distance between two points.
#[inline]
pub fn squared_euclidean_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

/// Compute the centroid of a set of points.
///
/// Returns the origin for an empty set.
pub fn centroid(points: &[[f64; 3]]) -> [f64; 3] {
    if points.is_empty() {
        return [0.0; 3];
    }
    let mut sum = [0.0; 3];
    for p in points {
        sum[0] += p[0];
        sum[1] += p[1];
        sum[2] += p[2];
    }
    let n = points.len() as f64;
    [sum[0] / n, sum[1] / n, sum[2] / n]
}

/// Compute the axis aligned bounds `(min, max)` of a set of points.
pub fn bounds(points: &[[f64; 3]]) -> Option<([f64; 3], [f64; 3])> {
    let first = *points.first()?;
    Some(points.iter().fold((first, first), |(mut lo, mut hi), p| {
        for i in 0..3 {
            lo[i] = lo[i].min(p[i]);
            hi[i] = hi[i].max(p[i]);
        }
        (lo, hi)
    }))
}

/// Length of the diagonal of the axis aligned bounding box.
///
/// Used to scale default radii and noise magnitudes. Zero for an empty set.
pub fn diagonal_size(points: &[[f64; 3]]) -> f64 {
    bounds(points).map_or(0.0, |(lo, hi)| euclidean_distance(&lo, &hi))
}

/// Mean distance of the points from their centroid.
pub fn average_size(points: &[[f64; 3]]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let center = centroid(points);
    points
        .iter()
        .map(|p| euclidean_distance(p, &center))
        .sum::<f64>()
        / points.len() as f64
}
