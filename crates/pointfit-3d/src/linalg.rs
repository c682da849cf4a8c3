use crate::{error::PointSetError, utils};

/// Transform a set of points with a linear map followed by a translation.
///
/// Every destination point is computed as `dst_m_src * src + dst_t_src`. The
/// linear map is not required to be a rotation: scales, shears and mirrors
/// are applied the same way.
///
/// # Arguments
///
/// * `src_points` - A set of points to be transformed.
/// * `dst_m_src` - A 3x3 linear map in row major order.
/// * `dst_t_src` - A translation vector.
/// * `dst_points` - A pre-allocated buffer of the same size as `src_points`.
///
/// Example:
///
/// ```
/// use pointfit_3d::linalg::transform_points3d;
///
/// let src_points = vec![[2.0, 2.0, 2.0], [3.0, 4.0, 5.0]];
/// let rotation = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
/// let translation = [0.0, 0.0, 0.0];
/// let mut dst_points = vec![[0.0; 3]; src_points.len()];
/// transform_points3d(&src_points, &rotation, &translation, &mut dst_points).unwrap();
/// assert_eq!(dst_points, src_points);
/// ```
pub fn transform_points3d(
    src_points: &[[f64; 3]],
    dst_m_src: &[[f64; 3]; 3],
    dst_t_src: &[f64; 3],
    dst_points: &mut [[f64; 3]],
) -> Result<(), PointSetError> {
    if src_points.len() != dst_points.len() {
        return Err(PointSetError::ShapeMismatch(format!(
            "destination buffer holds {} points, source has {}",
            dst_points.len(),
            src_points.len()
        )));
    }
    transform_points3d_into(src_points, dst_m_src, dst_t_src, dst_points);
    Ok(())
}

/// Same as [`transform_points3d`] with the buffer sizes already checked.
pub(crate) fn transform_points3d_into(
    src_points: &[[f64; 3]],
    dst_m_src: &[[f64; 3]; 3],
    dst_t_src: &[f64; 3],
    dst_points: &mut [[f64; 3]],
) {
    debug_assert_eq!(src_points.len(), dst_points.len());
    if src_points.is_empty() {
        return;
    }

    let dst_m_src_mat = utils::array33_to_faer_mat33(dst_m_src);

    // Nx3 view, one point per row
    let points_in_src =
        faer::mat::from_row_major_slice(src_points.as_flattened(), src_points.len(), 3);

    // 3xN view, one point per column
    let num_points = dst_points.len();
    let mut points_in_dst =
        faer::mat::from_column_major_slice_mut(dst_points.as_flattened_mut(), 3, num_points);

    faer::linalg::matmul::matmul(
        &mut points_in_dst,
        dst_m_src_mat,
        points_in_src.transpose(),
        None,
        1.0,
        faer::Parallelism::None,
    );

    for point in dst_points.iter_mut() {
        point[0] += dst_t_src[0];
        point[1] += dst_t_src[1];
        point[2] += dst_t_src[2];
    }
}

/// Multiply two 3x3 matrices in row major order.
///
/// # Arguments
///
/// * `a` - The left hand side matrix.
/// * `b` - The right hand side matrix.
/// * `m` - The output matrix `a * b`.
pub fn matmul33(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3], m: &mut [[f64; 3]; 3]) {
    for (i, row) in m.iter_mut().enumerate() {
        for (j, val) in row.iter_mut().enumerate() {
            *val = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
}

/// Multiply a 3x3 matrix with a 3D vector.
pub fn mat33_vec3(m: &[[f64; 3]; 3], v: &[f64; 3]) -> [f64; 3] {
    [
        dot_product3(&m[0], v),
        dot_product3(&m[1], v),
        dot_product3(&m[2], v),
    ]
}

/// Compute the dot product of two 3D vectors.
#[inline]
pub fn dot_product3(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Compute the cross product of two 3D vectors.
#[inline]
pub fn cross_product3(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}
