/// Utility function to convert a 3x3 array to a faer matrix 3x3.
///
/// # Arguments
///
/// * `array` - A 3x3 array in row major order.
///
/// # Returns
///
/// A faer matrix 3x3 viewing the array.
pub(crate) fn array33_to_faer_mat33(array: &[[f64; 3]; 3]) -> faer::MatRef<'_, f64> {
    faer::mat::from_row_major_slice(array.as_flattened(), 3, 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array33_to_mat33() {
        let array = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let mat = array33_to_faer_mat33(&array);
        for (i, row) in array.iter().enumerate() {
            for (j, val) in row.iter().enumerate() {
                assert_eq!(mat.read(i, j), *val);
            }
        }
    }
}
