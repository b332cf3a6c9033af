//! Matrix transposes used by the six-step and eight-step algorithms.
//!
//! Matrices are stored row-major.  `src` has `rows` rows of `cols` elements and `dst`
//! receives `cols` rows of `rows` elements.

/// Edge length of the tiles used by [`transpose_blocked`].
///
/// [`transpose_blocked`]: fn.transpose_blocked.html
pub const BLOCK: usize = 16;

/// Transposes element by element.
pub fn transpose<T: Copy>(src: &[T], dst: &mut [T], rows: usize, cols: usize) {
    debug_assert!(src.len() >= rows * cols && dst.len() >= rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            dst[col * rows + row] = src[row * cols + col];
        }
    }
}

/// Transposes one tile at a time, keeping both access patterns within a few cache lines.
pub fn transpose_blocked<T: Copy>(src: &[T], dst: &mut [T], rows: usize, cols: usize) {
    debug_assert!(src.len() >= rows * cols && dst.len() >= rows * cols);
    for row_block in (0..rows).step_by(BLOCK) {
        for col_block in (0..cols).step_by(BLOCK) {
            for row in row_block..rows.min(row_block + BLOCK) {
                for col in col_block..cols.min(col_block + BLOCK) {
                    dst[col * rows + row] = src[row * cols + col];
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn transposes_agree() {
        for &(rows, cols) in &[(1usize, 1usize), (2, 3), (16, 32), (17, 5), (64, 64)] {
            let src = (0..rows * cols).collect::<Vec<_>>();
            let mut simple = vec![0; rows * cols];
            let mut blocked = vec![0; rows * cols];
            transpose(&src, &mut simple, rows, cols);
            transpose_blocked(&src, &mut blocked, rows, cols);
            assert_eq!(simple, blocked);
            for row in 0..rows {
                for col in 0..cols {
                    assert_eq!(simple[col * rows + row], row * cols + col);
                }
            }
        }
    }
}
