use std::ops::Add;

///
/// Dense row-major matrix: one row per feature (or annotation), one column per sample.
///
#[derive(Debug, Clone, PartialEq)]
pub struct CountMatrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T> CountMatrix<T>
where
    T: Copy + Default + Add<Output = T>,
{
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![T::default(); rows * cols],
            rows,
            cols,
        }
    }

    ///
    /// Build a matrix from per-sample columns of `rows` values each.
    ///
    pub fn from_columns(rows: usize, columns: &[&[T]]) -> Result<Self, String> {
        let cols = columns.len();
        let mut matrix = Self::new(rows, cols);
        for (col, column) in columns.iter().enumerate() {
            if column.len() != rows {
                return Err(format!(
                    "Column {} has {} values, expected {}",
                    col,
                    column.len(),
                    rows
                ));
            }
            for (row, &value) in column.iter().enumerate() {
                matrix.data[row * cols + col] = value;
            }
        }
        Ok(matrix)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<(), String> {
        if row < self.rows && col < self.cols {
            self.data[row * self.cols + col] = value;
            Ok(())
        } else {
            Err(format!("Index out of bounds: row {}, col {}", row, col))
        }
    }

    pub fn add(&mut self, row: usize, col: usize, value: T) -> Result<(), String> {
        if row < self.rows && col < self.cols {
            let index = row * self.cols + col;
            self.data[index] = self.data[index] + value;
            Ok(())
        } else {
            Err(format!("Index out of bounds: row {}, col {}", row, col))
        }
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn column(&self, col: usize) -> Vec<T> {
        (0..self.rows)
            .map(|row| self.data[row * self.cols + col])
            .collect()
    }

    /// Sum of a row, `T::default()` for an empty row.
    pub fn row_sum(&self, row: usize) -> T {
        self.row(row)
            .iter()
            .fold(T::default(), |total, &value| total + value)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_set_get_add() {
        let mut matrix: CountMatrix<f64> = CountMatrix::new(2, 3);
        matrix.set(1, 2, 4.0).unwrap();
        matrix.add(1, 2, 0.5).unwrap();
        matrix.add(0, 0, 1.0).unwrap();

        assert_eq!(matrix.get(1, 2), Some(&4.5));
        assert_eq!(matrix.row(1), &[0.0, 0.0, 4.5]);
        assert_eq!(matrix.column(0), vec![1.0, 0.0]);
        assert_eq!(matrix.row_sum(1), 4.5);
    }

    #[rstest]
    fn test_from_columns() {
        let first: &[u32] = &[1, 2, 3];
        let second: &[u32] = &[4, 5, 6];
        let matrix = CountMatrix::from_columns(3, &[first, second]).unwrap();

        assert_eq!(matrix.row(0), &[1, 4]);
        assert_eq!(matrix.row(2), &[3, 6]);
        assert_eq!(matrix.column(1), vec![4, 5, 6]);

        assert!(CountMatrix::from_columns(2, &[first]).is_err());
    }

    #[rstest]
    fn test_out_of_bounds() {
        let mut matrix: CountMatrix<u32> = CountMatrix::new(1, 1);
        assert!(matrix.set(1, 0, 1).is_err());
        assert!(matrix.add(0, 1, 1).is_err());
        assert_eq!(matrix.get(0, 1), None);
    }

    #[rstest]
    fn test_no_columns() {
        let matrix: CountMatrix<f64> = CountMatrix::new(2, 0);
        assert_eq!(matrix.row(1), &[] as &[f64]);
        assert_eq!(matrix.row_sum(0), 0.0);
    }
}
