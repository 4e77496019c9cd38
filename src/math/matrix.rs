use rand::Rng;
use serde::{Serialize, Deserialize};
use std::ops::{Sub, Mul};

/// Dense row-major matrix. Used for the weight, probability and indicator
/// matrices, which are small next to the document-term data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Fills a matrix with draws from the uniform interval `[0, scale)`.
    ///
    /// The generator is passed in so a fixed seed reproduces the same draw.
    pub fn random_uniform<R: Rng + ?Sized>(rows: usize, cols: usize, scale: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);

        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = scale * rng.gen::<f64>();
            }
        }

        res
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map_or(0, |row| row.len()),
            data
        }
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row][col] = value;
    }

    pub fn same_shape(&self, other: &Matrix) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    /// In-place `self += alpha * other`.
    pub fn scale_add(&mut self, alpha: f64, other: &Matrix) {
        if !self.same_shape(other) {
            panic!("Matrices are of incorrect sizes")
        }

        for (row, other_row) in self.data.iter_mut().zip(other.data.iter()) {
            for (x, y) in row.iter_mut().zip(other_row.iter()) {
                *x += alpha * y;
            }
        }
    }

    /// Copies column `col` out into a vector.
    pub fn column(&self, col: usize) -> Vec<f64> {
        self.data.iter().map(|row| row[col]).collect()
    }

    pub fn column_sum(&self, col: usize) -> f64 {
        self.data.iter().map(|row| row[col]).sum()
    }

    /// Row index of the largest entry in column `col`.
    ///
    /// The first row holding the strict maximum wins; later equal values do
    /// not replace it. NaN entries are never selected over a number.
    pub fn argmax_column(&self, col: usize) -> usize {
        argmax(self.data.iter().map(|row| row[col]))
    }
}

/// Index of the first strict maximum in a sequence. Returns 0 for an empty
/// sequence.
pub fn argmax<I>(values: I) -> usize
where
    I: IntoIterator<Item = f64>,
{
    let mut best_idx = 0;
    let mut best: Option<f64> = None;
    for (i, v) in values.into_iter().enumerate() {
        match best {
            None if !v.is_nan() => {
                best = Some(v);
                best_idx = i;
            }
            Some(b) if v > b => {
                best = Some(v);
                best_idx = i;
            }
            _ => {}
        }
    }
    best_idx
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Sub for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, self.cols);

        for i in 0..self.rows {
            for j in 0..self.cols {
                res.data[i][j] = self.data[i][j] - rhs.data[i][j];
            }
        }

        res
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.cols != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res =  Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    sum += self.data[i][k] * rhs.data[k][j];
                }

                res.data[i][j] = sum;
            }
        }

        res
    }
}
