pub mod matrix;
pub mod sparse;

pub use matrix::Matrix;
pub use sparse::{csr_from_rows, SparseColumns};
