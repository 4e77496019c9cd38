pub mod stabilize;
pub mod model;

pub use stabilize::{softmax_columns, Stabilizer, SoftmaxOutput, EXP_CLAMP};
pub use model::{predicted_classes, ModelState, SoftmaxRegression};
