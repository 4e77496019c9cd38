pub mod scale_mode;
pub mod scaler;

pub use scale_mode::ScaleMode;
pub use scaler::{scale, FittedScale, Scaler};
