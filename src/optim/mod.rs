pub mod gradient_ascent;

pub use gradient_ascent::{GradientAscent, WeightRescale};
