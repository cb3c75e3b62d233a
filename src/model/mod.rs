pub mod poisson;
pub mod strength;

pub use poisson::{Prediction, Predictor};
pub use strength::StrengthTable;
