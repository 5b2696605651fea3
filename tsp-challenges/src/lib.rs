mod error;
pub use error::*;
mod matrix;
pub use matrix::*;
pub mod travelling_salesman;
pub use travelling_salesman::*;
