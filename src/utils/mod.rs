//! Utility module

mod error;
mod position;

pub use error::{Diagnostic, Error, Phase, Result};
pub use position::Position;
