//! Closed-form model family implementations.
//!
//! Models are implemented as small, pure functions so that fitting/search code
//! can stay generic over `ModelFamily`.

pub mod model;
pub mod window;

pub use model::*;
pub use window::*;
