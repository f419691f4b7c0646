//! HTTP handlers.

mod misc;
mod personas;
mod sessions;

pub use misc::*;
pub use personas::*;
pub use sessions::*;
