//! Application state persisted across reloads.

mod model;

pub use model::ActivePointer;
