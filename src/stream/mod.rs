//! Stream adapters for color updates

mod updates;

pub use updates::UpdateStream;
