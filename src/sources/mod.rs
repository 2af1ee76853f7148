//! Concrete scan sources

pub mod channel;
pub mod replay;

pub use channel::{ChannelSource, FrameFeeder};
pub use replay::{Capture, CapturedFrame, ReplaySource};
