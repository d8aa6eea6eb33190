pub mod archive;
pub mod recording;

pub use archive::*;
pub use recording::*;
