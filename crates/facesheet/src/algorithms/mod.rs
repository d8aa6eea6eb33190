pub mod preprocessing;
pub mod detection;
pub mod crop;

pub use preprocessing::*;
pub use detection::*;
pub use crop::*;
