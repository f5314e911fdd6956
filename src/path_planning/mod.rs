// Path Planning algorithms module

pub mod tree;
pub mod birrt;
pub mod path_smoothing;

pub use tree::*;
pub use birrt::*;
pub use path_smoothing::*;
