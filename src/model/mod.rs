pub mod common;
pub mod tags;

pub use common::*;
pub use tags::*;
