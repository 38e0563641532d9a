pub mod dispatch;
pub mod memory;
pub mod postgres;
pub mod traits;

pub use dispatch::*;
pub use memory::*;
pub use postgres::*;
pub use traits::*;
