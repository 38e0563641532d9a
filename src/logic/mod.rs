pub mod batch_session;
pub mod diff;
pub mod editor;
pub mod immediate;
pub mod validate;

pub use batch_session::*;
pub use diff::compile;
pub use editor::*;
pub use immediate::*;
pub use validate::*;
