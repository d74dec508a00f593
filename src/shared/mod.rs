pub mod id;
pub mod pretty;
pub mod types;

pub use id::{Id, ReferenceMap};
pub use types::{Direction, MethodType, Param, Type};
