pub mod constructors;
pub mod pretty;
pub mod syntax;
pub mod walk;

pub use syntax::*;
pub use walk::Visitor;
