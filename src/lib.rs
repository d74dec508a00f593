//! The flowscript front end without IO or a driver: the typed IR of a
//! data-plane language, the oracles passes consult, and the pass that
//! makes sub-expression evaluation order explicit.

pub mod diagnostics;
pub mod ir;
pub mod pos;
pub mod shared;
pub mod simplify_expressions;
pub mod testing;
pub mod typing;

pub use simplify_expressions::simplify_program;
