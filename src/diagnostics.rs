//! Fatal internal diagnostics.
//!
//! The expression-normalization pass assumes a well-typed, resolved input
//! tree. Every error here is an internal invariant violation: the pass
//! either transforms the program completely or aborts with one of these.

use crate::pos::Pos;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InternalError {
    #[error("{0}: no type recorded for expression")]
    MissingType(Pos),
    #[error("{0}: method call cannot be used as a left-value")]
    CallAsLeftValue(Pos),
    #[error("{0}: dismantling produced no residual expression")]
    MissingResidual(Pos),
    #[error("{0}: callee does not resolve to a method")]
    NotAMethod(Pos),
    #[error("{pos}: call has {args} arguments but the method declares {params} parameters")]
    ArityMismatch { pos: Pos, args: usize, params: usize },
}

pub type PassResult<T> = Result<T, InternalError>;
