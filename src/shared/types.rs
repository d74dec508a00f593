//! The types attached to flowscript IR nodes.

use crate::shared::Id;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Bool,
    /// `bit<N>` when unsigned, `int<N>` when signed
    Bits { width: u32, signed: bool },
    Void,
    /// a struct or header type, by name
    Named(Id),
    /// a match-action table, by name
    Table(Id),
    /// the result of `t.apply()`; cannot be written down as the type of a
    /// local variable
    ApplyResult(Id),
    /// the target of a parser transition
    State,
    Method(Box<MethodType>),
}

impl Type {
    pub fn bits(width: u32) -> Type {
        Type::Bits {
            width,
            signed: false,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn method(&self) -> Option<&MethodType> {
        match self {
            Type::Method(mt) => Some(mt),
            _ => None,
        }
    }
}

/// The signature of a callable: an action, a function, or an extern method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodType {
    /// names standing for caller-supplied types in `params`
    pub type_params: Vec<Id>,
    pub params: Vec<Param>,
    pub ret: Type,
    /// true only for externs known to read nothing but their arguments
    pub pure: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: Id,
    pub direction: Direction,
    pub ty: Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// compile-time argument; not evaluated at run time
    None,
    In,
    Out,
    InOut,
}

impl Direction {
    /// does the callee write through this parameter
    pub fn is_written(self) -> bool {
        matches!(self, Direction::Out | Direction::InOut)
    }
}
