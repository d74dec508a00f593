//! The type oracle.
//!
//! Maps every expression node to its type, and tracks which nodes denote
//! storage locations (left-values) and which are compile-time constants.
//! Passes that build new nodes are responsible for entering them here;
//! reading a node that was never entered is a fatal internal diagnostic.

use crate::diagnostics::{InternalError, PassResult};
use crate::ir::syntax::{Expr, NodeId};
use crate::shared::Type;
use std::collections::{HashMap, HashSet};

#[derive(Default)]
pub struct TypeMap {
    types: HashMap<NodeId, Type>,
    left_values: HashSet<NodeId>,
    constants: HashSet<NodeId>,
}

impl TypeMap {
    pub fn get_type(&self, e: &Expr) -> PassResult<&Type> {
        self.types
            .get(&e.id)
            .ok_or(InternalError::MissingType(e.pos))
    }

    pub fn try_type(&self, e: &Expr) -> Option<&Type> {
        self.types.get(&e.id)
    }

    pub fn set_type(&mut self, e: &Expr, ty: Type) {
        self.types.insert(e.id, ty);
    }

    pub fn is_left_value(&self, e: &Expr) -> bool {
        self.left_values.contains(&e.id)
    }

    pub fn set_left_value(&mut self, e: &Expr) {
        self.left_values.insert(e.id);
    }

    pub fn is_compile_time_constant(&self, e: &Expr) -> bool {
        self.constants.contains(&e.id)
    }

    pub fn set_compile_time_constant(&mut self, e: &Expr) {
        self.constants.insert(e.id);
    }
}
