pub mod method_call;
pub mod side_effects;
pub mod table_apply;
pub mod type_map;

pub use method_call::MethodCallDescription;
pub use type_map::TypeMap;
