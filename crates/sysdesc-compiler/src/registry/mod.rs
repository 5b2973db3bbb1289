//! Type Registry
//!
//! Maps a syntax-level [`TypeRef`] to a type descriptor, the descriptor's
//! constructor arguments and a pre-filled base. The descriptor then builds the
//! concrete IR node, lowering nested types back through the [`Lowerer`].
//!
//! Resolution must be a pure function of its inputs: the same struct is
//! lowered once per direction it is used in, and every lowering has to agree.

mod builtin;

pub use builtin::BuiltinRegistry;

use crate::ast::TypeRef;
use crate::error::LowerResult;
use crate::ir::{Dir, IntTypeCommon, Type};
use crate::lower::Lowerer;

/// Result of resolving a type reference
pub struct Resolution<'r, 't> {
    /// Descriptor that builds the node
    pub desc: &'r dyn TypeDesc,
    /// Constructor arguments left after the registry consumed the base and `opt`
    pub args: &'t [TypeRef],
    /// Common attributes, with integer size and bitfield width where they apply
    pub base: IntTypeCommon,
}

/// Resolves type references to descriptors
pub trait TypeRegistry {
    fn resolve<'r, 't>(
        &'r self,
        ty: &'t TypeRef,
        field: &str,
        dir: Dir,
        is_arg: bool,
    ) -> LowerResult<Resolution<'r, 't>>;
}

/// Builds IR nodes of one kind
pub trait TypeDesc {
    /// Descriptor name, for logging
    fn name(&self) -> &'static str;

    /// Build the node. Nested types go through `lower.gen_type`, struct
    /// references are reported through `lower.note_struct_use`.
    fn instantiate(
        &self,
        lower: &mut Lowerer<'_>,
        ty: &TypeRef,
        args: &[TypeRef],
        base: IntTypeCommon,
    ) -> LowerResult<Type>;
}
