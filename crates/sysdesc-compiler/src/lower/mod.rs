//! Description to IR Lowering
//!
//! Runs the three top-level passes over a description:
//!
//! 1. resources: flatten every resource's base chain,
//! 2. syscalls: lower every call signature, discovering struct usages,
//! 3. structs: generate field lists for every discovered `(name, dir)` until
//!    no new usage appears.
//!
//! Each output collection is sorted before it is returned, so the result does
//! not depend on declaration order.

mod bitfield;
mod resource;
mod structs;
mod syscall;

pub use bitfield::mark_bitfields;

use crate::ast::{Description, Field, TypeRef};
use crate::config::TargetConfig;
use crate::decls::DeclIndex;
use crate::error::LowerResult;
use crate::ir::{Dir, Prog, StructKey, Type};
use crate::registry::{BuiltinRegistry, TypeRegistry};
use log::{debug, trace};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Lower a description with the builtin registry for `target`
pub fn compile(desc: &Description, target: &TargetConfig) -> LowerResult<Prog> {
    let registry = BuiltinRegistry::new(target);
    compile_with(desc, &registry)
}

/// Lower a description with a custom registry
pub fn compile_with(desc: &Description, registry: &dyn TypeRegistry) -> LowerResult<Prog> {
    Lowerer::new(desc, registry).lower()
}

/// Struct usages discovered while lowering, queued for generation.
///
/// Each key is queued at most once per run.
#[derive(Debug, Default)]
pub struct StructUses {
    queue: VecDeque<StructKey>,
    seen: FxHashSet<StructKey>,
}

impl StructUses {
    /// Queue a key; returns false if it was already discovered
    pub fn push(&mut self, key: StructKey) -> bool {
        if self.seen.contains(&key) {
            return false;
        }
        self.seen.insert(key.clone());
        self.queue.push_back(key);
        true
    }

    /// Next key awaiting generation
    pub fn pop(&mut self) -> Option<StructKey> {
        self.queue.pop_front()
    }

    /// Number of keys discovered so far
    pub fn discovered(&self) -> usize {
        self.seen.len()
    }
}

/// Description to IR lowerer
pub struct Lowerer<'a> {
    /// Description being lowered
    desc: &'a Description,
    /// Name lookup over `desc`
    decls: DeclIndex<'a>,
    /// Type descriptor registry
    registry: &'a dyn TypeRegistry,
    /// Struct usages awaiting generation
    struct_uses: StructUses,
}

impl<'a> Lowerer<'a> {
    /// Create a new lowerer
    pub fn new(desc: &'a Description, registry: &'a dyn TypeRegistry) -> Self {
        Self {
            desc,
            decls: DeclIndex::new(desc),
            registry,
            struct_uses: StructUses::default(),
        }
    }

    /// Run all passes
    pub fn lower(&mut self) -> LowerResult<Prog> {
        let resources = self.gen_resources()?;
        let syscalls = self.gen_syscalls()?;
        let structs = self.gen_struct_fields()?;
        debug!(
            "lowered {} resources, {} syscalls, {} struct usages",
            resources.len(),
            syscalls.len(),
            structs.len()
        );
        Ok(Prog {
            resources,
            syscalls,
            structs,
        })
    }

    pub fn decls(&self) -> &DeclIndex<'a> {
        &self.decls
    }

    /// Report a struct usage found while instantiating a type
    pub fn note_struct_use(&mut self, key: StructKey) {
        self.struct_uses.push(key);
    }

    /// Lower one type reference through the registry
    pub fn gen_type(
        &mut self,
        ty: &TypeRef,
        field: &str,
        dir: Dir,
        is_arg: bool,
    ) -> LowerResult<Type> {
        let registry = self.registry;
        let res = registry.resolve(ty, field, dir, is_arg)?;
        trace!("{} -> {}", ty.ident, res.desc.name());
        res.desc.instantiate(self, ty, res.args, res.base)
    }

    fn gen_field(&mut self, field: &Field, dir: Dir, is_arg: bool) -> LowerResult<Type> {
        self.gen_type(&field.ty, &field.name, dir, is_arg)
    }

    fn gen_field_array(
        &mut self,
        fields: &[Field],
        dir: Dir,
        is_arg: bool,
    ) -> LowerResult<Vec<Type>> {
        fields
            .iter()
            .map(|f| self.gen_field(f, dir, is_arg))
            .collect()
    }
}
