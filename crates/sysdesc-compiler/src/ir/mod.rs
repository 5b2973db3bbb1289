//! Intermediate Representation
//!
//! The resolved, deterministically ordered output of lowering:
//! resource descriptors, syscall descriptors and per-direction struct
//! field lists.

pub mod types;

pub use types::{
    ArrayType, BufferType, ConstType, Dir, FlagsType, IntType, IntTypeCommon, LenType, ProcType,
    PtrType, ResourceType, StructRefType, Type, TypeCommon,
};

/// A struct usage: the same struct used in two directions is generated twice
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StructKey {
    pub name: String,
    pub dir: Dir,
}

impl StructKey {
    pub fn new(name: impl Into<String>, dir: Dir) -> Self {
        Self {
            name: name.into(),
            dir,
        }
    }
}

/// A resource with its inheritance chain flattened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDesc {
    pub name: String,
    /// Ancestor names, root first, ending with `name`
    pub kind: Vec<String>,
    /// Special values, root values first; `[0]` if none declared
    pub values: Vec<u64>,
    /// Lowered non-resource base type
    pub ty: Type,
}

/// A lowered syscall signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syscall {
    pub name: String,
    pub call_name: String,
    pub nr: Option<u64>,
    pub args: Vec<Type>,
    pub ret: Option<Type>,
}

/// Field list generated for one struct usage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructFields {
    pub key: StructKey,
    pub fields: Vec<Type>,
}

/// Complete output of one lowering run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prog {
    /// Sorted by name
    pub resources: Vec<ResourceDesc>,
    /// Sorted by name
    pub syscalls: Vec<Syscall>,
    /// Sorted by name, then direction
    pub structs: Vec<StructFields>,
}

impl Prog {
    pub fn resource(&self, name: &str) -> Option<&ResourceDesc> {
        self.resources.iter().find(|r| r.name == name)
    }

    pub fn syscall(&self, name: &str) -> Option<&Syscall> {
        self.syscalls.iter().find(|c| c.name == name)
    }

    pub fn struct_fields(&self, name: &str, dir: Dir) -> Option<&StructFields> {
        self.structs
            .iter()
            .find(|s| s.key.name == name && s.key.dir == dir)
    }
}
