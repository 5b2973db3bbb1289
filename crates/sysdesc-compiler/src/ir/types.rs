//! IR type nodes
//!
//! A closed set of type variants. `Int`, `Const`, `Len`, `Flags` and `Proc`
//! share [`IntTypeCommon`] and are the only variants that can be bitfields.

use crate::error::{LowerError, LowerResult};
use std::fmt;

/// Usage direction of a type instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dir {
    In,
    Out,
    InOut,
}

impl Dir {
    /// Parse a direction keyword (`in`, `out`, `inout`)
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "in" => Some(Dir::In),
            "out" => Some(Dir::Out),
            "inout" => Some(Dir::InOut),
            _ => None,
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dir::In => write!(f, "in"),
            Dir::Out => write!(f, "out"),
            Dir::InOut => write!(f, "inout"),
        }
    }
}

/// Attributes shared by every type node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCommon {
    pub type_name: String,
    pub field_name: String,
    pub dir: Dir,
    pub optional: bool,
}

impl TypeCommon {
    pub fn new(type_name: &str, field_name: &str, dir: Dir, optional: bool) -> Self {
        Self {
            type_name: type_name.to_string(),
            field_name: field_name.to_string(),
            dir,
            optional,
        }
    }
}

/// Attributes shared by integer-like, bitfield-capable types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntTypeCommon {
    pub common: TypeCommon,
    pub big_endian: bool,
    /// Storage size in bytes
    pub size: u64,
    /// Bitfield width, 0 if not a bitfield
    pub bitfield_len: u64,
    /// Bit offset within the current bitfield group
    pub bitfield_off: u64,
    /// Whether this is the last bitfield of its group
    pub bitfield_last: bool,
}

impl IntTypeCommon {
    pub fn new(common: TypeCommon, size: u64, bitfield_len: u64, big_endian: bool) -> Self {
        Self {
            common,
            big_endian,
            size,
            bitfield_len,
            bitfield_off: 0,
            bitfield_last: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntType {
    pub int: IntTypeCommon,
    /// Inclusive value range
    pub range: Option<(u64, u64)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstType {
    pub int: IntTypeCommon,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LenType {
    pub int: IntTypeCommon,
    /// Name of the field whose length this is
    pub buf: String,
    /// Length unit in bytes; `None` counts elements
    pub byte_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagsType {
    pub int: IntTypeCommon,
    pub values: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcType {
    pub int: IntTypeCommon,
    pub values_start: u64,
    pub values_per_proc: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceType {
    pub common: TypeCommon,
    /// Name of the referenced resource
    pub resource: String,
    /// Size of the resource's underlying type
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferType {
    pub common: TypeCommon,
    /// Candidate string values, empty if unconstrained
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtrType {
    pub common: TypeCommon,
    pub size: u64,
    pub elem: Box<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayType {
    pub common: TypeCommon,
    pub elem: Box<Type>,
    /// Fixed element count
    pub len: Option<u64>,
}

/// Reference to a generated struct or union field list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructRefType {
    pub common: TypeCommon,
    pub key: super::StructKey,
}

/// A lowered type node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int(IntType),
    Const(ConstType),
    Len(LenType),
    Flags(FlagsType),
    Proc(ProcType),
    Resource(ResourceType),
    Buffer(BufferType),
    Ptr(PtrType),
    Array(ArrayType),
    Struct(StructRefType),
    Union(StructRefType),
}

impl Type {
    /// Shared attributes
    pub fn common(&self) -> &TypeCommon {
        match self {
            Type::Int(t) => &t.int.common,
            Type::Const(t) => &t.int.common,
            Type::Len(t) => &t.int.common,
            Type::Flags(t) => &t.int.common,
            Type::Proc(t) => &t.int.common,
            Type::Resource(t) => &t.common,
            Type::Buffer(t) => &t.common,
            Type::Ptr(t) => &t.common,
            Type::Array(t) => &t.common,
            Type::Struct(t) | Type::Union(t) => &t.common,
        }
    }

    pub fn name(&self) -> &str {
        &self.common().type_name
    }

    pub fn field_name(&self) -> &str {
        &self.common().field_name
    }

    pub fn dir(&self) -> Dir {
        self.common().dir
    }

    pub fn is_optional(&self) -> bool {
        self.common().optional
    }

    /// Integer attributes, for the bitfield-capable variants only
    pub fn int_common(&self) -> Option<&IntTypeCommon> {
        match self {
            Type::Int(t) => Some(&t.int),
            Type::Const(t) => Some(&t.int),
            Type::Len(t) => Some(&t.int),
            Type::Flags(t) => Some(&t.int),
            Type::Proc(t) => Some(&t.int),
            _ => None,
        }
    }

    fn int_common_mut(&mut self) -> Option<&mut IntTypeCommon> {
        match self {
            Type::Int(t) => Some(&mut t.int),
            Type::Const(t) => Some(&mut t.int),
            Type::Len(t) => Some(&mut t.int),
            Type::Flags(t) => Some(&mut t.int),
            Type::Proc(t) => Some(&mut t.int),
            _ => None,
        }
    }

    /// Static size in bytes; 0 for variable-length or not-yet-laid-out types
    pub fn size(&self) -> u64 {
        match self {
            Type::Resource(t) => t.size,
            Type::Ptr(t) => t.size,
            Type::Buffer(_) | Type::Array(_) | Type::Struct(_) | Type::Union(_) => 0,
            _ => self.int_common().map_or(0, |int| int.size),
        }
    }

    /// Bitfield width, 0 if this is not a bitfield
    pub fn bitfield_length(&self) -> u64 {
        self.int_common().map_or(0, |int| int.bitfield_len)
    }

    pub fn bitfield_offset(&self) -> u64 {
        self.int_common().map_or(0, |int| int.bitfield_off)
    }

    pub fn is_bitfield_last(&self) -> bool {
        self.int_common().is_some_and(|int| int.bitfield_last)
    }

    /// Record the packing result for a bitfield field
    pub fn set_bitfield_offset(&mut self, offset: u64, last: bool) -> LowerResult<()> {
        let type_name = self.name().to_string();
        let int = self
            .int_common_mut()
            .ok_or(LowerError::NotBitfield { type_name })?;
        int.bitfield_off = offset;
        int.bitfield_last = last;
        Ok(())
    }
}
