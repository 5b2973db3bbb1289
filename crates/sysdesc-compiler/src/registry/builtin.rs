//! Builtin type descriptors
//!
//! The default registry: fixed-width integers, `const`, `flags`, `len`,
//! `bytesize`, `proc`, `ptr`, `ptr64`, `array`, `string`, and references to
//! declared resources, structs and unions.

use super::{Resolution, TypeDesc, TypeRegistry};
use crate::ast::TypeRef;
use crate::config::TargetConfig;
use crate::error::{LowerError, LowerResult};
use crate::ir::{
    ArrayType, BufferType, ConstType, Dir, FlagsType, IntType, IntTypeCommon, LenType, ProcType,
    PtrType, ResourceType, StructKey, StructRefType, Type, TypeCommon,
};
use crate::lower::Lowerer;

/// Registry for the builtin type vocabulary of one target
#[derive(Debug, Clone)]
pub struct BuiltinRegistry {
    ptr_size: u64,
}

impl BuiltinRegistry {
    pub fn new(target: &TargetConfig) -> Self {
        Self {
            ptr_size: target.ptr_size,
        }
    }

    /// Size and endianness of an integer type name
    fn int_size(&self, ident: &str) -> Option<(u64, bool)> {
        match ident {
            "int8" => Some((1, false)),
            "int16" => Some((2, false)),
            "int32" => Some((4, false)),
            "int64" => Some((8, false)),
            "intptr" => Some((self.ptr_size, false)),
            "int16be" => Some((2, true)),
            "int32be" => Some((4, true)),
            "int64be" => Some((8, true)),
            _ => None,
        }
    }

    /// Base from an explicit integer argument such as `int8:3`
    fn int_base(
        &self,
        ty: &TypeRef,
        common: TypeCommon,
        int_ref: &TypeRef,
    ) -> LowerResult<IntTypeCommon> {
        let (size, big_endian) = self.int_size(&int_ref.ident).ok_or_else(|| {
            LowerError::bad_args(&ty.ident, format!("{:?} is not an integer type", int_ref.ident))
        })?;
        let bits = bitfield_width(ty, int_ref.bits, size)?;
        Ok(IntTypeCommon::new(common, size, bits, big_endian))
    }
}

/// Bitfield width of a `:N` suffix; it must fit in the storage unit
fn bitfield_width(ty: &TypeRef, bits: Option<u64>, size: u64) -> LowerResult<u64> {
    let bits = bits.unwrap_or(0);
    if bits > size * 8 {
        return Err(LowerError::bad_args(
            &ty.ident,
            format!("bitfield width {} exceeds {} bits", bits, size * 8),
        ));
    }
    Ok(bits)
}

/// Split a trailing `opt` off the argument list
fn split_opt(args: &[TypeRef]) -> (&[TypeRef], bool) {
    match args.split_last() {
        Some((last, rest)) if last.ident == "opt" && last.args.is_empty() => (rest, true),
        _ => (args, false),
    }
}

impl TypeRegistry for BuiltinRegistry {
    fn resolve<'r, 't>(
        &'r self,
        ty: &'t TypeRef,
        field: &str,
        dir: Dir,
        is_arg: bool,
    ) -> LowerResult<Resolution<'r, 't>> {
        let (args, optional) = split_opt(&ty.args);
        let common = TypeCommon::new(&ty.ident, field, dir, optional);

        if let Some((size, big_endian)) = self.int_size(&ty.ident) {
            let bits = bitfield_width(ty, ty.bits, size)?;
            return Ok(Resolution {
                desc: &INT,
                args,
                base: IntTypeCommon::new(common, size, bits, big_endian),
            });
        }

        let desc: &'r dyn TypeDesc = match ty.ident.as_str() {
            "const" => &CONST,
            "flags" => &FLAGS,
            "len" => &LEN,
            "bytesize" => &BYTESIZE,
            "proc" => &PROC,
            "ptr" | "ptr64" => &PTR,
            "array" => &ARRAY,
            "string" => &STRING,
            _ => &NAMED,
        };
        let leading = match ty.ident.as_str() {
            "proc" => 2,
            "const" | "flags" | "len" | "bytesize" => 1,
            other => {
                let size = match other {
                    "ptr" => self.ptr_size,
                    "ptr64" => 8,
                    _ => 0,
                };
                return Ok(Resolution {
                    desc,
                    args,
                    base: IntTypeCommon::new(common, size, 0, false),
                });
            }
        };

        // Integer-like: leading constructor args, then an optional integer base.
        if args.len() < leading {
            return Err(LowerError::bad_args(
                &ty.ident,
                format!("expected at least {} arguments, got {}", leading, args.len()),
            ));
        }
        let (args, rest) = args.split_at(leading);
        let base = match rest {
            [] if is_arg => IntTypeCommon::new(common, self.ptr_size, 0, false),
            [] => return Err(LowerError::bad_args(&ty.ident, "missing integer base type")),
            [int_ref] => self.int_base(ty, common, int_ref)?,
            _ => return Err(LowerError::bad_args(&ty.ident, "too many arguments")),
        };
        Ok(Resolution { desc, args, base })
    }
}

fn nth_arg<'t>(ty: &TypeRef, args: &'t [TypeRef], n: usize) -> LowerResult<&'t TypeRef> {
    args.get(n)
        .ok_or_else(|| LowerError::bad_args(&ty.ident, format!("missing argument {}", n + 1)))
}

fn int_arg(ty: &TypeRef, arg: &TypeRef) -> LowerResult<u64> {
    arg.value
        .ok_or_else(|| LowerError::bad_args(&ty.ident, "expected an integer literal"))
}

fn ident_arg<'t>(ty: &TypeRef, arg: &'t TypeRef) -> LowerResult<&'t str> {
    if arg.ident.is_empty() {
        return Err(LowerError::bad_args(&ty.ident, "expected an identifier"));
    }
    Ok(&arg.ident)
}

// ============================================================================
// Integer-like descriptors
// ============================================================================

struct IntDesc;
static INT: IntDesc = IntDesc;

impl TypeDesc for IntDesc {
    fn name(&self) -> &'static str {
        "int"
    }

    fn instantiate(
        &self,
        _lower: &mut Lowerer<'_>,
        ty: &TypeRef,
        args: &[TypeRef],
        base: IntTypeCommon,
    ) -> LowerResult<Type> {
        let range = match args {
            [] => None,
            [lo, hi] => Some((int_arg(ty, lo)?, int_arg(ty, hi)?)),
            _ => return Err(LowerError::bad_args(&ty.ident, "expected a [begin, end] range")),
        };
        Ok(Type::Int(IntType { int: base, range }))
    }
}

struct ConstDesc;
static CONST: ConstDesc = ConstDesc;

impl TypeDesc for ConstDesc {
    fn name(&self) -> &'static str {
        "const"
    }

    fn instantiate(
        &self,
        _lower: &mut Lowerer<'_>,
        ty: &TypeRef,
        args: &[TypeRef],
        base: IntTypeCommon,
    ) -> LowerResult<Type> {
        Ok(Type::Const(ConstType {
            int: base,
            value: int_arg(ty, nth_arg(ty, args, 0)?)?,
        }))
    }
}

struct FlagsDesc;
static FLAGS: FlagsDesc = FlagsDesc;

impl TypeDesc for FlagsDesc {
    fn name(&self) -> &'static str {
        "flags"
    }

    fn instantiate(
        &self,
        lower: &mut Lowerer<'_>,
        ty: &TypeRef,
        args: &[TypeRef],
        base: IntTypeCommon,
    ) -> LowerResult<Type> {
        let name = ident_arg(ty, nth_arg(ty, args, 0)?)?;
        let flags = lower
            .decls()
            .int_flags(name)
            .ok_or_else(|| LowerError::UnknownType {
                name: name.to_string(),
            })?;
        Ok(Type::Flags(FlagsType {
            int: base,
            values: flags.values.clone(),
        }))
    }
}

struct LenDesc {
    byte_size: Option<u64>,
}
static LEN: LenDesc = LenDesc { byte_size: None };
static BYTESIZE: LenDesc = LenDesc { byte_size: Some(1) };

impl TypeDesc for LenDesc {
    fn name(&self) -> &'static str {
        if self.byte_size.is_some() {
            "bytesize"
        } else {
            "len"
        }
    }

    fn instantiate(
        &self,
        _lower: &mut Lowerer<'_>,
        ty: &TypeRef,
        args: &[TypeRef],
        base: IntTypeCommon,
    ) -> LowerResult<Type> {
        Ok(Type::Len(LenType {
            int: base,
            buf: ident_arg(ty, nth_arg(ty, args, 0)?)?.to_string(),
            byte_size: self.byte_size,
        }))
    }
}

struct ProcDesc;
static PROC: ProcDesc = ProcDesc;

impl TypeDesc for ProcDesc {
    fn name(&self) -> &'static str {
        "proc"
    }

    fn instantiate(
        &self,
        _lower: &mut Lowerer<'_>,
        ty: &TypeRef,
        args: &[TypeRef],
        base: IntTypeCommon,
    ) -> LowerResult<Type> {
        Ok(Type::Proc(ProcType {
            int: base,
            values_start: int_arg(ty, nth_arg(ty, args, 0)?)?,
            values_per_proc: int_arg(ty, nth_arg(ty, args, 1)?)?,
        }))
    }
}

// ============================================================================
// Composite descriptors
// ============================================================================

struct PtrDesc;
static PTR: PtrDesc = PtrDesc;

impl TypeDesc for PtrDesc {
    fn name(&self) -> &'static str {
        "ptr"
    }

    fn instantiate(
        &self,
        lower: &mut Lowerer<'_>,
        ty: &TypeRef,
        args: &[TypeRef],
        base: IntTypeCommon,
    ) -> LowerResult<Type> {
        let [dir, elem] = args else {
            return Err(LowerError::bad_args(&ty.ident, "expected [direction, type]"));
        };
        let elem_dir = Dir::from_keyword(&dir.ident).ok_or_else(|| {
            LowerError::bad_args(&ty.ident, format!("bad direction {:?}", dir.ident))
        })?;
        let elem = lower.gen_type(elem, "", elem_dir, false)?;
        Ok(Type::Ptr(PtrType {
            common: base.common,
            size: base.size,
            elem: Box::new(elem),
        }))
    }
}

struct ArrayDesc;
static ARRAY: ArrayDesc = ArrayDesc;

impl TypeDesc for ArrayDesc {
    fn name(&self) -> &'static str {
        "array"
    }

    fn instantiate(
        &self,
        lower: &mut Lowerer<'_>,
        ty: &TypeRef,
        args: &[TypeRef],
        base: IntTypeCommon,
    ) -> LowerResult<Type> {
        let (elem, len) = match args {
            [elem] => (elem, None),
            [elem, len] => (elem, Some(int_arg(ty, len)?)),
            _ => return Err(LowerError::bad_args(&ty.ident, "expected [type] or [type, len]")),
        };
        let elem = lower.gen_type(elem, "", base.common.dir, false)?;
        Ok(Type::Array(ArrayType {
            common: base.common,
            elem: Box::new(elem),
            len,
        }))
    }
}

struct StringDesc;
static STRING: StringDesc = StringDesc;

impl TypeDesc for StringDesc {
    fn name(&self) -> &'static str {
        "string"
    }

    fn instantiate(
        &self,
        lower: &mut Lowerer<'_>,
        ty: &TypeRef,
        args: &[TypeRef],
        base: IntTypeCommon,
    ) -> LowerResult<Type> {
        let values = match args {
            [] => Vec::new(),
            [arg] => match &arg.string {
                Some(lit) => vec![lit.clone()],
                None => {
                    let name = ident_arg(ty, arg)?;
                    lower
                        .decls()
                        .str_flags(name)
                        .ok_or_else(|| LowerError::UnknownType {
                            name: name.to_string(),
                        })?
                        .values
                        .clone()
                }
            },
            _ => return Err(LowerError::bad_args(&ty.ident, "too many arguments")),
        };
        Ok(Type::Buffer(BufferType {
            common: base.common,
            values,
        }))
    }
}

/// Declared resources, structs and unions
struct NamedDesc;
static NAMED: NamedDesc = NamedDesc;

impl TypeDesc for NamedDesc {
    fn name(&self) -> &'static str {
        "named"
    }

    fn instantiate(
        &self,
        lower: &mut Lowerer<'_>,
        ty: &TypeRef,
        args: &[TypeRef],
        base: IntTypeCommon,
    ) -> LowerResult<Type> {
        if !args.is_empty() {
            return Err(LowerError::bad_args(&ty.ident, "unexpected arguments"));
        }
        let common = base.common;

        if let Some(res) = lower.decls().resource(&ty.ident) {
            let chain = lower.decls().resource_chain(res)?;
            let size = lower.gen_type(chain.base, "", common.dir, false)?.size();
            return Ok(Type::Resource(ResourceType {
                common,
                resource: res.name.clone(),
                size,
            }));
        }

        let decl = lower
            .decls()
            .struct_decl(&ty.ident)
            .ok_or_else(|| LowerError::UnknownType {
                name: ty.ident.clone(),
            })?;
        let key = StructKey::new(decl.name.clone(), common.dir);
        lower.note_struct_use(key.clone());
        let node = StructRefType { common, key };
        Ok(if decl.is_union {
            Type::Union(node)
        } else {
            Type::Struct(node)
        })
    }
}
