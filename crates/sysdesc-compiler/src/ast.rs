//! Declaration tree
//!
//! The parsed form of a syscall description, consumed read-only by the
//! lowering passes. Descriptions can be built in code or loaded from a
//! structured JSON/TOML document.

use crate::error::LoadError;
use serde::Deserialize;
use std::path::Path;

/// A syntax-level type reference: `int32:4`, `const[5, int8]`, `ptr[in, foo]`
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "TypeRefRepr")]
pub struct TypeRef {
    /// Type identifier (empty for pure literals)
    pub ident: String,
    /// Integer literal
    pub value: Option<u64>,
    /// String literal
    pub string: Option<String>,
    /// Bitfield width after a colon
    pub bits: Option<u64>,
    /// Bracketed type arguments
    pub args: Vec<TypeRef>,
}

/// Accepted serialized forms: `"int32"`, `5`, or a full table.
#[derive(Deserialize)]
#[serde(untagged)]
enum TypeRefRepr {
    Value(u64),
    Ident(String),
    Full {
        #[serde(default)]
        ident: String,
        #[serde(default)]
        value: Option<u64>,
        #[serde(default)]
        string: Option<String>,
        #[serde(default)]
        bits: Option<u64>,
        #[serde(default)]
        args: Vec<TypeRef>,
    },
}

impl From<TypeRefRepr> for TypeRef {
    fn from(repr: TypeRefRepr) -> Self {
        match repr {
            TypeRefRepr::Value(v) => TypeRef::int(v),
            TypeRefRepr::Ident(ident) => TypeRef::ident(ident),
            TypeRefRepr::Full {
                ident,
                value,
                string,
                bits,
                args,
            } => TypeRef {
                ident,
                value,
                string,
                bits,
                args,
            },
        }
    }
}

impl TypeRef {
    /// A bare identifier
    pub fn ident(name: impl Into<String>) -> Self {
        Self {
            ident: name.into(),
            ..Self::default()
        }
    }

    /// An integer literal
    pub fn int(value: u64) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }

    /// Attach bracketed arguments
    pub fn with_args(mut self, args: Vec<TypeRef>) -> Self {
        self.args = args;
        self
    }

    /// Attach a bitfield width
    pub fn with_bits(mut self, bits: u64) -> Self {
        self.bits = Some(bits);
        self
    }
}

/// A named, typed field of a call or struct
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// `resource name[base]: values`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Resource {
    pub name: String,
    pub base: TypeRef,
    #[serde(default)]
    pub values: Vec<u64>,
}

impl Resource {
    pub fn new(name: impl Into<String>, base: TypeRef, values: Vec<u64>) -> Self {
        Self {
            name: name.into(),
            base,
            values,
        }
    }
}

/// `name$variant(args) ret`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Call {
    /// Full name including the variant suffix
    pub name: String,
    /// Name of the underlying system call
    pub call_name: String,
    /// Syscall number, if the target has one
    #[serde(default)]
    pub nr: Option<u64>,
    #[serde(default)]
    pub args: Vec<Field>,
    #[serde(default)]
    pub ret: Option<TypeRef>,
}

impl Call {
    pub fn new(name: impl Into<String>, args: Vec<Field>) -> Self {
        let name = name.into();
        let call_name = match name.split_once('$') {
            Some((base, _)) => base.to_string(),
            None => name.clone(),
        };
        Self {
            name,
            call_name,
            nr: None,
            args,
            ret: None,
        }
    }

    pub fn with_nr(mut self, nr: u64) -> Self {
        self.nr = Some(nr);
        self
    }

    pub fn with_ret(mut self, ret: TypeRef) -> Self {
        self.ret = Some(ret);
        self
    }
}

/// A struct or union declaration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Struct {
    pub name: String,
    #[serde(default)]
    pub is_union: bool,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Struct {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            is_union: false,
            fields,
        }
    }

    pub fn union(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            is_union: true,
            ..Self::new(name, fields)
        }
    }
}

/// Named set of integer flag values
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IntFlags {
    pub name: String,
    #[serde(default)]
    pub values: Vec<u64>,
}

/// Named set of string values
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StrFlags {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// A top-level declaration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Resource(Resource),
    Call(Call),
    Struct(Struct),
    IntFlags(IntFlags),
    StrFlags(StrFlags),
}

/// A whole description: declarations in source order
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Description {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Load a description, picking the format from the file extension
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            _ => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, LoadError> {
        Ok(toml::from_str(content)?)
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Resource(r) => Some(r),
            _ => None,
        })
    }

    pub fn calls(&self) -> impl Iterator<Item = &Call> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Call(c) => Some(c),
            _ => None,
        })
    }

    pub fn structs(&self) -> impl Iterator<Item = &Struct> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Struct(s) => Some(s),
            _ => None,
        })
    }

    pub fn int_flags(&self) -> impl Iterator<Item = &IntFlags> {
        self.nodes.iter().filter_map(|n| match n {
            Node::IntFlags(f) => Some(f),
            _ => None,
        })
    }

    pub fn str_flags(&self) -> impl Iterator<Item = &StrFlags> {
        self.nodes.iter().filter_map(|n| match n {
            Node::StrFlags(f) => Some(f),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_name_from_variant() {
        let call = Call::new("open$dir", vec![]);
        assert_eq!(call.call_name, "open");
        let call = Call::new("close", vec![]);
        assert_eq!(call.call_name, "close");
    }

    #[test]
    fn test_parse_json_shorthand() {
        let json = r#"{
            "nodes": [
                { "kind": "resource", "name": "fd", "base": "int32", "values": [4294967295] },
                { "kind": "call", "name": "close", "call_name": "close", "nr": 3,
                  "args": [ { "name": "fd", "type": "fd" } ] },
                { "kind": "struct", "name": "s", "fields": [
                    { "name": "a", "type": { "ident": "int32", "bits": 3 } },
                    { "name": "b", "type": { "ident": "const", "args": [7, "int8"] } }
                ] }
            ]
        }"#;
        let desc = Description::from_json_str(json).unwrap();
        assert_eq!(desc.nodes.len(), 3);

        let fd = desc.resources().next().unwrap();
        assert_eq!(fd.base, TypeRef::ident("int32"));
        assert_eq!(fd.values, vec![0xffff_ffff]);

        let close = desc.calls().next().unwrap();
        assert_eq!(close.nr, Some(3));
        assert!(close.ret.is_none());

        let s = desc.structs().next().unwrap();
        assert!(!s.is_union);
        assert_eq!(s.fields[0].ty, TypeRef::ident("int32").with_bits(3));
        assert_eq!(
            s.fields[1].ty,
            TypeRef::ident("const").with_args(vec![TypeRef::int(7), TypeRef::ident("int8")])
        );
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            [[nodes]]
            kind = "int_flags"
            name = "open_flags"
            values = [0, 1, 2]

            [[nodes]]
            kind = "call"
            name = "open"
            call_name = "open"
            ret = "fd"
            args = [
                { name = "file", type = { ident = "ptr", args = ["in", "string"] } },
                { name = "flags", type = { ident = "flags", args = ["open_flags"] } },
            ]
        "#;
        let desc = Description::from_toml_str(toml).unwrap();
        let flags = desc.int_flags().next().unwrap();
        assert_eq!(flags.values, vec![0, 1, 2]);

        let open = desc.calls().next().unwrap();
        assert_eq!(open.ret, Some(TypeRef::ident("fd")));
        assert_eq!(open.args.len(), 2);
        assert_eq!(open.args[0].ty.args[0], TypeRef::ident("in"));
    }

    #[test]
    fn test_unsupported_extension() {
        let path = std::env::temp_dir().join("sysdesc-unsupported.txt");
        std::fs::write(&path, "").unwrap();
        let err = Description::from_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(_)));
        let _ = std::fs::remove_file(&path);
    }
}
