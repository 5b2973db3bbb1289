//! Sysdesc Compiler - Description to IR Lowering
//!
//! This crate lowers a parsed syscall description (resources, calls,
//! structs, unions and flag sets) into a resolved IR:
//!
//! - resource inheritance chains are flattened,
//! - every struct is generated once per direction it is used in,
//! - bitfield offsets and group boundaries are computed,
//! - every output collection is sorted, independent of declaration order.
//!
//! # Example
//!
//! ```rust,ignore
//! use sysdesc_compiler::{compile, Description, TargetConfig};
//!
//! let desc = Description::from_file(Path::new("linux.json"))?;
//! let prog = compile(&desc, &TargetConfig::default())?;
//! for call in &prog.syscalls {
//!     println!("{} ({} args)", call.name, call.args.len());
//! }
//! ```

pub mod ast;
pub mod config;
pub mod decls;
pub mod error;
pub mod ir;
pub mod lower;
pub mod registry;

pub use ast::{Description, Node, TypeRef};
pub use config::{ConfigError, TargetConfig};
pub use error::{LoadError, LowerError, LowerResult};
pub use ir::{Dir, Prog, ResourceDesc, StructFields, StructKey, Syscall, Type};
pub use lower::{compile, compile_with, Lowerer};
pub use registry::{BuiltinRegistry, Resolution, TypeDesc, TypeRegistry};
