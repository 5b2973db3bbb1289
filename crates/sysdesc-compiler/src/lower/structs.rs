//! Struct field generation
//!
//! A struct is generated once per direction it is used in. Generating one
//! struct can reveal further usages, so the discovery queue is drained until
//! nothing new turns up.

use super::{mark_bitfields, Lowerer};
use crate::ast::Struct;
use crate::error::{LowerError, LowerResult};
use crate::ir::{StructFields, StructKey};
use log::{debug, trace};

impl<'a> Lowerer<'a> {
    /// Generate every discovered struct usage, sorted by name then direction
    pub(super) fn gen_struct_fields(&mut self) -> LowerResult<Vec<StructFields>> {
        let mut structs = Vec::new();
        while let Some(key) = self.struct_uses.pop() {
            let decl = self
                .decls
                .struct_decl(&key.name)
                .ok_or_else(|| LowerError::UnknownStruct {
                    name: key.name.clone(),
                })?;
            trace!("generating {} ({})", key.name, key.dir);
            structs.push(self.gen_struct_field(key, decl)?);
        }
        structs.sort_by(|a, b| a.key.cmp(&b.key));
        debug!("generated {} struct usages", structs.len());
        Ok(structs)
    }

    pub(super) fn gen_struct_field(
        &mut self,
        key: StructKey,
        decl: &Struct,
    ) -> LowerResult<StructFields> {
        let mut fields = self.gen_field_array(&decl.fields, key.dir, false)?;
        if !decl.is_union {
            mark_bitfields(&mut fields)?;
        }
        Ok(StructFields { key, fields })
    }
}
