//! Resource lowering
//!
//! Flattens each resource's inheritance chain into ancestor names and a
//! special-value pool, and lowers the chain's underlying integer type.

use super::Lowerer;
use crate::ast::Resource;
use crate::error::LowerResult;
use crate::ir::{Dir, ResourceDesc};
use log::debug;

impl<'a> Lowerer<'a> {
    /// Lower every resource, sorted by name
    pub(super) fn gen_resources(&mut self) -> LowerResult<Vec<ResourceDesc>> {
        let desc = self.desc;
        let mut resources = desc
            .resources()
            .map(|res| self.gen_resource(res))
            .collect::<LowerResult<Vec<_>>>()?;
        resources.sort_by(|a, b| a.name.cmp(&b.name));
        debug!("generated {} resources", resources.len());
        Ok(resources)
    }

    pub(super) fn gen_resource(&mut self, res: &'a Resource) -> LowerResult<ResourceDesc> {
        let chain = self.decls.resource_chain(res)?;

        // The chain is leaf first; both outputs are root first.
        let kind = chain.nodes.iter().rev().map(|r| r.name.clone()).collect();
        let mut values: Vec<u64> = chain
            .nodes
            .iter()
            .rev()
            .flat_map(|r| r.values.iter().copied())
            .collect();
        if values.is_empty() {
            values.push(0);
        }

        let ty = self.gen_type(chain.base, "", Dir::In, false)?;
        Ok(ResourceDesc {
            name: res.name.clone(),
            kind,
            values,
            ty,
        })
    }
}
