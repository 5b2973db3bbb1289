//! Declaration index
//!
//! Name lookup over a [`Description`], built once per lowering run.
//! Resource bases are resolved up front into an explicit parent graph.

use crate::ast::{Description, IntFlags, Resource, StrFlags, Struct, TypeRef};
use crate::error::{LowerError, LowerResult};
use rustc_hash::FxHashMap;

/// What a resource's base type refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceParent {
    /// Another resource, by index
    Resource(usize),
    /// A non-resource type: the end of the chain
    Base,
}

/// A resource's inheritance chain
#[derive(Debug, Clone)]
pub struct ResourceChain<'a> {
    /// Chain members, leaf first
    pub nodes: Vec<&'a Resource>,
    /// Non-resource base type the chain bottoms out at
    pub base: &'a TypeRef,
}

/// Declarations of one description, indexed by name
pub struct DeclIndex<'a> {
    resources: Vec<&'a Resource>,
    resource_ids: FxHashMap<&'a str, usize>,
    parents: Vec<ResourceParent>,
    structs: FxHashMap<&'a str, &'a Struct>,
    int_flags: FxHashMap<&'a str, &'a IntFlags>,
    str_flags: FxHashMap<&'a str, &'a StrFlags>,
}

impl<'a> DeclIndex<'a> {
    pub fn new(desc: &'a Description) -> Self {
        let resources: Vec<&'a Resource> = desc.resources().collect();
        let mut resource_ids = FxHashMap::default();
        for (id, res) in resources.iter().enumerate() {
            resource_ids.entry(res.name.as_str()).or_insert(id);
        }
        let parents = resources
            .iter()
            .map(|res| parent_in(&resource_ids, res))
            .collect();

        let mut structs = FxHashMap::default();
        for s in desc.structs() {
            structs.entry(s.name.as_str()).or_insert(s);
        }
        let mut int_flags = FxHashMap::default();
        for f in desc.int_flags() {
            int_flags.entry(f.name.as_str()).or_insert(f);
        }
        let mut str_flags = FxHashMap::default();
        for f in desc.str_flags() {
            str_flags.entry(f.name.as_str()).or_insert(f);
        }

        Self {
            resources,
            resource_ids,
            parents,
            structs,
            int_flags,
            str_flags,
        }
    }

    pub fn resource(&self, name: &str) -> Option<&'a Resource> {
        self.resource_ids.get(name).map(|&id| self.resources[id])
    }

    pub fn is_resource(&self, name: &str) -> bool {
        self.resource_ids.contains_key(name)
    }

    /// Walk from `leaf` up to the first non-resource base
    pub fn resource_chain(&self, leaf: &'a Resource) -> LowerResult<ResourceChain<'a>> {
        let mut nodes = vec![leaf];
        let mut top = leaf;
        let mut parent = parent_in(&self.resource_ids, leaf);
        while let ResourceParent::Resource(id) = parent {
            if nodes.len() > self.resources.len() {
                return Err(LowerError::ResourceCycle {
                    name: leaf.name.clone(),
                });
            }
            top = self.resources[id];
            nodes.push(top);
            parent = self.parents[id];
        }
        Ok(ResourceChain {
            nodes,
            base: &top.base,
        })
    }

    pub fn struct_decl(&self, name: &str) -> Option<&'a Struct> {
        self.structs.get(name).copied()
    }

    pub fn int_flags(&self, name: &str) -> Option<&'a IntFlags> {
        self.int_flags.get(name).copied()
    }

    pub fn str_flags(&self, name: &str) -> Option<&'a StrFlags> {
        self.str_flags.get(name).copied()
    }
}

fn parent_in(ids: &FxHashMap<&str, usize>, res: &Resource) -> ResourceParent {
    match ids.get(res.base.ident.as_str()) {
        Some(&id) => ResourceParent::Resource(id),
        None => ResourceParent::Base,
    }
}
