//! Parameter schemas
//!
//! A schema is the ordered set of cells for one scope. The order is the
//! declaration order of the specs and is visible to callers through
//! [`ParamSchema::names`] and the SQL parameter list.

use crate::param::{Param, ParamSpec};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamSchema {
    params: Vec<Param>,
}

impl ParamSchema {
    pub fn from_specs(specs: &[ParamSpec]) -> Self {
        ParamSchema {
            params: specs.iter().copied().map(Param::from).collect(),
        }
    }

    /// Position of the parameter called `name` (case-insensitive)
    pub fn position(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.is_named(name))
    }

    pub fn find(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.is_named(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Param> {
        self.params.iter_mut().find(|p| p.is_named(name))
    }

    pub fn get(&self, index: usize) -> Option<&Param> {
        self.params.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Param> {
        self.params.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.params.iter()
    }

    /// Parameter names in declaration order
    pub fn names(&self) -> Vec<&'static str> {
        self.params.iter().map(Param::name).collect()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
