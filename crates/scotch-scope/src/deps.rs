use smol_str::SmolStr;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::error::ScopeError;

/// Module → modules it depends on, for ordering builds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    /// Module A uses symbols of B: A → {B, ...}
    pub deps: BTreeMap<SmolStr, BTreeSet<SmolStr>>,
    /// Reverse: B is used by {A, ...}
    pub dependents: BTreeMap<SmolStr, BTreeSet<SmolStr>>,
}

impl DependencyGraph {
    pub fn add_module(&mut self, module: impl Into<SmolStr>) {
        self.deps.entry(module.into()).or_default();
    }

    pub fn add_edge(&mut self, from: impl Into<SmolStr>, to: impl Into<SmolStr>) {
        let from = from.into();
        let to = to.into();
        if from == to {
            return;
        }
        self.deps.entry(to.clone()).or_default();
        self.dependents
            .entry(to.clone())
            .or_default()
            .insert(from.clone());
        self.deps.entry(from).or_default().insert(to);
    }

    /// Modules with every dependency ahead of its dependents.
    pub fn topological_order(&self) -> Result<Vec<SmolStr>, ScopeError> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut in_stack = HashSet::new();

        for module in self.deps.keys() {
            if !visited.contains(module) {
                self.topo_dfs(module, &mut visited, &mut in_stack, &mut result)?;
            }
        }

        Ok(result)
    }

    fn topo_dfs(
        &self,
        module: &SmolStr,
        visited: &mut HashSet<SmolStr>,
        in_stack: &mut HashSet<SmolStr>,
        result: &mut Vec<SmolStr>,
    ) -> Result<(), ScopeError> {
        if in_stack.contains(module) {
            return Err(ScopeError::DependencyCycle(module.clone()));
        }
        if visited.contains(module) {
            return Ok(());
        }

        in_stack.insert(module.clone());

        if let Some(deps) = self.deps.get(module) {
            for dep in deps {
                self.topo_dfs(dep, visited, in_stack, result)?;
            }
        }

        in_stack.remove(module);
        visited.insert(module.clone());
        result.push(module.clone());

        Ok(())
    }
}
