use smol_str::SmolStr;
use std::collections::HashMap;

use scotch_types::{Symbol, Type};

use crate::descriptor::TypeInstanceDescriptor;
use crate::entry::SymbolEntry;

/// Program-wide index of symbols compiled outside the current unit.
pub trait SymbolResolver {
    fn entry(&self, symbol: &Symbol) -> Option<&SymbolEntry>;

    /// Instances of `class` whose head matches `parameters`.
    fn type_instances(&self, class: &Symbol, parameters: &[Type]) -> Vec<&TypeInstanceDescriptor>;

    /// Every symbol the resolver knows in `module`, sorted.
    fn module_names(&self, module: &str) -> Vec<Symbol>;

    /// Instances declared by `module`.
    fn module_instances(&self, module: &str) -> Vec<&TypeInstanceDescriptor>;

    fn is_defined(&self, symbol: &Symbol) -> bool {
        self.entry(symbol).is_some()
    }
}

/// In-memory resolver.
#[derive(Debug, Clone, Default)]
pub struct ProgramIndex {
    entries: HashMap<Symbol, SymbolEntry>,
    instances: HashMap<Symbol, Vec<TypeInstanceDescriptor>>,
}

impl ProgramIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry.
    pub fn define(&mut self, entry: SymbolEntry) {
        log::debug!("index {}", entry.symbol());
        self.entries.insert(entry.symbol().clone(), entry);
    }

    pub fn define_instance(&mut self, instance: TypeInstanceDescriptor) {
        self.instances
            .entry(instance.type_class.clone())
            .or_default()
            .push(instance);
    }

    /// All instances registered for `class`, in registration order.
    pub fn instances_of(&self, class: &Symbol) -> &[TypeInstanceDescriptor] {
        self.instances.get(class).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn modules(&self) -> Vec<SmolStr> {
        let mut modules: Vec<SmolStr> = self
            .entries
            .keys()
            .filter_map(|s| s.module_name().map(SmolStr::new))
            .collect();
        modules.sort();
        modules.dedup();
        modules
    }
}

impl SymbolResolver for ProgramIndex {
    fn entry(&self, symbol: &Symbol) -> Option<&SymbolEntry> {
        self.entries.get(symbol)
    }

    fn type_instances(&self, class: &Symbol, parameters: &[Type]) -> Vec<&TypeInstanceDescriptor> {
        self.instances_of(class)
            .iter()
            .filter(|instance| instance.matches(parameters))
            .collect()
    }

    fn module_names(&self, module: &str) -> Vec<Symbol> {
        let mut names: Vec<Symbol> = self
            .entries
            .keys()
            .filter(|s| s.is_from(module))
            .cloned()
            .collect();
        names.sort();
        names
    }

    fn module_instances(&self, module: &str) -> Vec<&TypeInstanceDescriptor> {
        let mut instances: Vec<&TypeInstanceDescriptor> = self
            .instances
            .values()
            .flatten()
            .filter(|instance| instance.module == module)
            .collect();
        instances.sort_by(|a, b| a.type_class.cmp(&b.type_class));
        instances
    }
}
