use smol_str::SmolStr;
use std::collections::BTreeSet;

use scotch_symbol::SymbolResolver;
use scotch_types::{Symbol, Type};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportKind {
    /// `import scotch.data.maybe`
    All,
    /// `import scotch.data.maybe (Maybe, Just)`
    Names(Vec<SmolStr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub module: SmolStr,
    pub kind: ImportKind,
}

impl Import {
    pub fn all(module: impl Into<SmolStr>) -> Self {
        Self {
            module: module.into(),
            kind: ImportKind::All,
        }
    }

    pub fn names<N: Into<SmolStr>>(
        module: impl Into<SmolStr>,
        names: impl IntoIterator<Item = N>,
    ) -> Self {
        Self {
            module: module.into(),
            kind: ImportKind::Names(names.into_iter().map(Into::into).collect()),
        }
    }

    pub fn is_from(&self, module: &str) -> bool {
        self.module == module
    }

    pub fn exposes(&self, name: &str) -> bool {
        match &self.kind {
            ImportKind::All => true,
            ImportKind::Names(names) => names.iter().any(|n| n == name),
        }
    }

    /// `name` qualified to this import's module, if the module exposes it
    /// and the resolver knows it.
    pub fn qualify(&self, name: &str, resolver: &dyn SymbolResolver) -> Option<Symbol> {
        if !self.exposes(name) {
            return None;
        }
        let symbol = Symbol::qualified(self.module.clone(), name);
        resolver.is_defined(&symbol).then_some(symbol)
    }

    /// Classes for which the imported module declares an instance at `ty`.
    pub fn context_of(&self, ty: &Type, resolver: &dyn SymbolResolver) -> BTreeSet<Symbol> {
        resolver
            .module_instances(&self.module)
            .into_iter()
            .filter(|instance| instance.matches(std::slice::from_ref(ty)))
            .map(|instance| instance.type_class.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scotch_symbol::prelude;

    #[test]
    fn qualify_requires_exposure_and_definition() {
        let index = prelude::builtins();
        let all = Import::all("scotch.data.num");
        assert_eq!(
            all.qualify("+", &index),
            Some(Symbol::parse("scotch.data.num.+"))
        );
        assert_eq!(all.qualify("frobnicate", &index), None);

        let some = Import::names("scotch.data.num", ["negate"]);
        assert!(some.qualify("+", &index).is_none());
        assert!(some.qualify("negate", &index).is_some());
        assert!(some.is_from("scotch.data.num"));
    }

    #[test]
    fn context_lists_imported_instances() {
        let index = prelude::builtins();
        let context = Import::all("scotch.data.eq").context_of(&prelude::int(), &index);
        assert_eq!(context, BTreeSet::from([Symbol::parse(prelude::EQ)]));
        assert!(
            Import::all("scotch.data.eq")
                .context_of(&prelude::boolean(), &index)
                .is_empty()
        );
    }
}
