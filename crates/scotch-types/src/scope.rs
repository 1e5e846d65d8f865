use smol_str::SmolStr;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::UnifyError;
use crate::symbol::Symbol;
use crate::types::{Type, TypeVar};
use crate::unify::zip;

/// Binding store for one compilation unit.
///
/// Type terms are immutable; everything inference learns about a
/// variable is recorded here and read back through [`TypeScope::generate`].
#[derive(Debug, Clone)]
pub struct TypeScope {
    /// Variable name → the term it was bound to (possibly another variable)
    bindings: HashMap<SmolStr, Type>,
    /// Pin counts for variables that must stay monomorphic in the current
    /// lexical region. A variable is generic while its count is zero.
    specialized: HashMap<SmolStr, usize>,
    /// Type classes required of each variable beyond its own context list
    contexts: HashMap<SmolStr, BTreeSet<Symbol>>,
    /// Class → instance heads known to implement it
    implemented: HashMap<Symbol, Vec<Type>>,
    next_var: u32,
    prefix: SmolStr,
}

impl Default for TypeScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeScope {
    pub fn new() -> Self {
        Self::with_prefix("t")
    }

    /// Fresh variables are named `{prefix}{n}` and share one namespace with
    /// variables written in source. The front end must keep source names
    /// out of that form, or pick a prefix its lexer cannot produce.
    pub fn with_prefix(prefix: impl Into<SmolStr>) -> Self {
        Self {
            bindings: HashMap::new(),
            specialized: HashMap::new(),
            contexts: HashMap::new(),
            implemented: HashMap::new(),
            next_var: 0,
            prefix: prefix.into(),
        }
    }

    // ── Fresh type variables ─────────────────────────────────────

    pub fn reserve_type(&mut self) -> Type {
        self.reserve_type_with_context(BTreeSet::new())
    }

    pub fn reserve_type_with_context(&mut self, context: BTreeSet<Symbol>) -> Type {
        let name = SmolStr::new(format!("{}{}", self.prefix, self.next_var));
        self.next_var += 1;
        Type::Variable(TypeVar { name, context })
    }

    // ── Bindings ─────────────────────────────────────────────────

    pub fn is_bound(&self, var: &TypeVar) -> bool {
        self.bindings.contains_key(&var.name)
    }

    /// One step of binding lookup: the bound term for a variable, or the
    /// type itself.
    pub fn target(&self, ty: &Type) -> Type {
        match ty {
            Type::Variable(var) => self
                .bindings
                .get(&var.name)
                .cloned()
                .unwrap_or_else(|| ty.clone()),
            _ => ty.clone(),
        }
    }

    /// Record `var := target`.
    ///
    /// Callers occurs-check before binding; this repeats the check so a
    /// cycle can never be written into the store.
    pub fn bind(&mut self, var: &TypeVar, target: &Type) -> Result<(), UnifyError> {
        if let Type::Variable(other) = target {
            if other.name == var.name {
                return Ok(());
            }
        }
        if target.contains(var) || self.generate(target).contains(var) {
            return Err(UnifyError::circular(var, target));
        }

        let mut required = var.context.clone();
        if let Some(extra) = self.contexts.get(&var.name) {
            required.extend(extra.iter().cloned());
        }
        if !required.is_empty() {
            self.contexts
                .entry(var.name.clone())
                .or_default()
                .extend(required.iter().cloned());
            if let Type::Variable(other) = target {
                self.contexts
                    .entry(other.name.clone())
                    .or_default()
                    .extend(required);
            }
        }

        log::trace!("bind {} := {}", var.name, target);
        self.bindings.insert(var.name.clone(), target.clone());
        Ok(())
    }

    /// Replace every bound variable in `ty` by what it is bound to, following
    /// chains, and flatten the result. Unbound variables come back carrying
    /// the contexts recorded for them.
    pub fn generate(&self, ty: &Type) -> Type {
        let mut visiting = HashSet::new();
        self.generate_inner(ty, &mut visiting)
    }

    fn generate_inner(&self, ty: &Type, visiting: &mut HashSet<SmolStr>) -> Type {
        match ty {
            Type::Variable(var) => match self.bindings.get(&var.name) {
                Some(target) => {
                    if !visiting.insert(var.name.clone()) {
                        log::warn!("binding cycle through type variable {}", var.name);
                        return Type::Variable(self.with_recorded_context(var));
                    }
                    let resolved = self.generate_inner(target, visiting);
                    visiting.remove(&var.name);
                    resolved
                }
                None => Type::Variable(self.with_recorded_context(var)),
            },
            Type::Function(argument, result) => Type::fun(
                self.generate_inner(argument, visiting),
                self.generate_inner(result, visiting),
            ),
            Type::Sum(symbol, parameters) => Type::Sum(
                symbol.clone(),
                parameters
                    .iter()
                    .map(|p| self.generate_inner(p, visiting))
                    .collect(),
            ),
            Type::Constructor(head, argument) => {
                let argument = self.generate_inner(argument, visiting);
                match self.generate_inner(head, visiting) {
                    Type::Sum(symbol, mut parameters) => {
                        parameters.push(argument);
                        Type::Sum(symbol, parameters)
                    }
                    head => Type::apply(head, argument),
                }
            }
        }
    }

    fn with_recorded_context(&self, var: &TypeVar) -> TypeVar {
        match self.contexts.get(&var.name) {
            Some(extra) => var.extended(extra.iter().cloned()),
            None => var.clone(),
        }
    }

    /// Instantiate a polymorphic term for one use site: every generic free
    /// variable becomes a fresh one. Repeated occurrences of a variable map
    /// to the same fresh variable within this call only.
    pub fn generic_copy(&mut self, ty: &Type) -> Type {
        let generated = self.generate(ty);
        let monomorphic = self.monomorphic();
        let mut mappings: HashMap<SmolStr, Type> = HashMap::new();
        self.copy_inner(&generated, &monomorphic, &mut mappings)
    }

    fn copy_inner(
        &mut self,
        ty: &Type,
        monomorphic: &HashSet<SmolStr>,
        mappings: &mut HashMap<SmolStr, Type>,
    ) -> Type {
        match ty {
            Type::Variable(var) => {
                if monomorphic.contains(&var.name) {
                    return ty.clone();
                }
                if let Some(fresh) = mappings.get(&var.name) {
                    return fresh.clone();
                }
                let fresh = self.reserve_type_with_context(var.context.clone());
                mappings.insert(var.name.clone(), fresh.clone());
                fresh
            }
            Type::Function(argument, result) => {
                let argument = self.copy_inner(argument, monomorphic, mappings);
                let result = self.copy_inner(result, monomorphic, mappings);
                Type::fun(argument, result)
            }
            Type::Sum(symbol, parameters) => {
                let parameters = parameters
                    .iter()
                    .map(|p| self.copy_inner(p, monomorphic, mappings))
                    .collect();
                Type::Sum(symbol.clone(), parameters)
            }
            Type::Constructor(head, argument) => {
                let head = self.copy_inner(head, monomorphic, mappings);
                let argument = self.copy_inner(argument, monomorphic, mappings);
                Type::apply(head, argument)
            }
        }
    }

    // ── Specialization ───────────────────────────────────────────

    /// Pin the free variables of `ty` as monomorphic. Returns the pinned
    /// names; hand them back to [`TypeScope::generalize_variables`] when the
    /// region ends.
    pub fn specialize(&mut self, ty: &Type) -> Vec<SmolStr> {
        let names = self.region_variables(ty);
        for name in &names {
            *self.specialized.entry(name.clone()).or_insert(0) += 1;
        }
        names
    }

    /// Undo [`TypeScope::specialize`] for the same type. Bindings made since
    /// may change which variables `ty` reaches; prefer
    /// [`TypeScope::generalize_variables`] with the names `specialize`
    /// returned.
    pub fn generalize(&mut self, ty: &Type) {
        let names = self.region_variables(ty);
        self.generalize_variables(&names);
    }

    pub fn generalize_variables(&mut self, names: &[SmolStr]) {
        for name in names {
            if let Some(count) = self.specialized.get_mut(name) {
                *count -= 1;
                if *count == 0 {
                    self.specialized.remove(name);
                }
            }
        }
    }

    fn region_variables(&self, ty: &Type) -> Vec<SmolStr> {
        let mut names: Vec<SmolStr> = ty.free_variables().into_iter().map(|v| v.name).collect();
        for var in self.generate(ty).free_variables() {
            if !names.contains(&var.name) {
                names.push(var.name);
            }
        }
        names
    }

    /// A variable is generic unless it is pinned or a pinned variable's
    /// binding reaches it.
    pub fn is_generic(&self, var: &TypeVar) -> bool {
        !self.monomorphic().contains(&var.name)
    }

    /// Pinned names plus every variable their bindings currently resolve to.
    fn monomorphic(&self) -> HashSet<SmolStr> {
        let mut names = HashSet::new();
        for name in self.specialized.keys() {
            names.insert(name.clone());
            for var in self.generate(&Type::var(name.clone())).free_variables() {
                names.insert(var.name);
            }
        }
        names
    }

    // ── Contexts and instances ───────────────────────────────────

    pub fn extend_context(&mut self, ty: &Type, classes: impl IntoIterator<Item = Symbol>) {
        let classes: Vec<Symbol> = classes.into_iter().collect();
        for var in self.generate(ty).free_variables() {
            self.contexts
                .entry(var.name)
                .or_default()
                .extend(classes.iter().cloned());
        }
    }

    /// Every class required of the free variables `ty` resolves to.
    pub fn context(&self, ty: &Type) -> BTreeSet<Symbol> {
        self.generate(ty)
            .free_variables()
            .into_iter()
            .flat_map(|var| var.context)
            .collect()
    }

    pub fn implement(&mut self, class: Symbol, instance: &Type) {
        self.implemented
            .entry(class)
            .or_default()
            .push(instance.simplify());
    }

    /// Does the concrete type `ty` have an instance of `class`?
    ///
    /// An instance registered for a bare constructor (`Functor Maybe`)
    /// covers every application of it.
    pub fn is_implemented(&self, class: &Symbol, ty: &Type) -> bool {
        let ty = self.generate(ty);
        let Some(instances) = self.implemented.get(class) else {
            return false;
        };
        instances.iter().any(|instance| match (instance, &ty) {
            (Type::Sum(head, parameters), Type::Sum(symbol, _)) if parameters.is_empty() => {
                head == symbol
            }
            _ => zip(instance, &ty, self).is_some(),
        })
    }

    /// Class requirements on variables reachable from `ty` that are bound
    /// to a sum type lacking the instance. Each (class, type) entry appears
    /// once however many variables of a chain carry the requirement.
    pub fn unsatisfied_contexts(&self, ty: &Type) -> Vec<(Symbol, Type)> {
        let mut seen = HashSet::new();
        let mut missing = Vec::new();
        self.collect_unsatisfied(ty, &mut seen, &mut missing);
        missing
    }

    fn collect_unsatisfied(
        &self,
        ty: &Type,
        seen: &mut HashSet<SmolStr>,
        missing: &mut Vec<(Symbol, Type)>,
    ) {
        match ty {
            Type::Variable(var) => {
                if !seen.insert(var.name.clone()) {
                    return;
                }
                let Some(target) = self.bindings.get(&var.name) else {
                    return;
                };
                let required = self.with_recorded_context(var).context;
                let resolved = self.generate(target);
                if matches!(resolved, Type::Sum(_, _)) {
                    for class in required {
                        let unsatisfied = !self.is_implemented(&class, &resolved);
                        if unsatisfied && !missing.contains(&(class.clone(), resolved.clone())) {
                            missing.push((class, resolved.clone()));
                        }
                    }
                }
                self.collect_unsatisfied(target, seen, missing);
            }
            Type::Function(argument, result) => {
                self.collect_unsatisfied(argument, seen, missing);
                self.collect_unsatisfied(result, seen, missing);
            }
            Type::Sum(_, parameters) => {
                for parameter in parameters {
                    self.collect_unsatisfied(parameter, seen, missing);
                }
            }
            Type::Constructor(head, argument) => {
                self.collect_unsatisfied(head, seen, missing);
                self.collect_unsatisfied(argument, seen, missing);
            }
        }
    }
}
