use smol_str::SmolStr;

use scotch_types::{Span, Symbol, Type, unify};

use crate::error::{DiagnosticSink, ScopeError, TypeError, TypeErrorKind};
use crate::import::Import;
use crate::scope::{ScopeId, ScopeTree};

/// Walk state for the type-checking pass over one compilation unit.
///
/// Unification failures and unresolved names become diagnostics and the
/// walk continues with a placeholder type. Scope invariant violations are
/// returned as `ScopeError` and end the unit.
pub struct TypeChecker {
    scopes: ScopeTree,
    current: ScopeId,
    errors: Vec<TypeError>,
}

impl TypeChecker {
    pub fn new(scopes: ScopeTree) -> Self {
        let current = scopes.root();
        Self {
            scopes,
            current,
            errors: Vec::new(),
        }
    }

    pub fn scope(&self) -> ScopeId {
        self.current
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    pub fn scopes_mut(&mut self) -> &mut ScopeTree {
        &mut self.scopes
    }

    pub fn errors(&self) -> &[TypeError] {
        &self.errors
    }

    pub fn report(&mut self, error: TypeError) {
        self.errors.report(error);
    }

    // ── Scopes ───────────────────────────────────────────────────

    pub fn enter_module(&mut self, module: impl Into<SmolStr>, imports: Vec<Import>) -> ScopeId {
        self.current = self.scopes.enter_module(module, imports);
        self.current
    }

    pub fn enter_scope(&mut self) -> ScopeId {
        self.current = self.scopes.enter_scope(self.current);
        self.current
    }

    pub fn leave_scope(&mut self) -> ScopeId {
        self.current = self.scopes.leave_scope(self.current);
        self.current
    }

    // ── Inference helpers ────────────────────────────────────────

    pub fn generate(&self, ty: &Type) -> Type {
        self.scopes.types().generate(ty)
    }

    pub fn reserve_type(&mut self) -> Type {
        self.scopes.types_mut().reserve_type()
    }

    /// Unify, reporting failure. On failure the expected type stands in so
    /// checking can continue.
    pub fn unify_or_report(&mut self, expected: &Type, actual: &Type, span: Span) -> Type {
        match unify(expected, actual, self.scopes.types_mut()) {
            Ok(ty) => ty,
            Err(err) => {
                self.report(TypeError::new(err, span));
                self.generate(expected)
            }
        }
    }

    /// Run `f` with the free variables of `arguments` pinned monomorphic.
    /// The pins are released however `f` returns.
    pub fn enclose<T>(&mut self, arguments: &[Type], f: impl FnOnce(&mut Self) -> T) -> T {
        let mut pinned = Vec::new();
        for argument in arguments {
            pinned.extend(self.scopes.types_mut().specialize(argument));
        }
        let result = f(self);
        self.scopes.types_mut().generalize_variables(&pinned);
        result
    }

    /// `a -> b -> body` from argument types and a body type.
    pub fn function_type(&self, arguments: &[Type], body: Type) -> Type {
        arguments
            .iter()
            .rev()
            .fold(body, |result, argument| Type::fun(argument.clone(), result))
    }

    /// Type a reference to a value at one use site: the declared signature
    /// if there is one, otherwise the inferred value type, instantiated
    /// fresh. An unknown symbol is reported and gets a fresh variable.
    pub fn reference(&mut self, symbol: &Symbol, span: Span) -> Type {
        let scope = self.current;
        if let Some(signature) = self.scopes.signature(scope, symbol) {
            return signature;
        }
        match self.scopes.value(scope, symbol) {
            Some(value) => self.scopes.types_mut().generic_copy(&value),
            None => {
                self.report(TypeError::symbol_not_found(symbol.clone(), span));
                self.reserve_type()
            }
        }
    }

    /// A capture pattern binds `symbol` to whatever the function argument
    /// named `argument` holds.
    pub fn check_capture(
        &mut self,
        symbol: &Symbol,
        ty: &Type,
        argument: &str,
        span: Span,
    ) -> Result<Type, ScopeError> {
        let scope = self.current;
        let argument = Symbol::unqualified(argument);
        let checked = match self.scopes.value(scope, &argument) {
            Some(argument_ty) => {
                let generated = self.generate(ty);
                self.unify_or_report(&generated, &argument_ty, span)
            }
            None => {
                self.report(TypeError::symbol_not_found(argument, span));
                ty.clone()
            }
        };
        self.scopes.define_value(scope, symbol, checked.clone())?;
        Ok(checked)
    }

    /// Report every class requirement on `ty` that its concrete type does
    /// not implement, either in this unit or in the resolver.
    pub fn check_contexts(&mut self, ty: &Type, span: Span) {
        let missing: Vec<_> = self
            .scopes
            .types()
            .unsatisfied_contexts(ty)
            .into_iter()
            .filter(|(class, concrete)| {
                self.scopes
                    .type_instances(class, std::slice::from_ref(concrete))
                    .is_empty()
            })
            .collect();
        for (class, concrete) in missing {
            self.report(TypeError::new(
                TypeErrorKind::UnsatisfiedContext {
                    class,
                    ty: concrete,
                },
                span,
            ));
        }
    }

    /// Qualify a name from the current scope, reporting it when no
    /// definition or import resolves it. The name is kept as written then.
    pub fn qualify_or_report(&mut self, symbol: &Symbol, span: Span) -> Symbol {
        let scope = self.current;
        if self.scopes.options().report_ambiguous_imports {
            self.check_ambiguity(scope, symbol, span);
        }
        match self.scopes.qualify(scope, symbol) {
            Some(qualified) => qualified,
            None => {
                self.report(TypeError::symbol_not_found(symbol.clone(), span));
                symbol.clone()
            }
        }
    }

    fn check_ambiguity(&mut self, scope: ScopeId, symbol: &Symbol, span: Span) {
        let Symbol::Unqualified { name } = symbol else {
            return;
        };
        let shadowed = self
            .scopes
            .qualify_current(scope, symbol)
            .is_some_and(|local| self.scopes.qualify(scope, symbol) == Some(local));
        if shadowed {
            return;
        }
        let candidates = self.scopes.ambiguities(scope, name);
        if candidates.len() > 1 {
            self.report(TypeError::new(
                TypeErrorKind::AmbiguousImport {
                    name: name.clone(),
                    candidates,
                },
                span,
            ));
        }
    }

    pub fn qualify_type_or_report(&mut self, ty: &Type, span: Span) -> Type {
        self.scopes
            .qualify_type(self.current, ty, span, &mut self.errors)
    }

    /// Hand the scopes to code generation, or the diagnostics if there are
    /// any.
    pub fn finish(self) -> Result<ScopeTree, Vec<TypeError>> {
        if self.errors.is_empty() {
            Ok(self.scopes)
        } else {
            Err(self.errors)
        }
    }
}
