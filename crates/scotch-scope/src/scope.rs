use la_arena::{Arena, Idx};
use smol_str::SmolStr;
use std::collections::{BTreeSet, HashMap};

use scotch_symbol::{
    DataConstructorDescriptor, DataTypeDescriptor, MethodSignature, Operator, SymbolEntry,
    SymbolResolver, TypeClassDescriptor, TypeInstanceDescriptor,
};
use scotch_types::{Span, Symbol, Type, TypeScope, TypeVar};

use crate::deps::DependencyGraph;
use crate::error::{DiagnosticSink, ScopeError, TypeError};
use crate::import::Import;
use crate::options::CheckOptions;
use crate::pattern::PatternCase;

pub type ScopeId = Idx<ScopeFrame>;

// ── Frames ───────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ScopeFrame {
    parent: Option<ScopeId>,
    kind: FrameKind,
    entries: HashMap<Symbol, SymbolEntry>,
}

#[derive(Debug)]
enum FrameKind {
    /// Program root: hands out fresh symbols
    Root { next_symbol: u32 },
    Module(ModuleFrame),
    /// Function or lambda body inside a module
    Child { module: SmolStr },
}

#[derive(Debug)]
struct ModuleFrame {
    name: SmolStr,
    imports: Vec<Import>,
    dependencies: BTreeSet<Symbol>,
    /// Symbols in order of their first case
    pattern_order: Vec<Symbol>,
    patterns: HashMap<Symbol, Vec<PatternCase>>,
}

/// Every scope of one compilation unit: the root, one frame per module,
/// and nested function scopes. All share one `TypeScope` and resolver.
pub struct ScopeTree {
    frames: Arena<ScopeFrame>,
    root: ScopeId,
    modules: HashMap<SmolStr, ScopeId>,
    module_order: Vec<SmolStr>,
    types: TypeScope,
    resolver: Box<dyn SymbolResolver>,
    options: CheckOptions,
}

impl ScopeTree {
    pub fn new(resolver: impl SymbolResolver + 'static) -> Self {
        Self::with_options(resolver, CheckOptions::default())
    }

    pub fn with_options(resolver: impl SymbolResolver + 'static, options: CheckOptions) -> Self {
        let mut frames = Arena::new();
        let root = frames.alloc(ScopeFrame {
            parent: None,
            kind: FrameKind::Root { next_symbol: 0 },
            entries: HashMap::new(),
        });
        Self {
            frames,
            root,
            modules: HashMap::new(),
            module_order: Vec::new(),
            types: TypeScope::with_prefix(options.fresh_variable_prefix.clone()),
            resolver: Box::new(resolver),
            options,
        }
    }

    pub fn root(&self) -> ScopeId {
        self.root
    }

    pub fn options(&self) -> &CheckOptions {
        &self.options
    }

    pub fn types(&self) -> &TypeScope {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeScope {
        &mut self.types
    }

    pub fn resolver(&self) -> &dyn SymbolResolver {
        self.resolver.as_ref()
    }

    // ── Navigation ───────────────────────────────────────────────

    /// Scope for `module`, created under the root on first entry. Entering
    /// again adds any imports not already present.
    pub fn enter_module(&mut self, module: impl Into<SmolStr>, imports: Vec<Import>) -> ScopeId {
        let module = module.into();
        if let Some(&id) = self.modules.get(&module) {
            if let FrameKind::Module(frame) = &mut self.frames[id].kind {
                for import in imports {
                    if !frame.imports.contains(&import) {
                        frame.imports.push(import);
                    }
                }
            }
            log::debug!("re-enter module {}", module);
            return id;
        }

        let id = self.frames.alloc(ScopeFrame {
            parent: Some(self.root),
            kind: FrameKind::Module(ModuleFrame {
                name: module.clone(),
                imports,
                dependencies: BTreeSet::new(),
                pattern_order: Vec::new(),
                patterns: HashMap::new(),
            }),
            entries: HashMap::new(),
        });
        log::debug!("enter module {}", module);
        self.modules.insert(module.clone(), id);
        self.module_order.push(module);
        id
    }

    pub fn module(&self, name: &str) -> Option<ScopeId> {
        self.modules.get(name).copied()
    }

    /// Open a function body inside `scope`.
    pub fn enter_scope(&mut self, scope: ScopeId) -> ScopeId {
        let module = self.module_name(scope).map(SmolStr::new).unwrap_or_default();
        log::debug!("enter child scope of {}", module);
        self.frames.alloc(ScopeFrame {
            parent: Some(scope),
            kind: FrameKind::Child { module },
            entries: HashMap::new(),
        })
    }

    /// The enclosing scope. The root is its own parent.
    pub fn leave_scope(&self, scope: ScopeId) -> ScopeId {
        self.frames[scope].parent.unwrap_or(self.root)
    }

    pub fn module_name(&self, scope: ScopeId) -> Option<&str> {
        match &self.frames[scope].kind {
            FrameKind::Root { .. } => None,
            FrameKind::Module(frame) => Some(frame.name.as_str()),
            FrameKind::Child { module } => Some(module.as_str()),
        }
    }

    /// The module frame `scope` belongs to.
    fn module_scope(&self, scope: ScopeId) -> Option<ScopeId> {
        let mut current = scope;
        loop {
            match &self.frames[current].kind {
                FrameKind::Module(_) => return Some(current),
                FrameKind::Root { .. } => return None,
                FrameKind::Child { .. } => current = self.frames[current].parent?,
            }
        }
    }

    fn module_frame(&self, scope: ScopeId) -> Option<&ModuleFrame> {
        let id = self.module_scope(scope)?;
        match &self.frames[id].kind {
            FrameKind::Module(frame) => Some(frame),
            _ => None,
        }
    }

    fn module_frame_mut(&mut self, scope: ScopeId) -> Option<&mut ModuleFrame> {
        let id = self.module_scope(scope)?;
        match &mut self.frames[id].kind {
            FrameKind::Module(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn imports(&self, scope: ScopeId) -> &[Import] {
        self.module_frame(scope)
            .map(|frame| frame.imports.as_slice())
            .unwrap_or(&[])
    }

    // ── Qualification ────────────────────────────────────────────

    /// Resolve `symbol` to the module that owns it, as seen from `scope`.
    ///
    /// Definitions in the current module (and enclosing function scopes)
    /// shadow imports; among imports the first one in declaration order
    /// that resolves the name wins.
    pub fn qualify(&self, scope: ScopeId, symbol: &Symbol) -> Option<Symbol> {
        let Some(module) = self.module_name(scope) else {
            return symbol.is_qualified().then(|| symbol.clone());
        };

        let result = match symbol {
            Symbol::Qualified { module: owner, name } => {
                if owner == module {
                    Some(symbol.clone())
                } else {
                    self.imports(scope)
                        .iter()
                        .find(|import| import.is_from(owner))
                        .and_then(|import| import.qualify(name, &self.unit()))
                }
            }
            Symbol::Unqualified { name } => {
                let local = symbol.qualify_with(module);
                if self.is_defined_locally(scope, &local) {
                    Some(local)
                } else {
                    self.imports(scope)
                        .iter()
                        .find_map(|import| import.qualify(name, &self.unit()))
                }
            }
        };

        match &result {
            Some(qualified) => log::debug!("qualify {} as {} in {}", symbol, qualified, module),
            None => log::debug!("qualify {} in {}: not found", symbol, module),
        }
        result
    }

    pub fn qualify_current(&self, scope: ScopeId, symbol: &Symbol) -> Option<Symbol> {
        self.module_name(scope).map(|module| symbol.qualify_with(module))
    }

    /// Every import that could resolve the unqualified `name`, in
    /// declaration order.
    pub fn ambiguities(&self, scope: ScopeId, name: &str) -> Vec<Symbol> {
        self.imports(scope)
            .iter()
            .filter_map(|import| import.qualify(name, &self.unit()))
            .collect()
    }

    /// Qualify every type and class name inside `ty`. Names that do not
    /// resolve are reported and left as written.
    pub fn qualify_type(
        &self,
        scope: ScopeId,
        ty: &Type,
        span: Span,
        sink: &mut dyn DiagnosticSink,
    ) -> Type {
        match ty {
            Type::Variable(var) => Type::Variable(TypeVar {
                name: var.name.clone(),
                context: var
                    .context
                    .iter()
                    .map(|class| self.qualify_or_keep(scope, class, span, sink))
                    .collect(),
            }),
            Type::Function(argument, result) => Type::fun(
                self.qualify_type(scope, argument, span, sink),
                self.qualify_type(scope, result, span, sink),
            ),
            Type::Sum(symbol, parameters) => Type::Sum(
                self.qualify_or_keep(scope, symbol, span, sink),
                parameters
                    .iter()
                    .map(|p| self.qualify_type(scope, p, span, sink))
                    .collect(),
            ),
            Type::Constructor(head, argument) => Type::apply(
                self.qualify_type(scope, head, span, sink),
                self.qualify_type(scope, argument, span, sink),
            ),
        }
    }

    fn qualify_or_keep(
        &self,
        scope: ScopeId,
        symbol: &Symbol,
        span: Span,
        sink: &mut dyn DiagnosticSink,
    ) -> Symbol {
        self.qualify(scope, symbol).unwrap_or_else(|| {
            sink.report(TypeError::symbol_not_found(symbol.clone(), span));
            symbol.clone()
        })
    }

    // ── Definitions ──────────────────────────────────────────────

    fn define(&mut self, scope: ScopeId, symbol: &Symbol) -> Result<&mut SymbolEntry, ScopeError> {
        let module = self.module_name(scope).map(SmolStr::new).unwrap_or_default();
        match symbol {
            Symbol::Unqualified { .. } => Err(ScopeError::UnqualifiedDefinition(symbol.clone())),
            Symbol::Qualified { module: owner, .. } if *owner != module || module.is_empty() => {
                Err(ScopeError::DefinitionConflict {
                    symbol: symbol.clone(),
                    module,
                })
            }
            Symbol::Qualified { .. } => {
                log::debug!("define {} in {}", symbol, module);
                Ok(self.frames[scope]
                    .entries
                    .entry(symbol.clone())
                    .or_insert_with(|| SymbolEntry::new(symbol.clone())))
            }
        }
    }

    /// Record a value's type. Also fixes the JVM getter the code generator
    /// will call for it.
    pub fn define_value(&mut self, scope: ScopeId, symbol: &Symbol, ty: Type) -> Result<(), ScopeError> {
        let method = MethodSignature::value_method(symbol, &ty);
        self.define(scope, symbol)?.define_value(ty, method);
        Ok(())
    }

    pub fn define_signature(&mut self, scope: ScopeId, symbol: &Symbol, ty: Type) -> Result<(), ScopeError> {
        self.define(scope, symbol)?.define_signature(ty);
        Ok(())
    }

    pub fn define_operator(
        &mut self,
        scope: ScopeId,
        symbol: &Symbol,
        operator: Operator,
    ) -> Result<(), ScopeError> {
        Ok(self.define(scope, symbol)?.define_operator(operator)?)
    }

    pub fn define_data_type(
        &mut self,
        scope: ScopeId,
        symbol: &Symbol,
        descriptor: DataTypeDescriptor,
    ) -> Result<(), ScopeError> {
        Ok(self.define(scope, symbol)?.define_data_type(descriptor)?)
    }

    pub fn define_data_constructor(
        &mut self,
        scope: ScopeId,
        symbol: &Symbol,
        descriptor: DataConstructorDescriptor,
    ) -> Result<(), ScopeError> {
        Ok(self.define(scope, symbol)?.define_data_constructor(descriptor)?)
    }

    pub fn define_type_class(
        &mut self,
        scope: ScopeId,
        symbol: &Symbol,
        descriptor: TypeClassDescriptor,
    ) -> Result<(), ScopeError> {
        Ok(self.define(scope, symbol)?.define_type_class(descriptor)?)
    }

    pub fn define_member_of(
        &mut self,
        scope: ScopeId,
        symbol: &Symbol,
        class: Symbol,
    ) -> Result<(), ScopeError> {
        Ok(self.define(scope, symbol)?.define_member_of(class)?)
    }

    pub fn add_pattern(&mut self, scope: ScopeId, symbol: &Symbol, case: PatternCase) {
        if let Some(frame) = self.module_frame_mut(scope) {
            let cases = frame.patterns.entry(symbol.clone()).or_default();
            if cases.is_empty() {
                frame.pattern_order.push(symbol.clone());
            }
            cases.push(case);
        }
    }

    /// Record that the module's output needs `symbol`. Symbols the resolver
    /// already knows are compiled elsewhere and are not tracked.
    pub fn add_dependency(&mut self, scope: ScopeId, symbol: &Symbol) {
        if self.resolver.is_defined(symbol) {
            return;
        }
        if let Some(frame) = self.module_frame_mut(scope) {
            frame.dependencies.insert(symbol.clone());
        }
    }

    pub fn implement(&mut self, class: Symbol, ty: &Type) {
        self.types.implement(class, ty);
    }

    /// A globally fresh symbol, qualified to the module of `scope`.
    pub fn reserve_symbol(&mut self, scope: ScopeId) -> Symbol {
        self.reserve_symbol_nested(scope, &[])
    }

    /// Like [`ScopeTree::reserve_symbol`], with the names of enclosing
    /// definitions folded in: `outer#inner#3`.
    pub fn reserve_symbol_nested(&mut self, scope: ScopeId, nestings: &[&str]) -> Symbol {
        let prefix = self.options.reserved_symbol_prefix.clone();
        let n = match &mut self.frames[self.root].kind {
            FrameKind::Root { next_symbol } => {
                let n = *next_symbol;
                *next_symbol += 1;
                n
            }
            _ => 0,
        };
        let mut name = String::new();
        for nesting in nestings {
            name.push_str(nesting);
            name.push_str(&prefix);
        }
        if nestings.is_empty() {
            name.push_str(&prefix);
        }
        name.push_str(&n.to_string());

        let fresh = Symbol::unqualified(name);
        match self.module_name(scope) {
            Some(module) => fresh.qualify_with(module),
            None => fresh,
        }
    }

    // ── Lookup ───────────────────────────────────────────────────

    fn is_defined_locally(&self, scope: ScopeId, symbol: &Symbol) -> bool {
        let mut current = Some(scope);
        while let Some(id) = current {
            let frame = &self.frames[id];
            if frame.entries.contains_key(symbol) {
                return true;
            }
            if matches!(frame.kind, FrameKind::Module(_)) {
                return false;
            }
            current = frame.parent;
        }
        false
    }

    /// Entry for `symbol` from this scope outwards, then the resolver.
    /// Unqualified symbols are qualified first.
    pub fn entry(&self, scope: ScopeId, symbol: &Symbol) -> Option<&SymbolEntry> {
        let qualified;
        let symbol = if symbol.is_qualified() {
            symbol
        } else {
            qualified = self.qualify(scope, symbol)?;
            &qualified
        };

        let mut current = Some(scope);
        while let Some(id) = current {
            let frame = &self.frames[id];
            if let Some(entry) = frame.entries.get(symbol) {
                return Some(entry);
            }
            current = frame.parent;
        }
        self.unit_entry(symbol)
    }

    /// Module-level entry defined in this unit, else the resolver's.
    fn unit_entry(&self, symbol: &Symbol) -> Option<&SymbolEntry> {
        symbol
            .module_name()
            .and_then(|module| self.modules.get(module))
            .and_then(|&id| self.frames[id].entries.get(symbol))
            .or_else(|| self.resolver.entry(symbol))
    }

    fn unit(&self) -> UnitResolver<'_> {
        UnitResolver { tree: self }
    }

    pub fn is_defined(&self, scope: ScopeId, symbol: &Symbol) -> bool {
        self.entry(scope, symbol).is_some()
    }

    /// The value type exactly as recorded.
    pub fn value(&self, scope: ScopeId, symbol: &Symbol) -> Option<Type> {
        self.entry(scope, symbol)?.value().cloned()
    }

    /// The declared signature, freshly instantiated for one use site.
    pub fn signature(&mut self, scope: ScopeId, symbol: &Symbol) -> Option<Type> {
        let signature = self.entry(scope, symbol)?.signature()?.clone();
        Some(self.types.generic_copy(&signature))
    }

    /// JVM getter for a value, searching enclosing scopes.
    pub fn value_signature(&self, scope: ScopeId, symbol: &Symbol) -> Option<MethodSignature> {
        self.entry(scope, symbol)?.value_method().cloned()
    }

    pub fn operator(&self, scope: ScopeId, symbol: &Symbol) -> Option<Operator> {
        self.entry(scope, symbol)?.operator()
    }

    pub fn is_operator(&self, scope: ScopeId, symbol: &Symbol) -> bool {
        self.operator(scope, symbol).is_some()
    }

    pub fn is_data_constructor(&self, scope: ScopeId, symbol: &Symbol) -> bool {
        self.entry(scope, symbol)
            .is_some_and(SymbolEntry::is_data_constructor)
    }

    pub fn type_class(&self, scope: ScopeId, class: &Symbol) -> Option<&TypeClassDescriptor> {
        self.entry(scope, class)?.type_class()
    }

    /// The class a member value belongs to.
    pub fn member_of(&self, scope: ScopeId, symbol: &Symbol) -> Option<&TypeClassDescriptor> {
        let class = self.entry(scope, symbol)?.member_of()?;
        self.type_class(scope, class)
    }

    pub fn type_instances(&self, class: &Symbol, parameters: &[Type]) -> Vec<&TypeInstanceDescriptor> {
        self.resolver.type_instances(class, parameters)
    }

    /// Classes known to hold for `ty`: constraints recorded during
    /// inference plus instances the module's imports provide.
    pub fn context(&self, scope: ScopeId, ty: &Type) -> BTreeSet<Symbol> {
        let mut context = self.types.context(ty);
        for import in self.imports(scope) {
            context.extend(import.context_of(ty, &self.unit()));
        }
        context
    }

    pub fn dependencies(&self, scope: ScopeId) -> BTreeSet<Symbol> {
        self.module_frame(scope)
            .map(|frame| frame.dependencies.clone())
            .unwrap_or_default()
    }

    /// Pattern cases by symbol, symbols in order of first case.
    pub fn pattern_cases(&self, scope: ScopeId) -> Vec<(&Symbol, &[PatternCase])> {
        let Some(frame) = self.module_frame(scope) else {
            return Vec::new();
        };
        frame
            .pattern_order
            .iter()
            .filter_map(|symbol| {
                frame
                    .patterns
                    .get(symbol)
                    .map(|cases| (symbol, cases.as_slice()))
            })
            .collect()
    }

    /// Module-level edges from every module's recorded dependencies.
    pub fn dependency_graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::default();
        for module in &self.module_order {
            graph.add_module(module.clone());
            let Some(&id) = self.modules.get(module) else {
                continue;
            };
            for dependency in self.dependencies(id) {
                if let Some(target) = dependency.module_name() {
                    graph.add_edge(module.clone(), target);
                }
            }
        }
        graph
    }
}

/// The resolver as seen from inside the unit: module-level definitions
/// made here come first, then everything compiled elsewhere.
struct UnitResolver<'a> {
    tree: &'a ScopeTree,
}

impl SymbolResolver for UnitResolver<'_> {
    fn entry(&self, symbol: &Symbol) -> Option<&SymbolEntry> {
        self.tree.unit_entry(symbol)
    }

    fn type_instances(&self, class: &Symbol, parameters: &[Type]) -> Vec<&TypeInstanceDescriptor> {
        self.tree.resolver.type_instances(class, parameters)
    }

    fn module_names(&self, module: &str) -> Vec<Symbol> {
        let mut names = self.tree.resolver.module_names(module);
        if let Some(&id) = self.tree.modules.get(module) {
            names.extend(self.tree.frames[id].entries.keys().cloned());
        }
        names.sort();
        names.dedup();
        names
    }

    fn module_instances(&self, module: &str) -> Vec<&TypeInstanceDescriptor> {
        self.tree.resolver.module_instances(module)
    }
}
