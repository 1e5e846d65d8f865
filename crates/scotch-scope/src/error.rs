use smol_str::SmolStr;
use std::fmt;

use scotch_symbol::EntryConflict;
use scotch_types::{Span, Symbol, Type, TypeVar, UnifyError};

// ── User diagnostics ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeErrorKind {
    #[error("type mismatch: expected {expected}, got {actual}")]
    StructuralMismatch { expected: Type, actual: Type },

    #[error("infinite type: {variable} occurs in {ty}")]
    CircularType { variable: TypeVar, ty: Type },

    #[error("no instance of `{class}` for {ty}")]
    UnsatisfiedContext { class: Symbol, ty: Type },

    #[error("symbol `{symbol}` not found")]
    SymbolNotFound { symbol: Symbol },

    #[error("ambiguous reference `{name}`: imported as {}", join(.candidates))]
    AmbiguousImport { name: SmolStr, candidates: Vec<Symbol> },
}

fn join(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(|s| format!("`{}`", s))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<UnifyError> for TypeErrorKind {
    fn from(err: UnifyError) -> Self {
        match err {
            UnifyError::Mismatch { expected, actual } => {
                TypeErrorKind::StructuralMismatch { expected, actual }
            }
            UnifyError::Circular { variable, ty } => TypeErrorKind::CircularType { variable, ty },
        }
    }
}

/// A diagnostic reported against the user's program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub span: Span,
}

impl TypeError {
    pub fn new(kind: impl Into<TypeErrorKind>, span: Span) -> Self {
        Self {
            kind: kind.into(),
            span,
        }
    }

    pub fn symbol_not_found(symbol: Symbol, span: Span) -> Self {
        Self::new(TypeErrorKind::SymbolNotFound { symbol }, span)
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.span, self.kind)
    }
}

impl std::error::Error for TypeError {}

/// Where the checker sends diagnostics. Reporting never stops the walk.
pub trait DiagnosticSink {
    fn report(&mut self, error: TypeError);
}

impl DiagnosticSink for Vec<TypeError> {
    fn report(&mut self, error: TypeError) {
        log::debug!("diagnostic {}", error);
        self.push(error);
    }
}

// ── Compiler invariant violations ────────────────────────────────

/// Fatal: an earlier pass handed the scope something it must never see.
/// Processing of the compilation unit stops.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("can't define symbol `{symbol}` within different module `{module}`")]
    DefinitionConflict { symbol: Symbol, module: SmolStr },

    #[error("conflicting definition: {0}")]
    DescriptorConflict(#[from] EntryConflict),

    #[error("can't define unqualified symbol `{0}`")]
    UnqualifiedDefinition(Symbol),

    #[error("dependency cycle detected: {0}")]
    DependencyCycle(SmolStr),
}

impl ScopeError {
    /// Both ways a definition can clash with what the scope already owns.
    pub fn is_definition_conflict(&self) -> bool {
        matches!(
            self,
            ScopeError::DefinitionConflict { .. } | ScopeError::DescriptorConflict(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{builder} is missing required fields: {}", .missing.join(", "))]
pub struct ConfigurationError {
    pub builder: &'static str,
    pub missing: Vec<&'static str>,
}
