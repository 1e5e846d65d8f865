use smol_str::SmolStr;

use scotch_types::{Span, Symbol, Type};

use crate::error::ConfigurationError;

/// One argument position of a pattern equation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternMatch {
    /// Binds the argument to a new name: `f x = ...`
    Capture {
        span: Span,
        /// Name of the function argument this position reads, once bound
        argument: Option<SmolStr>,
        symbol: Symbol,
        ty: Type,
    },
    /// Matches when the argument equals a constant: `f True = ...`
    Equal {
        span: Span,
        argument: Option<SmolStr>,
        value: Symbol,
        ty: Type,
    },
    /// `_`
    Ignore { span: Span, ty: Type },
}

impl PatternMatch {
    pub fn span(&self) -> Span {
        match self {
            PatternMatch::Capture { span, .. }
            | PatternMatch::Equal { span, .. }
            | PatternMatch::Ignore { span, .. } => *span,
        }
    }

    pub fn ty(&self) -> &Type {
        match self {
            PatternMatch::Capture { ty, .. }
            | PatternMatch::Equal { ty, .. }
            | PatternMatch::Ignore { ty, .. } => ty,
        }
    }

    pub fn argument(&self) -> Option<&str> {
        match self {
            PatternMatch::Capture { argument, .. } | PatternMatch::Equal { argument, .. } => {
                argument.as_deref()
            }
            PatternMatch::Ignore { .. } => None,
        }
    }

    pub fn with_type(mut self, new_ty: Type) -> Self {
        match &mut self {
            PatternMatch::Capture { ty, .. }
            | PatternMatch::Equal { ty, .. }
            | PatternMatch::Ignore { ty, .. } => *ty = new_ty,
        }
        self
    }

    /// Attach the argument name this position reads from.
    pub fn with_argument(mut self, name: impl Into<SmolStr>) -> Self {
        match &mut self {
            PatternMatch::Capture { argument, .. } | PatternMatch::Equal { argument, .. } => {
                *argument = Some(name.into());
            }
            PatternMatch::Ignore { .. } => {}
        }
        self
    }
}

/// One equation of a multi-equation definition. Cases accumulate per
/// symbol in source order; the first matching case wins at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternCase {
    pub span: Span,
    pub symbol: Symbol,
    pub matches: Vec<PatternMatch>,
    pub body_type: Type,
}

impl PatternCase {
    pub fn builder() -> PatternCaseBuilder {
        PatternCaseBuilder::default()
    }

    pub fn arity(&self) -> usize {
        self.matches.len()
    }

    /// Curried type of the equation: argument types then the body type.
    pub fn ty(&self) -> Type {
        self.matches
            .iter()
            .rev()
            .fold(self.body_type.clone(), |result, m| Type::fun(m.ty().clone(), result))
    }
}

#[derive(Debug, Default)]
pub struct PatternCaseBuilder {
    span: Option<Span>,
    symbol: Option<Symbol>,
    matches: Option<Vec<PatternMatch>>,
    body_type: Option<Type>,
}

impl PatternCaseBuilder {
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_symbol(mut self, symbol: Symbol) -> Self {
        self.symbol = Some(symbol);
        self
    }

    pub fn with_matches(mut self, matches: Vec<PatternMatch>) -> Self {
        self.matches = Some(matches);
        self
    }

    pub fn with_match(mut self, m: PatternMatch) -> Self {
        self.matches.get_or_insert_with(Vec::new).push(m);
        self
    }

    pub fn with_body_type(mut self, ty: Type) -> Self {
        self.body_type = Some(ty);
        self
    }

    pub fn build(self) -> Result<PatternCase, ConfigurationError> {
        let mut missing = Vec::new();
        if self.span.is_none() {
            missing.push("span");
        }
        if self.symbol.is_none() {
            missing.push("symbol");
        }
        if self.matches.is_none() {
            missing.push("matches");
        }
        if self.body_type.is_none() {
            missing.push("body type");
        }
        match (self.span, self.symbol, self.matches, self.body_type) {
            (Some(span), Some(symbol), Some(matches), Some(body_type)) => Ok(PatternCase {
                span,
                symbol,
                matches,
                body_type,
            }),
            _ => Err(ConfigurationError {
                builder: "pattern case",
                missing,
            }),
        }
    }
}
