use smol_str::SmolStr;
use std::collections::BTreeSet;
use std::fmt;

use crate::error::InvalidSumName;
use crate::symbol::Symbol;

// ── Types ────────────────────────────────────────────────────────

/// A type variable: its name is its identity, the context lists the type
/// classes any type substituted for it must implement.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVar {
    pub name: SmolStr,
    pub context: BTreeSet<Symbol>,
}

impl TypeVar {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            context: BTreeSet::new(),
        }
    }

    pub fn with_context(
        name: impl Into<SmolStr>,
        context: impl IntoIterator<Item = Symbol>,
    ) -> Self {
        Self {
            name: name.into(),
            context: context.into_iter().collect(),
        }
    }

    pub fn without_context(&self) -> TypeVar {
        TypeVar::new(self.name.clone())
    }

    pub fn extended(&self, context: impl IntoIterator<Item = Symbol>) -> TypeVar {
        let mut var = self.clone();
        var.context.extend(context);
        var
    }
}

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// Type variable. What it currently stands for lives in `TypeScope`.
    Variable(TypeVar),
    /// Function type: `Function(a, b)` = `a -> b`
    Function(Box<Type>, Box<Type>),
    /// Named type with applied type args: `Sum(Maybe, [Int])` = `Maybe Int`
    Sum(Symbol, Vec<Type>),
    /// Type-level application of a not yet saturated constructor:
    /// `Constructor(f, a)` = `f a`. Once `f` is known to be a sum type the
    /// cell flattens into that sum with `a` appended to its parameters.
    Constructor(Box<Type>, Box<Type>),
}

/// Runtime class a value of some type is represented by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuntimeType {
    Callable,
    Applicable,
}

impl RuntimeType {
    pub fn class_name(self) -> &'static str {
        match self {
            RuntimeType::Callable => "scotch/runtime/Callable",
            RuntimeType::Applicable => "scotch/runtime/Applicable",
        }
    }
}

impl Type {
    pub fn var(name: impl Into<SmolStr>) -> Type {
        Type::Variable(TypeVar::new(name))
    }

    pub fn var_with_context(
        name: impl Into<SmolStr>,
        context: impl IntoIterator<Item = Symbol>,
    ) -> Type {
        Type::Variable(TypeVar::with_context(name, context))
    }

    pub fn fun(argument: Type, result: Type) -> Type {
        Type::Function(Box::new(argument), Box::new(result))
    }

    /// Build a sum type.
    ///
    /// # Panics
    ///
    /// Panics if the simple name does not start with an upper-case letter.
    /// Names coming from source text go through [`Type::try_sum`].
    pub fn sum(symbol: impl Into<Symbol>, parameters: Vec<Type>) -> Type {
        match Type::try_sum(symbol.into(), parameters) {
            Ok(ty) => ty,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_sum(symbol: Symbol, parameters: Vec<Type>) -> Result<Type, InvalidSumName> {
        let upper = symbol
            .simple_name()
            .chars()
            .next()
            .is_some_and(char::is_uppercase);
        if upper {
            Ok(Type::Sum(symbol, parameters))
        } else {
            Err(InvalidSumName(symbol.simple_name().to_string()))
        }
    }

    pub fn apply(head: Type, argument: Type) -> Type {
        Type::Constructor(Box::new(head), Box::new(argument))
    }

    pub fn as_variable(&self) -> Option<&TypeVar> {
        match self {
            Type::Variable(var) => Some(var),
            _ => None,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Type::Variable(_))
    }

    /// Collapse constructor cells whose head is a sum type into that sum.
    pub fn flatten(&self) -> Type {
        match self {
            Type::Variable(_) => self.clone(),
            Type::Function(argument, result) => Type::fun(argument.flatten(), result.flatten()),
            Type::Sum(symbol, parameters) => {
                Type::Sum(symbol.clone(), parameters.iter().map(Type::flatten).collect())
            }
            Type::Constructor(head, argument) => match head.flatten() {
                Type::Sum(symbol, mut parameters) => {
                    parameters.push(argument.flatten());
                    Type::Sum(symbol, parameters)
                }
                head => Type::apply(head, argument.flatten()),
            },
        }
    }

    /// Flatten and drop variable contexts, leaving only identities. Used
    /// wherever two terms are compared for "the same variable".
    pub fn simplify(&self) -> Type {
        match self.flatten() {
            Type::Variable(var) => Type::Variable(var.without_context()),
            Type::Function(argument, result) => Type::fun(argument.simplify(), result.simplify()),
            Type::Sum(symbol, parameters) => {
                Type::Sum(symbol, parameters.iter().map(Type::simplify).collect())
            }
            Type::Constructor(head, argument) => Type::apply(head.simplify(), argument.simplify()),
        }
    }

    /// Occurs check.
    pub fn contains(&self, var: &TypeVar) -> bool {
        match self {
            Type::Variable(v) => v.name == var.name,
            Type::Function(argument, result) => argument.contains(var) || result.contains(var),
            Type::Sum(_, parameters) => parameters.iter().any(|p| p.contains(var)),
            Type::Constructor(head, argument) => head.contains(var) || argument.contains(var),
        }
    }

    /// Free variables in first-occurrence order, one entry per name.
    pub fn free_variables(&self) -> Vec<TypeVar> {
        let mut vars: Vec<TypeVar> = Vec::new();
        self.collect_variables(&mut vars);
        vars
    }

    fn collect_variables(&self, vars: &mut Vec<TypeVar>) {
        match self {
            Type::Variable(var) => {
                if !vars.iter().any(|v| v.name == var.name) {
                    vars.push(var.clone());
                }
            }
            Type::Function(argument, result) => {
                argument.collect_variables(vars);
                result.collect_variables(vars);
            }
            Type::Sum(_, parameters) => {
                for parameter in parameters {
                    parameter.collect_variables(vars);
                }
            }
            Type::Constructor(head, argument) => {
                head.collect_variables(vars);
                argument.collect_variables(vars);
            }
        }
    }

    /// Type classes this node requires.
    pub fn context(&self) -> BTreeSet<Symbol> {
        match self {
            Type::Variable(var) => var.context.clone(),
            _ => BTreeSet::new(),
        }
    }

    /// Every (variable, class) requirement in the term.
    pub fn contexts(&self) -> Vec<(SmolStr, Symbol)> {
        self.free_variables()
            .into_iter()
            .flat_map(|var| {
                var.context
                    .into_iter()
                    .map(move |class| (var.name.clone(), class))
            })
            .collect()
    }

    pub fn runtime_type(&self) -> RuntimeType {
        match self {
            Type::Function(_, _) => RuntimeType::Applicable,
            _ => RuntimeType::Callable,
        }
    }

    /// JVM descriptor of the zero-argument method producing a value of
    /// this type.
    pub fn signature(&self) -> String {
        format!("()L{};", self.descriptor_class())
    }

    fn descriptor_class(&self) -> String {
        match self {
            Type::Sum(symbol, _) => symbol.class_name(),
            Type::Constructor(_, _) => match self.flatten() {
                Type::Sum(symbol, _) => symbol.class_name(),
                _ => RuntimeType::Callable.class_name().to_string(),
            },
            _ => self.runtime_type().class_name().to_string(),
        }
    }
}

// ── Display ──────────────────────────────────────────────────────

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let contexts = self.contexts();
        if !contexts.is_empty() {
            write!(f, "(")?;
            for (i, (var, class)) in contexts.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{} {}", class.simple_name(), var)?;
            }
            write!(f, ") => ")?;
        }
        write_bare(self, f)
    }
}

fn write_bare(ty: &Type, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match ty {
        Type::Variable(var) => write!(f, "{}", var.name),
        Type::Sum(symbol, parameters) => {
            write!(f, "{}", symbol.simple_name())?;
            for parameter in parameters {
                write!(f, " ")?;
                write_operand(parameter, f)?;
            }
            Ok(())
        }
        Type::Function(argument, result) => {
            if matches!(**argument, Type::Function(_, _)) {
                write!(f, "(")?;
                write_bare(argument, f)?;
                write!(f, ")")?;
            } else {
                write_bare(argument, f)?;
            }
            write!(f, " -> ")?;
            write_bare(result, f)
        }
        Type::Constructor(head, argument) => {
            if matches!(**head, Type::Function(_, _)) {
                write_operand(head, f)?;
            } else {
                write_bare(head, f)?;
            }
            write!(f, " ")?;
            write_operand(argument, f)
        }
    }
}

fn write_operand(ty: &Type, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let compound = match ty {
        Type::Variable(_) => false,
        Type::Sum(_, parameters) => !parameters.is_empty(),
        Type::Function(_, _) | Type::Constructor(_, _) => true,
    };
    if compound {
        write!(f, "(")?;
        write_bare(ty, f)?;
        write!(f, ")")
    } else {
        write_bare(ty, f)
    }
}
