use smol_str::SmolStr;

use scotch_types::{Symbol, Type, TypeScope, zip};

use crate::method::MethodSignature;

// ── Data types ───────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataTypeDescriptor {
    pub symbol: Symbol,
    /// Formal type parameters, as variables
    pub parameters: Vec<Type>,
    /// Constructors in declaration order
    pub constructors: Vec<Symbol>,
}

impl DataTypeDescriptor {
    pub fn new(symbol: Symbol, parameters: Vec<Type>, constructors: Vec<Symbol>) -> Self {
        Self {
            symbol,
            parameters,
            constructors,
        }
    }

    /// The sum type over the formal parameters, e.g. `Maybe a`.
    pub fn ty(&self) -> Type {
        Type::Sum(self.symbol.clone(), self.parameters.clone())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataFieldDescriptor {
    pub name: SmolStr,
    pub ty: Type,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataConstructorDescriptor {
    pub ordinal: usize,
    pub symbol: Symbol,
    /// The sum type this constructor builds
    pub data_type: Type,
    pub fields: Vec<DataFieldDescriptor>,
}

impl DataConstructorDescriptor {
    /// Curried constructor function: `a -> Maybe a` for `Just`, the bare
    /// data type for nullary constructors.
    pub fn value_type(&self) -> Type {
        self.fields
            .iter()
            .rev()
            .fold(self.data_type.clone(), |result, field| {
                Type::fun(field.ty.clone(), result)
            })
    }

    pub fn is_niladic(&self) -> bool {
        self.fields.is_empty()
    }

    /// JVM class for this constructor, nested in the data type's class.
    pub fn class_name(&self) -> String {
        match &self.data_type {
            Type::Sum(data_type, _) => {
                format!("{}${}", data_type.class_name(), self.symbol.method_name())
            }
            _ => self.symbol.class_name(),
        }
    }
}

// ── Type classes ─────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeClassDescriptor {
    pub symbol: Symbol,
    pub parameters: Vec<Type>,
    pub members: Vec<Symbol>,
}

impl TypeClassDescriptor {
    pub fn new(symbol: Symbol, parameters: Vec<Type>, members: Vec<Symbol>) -> Self {
        Self {
            symbol,
            parameters,
            members,
        }
    }

    pub fn has_member(&self, member: &Symbol) -> bool {
        self.members.contains(member)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeInstanceDescriptor {
    pub module: SmolStr,
    pub type_class: Symbol,
    pub parameters: Vec<Type>,
    /// Static getter returning the instance object at runtime
    pub instance_getter: MethodSignature,
}

impl TypeInstanceDescriptor {
    /// Positional match against the class parameters at a use site.
    /// Variables in the instance head match anything.
    pub fn matches(&self, parameters: &[Type]) -> bool {
        let scope = TypeScope::default();
        self.parameters.len() == parameters.len()
            && self
                .parameters
                .iter()
                .zip(parameters)
                .all(|(formal, actual)| zip(formal, actual, &scope).is_some())
    }
}
