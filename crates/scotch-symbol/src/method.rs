use std::fmt;

use scotch_types::{Symbol, Type};

/// A static JVM method reference: owning class, name and descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

impl MethodSignature {
    pub fn static_method(
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    /// The static getter the code generator emits for a top-level value:
    /// lives on the module class, named after the mangled simple name.
    pub fn value_method(symbol: &Symbol, ty: &Type) -> Self {
        Self::static_method(symbol.module_class(), symbol.method_name(), ty.signature())
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.owner, self.name, self.descriptor)
    }
}
