use crate::types::{Type, TypeVar};

/// Why two types failed to unify.
///
/// Returned as a value: the checker reports it and keeps going with a
/// placeholder type so one pass can surface several diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnifyError {
    #[error("type mismatch: expected {expected}, got {actual}")]
    Mismatch { expected: Type, actual: Type },

    #[error("infinite type: {variable} occurs in {ty}")]
    Circular { variable: TypeVar, ty: Type },
}

impl UnifyError {
    pub fn mismatch(expected: &Type, actual: &Type) -> Self {
        UnifyError::Mismatch {
            expected: expected.clone(),
            actual: actual.clone(),
        }
    }

    pub fn circular(variable: &TypeVar, ty: &Type) -> Self {
        UnifyError::Circular {
            variable: variable.clone(),
            ty: ty.clone(),
        }
    }

    pub fn is_circular(&self) -> bool {
        matches!(self, UnifyError::Circular { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("sum type should have upper-case name: got `{0}`")]
pub struct InvalidSumName(pub String);
