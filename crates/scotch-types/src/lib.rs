pub mod error;
pub mod scope;
pub mod span;
pub mod symbol;
pub mod types;
pub mod unify;

pub use error::{InvalidSumName, UnifyError};
pub use scope::TypeScope;
pub use span::Span;
pub use symbol::Symbol;
pub use types::{RuntimeType, Type, TypeVar};
pub use unify::{unify, zip};
