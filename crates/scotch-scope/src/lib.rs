pub mod checker;
pub mod deps;
pub mod error;
pub mod import;
pub mod options;
pub mod pattern;
pub mod scope;

pub use checker::TypeChecker;
pub use deps::DependencyGraph;
pub use error::{ConfigurationError, DiagnosticSink, ScopeError, TypeError, TypeErrorKind};
pub use import::{Import, ImportKind};
pub use options::CheckOptions;
pub use pattern::{PatternCase, PatternCaseBuilder, PatternMatch};
pub use scope::{ScopeFrame, ScopeId, ScopeTree};

#[cfg(test)]
mod tests;
