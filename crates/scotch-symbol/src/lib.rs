pub mod descriptor;
pub mod entry;
pub mod method;
pub mod operator;
pub mod prelude;
pub mod resolver;

pub use descriptor::{
    DataConstructorDescriptor, DataFieldDescriptor, DataTypeDescriptor, TypeClassDescriptor,
    TypeInstanceDescriptor,
};
pub use entry::{EntryConflict, SymbolEntry};
pub use method::MethodSignature;
pub use operator::{Fixity, Operator};
pub use resolver::{ProgramIndex, SymbolResolver};
