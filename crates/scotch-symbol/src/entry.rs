use scotch_types::{Symbol, Type};

use crate::descriptor::{DataConstructorDescriptor, DataTypeDescriptor, TypeClassDescriptor};
use crate::method::MethodSignature;
use crate::operator::Operator;

/// A descriptor slot on an entry was already filled with something else.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{symbol}` already has a different {slot}")]
pub struct EntryConflict {
    pub symbol: Symbol,
    pub slot: &'static str,
}

/// Everything known about one defined symbol.
///
/// Entries are created on first definition and only ever filled in or
/// updated afterwards. Value and signature may be refined as inference
/// learns more; the descriptor slots are written once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolEntry {
    symbol: Symbol,
    value: Option<Type>,
    signature: Option<Type>,
    value_method: Option<MethodSignature>,
    data_type: Option<DataTypeDescriptor>,
    data_constructor: Option<DataConstructorDescriptor>,
    operator: Option<Operator>,
    type_class: Option<TypeClassDescriptor>,
    member_of: Option<Symbol>,
}

impl SymbolEntry {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            value: None,
            signature: None,
            value_method: None,
            data_type: None,
            data_constructor: None,
            operator: None,
            type_class: None,
            member_of: None,
        }
    }

    // ── Construction for resolvers ───────────────────────────────

    /// Sets the value type and its module getter together.
    pub fn with_value(mut self, ty: Type) -> Self {
        self.value_method = Some(MethodSignature::value_method(&self.symbol, &ty));
        self.value = Some(ty);
        self
    }

    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn with_data_type(mut self, descriptor: DataTypeDescriptor) -> Self {
        self.data_type = Some(descriptor);
        self
    }

    pub fn with_data_constructor(mut self, descriptor: DataConstructorDescriptor) -> Self {
        self.data_constructor = Some(descriptor);
        self
    }

    pub fn with_type_class(mut self, descriptor: TypeClassDescriptor) -> Self {
        self.type_class = Some(descriptor);
        self
    }

    pub fn with_member_of(mut self, class: Symbol) -> Self {
        self.member_of = Some(class);
        self
    }

    // ── Queries ──────────────────────────────────────────────────

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn value(&self) -> Option<&Type> {
        self.value.as_ref()
    }

    pub fn signature(&self) -> Option<&Type> {
        self.signature.as_ref()
    }

    pub fn value_method(&self) -> Option<&MethodSignature> {
        self.value_method.as_ref()
    }

    pub fn data_type(&self) -> Option<&DataTypeDescriptor> {
        self.data_type.as_ref()
    }

    pub fn data_constructor(&self) -> Option<&DataConstructorDescriptor> {
        self.data_constructor.as_ref()
    }

    pub fn operator(&self) -> Option<Operator> {
        self.operator
    }

    pub fn type_class(&self) -> Option<&TypeClassDescriptor> {
        self.type_class.as_ref()
    }

    pub fn member_of(&self) -> Option<&Symbol> {
        self.member_of.as_ref()
    }

    pub fn is_operator(&self) -> bool {
        self.operator.is_some()
    }

    pub fn is_data_constructor(&self) -> bool {
        self.data_constructor.is_some()
    }

    // ── Definition ───────────────────────────────────────────────

    pub fn define_value(&mut self, ty: Type, method: MethodSignature) {
        self.value = Some(ty);
        self.value_method = Some(method);
    }

    pub fn define_signature(&mut self, ty: Type) {
        self.signature = Some(ty);
    }

    pub fn define_operator(&mut self, operator: Operator) -> Result<(), EntryConflict> {
        fill(&self.symbol, &mut self.operator, operator, "operator")
    }

    pub fn define_data_type(&mut self, descriptor: DataTypeDescriptor) -> Result<(), EntryConflict> {
        fill(&self.symbol, &mut self.data_type, descriptor, "data type")
    }

    pub fn define_data_constructor(
        &mut self,
        descriptor: DataConstructorDescriptor,
    ) -> Result<(), EntryConflict> {
        fill(&self.symbol, &mut self.data_constructor, descriptor, "data constructor")
    }

    pub fn define_type_class(
        &mut self,
        descriptor: TypeClassDescriptor,
    ) -> Result<(), EntryConflict> {
        fill(&self.symbol, &mut self.type_class, descriptor, "type class")
    }

    pub fn define_member_of(&mut self, class: Symbol) -> Result<(), EntryConflict> {
        fill(&self.symbol, &mut self.member_of, class, "owning type class")
    }
}

/// Write a once-only slot. Writing the same value again is a no-op.
fn fill<T: PartialEq>(
    symbol: &Symbol,
    slot: &mut Option<T>,
    value: T,
    name: &'static str,
) -> Result<(), EntryConflict> {
    match slot {
        Some(existing) if *existing != value => Err(EntryConflict {
            symbol: symbol.clone(),
            slot: name,
        }),
        Some(_) => Ok(()),
        None => {
            *slot = Some(value);
            Ok(())
        }
    }
}
