//! Builtin symbols every program can import: `Int`, `Bool`, and the `Eq`
//! and `Num` classes with their `Int` instances.

use scotch_types::{Symbol, Type};

use crate::descriptor::{
    DataConstructorDescriptor, DataTypeDescriptor, TypeClassDescriptor, TypeInstanceDescriptor,
};
use crate::entry::SymbolEntry;
use crate::method::MethodSignature;
use crate::operator::Operator;
use crate::resolver::ProgramIndex;

pub const INT: &str = "scotch.data.int.Int";
pub const BOOL: &str = "scotch.data.bool.Bool";
pub const EQ: &str = "scotch.data.eq.Eq";
pub const NUM: &str = "scotch.data.num.Num";

pub fn int() -> Type {
    Type::sum(INT, vec![])
}

pub fn boolean() -> Type {
    Type::sum(BOOL, vec![])
}

pub fn builtins() -> ProgramIndex {
    let mut index = ProgramIndex::new();
    install(&mut index);
    index
}

pub fn install(index: &mut ProgramIndex) {
    install_int(index);
    install_bool(index);
    install_eq(index);
    install_num(index);
}

fn install_int(index: &mut ProgramIndex) {
    let symbol = Symbol::parse(INT);
    index.define(
        SymbolEntry::new(symbol.clone())
            .with_data_type(DataTypeDescriptor::new(symbol, vec![], vec![])),
    );
}

fn install_bool(index: &mut ProgramIndex) {
    let symbol = Symbol::parse(BOOL);
    let constructors = vec![
        Symbol::parse("scotch.data.bool.True"),
        Symbol::parse("scotch.data.bool.False"),
    ];
    for (ordinal, constructor) in constructors.iter().enumerate() {
        let descriptor = DataConstructorDescriptor {
            ordinal,
            symbol: constructor.clone(),
            data_type: boolean(),
            fields: vec![],
        };
        index.define(
            SymbolEntry::new(constructor.clone())
                .with_value(descriptor.value_type())
                .with_data_constructor(descriptor),
        );
    }
    index.define(
        SymbolEntry::new(symbol.clone())
            .with_data_type(DataTypeDescriptor::new(symbol, vec![], constructors)),
    );
}

fn install_eq(index: &mut ProgramIndex) {
    let class = Symbol::parse(EQ);
    let a = Type::var_with_context("a", [class.clone()]);
    let equals = Symbol::parse("scotch.data.eq.==");

    index.define(
        SymbolEntry::new(equals.clone())
            .with_value(Type::fun(a.clone(), Type::fun(a.clone(), boolean())))
            .with_operator(Operator::left_infix(5))
            .with_member_of(class.clone()),
    );
    index.define(SymbolEntry::new(class.clone()).with_type_class(TypeClassDescriptor::new(
        class.clone(),
        vec![Type::var("a")],
        vec![equals],
    )));
    index.define_instance(instance(&class, "scotch/data/eq/EqInt"));
}

fn install_num(index: &mut ProgramIndex) {
    let class = Symbol::parse(NUM);
    let a = Type::var_with_context("a", [class.clone()]);
    let binary = Type::fun(a.clone(), Type::fun(a.clone(), a.clone()));
    let unary = Type::fun(a.clone(), a.clone());

    let members: Vec<(&str, Type, Option<Operator>)> = vec![
        ("+", binary.clone(), Some(Operator::left_infix(7))),
        ("-", binary.clone(), Some(Operator::left_infix(7))),
        ("*", binary, Some(Operator::left_infix(8))),
        ("negate", unary.clone(), None),
        ("abs", unary.clone(), None),
        ("signum", unary, None),
        ("fromInteger", Type::fun(int(), a), None),
    ];

    let mut symbols = Vec::with_capacity(members.len());
    for (name, ty, operator) in members {
        let symbol = Symbol::qualified("scotch.data.num", name);
        let mut entry = SymbolEntry::new(symbol.clone())
            .with_value(ty)
            .with_member_of(class.clone());
        if let Some(operator) = operator {
            entry = entry.with_operator(operator);
        }
        index.define(entry);
        symbols.push(symbol);
    }

    index.define(SymbolEntry::new(class.clone()).with_type_class(TypeClassDescriptor::new(
        class.clone(),
        vec![Type::var("a")],
        symbols,
    )));
    index.define_instance(instance(&class, "scotch/data/num/NumInt"));
}

fn instance(class: &Symbol, owner: &str) -> TypeInstanceDescriptor {
    TypeInstanceDescriptor {
        module: class.module_name().unwrap_or_default().into(),
        type_class: class.clone(),
        parameters: vec![int()],
        instance_getter: MethodSignature::static_method(owner, "instance", format!("()L{};", owner)),
    }
}
