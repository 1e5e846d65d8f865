use super::*;
use scotch_symbol::{Operator, ProgramIndex, SymbolEntry, SymbolResolver, prelude};
use scotch_types::{Span, Symbol, Type, TypeVar};

fn span() -> Span {
    Span::new(0, 1)
}

fn int() -> Type {
    prelude::int()
}

fn x() -> Symbol {
    Symbol::unqualified("x")
}

/// Prelude plus modules `a` and `b` both exporting `x`.
fn index_with_clashing_x() -> ProgramIndex {
    let mut index = prelude::builtins();
    for module in ["a", "b"] {
        index.define(SymbolEntry::new(Symbol::qualified(module, "x")).with_value(int()));
    }
    index
}

// ── Qualification ────────────────────────────────────────────────

#[test]
fn local_definition_shadows_import() {
    let mut scopes = ScopeTree::new(index_with_clashing_x());
    let m = scopes.enter_module("M", vec![Import::all("a")]);
    assert_eq!(scopes.qualify(m, &x()), Some(Symbol::parse("a.x")));

    scopes.define_value(m, &Symbol::parse("M.x"), int()).unwrap();
    assert_eq!(scopes.qualify(m, &x()), Some(Symbol::parse("M.x")));
}

#[test]
fn import_resolves_module_from_same_unit() {
    let mut scopes = ScopeTree::new(prelude::builtins());
    let bar = scopes.enter_module("Bar", vec![]);
    scopes.define_value(bar, &Symbol::parse("Bar.x"), int()).unwrap();

    let foo = scopes.enter_module("Foo", vec![Import::all("Bar")]);
    assert_eq!(scopes.qualify(foo, &x()), Some(Symbol::parse("Bar.x")));
    assert_eq!(scopes.value(foo, &x()), Some(int()));
}

#[test]
fn qualified_reference_needs_matching_import() {
    let mut scopes = ScopeTree::new(index_with_clashing_x());
    let m = scopes.enter_module("M", vec![Import::all("a")]);
    assert_eq!(
        scopes.qualify(m, &Symbol::parse("a.x")),
        Some(Symbol::parse("a.x"))
    );
    assert_eq!(scopes.qualify(m, &Symbol::parse("b.x")), None);
    assert_eq!(
        scopes.qualify(m, &Symbol::parse("M.anything")),
        Some(Symbol::parse("M.anything"))
    );
}

#[test]
fn first_import_wins() {
    let mut scopes = ScopeTree::new(index_with_clashing_x());
    let m = scopes.enter_module("M", vec![Import::all("b"), Import::all("a")]);
    assert_eq!(scopes.qualify(m, &x()), Some(Symbol::parse("b.x")));
    assert_eq!(
        scopes.ambiguities(m, "x"),
        vec![Symbol::parse("b.x"), Symbol::parse("a.x")]
    );

    let n = scopes.enter_module("N", vec![Import::names("b", ["y"]), Import::all("a")]);
    assert_eq!(scopes.qualify(n, &x()), Some(Symbol::parse("a.x")));
    assert_eq!(scopes.ambiguities(n, "x").len(), 1);
}

#[test]
fn unknown_name_does_not_qualify() {
    let mut scopes = ScopeTree::new(prelude::builtins());
    let m = scopes.enter_module("M", vec![Import::all("scotch.data.num")]);
    assert_eq!(scopes.qualify(m, &Symbol::unqualified("nope")), None);
    assert!(!scopes.is_defined(m, &Symbol::unqualified("nope")));
}

#[test]
fn qualify_type_reports_unknown_names() {
    let mut scopes = ScopeTree::new(prelude::builtins());
    let m = scopes.enter_module("M", vec![Import::all("scotch.data.int")]);
    let written = Type::fun(
        Type::Sum(Symbol::unqualified("Int"), vec![]),
        Type::Sum(Symbol::unqualified("Nope"), vec![]),
    );
    let mut errors: Vec<TypeError> = Vec::new();
    let qualified = scopes.qualify_type(m, &written, Span::new(3, 9), &mut errors);
    assert_eq!(
        qualified,
        Type::fun(int(), Type::Sum(Symbol::unqualified("Nope"), vec![]))
    );
    assert_eq!(errors.len(), 1);
    insta::assert_snapshot!(errors[0].to_string(), @"[3:9] symbol `Nope` not found");
}

// ── Definitions ──────────────────────────────────────────────────

#[test]
fn defining_in_another_module_is_a_conflict() {
    let mut scopes = ScopeTree::new(prelude::builtins());
    let _bar = scopes.enter_module("Bar", vec![]);
    let foo = scopes.enter_module("Foo", vec![Import::all("Bar")]);

    let err = scopes
        .define_value(foo, &Symbol::parse("Bar.y"), int())
        .unwrap_err();
    assert!(err.is_definition_conflict());
    insta::assert_snapshot!(err.to_string(), @"can't define symbol `Bar.y` within different module `Foo`");

    let err = scopes
        .define_signature(foo, &Symbol::unqualified("y"), int())
        .unwrap_err();
    assert_eq!(err, ScopeError::UnqualifiedDefinition(Symbol::unqualified("y")));
}

#[test]
fn redefining_a_descriptor_differently_is_a_conflict() {
    let mut scopes = ScopeTree::new(prelude::builtins());
    let m = scopes.enter_module("M", vec![]);
    let plus = Symbol::parse("M.<+>");
    scopes
        .define_operator(m, &plus, Operator::left_infix(6))
        .unwrap();
    let err = scopes
        .define_operator(m, &plus, Operator::right_infix(6))
        .unwrap_err();
    assert!(err.is_definition_conflict());
    assert_eq!(scopes.operator(m, &Symbol::unqualified("<+>")), Some(Operator::left_infix(6)));
}

#[test]
fn value_definition_records_jvm_getter() {
    let mut scopes = ScopeTree::new(prelude::builtins());
    let m = scopes.enter_module("scotch.test", vec![]);
    scopes
        .define_value(m, &Symbol::parse("scotch.test.x"), int())
        .unwrap();
    let child = scopes.enter_scope(m);
    let method = scopes.value_signature(child, &x()).unwrap();
    assert_eq!(
        method.to_string(),
        "scotch/test/ScotchModule:x:()Lscotch/data/int/Int;"
    );
}

#[test]
fn signature_is_instantiated_per_lookup() {
    let mut scopes = ScopeTree::new(prelude::builtins());
    let m = scopes.enter_module("M", vec![]);
    let a = Type::var("a");
    scopes
        .define_signature(m, &Symbol::parse("M.id"), Type::fun(a.clone(), a))
        .unwrap();
    let id = Symbol::unqualified("id");
    assert_eq!(
        scopes.signature(m, &id),
        Some(Type::fun(Type::var("t0"), Type::var("t0")))
    );
    assert_eq!(
        scopes.signature(m, &id),
        Some(Type::fun(Type::var("t1"), Type::var("t1")))
    );
}

#[test]
fn resolver_entries_are_visible_through_imports() {
    let mut scopes = ScopeTree::new(prelude::builtins());
    let m = scopes.enter_module(
        "M",
        vec![Import::all("scotch.data.num"), Import::all("scotch.data.bool")],
    );
    let plus = Symbol::unqualified("+");
    assert!(scopes.is_operator(m, &plus));
    assert_eq!(scopes.operator(m, &plus), Some(Operator::left_infix(7)));
    assert_eq!(
        scopes.member_of(m, &plus).map(|class| class.symbol.clone()),
        Some(Symbol::parse(prelude::NUM))
    );
    assert!(scopes.is_data_constructor(m, &Symbol::unqualified("True")));
    assert!(!scopes.is_data_constructor(m, &plus));
    assert_eq!(
        scopes.type_instances(&Symbol::parse(prelude::NUM), &[int()]).len(),
        1
    );
}

#[test]
fn context_combines_constraints_and_imported_instances() {
    let mut scopes = ScopeTree::new(prelude::builtins());
    let m = scopes.enter_module("M", vec![Import::all("scotch.data.eq")]);
    assert!(scopes.context(m, &int()).contains(&Symbol::parse(prelude::EQ)));

    let a = Type::var("a");
    scopes
        .types_mut()
        .extend_context(&a, [Symbol::parse(prelude::NUM)]);
    assert!(scopes.context(m, &a).contains(&Symbol::parse(prelude::NUM)));
}

// ── Nesting and bookkeeping ──────────────────────────────────────

#[test]
fn child_scope_layers_over_module() {
    let mut scopes = ScopeTree::new(prelude::builtins());
    let m = scopes.enter_module("M", vec![]);
    let child = scopes.enter_scope(m);
    let argument = scopes.reserve_symbol(child);
    assert_eq!(argument, Symbol::parse("M.#0"));

    scopes.define_value(child, &argument, int()).unwrap();
    let local = Symbol::unqualified("#0");
    assert_eq!(scopes.value(child, &local), Some(int()));
    assert_eq!(scopes.value(m, &local), None);

    let grandchild = scopes.enter_scope(child);
    assert_eq!(scopes.value(grandchild, &local), Some(int()));
    assert_eq!(scopes.leave_scope(grandchild), child);
    assert_eq!(scopes.leave_scope(child), m);
    assert_eq!(scopes.leave_scope(m), scopes.root());
}

#[test]
fn reserved_symbols_are_fresh() {
    let mut scopes = ScopeTree::new(prelude::builtins());
    let m = scopes.enter_module("M", vec![]);
    let root = scopes.root();
    assert_eq!(scopes.reserve_symbol(m), Symbol::parse("M.#0"));
    assert_eq!(scopes.reserve_symbol(root), Symbol::unqualified("#1"));
    assert_eq!(
        scopes.reserve_symbol_nested(m, &["f", "g"]),
        Symbol::qualified("M", "f#g#2")
    );
}

#[test]
fn reserved_symbol_prefix_is_configurable() {
    let options = CheckOptions {
        reserved_symbol_prefix: "$".into(),
        fresh_variable_prefix: "v".into(),
        ..CheckOptions::default()
    };
    let mut scopes = ScopeTree::with_options(prelude::builtins(), options);
    let m = scopes.enter_module("M", vec![]);
    assert_eq!(scopes.reserve_symbol(m), Symbol::qualified("M", "$0"));
    assert_eq!(scopes.types_mut().reserve_type(), Type::var("v0"));
}

#[test]
fn dependencies_skip_external_symbols() {
    let mut scopes = ScopeTree::new(prelude::builtins());
    let bar = scopes.enter_module("Bar", vec![]);
    scopes.define_value(bar, &Symbol::parse("Bar.x"), int()).unwrap();
    let foo = scopes.enter_module("Foo", vec![Import::all("Bar")]);

    scopes.add_dependency(foo, &Symbol::parse(prelude::INT));
    scopes.add_dependency(foo, &Symbol::parse("Bar.x"));
    let child = scopes.enter_scope(foo);
    scopes.add_dependency(child, &Symbol::parse("Bar.y"));

    let deps: Vec<String> = scopes
        .dependencies(foo)
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(deps, vec!["Bar.x", "Bar.y"]);

    let graph = scopes.dependency_graph();
    assert_eq!(graph.topological_order().unwrap(), vec!["Bar", "Foo"]);
}

#[test]
fn module_cycle_is_fatal() {
    let mut scopes = ScopeTree::new(prelude::builtins());
    let a = scopes.enter_module("A", vec![]);
    let b = scopes.enter_module("B", vec![]);
    scopes.add_dependency(a, &Symbol::parse("B.f"));
    scopes.add_dependency(b, &Symbol::parse("A.g"));
    let err = scopes.dependency_graph().topological_order().unwrap_err();
    assert!(matches!(err, ScopeError::DependencyCycle(_)));
}

#[test]
fn pattern_cases_keep_insertion_order() {
    let mut scopes = ScopeTree::new(prelude::builtins());
    let m = scopes.enter_module("M", vec![]);
    let f = Symbol::parse("M.f");
    let g = Symbol::parse("M.g");
    let case = |symbol: &Symbol, start: u32| {
        PatternCase::builder()
            .with_span(Span::new(start, start + 1))
            .with_symbol(symbol.clone())
            .with_matches(vec![])
            .with_body_type(int())
            .build()
            .unwrap()
    };
    scopes.add_pattern(m, &f, case(&f, 0));
    scopes.add_pattern(m, &g, case(&g, 10));
    scopes.add_pattern(m, &f, case(&f, 20));

    let cases = scopes.pattern_cases(m);
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0].0, &f);
    let starts: Vec<u32> = cases[0].1.iter().map(|c| c.span.start).collect();
    assert_eq!(starts, vec![0, 20]);
    assert_eq!(cases[1].0, &g);
}

#[test]
fn reentering_module_adds_imports() {
    let mut scopes = ScopeTree::new(index_with_clashing_x());
    let first = scopes.enter_module("M", vec![Import::all("a")]);
    let again = scopes.enter_module("M", vec![Import::all("a"), Import::all("b")]);
    assert_eq!(first, again);
    assert_eq!(scopes.imports(first).len(), 2);
    assert_eq!(scopes.module("M"), Some(first));
}

// ── Checker ──────────────────────────────────────────────────────

fn checker(options: CheckOptions) -> TypeChecker {
    TypeChecker::new(ScopeTree::with_options(index_with_clashing_x(), options))
}

#[test]
fn unify_failure_is_reported_and_checking_continues() {
    let mut checker = checker(CheckOptions::default());
    checker.enter_module("M", vec![]);
    let ty = checker.unify_or_report(&int(), &prelude::boolean(), span());
    assert_eq!(ty, int());
    let a = Type::var("a");
    assert_eq!(checker.unify_or_report(&a, &int(), span()), int());

    assert_eq!(checker.errors().len(), 1);
    insta::assert_snapshot!(checker.errors()[0].to_string(), @"[0:1] type mismatch: expected Int, got Bool");
    assert!(checker.finish().is_err());
}

#[test]
fn circular_type_is_reported() {
    let mut checker = checker(CheckOptions::default());
    let a = Type::var("a");
    checker.unify_or_report(&a, &Type::fun(a.clone(), int()), span());
    assert!(matches!(
        checker.errors()[0].kind,
        TypeErrorKind::CircularType { .. }
    ));
}

#[test]
fn enclose_pins_arguments_for_the_body_only() {
    let mut checker = checker(CheckOptions::default());
    let a = Type::var("a");
    let b = Type::var("b");
    let body = checker.enclose(std::slice::from_ref(&a), |checker| {
        checker
            .scopes_mut()
            .types_mut()
            .generic_copy(&Type::fun(a.clone(), b.clone()))
    });
    assert_eq!(body, Type::fun(a.clone(), Type::var("t0")));
    assert!(checker.scopes().types().is_generic(&TypeVar::new("a")));
}

#[test]
fn enclosed_argument_stays_monomorphic_after_binding() {
    let mut checker = checker(CheckOptions::default());
    let a = Type::var("a");
    let (first, second, result) = checker.enclose(std::slice::from_ref(&a), |checker| {
        let result = checker.reserve_type();
        checker.unify_or_report(&result, &a, span());
        let types = checker.scopes_mut().types_mut();
        (types.generic_copy(&a), types.generic_copy(&a), result)
    });
    assert_eq!(first, result);
    assert_eq!(first, second);
    assert!(checker.errors().is_empty());
    assert!(checker.scopes().types().is_generic(&TypeVar::new("t0")));
}

#[test]
fn enclose_unpins_on_error_paths() {
    let mut checker = checker(CheckOptions::default());
    let a = Type::var("a");
    let result: Result<(), ScopeError> = checker.enclose(&[a.clone()], |checker| {
        checker.unify_or_report(&int(), &prelude::boolean(), span());
        Err(ScopeError::UnqualifiedDefinition(Symbol::unqualified("oops")))
    });
    assert!(result.is_err());
    assert!(checker.scopes().types().is_generic(&TypeVar::new("a")));
}

#[test]
fn function_type_folds_right() {
    let checker = checker(CheckOptions::default());
    let ty = checker.function_type(&[int(), prelude::boolean()], int());
    insta::assert_snapshot!(ty.to_string(), @"Int -> Bool -> Int");
    assert_eq!(checker.function_type(&[], int()), int());
}

#[test]
fn ambiguity_is_reported_only_when_enabled() {
    let imports = || vec![Import::all("a"), Import::all("b")];

    let mut quiet = checker(CheckOptions::default());
    quiet.enter_module("M", imports());
    assert_eq!(quiet.qualify_or_report(&x(), span()), Symbol::parse("a.x"));
    assert!(quiet.errors().is_empty());

    let mut strict = checker(CheckOptions {
        report_ambiguous_imports: true,
        ..CheckOptions::default()
    });
    strict.enter_module("M", imports());
    assert_eq!(strict.qualify_or_report(&x(), span()), Symbol::parse("a.x"));
    insta::assert_snapshot!(strict.errors()[0].message(), @"ambiguous reference `x`: imported as `a.x`, `b.x`");
}

#[test]
fn local_definition_is_never_ambiguous() {
    let mut checker = checker(CheckOptions {
        report_ambiguous_imports: true,
        ..CheckOptions::default()
    });
    let m = checker.enter_module("M", vec![Import::all("a"), Import::all("b")]);
    checker
        .scopes_mut()
        .define_value(m, &Symbol::parse("M.x"), int())
        .unwrap();
    assert_eq!(checker.qualify_or_report(&x(), span()), Symbol::parse("M.x"));
    assert!(checker.errors().is_empty());
}

#[test]
fn unresolved_reference_gets_placeholder() {
    let mut checker = checker(CheckOptions::default());
    checker.enter_module("M", vec![]);
    let missing = Symbol::unqualified("missing");
    assert_eq!(checker.qualify_or_report(&missing, span()), missing);
    assert_eq!(checker.reference(&missing, span()), Type::var("t0"));
    assert_eq!(checker.errors().len(), 2);
    assert_eq!(
        checker.errors()[1].kind,
        TypeErrorKind::SymbolNotFound { symbol: missing }
    );
}

#[test]
fn reference_instantiates_values() {
    let mut checker = checker(CheckOptions::default());
    let m = checker.enter_module("M", vec![Import::all("scotch.data.num")]);
    let negate = checker.reference(&Symbol::unqualified("negate"), span());
    let num = Symbol::parse(prelude::NUM);
    assert_eq!(
        negate,
        Type::fun(
            Type::var_with_context("t0", [num.clone()]),
            Type::var_with_context("t0", [num])
        )
    );
    assert!(checker.scopes().is_defined(m, &Symbol::unqualified("abs")));
}

#[test]
fn unsatisfied_context_is_reported() {
    let mut checker = checker(CheckOptions::default());
    checker.enter_module("M", vec![]);
    let num = Symbol::parse(prelude::NUM);

    let a = Type::var_with_context("a", [num.clone()]);
    checker.unify_or_report(&a, &prelude::boolean(), span());
    checker.check_contexts(&a, span());
    insta::assert_snapshot!(checker.errors()[0].message(), @"no instance of `scotch.data.num.Num` for Bool");

    let b = Type::var_with_context("b", [num]);
    checker.unify_or_report(&b, &int(), span());
    checker.check_contexts(&b, span());
    assert_eq!(checker.errors().len(), 1);
}

#[test]
fn missing_instance_is_reported_once_along_a_chain() {
    let mut checker = checker(CheckOptions::default());
    checker.enter_module("M", vec![]);
    let a = Type::var_with_context("a", [Symbol::parse(prelude::NUM)]);
    let b = Type::var("b");
    checker.unify_or_report(&b, &a, span());
    checker.unify_or_report(&b, &prelude::boolean(), span());
    checker.check_contexts(&a, span());
    assert_eq!(checker.errors().len(), 1);
    insta::assert_snapshot!(checker.errors()[0].to_string(), @"[0:1] no instance of `scotch.data.num.Num` for Bool");
}

#[test]
fn capture_takes_the_argument_type() {
    let mut checker = checker(CheckOptions::default());
    checker.enter_module("M", vec![]);
    let body = checker.enter_scope();
    let argument = checker.scopes_mut().reserve_symbol(body);
    checker
        .scopes_mut()
        .define_value(body, &argument, int())
        .unwrap();

    let captured = Symbol::parse("M.n");
    let ty = checker
        .check_capture(&captured, &Type::var("n"), argument.simple_name(), span())
        .unwrap();
    assert_eq!(ty, int());
    assert_eq!(
        checker.scopes().value(body, &Symbol::unqualified("n")),
        Some(int())
    );
    assert!(checker.errors().is_empty());

    checker
        .check_capture(&Symbol::parse("M.m"), &Type::var("m"), "#9", span())
        .unwrap();
    insta::assert_snapshot!(checker.errors()[0].message(), @"symbol `#9` not found");

    assert_eq!(checker.leave_scope(), checker.scopes().module("M").unwrap());
}

#[test]
fn clean_unit_finishes() {
    let mut checker = checker(CheckOptions::default());
    let m = checker.enter_module("M", vec![]);
    checker
        .scopes_mut()
        .define_value(m, &Symbol::parse("M.x"), int())
        .unwrap();
    let scopes = checker.finish().unwrap();
    assert!(scopes.resolver().is_defined(&Symbol::parse("a.x")));
    assert_eq!(scopes.value(m, &x()), Some(int()));
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn first_resolving_import_wins(
            modules in prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 0..5)
        ) {
            let mut scopes = ScopeTree::new(index_with_clashing_x());
            let imports = modules.iter().map(|m| Import::all(*m)).collect();
            let m = scopes.enter_module("M", imports);
            let expected = modules
                .iter()
                .find(|m| **m != "c")
                .map(|m| Symbol::qualified(*m, "x"));
            prop_assert_eq!(scopes.qualify(m, &x()), expected);
        }

        #[test]
        fn reserved_symbols_never_repeat(n in 1usize..40) {
            let mut scopes = ScopeTree::new(prelude::builtins());
            let m = scopes.enter_module("M", vec![]);
            let mut seen = std::collections::HashSet::new();
            for _ in 0..n {
                prop_assert!(seen.insert(scopes.reserve_symbol(m)));
            }
        }
    }
}
