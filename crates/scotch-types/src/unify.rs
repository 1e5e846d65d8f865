use crate::error::UnifyError;
use crate::scope::TypeScope;
use crate::types::{Type, TypeVar};

// ── Unification ──────────────────────────────────────────────────

/// Unify `expected` with `actual`, recording variable bindings in `scope`.
///
/// On success returns the unified type with all known bindings applied.
/// Bindings written before a failure are kept; the checker reports the
/// error and carries on.
pub fn unify(expected: &Type, actual: &Type, scope: &mut TypeScope) -> Result<Type, UnifyError> {
    let expected = scope.generate(expected);
    let actual = scope.generate(actual);
    log::trace!("unify {} ~ {}", expected, actual);

    match (&expected, &actual) {
        (Type::Variable(left), Type::Variable(right)) => {
            if left.name == right.name {
                Ok(expected.clone())
            } else {
                bind_variable(right, &expected, scope)
            }
        }
        (Type::Variable(var), _) => bind_variable(var, &actual, scope),
        (_, Type::Variable(var)) => bind_variable(var, &expected, scope),

        (Type::Sum(s1, p1), Type::Sum(s2, p2)) => {
            if s1 != s2 || p1.len() != p2.len() {
                return Err(UnifyError::mismatch(&expected, &actual));
            }
            for (e, a) in p1.iter().zip(p2) {
                unify(e, a, scope)?;
            }
            Ok(scope.generate(&expected))
        }

        (Type::Sum(_, _), Type::Constructor(_, _)) | (Type::Constructor(_, _), Type::Sum(_, _)) => {
            apply_constructor(&expected, &actual, scope)
        }

        (Type::Constructor(h1, a1), Type::Constructor(h2, a2)) => {
            unify(h1, h2, scope)?;
            unify(a1, a2, scope)?;
            Ok(scope.generate(&expected))
        }

        (Type::Function(a1, r1), Type::Function(a2, r2)) => {
            unify(a1, a2, scope)?;
            unify(r1, r2, scope)?;
            Ok(scope.generate(&expected))
        }

        (Type::Function(_, _), Type::Sum(_, _) | Type::Constructor(_, _))
        | (Type::Sum(_, _) | Type::Constructor(_, _), Type::Function(_, _)) => {
            Err(UnifyError::mismatch(&expected, &actual))
        }
    }
}

fn bind_variable(var: &TypeVar, target: &Type, scope: &mut TypeScope) -> Result<Type, UnifyError> {
    if target.contains(var) {
        return Err(UnifyError::circular(var, target));
    }
    scope.bind(var, target)?;
    Ok(target.clone())
}

/// `f a b` against `Either x y`: the head takes the sum with its trailing
/// parameters removed, the arguments take the removed parameters.
fn apply_constructor(
    expected: &Type,
    actual: &Type,
    scope: &mut TypeScope,
) -> Result<Type, UnifyError> {
    let (constructor, symbol, parameters, constructor_first) = match (expected, actual) {
        (Type::Constructor(_, _), Type::Sum(symbol, parameters)) => {
            (expected, symbol, parameters, true)
        }
        (Type::Sum(symbol, parameters), Type::Constructor(_, _)) => {
            (actual, symbol, parameters, false)
        }
        _ => return Err(UnifyError::mismatch(expected, actual)),
    };

    let (head, arguments) = decompose(constructor);
    if arguments.len() > parameters.len() {
        return Err(UnifyError::mismatch(expected, actual));
    }
    let split = parameters.len() - arguments.len();
    let partial = Type::Sum(symbol.clone(), parameters[..split].to_vec());

    let ordered = |c: &Type, s: &Type, scope: &mut TypeScope| {
        if constructor_first {
            unify(c, s, scope)
        } else {
            unify(s, c, scope)
        }
    };
    ordered(head, &partial, scope)?;
    for (argument, parameter) in arguments.iter().zip(&parameters[split..]) {
        ordered(argument, parameter, scope)?;
    }
    Ok(scope.generate(if constructor_first { actual } else { expected }))
}

/// Split a constructor chain `((h a) b) c` into `h` and `[a, b, c]`.
fn decompose(ty: &Type) -> (&Type, Vec<&Type>) {
    let mut head = ty;
    let mut arguments = Vec::new();
    while let Type::Constructor(h, argument) = head {
        arguments.push(&**argument);
        head = h;
    }
    arguments.reverse();
    (head, arguments)
}

// ── Zip ──────────────────────────────────────────────────────────

/// Positional correspondence between a formal type and an actual one,
/// without binding anything. Each pair is (formal position, actual type);
/// formal sides are simplified so they can be used as map keys.
///
/// Returns `None` where the two shapes cannot line up.
pub fn zip(formal: &Type, actual: &Type, scope: &TypeScope) -> Option<Vec<(Type, Type)>> {
    let formal = scope.generate(formal);
    let actual = scope.generate(actual);
    let mut pairs = Vec::new();
    zip_into(&formal, &actual, &mut pairs)?;
    Some(
        pairs
            .into_iter()
            .map(|(formal, actual)| (formal.simplify(), actual))
            .collect(),
    )
}

fn zip_into(formal: &Type, actual: &Type, pairs: &mut Vec<(Type, Type)>) -> Option<()> {
    match (formal, actual) {
        (Type::Variable(_), _) => {
            pairs.push((formal.clone(), actual.clone()));
            Some(())
        }
        (Type::Sum(s1, p1), Type::Sum(s2, p2)) => {
            if formal.simplify() == actual.simplify() {
                pairs.push((formal.clone(), actual.clone()));
                return Some(());
            }
            if s1 != s2 || p1.len() != p2.len() {
                return None;
            }
            for (f, a) in p1.iter().zip(p2) {
                zip_into(f, a, pairs)?;
            }
            Some(())
        }
        (Type::Function(a1, r1), Type::Function(a2, r2)) => {
            zip_into(a1, a2, pairs)?;
            zip_into(r1, r2, pairs)
        }
        (Type::Constructor(_, _), Type::Sum(symbol, parameters)) => {
            let (head, arguments) = decompose(formal);
            if arguments.len() > parameters.len() {
                return None;
            }
            let split = parameters.len() - arguments.len();
            let partial = Type::Sum(symbol.clone(), parameters[..split].to_vec());
            zip_into(head, &partial, pairs)?;
            for (argument, parameter) in arguments.iter().zip(&parameters[split..]) {
                zip_into(argument, parameter, pairs)?;
            }
            Some(())
        }
        (Type::Constructor(h1, a1), Type::Constructor(h2, a2)) => {
            zip_into(h1, h2, pairs)?;
            zip_into(a1, a2, pairs)
        }
        _ => None,
    }
}

impl Type {
    pub fn unify(&self, other: &Type, scope: &mut TypeScope) -> Result<Type, UnifyError> {
        unify(self, other, scope)
    }

    pub fn zip(&self, other: &Type, scope: &TypeScope) -> Option<Vec<(Type, Type)>> {
        zip(self, other, scope)
    }
}
