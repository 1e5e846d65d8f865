use smol_str::SmolStr;
use std::fmt;

/// A name, optionally paired with the module that owns it.
///
/// Cross-module identity is only meaningful between qualified symbols;
/// name qualification is what turns `Unqualified` into `Qualified`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Qualified { module: SmolStr, name: SmolStr },
    Unqualified { name: SmolStr },
}

impl Symbol {
    pub fn qualified(module: impl Into<SmolStr>, name: impl Into<SmolStr>) -> Self {
        Symbol::Qualified {
            module: module.into(),
            name: name.into(),
        }
    }

    pub fn unqualified(name: impl Into<SmolStr>) -> Self {
        Symbol::Unqualified { name: name.into() }
    }

    /// Parse dotted text: everything before the last `.` is the module.
    ///
    /// The composition operator is the one name that is itself a dot, so
    /// `scotch.data.function..` is `.` in module `scotch.data.function`.
    pub fn parse(text: &str) -> Self {
        if let Some(module) = text.strip_suffix("..") {
            if !module.is_empty() {
                return Symbol::qualified(module, ".");
            }
        }
        match text.rsplit_once('.') {
            Some((module, name)) if !module.is_empty() && !name.is_empty() => {
                Symbol::qualified(module, name)
            }
            _ => Symbol::unqualified(text),
        }
    }

    pub fn simple_name(&self) -> &str {
        match self {
            Symbol::Qualified { name, .. } | Symbol::Unqualified { name } => name,
        }
    }

    pub fn module_name(&self) -> Option<&str> {
        match self {
            Symbol::Qualified { module, .. } => Some(module),
            Symbol::Unqualified { .. } => None,
        }
    }

    pub fn is_qualified(&self) -> bool {
        matches!(self, Symbol::Qualified { .. })
    }

    pub fn is_from(&self, module: &str) -> bool {
        self.module_name() == Some(module)
    }

    pub fn qualify_with(&self, module: impl Into<SmolStr>) -> Symbol {
        Symbol::qualified(module, self.simple_name())
    }

    pub fn unqualify(&self) -> Symbol {
        Symbol::unqualified(self.simple_name())
    }

    /// JVM internal name of the class backing a data type, e.g.
    /// `scotch/data/maybe/Maybe`.
    pub fn class_name(&self) -> String {
        match self {
            Symbol::Qualified { module, name } => {
                format!("{}/{}", module.replace('.', "/"), mangle(name))
            }
            Symbol::Unqualified { name } => mangle(name),
        }
    }

    /// JVM internal name of the class holding a module's top-level values.
    pub fn module_class(&self) -> String {
        match self {
            Symbol::Qualified { module, .. } => {
                format!("{}/ScotchModule", module.replace('.', "/"))
            }
            Symbol::Unqualified { .. } => "ScotchModule".to_string(),
        }
    }

    /// The simple name made safe for use as a JVM method name.
    pub fn method_name(&self) -> String {
        mangle(self.simple_name())
    }
}

fn mangle(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '+' => out.push_str("$plus"),
            '-' => out.push_str("$minus"),
            '*' => out.push_str("$times"),
            '/' => out.push_str("$div"),
            '=' => out.push_str("$eq"),
            '<' => out.push_str("$less"),
            '>' => out.push_str("$greater"),
            '!' => out.push_str("$bang"),
            '?' => out.push_str("$qmark"),
            '.' => out.push_str("$dot"),
            ':' => out.push_str("$colon"),
            '&' => out.push_str("$amp"),
            '|' => out.push_str("$bar"),
            '#' => out.push_str("$hash"),
            '%' => out.push_str("$percent"),
            '^' => out.push_str("$up"),
            '~' => out.push_str("$tilde"),
            '@' => out.push_str("$at"),
            '\\' => out.push_str("$bslash"),
            '$' => out.push_str("$$"),
            c => out.push(c),
        }
    }
    out
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Qualified { module, name } => write!(f, "{}.{}", module, name),
            Symbol::Unqualified { name } => write!(f, "{}", name),
        }
    }
}

impl From<&str> for Symbol {
    fn from(text: &str) -> Self {
        Symbol::parse(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_at_last_dot() {
        assert_eq!(
            Symbol::parse("scotch.data.maybe.Maybe"),
            Symbol::qualified("scotch.data.maybe", "Maybe")
        );
        assert_eq!(Symbol::parse("x"), Symbol::unqualified("x"));
    }

    #[test]
    fn parse_handles_dot_operator() {
        let symbol = Symbol::parse("scotch.data.function..");
        assert_eq!(symbol.module_name(), Some("scotch.data.function"));
        assert_eq!(symbol.simple_name(), ".");
        assert_eq!(Symbol::parse("."), Symbol::unqualified("."));
    }

    #[test]
    fn jvm_names() {
        let maybe = Symbol::parse("scotch.data.maybe.Maybe");
        assert_eq!(maybe.class_name(), "scotch/data/maybe/Maybe");
        assert_eq!(maybe.module_class(), "scotch/data/maybe/ScotchModule");
        assert_eq!(Symbol::parse("scotch.data.num.+").method_name(), "$plus");
        assert_eq!(Symbol::unqualified("javaEq?!").method_name(), "javaEq$qmark$bang");
    }

    #[test]
    fn qualify_with_replaces_module() {
        let x = Symbol::unqualified("x");
        assert_eq!(x.qualify_with("Foo"), Symbol::qualified("Foo", "x"));
        assert!(x.qualify_with("Foo").is_from("Foo"));
        assert!(!x.is_qualified());
    }
}
