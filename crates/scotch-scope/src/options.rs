use smol_str::SmolStr;

/// Knobs for one compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOptions {
    /// Report an unqualified name that more than one import can resolve.
    /// Off by default: the first import in declaration order wins.
    pub report_ambiguous_imports: bool,
    /// Prefix of fresh type variable names (`t0`, `t1`, ...). Source type
    /// variables of the form `{prefix}{n}` alias fresh ones; a front end that
    /// admits such names should choose a prefix its lexer rejects.
    pub fresh_variable_prefix: SmolStr,
    /// Prefix of fresh symbol names handed out by the root scope (`#0`, ...)
    pub reserved_symbol_prefix: SmolStr,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            report_ambiguous_imports: false,
            fresh_variable_prefix: SmolStr::new_static("t"),
            reserved_symbol_prefix: SmolStr::new_static("#"),
        }
    }
}
