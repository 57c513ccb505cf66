//! Per-function context-variable table
//!
//! A context variable is anything declared with the `__context` keyword
//! inside a translated function; its value must survive a `WAIT_EVT`
//! suspension. `inChain` is synthesized at `START_FUNC` and is never
//! hoisted, since it is a formal parameter of the generated function.

use std::collections::HashMap;

pub const IN_CHAIN: &str = "inChain";
const IN_CHAIN_TYPE: &str = "pdEvent_t*";

/// One entry of the symbol table.
#[derive(Debug, Clone)]
pub struct ContextVar {
    pub name: String,
    /// Declared type with pointer-qualifier whitespace collapsed, e.g. `pdEvent_t*`.
    pub var_type: String,
    /// Original declaration text (`less` the `__context` keyword), used when hoisting.
    /// `None` for the synthetic `inChain`, which has no declaration text of its own.
    pub decl_line: Option<String>,
    pub line_no: usize,
}

impl ContextVar {
    pub fn new(name: impl Into<String>, var_type: impl Into<String>, decl_line: Option<String>, line_no: usize) -> Self {
        Self { name: name.into(), var_type: var_type.into(), decl_line, line_no }
    }

    /// True iff the type string begins with `pdEvent` and ends with `_t*`.
    pub fn is_event(&self) -> bool {
        self.var_type.starts_with("pdEvent") && self.var_type.ends_with("_t*")
    }
}

/// Symbol table for the function currently being translated.
///
/// Preserves insertion order (needed for hoisting, which must emit
/// declarations in the order they were first seen) while still
/// supporting name lookup.
#[derive(Debug, Default)]
pub struct SymbolTable {
    order: Vec<String>,
    vars: HashMap<String, ContextVar>,
}

impl SymbolTable {
    /// A fresh table containing only the synthetic `inChain` entry.
    pub fn new(start_line: usize) -> Self {
        let mut table = Self::default();
        table.insert_raw(ContextVar::new(IN_CHAIN, IN_CHAIN_TYPE, None, start_line));
        table
    }

    fn insert_raw(&mut self, var: ContextVar) {
        self.order.push(var.name.clone());
        self.vars.insert(var.name.clone(), var);
    }

    /// Insert a newly declared context variable.
    ///
    /// Returns the previous entry if `name` was already declared (the
    /// caller reports this as a duplicate-declaration error and leaves
    /// the earlier entry in place).
    pub fn declare(&mut self, var: ContextVar) -> Option<&ContextVar> {
        if self.vars.contains_key(&var.name) {
            return self.vars.get(&var.name);
        }
        self.insert_raw(var);
        None
    }

    pub fn get(&self, name: &str) -> Option<&ContextVar> {
        self.vars.get(name)
    }

    /// All variables except `inChain`, in declaration order — the set
    /// that gets hoisted at `END_FUNC` in optimized mode.
    pub fn hoistable(&self) -> impl Iterator<Item = &ContextVar> {
        self.order.iter().filter(|n| n.as_str() != IN_CHAIN).map(move |n| &self.vars[n])
    }
}
