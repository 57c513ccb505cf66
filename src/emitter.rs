//! Code emitter
//!
//! Produces the C fragments that replace a `WAIT_EVT` invocation: the
//! marker comments, the ready test, the continuation-label dispatch,
//! and the context save/restore blocks for carried events and scalars.
//! Everything here is string templating, parameterized on the mode
//! (`optimized` vs `checked`) and the `PDEVT_*` sizing constants — there
//! is no attempt to understand the surrounding C.

use std::fmt::Write as _;

use crate::config::{Config, ContextMode};
use crate::symbols::ContextVar;

/// Everything the emitter needs to expand one `WAIT_EVT` invocation.
pub struct WaitEmission<'a> {
    pub macro_text: &'a str,
    /// Indent captured at the `WAIT_EVT` line itself.
    pub indent: &'a str,
    /// One indent level, captured at `START_FUNC`.
    pub increment: &'a str,
    pub awaited: &'a ContextVar,
    pub carried_events: &'a [ContextVar],
    pub carried_scalars: &'a [ContextVar],
}

/// Expand a `WAIT_EVT` invocation into its replacement C fragment.
pub fn emit_wait(cfg: &Config, emission: &WaitEmission<'_>) -> String {
    let WaitEmission { macro_text, indent, increment, awaited, carried_events, carried_scalars } = *emission;
    let mut out = String::new();
    let i1 = format!("{indent}{increment}");

    let _ = writeln!(out, "{indent}/* *** {macro_text} {{ *** */");
    let _ = writeln!(out, "{indent}outChain = (pdEvent_t*){};", awaited.name);

    if cfg.context_mode == ContextMode::Checked {
        out.push_str(&add_ctx_events(indent, increment, "_continuation", carried_events, cfg.list_size));
        out.push_str(&add_ctx_vars(indent, increment, "_continuation", carried_scalars, cfg.scratch_bytes));
    }

    let _ = writeln!(out, "{indent}if (outChain->properties & PDEVT_IS_READY) {{");
    let _ = writeln!(out, "{i1}/* Continue execution, nothing to do */");
    let _ = writeln!(out, "{i1}_fallthrough = true;");
    let _ = writeln!(out, "{indent}}} else {{");
    let _ = writeln!(out, "{i1}/* We need to block here */");

    if cfg.context_mode == ContextMode::Optimized {
        out.push_str(&add_ctx_events(&i1, increment, "_continuation", carried_events, cfg.list_size));
        out.push_str(&add_ctx_vars(&i1, increment, "_continuation", carried_scalars, cfg.scratch_bytes));
    }

    let _ = writeln!(out, "{i1}_blockedNextJump = __LINE__ + 4;");
    let _ = writeln!(out, "{i1}goto blockedReturn;");
    let _ = writeln!(out, "{indent}}}");
    let _ = writeln!(out, "{indent}}} /* End of case statement */");
    let _ = writeln!(out, "{indent}case __LINE__: {{");
    let _ = writeln!(out, "{indent}/* _continuation always contains the context whether this was");
    let _ = writeln!(out, "{indent} * a fallthrough (saved above) or not (set in START_FUNC). Similarly,");
    let _ = writeln!(out, "{indent} * outChain contains whatever we were waiting on */");

    if cfg.context_mode == ContextMode::Checked {
        out.push_str(&extract_ctx_events(indent, "_continuation", carried_events, true, cfg.list_size));
        out.push_str(&extract_ctx_vars(indent, "_continuation", carried_scalars, true));
        if awaited.name != crate::symbols::IN_CHAIN {
            let _ = writeln!(out, "{indent}{} {} = NULL;", awaited.var_type, awaited.name);
        }
    }

    let _ = writeln!(out, "{indent}if (_fallthrough) {{");
    if cfg.context_mode == ContextMode::Checked {
        let _ = writeln!(out, "{i1}/* FREE _continuation->evtCtx */;");
        let _ = writeln!(out, "{i1}outChain = inChain;");
    } else {
        let _ = writeln!(out, "{i1}/* Nothing to do; continue execution */");
    }
    let _ = writeln!(out, "{indent}}} else {{");
    if cfg.context_mode == ContextMode::Optimized {
        out.push_str(&extract_ctx_events(&i1, "_continuation", carried_events, false, cfg.list_size));
        out.push_str(&extract_ctx_vars(&i1, "_continuation", carried_scalars, false));
    }
    let _ = writeln!(out, "{i1}{} = outChain;", awaited.name);
    let _ = writeln!(out, "{i1}/* FREE _continuation->evtCtx */;");
    let _ = writeln!(out, "{indent}}}");
    let _ = writeln!(out);
    let _ = writeln!(out, "{indent}/* *** END {macro_text} ***/");
    out
}

/// Serializes `evts` into a heap-allocated `pdEventList_t`, storing the
/// pointer into `<var_name>->evtCtx`.
fn add_ctx_events(indent: &str, increment: &str, var_name: &str, evts: &[ContextVar], list_size: usize) -> String {
    let mut out = String::new();
    let inner = format!("{indent}{increment}");

    let _ = writeln!(out, "{indent}{{");
    if evts.len() > list_size {
        let _ = writeln!(
            out,
            "{inner}pdEventList_t *_listEvt = /* ALLOCATE of SIZE pdEventList_t + ({} - {list_size})*sizeof(pdEvent_t*) */;",
            evts.len()
        );
    } else {
        let _ = writeln!(out, "{inner}pdEventList_t *_listEvt = /* ALLOCATE of SIZE pdEventList_t */;");
    }
    let _ = writeln!(out, "{inner}_listEvt->count = {};", evts.len());

    let mut slot = 0usize;
    let mut in_inline = true;
    for evt in evts {
        if in_inline && slot < list_size {
            let _ = writeln!(out, "{inner}_listEvt->events[{slot}] = {};", evt.name);
            slot += 1;
            if slot >= list_size {
                slot = 0;
                in_inline = false;
            }
        } else {
            let _ = writeln!(out, "{inner}_listEvt->next[{slot}] = {};", evt.name);
            slot += 1;
        }
    }

    let _ = writeln!(out, "{inner}{var_name}->evtCtx = _listEvt;");
    let _ = writeln!(out, "{indent}}}");
    out
}

/// Reverse of `add_ctx_events`.
fn extract_ctx_events(indent: &str, var_name: &str, evts: &[ContextVar], extract_type: bool, list_size: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{indent}pdEventList_t *_tlistEvt = {var_name}->evtCtx;");

    let mut slot = 0usize;
    let mut in_inline = true;
    for evt in evts {
        let ty_prefix = if extract_type { format!("{} ", evt.var_type) } else { String::new() };
        if in_inline && slot < list_size {
            if evt.name == crate::symbols::IN_CHAIN {
                let _ = writeln!(out, "{indent}inChain = _tlistEvt->events[{slot}];");
            } else {
                let _ = writeln!(out, "{indent}{ty_prefix}{} = _tlistEvt->events[{slot}];", evt.name);
            }
            slot += 1;
            if slot >= list_size {
                slot = 0;
                in_inline = false;
            }
        } else {
            if evt.name == crate::symbols::IN_CHAIN {
                let _ = writeln!(out, "{indent}inChain = _tlistEvt->next[{slot}];");
            } else {
                let _ = writeln!(out, "{indent}{ty_prefix}{} = _tlistEvt->next[{slot}];", evt.name);
            }
            slot += 1;
        }
    }
    out
}

/// Aligned stride for one scalar's storage: `(sizeof(T) + 7) & ~0x7`,
/// expressed as the literal C text the emitted pointer-advance uses.
fn aligned_advance(var_type: &str) -> String {
    format!("((sizeof({var_type}) + 7) & ~0x7)")
}

/// Packs `variables` into `<var_name>->scratch`.
///
/// The `COMPILE_ASSERT` this emits deliberately reproduces the
/// original tool's `& 0x7` size-check expression rather than the
/// aligned-up `& ~0x7` the advance itself uses — see the open question
/// in the design notes. This is not a bug to silently fix here.
fn add_ctx_vars(indent: &str, increment: &str, var_name: &str, variables: &[ContextVar], _scratch_bytes: usize) -> String {
    let mut out = String::new();
    let inner = format!("{indent}{increment}");

    let _ = writeln!(out, "{indent}{{");
    let _ = writeln!(out, "{inner}char* _tScratch = {var_name}->scratch;");

    let mut offsets = Vec::with_capacity(variables.len());
    for var in variables {
        let _ = writeln!(out, "{inner}*({}*)(_tScratch) = {};", var.var_type, var.name);
        let _ = writeln!(out, "{inner}_tScratch += {};", aligned_advance(&var.var_type));
        offsets.push(format!("((sizeof({}) + 7) & 0x7)", var.var_type));
    }

    let _ = writeln!(out, "{inner}/* If the following assert fails, you have too much context to save.");
    let _ = writeln!(out, "{inner} * Increase PDEVT_SCRATCH_BYTES or restrict the number of variables");
    let _ = writeln!(out, "{inner} * in the context */");
    let sum = if offsets.is_empty() { "0".to_string() } else { offsets.join("+") };
    let _ = writeln!(out, "{inner}COMPILE_ASSERT(({sum}) < PDEVT_SCRATCH_BYTES);");
    let _ = writeln!(out, "{indent}}}");
    out
}

/// Reverse of `add_ctx_vars`.
fn extract_ctx_vars(indent: &str, var_name: &str, variables: &[ContextVar], extract_type: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{indent}char* _tScratch = {var_name}->scratch;");
    for var in variables {
        let ty_prefix = if extract_type { var.var_type.as_str() } else { "" };
        let _ = writeln!(out, "{indent}{ty_prefix} {} = *({}*)_tScratch;", var.name, var.var_type);
        let _ = writeln!(out, "{indent}_tScratch += {};", aligned_advance(&var.var_type));
    }
    out
}

/// One hoisted declaration, emitted at function top in optimized mode.
pub fn hoisted_decl(increment: &str, var: &ContextVar) -> String {
    let decl = var.decl_line.as_deref().unwrap_or_default();
    format!("{increment}{decl} /* Hoisted; originally on line {} */\n", var.line_no)
}

/// The placeholder left in place of a hoisted declaration.
pub fn hoisted_placeholder(indent: &str, var_name: &str) -> String {
    format!("{indent}/* Variable '{var_name}' hoisted */\n")
}
