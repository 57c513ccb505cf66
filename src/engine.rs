//! Function-scope state machine
//!
//! Drives the four recognized line patterns through the OUTSIDE/INSIDE
//! states described in §4.2: tracks whether a function is currently
//! being translated, owns its context-variable table and (in optimized
//! mode) its line buffer, and calls into the emitter on `WAIT_EVT`.

use crate::config::{Config, ContextMode};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::emitter::{self, WaitEmission};
use crate::line_matcher::{LineMatch, LineMatcher};
use crate::symbols::{ContextVar, SymbolTable};
use crate::wait_list;

/// State held while translating one `START_FUNC` .. `END_FUNC` span.
struct ActiveFunction {
    start_line: usize,
    symbols: SymbolTable,
    indent_increment: String,
    /// `Some` in optimized mode: every output line accumulates here
    /// until `END_FUNC`, when hoisted declarations are emitted first.
    buffer: Option<Vec<String>>,
}

impl ActiveFunction {
    fn start(line_no: usize, indent_increment: String, optimized: bool) -> Self {
        Self {
            start_line: line_no,
            symbols: SymbolTable::new(line_no),
            indent_increment,
            buffer: if optimized { Some(Vec::new()) } else { None },
        }
    }
}

/// Translates one file's worth of lines, line-oriented, single pass.
pub struct Engine {
    config: Config,
    matcher: LineMatcher,
    active: Option<ActiveFunction>,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Self { config, matcher: LineMatcher::new(), active: None }
    }

    /// Translate `source` to completion, reporting every diagnostic to
    /// `sink`. Always returns a string — even a file with reported
    /// structural errors produces best-effort output per §7.
    pub fn translate(&mut self, source: &str, sink: &mut dyn DiagnosticSink) -> String {
        let mut out = String::new();
        for (idx, raw_line) in source.lines().enumerate() {
            let line_no = idx + 1;
            self.process_line(line_no, raw_line, sink, &mut out);
        }
        if let Some(active) = &self.active {
            sink.report(Diagnostic::error(
                active.start_line,
                format!("START_FUNC on line {} has no matching END_FUNC", active.start_line),
            ));
        }
        out
    }

    fn process_line(&mut self, line_no: usize, raw_line: &str, sink: &mut dyn DiagnosticSink, out: &mut String) {
        match self.matcher.match_line(raw_line) {
            Some(LineMatch::StartFunc { .. }) => self.handle_start_func(line_no, raw_line, sink, out),
            Some(LineMatch::EndFunc { .. }) => self.handle_end_func(raw_line, out),
            Some(LineMatch::ContextDecl { indent, decl_line, var_type, var_name }) => {
                self.handle_context_decl(line_no, &indent, &decl_line, &var_type, &var_name, raw_line, sink, out)
            }
            Some(LineMatch::WaitEvt { indent, macro_text, num_evts, vars }) => {
                self.handle_wait_evt(line_no, &indent, &macro_text, num_evts, &vars, raw_line, sink, out)
            }
            None => self.push(format!("{raw_line}\n"), out),
        }
    }

    /// Appends an already newline-terminated line to the active
    /// function's buffer in optimized mode, or straight to `out`
    /// otherwise (checked mode, or no function currently open).
    fn push(&mut self, line: String, out: &mut String) {
        match self.active.as_mut().and_then(|a| a.buffer.as_mut()) {
            Some(buffer) => buffer.push(line),
            None => out.push_str(&line),
        }
    }

    fn handle_start_func(&mut self, line_no: usize, raw_line: &str, sink: &mut dyn DiagnosticSink, out: &mut String) {
        if let Some(active) = &self.active {
            sink.report(Diagnostic::error(
                line_no,
                format!(
                    "found START_FUNC on line {line_no} before intervening END_FUNC; previous START_FUNC on line {}",
                    active.start_line
                ),
            ));
            return;
        }
        let indent = leading_whitespace(raw_line);
        self.active = Some(ActiveFunction::start(line_no, indent, self.config.context_mode == ContextMode::Optimized));
        // START_FUNC is always emitted directly, never buffered; the buffer this may have just allocated starts empty.
        out.push_str(raw_line);
        out.push('\n');
    }

    fn handle_end_func(&mut self, raw_line: &str, out: &mut String) {
        match self.active.take() {
            None => {
                out.push_str(raw_line);
                out.push('\n');
            }
            Some(active) => {
                if let Some(buffer) = active.buffer {
                    for var in active.symbols.hoistable() {
                        out.push_str(&emitter::hoisted_decl(&active.indent_increment, var));
                    }
                    for line in buffer {
                        out.push_str(&line);
                    }
                }
                out.push_str(raw_line);
                out.push('\n');
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_context_decl(
        &mut self,
        line_no: usize,
        indent: &str,
        decl_line: &str,
        var_type: &str,
        var_name: &str,
        raw_line: &str,
        sink: &mut dyn DiagnosticSink,
        out: &mut String,
    ) {
        let Some(active) = self.active.as_mut() else {
            // Outside a function, a `__context` declaration is opaque text.
            out.push_str(raw_line);
            out.push('\n');
            return;
        };
        let var = ContextVar::new(var_name, var_type, Some(decl_line.to_string()), line_no);
        let buffered = active.buffer.is_some();
        if let Some(existing) = active.symbols.declare(var) {
            sink.report(Diagnostic::error(
                line_no,
                format!("variable '{var_name}' on line {line_no} is a duplicate; previous declaration on line {}", existing.line_no),
            ));
            return;
        }
        if buffered {
            self.push(emitter::hoisted_placeholder(indent, var_name), out);
        } else {
            self.push(format!("{indent}{decl_line}\n"), out);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_wait_evt(
        &mut self,
        line_no: usize,
        indent: &str,
        macro_text: &str,
        num_evts: usize,
        vars: &[String],
        raw_line: &str,
        sink: &mut dyn DiagnosticSink,
        out: &mut String,
    ) {
        let Some(active) = self.active.as_mut() else {
            out.push_str(raw_line);
            out.push('\n');
            return;
        };

        let outcome = match wait_list::classify(num_evts, vars, &active.symbols) {
            Ok(outcome) => outcome,
            Err(err) => {
                sink.report(Diagnostic::error(line_no, format!("{err} (used in WAIT_EVT on line {line_no})")));
                return;
            }
        };
        if outcome.in_chain_implied {
            sink.report(Diagnostic::warning(
                line_no,
                format!("'{}' is not present; adding as a context event (in WAIT_EVT on line {line_no})", crate::symbols::IN_CHAIN),
            ));
        }

        let resolve = |name: &str| active.symbols.get(name).cloned().expect("classify only returns known names");
        let awaited = resolve(&outcome.classification.awaited);
        let carried_events: Vec<ContextVar> = outcome.classification.carried_events.iter().map(|n| resolve(n)).collect();
        let carried_scalars: Vec<ContextVar> = outcome.classification.carried_scalars.iter().map(|n| resolve(n)).collect();

        let fragment = emitter::emit_wait(
            &self.config,
            &WaitEmission {
                macro_text,
                indent,
                increment: &active.indent_increment,
                awaited: &awaited,
                carried_events: &carried_events,
                carried_scalars: &carried_scalars,
            },
        );
        self.push(fragment, out);
    }
}

fn leading_whitespace(line: &str) -> String {
    line.chars().take_while(|c| c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;

    fn translate(source: &str, config: Config) -> (String, CollectingSink) {
        let mut engine = Engine::new(config);
        let mut sink = CollectingSink::new();
        let out = engine.translate(source, &mut sink);
        (out, sink)
    }

    #[test]
    fn empty_function_passes_through_unchanged() {
        let src = "START_FUNC(f);\nEND_FUNC;\n";
        for mode in [ContextMode::Checked, ContextMode::Optimized] {
            let mut cfg = Config::default();
            cfg.context_mode = mode;
            let (out, sink) = translate(src, cfg);
            assert_eq!(out, src, "mode {mode:?}");
            assert_eq!(sink.error_count(), 0);
        }
    }

    #[test]
    fn optimized_mode_hoists_context_variable() {
        let src = "START_FUNC(f);\n    __context int *p;\nEND_FUNC;\n";
        let mut cfg = Config::default();
        cfg.context_mode = ContextMode::Optimized;
        let (out, sink) = translate(src, cfg);
        assert_eq!(sink.error_count(), 0);
        assert!(out.contains("int *p; /* Hoisted; originally on line 2 */"));
        assert!(out.contains("/* Variable 'p' hoisted */"));
    }

    #[test]
    fn checked_mode_emits_declaration_in_place_without_hoisting() {
        let src = "START_FUNC(f);\n    __context int *p;\nEND_FUNC;\n";
        let cfg = Config::default();
        let (out, sink) = translate(src, cfg);
        assert_eq!(sink.error_count(), 0);
        assert!(out.contains("    int *p;\n"));
        assert!(!out.contains("Hoisted"));
    }

    #[test]
    fn duplicate_context_variable_is_reported_with_both_lines() {
        let src = "START_FUNC(f);\n    __context int *p;\n    __context int *p;\nEND_FUNC;\n";
        let cfg = Config::default();
        let (_out, sink) = translate(src, cfg);
        assert_eq!(sink.error_count(), 1);
        assert!(sink.diagnostics[0].message.contains("duplicate"));
        assert_eq!(sink.diagnostics[0].line, 3);
    }

    #[test]
    fn nested_start_func_is_reported() {
        let src = "START_FUNC(f);\nSTART_FUNC(g);\nEND_FUNC;\n";
        let cfg = Config::default();
        let (_out, sink) = translate(src, cfg);
        assert_eq!(sink.error_count(), 1);
        assert!(sink.diagnostics[0].message.contains("before intervening END_FUNC"));
    }

    #[test]
    fn unterminated_function_is_reported() {
        let src = "START_FUNC(f);\n";
        let cfg = Config::default();
        let (_out, sink) = translate(src, cfg);
        assert_eq!(sink.error_count(), 1);
        assert!(sink.diagnostics[0].message.contains("no matching END_FUNC"));
    }

    #[test]
    fn single_event_wait_with_in_chain() {
        let src = "START_FUNC(f);\n    WAIT_EVT1(inChain);\nEND_FUNC;\n";
        let cfg = Config::default();
        let (out, sink) = translate(src, cfg);
        assert_eq!(sink.error_count(), 0);
        assert!(out.contains("outChain = (pdEvent_t*)inChain;"));
        assert!(out.contains("case __LINE__: {"));
        assert!(out.contains("inChain = outChain;"));
    }

    #[test]
    fn wait_with_carried_scalars_packs_scratch() {
        let src = "START_FUNC(f);\n    __context int *a;\n    __context int *b;\n    WAIT_EVT1(inChain, a, b);\nEND_FUNC;\n";
        let cfg = Config::default();
        let (out, sink) = translate(src, cfg);
        assert_eq!(sink.error_count(), 0);
        assert!(out.contains("*(int**)(_tScratch) = a;"));
        assert!(out.contains("*(int**)(_tScratch) = b;"));
    }

    #[test]
    fn wait_list_overflow_uses_extended_list_allocation() {
        let mut src = String::from("START_FUNC(f);\n");
        for i in 0..6 {
            src.push_str(&format!("    __context pdEvent_t *e{i};\n"));
        }
        src.push_str("    WAIT_EVT1(inChain, e0, e1, e2, e3, e4, e5);\n");
        src.push_str("END_FUNC;\n");
        let cfg = Config::default();
        let (out, sink) = translate(&src, cfg);
        assert_eq!(sink.error_count(), 0);
        assert!(out.contains("pdEventList_t + (6 - 4)*sizeof(pdEvent_t*)"));
        assert!(out.contains("_listEvt->next[0] = e4;"));
        assert!(out.contains("_listEvt->next[1] = e5;"));
    }

    #[test]
    fn missing_in_chain_in_wait_list_is_a_warning_not_an_error() {
        let src = "START_FUNC(f);\n    __context pdEvent_t *myEvt;\n    WAIT_EVT1(myEvt);\nEND_FUNC;\n";
        let cfg = Config::default();
        let (out, sink) = translate(src, cfg);
        assert_eq!(sink.error_count(), 0);
        assert_eq!(sink.warning_count(), 1);
        assert!(out.contains("outChain = (pdEvent_t*)myEvt;"));
    }

    #[test]
    fn opaque_lines_pass_through_byte_identical() {
        let src = "START_FUNC(f);\n    int total = compute(a, b);\nEND_FUNC;\n";
        let cfg = Config::default();
        let (out, sink) = translate(src, cfg);
        assert_eq!(sink.error_count(), 0);
        assert!(out.contains("    int total = compute(a, b);\n"));
    }
}
