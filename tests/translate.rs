//! End-to-end scenarios exercising the public `translate_source` entry
//! point against the seven documented cases, one test per scenario.
//! Checks structural shape (`contains`) rather than full-file diffs,
//! since the emitted comment wording is not itself a contract.

use pdevt_translator::config::{Config, ContextMode, MacroSizes};
use pdevt_translator::diagnostics::CollectingSink;
use pdevt_translator::DiagnosticSink;
use pdevt_translator::translate_source;

fn checked() -> Config {
    Config::default()
}

fn optimized() -> Config {
    let mut cfg = Config::default();
    cfg.context_mode = ContextMode::Optimized;
    cfg
}

#[test]
fn empty_function_is_unchanged_in_both_modes() {
    let src = "START_FUNC(task);\nEND_FUNC;\n";
    for cfg in [checked(), optimized()] {
        let mut sink = CollectingSink::new();
        let out = translate_source(src, &cfg, &mut sink);
        assert_eq!(out, src);
        assert_eq!(sink.error_count(), 0);
    }
}

#[test]
fn single_context_variable_is_hoisted_or_left_in_place() {
    let src = "START_FUNC(task);\n    __context int *p;\nEND_FUNC;\n";

    let mut sink = CollectingSink::new();
    let out = translate_source(src, &optimized(), &mut sink);
    assert!(out.contains("int *p; /* Hoisted; originally on line 2 */\n"));
    assert!(out.contains("/* Variable 'p' hoisted */"));
    assert_eq!(sink.error_count(), 0);

    let mut sink = CollectingSink::new();
    let out = translate_source(src, &checked(), &mut sink);
    assert!(out.contains("    int *p;\n"));
    assert!(!out.contains("hoisted"));
    assert_eq!(sink.error_count(), 0);
}

#[test]
fn single_event_wait_with_in_chain_emits_dispatch_scaffold() {
    let src = "START_FUNC(task);\n    WAIT_EVT1(inChain);\nEND_FUNC;\n";
    let mut sink = CollectingSink::new();
    let out = translate_source(src, &checked(), &mut sink);
    assert_eq!(sink.error_count(), 0);
    assert!(out.contains("outChain = (pdEvent_t*)inChain;"));
    assert!(out.contains("if (outChain->properties & PDEVT_IS_READY)"));
    assert!(out.contains("case __LINE__: {"));
    assert!(out.contains("inChain = outChain;"));
}

#[test]
fn wait_with_one_event_and_two_carried_scalars_packs_scratch_symmetrically() {
    let src = "START_FUNC(task);\n    __context int *a;\n    __context long *b;\n    WAIT_EVT1(inChain, a, b);\nEND_FUNC;\n";
    let mut sink = CollectingSink::new();
    let out = translate_source(src, &checked(), &mut sink);
    assert_eq!(sink.error_count(), 0);
    // inChain is the awaited event here, not a carried one, so the saved
    // event list is empty: inChain is the function's resume parameter and
    // needs no context-save slot of its own.
    assert!(out.contains("_listEvt->count = 0;"));
    assert!(out.contains("*(int**)(_tScratch) = a;"));
    assert!(out.contains("*(long**)(_tScratch) = b;"));
    assert!(out.contains("_tScratch += ((sizeof(int*) + 7) & ~0x7);"));
}

#[test]
fn wait_list_longer_than_list_size_overflows_into_next_array() {
    let mut src = String::from("START_FUNC(task);\n");
    for i in 0..6 {
        src.push_str(&format!("    __context pdEvent_t *e{i};\n"));
    }
    src.push_str("    WAIT_EVT1(inChain, e0, e1, e2, e3, e4, e5);\n");
    src.push_str("END_FUNC;\n");

    let mut sizes = MacroSizes::default();
    sizes.list_size = 4;
    let cfg = Config::from_sizes(sizes);

    let mut sink = CollectingSink::new();
    let out = translate_source(&src, &cfg, &mut sink);
    assert_eq!(sink.error_count(), 0);
    for i in 0..4 {
        assert!(out.contains(&format!("_listEvt->events[{i}] = e{i};")));
    }
    assert!(out.contains("_listEvt->next[0] = e4;"));
    assert!(out.contains("_listEvt->next[1] = e5;"));
    assert!(out.contains("pdEventList_t + (6 - 4)*sizeof(pdEvent_t*)"));
}

#[test]
fn duplicate_context_variable_is_reported_against_both_line_numbers() {
    let src = "START_FUNC(task);\n    __context int *p;\n    __context int *p;\nEND_FUNC;\n";
    let mut sink = CollectingSink::new();
    translate_source(src, &checked(), &mut sink);
    assert_eq!(sink.error_count(), 1);
    let diag = &sink.diagnostics[0];
    assert_eq!(diag.line, 3);
    assert!(diag.message.contains("duplicate"));
    assert!(diag.message.contains("line 2"));
}

#[test]
fn nested_start_func_is_reported_against_the_prior_start_line() {
    let src = "START_FUNC(outer);\nSTART_FUNC(inner);\nEND_FUNC;\n";
    let mut sink = CollectingSink::new();
    translate_source(src, &checked(), &mut sink);
    assert_eq!(sink.error_count(), 1);
    assert!(sink.diagnostics[0].message.contains("previous START_FUNC on line 1"));
}

#[test]
fn opaque_surrounding_code_is_preserved_verbatim() {
    let src = "#include \"task.h\"\n\nSTART_FUNC(task);\n    int n = compute();\nEND_FUNC;\n\nvoid unrelated(void) {}\n";
    let mut sink = CollectingSink::new();
    let out = translate_source(src, &checked(), &mut sink);
    assert_eq!(sink.error_count(), 0);
    assert!(out.starts_with("#include \"task.h\"\n\n"));
    assert!(out.contains("    int n = compute();\n"));
    assert!(out.ends_with("void unrelated(void) {}\n"));
}
