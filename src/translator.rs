//! Library interface
//!
//! The two entry points a caller (the CLI, or an embedding program)
//! needs: translate a string in memory, or translate a file on disk to
//! its `_pp.c` counterpart. Everything else in this crate is reachable
//! only through these two functions.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::diagnostics::DiagnosticSink;
use crate::engine::Engine;

/// Translate `source` in memory, reporting diagnostics to `sink`.
///
/// Always returns the best-effort output, even if `sink.had_errors()`
/// afterwards — the caller decides what that means for its exit status.
pub fn translate_source(source: &str, config: &Config, sink: &mut dyn DiagnosticSink) -> String {
    Engine::new(*config).translate(source, sink)
}

/// Translate the file at `input_path`, writing the result to a
/// uniquely-named temporary file in the same directory and then
/// persisting it to `<input-basename>_pp.c`. Returns the path written.
///
/// Errors from opening or writing files are distinct from the
/// structural parse errors reported through `sink`: an `Err` here means
/// the translation did not complete at all.
pub fn translate_file(input_path: &Path, config: &Config, sink: &mut dyn DiagnosticSink) -> std::io::Result<PathBuf> {
    let source = std::fs::read_to_string(input_path)?;
    let output = translate_source(&source, config, sink);

    let dir = input_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new().prefix(".pdevtpp").suffix(".c").tempfile_in(dir)?;
    tmp.write_all(output.as_bytes())?;

    let dest = output_path_for(input_path);
    tmp.persist(&dest).map_err(|e| e.error)?;
    Ok(dest)
}

/// `foo.c` -> `foo_pp.c`; a name with no `.c` suffix just gets `_pp.c` appended.
fn output_path_for(input_path: &Path) -> PathBuf {
    let name = input_path.to_string_lossy();
    let replaced = match name.strip_suffix(".c") {
        Some(stem) => format!("{stem}_pp.c"),
        None => format!("{name}_pp.c"),
    };
    PathBuf::from(replaced)
}
