//! Invocation & options
//!
//! Parses command-line arguments into a `Config` and an input file path.
//! Mirrors the original tool's `getopt` surface: short and long forms of
//! the same five options, `-m`/`-v` repeatable with last-value-wins
//! semantics, everything else a usage error.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, MacroName, MacroSizes};

#[derive(Debug, Parser)]
#[command(name = "pdevt-translator", disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    #[arg(short = 'h', long = "help", alias = "full-help")]
    help: bool,

    #[arg(short = 'd', long = "debug")]
    debug: bool,

    #[arg(short = 'f', long = "file")]
    file: Option<String>,

    #[arg(short = 'm', long = "mode", action = clap::ArgAction::Append)]
    mode: Vec<String>,

    #[arg(short = 'v', long = "var", action = clap::ArgAction::Append)]
    var: Vec<String>,
}

/// Usage-error class (§7 class 1): reported to stderr with a reference
/// to `-h`, exit code 2, without touching the input file.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    ArgParse(String),
    #[error("unknown value given to 'mode' parameter: '{0}'")]
    UnknownModeFlag(String),
    #[error("unknown variable name '{0}'")]
    UnknownVariable(String),
    #[error("illegal format for variable '{0}'; expected 'name=value' where value is a non-negative integer")]
    MalformedVar(String),
    #[error("missing input file")]
    MissingInputFile,
    #[error("could not open file '{0}' for reading: {1}")]
    FileOpen(String, std::io::Error),
}

/// Usage text printed for `-h`/`--help`/`--full-help`.
pub const USAGE: &str = "\
-h,--help,--full-help: Prints this message
-d,--debug:            Enable debug-level logging of this tool's own pipeline
-f,--file:              Input file to process. Should be a C file
-m,--mode:              A comma separated list of modes to generate the code.
                        One of:
                          optimized: hoist all context variables to the top
                                     of the function; no copies on the fast
                                     path
                          ctxcheck:  variables stay scoped to their
                                     continuation (default)
                        Optionally:
                          trace:     reserved for tracing instrumentation
                                     in the emitted code (default on)
-v,--var:               Values for a macro variable used in the generated C.
                        Currently supported:
                          PDEVT_SCRATCH_BYTES: scratch size per continuation
                                                (default 1024)
                          PDEVT_MERGE_SIZE:    events per merge event
                                                (default 4)
                          PDEVT_LIST_SIZE:     events per list event
                                                (default 4)
                        May be given multiple times; the last value for a
                        given name wins, e.g. -v PDEVT_SCRATCH_BYTES=2048
";

/// Outcome of a successful parse: either a request to print help, or a
/// fully validated configuration plus input file ready to translate.
#[derive(Debug)]
pub enum Invocation {
    Help,
    Translate { config: Config, input_path: PathBuf, debug: bool },
}

/// Parse `args` (excluding the program name is not required — pass the
/// full `std::env::args()` including argv[0], as `Cli::parse_from` expects).
pub fn parse<I, T>(args: I) -> Result<Invocation, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).map_err(|e| CliError::ArgParse(e.to_string()))?;

    if cli.help {
        return Ok(Invocation::Help);
    }

    let mut sizes = MacroSizes::default();
    for assignment in &cli.var {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| CliError::MalformedVar(assignment.clone()))?;
        let name = name.trim();
        let value: usize = value.trim().parse().map_err(|_| CliError::MalformedVar(assignment.clone()))?;
        let macro_name = MacroName::parse(name).ok_or_else(|| CliError::UnknownVariable(name.to_string()))?;
        sizes.set(macro_name, value);
    }

    let mut config = Config::from_sizes(sizes);
    let mut ctx_mode_set = false;
    let mut trace_set = false;
    for list in &cli.mode {
        for flag in list.split(',') {
            match flag.trim() {
                "optimized" => {
                    if ctx_mode_set {
                        log::warn!("setting the context mode multiple times, overriding with optimized");
                    }
                    config.context_mode = crate::config::ContextMode::Optimized;
                    ctx_mode_set = true;
                }
                "ctxcheck" => {
                    if ctx_mode_set {
                        log::warn!("setting the context mode multiple times, overriding with ctxcheck");
                    }
                    config.context_mode = crate::config::ContextMode::Checked;
                    ctx_mode_set = true;
                }
                "trace" => {
                    if trace_set {
                        log::warn!("setting the trace mode multiple times, overriding with on");
                    }
                    config.trace = true;
                    trace_set = true;
                }
                other => return Err(CliError::UnknownModeFlag(other.to_string())),
            }
        }
    }

    let file = cli.file.ok_or(CliError::MissingInputFile)?;
    let input_path = PathBuf::from(shellexpand_home(&file));
    std::fs::metadata(&input_path).map_err(|e| CliError::FileOpen(file.clone(), e))?;

    Ok(Invocation::Translate { config, input_path, debug: cli.debug })
}

/// Expand a leading `~` to `$HOME`, the one bit of path normalization
/// the original tool performed before opening the input file.
fn shellexpand_home(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return format!("{home}/{rest}");
        }
    }
    path.to_string()
}
