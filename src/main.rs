use std::process::ExitCode;

use pdevt_translator::cli::{self, CliError, Invocation};
use pdevt_translator::diagnostics::{DiagnosticSink, LoggingSink};
use pdevt_translator::translator::translate_file;

fn main() -> ExitCode {
    let args: Vec<_> = std::env::args().collect();
    let debug = args.iter().any(|a| a == "-d" || a == "--debug");
    init_logging(debug);

    match cli::parse(args) {
        Ok(Invocation::Help) => {
            print!("{}", cli::USAGE);
            ExitCode::from(2)
        }
        Ok(Invocation::Translate { config, input_path, debug }) => {
            if debug {
                log::set_max_level(log::LevelFilter::Debug);
            }
            run(&config, &input_path)
        }
        Err(err) => {
            report_usage_error(&err);
            ExitCode::from(2)
        }
    }
}

fn run(config: &pdevt_translator::Config, input_path: &std::path::Path) -> ExitCode {
    let mut sink = LoggingSink::new();
    match translate_file(input_path, config, &mut sink) {
        Ok(dest) => {
            log::info!("wrote {}", dest.display());
            if sink.had_errors() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            eprintln!("pdevt-translator: {}: {err}", input_path.display());
            ExitCode::from(2)
        }
    }
}

fn report_usage_error(err: &CliError) {
    eprintln!("pdevt-translator: {err}");
    eprintln!("Try 'pdevt-translator -h' for usage.");
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).format_timestamp(None).init();
}
