//! Scorekeep CLI entry point: the formula REPL.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use scorekeep_runtime::{Reply, Repl};
use tracing_subscriber::EnvFilter;

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    template: Option<PathBuf>,
    eval: Vec<String>,
    show_help: bool,
    show_version: bool,
    verbosity: u8,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    let mut args = args.into_iter().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-v" | "--verbose" => config.verbosity = config.verbosity.saturating_add(1),
            "-vv" => config.verbosity = config.verbosity.saturating_add(2),
            "-e" | "--eval" => {
                let formula = args.next().ok_or("--eval requires a formula")?;
                config.eval.push(formula);
            }
            other if other.starts_with('-') => {
                return Err(format!("unknown option: {other}").into());
            }
            path => {
                if config.template.is_some() {
                    return Err("only one template may be loaded".into());
                }
                config.template = Some(PathBuf::from(path));
            }
        }
    }

    Ok(config)
}

/// Logs go to stderr. `RUST_LOG` overrides the verbosity flags.
fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args(args)?;

    if config.show_help {
        print_help();
        return Ok(());
    }

    if config.show_version {
        println!("scorekeep {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_tracing(config.verbosity);

    let mut repl = Repl::new()?;
    if let Some(path) = &config.template {
        println!("{}", repl.load_template(path)?);
        repl = repl.without_banner();
    }

    // Batch mode: evaluate and exit.
    if !config.eval.is_empty() {
        for line in &config.eval {
            match repl.eval(line)? {
                Reply::Value(value) => println!("{value}"),
                Reply::Message(text) => println!("{text}"),
                Reply::Quit => break,
            }
        }
        return Ok(());
    }

    repl.run()?;
    Ok(())
}

fn print_help() {
    println!(
        "\x1b[1mScorekeep\x1b[0m - Scoring formula REPL

\x1b[1mUSAGE:\x1b[0m
    scorekeep [OPTIONS] [TEMPLATE]

\x1b[1mARGUMENTS:\x1b[0m
    [TEMPLATE]    JSON template to load before starting the REPL

\x1b[1mOPTIONS:\x1b[0m
    -h, --help            Print help information
    -V, --version         Print version information
    -v, --verbose         Log engine decisions (repeat for trace output)
    -e, --eval <LINE>     Evaluate a formula or command and exit (repeatable)

\x1b[1mENVIRONMENT:\x1b[0m
    RUST_LOG              Log filter, overrides -v (e.g. scorekeep_engine=debug)

\x1b[1mEXAMPLES:\x1b[0m
    scorekeep                                  Start the REPL
    scorekeep game.json                        Load game.json, then start the REPL
    scorekeep game.json -e '{{Victory Points}}'  Evaluate one formula
    scorekeep game.json -e :lint               Check every formula in the template

\x1b[1mREPL COMMANDS:\x1b[0m
    :load <path>         Load a template
    :check <formula>     Check syntax and references
    :refs <formula>      List references and what they resolve to
    :lint                Check every formula in the loaded template
    :quit                Exit (also Ctrl+D)
    Ctrl+C               Cancel current input"
    );
}
