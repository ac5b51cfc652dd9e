// ABOUTME: CLI entry point: REPL driver and script runner

use clap::Parser;
use cloje::config::{
    HELP_TEXT, HISTORY_FILE, PROMPT, VERSION, WELCOME_FOOTER, WELCOME_MESSAGE, WELCOME_SUBTITLE,
};
use cloje::error::EvalError;
use cloje::highlighter::LispHelper;
use cloje::interpreter::Interpreter;
use cloje::parser::parse_source;
use cloje::plugins;
use cloje::registry::Registry;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use std::path::PathBuf;
use std::process::ExitCode;

/// Clojure-flavored Lisp interpreter
#[derive(Parser, Debug)]
#[command(name = "cloje")]
#[command(version = VERSION)]
#[command(about = "A Clojure-flavored Lisp interpreter")]
#[command(long_about = "Runs a script file, a single expression, or an interactive REPL")]
struct CliArgs {
    /// Script file to execute (omit to start the REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Evaluate one expression and print its value
    #[arg(short = 'e', long = "eval", value_name = "EXPR")]
    expr: Option<String>,

    /// Start with the core builtins only, skipping bundled plugins
    #[arg(long = "no-plugins")]
    no_plugins: bool,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let interp = match build_interpreter(args.no_plugins) {
        Ok(interp) => interp,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    if let Some(expr) = &args.expr {
        return match interp.eval_source(expr) {
            Ok(value) => {
                println!("{}", value.pr_str());
                ExitCode::SUCCESS
            }
            Err(err) => {
                report(&err);
                ExitCode::FAILURE
            }
        };
    }

    if let Some(path) = &args.script {
        return match run_script(&interp, path) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                report(&err);
                ExitCode::FAILURE
            }
        };
    }

    match repl(&interp) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn build_interpreter(no_plugins: bool) -> Result<Interpreter, EvalError> {
    let mut registry = Registry::with_core()?;
    if !no_plugins {
        plugins::install_all(&mut registry)?;
    }
    Ok(Interpreter::new(registry))
}

fn report(err: &EvalError) {
    match err.position() {
        Some(pos) => eprintln!("error at {}: {}", pos, err),
        None => eprintln!("error: {}", err),
    }
}

/// Execute every top-level form of a script in order; the first error
/// aborts the run.
fn run_script(interp: &Interpreter, path: &PathBuf) -> Result<(), EvalError> {
    let source = std::fs::read_to_string(path).map_err(|err| {
        EvalError::argument_error("script", format!("cannot read {}: {}", path.display(), err))
    })?;
    let exprs = parse_source(&source)?;
    let mut ev = interp.evaluator();
    for expr in &exprs {
        ev.eval(expr)?;
    }
    Ok(())
}

fn repl(interp: &Interpreter) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<LispHelper, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(LispHelper::new()));
    let _ = rl.load_history(HISTORY_FILE);

    println!("{}", WELCOME_MESSAGE);
    println!("{}", WELCOME_SUBTITLE);
    println!("{}", WELCOME_FOOTER);

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match trimmed {
                    "(quit)" | "(exit)" => {
                        println!("Goodbye!");
                        break;
                    }
                    "(clear)" => {
                        print!("\x1B[2J\x1B[H");
                        continue;
                    }
                    "(help)" => {
                        termimad::print_text(HELP_TEXT);
                        match interp.eval_source("(help)") {
                            Ok(_) => {}
                            Err(err) => report(&err),
                        }
                        continue;
                    }
                    _ => {}
                }

                match interp.eval_source(&line) {
                    Ok(value) => println!("=> {}", value.pr_str()),
                    Err(err) => report(&err),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("error: {}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(HISTORY_FILE);
    Ok(())
}
