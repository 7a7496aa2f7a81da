use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::{Parser as CliParser, ValueEnum};
use eyre::WrapErr;
use log::LevelFilter;
use monkey::ast::Statement;
use monkey::evaluator::Evaluator;
use monkey::lexer::Lexer;
use monkey::object::{Environment, Object};
use monkey::parser::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const PROMPT: &str = ">> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Parse and evaluate every line
    Eval,
    /// Print the tokens of every line
    Tokens,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Interpreter for the Monkey programming language.
#[derive(Debug, CliParser)]
#[command(name = "monkey", version, about)]
struct Args {
    #[arg(long, value_enum, default_value_t = Mode::Eval)]
    mode: Mode,

    /// Verbosity of the log written to stderr
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    /// Scripts run one after another in a shared environment. Starts the REPL when empty.
    files: Vec<PathBuf>,
}

fn init_logging(level: LevelFilter) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

#[derive(Debug, PartialEq)]
enum Outcome {
    Value(String),
    Nothing,
    ParseErrors(Vec<String>),
    RuntimeError(String),
}

/// One global environment shared by every line or script.
struct Session {
    evaluator: Evaluator,
    env: Rc<RefCell<Environment>>,
    mode: Mode,
}

impl Session {
    fn new(mode: Mode) -> Self {
        Self {
            evaluator: Evaluator::new(),
            env: Environment::new(),
            mode,
        }
    }

    fn run(&self, input: &str) -> Outcome {
        match self.mode {
            Mode::Tokens => {
                let tokens = Lexer::tokenize(input)
                    .into_iter()
                    .map(|t| format!("{{Type:{:?} Literal:{}}}", t.token_type, t.literal))
                    .collect::<Vec<_>>();
                if tokens.is_empty() {
                    Outcome::Nothing
                } else {
                    Outcome::Value(tokens.join("\n"))
                }
            }
            Mode::Eval => {
                let mut parser = Parser::new(Lexer::new(input));
                let program = parser.parse_program();
                if !parser.errors().is_empty() {
                    return Outcome::ParseErrors(parser.errors().to_vec());
                }
                let res = self.evaluator.eval_program(&program, &self.env);
                match &*res {
                    Object::Error(msg) => Outcome::RuntimeError(msg.clone()),
                    Object::Null
                        if matches!(
                            program.statements.last(),
                            None | Some(Statement::LetStmt { .. })
                        ) =>
                    {
                        Outcome::Nothing
                    }
                    _ => Outcome::Value(res.inspect()),
                }
            }
        }
    }
}

fn run_prompt(session: &Session) -> eyre::Result<()> {
    println!("Monkey lang");
    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                match session.run(&line) {
                    Outcome::Value(v) => println!("{}", v),
                    Outcome::Nothing => {}
                    Outcome::ParseErrors(errs) => {
                        for err in errs {
                            println!("Error: {}", err);
                        }
                    }
                    Outcome::RuntimeError(msg) => println!("ERROR: {}", msg),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                log::error!("readline failed: {}", err);
                return Err(err.into());
            }
        }
    }
    Ok(())
}

fn run_files(session: &Session, files: &[PathBuf]) -> eyre::Result<()> {
    for path in files {
        let source = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        log::info!("running {}", path.display());
        match session.run(&source) {
            Outcome::Value(v) if session.mode == Mode::Tokens => println!("{}", v),
            Outcome::Value(_) | Outcome::Nothing => {}
            Outcome::ParseErrors(errs) => {
                eyre::bail!("{}: parse failed:\n{}", path.display(), errs.join("\n"))
            }
            Outcome::RuntimeError(msg) => eyre::bail!("{}: ERROR: {}", path.display(), msg),
        }
    }
    Ok(())
}

fn main() -> eyre::Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.into())?;
    let session = Session::new(args.mode);
    if args.files.is_empty() {
        run_prompt(&session)
    } else {
        run_files(&session, &args.files)
    }
}
