//! MyPL front-end driver
//!
//! Syntax-checks MyPL programs or dumps their token stream.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use mypl::{Diagnostic, Error, Lexer, Parser as MyplParser, TokenKind};

/// MyPL front end
#[derive(Parser, Debug)]
#[command(name = "mypl")]
#[command(version)]
#[command(about = "MyPL lexer and syntax checker")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input source file; standard input when omitted or `-`
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output format for tokens and diagnostics
    #[arg(long, value_enum, default_value = "text", global = true)]
    format: Format,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a source file for lexical and syntax errors
    Check {
        /// Input source file
        input: Option<PathBuf>,
    },
    /// Print the token stream of a source file
    Tokens {
        /// Input source file
        input: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    match &cli.command {
        Some(Commands::Check { input }) => check_file(input.as_deref(), cli.format),
        Some(Commands::Tokens { input }) => dump_tokens(input.as_deref(), cli.format),
        None => check_file(cli.input.as_deref(), cli.format),
    }
}

/// Open the input file, or standard input for `None` and `-`
fn open_input(input: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match input {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(io::stdin().lock())),
    }
}

/// Check a source file for errors without running it
fn check_file(input: Option<&Path>, format: Format) -> Result<ExitCode> {
    let reader = open_input(input)?;
    let parser = MyplParser::new(Lexer::new(reader));

    match parser.parse() {
        Ok(()) => {
            match format {
                Format::Text => println!("OK"),
                Format::Json => println!("{}", serde_json::json!({ "status": "ok" })),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => report(&e, format),
    }
}

/// Print every token up to EOS, or the first lexical error
fn dump_tokens(input: Option<&Path>, format: Format) -> Result<ExitCode> {
    let mut lexer = Lexer::new(open_input(input)?);

    loop {
        let token = match lexer.next_token() {
            Ok(token) => token,
            Err(e) => return report(&e, format),
        };
        match format {
            Format::Text => println!("{token}"),
            Format::Json => println!("{}", serde_json::to_string(&token)?),
        }
        if token.kind == TokenKind::Eos {
            return Ok(ExitCode::SUCCESS);
        }
    }
}

fn report(err: &Error, format: Format) -> Result<ExitCode> {
    match format {
        Format::Text => eprintln!("{err}"),
        Format::Json => println!("{}", serde_json::to_string(&Diagnostic::from(err))?),
    }
    Ok(ExitCode::FAILURE)
}
