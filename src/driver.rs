use anyhow::anyhow;
use clap::Parser;
use env_logger::Env;
use line_numbers::LinePositions;
use log::info;
use std::path::{Path, PathBuf};
use tinyc::parser::{DEFAULT_MAX_DEPTH, ParserConfig};
use tinyc::{Error, Stage, read_input, run};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(short = 'd', long = "debug", action)]
    debug: bool,

    #[arg(short = 'v', long = "verbose", action)]
    verbose: bool,

    #[arg(short = 'q', long = "quiet", action)]
    quiet: bool,

    /// Path to the file(s) to be parsed
    #[arg(value_name = "FILE", required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// Stop after lexing and print the tokens
    #[arg(long)]
    lex: bool,

    /// Stop after parsing and print the AST (default)
    #[arg(long, conflicts_with = "lex")]
    parse: bool,

    /// Maximum nesting depth of expressions, statements and initializers
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match (cli.debug, cli.verbose, cli.quiet) {
        (_, _, true) => "error",
        (true, _, _) => "debug",
        (_, true, _) => "info",
        (_, _, _) => "warn",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let stage = match (cli.lex, cli.parse) {
        (true, false) => Stage::Lex,
        _ => Stage::Parse,
    };
    let config = ParserConfig {
        max_depth: cli.max_depth,
        ..ParserConfig::default()
    };

    for input_filename in &cli.input {
        let output = process_file(input_filename, stage, &config)?;
        print!("{output}");
    }

    Ok(())
}

fn process_file(input_filename: &Path, stage: Stage, config: &ParserConfig) -> anyhow::Result<String> {
    let input = read_input(input_filename)?;
    info!("Processing input file: {}", input_filename.display());

    run(&input, input_filename, stage, config).map_err(|e| {
        let phase = match &e {
            Error::Lexer(_) => "Lexer",
            Error::Parser(_) => "Parser",
            Error::Io { .. } => return anyhow!("Error: {e}"),
        };
        match e.offset() {
            Some(offset) => {
                let line_positions = LinePositions::from(input.as_str());
                let (line_num, column) = line_positions.from_offset(offset);
                anyhow!(
                    "{phase} error in {file} at line {line_num}, column {column}: {e}",
                    file = input_filename.display(),
                    line_num = line_num.display(),
                    column = column + 1
                )
            }
            None => anyhow!("Error: {e}"),
        }
    })
}
