pub mod ast;
mod cursor;
pub mod lexer;
pub mod parser;

pub use cursor::TokenSource;

use ast::CompUnit;
use lexer::Lexer;
use parser::ParserConfig;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O: {path}")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error(transparent)]
    Lexer(#[from] lexer::LexerError),

    #[error(transparent)]
    Parser(#[from] parser::ParserError),
}

impl Error {
    /// Byte offset into the source, when the error has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Io { .. } => None,
            Error::Lexer(e) => Some(e.offset),
            Error::Parser(e) => Some(e.offset),
        }
    }
}

/// How far to take the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    Lex,
    #[default]
    Parse,
}

pub fn read_input(input_filename: &Path) -> Result<String, Error> {
    log::info!("Reading input file: {}", input_filename.display());
    let input = fs::read_to_string(input_filename).map_err(|e| Error::Io {
        source: e,
        path: input_filename.to_path_buf(),
    })?;
    Ok(input)
}

/// Lex and parse `input` with the default configuration.
pub fn parse_source(input: &str) -> Result<CompUnit, Error> {
    Ok(parser::parse(Lexer::new(input))?)
}

/// Take `input` up to `stage` and render the result: one token per line for
/// [`Stage::Lex`], the AST for [`Stage::Parse`].
pub fn run(
    input: &str,
    input_filename: &Path,
    stage: Stage,
    config: &ParserConfig,
) -> Result<String, Error> {
    let output = match stage {
        Stage::Lex => {
            log::info!("Lexing input file: {}", input_filename.display());
            let tokens = lexer::lex(input)?;
            log::debug!("Lexed {} tokens", tokens.len());
            tokens
                .iter()
                .map(|token| {
                    format!(
                        "{:>5}..{:<5} {}\n",
                        token.span.start, token.span.end, token.kind
                    )
                })
                .collect()
        }
        Stage::Parse => {
            log::info!("Parsing input file: {}", input_filename.display());
            let ast = parser::parse_with_config(Lexer::new(input), config)?;
            log::debug!("AST: {ast:#?}");
            ast.to_string()
        }
    };

    Ok(output)
}
