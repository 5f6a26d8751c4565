pub mod syntax;
pub mod types;
pub mod runtime;
pub mod analysis;
pub mod error;
pub mod namespaces;
pub mod io;
pub mod stack;

pub use error::{Error, ErrorCode, ErrorKind, RunError, RuntimeError};
pub use syntax::token::{Token, TokenKind};
pub use runtime::value::Value;
pub use runtime::interpreter::{ExecStatus, Interpreter};
pub use io::{BufferIo, Io, StdIo};
pub use analysis::FunctionTable;

use crate::syntax::ast::Program as AstProgram;
use analysis::resolve;

// ─── Public API types ─────────────────────────────────────────────────────────

/// Interpreter settings.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Maximum nesting of function and closure calls, `main` included.
    /// `None` leaves recursion bounded only by memory.
    pub max_call_depth: Option<usize>,
}

/// A checked Brewin program: its AST plus the function table built from it.
pub struct Program {
    pub(crate) ast: AstProgram,
    pub(crate) functions: FunctionTable,
}

impl Program {
    /// Build the function table for an AST produced by any front end.
    pub fn from_ast(ast: AstProgram) -> Result<Self, Vec<Error>> {
        let functions = resolve(&ast)?;
        Ok(Self { ast, functions })
    }
}

// ─── Public API ───────────────────────────────────────────────────────────────

/// Lex, parse and collect functions. Returns every front-end error found.
pub fn compile(source: &str) -> Result<Program, Vec<Error>> {
    let tokens = syntax::lexer::Lexer::new(source).tokenize()?;
    let ast = syntax::parser::Parser::new(tokens).parse()?;
    Program::from_ast(ast)
}

/// Compile `source` and run its `main` against `io`.
pub fn run(source: &str, io: &mut dyn Io, options: Options) -> Result<(), RunError> {
    let program = compile(source)?;
    Interpreter::new(&program, io).with_options(options).run()?;
    Ok(())
}
