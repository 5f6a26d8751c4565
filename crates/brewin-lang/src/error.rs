use std::fmt;

/// Error codes prefixed by phase: L = lexer, P = parser, S = semantic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    // Lexer
    L001, // unexpected character
    L002, // unterminated string literal
    L003, // invalid escape sequence

    // Parser
    P001, // unexpected token
    P002, // missing expected token

    // Semantic
    S003, // function redefined with the same name and arity
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L001 => "L001",
            Self::L002 => "L002",
            Self::L003 => "L003",
            Self::P001 => "P001",
            Self::P002 => "P002",
            Self::S003 => "S003",
        }
    }
}

/// Front-end error: anything found before `main` starts running.
#[derive(Debug, Clone, thiserror::Error)]
#[error("[{}] {line}:{column}: {message}", .code.as_str())]
pub struct Error {
    pub code: ErrorCode,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl Error {
    pub fn new(code: ErrorCode, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self { code, line, column, message: message.into() }
    }
}

// ─────────────────────────────────────────────────────────────────────────────

/// The three fatal runtime error classes. None of them is recoverable from
/// inside a running program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unresolved variable, function, member or `main`; calling a non-callable.
    Name,
    /// Operand/condition kind mismatch, bad argument count or ref argument.
    Type,
    /// Division by zero, nil dereference, exhausted input, recursion limit.
    Fault,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name  => "name error",
            Self::Type  => "type error",
            Self::Fault => "fault",
        })
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("[runtime] {kind} at line {line}: {message}")]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub line: usize,
    pub message: String,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind, line: usize, message: impl Into<String>) -> Self {
        Self { kind, line, message: message.into() }
    }

    pub fn name(line: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Name, line, message)
    }

    pub fn type_error(line: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, line, message)
    }

    pub fn fault(line: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fault, line, message)
    }
}

// ─────────────────────────────────────────────────────────────────────────────

/// Either phase failing, for callers that compile and run in one step.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RunError {
    #[error("{}", join_lines(.0))]
    Compile(Vec<Error>),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl From<Vec<Error>> for RunError {
    fn from(errors: Vec<Error>) -> Self { Self::Compile(errors) }
}

fn join_lines(errors: &[Error]) -> String {
    errors.iter().map(Error::to_string).collect::<Vec<_>>().join("\n")
}
