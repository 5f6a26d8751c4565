use std::rc::Rc;

/// Source location attached to every node for error reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

// ─── Top level ───────────────────────────────────────────────────────────────

/// A whole source file: the ordered list of `func` definitions.
#[derive(Debug, Clone)]
pub struct Program {
    pub functions: Vec<Rc<FuncDef>>,
}

// ─── Functions ───────────────────────────────────────────────────────────────

/// A named `func` or an anonymous `lambda`. Lambdas are named `"lambda"`.
/// Shared through `Rc` so function and closure values can point at their
/// definition without copying the body.
#[derive(Debug, Clone)]
pub struct FuncDef {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl FuncDef {
    pub fn arity(&self) -> usize { self.params.len() }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    /// `ref x`: the caller's variable receives the final value on return.
    pub by_ref: bool,
    pub span: Span,
}

// ─── Statements ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Stmt {
    /// `x = e;` or `a.b.c = e;`
    Assign(Assign),
    /// `f(args);` or `obj.m(args);`
    Call(Expr),
    /// `if (cond) { } else { }`
    If(IfStmt),
    /// `while (cond) { }`
    While(WhileStmt),
    /// `return e;` or bare `return;`
    Return(Option<Expr>, Span),
}

impl Stmt {
    pub fn span(&self) -> &Span {
        match self {
            Stmt::Assign(a)      => &a.span,
            Stmt::Call(e)        => e.span(),
            Stmt::If(i)          => &i.span,
            Stmt::While(w)       => &w.span,
            Stmt::Return(_, s)   => s,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Assign {
    /// Dotted path: `["x"]` for `x = …`, `["o", "f"]` for `o.f = …`
    pub target: Vec<String>,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Vec<Stmt>,
    pub else_block: Option<Vec<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

// ─── Expressions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Expr {
    Int(i64, Span),
    Bool(bool, Span),
    StringLit(String, Span),
    Nil(Span),
    Var(String, Span),
    /// `@`: a fresh object with no fields and a nil prototype.
    NewObject(Span),
    /// `obj.field`
    Member {
        object: Box<Expr>,
        field: String,
        span: Span,
    },
    /// `name(args)`
    Call {
        callee: String,
        args: Vec<Expr>,
        span: Span,
    },
    /// `obj.method(args)`
    MethodCall {
        object: Box<Expr>,
        method: String,
        args: Vec<Expr>,
        span: Span,
    },
    BinOp {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
        span: Span,
    },
    UnOp {
        op: UnOp,
        operand: Box<Expr>,
        span: Span,
    },
    /// `lambda(params) { body }`
    Lambda(Rc<FuncDef>),
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Int(_, s)
            | Expr::Bool(_, s)
            | Expr::StringLit(_, s)
            | Expr::Nil(s)
            | Expr::Var(_, s)
            | Expr::NewObject(s) => s,
            Expr::Member { span, .. }
            | Expr::Call { span, .. }
            | Expr::MethodCall { span, .. }
            | Expr::BinOp { span, .. }
            | Expr::UnOp { span, .. } => span,
            Expr::Lambda(def) => &def.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add, Sub, Mul, Div,
    Eq, NotEq, Lt, LtEq, Gt, GtEq,
    And, Or,
}

impl BinOp {
    pub const COUNT: usize = 12;

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add   => "+",  BinOp::Sub  => "-",
            BinOp::Mul   => "*",  BinOp::Div  => "/",
            BinOp::Eq    => "==", BinOp::NotEq => "!=",
            BinOp::Lt    => "<",  BinOp::LtEq => "<=",
            BinOp::Gt    => ">",  BinOp::GtEq => ">=",
            BinOp::And   => "&&", BinOp::Or   => "||",
        }
    }

    /// Row index into the operator table.
    pub fn index(self) -> usize { self as usize }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div)
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinOp::Eq | BinOp::NotEq)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

impl UnOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Not => "!",
        }
    }
}
