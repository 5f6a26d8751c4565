use std::fmt;
use std::rc::Rc;

use crate::runtime::env::Frame;
use crate::runtime::object::ObjectRef;
use crate::syntax::ast::FuncDef;

#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Str(String),
    Nil,
    /// A named function referenced as a value (`f = foo;`).
    Function(Rc<FuncDef>),
    Closure(Rc<Closure>),
    Object(ObjectRef),
}

/// A lambda plus the bindings that were visible when it was created.
///
/// `captured` is owned by the closure value: every invocation runs with it as
/// the outermost frame, so assignments to captured names persist between calls.
#[derive(Debug)]
pub struct Closure {
    pub def: Rc<FuncDef>,
    pub captured: Frame,
}

// ─── Kind tags ────────────────────────────────────────────────────────────────

/// Discriminant used to index the operator table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Bool,
    Str,
    Nil,
    Function,
    Closure,
    Object,
}

impl ValueKind {
    pub const COUNT: usize = 7;

    pub fn index(self) -> usize { self as usize }

    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Int      => "int",
            ValueKind::Bool     => "bool",
            ValueKind::Str      => "string",
            ValueKind::Nil      => "nil",
            ValueKind::Function => "function",
            ValueKind::Closure  => "closure",
            ValueKind::Object   => "object",
        }
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_)      => ValueKind::Int,
            Value::Bool(_)     => ValueKind::Bool,
            Value::Str(_)      => ValueKind::Str,
            Value::Nil         => ValueKind::Nil,
            Value::Function(_) => ValueKind::Function,
            Value::Closure(_)  => ValueKind::Closure,
            Value::Object(_)   => ValueKind::Object,
        }
    }

    pub fn type_name(&self) -> &'static str { self.kind().name() }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Closure(_))
    }
}

/// `==` for every pair of kinds. Cross-kind pairs are unequal; functions,
/// closures and objects compare by identity.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Int(y))           => x == y,
        (Value::Bool(x), Value::Bool(y))         => x == y,
        (Value::Str(x), Value::Str(y))           => x == y,
        (Value::Nil, Value::Nil)                 => true,
        (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
        (Value::Closure(x), Value::Closure(y))   => Rc::ptr_eq(x, y),
        (Value::Object(x), Value::Object(y))     => Rc::ptr_eq(x, y),
        _ => false,
    }
}

/// Canonical rendering used by `print`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v)      => write!(f, "{v}"),
            Value::Bool(v)     => write!(f, "{v}"),
            Value::Str(s)      => f.write_str(s),
            Value::Nil         => f.write_str("nil"),
            Value::Function(d) => write!(f, "<function {}>", d.name),
            Value::Closure(_)  => f.write_str("<closure>"),
            Value::Object(_)   => f.write_str("<object>"),
        }
    }
}
