//! Operator dispatch table: (ValueKind, BinOp) → implementation.
//!
//! Coercion is applied once per operator class before lookup. Adding an
//! operator for a kind = calling `register()` here.

use crate::syntax::ast::{BinOp, UnOp};
use crate::error::RuntimeError;
use crate::runtime::value::{values_equal, Value, ValueKind};

// ─── Function pointer ─────────────────────────────────────────────────────────

pub type BinopFn = fn(Value, Value, usize) -> Result<Value, RuntimeError>;

// ─── Registry ─────────────────────────────────────────────────────────────────

pub struct BinopRegistry {
    ops: [[Option<BinopFn>; BinOp::COUNT]; ValueKind::COUNT],
}

impl BinopRegistry {
    pub fn new() -> Self {
        Self { ops: [[None; BinOp::COUNT]; ValueKind::COUNT] }
    }

    pub fn register(&mut self, op: BinOp, kind: ValueKind, f: BinopFn) {
        self.ops[kind.index()][op.index()] = Some(f);
    }

    pub fn lookup(&self, op: BinOp, kind: ValueKind) -> Option<BinopFn> {
        self.ops[kind.index()][op.index()]
    }

    /// Evaluate `l op r`. Equality is total and never fails; every other
    /// operator requires both operands to share a kind after coercion.
    pub fn eval(&self, op: BinOp, l: Value, r: Value, line: usize) -> Result<Value, RuntimeError> {
        let (l, r) = coerce(op, l, r);

        if op.is_equality() {
            let eq = values_equal(&l, &r);
            return Ok(Value::Bool(if op == BinOp::Eq { eq } else { !eq }));
        }

        let (lk, rk) = (l.kind(), r.kind());
        if lk != rk {
            return Err(RuntimeError::type_error(line, format!(
                "operator `{}` not defined for {} and {}", op.symbol(), lk.name(), rk.name()
            )));
        }
        match self.lookup(op, lk) {
            Some(f) => f(l, r, line),
            None => Err(RuntimeError::type_error(line, format!(
                "operator `{}` not defined for {}", op.symbol(), lk.name()
            ))),
        }
    }
}

impl Default for BinopRegistry {
    fn default() -> Self {
        let mut r = Self::new();
        register_int(&mut r);
        register_bool(&mut r);
        register_str(&mut r);
        r
    }
}

// ─── Coercion ─────────────────────────────────────────────────────────────────

/// Arithmetic turns bools into ints, logical ops turn ints into bools, and
/// equality turns an int into a bool only when compared against a bool.
pub fn coerce(op: BinOp, l: Value, r: Value) -> (Value, Value) {
    if op.is_arithmetic() {
        (bool_to_int(l), bool_to_int(r))
    } else if op.is_logical() {
        (int_to_bool(l), int_to_bool(r))
    } else if op.is_equality() {
        match (&l, &r) {
            (Value::Int(_), Value::Bool(_)) => (int_to_bool(l), r),
            (Value::Bool(_), Value::Int(_)) => (l, int_to_bool(r)),
            _ => (l, r),
        }
    } else {
        (l, r)
    }
}

pub fn bool_to_int(v: Value) -> Value {
    match v {
        Value::Bool(b) => Value::Int(b as i64),
        other => other,
    }
}

pub fn int_to_bool(v: Value) -> Value {
    match v {
        Value::Int(n) => Value::Bool(n != 0),
        other => other,
    }
}

// ─── Unary ────────────────────────────────────────────────────────────────────

pub fn eval_unop(op: UnOp, v: Value, line: usize) -> Result<Value, RuntimeError> {
    match (op, v) {
        (UnOp::Neg, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
        (UnOp::Not, v) => match int_to_bool(v) {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            other => Err(RuntimeError::type_error(line, format!(
                "operator `{}` not defined for {}", op.symbol(), other.type_name()
            ))),
        },
        (UnOp::Neg, other) => Err(RuntimeError::type_error(line, format!(
            "operator `{}` not defined for {}", op.symbol(), other.type_name()
        ))),
    }
}

/// Integer division rounding toward negative infinity.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) { q - 1 } else { q }
}

// ─── int ──────────────────────────────────────────────────────────────────────

fn register_int(r: &mut BinopRegistry) {
    use BinOp::*;
    use ValueKind::Int as I;
    r.register(Add, I, |l, r, _| {
        let (Value::Int(a), Value::Int(b)) = (l, r) else { unreachable!() };
        Ok(Value::Int(a.wrapping_add(b)))
    });
    r.register(Sub, I, |l, r, _| {
        let (Value::Int(a), Value::Int(b)) = (l, r) else { unreachable!() };
        Ok(Value::Int(a.wrapping_sub(b)))
    });
    r.register(Mul, I, |l, r, _| {
        let (Value::Int(a), Value::Int(b)) = (l, r) else { unreachable!() };
        Ok(Value::Int(a.wrapping_mul(b)))
    });
    r.register(Div, I, |l, r, line| {
        let (Value::Int(a), Value::Int(b)) = (l, r) else { unreachable!() };
        if b == 0 { Err(RuntimeError::fault(line, "division by zero")) }
        else { Ok(Value::Int(floor_div(a, b))) }
    });
    r.register(Lt,   I, |l, r, _| { let (Value::Int(a), Value::Int(b)) = (l, r) else { unreachable!() }; Ok(Value::Bool(a <  b)) });
    r.register(LtEq, I, |l, r, _| { let (Value::Int(a), Value::Int(b)) = (l, r) else { unreachable!() }; Ok(Value::Bool(a <= b)) });
    r.register(Gt,   I, |l, r, _| { let (Value::Int(a), Value::Int(b)) = (l, r) else { unreachable!() }; Ok(Value::Bool(a >  b)) });
    r.register(GtEq, I, |l, r, _| { let (Value::Int(a), Value::Int(b)) = (l, r) else { unreachable!() }; Ok(Value::Bool(a >= b)) });
}

// ─── bool ─────────────────────────────────────────────────────────────────────

fn register_bool(r: &mut BinopRegistry) {
    use BinOp::*;
    use ValueKind::Bool as B;
    r.register(And, B, |l, r, _| {
        let (Value::Bool(a), Value::Bool(b)) = (l, r) else { unreachable!() };
        Ok(Value::Bool(a && b))
    });
    r.register(Or, B, |l, r, _| {
        let (Value::Bool(a), Value::Bool(b)) = (l, r) else { unreachable!() };
        Ok(Value::Bool(a || b))
    });
}

// ─── string ───────────────────────────────────────────────────────────────────

fn register_str(r: &mut BinopRegistry) {
    r.register(BinOp::Add, ValueKind::Str, |l, r, _| {
        let (Value::Str(a), Value::Str(b)) = (l, r) else { unreachable!() };
        Ok(Value::Str(a + &b))
    });
}
