//! Tree-walking interpreter. Runs `main` and everything it reaches.
//! Built-ins are dispatched through the NamespaceRegistry; operators through
//! the BinopRegistry.

use std::rc::Rc;

use tracing::{debug, trace};

use crate::syntax::ast::{Assign, Expr, FuncDef, Stmt};
use crate::types::binop_registry::{eval_unop, int_to_bool, BinopRegistry};
use crate::error::RuntimeError;
use crate::io::Io;
use crate::namespaces::NamespaceRegistry;
use crate::runtime::env::{Environment, Frame};
use crate::runtime::object::{get_member, set_member, Object, ObjectRef};
use crate::runtime::value::{Closure, Value};
use crate::stack::ensure_sufficient_stack;
use crate::{Options, Program};

/// Outcome of executing a statement or statement list.
#[derive(Debug, Clone)]
pub enum ExecStatus {
    Continue,
    Return(Value),
}

/// Final values of `ref` parameters, paired with the caller variable they
/// are written back to.
type WriteBacks = Vec<(String, Value)>;

// ─── Interpreter ──────────────────────────────────────────────────────────────

pub struct Interpreter<'a> {
    program: &'a Program,
    io: &'a mut dyn Io,
    builtins: NamespaceRegistry,
    binops: BinopRegistry,
    env: Environment,
    options: Options,
    depth: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(program: &'a Program, io: &'a mut dyn Io) -> Self {
        Self {
            program,
            io,
            builtins: NamespaceRegistry::standard(),
            binops: BinopRegistry::default(),
            env: Environment::new(),
            options: Options::default(),
            depth: 0,
        }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    // ─── Entry point ──────────────────────────────────────────────────────────

    /// Execute `main()`. The first runtime error stops the program.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        let main = self.program.functions.get("main", 0).cloned()
            .ok_or_else(|| RuntimeError::name(0, "no `main` function taking zero parameters"))?;

        debug!(functions = self.program.functions.len(), "run");
        self.env = Environment::new();
        self.depth = 0;
        self.invoke_def(&main, None, Vec::new(), &[], None, main.span.line)?;
        Ok(())
    }

    // ─── Scopes ───────────────────────────────────────────────────────────────

    /// Run `f` inside a fresh innermost frame; the frame is popped on every
    /// exit path, including errors.
    fn with_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, RuntimeError>,
    ) -> Result<T, RuntimeError> {
        self.env.push();
        let result = f(self);
        self.env.pop();
        result
    }

    // ─── Statement executor ───────────────────────────────────────────────────

    fn exec_stmts(&mut self, stmts: &[Stmt]) -> Result<ExecStatus, RuntimeError> {
        for stmt in stmts {
            if let ExecStatus::Return(v) = self.exec_stmt(stmt)? {
                return Ok(ExecStatus::Return(v));
            }
        }
        Ok(ExecStatus::Continue)
    }

    fn exec_block(&mut self, stmts: &[Stmt]) -> Result<ExecStatus, RuntimeError> {
        self.with_scope(|interp| interp.exec_stmts(stmts))
    }

    pub fn exec_stmt(&mut self, stmt: &Stmt) -> Result<ExecStatus, RuntimeError> {
        trace!(line = stmt.span().line, "exec");
        match stmt {
            Stmt::Assign(a) => {
                self.exec_assign(a)?;
            }

            Stmt::Call(expr) => {
                self.eval_expr(expr)?;
            }

            Stmt::If(i) => {
                let cond = self.eval_condition(&i.condition, "if")?;
                let branch = if cond { Some(&i.then_block) } else { i.else_block.as_ref() };
                if let Some(block) = branch {
                    return self.exec_block(block);
                }
            }

            Stmt::While(w) => {
                while self.eval_condition(&w.condition, "while")? {
                    if let ExecStatus::Return(v) = self.exec_block(&w.body)? {
                        return Ok(ExecStatus::Return(v));
                    }
                }
            }

            Stmt::Return(value, _) => {
                let v = match value {
                    Some(e) => self.eval_expr(e)?,
                    None    => Value::Nil,
                };
                return Ok(ExecStatus::Return(v));
            }
        }
        Ok(ExecStatus::Continue)
    }

    fn exec_assign(&mut self, a: &Assign) -> Result<(), RuntimeError> {
        let val = self.eval_expr(&a.value)?;
        let line = a.span.line;

        let [root, path @ ..] = a.target.as_slice() else {
            return Err(RuntimeError::name(line, "assignment has no target"));
        };
        let Some((field, parents)) = path.split_last() else {
            self.env.set(root, val);
            return Ok(());
        };

        // a.b.c = v: resolve `a.b`, then write `c` on it
        let mut target = self.env.get(root)
            .ok_or_else(|| RuntimeError::name(line, format!("undefined variable `{root}`")))?;
        for name in parents {
            target = member_of(target, name, line)?;
        }
        let obj = expect_object(target, field, line)?;
        set_member(&obj, field, val).map_err(|e| RuntimeError::type_error(
            line, format!("`proto` must be an object or nil, got {}", e.0)
        ))
    }

    fn eval_condition(&mut self, expr: &Expr, what: &str) -> Result<bool, RuntimeError> {
        match int_to_bool(self.eval_expr(expr)?) {
            Value::Bool(b) => Ok(b),
            other => Err(RuntimeError::type_error(expr.span().line, format!(
                "{what} condition must be bool, got {}", other.type_name()
            ))),
        }
    }

    // ─── Expression evaluator ─────────────────────────────────────────────────

    pub fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Int(v, _)       => Ok(Value::Int(*v)),
            Expr::Bool(v, _)      => Ok(Value::Bool(*v)),
            Expr::StringLit(s, _) => Ok(Value::Str(s.clone())),
            Expr::Nil(_)          => Ok(Value::Nil),
            Expr::NewObject(_)    => Ok(Value::Object(Object::new_ref())),

            Expr::Var(name, span) => self.lookup_var(name, span.line),

            Expr::BinOp { left, op, right, span } => {
                let l = self.eval_expr(left)?;
                let r = self.eval_expr(right)?;
                self.binops.eval(*op, l, r, span.line)
            }

            Expr::UnOp { op, operand, span } => {
                let v = self.eval_expr(operand)?;
                eval_unop(*op, v, span.line)
            }

            Expr::Member { object, field, span } => {
                let obj = self.eval_expr(object)?;
                member_of(obj, field, span.line)
            }

            Expr::Call { callee, args, span } => self.eval_call(callee, args, span.line),

            Expr::MethodCall { object, method, args, span } => {
                let receiver = self.eval_expr(object)?;
                let obj = expect_object(receiver, method, span.line)?;
                let m = get_member(&obj, method).ok_or_else(|| RuntimeError::name(
                    span.line, format!("object has no method `{method}`")
                ))?;
                if !m.is_callable() {
                    return Err(RuntimeError::name(span.line, format!(
                        "member `{method}` is a {}, not a method", m.type_name()
                    )));
                }
                self.call_value(&m, args, Some(obj), span.line)
            }

            Expr::Lambda(def) => {
                let captured = Frame::from_map(self.env.flatten());
                Ok(Value::Closure(Rc::new(Closure { def: def.clone(), captured })))
            }
        }
    }

    /// Variables shadow functions. A function name used as a value must be
    /// unambiguous.
    fn lookup_var(&self, name: &str, line: usize) -> Result<Value, RuntimeError> {
        if let Some(v) = self.env.get(name) {
            return Ok(v);
        }
        match self.program.functions.overloads(name).as_slice() {
            [] => Err(RuntimeError::name(line, format!("undefined variable `{name}`"))),
            [def] => Ok(Value::Function(Rc::clone(def))),
            _ => Err(RuntimeError::type_error(line, format!(
                "function `{name}` is overloaded and cannot be used as a value"
            ))),
        }
    }

    // ─── Call dispatch ────────────────────────────────────────────────────────

    fn eval_call(&mut self, callee: &str, args: &[Expr], line: usize) -> Result<Value, RuntimeError> {
        // 1. Built-ins
        if self.builtins.is_builtin(callee) {
            let arg_vals: Vec<Value> = args.iter()
                .map(|a| self.eval_expr(a))
                .collect::<Result<_, _>>()?;
            return self.builtins.call_any(callee, &arg_vals, &mut *self.io, line)?
                .ok_or_else(|| RuntimeError::name(line, format!("unknown built-in `{callee}`")));
        }

        // 2. Env: a variable holding a function or closure
        if let Some(val) = self.env.get(callee) {
            if !val.is_callable() {
                return Err(RuntimeError::name(line, format!(
                    "`{callee}` is a {}, not a function", val.type_name()
                )));
            }
            return self.call_value(&val, args, None, line);
        }

        // 3. Named functions, by arity
        match self.program.functions.get(callee, args.len()) {
            Some(def) => {
                let def = Rc::clone(def);
                self.call_value(&Value::Function(def), args, None, line)
            }
            None if self.program.functions.contains(callee) => Err(RuntimeError::name(line, format!(
                "no overload of `{callee}` takes {} argument(s)", args.len()
            ))),
            None => Err(RuntimeError::name(line, format!("undefined function `{callee}`"))),
        }
    }

    /// Evaluate the actuals in the caller's environment, then invoke.
    fn call_value(
        &mut self,
        callee: &Value,
        args: &[Expr],
        this: Option<ObjectRef>,
        line: usize,
    ) -> Result<Value, RuntimeError> {
        let (def, closure) = match callee {
            Value::Function(d) => (Rc::clone(d), None),
            Value::Closure(c)  => (Rc::clone(&c.def), Some(Rc::clone(c))),
            other => return Err(RuntimeError::name(line, format!(
                "{} is not callable", other.type_name()
            ))),
        };

        if def.arity() != args.len() {
            return Err(RuntimeError::type_error(line, format!(
                "`{}` expects {} argument(s), got {}", def.name, def.arity(), args.len()
            )));
        }

        let mut values = Vec::with_capacity(args.len());
        let mut sources = Vec::with_capacity(args.len());
        for (param, arg) in def.params.iter().zip(args) {
            values.push(self.eval_expr(arg)?);
            sources.push(match arg {
                Expr::Var(name, _) if self.env.get(name).is_some() => Some(name.clone()),
                _ if param.by_ref => return Err(RuntimeError::type_error(arg.span().line, format!(
                    "ref parameter `{}` of `{}` requires a variable argument", param.name, def.name
                ))),
                _ => None,
            });
        }

        self.invoke_def(&def, closure.as_deref(), values, &sources, this, line)
    }

    fn invoke_def(
        &mut self,
        def: &FuncDef,
        closure: Option<&Closure>,
        values: Vec<Value>,
        sources: &[Option<String>],
        this: Option<ObjectRef>,
        line: usize,
    ) -> Result<Value, RuntimeError> {
        if let Some(max) = self.options.max_call_depth {
            if self.depth >= max {
                return Err(RuntimeError::fault(line, format!(
                    "maximum call depth of {max} exceeded in `{}`", def.name
                )));
            }
        }
        self.depth += 1;
        debug!(name = %def.name, arity = def.arity(), depth = self.depth, closure = closure.is_some(), "call");

        let result = ensure_sufficient_stack(|| match closure {
            // closures see only their snapshot, never the caller's frames
            Some(c) => {
                let caller = std::mem::replace(&mut self.env, Environment::from_frame(c.captured.clone()));
                let result = self.run_body(def, values, sources, this);
                self.env = caller;
                result
            }
            None => self.run_body(def, values, sources, this),
        });
        self.depth -= 1;

        let (ret, write_backs) = result?;
        for (name, v) in write_backs {
            self.env.set(&name, v);
        }
        Ok(ret)
    }

    /// Bind parameters in a new frame, run the body, and collect the final
    /// values of `ref` parameters before the frame is popped.
    fn run_body(
        &mut self,
        def: &FuncDef,
        values: Vec<Value>,
        sources: &[Option<String>],
        this: Option<ObjectRef>,
    ) -> Result<(Value, WriteBacks), RuntimeError> {
        self.with_scope(|interp| {
            for (p, v) in def.params.iter().zip(values) {
                interp.env.create(&p.name, v);
            }
            if let Some(obj) = this {
                interp.env.create("this", Value::Object(obj));
            }

            let ret = match interp.exec_stmts(&def.body)? {
                ExecStatus::Return(v) => v,
                ExecStatus::Continue  => Value::Nil,
            };

            let write_backs = def.params.iter()
                .zip(sources)
                .filter(|(p, _)| p.by_ref)
                .filter_map(|(p, src)| {
                    let src = src.as_ref()?;
                    Some((src.clone(), interp.env.get(&p.name).unwrap_or(Value::Nil)))
                })
                .collect();
            Ok((ret, write_backs))
        })
    }
}

// ─── Member helpers ───────────────────────────────────────────────────────────

fn expect_object(v: Value, member: &str, line: usize) -> Result<ObjectRef, RuntimeError> {
    match v {
        Value::Object(o) => Ok(o),
        Value::Nil => Err(RuntimeError::fault(line, format!("cannot access `{member}` on nil"))),
        other => Err(RuntimeError::type_error(line, format!(
            "cannot access `{member}` on {}", other.type_name()
        ))),
    }
}

fn member_of(v: Value, field: &str, line: usize) -> Result<Value, RuntimeError> {
    let obj = expect_object(v, field, line)?;
    get_member(&obj, field)
        .ok_or_else(|| RuntimeError::name(line, format!("object has no member `{field}`")))
}
