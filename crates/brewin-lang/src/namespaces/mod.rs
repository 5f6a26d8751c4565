use crate::error::RuntimeError;
use crate::io::Io;
use crate::Value;

pub mod core;

// ─── Export ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Any number of arguments.
    Variadic,
    /// At most `n` arguments.
    AtMost(usize),
}

#[derive(Debug, Clone)]
pub struct Export {
    pub name: &'static str,
    pub arity: Arity,
}

// ─── Compile-time interface ───────────────────────────────────────────────────

pub trait NamespaceInfo {
    fn exports(&self) -> Vec<Export>;

    fn get_export(&self, name: &str) -> Option<Export> {
        self.exports().into_iter().find(|e| e.name == name)
    }
}

// ─── Runtime interface ────────────────────────────────────────────────────────

/// Built-in call dispatch. `Ok(None)` means the provider does not own `name`.
pub trait NamespaceProvider: NamespaceInfo {
    fn call(
        &self,
        name: &str,
        args: &[Value],
        io: &mut dyn Io,
        line: usize,
    ) -> Result<Option<Value>, RuntimeError>;
}

// ─── Registry ─────────────────────────────────────────────────────────────────

pub struct NamespaceRegistry {
    providers: Vec<Box<dyn NamespaceProvider>>,
}

impl NamespaceRegistry {
    pub fn new() -> Self { Self { providers: Vec::new() } }

    pub fn register(&mut self, p: Box<dyn NamespaceProvider>) { self.providers.push(p); }

    /// True when some provider exports a built-in called `name`.
    pub fn is_builtin(&self, name: &str) -> bool {
        self.providers.iter().any(|p| p.get_export(name).is_some())
    }

    pub fn call_any(
        &self,
        name: &str,
        args: &[Value],
        io: &mut dyn Io,
        line: usize,
    ) -> Result<Option<Value>, RuntimeError> {
        for p in &self.providers {
            if let Some(v) = p.call(name, args, io, line)? {
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    pub fn standard() -> Self {
        let mut r = Self::new();
        r.register(Box::new(core::CoreNamespace));
        r
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self { Self::standard() }
}

// ─── Shared helpers ───────────────────────────────────────────────────────────

pub(crate) fn check_argc(export: &Export, args: &[Value], line: usize) -> Result<(), RuntimeError> {
    match export.arity {
        Arity::AtMost(n) if args.len() > n => Err(RuntimeError::type_error(line, format!(
            "`{}` expects at most {n} argument(s), got {}", export.name, args.len()
        ))),
        _ => Ok(()),
    }
}
