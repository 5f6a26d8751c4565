//! Always-available built-ins: `print`, `inputi`, `inputs`.

use crate::error::RuntimeError;
use crate::io::Io;
use crate::Value;
use super::{Arity, Export, NamespaceInfo, NamespaceProvider, check_argc};

pub fn core_exports() -> Vec<Export> {
    vec![
        Export { name: "print",  arity: Arity::Variadic },
        Export { name: "inputi", arity: Arity::AtMost(1) },
        Export { name: "inputs", arity: Arity::AtMost(1) },
    ]
}

// ─── CoreNamespace: runtime provider ─────────────────────────────────────────

pub struct CoreNamespace;

impl NamespaceInfo for CoreNamespace {
    fn exports(&self) -> Vec<Export> { core_exports() }
}

impl NamespaceProvider for CoreNamespace {
    fn call(
        &self,
        name: &str,
        args: &[Value],
        io: &mut dyn Io,
        line: usize,
    ) -> Result<Option<Value>, RuntimeError> {
        let Some(export) = self.get_export(name) else { return Ok(None) };
        check_argc(&export, args, line)?;

        let v = match name {
            "print" => {
                let text: String = args.iter().map(|a| a.to_string()).collect();
                io.output(&text);
                Value::Nil
            }
            "inputi" => {
                let raw = read_line(args, io, line)?;
                let n = raw.trim().parse::<i64>().map_err(|_| RuntimeError::type_error(
                    line, format!("`inputi` expected an integer, got {raw:?}")
                ))?;
                Value::Int(n)
            }
            "inputs" => Value::Str(read_line(args, io, line)?),
            _ => return Ok(None),
        };
        Ok(Some(v))
    }
}

/// Print the optional prompt, then read one line.
fn read_line(args: &[Value], io: &mut dyn Io, line: usize) -> Result<String, RuntimeError> {
    if let Some(prompt) = args.first() {
        io.output(&prompt.to_string());
    }
    io.input().ok_or_else(|| RuntimeError::fault(line, "end of input"))
}
