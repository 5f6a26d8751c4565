//! Function collector
//!
//! Walks top-level function definitions in order and builds the function
//! table. A second definition with the same name and arity is reported as
//! `S003` against the later one.

use std::rc::Rc;

use crate::syntax::ast::*;
use crate::error::{Error, ErrorCode};
use super::symbols::FunctionTable;

pub struct Collector {
    pub table: FunctionTable,
    pub errors: Vec<Error>,
}

impl Collector {
    pub fn new() -> Self {
        Self { table: FunctionTable::new(), errors: Vec::new() }
    }

    pub fn collect(mut self, program: &Program) -> (FunctionTable, Vec<Error>) {
        for f in &program.functions {
            self.collect_fn(f);
        }
        (self.table, self.errors)
    }

    fn collect_fn(&mut self, f: &Rc<FuncDef>) {
        if let Err(existing) = self.table.insert(f.clone()) {
            self.errors.push(Error::new(
                ErrorCode::S003,
                f.span.line, f.span.column,
                format!(
                    "function `{}` with {} parameter(s) already defined at line {}",
                    f.name, f.arity(), existing.span.line
                ),
            ));
        }
    }
}

impl Default for Collector {
    fn default() -> Self { Self::new() }
}
