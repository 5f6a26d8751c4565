pub mod symbols;
pub mod collector;

use crate::syntax::ast;
use crate::error::Error;
use collector::Collector;
pub use symbols::FunctionTable;

// ─── Entry point ─────────────────────────────────────────────────────────────

/// Build the function table. Returns every redefinition error at once.
pub fn resolve(program: &ast::Program) -> Result<FunctionTable, Vec<Error>> {
    let (table, errors) = Collector::new().collect(program);
    if errors.is_empty() { Ok(table) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::syntax::{lexer::Lexer, parser::Parser};

    fn parse(src: &str) -> ast::Program {
        let tokens = Lexer::new(src).tokenize().expect("lex failed");
        Parser::new(tokens).parse().expect("parse failed")
    }

    #[test]
    fn overloads_resolve() {
        let table = resolve(&parse("func f() { } func f(a) { } func main() { }")).unwrap();
        assert!(table.get("f", 0).is_some());
        assert!(table.get("f", 1).is_some());
        assert!(table.get("main", 0).is_some());
    }

    #[test]
    fn redefinition_reports_each_duplicate() {
        let errs = resolve(&parse(
            "func f(a) { }\nfunc f(b) { }\nfunc g() { }\nfunc g() { }"
        )).unwrap_err();
        assert_eq!(errs.len(), 2);
        assert!(errs.iter().all(|e| e.code == ErrorCode::S003));
        assert_eq!(errs[0].line, 2);
        assert_eq!(errs[1].line, 4);
    }
}
