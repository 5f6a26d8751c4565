use std::rc::Rc;

use crate::syntax::ast::*;
use crate::error::{Error, ErrorCode};
use crate::syntax::token::{Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Appends an `Eof` if the stream does not already end with one.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        match tokens.last() {
            Some(t) if t.kind == TokenKind::Eof => {}
            last => {
                let (line, column) = last.map_or((1, 1), |t| (t.line, t.column));
                tokens.push(Token::new(TokenKind::Eof, line, column));
            }
        }
        Self { tokens, pos: 0 }
    }

    pub fn parse(mut self) -> Result<Program, Vec<Error>> {
        let mut errors = Vec::new();
        let mut functions = Vec::new();

        while !self.is_at_end() {
            let pos_before = self.pos;

            match self.peek_kind() {
                TokenKind::Func => match self.parse_func() {
                    Ok(f) => functions.push(Rc::new(f)),
                    Err(e) => { errors.push(e); self.recover(); }
                },
                TokenKind::Eof => break,
                _ => {
                    errors.push(self.unexpected("`func`"));
                    self.recover();
                }
            }

            // guarantee progress: if nothing was consumed, force-advance
            // to prevent an infinite loop on unrecognised tokens
            if self.pos == pos_before {
                self.advance();
            }
        }

        if errors.is_empty() {
            Ok(Program { functions })
        } else {
            Err(errors)
        }
    }

    // ─── Function definition ─────────────────────────────────────────────────

    fn parse_func(&mut self) -> Result<FuncDef, Error> {
        let span = self.span();
        self.expect(TokenKind::Func)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        let params = self.parse_param_list()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(FuncDef { name, params, body, span })
    }

    fn parse_param_list(&mut self) -> Result<Vec<Param>, Error> {
        let mut params = Vec::new();
        while !self.check(TokenKind::RParen) && !self.is_at_end() {
            let span = self.span();
            let by_ref = self.matches(TokenKind::Ref);
            let name = self.expect_ident()?;
            params.push(Param { name, by_ref, span });
            if !self.matches(TokenKind::Comma) { break; }
        }
        Ok(params)
    }

    // ─── Statements ──────────────────────────────────────────────────────────

    fn parse_block(&mut self) -> Result<Vec<Stmt>, Error> {
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, Error> {
        match self.peek_kind() {
            TokenKind::If     => self.parse_if(),
            TokenKind::While  => self.parse_while(),
            TokenKind::Return => self.parse_return(),

            // ident (`.ident`)* `=` → assignment; anything else → call stmt
            TokenKind::Ident(_) if self.is_path_assign() => self.parse_assign(),

            _ => self.parse_call_stmt(),
        }
    }

    fn parse_assign(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        let mut target = vec![self.expect_ident()?];
        while self.matches(TokenKind::Dot) {
            target.push(self.expect_ident()?);
        }
        self.expect(TokenKind::Eq)?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Assign(Assign { target, value, span }))
    }

    /// Only calls may stand alone; `1 + 2;` is rejected here.
    fn parse_call_stmt(&mut self) -> Result<Stmt, Error> {
        let tok = self.peek().clone();
        let expr = self.parse_expr()?;
        if !matches!(expr, Expr::Call { .. } | Expr::MethodCall { .. }) {
            return Err(self.error_at(&tok, "expected a statement"));
        }
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Call(expr))
    }

    fn parse_if(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let then_block = self.parse_block()?;
        let else_block = if self.matches(TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Stmt::If(IfStmt { condition, then_block, else_block, span }))
    }

    fn parse_while(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(Stmt::While(WhileStmt { condition, body, span }))
    }

    fn parse_return(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        self.expect(TokenKind::Return)?;
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Return(value, span))
    }

    // ─── Expressions (precedence climbing) ───────────────────────────────────

    fn parse_expr(&mut self) -> Result<Expr, Error> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_and()?;
        while self.check(TokenKind::OrOr) {
            let span = left.span().clone();
            self.advance();
            let right = self.parse_and()?;
            left = Expr::BinOp { left: Box::new(left), op: BinOp::Or, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_comparison()?;
        while self.check(TokenKind::AndAnd) {
            let span = left.span().clone();
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::BinOp { left: Box::new(left), op: BinOp::And, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_addition()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq   => BinOp::Eq,
                TokenKind::BangEq => BinOp::NotEq,
                TokenKind::Lt     => BinOp::Lt,
                TokenKind::LtEq   => BinOp::LtEq,
                TokenKind::Gt     => BinOp::Gt,
                TokenKind::GtEq   => BinOp::GtEq,
                _ => break,
            };
            let span = left.span().clone();
            self.advance();
            let right = self.parse_addition()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_addition(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_multiplication()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus  => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let span = left.span().clone();
            self.advance();
            let right = self.parse_multiplication()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_multiplication(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star  => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            let span = left.span().clone();
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, Error> {
        let span = self.span();
        if self.matches(TokenKind::Minus) {
            let operand = self.parse_unary()?;
            return Ok(Expr::UnOp { op: UnOp::Neg, operand: Box::new(operand), span });
        }
        if self.matches(TokenKind::Bang) {
            let operand = self.parse_unary()?;
            return Ok(Expr::UnOp { op: UnOp::Not, operand: Box::new(operand), span });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, Error> {
        let mut expr = self.parse_primary()?;

        // member access or method call: expr.name or expr.name(args)
        while self.check(TokenKind::Dot) {
            let span = expr.span().clone();
            self.advance();
            let field = self.expect_ident()?;
            if self.matches(TokenKind::LParen) {
                let args = self.parse_arg_list()?;
                self.expect(TokenKind::RParen)?;
                expr = Expr::MethodCall { object: Box::new(expr), method: field, args, span };
            } else {
                expr = Expr::Member { object: Box::new(expr), field, span };
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, Error> {
        let tok = self.peek().clone();
        let span = Span::new(tok.line, tok.column);

        match tok.kind {
            TokenKind::Int(v)       => { self.advance(); Ok(Expr::Int(v, span)) }
            TokenKind::Bool(v)      => { self.advance(); Ok(Expr::Bool(v, span)) }
            TokenKind::StringLit(s) => { self.advance(); Ok(Expr::StringLit(s, span)) }
            TokenKind::Nil          => { self.advance(); Ok(Expr::Nil(span)) }
            TokenKind::At           => { self.advance(); Ok(Expr::NewObject(span)) }

            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }

            TokenKind::Lambda => self.parse_lambda(),

            // identifier: either a call or a plain variable
            TokenKind::Ident(_) => self.parse_call_or_var(),

            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_call_or_var(&mut self) -> Result<Expr, Error> {
        let tok = self.advance();
        let span = Span::new(tok.line, tok.column);
        let name = match tok.kind {
            TokenKind::Ident(s) => s,
            _ => return Err(self.error_at(&tok, "expected identifier")),
        };

        if self.matches(TokenKind::LParen) {
            let args = self.parse_arg_list()?;
            self.expect(TokenKind::RParen)?;
            Ok(Expr::Call { callee: name, args, span })
        } else {
            Ok(Expr::Var(name, span))
        }
    }

    fn parse_lambda(&mut self) -> Result<Expr, Error> {
        let span = self.span();
        self.expect(TokenKind::Lambda)?;
        self.expect(TokenKind::LParen)?;
        let params = self.parse_param_list()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(Expr::Lambda(Rc::new(FuncDef { name: "lambda".to_string(), params, body, span })))
    }

    fn parse_arg_list(&mut self) -> Result<Vec<Expr>, Error> {
        let mut args = Vec::new();
        while !self.check(TokenKind::RParen) && !self.is_at_end() {
            args.push(self.parse_expr()?);
            if !self.matches(TokenKind::Comma) { break; }
        }
        Ok(args)
    }

    // ─── Token primitives ────────────────────────────────────────────────────

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.tokens[self.pos].kind.clone()
    }

    /// Returns true when the current position starts a dotted-path assignment:
    /// `ident (.ident)* =`
    fn is_path_assign(&self) -> bool {
        let mut i = self.pos;
        if !matches!(self.tokens[i].kind, TokenKind::Ident(_)) { return false; }
        i += 1;
        while i + 1 < self.tokens.len()
            && self.tokens[i].kind == TokenKind::Dot
            && matches!(self.tokens[i + 1].kind, TokenKind::Ident(_))
        {
            i += 2;
        }
        // must be followed by `=` (not `==`)
        i < self.tokens.len() && self.tokens[i].kind == TokenKind::Eq
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() { self.pos += 1; }
        tok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) { self.advance(); true } else { false }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, Error> {
        if self.check(kind.clone()) {
            Ok(self.advance())
        } else {
            let tok = self.peek();
            Err(Error::new(
                ErrorCode::P002,
                tok.line,
                tok.column,
                format!("expected {:?}, found {:?}", kind, tok.kind),
            ))
        }
    }

    fn expect_ident(&mut self) -> Result<String, Error> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Ident(s) => Ok(s),
            _ => Err(self.error_at(&tok, "expected identifier")),
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn span(&self) -> Span {
        let tok = self.peek();
        Span::new(tok.line, tok.column)
    }

    fn unexpected(&self, expected: &str) -> Error {
        let tok = self.peek();
        Error::new(
            ErrorCode::P001,
            tok.line,
            tok.column,
            format!("expected {}, found {:?}", expected, tok.kind),
        )
    }

    fn error_at(&self, tok: &Token, msg: &str) -> Error {
        Error::new(ErrorCode::P001, tok.line, tok.column, msg)
    }

    /// Skip ahead to the next `func` after a parse error.
    fn recover(&mut self) {
        while !matches!(self.peek_kind(), TokenKind::Eof | TokenKind::Func) {
            self.advance();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::lexer::Lexer;

    fn parse(src: &str) -> Program {
        let tokens = Lexer::new(src).tokenize().expect("lex failed");
        Parser::new(tokens).parse().expect("parse failed")
    }

    fn parse_err(src: &str) -> Vec<Error> {
        let tokens = Lexer::new(src).tokenize().expect("lex failed");
        Parser::new(tokens).parse().expect_err("expected parse error")
    }

    /// Parse `src` as the body of `main` and return its statements.
    fn body(src: &str) -> Vec<Stmt> {
        let p = parse(&format!("func main() {{ {src} }}"));
        p.functions[0].body.clone()
    }

    fn expr(src: &str) -> Expr {
        match body(&format!("x = {src};")).remove(0) {
            Stmt::Assign(a) => a.value,
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    // ── functions ────────────────────────────────────────────────────────────

    #[test]
    fn func_with_params() {
        let p = parse("func add(a, b) { return a + b; }");
        assert_eq!(p.functions.len(), 1);
        let f = &p.functions[0];
        assert_eq!(f.name, "add");
        assert_eq!(f.arity(), 2);
        assert!(!f.params[0].by_ref);
    }

    #[test]
    fn ref_param() {
        let p = parse("func bump(ref c, d) { c = c + 1; }");
        let params = &p.functions[0].params;
        assert!(params[0].by_ref);
        assert_eq!(params[0].name, "c");
        assert!(!params[1].by_ref);
    }

    #[test]
    fn overloads_are_kept_in_order() {
        let p = parse("func foo() { } func foo(a) { } func main() { }");
        let names: Vec<_> = p.functions.iter().map(|f| (f.name.as_str(), f.arity())).collect();
        assert_eq!(names, vec![("foo", 0), ("foo", 1), ("main", 0)]);
    }

    #[test]
    fn empty_token_stream() {
        let p = Parser::new(vec![]).parse().expect("parse failed");
        assert!(p.functions.is_empty());
    }

    #[test]
    fn stream_without_eof() {
        let tokens = vec![
            Token::new(TokenKind::Func, 1, 1),
            Token::new(TokenKind::Ident("main".into()), 1, 6),
            Token::new(TokenKind::LParen, 1, 10),
            Token::new(TokenKind::RParen, 1, 11),
            Token::new(TokenKind::LBrace, 1, 13),
            Token::new(TokenKind::RBrace, 1, 14),
        ];
        let p = Parser::new(tokens).parse().expect("parse failed");
        assert_eq!(p.functions.len(), 1);
        assert_eq!(p.functions[0].name, "main");

        let errs = Parser::new(vec![Token::new(TokenKind::Func, 1, 1)])
            .parse()
            .expect_err("expected parse error");
        assert_eq!(errs[0].code, ErrorCode::P001);
    }

    // ── statements ───────────────────────────────────────────────────────────

    #[test]
    fn assignment() {
        match &body("x = 5;")[0] {
            Stmt::Assign(a) => assert_eq!(a.target, vec!["x"]),
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn dotted_assignment() {
        match &body("a.b.c = 5;")[0] {
            Stmt::Assign(a) => assert_eq!(a.target, vec!["a", "b", "c"]),
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn call_statement() {
        assert!(matches!(&body("print(1, \"a\");")[0], Stmt::Call(Expr::Call { callee, args, .. })
            if callee == "print" && args.len() == 2));
    }

    #[test]
    fn method_call_statement() {
        assert!(matches!(&body("o.greet(1);")[0], Stmt::Call(Expr::MethodCall { method, .. })
            if method == "greet"));
    }

    #[test]
    fn if_else() {
        match &body("if (x > 0) { print(x); } else { print(0); }")[0] {
            Stmt::If(i) => {
                assert_eq!(i.then_block.len(), 1);
                assert!(i.else_block.is_some());
            }
            other => panic!("expected If, got {other:?}"),
        }
    }

    #[test]
    fn if_no_else() {
        match &body("if (true) { }")[0] {
            Stmt::If(i) => assert!(i.else_block.is_none()),
            other => panic!("expected If, got {other:?}"),
        }
    }

    #[test]
    fn while_loop() {
        assert!(matches!(&body("while (i < 10) { i = i + 1; }")[0], Stmt::While(_)));
    }

    #[test]
    fn return_bare_and_with_value() {
        let stmts = body("return; return 1;");
        assert!(matches!(&stmts[0], Stmt::Return(None, _)));
        assert!(matches!(&stmts[1], Stmt::Return(Some(Expr::Int(1, _)), _)));
    }

    // ── expressions ──────────────────────────────────────────────────────────

    #[test]
    fn literals() {
        assert!(matches!(expr("42"), Expr::Int(42, _)));
        assert!(matches!(expr("true"), Expr::Bool(true, _)));
        assert!(matches!(expr("nil"), Expr::Nil(_)));
        assert!(matches!(expr("@"), Expr::NewObject(_)));
        assert!(matches!(expr("\"s\""), Expr::StringLit(s, _) if s == "s"));
    }

    #[test]
    fn operator_precedence_mul_over_add() {
        match expr("1 + 2 * 3") {
            Expr::BinOp { op: BinOp::Add, right, .. } => {
                assert!(matches!(*right, Expr::BinOp { op: BinOp::Mul, .. }));
            }
            other => panic!("expected Add at root, got {other:?}"),
        }
    }

    #[test]
    fn operator_precedence_compare_over_logical() {
        match expr("a < 1 || b == 2 && c") {
            Expr::BinOp { op: BinOp::Or, left, right, .. } => {
                assert!(matches!(*left, Expr::BinOp { op: BinOp::Lt, .. }));
                assert!(matches!(*right, Expr::BinOp { op: BinOp::And, .. }));
            }
            other => panic!("expected Or at root, got {other:?}"),
        }
    }

    #[test]
    fn unary_ops() {
        assert!(matches!(expr("-x"), Expr::UnOp { op: UnOp::Neg, .. }));
        assert!(matches!(expr("!!x"), Expr::UnOp { op: UnOp::Not, operand, .. }
            if matches!(*operand, Expr::UnOp { op: UnOp::Not, .. })));
    }

    #[test]
    fn member_chain() {
        match expr("a.b.c") {
            Expr::Member { object, field, .. } => {
                assert_eq!(field, "c");
                assert!(matches!(*object, Expr::Member { ref field, .. } if field == "b"));
            }
            other => panic!("expected Member, got {other:?}"),
        }
    }

    #[test]
    fn lambda_expr() {
        match expr("lambda(a, ref b) { return a; }") {
            Expr::Lambda(def) => {
                assert_eq!(def.name, "lambda");
                assert_eq!(def.arity(), 2);
                assert!(def.params[1].by_ref);
                assert_eq!(def.body.len(), 1);
            }
            other => panic!("expected Lambda, got {other:?}"),
        }
    }

    #[test]
    fn grouped_expr() {
        assert!(matches!(expr("(1 + 2) * 3"), Expr::BinOp { op: BinOp::Mul, .. }));
    }

    // ── errors ───────────────────────────────────────────────────────────────

    #[test]
    fn missing_semicolon_is_error() {
        let errs = parse_err("func main() { x = 1 }");
        assert_eq!(errs[0].code, ErrorCode::P002);
    }

    #[test]
    fn bare_expression_statement_is_error() {
        let errs = parse_err("func main() { 1 + 2; }");
        assert_eq!(errs[0].code, ErrorCode::P001);
    }

    #[test]
    fn top_level_statement_is_error() {
        let errs = parse_err("x = 1;");
        assert_eq!(errs[0].code, ErrorCode::P001);
    }

    #[test]
    fn recovery_reports_errors_in_each_function() {
        let errs = parse_err("func a() { x = ; } func b() { y = ; } func main() { }");
        assert_eq!(errs.len(), 2);
    }
}
