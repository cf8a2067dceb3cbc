//! Parser that consumes the lexer and builds a statement-level `SourceFile`.
//!
//! It recognises the package clause, top-level declarations, blocks and
//! `if`/`else` chains. Everything else is skipped as a balanced token run,
//! so brackets must still match and statements must still be terminated.

use crate::error::SyntaxError;

use super::ast::*;
use super::literal::is_keyword;
use super::lexer::{Lexeme, Lexer, Token};

pub fn parse_file(src: &str) -> Result<SourceFile, SyntaxError> {
    let src = src.strip_prefix('\u{feff}').unwrap_or(src);
    let tokens = Lexer::new(src).collect::<Result<Vec<_>, _>>()?;
    let mut p = Parser::new(src, tokens);
    p.parse()
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Lexeme>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, tokens: Vec<Lexeme>) -> Self {
        Self { src, tokens, pos: 0 }
    }

    // ── token access ────────────────────────────────────────────────

    fn peek(&self) -> &Lexeme {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn peek_nth(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)].token
    }

    fn next(&mut self) -> Lexeme {
        let lexeme = self.peek().clone();
        if lexeme.token != Token::Eof {
            self.pos += 1;
        }
        lexeme
    }

    fn at(&self, token: &Token) -> bool {
        &self.peek().token == token
    }

    fn at_ident(&self, name: &str) -> bool {
        matches!(&self.peek().token, Token::Ident(id) if id == name)
    }

    fn error(&self, at: &Lexeme, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(at.line, at.column, message)
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let found = self.peek();
        self.error(
            found,
            format!("expected {expected}, found {}", found.token.describe()),
        )
    }

    fn skip_semicolons(&mut self) {
        while self.at(&Token::Semicolon) {
            self.next();
        }
    }

    fn expect_ident(&mut self, expected: &str) -> Result<String, SyntaxError> {
        match &self.peek().token {
            Token::Ident(name) => {
                let name = name.clone();
                self.next();
                Ok(name)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    // ── declarations ────────────────────────────────────────────────

    fn parse(&mut self) -> Result<SourceFile, SyntaxError> {
        self.skip_semicolons();
        if !self.at_ident("package") {
            return Err(self.unexpected("package clause"));
        }
        self.next();
        self.expect_ident("package name")?;
        self.end_declaration()?;

        let mut functions = Vec::new();
        loop {
            self.skip_semicolons();
            match self.peek().token.clone() {
                Token::Eof => break,
                Token::Ident(kw) if kw == "func" => functions.push(self.parse_func()?),
                Token::Ident(kw) if matches!(kw.as_str(), "import" | "const" | "var" | "type") => {
                    self.skip_simple()?;
                    self.end_declaration()?;
                }
                _ => return Err(self.unexpected("declaration")),
            }
        }

        Ok(SourceFile { functions })
    }

    fn end_declaration(&mut self) -> Result<(), SyntaxError> {
        match self.peek().token {
            Token::Semicolon => {
                self.next();
                Ok(())
            }
            Token::Eof => Ok(()),
            _ => Err(self.unexpected("`;` or newline after declaration")),
        }
    }

    /// `func [(recv)] name [typeparams] (params) [result] [body]`
    fn parse_func(&mut self) -> Result<FuncDecl, SyntaxError> {
        self.next();
        if self.at(&Token::LParen) {
            self.skip_group()?;
        }
        let name = self.expect_ident("function name")?;
        if self.at(&Token::LBracket) {
            self.skip_group()?;
        }
        if !self.at(&Token::LParen) {
            return Err(self.unexpected("`(` after function name"));
        }
        self.skip_group()?;
        self.skip_result()?;

        let body = if self.at(&Token::LBrace) {
            Some(self.parse_block()?)
        } else {
            None
        };
        self.end_declaration()?;

        Ok(FuncDecl { name, body })
    }

    /// Skip a result type up to the body `{`, a terminator or EOF.
    fn skip_result(&mut self) -> Result<(), SyntaxError> {
        loop {
            match self.peek().token.clone() {
                Token::LBrace | Token::Semicolon | Token::Eof => return Ok(()),
                Token::Ident(kw) if kw == "struct" || kw == "interface" => {
                    self.next();
                    if self.at(&Token::LBrace) {
                        self.skip_group()?;
                    }
                }
                Token::LParen | Token::LBracket => self.skip_group()?,
                Token::RParen | Token::RBracket | Token::RBrace => {
                    return Err(self.unexpected("function result or body"));
                }
                _ => {
                    self.next();
                }
            }
        }
    }

    // ── statements ──────────────────────────────────────────────────

    fn parse_block(&mut self) -> Result<Block, SyntaxError> {
        let open = self.next();
        if open.token != Token::LBrace {
            return Err(self.error(&open, format!("expected `{{`, found {}", open.token.describe())));
        }

        let mut stmts = Vec::new();
        loop {
            self.skip_semicolons();
            match self.peek().token {
                Token::RBrace => {
                    self.next();
                    break;
                }
                Token::Eof => {
                    return Err(self.error(&open, "block opened here is never closed"));
                }
                _ => {
                    stmts.push(self.parse_stmt()?);
                    self.end_stmt()?;
                }
            }
        }
        Ok(Block { stmts })
    }

    fn end_stmt(&mut self) -> Result<(), SyntaxError> {
        match self.peek().token {
            Token::Semicolon => {
                self.next();
                Ok(())
            }
            Token::RBrace => Ok(()),
            _ => Err(self.unexpected("`;` or `}` after statement")),
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let stmt = match self.peek().token.clone() {
            Token::Ident(kw) if kw == "if" => Stmt::If(self.parse_if()?),
            Token::Ident(kw) if kw == "else" => {
                return Err(self.error(
                    self.peek(),
                    "unexpected `else`, it must follow the `}` of an if block on the same line",
                ));
            }
            Token::Ident(kw) if matches!(kw.as_str(), "for" | "switch" | "select") => {
                self.next();
                self.skip_header()?;
                self.skip_group()?;
                Stmt::Other
            }
            Token::Ident(_) if self.peek_nth(1) == &Token::Colon => {
                // label
                self.next();
                self.next();
                if matches!(self.peek().token, Token::Semicolon | Token::RBrace) {
                    Stmt::Other
                } else {
                    self.parse_stmt()?
                }
            }
            Token::LBrace => Stmt::Block(self.parse_block()?),
            _ => {
                self.skip_simple()?;
                Stmt::Other
            }
        };
        Ok(stmt)
    }

    fn parse_if(&mut self) -> Result<IfStmt, SyntaxError> {
        let kw = self.next();
        let start = self.peek().start;
        self.skip_header()?;
        let end = self.peek().start;

        let condition = self.src[start..end]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if condition.is_empty() {
            return Err(self.error(&kw, "missing condition in if statement"));
        }

        let then = self.parse_block()?;

        let otherwise = if self.at_ident("else") {
            self.next();
            if self.at_ident("if") {
                Some(Else::If(Box::new(self.parse_if()?)))
            } else if self.at(&Token::LBrace) {
                Some(Else::Block(self.parse_block()?))
            } else {
                return Err(self.unexpected("`if` or `{` after `else`"));
            }
        } else {
            None
        };

        Ok(IfStmt {
            condition,
            then,
            otherwise,
        })
    }

    /// Skip an `if`/`for`/`switch` header, stopping at the body's `{`.
    ///
    /// A `{` after a bare type name opens the body, since such literals must
    /// be parenthesised in a header. Literals of `[]T`, `[N]T`, `map[K]V` and
    /// `struct{…}` types, and function literals, are skipped whole.
    fn skip_header(&mut self) -> Result<(), SyntaxError> {
        loop {
            match self.peek().token.clone() {
                Token::LBrace => return Ok(()),
                Token::Ident(kw) if kw == "func" => self.skip_func_literal()?,
                Token::Ident(kw) if matches!(kw.as_str(), "map" | "struct" | "interface") => {
                    self.skip_composite_literal()?;
                }
                Token::LBracket if self.at_operand_start() => self.skip_composite_literal()?,
                Token::LParen | Token::LBracket => self.skip_group()?,
                Token::Eof | Token::RParen | Token::RBracket | Token::RBrace => {
                    return Err(self.unexpected("`{` to open the statement body"));
                }
                _ => {
                    self.next();
                }
            }
        }
    }

    /// True when the previous token cannot end an operand, so a `[` here
    /// starts a slice or array type rather than an index expression.
    fn at_operand_start(&self) -> bool {
        let Some(prev) = self.pos.checked_sub(1).map(|i| &self.tokens[i].token) else {
            return true;
        };
        match prev {
            Token::Ident(name) => is_keyword(name),
            Token::Op(op) => !matches!(op.as_str(), "++" | "--"),
            Token::Number(_)
            | Token::Str(_)
            | Token::Char(_)
            | Token::RParen
            | Token::RBracket
            | Token::RBrace => false,
            _ => true,
        }
    }

    /// Skip a type in operand position and the literal value following it,
    /// if any. A conversion such as `[]byte(s)` leaves its `(` in place.
    fn skip_composite_literal(&mut self) -> Result<(), SyntaxError> {
        self.skip_type()?;
        if self.at(&Token::LBrace) {
            self.skip_group()?;
        }
        Ok(())
    }

    fn skip_type(&mut self) -> Result<(), SyntaxError> {
        loop {
            match self.peek().token.clone() {
                Token::Op(op) if op == "*" || op == "<-" => {
                    self.next();
                }
                Token::LBracket => self.skip_group()?,
                Token::LParen => return self.skip_group(),
                Token::Ident(kw) if kw == "map" => {
                    self.next();
                    if !self.at(&Token::LBracket) {
                        return Err(self.unexpected("`[` after `map`"));
                    }
                    self.skip_group()?;
                }
                Token::Ident(kw) if kw == "chan" => {
                    self.next();
                }
                Token::Ident(kw) if kw == "struct" || kw == "interface" => {
                    self.next();
                    if !self.at(&Token::LBrace) {
                        return Err(self.unexpected(&format!("`{{` after `{kw}`")));
                    }
                    return self.skip_group();
                }
                Token::Ident(kw) if kw == "func" => {
                    self.next();
                    if !self.at(&Token::LParen) {
                        return Err(self.unexpected("`(` after `func`"));
                    }
                    self.skip_group()?;
                    // result type, if any, is handled by the next round
                }
                Token::Ident(name) if !is_keyword(&name) => {
                    self.next();
                    while self.at(&Token::Op(".".into()))
                        && matches!(self.peek_nth(1), Token::Ident(_))
                    {
                        self.next();
                        self.next();
                    }
                    // type arguments
                    if self.at(&Token::LBracket) {
                        self.skip_group()?;
                    }
                    return Ok(());
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_func_literal(&mut self) -> Result<(), SyntaxError> {
        self.next();
        if !self.at(&Token::LParen) {
            return Err(self.unexpected("`(` after `func`"));
        }
        self.skip_group()?;
        self.skip_result()?;
        if !self.at(&Token::LBrace) {
            return Err(self.unexpected("function literal body"));
        }
        self.skip_group()
    }

    /// Skip tokens up to the terminating `;`, a closing `}` or EOF.
    fn skip_simple(&mut self) -> Result<(), SyntaxError> {
        loop {
            match self.peek().token {
                Token::Semicolon | Token::Eof | Token::RBrace | Token::RParen | Token::RBracket => {
                    return Ok(());
                }
                Token::LParen | Token::LBracket | Token::LBrace => self.skip_group()?,
                _ => {
                    self.next();
                }
            }
        }
    }

    /// Skip a bracketed group starting at the current opening token.
    fn skip_group(&mut self) -> Result<(), SyntaxError> {
        let mut open: Vec<Lexeme> = Vec::new();
        loop {
            let lexeme = self.next();
            match lexeme.token {
                Token::LParen | Token::LBracket | Token::LBrace => open.push(lexeme),
                Token::RParen | Token::RBracket | Token::RBrace => {
                    let Some(opener) = open.pop() else {
                        return Err(self.error(
                            &lexeme,
                            format!("unexpected {}", lexeme.token.describe()),
                        ));
                    };
                    if closing(&opener.token) != Some(&lexeme.token) {
                        return Err(self.error(
                            &lexeme,
                            format!(
                                "unexpected {}, {} opened at {}:{} is not closed",
                                lexeme.token.describe(),
                                opener.token.describe(),
                                opener.line,
                                opener.column
                            ),
                        ));
                    }
                    if open.is_empty() {
                        return Ok(());
                    }
                }
                Token::Eof => {
                    let opener = open.last().unwrap_or(&lexeme);
                    return Err(self.error(
                        opener,
                        format!("{} is never closed", opener.token.describe()),
                    ));
                }
                _ => {
                    if open.is_empty() {
                        return Err(self.error(
                            &lexeme,
                            format!("expected a bracket, found {}", lexeme.token.describe()),
                        ));
                    }
                }
            }
        }
    }
}

fn closing(open: &Token) -> Option<&'static Token> {
    match open {
        Token::LParen => Some(&Token::RParen),
        Token::LBracket => Some(&Token::RBracket),
        Token::LBrace => Some(&Token::RBrace),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(src: &str) -> Vec<Stmt> {
        let file = parse_file(&format!("package main\n\nfunc main() {{\n{src}\n}}\n")).unwrap();
        file.functions[0].body.clone().unwrap().stmts
    }

    fn if_stmt(stmt: &Stmt) -> &IfStmt {
        match stmt {
            Stmt::If(s) => s,
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_declarations() {
        let src = r#"package main

import (
	Endpoint "github.com/preludeorg/libraries/go/tests/endpoint"
	"fmt"
)

//go:embed fromrussiawithlove.eml
var emlFile []byte

type probe struct {
	name string
}

func (p *probe) Name() string { return p.name }

func Map[K comparable, V any](m map[K]V) map[K]struct{} {
	return nil
}

func external(x int) int

func main() {
	fmt.Println("hi")
}
"#;
        let file = parse_file(src).unwrap();
        let names: Vec<_> = file.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Name", "Map", "external", "main"]);
        assert!(file.functions[2].body.is_none());
        assert!(file.functions[3].body.is_some());
    }

    #[test]
    fn test_parse_if_chain() {
        let stmts = body(
            "if x > 0 {\n\ta()\n} else if y := f(); y {\n\tb()\n} else {\n\tif z {\n\t}\n}",
        );
        assert_eq!(stmts.len(), 1);
        let first = if_stmt(&stmts[0]);
        assert_eq!(first.condition, "x > 0");
        assert_eq!(first.then.stmts, vec![Stmt::Other]);

        let Some(Else::If(second)) = &first.otherwise else {
            panic!("expected else if, got {:?}", first.otherwise);
        };
        assert_eq!(second.condition, "y := f(); y");

        let Some(Else::Block(last)) = &second.otherwise else {
            panic!("expected else block, got {:?}", second.otherwise);
        };
        assert_eq!(if_stmt(&last.stmts[0]).condition, "z");
    }

    #[test]
    fn test_skips_other_statements() {
        let test_cases = vec![
            ("for i := 0; i < 3; i++ {\n\tif i == 1 {\n\t}\n}", 1),
            ("switch x := v.(type) {\ncase int:\n\tbreak\ndefault:\n}", 1),
            ("defer func() {\n\trecover()\n}()", 1),
            ("opts := Network.RequestParameters{\n\tHeaders: nil,\n}\nx++", 2),
            ("if ok := func() bool { return true }(); ok {\n}", 1),
            ("outer:\n\tfor {\n\t\tbreak outer\n\t}", 1),
            ("{\n\tx := 1\n\t_ = x\n}", 1),
            ("x := []int{1, 2}; y := x[0]", 2),
            ("for _, p := range []int{22, 80} {\n\t_ = p\n}", 1),
            ("for k, v := range map[string][]int{\"a\": {1}} {\n\t_, _ = k, v\n}", 1),
            ("switch p := &[...]string{\"x\"}; p[0] {\ncase \"x\":\n}", 1),
            ("for _, f := range []func() int{nil} {\n\t_ = f\n}", 1),
        ];

        for (src, count) in test_cases {
            assert_eq!(body(src).len(), count, "{src}");
        }
    }

    #[test]
    fn test_func_literal_in_if_header() {
        let stmts = body("if ok := func() bool { return true }(); ok {\n}");
        assert_eq!(
            if_stmt(&stmts[0]).condition,
            "ok := func() bool { return true }(); ok"
        );
    }

    #[test]
    fn test_composite_literals_in_if_header() {
        let test_cases = vec![
            (
                "if xs := []string{\"a\"}; len(xs) > 0 {\n\tif y {\n\t}\n}",
                "xs := []string{\"a\"}; len(xs) > 0",
            ),
            (
                "if v := (struct{ n int }{n: 1}); v.n > 0 {\n\tif y {\n\t}\n}",
                "v := (struct{ n int }{n: 1}); v.n > 0",
            ),
            (
                "if s := struct{ n int }{n: 1}; s.n > 0 {\n\tif y {\n\t}\n}",
                "s := struct{ n int }{n: 1}; s.n > 0",
            ),
            (
                "if _, ok := map[string]pkg.T{}[k]; ok {\n\tif y {\n\t}\n}",
                "_, ok := map[string]pkg.T{}[k]; ok",
            ),
            (
                "if b := []byte(s); len(b) > 0 {\n\tif y {\n\t}\n}",
                "b := []byte(s); len(b) > 0",
            ),
            ("if flags[0] {\n\tif y {\n\t}\n}", "flags[0]"),
        ];

        for (src, condition) in test_cases {
            let stmts = body(src);
            assert_eq!(stmts.len(), 1, "{src}");
            let stmt = if_stmt(&stmts[0]);
            assert_eq!(stmt.condition, condition);
            assert_eq!(if_stmt(&stmt.then.stmts[0]).condition, "y");
        }
    }

    #[test]
    fn test_syntax_errors() {
        let test_cases = vec![
            ("func main() {}", 1, 1, "expected package clause"),
            ("package main\nfunc main() {\n\tif x {\n", 3, 7, "is never closed"),
            ("package main\nfunc main() {\n\tf(]\n}", 3, 4, "`(` opened at 3:3 is not closed"),
            ("package main\nfunc main() {\n\tif x {\n\t}\n\telse {\n\t}\n}", 5, 2, "unexpected `else`"),
            ("package main\nfunc main() {\n\tif {\n\t}\n}", 3, 2, "missing condition"),
            ("package main\nfunc main() {\n\tif x {\n\t} else y\n}", 4, 9, "`if` or `{` after `else`"),
            ("package main\nx := 1\n", 2, 1, "expected declaration"),
        ];

        for (src, line, column, message) in test_cases {
            let err = parse_file(src).unwrap_err();
            assert_eq!((err.line, err.column), (line, column), "{src:?}: {err}");
            assert!(err.message.contains(message), "{src:?}: {err}");
        }
    }
}
