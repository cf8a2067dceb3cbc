//! Small hand-written lexer for Go source.
//!
//! Only what the statement-level parser needs: identifiers, literals,
//! brackets and operators. Keywords come out as `Ident("if")`,
//! `Ident("func")`, …   The parser interprets them later.
//
//  Lexical items:
//
//      Ident    ::= letter (letter | digit)*
//      Number   ::= digit … | '.' digit …     (kept as source text)
//      Str      ::= '"' … '"' | '`' … '`'
//      Char     ::= '\'' … '\''
//      Comments (// and /* */) are discarded.
//
//  Semicolons are inserted at a newline (and at EOF) when the last token was
//  an identifier, a literal, one of the keywords break/continue/fallthrough/
//  return, one of `++ -- ) ] }`.

use crate::error::SyntaxError;

use super::literal::is_keyword;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Ident(String),
    Number(String),
    Str(String),  // includes the quotes
    Char(String), // includes the quotes
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semicolon, // explicit or inserted
    Op(String),
    Eof,
}

impl Token {
    /// Human readable form for error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(s) | Token::Number(s) | Token::Str(s) | Token::Char(s) | Token::Op(s) => {
                format!("`{s}`")
            }
            Token::LParen => "`(`".into(),
            Token::RParen => "`)`".into(),
            Token::LBracket => "`[`".into(),
            Token::RBracket => "`]`".into(),
            Token::LBrace => "`{`".into(),
            Token::RBrace => "`}`".into(),
            Token::Comma => "`,`".into(),
            Token::Colon => "`:`".into(),
            Token::Semicolon => "`;` or newline".into(),
            Token::Eof => "end of file".into(),
        }
    }
}

/// A token plus where it starts (1-based line/column) and its byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub token: Token,
    pub line: usize,
    pub column: usize,
    pub start: usize,
    pub end: usize,
}

const OPERATORS: &[&str] = &[
    "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=", ":=", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "&^", "+", "-", "*", "/", "%", "&",
    "|", "^", "<", ">", "=", "!", ".", "~",
];

#[derive(Clone)]
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    insert_semicolon: bool,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
            insert_semicolon: false,
            finished: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn consume_while<F: Fn(char) -> bool>(&mut self, pred: F) {
        while let Some(c) = self.peek_char() {
            if pred(c) {
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn lexeme(&self, token: Token, line: usize, column: usize, start: usize) -> Lexeme {
        Lexeme {
            token,
            line,
            column,
            start,
            end: self.pos,
        }
    }

    /// Implicit `;` at the current position, if the previous token allows one.
    fn take_semicolon(&mut self) -> Option<Lexeme> {
        if !self.insert_semicolon {
            return None;
        }
        self.insert_semicolon = false;
        Some(self.lexeme(Token::Semicolon, self.line, self.column, self.pos))
    }

    /// Skip blanks and comments. Returns an inserted semicolon when a
    /// newline (or a comment spanning one) ends the statement.
    fn skip_trivia(&mut self) -> Result<Option<Lexeme>, SyntaxError> {
        loop {
            match (self.peek_char(), self.peek_second()) {
                (Some(' ' | '\t' | '\r'), _) => {
                    self.next_char();
                }
                (Some('\n'), _) => {
                    if let Some(semi) = self.take_semicolon() {
                        self.next_char();
                        return Ok(Some(semi));
                    }
                    self.next_char();
                }
                (Some('/'), Some('/')) => {
                    self.consume_while(|c| c != '\n');
                }
                (Some('/'), Some('*')) => {
                    let (line, column) = (self.line, self.column);
                    let semi = self.take_semicolon();
                    self.next_char();
                    self.next_char();
                    let mut spans_lines = false;
                    loop {
                        match self.next_char() {
                            Some('*') if self.peek_char() == Some('/') => {
                                self.next_char();
                                break;
                            }
                            Some('\n') => spans_lines = true,
                            Some(_) => {}
                            None => {
                                return Err(SyntaxError::new(line, column, "comment not terminated"));
                            }
                        }
                    }
                    if semi.is_some() && spans_lines {
                        return Ok(semi);
                    }
                    // a comment on one line does not end the statement
                    self.insert_semicolon = semi.is_some();
                }
                _ => return Ok(None),
            }
        }
    }

    fn read_number(&mut self, first: char) {
        let hex = first == '0' && matches!(self.peek_char(), Some('x' | 'X'));
        let mut prev = first;
        while let Some(c) = self.peek_char() {
            let exponent_sign = matches!(c, '+' | '-')
                && if hex {
                    matches!(prev, 'p' | 'P')
                } else {
                    matches!(prev, 'e' | 'E')
                };
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || exponent_sign {
                prev = c;
                self.next_char();
            } else {
                break;
            }
        }
    }

    /// Interpreted string or rune body, after the opening quote.
    fn read_quoted(&mut self, quote: char, line: usize, column: usize) -> Result<(), SyntaxError> {
        let what = if quote == '"' { "string" } else { "rune" };
        loop {
            match self.next_char() {
                Some('\\') => {
                    if self.next_char().is_none() {
                        break;
                    }
                }
                Some(c) if c == quote => return Ok(()),
                Some('\n') | None => break,
                Some(_) => {}
            }
        }
        Err(SyntaxError::new(line, column, format!("{what} literal not terminated")))
    }

    fn read_raw_string(&mut self, line: usize, column: usize) -> Result<(), SyntaxError> {
        loop {
            match self.next_char() {
                Some('`') => return Ok(()),
                Some(_) => {}
                None => {
                    return Err(SyntaxError::new(line, column, "raw string literal not terminated"));
                }
            }
        }
    }

    fn read_token(&mut self) -> Result<Lexeme, SyntaxError> {
        let (line, column, start) = (self.line, self.column, self.pos);

        let Some(ch) = self.next_char() else {
            self.finished = true;
            return Ok(self.lexeme(Token::Eof, line, column, start));
        };

        let token = match ch {
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            ':' if self.peek_char() != Some('=') => Token::Colon,
            '"' | '\'' => {
                self.read_quoted(ch, line, column)?;
                let text = self.src[start..self.pos].to_string();
                if ch == '"' {
                    Token::Str(text)
                } else {
                    Token::Char(text)
                }
            }
            '`' => {
                self.read_raw_string(line, column)?;
                Token::Str(self.src[start..self.pos].to_string())
            }
            c if c.is_ascii_digit()
                || (c == '.' && self.peek_char().is_some_and(|n| n.is_ascii_digit())) =>
            {
                self.read_number(c);
                Token::Number(self.src[start..self.pos].to_string())
            }
            c if c.is_alphabetic() || c == '_' => {
                self.consume_while(|c| c.is_alphanumeric() || c == '_');
                Token::Ident(self.src[start..self.pos].to_string())
            }
            _ => {
                let op = OPERATORS
                    .iter()
                    .find(|op| self.src[start..].starts_with(**op))
                    .ok_or_else(|| {
                        SyntaxError::new(line, column, format!("unexpected character {ch:?}"))
                    })?;
                // first char already consumed
                for _ in 1..op.len() {
                    self.next_char();
                }
                Token::Op(op.to_string())
            }
        };

        self.insert_semicolon = match &token {
            Token::Ident(name) => {
                !is_keyword(name)
                    || matches!(name.as_str(), "break" | "continue" | "fallthrough" | "return")
            }
            Token::Number(_) | Token::Str(_) | Token::Char(_) => true,
            Token::RParen | Token::RBracket | Token::RBrace => true,
            Token::Op(op) => op == "++" || op == "--",
            _ => false,
        };

        Ok(self.lexeme(token, line, column, start))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Lexeme, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.skip_trivia() {
            Ok(Some(semi)) => return Some(Ok(semi)),
            Ok(None) => {}
            Err(e) => {
                self.finished = true;
                return Some(Err(e));
            }
        }

        if self.peek_char().is_none() {
            if let Some(semi) = self.take_semicolon() {
                return Some(Ok(semi));
            }
        }

        let res = self.read_token();
        if res.is_err() {
            self.finished = true;
        }
        Some(res)
    }
}

#[cfg(test)]
mod tests {
    use super::{Lexer, Token};

    fn tokens(src: &str) -> Vec<Token> {
        let lexemes: Result<Vec<_>, _> = Lexer::new(src).collect();
        lexemes.unwrap().into_iter().map(|l| l.token).collect()
    }

    fn ident(s: &str) -> Token {
        Token::Ident(s.into())
    }

    fn op(s: &str) -> Token {
        Token::Op(s.into())
    }

    #[test]
    fn test_tokenisation() {
        let test_cases = vec![
            (
                r#"x := Endpoint.Find(".txt")"#,
                vec![
                    ident("x"),
                    op(":="),
                    ident("Endpoint"),
                    op("."),
                    ident("Find"),
                    Token::LParen,
                    Token::Str(r#"".txt""#.into()),
                    Token::RParen,
                    Token::Semicolon,
                    Token::Eof,
                ],
            ),
            (
                "if len(files) == 0 {",
                vec![
                    ident("if"),
                    ident("len"),
                    Token::LParen,
                    ident("files"),
                    Token::RParen,
                    op("=="),
                    Token::Number("0".into()),
                    Token::LBrace,
                    Token::Eof,
                ],
            ),
            (
                "a <<= 0x1p-2 &^ 1e+3",
                vec![
                    ident("a"),
                    op("<<="),
                    Token::Number("0x1p-2".into()),
                    op("&^"),
                    Token::Number("1e+3".into()),
                    Token::Semicolon,
                    Token::Eof,
                ],
            ),
            (
                "label: r := '\\''",
                vec![
                    ident("label"),
                    Token::Colon,
                    ident("r"),
                    op(":="),
                    Token::Char("'\\''".into()),
                    Token::Semicolon,
                    Token::Eof,
                ],
            ),
        ];

        for (src, expected) in test_cases {
            assert_eq!(tokens(src), expected, "{src}");
        }
    }

    #[test]
    fn test_semicolon_insertion() {
        let test_cases = vec![
            ("x++\ny", vec![ident("x"), op("++"), Token::Semicolon, ident("y"), Token::Semicolon, Token::Eof]),
            ("x +\ny", vec![ident("x"), op("+"), ident("y"), Token::Semicolon, Token::Eof]),
            ("}\nelse", vec![Token::RBrace, Token::Semicolon, ident("else"), Token::Eof]),
            ("} else\n{", vec![Token::RBrace, ident("else"), Token::LBrace, Token::Eof]),
            ("return // done\n", vec![ident("return"), Token::Semicolon, Token::Eof]),
            ("f() /* a\nb */ g()", vec![
                ident("f"),
                Token::LParen,
                Token::RParen,
                Token::Semicolon,
                ident("g"),
                Token::LParen,
                Token::RParen,
                Token::Semicolon,
                Token::Eof,
            ]),
            ("f() /* same line */ + g", vec![
                ident("f"),
                Token::LParen,
                Token::RParen,
                op("+"),
                ident("g"),
                Token::Semicolon,
                Token::Eof,
            ]),
        ];

        for (src, expected) in test_cases {
            assert_eq!(tokens(src), expected, "{src:?}");
        }
    }

    #[test]
    fn test_literals_keep_braces() {
        let toks = tokens("s := \"{ not a block }\" + `raw\n}`");
        assert!(!toks.contains(&Token::LBrace));
        assert!(!toks.contains(&Token::RBrace));
        assert_eq!(toks[4], Token::Str("`raw\n}`".into()));
    }

    #[test]
    fn test_errors_have_positions() {
        let test_cases = vec![
            ("x := \"open\n", 1, 6, "string literal not terminated"),
            ("ok\n  `raw", 2, 3, "raw string literal not terminated"),
            ("/* never closed", 1, 1, "comment not terminated"),
            ("a ? b", 1, 3, "unexpected character '?'"),
        ];

        for (src, line, column, message) in test_cases {
            let res: Result<Vec<_>, _> = Lexer::new(src).collect();
            let err = res.unwrap_err();
            assert_eq!((err.line, err.column), (line, column), "{src:?}");
            assert_eq!(err.message, message);
        }
    }

    #[test]
    fn test_positions() {
        let lexemes: Vec<_> = Lexer::new("func main() {\n\tif ok {\n").map(Result::unwrap).collect();
        let if_kw = lexemes
            .iter()
            .find(|l| l.token == Token::Ident("if".into()))
            .unwrap();
        assert_eq!((if_kw.line, if_kw.column), (2, 2));
        assert_eq!(&"func main() {\n\tif ok {\n"[if_kw.start..if_kw.end], "if");
    }
}
