//! The statement layer behind `eval`.
//!
//! The bridge executes a small host-statement surface: imports,
//! from-imports, assignments and call expressions. Anything it cannot
//! parse is a host-native syntax error, never a bridged exception.

use crate::error::{BridgeError, Result};

/// A literal value in source text.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// An integer literal.
    Int(i64),
    /// A float literal.
    Float(f64),
    /// A string literal.
    Str(String),
    /// `True` or `False`.
    Bool(bool),
    /// `None`.
    None,
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal.
    Literal(Literal),
    /// A possibly dotted name (`File`, `java.sql.DriverManager`).
    Name(String),
    /// A call, e.g. `File("failed.txt")`.
    Call {
        /// The possibly dotted callee name.
        func: String,
        /// Argument expressions, in order.
        args: Vec<Expr>,
    },
}

/// A single executable statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `import java.sql`
    Import {
        /// The dotted module path.
        path: String,
    },
    /// `from java.io import File, IOException`
    FromImport {
        /// The dotted module path.
        module: String,
        /// The names to bind.
        names: Vec<String>,
    },
    /// `f = File("failed.txt")`
    Assign {
        /// The name being bound.
        target: String,
        /// The value expression.
        value: Expr,
    },
    /// A bare expression.
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    LParen,
    RParen,
    Comma,
    Eq,
    Dot,
    Minus,
}

fn tokenize(src: &str) -> Result<Vec<Tok>> {
    let mut toks = Vec::new();
    let mut chars = src.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }
            '(' => {
                chars.next();
                toks.push(Tok::LParen);
            }
            ')' => {
                chars.next();
                toks.push(Tok::RParen);
            }
            ',' => {
                chars.next();
                toks.push(Tok::Comma);
            }
            '=' => {
                chars.next();
                toks.push(Tok::Eq);
            }
            '.' => {
                chars.next();
                toks.push(Tok::Dot);
            }
            '-' => {
                chars.next();
                toks.push(Tok::Minus);
            }
            '#' => {
                // comment runs to end of line
                for next in chars.by_ref() {
                    if next == '\n' {
                        break;
                    }
                }
            }
            '\'' | '"' => {
                let quote = c;
                chars.next();
                let mut s = String::new();
                let mut terminated = false;
                while let Some(next) = chars.next() {
                    match next {
                        '\\' => match chars.next() {
                            Some('n') => s.push('\n'),
                            Some('t') => s.push('\t'),
                            Some('\\') => s.push('\\'),
                            Some('\'') => s.push('\''),
                            Some('"') => s.push('"'),
                            Some(other) => {
                                return Err(BridgeError::Syntax(format!(
                                    "unknown escape '\\{}'",
                                    other
                                )))
                            }
                            None => {
                                return Err(BridgeError::Syntax(
                                    "unterminated string literal".to_string(),
                                ))
                            }
                        },
                        c if c == quote => {
                            terminated = true;
                            break;
                        }
                        other => s.push(other),
                    }
                }
                if !terminated {
                    return Err(BridgeError::Syntax(
                        "unterminated string literal".to_string(),
                    ));
                }
                toks.push(Tok::Str(s));
            }
            '0'..='9' => {
                let mut num = String::new();
                let mut is_float = false;
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        num.push(d);
                        chars.next();
                    } else if d == '.' && !is_float {
                        // lookahead: "1.5" is a float, "java.io" never
                        // reaches here because it starts with an ident
                        let mut ahead = chars.clone();
                        ahead.next();
                        if ahead.peek().is_some_and(|c| c.is_ascii_digit()) {
                            is_float = true;
                            num.push(d);
                            chars.next();
                        } else {
                            break;
                        }
                    } else {
                        break;
                    }
                }
                if is_float {
                    let value = num.parse::<f64>().map_err(|_| {
                        BridgeError::Syntax(format!("invalid number literal '{}'", num))
                    })?;
                    toks.push(Tok::Float(value));
                } else {
                    let value = num.parse::<i64>().map_err(|_| {
                        BridgeError::Syntax(format!("invalid number literal '{}'", num))
                    })?;
                    toks.push(Tok::Int(value));
                }
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                toks.push(Tok::Ident(ident));
            }
            other => {
                return Err(BridgeError::Syntax(format!(
                    "unexpected character '{}'",
                    other
                )))
            }
        }
    }

    Ok(toks)
}

struct Parser {
    toks: Vec<Tok>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos)
    }

    fn next(&mut self) -> Option<Tok> {
        let tok = self.toks.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.next() {
            Some(Tok::Ident(name)) => Ok(name),
            other => Err(BridgeError::Syntax(format!(
                "expected identifier, found {:?}",
                other
            ))),
        }
    }

    fn dotted_name(&mut self) -> Result<String> {
        let mut name = self.expect_ident()?;
        while matches!(self.peek(), Some(Tok::Dot)) {
            self.next();
            name.push('.');
            name.push_str(&self.expect_ident()?);
        }
        Ok(name)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.toks.len()
    }

    fn expect_end(&self) -> Result<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(BridgeError::Syntax(format!(
                "unexpected trailing input at token {:?}",
                self.peek()
            )))
        }
    }

    fn statement(&mut self) -> Result<Statement> {
        match self.peek() {
            Some(Tok::Ident(kw)) if kw == "import" => {
                self.next();
                let path = self.dotted_name()?;
                self.expect_end()?;
                Ok(Statement::Import { path })
            }
            Some(Tok::Ident(kw)) if kw == "from" => {
                self.next();
                let module = self.dotted_name()?;
                match self.next() {
                    Some(Tok::Ident(kw)) if kw == "import" => {}
                    other => {
                        return Err(BridgeError::Syntax(format!(
                            "expected 'import', found {:?}",
                            other
                        )))
                    }
                }
                let mut names = vec![self.expect_ident()?];
                while matches!(self.peek(), Some(Tok::Comma)) {
                    self.next();
                    names.push(self.expect_ident()?);
                }
                self.expect_end()?;
                Ok(Statement::FromImport { module, names })
            }
            _ => {
                // assignment: a single identifier followed by '='
                if matches!(self.toks.first(), Some(Tok::Ident(_)))
                    && matches!(self.toks.get(1), Some(Tok::Eq))
                {
                    let target = self.expect_ident()?;
                    self.next(); // '='
                    let value = self.expr()?;
                    self.expect_end()?;
                    return Ok(Statement::Assign { target, value });
                }
                let expr = self.expr()?;
                self.expect_end()?;
                Ok(Statement::Expr(expr))
            }
        }
    }

    fn expr(&mut self) -> Result<Expr> {
        match self.next() {
            Some(Tok::Str(s)) => Ok(Expr::Literal(Literal::Str(s))),
            Some(Tok::Int(i)) => Ok(Expr::Literal(Literal::Int(i))),
            Some(Tok::Float(x)) => Ok(Expr::Literal(Literal::Float(x))),
            Some(Tok::Minus) => match self.next() {
                Some(Tok::Int(i)) => Ok(Expr::Literal(Literal::Int(-i))),
                Some(Tok::Float(x)) => Ok(Expr::Literal(Literal::Float(-x))),
                other => Err(BridgeError::Syntax(format!(
                    "expected number after '-', found {:?}",
                    other
                ))),
            },
            Some(Tok::LParen) => {
                let inner = self.expr()?;
                match self.next() {
                    Some(Tok::RParen) => Ok(inner),
                    other => Err(BridgeError::Syntax(format!(
                        "expected ')', found {:?}",
                        other
                    ))),
                }
            }
            Some(Tok::Ident(name)) => match name.as_str() {
                "True" => Ok(Expr::Literal(Literal::Bool(true))),
                "False" => Ok(Expr::Literal(Literal::Bool(false))),
                "None" => Ok(Expr::Literal(Literal::None)),
                _ => {
                    let mut full = name;
                    while matches!(self.peek(), Some(Tok::Dot)) {
                        self.next();
                        full.push('.');
                        full.push_str(&self.expect_ident()?);
                    }
                    if matches!(self.peek(), Some(Tok::LParen)) {
                        self.next();
                        let mut args = Vec::new();
                        if !matches!(self.peek(), Some(Tok::RParen)) {
                            args.push(self.expr()?);
                            while matches!(self.peek(), Some(Tok::Comma)) {
                                self.next();
                                args.push(self.expr()?);
                            }
                        }
                        match self.next() {
                            Some(Tok::RParen) => {}
                            other => {
                                return Err(BridgeError::Syntax(format!(
                                    "expected ')', found {:?}",
                                    other
                                )))
                            }
                        }
                        Ok(Expr::Call { func: full, args })
                    } else {
                        Ok(Expr::Name(full))
                    }
                }
            },
            other => Err(BridgeError::Syntax(format!(
                "unexpected token {:?}",
                other
            ))),
        }
    }
}

/// Parse a single statement.
pub fn parse(source: &str) -> Result<Statement> {
    let toks = tokenize(source)?;
    if toks.is_empty() {
        return Err(BridgeError::Syntax("empty statement".to_string()));
    }
    let mut parser = Parser { toks, pos: 0 };
    parser.statement()
}

/// Check whether source text forms a complete statement.
///
/// Interactive interpreters buffer incomplete input (an open paren, a
/// trailing backslash, a block opener) until flushed.
pub fn is_complete(source: &str) -> bool {
    let mut depth: i32 = 0;
    let mut in_string: Option<char> = None;
    let mut escaped = false;
    let mut last_meaningful: Option<char> = None;

    for c in source.chars() {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                in_string = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => in_string = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ => {}
        }
        if !c.is_whitespace() {
            last_meaningful = Some(c);
        }
    }

    if in_string.is_some() || depth > 0 {
        return false;
    }
    !matches!(last_meaningful, Some(':') | Some('\\'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import() {
        let stmt = parse("import java.sql").unwrap();
        assert_eq!(
            stmt,
            Statement::Import {
                path: "java.sql".to_string()
            }
        );
    }

    #[test]
    fn test_parse_from_import() {
        let stmt = parse("from java.io import File, IOException").unwrap();
        assert_eq!(
            stmt,
            Statement::FromImport {
                module: "java.io".to_string(),
                names: vec!["File".to_string(), "IOException".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_assignment_with_call() {
        let stmt = parse("f = File(\"failed.txt\")").unwrap();
        assert_eq!(
            stmt,
            Statement::Assign {
                target: "f".to_string(),
                value: Expr::Call {
                    func: "File".to_string(),
                    args: vec![Expr::Literal(Literal::Str("failed.txt".to_string()))],
                },
            }
        );
    }

    #[test]
    fn test_parse_dotted_callee_and_mixed_args() {
        let stmt = parse("c = java.sql.DriverManager(1, -2.5, True, None, x)").unwrap();
        match stmt {
            Statement::Assign { target, value } => {
                assert_eq!(target, "c");
                match value {
                    Expr::Call { func, args } => {
                        assert_eq!(func, "java.sql.DriverManager");
                        assert_eq!(args.len(), 5);
                        assert_eq!(args[0], Expr::Literal(Literal::Int(1)));
                        assert_eq!(args[1], Expr::Literal(Literal::Float(-2.5)));
                        assert_eq!(args[2], Expr::Literal(Literal::Bool(true)));
                        assert_eq!(args[3], Expr::Literal(Literal::None));
                        assert_eq!(args[4], Expr::Name("x".to_string()));
                    }
                    other => panic!("expected call, got {other:?}"),
                }
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_parenthesized_multiline() {
        let stmt = parse("x = (\n42)").unwrap();
        assert_eq!(
            stmt,
            Statement::Assign {
                target: "x".to_string(),
                value: Expr::Literal(Literal::Int(42)),
            }
        );
    }

    #[test]
    fn test_malformed_input_is_syntax_error() {
        assert!(matches!(parse(""), Err(BridgeError::Syntax(_))));
        assert!(matches!(parse("import"), Err(BridgeError::Syntax(_))));
        assert!(matches!(parse("from java.io"), Err(BridgeError::Syntax(_))));
        assert!(matches!(parse("f = "), Err(BridgeError::Syntax(_))));
        assert!(matches!(parse("f = File("), Err(BridgeError::Syntax(_))));
        assert!(matches!(parse("if True:"), Err(BridgeError::Syntax(_))));
        assert!(matches!(parse("'unterminated"), Err(BridgeError::Syntax(_))));
    }

    #[test]
    fn test_string_escapes() {
        let stmt = parse(r#"s = "a\n\t\"b\\""#).unwrap();
        assert_eq!(
            stmt,
            Statement::Assign {
                target: "s".to_string(),
                value: Expr::Literal(Literal::Str("a\n\t\"b\\".to_string())),
            }
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let stmt = parse("x = 1 # the answer, roughly").unwrap();
        assert!(matches!(stmt, Statement::Assign { .. }));
    }

    #[test]
    fn test_is_complete() {
        assert!(is_complete("f = File(\"failed.txt\")"));
        assert!(is_complete("import java.sql"));

        assert!(!is_complete("if True:"));
        assert!(!is_complete("x = ("));
        assert!(!is_complete("x = \"unterminated"));
        assert!(!is_complete("x = 1 + \\"));

        // a colon inside a string does not open a block
        assert!(is_complete("x = \"a:b\""));
    }
}
