use std::fmt;

/// Lexical error with the 1-based source line it occurred on.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for SyntaxError {}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Name(String),
    Int(i128),
    Float(f64),
    Str(String),
    /// An f-string. Its content is never literal data, so it is not kept.
    FStr,
    Bytes(Vec<u8>),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Assign,
    Plus,
    Minus,
    /// Any other operator. Only ever consumed while skipping a statement.
    Op(String),
    /// End of a logical line. Never emitted inside brackets.
    Newline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct StrFlags {
    raw: bool,
    bytes: bool,
    fstring: bool,
}

/// Result of decoding one backslash escape.
enum Escaped {
    Char(char),
    /// Numeric escape (`\xhh`, octal); interpreted per string mode.
    Code(u32),
    /// Unrecognized escape; the backslash is preserved.
    Literal(char),
    /// Escaped newline inside a string.
    Nothing,
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    /// Open brackets with the line each was opened on.
    brackets: Vec<(char, usize)>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 0,
            brackets: Vec::new(),
        }
    }

    /// Tokenizes an entire module source.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token()? {
            tokens.push(token);
        }
        if let Some((open, line)) = lexer.brackets.last() {
            return Err(SyntaxError::new(*line, format!("'{}' was never closed", open)));
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn next_token(&mut self) -> Result<Option<Token>, SyntaxError> {
        loop {
            match self.peek() {
                None => return Ok(None),
                Some(' ') | Some('\t') | Some('\r') => {
                    self.advance();
                }
                Some('#') => {
                    while matches!(self.peek(), Some(c) if c != '\n') {
                        self.advance();
                    }
                }
                // explicit line continuation
                Some('\\')
                    if self.peek_at(1) == Some('\n')
                        || (self.peek_at(1) == Some('\r') && self.peek_at(2) == Some('\n')) =>
                {
                    self.advance();
                    if self.peek() == Some('\r') {
                        self.advance();
                    }
                    self.advance();
                }
                Some('\n') => {
                    let (line, col) = (self.line, self.col);
                    self.advance();
                    if self.brackets.is_empty() {
                        return Ok(Some(Token {
                            kind: TokenKind::Newline,
                            line,
                            col,
                        }));
                    }
                }
                Some(_) => break,
            }
        }

        let line = self.line;
        let col = self.col;
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(None),
        };

        let kind = match c {
            '(' | '[' | '{' => {
                self.advance();
                self.brackets.push((c, line));
                match c {
                    '(' => TokenKind::LParen,
                    '[' => TokenKind::LBracket,
                    _ => TokenKind::LBrace,
                }
            }
            ')' | ']' | '}' => {
                self.advance();
                match self.brackets.pop() {
                    None => return Err(SyntaxError::new(line, format!("unmatched '{}'", c))),
                    Some((open, _)) if c != matching_close(open) => {
                        return Err(SyntaxError::new(
                            line,
                            format!(
                                "closing bracket '{}' does not match opening bracket '{}'",
                                c, open
                            ),
                        ));
                    }
                    Some(_) => {}
                }
                match c {
                    ')' => TokenKind::RParen,
                    ']' => TokenKind::RBracket,
                    _ => TokenKind::RBrace,
                }
            }
            ',' => {
                self.advance();
                TokenKind::Comma
            }
            ':' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Op(":=".to_string())
                } else {
                    TokenKind::Colon
                }
            }
            '=' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Op("==".to_string())
                } else {
                    TokenKind::Assign
                }
            }
            '+' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Op("+=".to_string())
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Op("-=".to_string())
                } else if self.peek() == Some('>') {
                    self.advance();
                    TokenKind::Op("->".to_string())
                } else {
                    TokenKind::Minus
                }
            }
            '"' | '\'' => return self.string_token(StrFlags::default(), line, col).map(Some),
            '0'..='9' => return self.number_token(line, col).map(Some),
            '.' => {
                if matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()) {
                    return self.number_token(line, col).map(Some);
                }
                self.advance();
                TokenKind::Op(".".to_string())
            }
            c if is_ident_start(c) => return self.name_token(line, col).map(Some),
            _ => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Op(format!("{}=", c))
                } else {
                    TokenKind::Op(c.to_string())
                }
            }
        };

        Ok(Some(Token { kind, line, col }))
    }

    fn name_token(&mut self, line: usize, col: usize) -> Result<Token, SyntaxError> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if !is_ident_continue(c) {
                break;
            }
            name.push(c);
            self.advance();
        }
        if matches!(self.peek(), Some('"') | Some('\'')) {
            if let Some(flags) = string_prefix(&name) {
                return self.string_token(flags, line, col);
            }
        }
        Ok(Token {
            kind: TokenKind::Name(name),
            line,
            col,
        })
    }

    fn string_token(&mut self, flags: StrFlags, line: usize, col: usize) -> Result<Token, SyntaxError> {
        let quote = match self.advance() {
            Some(q) => q,
            None => return Err(SyntaxError::new(line, "expected string quote")),
        };
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.advance();
            self.advance();
        }

        let mut text = String::new();
        let mut data = Vec::new();

        loop {
            let c = match self.peek() {
                Some(c) => c,
                None => {
                    let message = if triple {
                        "unterminated triple-quoted string literal"
                    } else {
                        "unterminated string literal"
                    };
                    return Err(SyntaxError::new(line, message));
                }
            };

            if c == quote {
                if !triple {
                    self.advance();
                    break;
                }
                if self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote) {
                    self.advance();
                    self.advance();
                    self.advance();
                    break;
                }
                self.advance();
                if flags.bytes {
                    data.push(c as u8);
                } else {
                    text.push(c);
                }
                continue;
            }

            if c == '\n' {
                if !triple {
                    return Err(SyntaxError::new(self.line, "EOL while scanning string literal"));
                }
                self.advance();
                if flags.bytes {
                    data.push(b'\n');
                } else {
                    text.push('\n');
                }
                continue;
            }

            if c == '\\' {
                if flags.raw || flags.fstring {
                    // raw strings keep the backslash and the character after it
                    self.advance();
                    let next = match self.advance() {
                        Some(next) => next,
                        None => return Err(SyntaxError::new(line, "unterminated string literal")),
                    };
                    if flags.raw {
                        if flags.bytes {
                            if !next.is_ascii() {
                                return Err(SyntaxError::new(
                                    self.line,
                                    "bytes can only contain ASCII literal characters",
                                ));
                            }
                            data.push(b'\\');
                            data.push(next as u8);
                        } else {
                            text.push('\\');
                            text.push(next);
                        }
                    }
                    continue;
                }
                match self.escape(flags.bytes)? {
                    Escaped::Nothing => {}
                    Escaped::Char(ec) => {
                        if flags.bytes {
                            data.push(ec as u8);
                        } else {
                            text.push(ec);
                        }
                    }
                    Escaped::Code(value) => {
                        if flags.bytes {
                            data.push((value & 0xFF) as u8);
                        } else if let Some(ec) = char::from_u32(value) {
                            // \x and octal escapes stay within U+01FF
                            text.push(ec);
                        }
                    }
                    Escaped::Literal(ec) => {
                        if flags.bytes {
                            if !ec.is_ascii() {
                                return Err(SyntaxError::new(
                                    self.line,
                                    "bytes can only contain ASCII literal characters",
                                ));
                            }
                            data.push(b'\\');
                            data.push(ec as u8);
                        } else {
                            text.push('\\');
                            text.push(ec);
                        }
                    }
                }
                continue;
            }

            self.advance();
            if flags.bytes {
                if !c.is_ascii() {
                    return Err(SyntaxError::new(
                        self.line,
                        "bytes can only contain ASCII literal characters",
                    ));
                }
                data.push(c as u8);
            } else {
                text.push(c);
            }
        }

        let kind = if flags.fstring {
            TokenKind::FStr
        } else if flags.bytes {
            TokenKind::Bytes(data)
        } else {
            TokenKind::Str(text)
        };
        Ok(Token { kind, line, col })
    }

    fn escape(&mut self, bytes: bool) -> Result<Escaped, SyntaxError> {
        self.advance(); // backslash
        let c = match self.advance() {
            Some(c) => c,
            None => return Err(SyntaxError::new(self.line, "unterminated string literal")),
        };
        let escaped = match c {
            '\n' => Escaped::Nothing,
            '\\' => Escaped::Char('\\'),
            '\'' => Escaped::Char('\''),
            '"' => Escaped::Char('"'),
            'n' => Escaped::Char('\n'),
            't' => Escaped::Char('\t'),
            'r' => Escaped::Char('\r'),
            'a' => Escaped::Char('\x07'),
            'b' => Escaped::Char('\x08'),
            'f' => Escaped::Char('\x0C'),
            'v' => Escaped::Char('\x0B'),
            '0'..='7' => {
                // up to three octal digits
                let mut value = c.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek() {
                        Some(d) if ('0'..='7').contains(&d) => {
                            value = value * 8 + d.to_digit(8).unwrap_or(0);
                            self.advance();
                        }
                        _ => break,
                    }
                }
                Escaped::Code(value)
            }
            'x' => Escaped::Code(self.hex_escape(2, "\\xXX")?),
            'u' if !bytes => {
                let value = self.hex_escape(4, "\\uXXXX")?;
                match char::from_u32(value) {
                    Some(ec) => Escaped::Char(ec),
                    None => return Err(SyntaxError::new(self.line, "invalid unicode escape")),
                }
            }
            'U' if !bytes => {
                let value = self.hex_escape(8, "\\UXXXXXXXX")?;
                match char::from_u32(value) {
                    Some(ec) => Escaped::Char(ec),
                    None => return Err(SyntaxError::new(self.line, "invalid unicode escape")),
                }
            }
            other => Escaped::Literal(other),
        };
        Ok(escaped)
    }

    fn hex_escape(&mut self, count: usize, label: &str) -> Result<u32, SyntaxError> {
        let mut value = 0u32;
        for _ in 0..count {
            match self.peek().and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    value = value * 16 + d;
                    self.advance();
                }
                None => {
                    return Err(SyntaxError::new(
                        self.line,
                        format!("truncated {} escape", label),
                    ))
                }
            }
        }
        Ok(value)
    }

    fn number_token(&mut self, line: usize, col: usize) -> Result<Token, SyntaxError> {
        if self.peek() == Some('0') {
            match self.peek_at(1) {
                Some('x') | Some('X') => return self.radix_token(16, line, col),
                Some('o') | Some('O') => return self.radix_token(8, line, col),
                Some('b') | Some('B') => return self.radix_token(2, line, col),
                _ => {}
            }
        }

        let mut digits = String::new();
        let mut is_float = false;

        self.digits_into(&mut digits);

        if self.peek() == Some('.') {
            is_float = true;
            self.advance();
            digits.push('.');
            let before = digits.len();
            self.digits_into(&mut digits);
            if digits.len() == before {
                digits.push('0');
            }
        }
        if digits.starts_with('.') {
            digits.insert(0, '0');
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            is_float = true;
            self.advance();
            digits.push('e');
            if matches!(self.peek(), Some('+') | Some('-')) {
                if let Some(sign) = self.advance() {
                    digits.push(sign);
                }
            }
            let before = digits.len();
            self.digits_into(&mut digits);
            if digits.len() == before {
                return Err(SyntaxError::new(line, "invalid decimal literal"));
            }
        }

        let kind = if is_float {
            match digits.parse::<f64>() {
                Ok(value) => TokenKind::Float(value),
                Err(_) => return Err(SyntaxError::new(line, "invalid decimal literal")),
            }
        } else {
            let value: i128 = digits
                .parse()
                .map_err(|_| SyntaxError::new(line, "integer literal too large"))?;
            if value > u64::MAX as i128 {
                return Err(SyntaxError::new(line, "integer literal too large"));
            }
            TokenKind::Int(value)
        };
        Ok(Token { kind, line, col })
    }

    /// Collects ASCII digits, dropping `_` separators.
    fn digits_into(&mut self, out: &mut String) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                out.push(c);
                self.advance();
            } else if c == '_' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn radix_token(&mut self, radix: u32, line: usize, col: usize) -> Result<Token, SyntaxError> {
        self.advance(); // 0
        self.advance(); // x, o or b
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if c.is_digit(radix) {
                digits.push(c);
                self.advance();
            } else if c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        if digits.is_empty() {
            return Err(SyntaxError::new(line, "invalid number literal"));
        }
        let value = i128::from_str_radix(&digits, radix)
            .map_err(|_| SyntaxError::new(line, "integer literal too large"))?;
        if value > u64::MAX as i128 {
            return Err(SyntaxError::new(line, "integer literal too large"));
        }
        Ok(Token {
            kind: TokenKind::Int(value),
            line,
            col,
        })
    }
}

fn matching_close(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn string_prefix(name: &str) -> Option<StrFlags> {
    match name.to_ascii_lowercase().as_str() {
        "u" => Some(StrFlags::default()),
        "r" => Some(StrFlags {
            raw: true,
            ..Default::default()
        }),
        "b" => Some(StrFlags {
            bytes: true,
            ..Default::default()
        }),
        "f" => Some(StrFlags {
            fstring: true,
            ..Default::default()
        }),
        "rb" | "br" => Some(StrFlags {
            raw: true,
            bytes: true,
            fstring: false,
        }),
        "rf" | "fr" => Some(StrFlags {
            raw: true,
            fstring: true,
            bytes: false,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    fn lex_err(source: &str) -> SyntaxError {
        Lexer::tokenize(source).unwrap_err()
    }

    #[test]
    fn test_tokenize_assignment() {
        assert_eq!(
            kinds("BASE_TYPE = 0x8F\n"),
            vec![
                TokenKind::Name("BASE_TYPE".to_string()),
                TokenKind::Assign,
                TokenKind::Int(0x8F),
                TokenKind::Newline,
            ]
        );
    }

    #[test]
    fn test_int_literal_forms() {
        assert_eq!(kinds("0"), vec![TokenKind::Int(0)]);
        assert_eq!(kinds("1_000_000"), vec![TokenKind::Int(1_000_000)]);
        assert_eq!(kinds("0xFF"), vec![TokenKind::Int(255)]);
        assert_eq!(kinds("0o777"), vec![TokenKind::Int(511)]);
        assert_eq!(kinds("0b1010"), vec![TokenKind::Int(10)]);
        assert_eq!(
            kinds("0xFFFFFFFFFFFFFFFF"),
            vec![TokenKind::Int(0xFFFF_FFFF_FFFF_FFFF)]
        );
    }

    #[test]
    fn test_int_literal_beyond_u64_is_error() {
        let err = lex_err("X = 0x1FFFFFFFFFFFFFFFF\n");
        assert!(err.message.contains("too large"));
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_float_literal_forms() {
        assert_eq!(kinds("1.5"), vec![TokenKind::Float(1.5)]);
        assert_eq!(kinds(".5"), vec![TokenKind::Float(0.5)]);
        assert_eq!(kinds("5."), vec![TokenKind::Float(5.0)]);
        assert_eq!(kinds("1e3"), vec![TokenKind::Float(1000.0)]);
        assert_eq!(kinds("2.5e-2"), vec![TokenKind::Float(0.025)]);
    }

    #[test]
    fn test_exponent_without_digits_is_error() {
        assert!(lex_err("X = 1e\n").message.contains("invalid decimal literal"));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""a\n\t\x41é""#),
            vec![TokenKind::Str("a\n\tA\u{e9}".to_string())]
        );
    }

    #[test]
    fn test_unicode_escapes() {
        assert_eq!(
            kinds("\"caf\\u00e9\""),
            vec![TokenKind::Str("café".to_string())]
        );
        assert_eq!(
            kinds("\"\\U0001F600\""),
            vec![TokenKind::Str("\u{1F600}".to_string())]
        );
    }

    #[test]
    fn test_unknown_escape_keeps_backslash() {
        assert_eq!(kinds(r#""\d""#), vec![TokenKind::Str("\\d".to_string())]);
    }

    #[test]
    fn test_truncated_hex_escape_is_error() {
        assert!(lex_err(r#"X = "\x4""#).message.contains("truncated"));
    }

    #[test]
    fn test_raw_string_keeps_escapes() {
        assert_eq!(kinds(r#"r"a\nb""#), vec![TokenKind::Str("a\\nb".to_string())]);
    }

    #[test]
    fn test_triple_quoted_string_spans_lines() {
        assert_eq!(
            kinds("\"\"\"line one\nline two\"\"\""),
            vec![TokenKind::Str("line one\nline two".to_string())]
        );
    }

    #[test]
    fn test_bytes_literals() {
        assert_eq!(
            kinds(r#"b"\x00\xff""#),
            vec![TokenKind::Bytes(vec![0x00, 0xFF])]
        );
        assert_eq!(kinds(r#"rb"\x41""#), vec![TokenKind::Bytes(b"\\x41".to_vec())]);
    }

    #[test]
    fn test_fstring_is_opaque() {
        assert_eq!(kinds(r#"f"{x}""#), vec![TokenKind::FStr]);
    }

    #[test]
    fn test_unterminated_string_is_error() {
        assert!(lex_err("X = 'abc\n").message.contains("EOL"));
        assert!(lex_err("X = '''abc\n").message.contains("unterminated"));
    }

    #[test]
    fn test_newlines_suppressed_inside_brackets() {
        assert_eq!(
            kinds("X = [\n    1,\n    2,\n]\n"),
            vec![
                TokenKind::Name("X".to_string()),
                TokenKind::Assign,
                TokenKind::LBracket,
                TokenKind::Int(1),
                TokenKind::Comma,
                TokenKind::Int(2),
                TokenKind::Comma,
                TokenKind::RBracket,
                TokenKind::Newline,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("# header\nX = 1  # trailing\n"),
            vec![
                TokenKind::Newline,
                TokenKind::Name("X".to_string()),
                TokenKind::Assign,
                TokenKind::Int(1),
                TokenKind::Newline,
            ]
        );
    }

    #[test]
    fn test_line_continuation() {
        assert_eq!(
            kinds("X = \\\n    5\n"),
            vec![
                TokenKind::Name("X".to_string()),
                TokenKind::Assign,
                TokenKind::Int(5),
                TokenKind::Newline,
            ]
        );
    }

    #[test]
    fn test_unclosed_bracket_reports_opening_line() {
        let err = lex_err("X = {\n    'a': 1,\n");
        assert_eq!(err.line, 1);
        assert!(err.message.contains("never closed"));
    }

    #[test]
    fn test_mismatched_bracket_is_error() {
        assert!(lex_err("X = [1)\n").message.contains("does not match"));
        assert!(lex_err("X = 1)\n").message.contains("unmatched"));
    }

    #[test]
    fn test_operator_folding() {
        assert_eq!(
            kinds("a == b"),
            vec![
                TokenKind::Name("a".to_string()),
                TokenKind::Op("==".to_string()),
                TokenKind::Name("b".to_string()),
            ]
        );
        assert_eq!(
            kinds("a += 1"),
            vec![
                TokenKind::Name("a".to_string()),
                TokenKind::Op("+=".to_string()),
                TokenKind::Int(1),
            ]
        );
    }

    #[test]
    fn test_tokens_track_columns() {
        let tokens = Lexer::tokenize("X = 1\n    Y = 2\n").unwrap();
        assert_eq!(tokens[0].col, 0);
        assert_eq!(tokens[4].col, 4);
        assert_eq!(tokens[4].line, 2);
    }
}
