use std::collections::HashMap;

use crate::domain::model::PyValue;

use super::lexer::{Lexer, SyntaxError, Token, TokenKind};

/// Reads every simple top-level `NAME = <literal>` binding out of a module
/// source. Statements outside the literal subset bind nothing and are
/// skipped; only lexical errors fail the whole module.
pub fn parse_module(source: &str) -> Result<HashMap<String, PyValue>, SyntaxError> {
    let source = source.replace("\r\n", "\n");
    let tokens = Lexer::tokenize(&source)?;
    Ok(Parser::new(tokens).run())
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    bindings: HashMap<String, PyValue>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            bindings: HashMap::new(),
        }
    }

    fn run(mut self) -> HashMap<String, PyValue> {
        while self.pos < self.tokens.len() {
            if self.eat(&TokenKind::Newline) {
                continue;
            }
            self.statement();
        }
        self.bindings
    }

    fn statement(&mut self) {
        let start = self.pos;
        if let Some((name, value)) = self.try_binding() {
            tracing::debug!("Bound top-level name '{}'", name);
            self.bindings.insert(name, value);
            return;
        }
        self.pos = start;
        tracing::debug!(
            "Skipping non-literal statement at line {}",
            self.tokens[start].line
        );
        self.skip_statement();
    }

    /// `NAME = <literal>` or `NAME: <annotation> = <literal>`, starting at
    /// column 0 and spanning the whole logical line. Anything else is `None`.
    fn try_binding(&mut self) -> Option<(String, PyValue)> {
        let token = self.advance()?;
        if token.col != 0 {
            return None;
        }
        let name = match token.kind {
            TokenKind::Name(name) => name,
            _ => return None,
        };
        if !self.eat(&TokenKind::Assign) {
            if !self.eat(&TokenKind::Colon) {
                return None;
            }
            self.skip_annotation()?;
        }
        let value = self.literal_expr()?;
        match self.peek_kind() {
            None => {}
            Some(TokenKind::Newline) => {
                self.pos += 1;
            }
            Some(_) => return None,
        }
        Some((name, value))
    }

    /// Consumes annotation tokens up to the `=` introducing the value.
    fn skip_annotation(&mut self) -> Option<()> {
        let mut depth = 0usize;
        loop {
            let token = self.advance()?;
            match token.kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.checked_sub(1)?;
                }
                TokenKind::Assign if depth == 0 => return Some(()),
                TokenKind::Newline => return None,
                _ => {}
            }
        }
    }

    fn literal_expr(&mut self) -> Option<PyValue> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::Name(name) => match name.as_str() {
                "None" => Some(PyValue::None),
                "True" => Some(PyValue::Bool(true)),
                "False" => Some(PyValue::Bool(false)),
                // an alias of a previously bound top-level name
                _ => self.bindings.get(&name).cloned(),
            },
            TokenKind::Int(value) => Some(PyValue::Int(value)),
            TokenKind::Float(value) => Some(PyValue::Float(value)),
            TokenKind::Str(_) | TokenKind::Bytes(_) => {
                self.pos -= 1;
                self.adjacent_strings()
            }
            TokenKind::Plus => match self.literal_expr()? {
                value @ (PyValue::Int(_) | PyValue::Float(_)) => Some(value),
                _ => None,
            },
            TokenKind::Minus => match self.literal_expr()? {
                PyValue::Int(value) => Some(PyValue::Int(-value)),
                PyValue::Float(value) => Some(PyValue::Float(-value)),
                _ => None,
            },
            TokenKind::LParen => self.paren_expr(),
            TokenKind::LBracket => Some(PyValue::List(self.seq_items(TokenKind::RBracket)?)),
            TokenKind::LBrace => self.brace_expr(),
            _ => None,
        }
    }

    /// Adjacent string (or bytes) literals concatenate, as in Python source.
    fn adjacent_strings(&mut self) -> Option<PyValue> {
        match self.peek_kind()? {
            TokenKind::Str(_) => {
                let mut text = String::new();
                while let Some(TokenKind::Str(part)) = self.peek_kind() {
                    text.push_str(part);
                    self.pos += 1;
                }
                Some(PyValue::Str(text))
            }
            TokenKind::Bytes(_) => {
                let mut data = Vec::new();
                while let Some(TokenKind::Bytes(part)) = self.peek_kind() {
                    data.extend_from_slice(part);
                    self.pos += 1;
                }
                Some(PyValue::Bytes(data))
            }
            _ => None,
        }
    }

    fn paren_expr(&mut self) -> Option<PyValue> {
        if self.eat(&TokenKind::RParen) {
            return Some(PyValue::Tuple(Vec::new()));
        }
        let first = self.literal_expr()?;
        if self.eat(&TokenKind::RParen) {
            // parentheses around a single value are grouping, not a tuple
            return Some(first);
        }
        if !self.eat(&TokenKind::Comma) {
            return None;
        }
        let mut items = vec![first];
        items.extend(self.seq_items(TokenKind::RParen)?);
        Some(PyValue::Tuple(items))
    }

    fn brace_expr(&mut self) -> Option<PyValue> {
        if self.eat(&TokenKind::RBrace) {
            // {} is an empty dict, never an empty set
            return Some(PyValue::Dict(Vec::new()));
        }
        let first = self.literal_expr()?;
        if !self.eat(&TokenKind::Colon) {
            if self.eat(&TokenKind::RBrace) {
                return Some(PyValue::Set(vec![first]));
            }
            if !self.eat(&TokenKind::Comma) {
                return None;
            }
            let mut items = vec![first];
            items.extend(self.seq_items(TokenKind::RBrace)?);
            return Some(PyValue::Set(items));
        }
        let value = self.literal_expr()?;
        let mut entries = Vec::new();
        dict_insert(&mut entries, first, value);
        loop {
            if self.eat(&TokenKind::RBrace) {
                return Some(PyValue::Dict(entries));
            }
            if !self.eat(&TokenKind::Comma) {
                return None;
            }
            if self.eat(&TokenKind::RBrace) {
                return Some(PyValue::Dict(entries));
            }
            let key = self.literal_expr()?;
            if !self.eat(&TokenKind::Colon) {
                return None;
            }
            let value = self.literal_expr()?;
            dict_insert(&mut entries, key, value);
        }
    }

    /// Comma-separated literal elements up to and including `close`.
    fn seq_items(&mut self, close: TokenKind) -> Option<Vec<PyValue>> {
        let mut items = Vec::new();
        loop {
            if self.eat(&close) {
                return Some(items);
            }
            items.push(self.literal_expr()?);
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            if self.eat(&close) {
                return Some(items);
            }
            return None;
        }
    }

    fn skip_statement(&mut self) {
        while let Some(token) = self.advance() {
            if token.kind == TokenKind::Newline {
                return;
            }
        }
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|token| &token.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned()?;
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }
}

/// Python dict semantics: a repeated key keeps its original position but
/// takes the latest value.
fn dict_insert(entries: &mut Vec<(PyValue, PyValue)>, key: PyValue, value: PyValue) {
    match entries.iter_mut().find(|(existing, _)| *existing == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key, value)),
    }
}
