//! The Odal tokenizer.
//!
//! A pull lexer: each call to [`Lexer::next`] scans and returns the next
//! token. Newlines after a token that can end a statement are turned into
//! `Semicolon` tokens flagged [`TokenFlags::FROM_NEWLINE`], so the parser
//! always sees a semicolon-terminated statement stream. The same
//! insertion happens once at end of input.

use memchr::memchr;
use odal_core::text::{LineCol, LineMap, Span};
use unicode_xid::UnicodeXID;

use crate::token::{
    keyword_from_str, word_operator_from_str, AssignKind, LiteralKind, OperatorKind, Token,
    TokenFlags, TokenKind,
};

pub struct Lexer<'a> {
    text: &'a str,
    pos: usize,
    line_map: LineMap,
    /// Kind of the most recently returned token; drives semicolon insertion.
    last: TokenKind,
}

/// Whether a token of this kind can end a statement, making a following
/// newline significant.
fn ends_statement(kind: TokenKind) -> bool {
    use crate::token::KeywordKind::*;
    use OperatorKind::*;
    match kind {
        TokenKind::Identifier
        | TokenKind::Literal(_)
        | TokenKind::Undefined
        | TokenKind::RightBrace => true,
        TokenKind::Keyword(Break | Continue | Fallthrough | Return | Context) => true,
        TokenKind::Operator(RParen | RBracket | Pointer | OrReturn | OrBreak | OrContinue) => true,
        _ => false,
    }
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            line_map: LineMap::new(text),
            last: TokenKind::Invalid,
        }
    }

    /// Scan and return the next token. Past end of input this keeps
    /// returning `EndOfFile`.
    pub fn next(&mut self) -> Token {
        let token = self.scan();
        self.last = token.kind;
        token
    }

    /// The raw source text of a token. Semicolons synthesized from a
    /// newline report `"\n"`.
    pub fn text_of(&self, token: &Token) -> &'a str {
        if token.is_from_newline() {
            return "\n";
        }
        &self.text[token.span.to_range()]
    }

    /// The contents of a string or rune literal, without the surrounding
    /// quotes. Escapes are not decoded at this layer.
    pub fn string_value(&self, token: &Token) -> &'a str {
        let raw = self.text_of(token);
        match token.kind {
            TokenKind::Literal(LiteralKind::String) => raw
                .strip_prefix('"')
                .map(|s| s.strip_suffix('"').unwrap_or(s))
                .unwrap_or(raw),
            TokenKind::Literal(LiteralKind::Rune) => raw
                .strip_prefix('\'')
                .map(|s| s.strip_suffix('\'').unwrap_or(s))
                .unwrap_or(raw),
            _ => raw,
        }
    }

    /// The 1-based line/column of a token, for diagnostics.
    pub fn position_of(&self, token: &Token) -> LineCol {
        self.line_map.line_col(token.span.offset)
    }

    // ========================================================================
    // Scanning
    // ========================================================================

    #[inline]
    fn peek(&self, ahead: usize) -> u8 {
        *self.text.as_bytes().get(self.pos + ahead).unwrap_or(&0)
    }

    fn scan(&mut self) -> Token {
        // Skip trivia; a significant newline becomes a semicolon token.
        loop {
            if self.pos >= self.text.len() {
                let span = Span::empty(self.pos as u32);
                if ends_statement(self.last) {
                    return Token::new(TokenKind::Semicolon, span)
                        .with_flags(TokenFlags::FROM_NEWLINE);
                }
                return Token::new(TokenKind::EndOfFile, span);
            }
            match self.peek(0) {
                b' ' | b'\t' | b'\r' => self.pos += 1,
                b'\n' => {
                    if ends_statement(self.last) {
                        let token = Token::new(TokenKind::Semicolon, Span::new(self.pos as u32, 1))
                            .with_flags(TokenFlags::FROM_NEWLINE);
                        self.pos += 1;
                        return token;
                    }
                    self.pos += 1;
                }
                b'/' if self.peek(1) == b'/' => {
                    // Stop before the newline so it is seen by this loop.
                    self.pos = match memchr(b'\n', &self.text.as_bytes()[self.pos..]) {
                        Some(i) => self.pos + i,
                        None => self.text.len(),
                    };
                }
                b'/' if self.peek(1) == b'*' => self.skip_block_comment(),
                _ => break,
            }
        }

        let start = self.pos;
        let kind = self.scan_token();
        Token::new(kind, Span::new(start as u32, (self.pos - start) as u32))
    }

    /// Skip a block comment. Block comments nest.
    fn skip_block_comment(&mut self) {
        let bytes = self.text.as_bytes();
        self.pos += 2;
        let mut depth = 1usize;
        while depth > 0 && self.pos < bytes.len() {
            if bytes[self.pos] == b'/' && self.peek(1) == b'*' {
                depth += 1;
                self.pos += 2;
            } else if bytes[self.pos] == b'*' && self.peek(1) == b'/' {
                depth -= 1;
                self.pos += 2;
            } else {
                self.pos += 1;
            }
        }
    }

    fn scan_token(&mut self) -> TokenKind {
        use OperatorKind::*;
        use TokenKind::*;

        let b = self.peek(0);
        match b {
            b'0'..=b'9' => self.scan_number(),
            b'"' => self.scan_string(),
            b'\'' => self.scan_rune(),
            b';' => self.one(Semicolon),
            b',' => self.one(Comma),
            b'{' => self.one(LeftBrace),
            b'}' => self.one(RightBrace),
            b'@' => self.one(Attribute),
            b'#' => {
                self.pos += 1;
                self.eat_identifier_tail();
                Directive
            }
            b'(' => self.one(Operator(LParen)),
            b')' => self.one(Operator(RParen)),
            b'[' => self.one(Operator(LBracket)),
            b']' => self.one(Operator(RBracket)),
            b'^' => self.one(Operator(Pointer)),
            b'?' => self.one(Operator(Question)),
            b':' => self.one(Operator(Colon)),
            b'.' => {
                if self.peek(1) == b'.' {
                    match self.peek(2) {
                        b'=' => self.many(3, Operator(RangeIncl)),
                        b'<' => self.many(3, Operator(RangeExcl)),
                        _ => self.many(2, Operator(Ellipsis)),
                    }
                } else {
                    self.one(Operator(Period))
                }
            }
            b'+' => self.op_or_assign(Add, AssignKind::Add),
            b'-' => {
                if self.peek(1) == b'-' && self.peek(2) == b'-' {
                    self.many(3, Undefined)
                } else if self.peek(1) == b'>' {
                    self.many(2, Operator(Arrow))
                } else {
                    self.op_or_assign(Sub, AssignKind::Sub)
                }
            }
            b'*' => self.op_or_assign(Mul, AssignKind::Mul),
            b'/' => self.op_or_assign(Quo, AssignKind::Quo),
            b'%' => {
                if self.peek(1) == b'%' {
                    self.many(2, Operator(ModMod))
                } else {
                    self.op_or_assign(Mod, AssignKind::Mod)
                }
            }
            b'&' => {
                if self.peek(1) == b'~' {
                    if self.peek(2) == b'=' {
                        self.many(3, Assignment(AssignKind::AndNot))
                    } else {
                        self.many(2, Operator(AndNot))
                    }
                } else if self.peek(1) == b'&' {
                    if self.peek(2) == b'=' {
                        self.many(3, Assignment(AssignKind::CondAnd))
                    } else {
                        self.many(2, Operator(CondAnd))
                    }
                } else {
                    self.op_or_assign(And, AssignKind::And)
                }
            }
            b'|' => {
                if self.peek(1) == b'|' {
                    if self.peek(2) == b'=' {
                        self.many(3, Assignment(AssignKind::CondOr))
                    } else {
                        self.many(2, Operator(CondOr))
                    }
                } else {
                    self.op_or_assign(Or, AssignKind::Or)
                }
            }
            b'~' => self.op_or_assign(Xor, AssignKind::Xor),
            b'<' => {
                if self.peek(1) == b'<' {
                    if self.peek(2) == b'=' {
                        self.many(3, Assignment(AssignKind::Shl))
                    } else {
                        self.many(2, Operator(Shl))
                    }
                } else if self.peek(1) == b'=' {
                    self.many(2, Operator(LtEq))
                } else {
                    self.one(Operator(Lt))
                }
            }
            b'>' => {
                if self.peek(1) == b'>' {
                    if self.peek(2) == b'=' {
                        self.many(3, Assignment(AssignKind::Shr))
                    } else {
                        self.many(2, Operator(Shr))
                    }
                } else if self.peek(1) == b'=' {
                    self.many(2, Operator(GtEq))
                } else {
                    self.one(Operator(Gt))
                }
            }
            b'=' => {
                if self.peek(1) == b'=' {
                    self.many(2, Operator(CmpEq))
                } else {
                    self.one(Assignment(AssignKind::Eq))
                }
            }
            b'!' => {
                if self.peek(1) == b'=' {
                    self.many(2, Operator(NotEq))
                } else {
                    self.one(Operator(Not))
                }
            }
            _ => {
                let ch = self.text[self.pos..].chars().next().unwrap_or('\u{FFFD}');
                if ch == '_' || ch.is_xid_start() {
                    let start = self.pos;
                    self.pos += ch.len_utf8();
                    self.eat_identifier_tail();
                    let text = &self.text[start..self.pos];
                    if let Some(keyword) = keyword_from_str(text) {
                        Keyword(keyword)
                    } else if let Some(op) = word_operator_from_str(text) {
                        Operator(op)
                    } else {
                        Identifier
                    }
                } else {
                    self.pos += ch.len_utf8();
                    Invalid
                }
            }
        }
    }

    #[inline]
    fn one(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    #[inline]
    fn many(&mut self, n: usize, kind: TokenKind) -> TokenKind {
        self.pos += n;
        kind
    }

    /// `X` or `X=`.
    fn op_or_assign(&mut self, op: OperatorKind, assign: AssignKind) -> TokenKind {
        if self.peek(1) == b'=' {
            self.many(2, TokenKind::Assignment(assign))
        } else {
            self.one(TokenKind::Operator(op))
        }
    }

    fn eat_identifier_tail(&mut self) {
        while self.pos < self.text.len() {
            let ch = self.text[self.pos..].chars().next().unwrap_or('\u{FFFD}');
            if ch == '_' || ch.is_xid_continue() {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
    }

    fn scan_number(&mut self) -> TokenKind {
        let bytes = self.text.as_bytes();
        if self.peek(0) == b'0' && matches!(self.peek(1), b'x' | b'b' | b'o') {
            self.pos += 2;
            while self.pos < bytes.len()
                && (bytes[self.pos].is_ascii_alphanumeric() || bytes[self.pos] == b'_')
            {
                self.pos += 1;
            }
            return TokenKind::Literal(LiteralKind::Integer);
        }

        let mut kind = LiteralKind::Integer;
        self.eat_digits();
        // A `.` starts a fraction only when a digit follows; `1..2` is a
        // range expression, not two floats.
        if self.peek(0) == b'.' && self.peek(1).is_ascii_digit() {
            kind = LiteralKind::Float;
            self.pos += 1;
            self.eat_digits();
        }
        if matches!(self.peek(0), b'e' | b'E') {
            let after_sign = if matches!(self.peek(1), b'+' | b'-') { 2 } else { 1 };
            if self
                .text
                .as_bytes()
                .get(self.pos + after_sign)
                .is_some_and(|b| b.is_ascii_digit())
            {
                kind = LiteralKind::Float;
                self.pos += after_sign;
                self.eat_digits();
            }
        }
        if self.peek(0) == b'i' {
            self.pos += 1;
            return TokenKind::Literal(LiteralKind::Imaginary);
        }
        TokenKind::Literal(kind)
    }

    fn eat_digits(&mut self) {
        while self.peek(0).is_ascii_digit() || self.peek(0) == b'_' {
            self.pos += 1;
        }
    }

    fn scan_string(&mut self) -> TokenKind {
        self.pos += 1;
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\\' => self.pos = (self.pos + 2).min(bytes.len()),
                b'"' => {
                    self.pos += 1;
                    return TokenKind::Literal(LiteralKind::String);
                }
                b'\n' => break,
                _ => self.pos += 1,
            }
        }
        TokenKind::Invalid
    }

    fn scan_rune(&mut self) -> TokenKind {
        self.pos += 1;
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\\' => self.pos = (self.pos + 2).min(bytes.len()),
                b'\'' => {
                    self.pos += 1;
                    return TokenKind::Literal(LiteralKind::Rune);
                }
                b'\n' => break,
                _ => self.pos += 1,
            }
        }
        TokenKind::Invalid
    }
}
