//! Token vocabulary produced by the lexer.
//!
//! The parser dispatches on four discriminant layers: the token kind, and
//! for keyword/operator/literal/assignment tokens the sub-kind carried in
//! the variant payload.

use bitflags::bitflags;
use odal_core::text::Span;

/// The sub-kind of a literal token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Integer,
    Float,
    Imaginary,
    Rune,
    String,
}

/// Keywords. Word-shaped operators (`cast`, `or_return`, …) are not here;
/// the lexer classifies them as [`OperatorKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordKind {
    Package,
    Import,
    Defer,
    Return,
    Break,
    Continue,
    Fallthrough,
    If,
    Else,
    When,
    For,
    Switch,
    Do,
    Proc,
    Struct,
    Context,
    Using,
    Foreign,
}

/// Operators, both punctuation-shaped and word-shaped.
///
/// Binary operators have a static precedence (see the parser's precedence
/// table); everything else here participates in unary, postfix, or
/// grouping syntax only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OperatorKind {
    // Grouping and structure
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Period,
    Ellipsis,
    RangeIncl,
    RangeExcl,
    Arrow,
    Question,
    Pointer,

    // Word-shaped
    OrReturn,
    OrBreak,
    OrContinue,
    Cast,
    Transmute,
    AutoCast,

    // Unary
    Not,

    // Binary
    CondOr,
    CondAnd,
    CmpEq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Add,
    Sub,
    Or,
    Xor,
    Mul,
    Quo,
    Mod,
    ModMod,
    Shl,
    Shr,
    And,
    AndNot,
}

impl OperatorKind {
    /// The spelling of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            OperatorKind::LParen => "(",
            OperatorKind::RParen => ")",
            OperatorKind::LBracket => "[",
            OperatorKind::RBracket => "]",
            OperatorKind::Colon => ":",
            OperatorKind::Period => ".",
            OperatorKind::Ellipsis => "..",
            OperatorKind::RangeIncl => "..=",
            OperatorKind::RangeExcl => "..<",
            OperatorKind::Arrow => "->",
            OperatorKind::Question => "?",
            OperatorKind::Pointer => "^",
            OperatorKind::OrReturn => "or_return",
            OperatorKind::OrBreak => "or_break",
            OperatorKind::OrContinue => "or_continue",
            OperatorKind::Cast => "cast",
            OperatorKind::Transmute => "transmute",
            OperatorKind::AutoCast => "auto_cast",
            OperatorKind::Not => "!",
            OperatorKind::CondOr => "||",
            OperatorKind::CondAnd => "&&",
            OperatorKind::CmpEq => "==",
            OperatorKind::NotEq => "!=",
            OperatorKind::Lt => "<",
            OperatorKind::Gt => ">",
            OperatorKind::LtEq => "<=",
            OperatorKind::GtEq => ">=",
            OperatorKind::Add => "+",
            OperatorKind::Sub => "-",
            OperatorKind::Or => "|",
            OperatorKind::Xor => "~",
            OperatorKind::Mul => "*",
            OperatorKind::Quo => "/",
            OperatorKind::Mod => "%",
            OperatorKind::ModMod => "%%",
            OperatorKind::Shl => "<<",
            OperatorKind::Shr => ">>",
            OperatorKind::And => "&",
            OperatorKind::AndNot => "&~",
        }
    }
}

/// Assignment operators. `=` is always an assignment token, never an
/// [`OperatorKind`]; the parser's declaration grammar checks for
/// `Assignment(Eq)` after `:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignKind {
    Eq,
    Add,
    Sub,
    Mul,
    Quo,
    Mod,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
    CondAnd,
    CondOr,
}

impl AssignKind {
    /// The spelling of this assignment operator.
    pub fn as_str(self) -> &'static str {
        match self {
            AssignKind::Eq => "=",
            AssignKind::Add => "+=",
            AssignKind::Sub => "-=",
            AssignKind::Mul => "*=",
            AssignKind::Quo => "/=",
            AssignKind::Mod => "%=",
            AssignKind::And => "&=",
            AssignKind::Or => "|=",
            AssignKind::Xor => "~=",
            AssignKind::Shl => "<<=",
            AssignKind::Shr => ">>=",
            AssignKind::AndNot => "&~=",
            AssignKind::CondAnd => "&&=",
            AssignKind::CondOr => "||=",
        }
    }
}

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Invalid,
    EndOfFile,
    Identifier,
    Literal(LiteralKind),
    Operator(OperatorKind),
    Keyword(KeywordKind),
    Assignment(AssignKind),
    Semicolon,
    Comma,
    LeftBrace,
    RightBrace,
    /// `@attribute`
    Attribute,
    /// `#directive`
    Directive,
    /// The `---` explicit-uninitialized marker.
    Undefined,
}

bitflags! {
    /// Extra per-token facts the parser occasionally needs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TokenFlags: u8 {
        /// The token was synthesized from a newline by automatic
        /// semicolon insertion (only ever set on `Semicolon`).
        const FROM_NEWLINE = 1 << 0;
    }
}

/// One token of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub flags: TokenFlags,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            span,
            flags: TokenFlags::empty(),
        }
    }

    pub fn with_flags(mut self, flags: TokenFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Whether this semicolon came from a newline rather than a `;`.
    #[inline]
    pub fn is_from_newline(&self) -> bool {
        self.flags.contains(TokenFlags::FROM_NEWLINE)
    }
}

/// Map identifier text to a keyword, if it is one.
pub fn keyword_from_str(text: &str) -> Option<KeywordKind> {
    Some(match text {
        "package" => KeywordKind::Package,
        "import" => KeywordKind::Import,
        "defer" => KeywordKind::Defer,
        "return" => KeywordKind::Return,
        "break" => KeywordKind::Break,
        "continue" => KeywordKind::Continue,
        "fallthrough" => KeywordKind::Fallthrough,
        "if" => KeywordKind::If,
        "else" => KeywordKind::Else,
        "when" => KeywordKind::When,
        "for" => KeywordKind::For,
        "switch" => KeywordKind::Switch,
        "do" => KeywordKind::Do,
        "proc" => KeywordKind::Proc,
        "struct" => KeywordKind::Struct,
        "context" => KeywordKind::Context,
        "using" => KeywordKind::Using,
        "foreign" => KeywordKind::Foreign,
        _ => return None,
    })
}

/// Map identifier text to a word-shaped operator, if it is one.
pub fn word_operator_from_str(text: &str) -> Option<OperatorKind> {
    Some(match text {
        "or_return" => OperatorKind::OrReturn,
        "or_break" => OperatorKind::OrBreak,
        "or_continue" => OperatorKind::OrContinue,
        "cast" => OperatorKind::Cast,
        "transmute" => OperatorKind::Transmute,
        "auto_cast" => OperatorKind::AutoCast,
        _ => return None,
    })
}
