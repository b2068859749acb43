use std::{fmt, ops::Range};

use crate::intern::Symbol;

/// A classified lexical unit with its raw source span.
///
/// The span always refers to the normalized buffer the lexer was built over,
/// not the raw file (trigraphs and splices have already been rewritten).
#[derive(Clone, Default)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Token {
    pub kind: TokenKind,
    lo: usize,
    len: u32,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Token {
        Token {
            kind,
            len: span.len,
            lo: span.lo,
        }
    }

    pub fn span(&self) -> Span {
        Span {
            len: self.len,
            lo: self.lo,
        }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?}, {})", self.kind, self.span())
    }
}

#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub struct Span {
    pub len: u32,
    pub lo: usize,
}

impl Span {
    pub fn new_of_bounds(Range { start: lo, end: hi }: Range<usize>) -> Span {
        debug_assert!(hi >= lo);
        Self::new_of_length(lo, u32::try_from(hi - lo).unwrap())
    }

    pub fn new_of_length(lo: usize, len: u32) -> Span {
        Span { len, lo }
    }

    pub fn bytes<'b>(&self, buf: &'b [u8]) -> &'b [u8] {
        &buf[self.lo..self.lo + self.len as usize]
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({self}, len: {})", self.len)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lo = self.lo;
        let hi = lo + self.len as usize;
        write!(f, "{lo}..{hi}")
    }
}

#[derive(Clone, Debug, Default)]
#[cfg_attr(test, derive(PartialEq))]
pub enum TokenKind {
    /// Placeholder for a position the lexer could not classify. The
    /// diagnostic explaining why lives in the lexer's diagnostic list.
    #[default]
    None,
    Identifier(Symbol),
    Keyword(Keyword),
    Integer {
        value: u64,
        affix: Affix,
    },
    Floating {
        value: f64,
        affix: Affix,
    },
    Character {
        value: u32,
        wide: bool,
    },
    String(StringPayload),
    Punct(Punct),
    Eof,
}

/// The decoded, owned payload of a string literal. Narrow literals carry raw
/// bytes (universal escapes re-encoded as UTF-8); wide literals carry code
/// points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StringPayload {
    Narrow(Box<[u8]>),
    Wide(Box<[u32]>),
}

impl StringPayload {
    pub fn len(&self) -> usize {
        match self {
            StringPayload::Narrow(bytes) => bytes.len(),
            StringPayload::Wide(cps) => cps.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_wide(&self) -> bool {
        matches!(self, StringPayload::Wide(_))
    }
}

/// The closed set of C99 reserved words.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Keyword {
    Auto,
    Break,
    Case,
    Char,
    Const,
    Continue,
    Default,
    Do,
    Double,
    Else,
    Enum,
    Extern,
    Float,
    For,
    Goto,
    If,
    Inline,
    Int,
    Long,
    Register,
    Restrict,
    Return,
    Short,
    Signed,
    Sizeof,
    Static,
    Struct,
    Switch,
    Typedef,
    Union,
    Unsigned,
    Void,
    Volatile,
    While,
    Bool,
    Complex,
    Imaginary,
}

impl Keyword {
    pub fn spelling(self) -> &'static str {
        use Keyword::*;
        match self {
            Auto => "auto",
            Break => "break",
            Case => "case",
            Char => "char",
            Const => "const",
            Continue => "continue",
            Default => "default",
            Do => "do",
            Double => "double",
            Else => "else",
            Enum => "enum",
            Extern => "extern",
            Float => "float",
            For => "for",
            Goto => "goto",
            If => "if",
            Inline => "inline",
            Int => "int",
            Long => "long",
            Register => "register",
            Restrict => "restrict",
            Return => "return",
            Short => "short",
            Signed => "signed",
            Sizeof => "sizeof",
            Static => "static",
            Struct => "struct",
            Switch => "switch",
            Typedef => "typedef",
            Union => "union",
            Unsigned => "unsigned",
            Void => "void",
            Volatile => "volatile",
            While => "while",
            Bool => "_Bool",
            Complex => "_Complex",
            Imaginary => "_Imaginary",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spelling())
    }
}

pub static KEYWORDS: phf::Map<&'static str, Keyword> = phf::phf_map! {
    "auto" => Keyword::Auto,
    "break" => Keyword::Break,
    "case" => Keyword::Case,
    "char" => Keyword::Char,
    "const" => Keyword::Const,
    "continue" => Keyword::Continue,
    "default" => Keyword::Default,
    "do" => Keyword::Do,
    "double" => Keyword::Double,
    "else" => Keyword::Else,
    "enum" => Keyword::Enum,
    "extern" => Keyword::Extern,
    "float" => Keyword::Float,
    "for" => Keyword::For,
    "goto" => Keyword::Goto,
    "if" => Keyword::If,
    "inline" => Keyword::Inline,
    "int" => Keyword::Int,
    "long" => Keyword::Long,
    "register" => Keyword::Register,
    "restrict" => Keyword::Restrict,
    "return" => Keyword::Return,
    "short" => Keyword::Short,
    "signed" => Keyword::Signed,
    "sizeof" => Keyword::Sizeof,
    "static" => Keyword::Static,
    "struct" => Keyword::Struct,
    "switch" => Keyword::Switch,
    "typedef" => Keyword::Typedef,
    "union" => Keyword::Union,
    "unsigned" => Keyword::Unsigned,
    "void" => Keyword::Void,
    "volatile" => Keyword::Volatile,
    "while" => Keyword::While,
    "_Bool" => Keyword::Bool,
    "_Complex" => Keyword::Complex,
    "_Imaginary" => Keyword::Imaginary,
};

/// A numeric constant's trailing type marker, already reduced to its
/// canonical combination.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Affix {
    #[default]
    None,
    U,
    L,
    Ll,
    Ul,
    Ull,
    F,
}

impl Affix {
    /// Canonical (lowercase) suffix spelling; empty for [`Affix::None`].
    pub fn spelling(self) -> &'static str {
        match self {
            Affix::None => "",
            Affix::U => "u",
            Affix::L => "l",
            Affix::Ll => "ll",
            Affix::Ul => "ul",
            Affix::Ull => "ull",
            Affix::F => "f",
        }
    }
}

impl fmt::Display for Affix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spelling())
    }
}

/// Punctuators, in their canonical spelling. The digraph spellings (`<:`,
/// `:>`, `<%`, `%>`, `%:`, `%:%:`) scan into the same variants as the
/// characters they stand for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Punct {
    LSquare,
    RSquare,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Dot,
    Arrow,
    PlusPlus,
    MinusMinus,
    Amp,
    Star,
    Plus,
    Minus,
    Tilde,
    Bang,
    Slash,
    Percent,
    LessLess,
    GreaterGreater,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    EqEq,
    BangEq,
    Caret,
    Pipe,
    AmpAmp,
    PipePipe,
    Question,
    Colon,
    Semicolon,
    Ellipsis,
    Eq,
    StarEq,
    SlashEq,
    PercentEq,
    PlusEq,
    MinusEq,
    LessLessEq,
    GreaterGreaterEq,
    AmpEq,
    CaretEq,
    PipeEq,
    Comma,
    Hash,
    HashHash,
}

impl Punct {
    /// Maps one exact spelling to its punctuator. Callers implement maximal
    /// munch by probing the longest candidate spelling first.
    pub fn from_spelling(bytes: &[u8]) -> Option<Punct> {
        use Punct::*;
        Some(match bytes {
            b"%:%:" => HashHash,
            b"..." => Ellipsis,
            b"<<=" => LessLessEq,
            b">>=" => GreaterGreaterEq,
            b"->" => Arrow,
            b"++" => PlusPlus,
            b"--" => MinusMinus,
            b"<<" => LessLess,
            b">>" => GreaterGreater,
            b"<=" => LessEq,
            b">=" => GreaterEq,
            b"==" => EqEq,
            b"!=" => BangEq,
            b"&&" => AmpAmp,
            b"||" => PipePipe,
            b"*=" => StarEq,
            b"/=" => SlashEq,
            b"%=" => PercentEq,
            b"+=" => PlusEq,
            b"-=" => MinusEq,
            b"&=" => AmpEq,
            b"^=" => CaretEq,
            b"|=" => PipeEq,
            b"##" => HashHash,
            b"<:" => LSquare,
            b":>" => RSquare,
            b"<%" => LBrace,
            b"%>" => RBrace,
            b"%:" => Hash,
            b"[" => LSquare,
            b"]" => RSquare,
            b"(" => LParen,
            b")" => RParen,
            b"{" => LBrace,
            b"}" => RBrace,
            b"." => Dot,
            b"&" => Amp,
            b"*" => Star,
            b"+" => Plus,
            b"-" => Minus,
            b"~" => Tilde,
            b"!" => Bang,
            b"/" => Slash,
            b"%" => Percent,
            b"<" => Less,
            b">" => Greater,
            b"^" => Caret,
            b"|" => Pipe,
            b"?" => Question,
            b":" => Colon,
            b";" => Semicolon,
            b"=" => Eq,
            b"," => Comma,
            b"#" => Hash,
            _ => return None,
        })
    }

    pub fn spelling(self) -> &'static str {
        use Punct::*;
        match self {
            LSquare => "[",
            RSquare => "]",
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            Dot => ".",
            Arrow => "->",
            PlusPlus => "++",
            MinusMinus => "--",
            Amp => "&",
            Star => "*",
            Plus => "+",
            Minus => "-",
            Tilde => "~",
            Bang => "!",
            Slash => "/",
            Percent => "%",
            LessLess => "<<",
            GreaterGreater => ">>",
            Less => "<",
            Greater => ">",
            LessEq => "<=",
            GreaterEq => ">=",
            EqEq => "==",
            BangEq => "!=",
            Caret => "^",
            Pipe => "|",
            AmpAmp => "&&",
            PipePipe => "||",
            Question => "?",
            Colon => ":",
            Semicolon => ";",
            Ellipsis => "...",
            Eq => "=",
            StarEq => "*=",
            SlashEq => "/=",
            PercentEq => "%=",
            PlusEq => "+=",
            MinusEq => "-=",
            LessLessEq => "<<=",
            GreaterGreaterEq => ">>=",
            AmpEq => "&=",
            CaretEq => "^=",
            PipeEq => "|=",
            Comma => ",",
            Hash => "#",
            HashHash => "##",
        }
    }
}

impl fmt::Display for Punct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spelling())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn keyword_table_covers_all_reserved_words() {
        assert_eq!(KEYWORDS.len(), 37);
        assert_eq!(KEYWORDS.get("while"), Some(&Keyword::While));
        assert_eq!(KEYWORDS.get("_Bool"), Some(&Keyword::Bool));
        // keywords are case sensitive
        assert_eq!(KEYWORDS.get("While"), None);
        assert_eq!(KEYWORDS.get("while1"), None);
    }

    #[test]
    fn punct_spellings_round_trip() {
        for spelling in [
            "[", "]", "(", ")", "{", "}", ".", "->", "++", "--", "&", "*", "+", "-", "~", "!",
            "/", "%", "<<", ">>", "<", ">", "<=", ">=", "==", "!=", "^", "|", "&&", "||", "?",
            ":", ";", "...", "=", "*=", "/=", "%=", "+=", "-=", "<<=", ">>=", "&=", "^=", "|=",
            ",", "#", "##",
        ] {
            let punct = Punct::from_spelling(spelling.as_bytes()).unwrap();
            assert_eq!(punct.spelling(), spelling);
        }
    }

    #[test]
    fn digraphs_scan_into_canonical_punctuators() {
        assert_eq!(Punct::from_spelling(b"<:"), Some(Punct::LSquare));
        assert_eq!(Punct::from_spelling(b":>"), Some(Punct::RSquare));
        assert_eq!(Punct::from_spelling(b"<%"), Some(Punct::LBrace));
        assert_eq!(Punct::from_spelling(b"%>"), Some(Punct::RBrace));
        assert_eq!(Punct::from_spelling(b"%:"), Some(Punct::Hash));
        assert_eq!(Punct::from_spelling(b"%:%:"), Some(Punct::HashHash));
    }

    #[test]
    fn affix_spellings_are_canonical() {
        assert_eq!(Affix::None.to_string(), "");
        assert_eq!(Affix::Ull.to_string(), "ull");
        assert_eq!(Affix::F.to_string(), "f");
    }
}
