//! Pull-based lexer over a normalized source buffer.
//!
//! [`Lexer::advance`] produces one token per call into the lexer's token
//! slot. Recoverable problems (a bad suffix, a malformed escape, an
//! unrecognized character) emit a diagnostic, leave a [`TokenKind::None`]
//! token behind, and move the cursor past the offending span so the stream
//! continues. Unterminated literals are fatal: the cursor jumps to the end of
//! the buffer and the stream ends early.

use std::fmt;

use tracing::debug;

use crate::{
    intern::Interner,
    token::{Affix, Punct, Span, StringPayload, Token, TokenKind, KEYWORDS},
    utf8,
};

/// Outcome of one [`Lexer::advance`] call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Advance {
    /// A classified token was produced.
    Token,
    /// The input is exhausted; the token slot holds [`TokenKind::Eof`].
    End,
    /// The position could not be classified (or a fatal condition was hit);
    /// the token slot holds [`TokenKind::None`].
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: u32,
    pub reason: Reason,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reason {
    UnexpectedCharacter(u32),
    UnexpectedByte(u8),
    IntegerOverflow,
    InvalidDigit { digit: u8, base: u32 },
    MissingDigits,
    DuplicateAffix(char),
    ContradictoryAffix,
    UnknownAffix(char),
    MalformedExponent,
    UnknownEscape(u8),
    EscapeDigits { escape: char, expected: usize, found: usize },
    EscapeNotScalar(u32),
    InvalidEncoding,
    EmptyCharacterConstant,
    MultiCharacterConstant,
    UnterminatedCharacter,
    UnterminatedString,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Reason::UnexpectedCharacter(cp) => {
                write!(f, "unexpected character U+{cp:04X}")
            }
            Reason::UnexpectedByte(b) => write!(f, "unexpected byte 0x{b:02X}"),
            Reason::IntegerOverflow => write!(f, "integer constant overflows"),
            Reason::InvalidDigit { digit, base } => {
                write!(f, "invalid digit '{}' in base {base} constant", digit as char)
            }
            Reason::MissingDigits => write!(f, "hexadecimal constant has no digits"),
            Reason::DuplicateAffix(c) => write!(f, "duplicate '{c}' suffix"),
            Reason::ContradictoryAffix => write!(f, "contradictory constant suffix"),
            Reason::UnknownAffix(c) => write!(f, "unknown suffix character '{c}'"),
            Reason::MalformedExponent => write!(f, "exponent has no digits"),
            Reason::UnknownEscape(b) => write!(f, "unknown escape '\\{}'", b as char),
            Reason::EscapeDigits { escape, expected, found } => {
                write!(f, "'\\{escape}' expects {expected} hex digits, found {found}")
            }
            Reason::EscapeNotScalar(cp) => {
                write!(f, "universal character U+{cp:04X} is not a scalar value")
            }
            Reason::InvalidEncoding => write!(f, "invalid UTF-8 in literal"),
            Reason::EmptyCharacterConstant => write!(f, "empty character constant"),
            Reason::MultiCharacterConstant => {
                write!(f, "multi-character constant, keeping the first character")
            }
            Reason::UnterminatedCharacter => write!(f, "unterminated character constant"),
            Reason::UnterminatedString => write!(f, "unterminated string literal"),
        }
    }
}

pub struct Lexer {
    buf: Vec<u8>,
    cur: usize,
    lo: usize,
    line: u32,
    token: Token,
    idents: Interner,
    diags: Vec<Diagnostic>,
    failed: bool,
}

impl Lexer {
    /// Builds a lexer over an already-normalized buffer (see [`crate::pre`]).
    pub fn new(buf: Vec<u8>) -> Lexer {
        debug!(len = buf.len(), "lexer ready");
        Lexer {
            buf,
            cur: 0,
            lo: 0,
            line: 1,
            token: Token::default(),
            idents: Interner::new(),
            diags: Vec::new(),
            failed: false,
        }
    }

    /// The most recently produced token.
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Takes the current token out of the lexer, leaving a
    /// [`TokenKind::None`] placeholder behind. Together with the overwrite in
    /// [`Lexer::advance`], this is how string payload ownership moves out.
    pub fn take_token(&mut self) -> Token {
        std::mem::take(&mut self.token)
    }

    /// Current line number, counted from 1 over the normalized buffer.
    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diags
    }

    /// Whether a fatal condition ended the stream early.
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// The identifier table, for resolving [`Symbol`] payloads.
    pub fn idents(&self) -> &Interner {
        &self.idents
    }

    /// Classifies the next token into the token slot, releasing the previous
    /// token (and any buffer it owned) by overwrite.
    pub fn advance(&mut self) -> Advance {
        self.skip_whitespace();
        self.lo = self.cur;
        let Some(&b) = self.buf.get(self.cur) else {
            self.produce(TokenKind::Eof);
            return Advance::End;
        };
        match b {
            b'L' if matches!(self.peek_at(1), Some(b'\'' | b'"')) => {
                self.cur += 1;
                if self.buf[self.cur] == b'\'' {
                    self.scan_character(true)
                } else {
                    self.scan_string(true)
                }
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_identifier(),
            b'0'..=b'9' => self.scan_number(),
            b'.' if matches!(self.peek_at(1), Some(b'0'..=b'9')) => self.scan_number(),
            b'\'' => self.scan_character(false),
            b'"' => self.scan_string(false),
            _ => self.scan_punct(),
        }
    }

    /// Pulls tokens until the input is exhausted, for drivers and tests.
    /// `None` tokens from recoverable errors are included.
    pub fn drain(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            match self.advance() {
                Advance::End => break tokens,
                Advance::Token | Advance::Error => tokens.push(self.take_token()),
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&b) = self.buf.get(self.cur) {
            match b {
                b'\n' => {
                    self.line += 1;
                    self.cur += 1;
                }
                b' ' | b'\t' | b'\r' | 0x0B | 0x0C => self.cur += 1,
                _ => break,
            }
        }
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.buf.get(self.cur + offset).copied()
    }

    fn produce(&mut self, kind: TokenKind) {
        self.token = Token::new(kind, Span::new_of_bounds(self.lo..self.cur));
    }

    fn diag(&mut self, reason: Reason) {
        self.diags.push(Diagnostic { line: self.line, reason });
    }

    /// Recoverable error: record the reason and leave a `None` token over
    /// whatever span the caller already consumed.
    fn recover(&mut self, reason: Reason) -> Advance {
        self.diag(reason);
        self.produce(TokenKind::None);
        Advance::Error
    }

    /// Fatal error: the cursor jumps to the end of the buffer, ending the
    /// token stream early.
    fn fatal(&mut self, reason: Reason) -> Advance {
        self.diag(reason);
        self.failed = true;
        self.cur = self.buf.len();
        self.produce(TokenKind::None);
        Advance::Error
    }

    fn scan_identifier(&mut self) -> Advance {
        while matches!(
            self.peek_at(0),
            Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_')
        ) {
            self.cur += 1;
        }
        let bytes = &self.buf[self.lo..self.cur];
        // SAFETY: the span holds only ASCII letters, digits and underscores.
        let spelling = unsafe { std::str::from_utf8_unchecked(bytes) };
        let kind = match KEYWORDS.get(spelling) {
            Some(&keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier(self.idents.intern(spelling)),
        };
        self.produce(kind);
        Advance::Token
    }

    fn scan_number(&mut self) -> Advance {
        let mut base = 10u32;
        if self.peek_at(0) == Some(b'0') {
            if matches!(self.peek_at(1), Some(b'x' | b'X')) {
                base = 16;
                self.cur += 2;
            } else {
                base = 8;
            }
        }
        // The digit run is scanned with decimal digits for base 8 too, so
        // that `08.5` can still divert to a decimal floating constant; octal
        // digits are validated only once the constant is known to be an
        // integer.
        let digits_lo = self.cur;
        let scan_base = if base == 16 { 16 } else { 10 };
        while self.peek_at(0).is_some_and(|b| (b as char).is_digit(scan_base)) {
            self.cur += 1;
        }
        // a bare `0x` prefix; `0x.8p1` is still fine, the fraction carries
        // the digits
        if base == 16 && self.cur == digits_lo && self.peek_at(0) != Some(b'.') {
            self.consume_affix_run();
            return self.recover(Reason::MissingDigits);
        }
        let diverts = match base {
            16 => matches!(self.peek_at(0), Some(b'.' | b'p' | b'P')),
            _ => matches!(self.peek_at(0), Some(b'.' | b'e' | b'E')),
        };
        if diverts {
            self.scan_floating(base.max(10), digits_lo)
        } else {
            self.scan_integer(base, digits_lo)
        }
    }

    fn scan_integer(&mut self, base: u32, digits_lo: usize) -> Advance {
        let mut value: u64 = 0;
        for i in digits_lo..self.cur {
            let b = self.buf[i];
            let Some(digit) = (b as char).to_digit(base) else {
                self.consume_affix_run();
                return self.recover(Reason::InvalidDigit { digit: b, base });
            };
            let next = value
                .checked_mul(u64::from(base))
                .and_then(|v| v.checked_add(u64::from(digit)));
            match next {
                Some(v) => value = v,
                None => {
                    self.consume_affix_run();
                    return self.recover(Reason::IntegerOverflow);
                }
            }
        }
        match self.scan_integer_affix() {
            Ok(affix) => {
                self.produce(TokenKind::Integer { value, affix });
                Advance::Token
            }
            Err(reason) => self.recover(reason),
        }
    }

    /// Parses `u`/`l`/`ll` in any order and case. The two characters of `ll`
    /// must agree in case; a second `u` or a third `l` is a duplicate.
    fn scan_integer_affix(&mut self) -> Result<Affix, Reason> {
        let mut unsigned = false;
        let mut long: Option<bool> = None; // Some(true) for `ll`
        loop {
            match self.peek_at(0) {
                Some(b @ (b'u' | b'U')) => {
                    self.cur += 1;
                    if unsigned {
                        self.consume_affix_run();
                        return Err(Reason::DuplicateAffix(b as char));
                    }
                    unsigned = true;
                }
                Some(b @ (b'l' | b'L')) => {
                    self.cur += 1;
                    if long.is_some() {
                        self.consume_affix_run();
                        return Err(Reason::DuplicateAffix(b as char));
                    }
                    if matches!(self.peek_at(0), Some(b'l' | b'L')) {
                        if self.peek_at(0) != Some(b) {
                            self.consume_affix_run();
                            return Err(Reason::ContradictoryAffix);
                        }
                        self.cur += 1;
                        long = Some(true);
                    } else {
                        long = Some(false);
                    }
                }
                Some(b) if b.is_ascii_alphanumeric() || b == b'_' => {
                    self.consume_affix_run();
                    return Err(Reason::UnknownAffix(b as char));
                }
                _ => break,
            }
        }
        Ok(match (unsigned, long) {
            (false, None) => Affix::None,
            (true, None) => Affix::U,
            (false, Some(false)) => Affix::L,
            (false, Some(true)) => Affix::Ll,
            (true, Some(false)) => Affix::Ul,
            (true, Some(true)) => Affix::Ull,
        })
    }

    /// After a malformed constant, consumes the rest of its alphanumeric run
    /// so the next `advance` resumes on a fresh position.
    fn consume_affix_run(&mut self) {
        while matches!(
            self.peek_at(0),
            Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'.')
        ) {
            self.cur += 1;
        }
    }

    fn scan_floating(&mut self, base: u32, digits_lo: usize) -> Advance {
        debug_assert!(base == 10 || base == 16);
        let fbase = f64::from(base);
        let mut value = 0.0f64;
        for i in digits_lo..self.cur {
            // the digit run was scanned with this base's digits
            let digit = (self.buf[i] as char).to_digit(base).unwrap_or(0);
            value = value * fbase + f64::from(digit);
        }
        if self.peek_at(0) == Some(b'.') {
            self.cur += 1;
            let mut div = 1.0f64;
            while let Some(digit) = self.peek_at(0).and_then(|b| (b as char).to_digit(base)) {
                self.cur += 1;
                div *= fbase;
                value += f64::from(digit) / div;
            }
        }
        let exp_marker = match base {
            16 => matches!(self.peek_at(0), Some(b'p' | b'P')),
            _ => matches!(self.peek_at(0), Some(b'e' | b'E')),
        };
        if exp_marker {
            self.cur += 1;
            let negative = match self.peek_at(0) {
                Some(b'-') => {
                    self.cur += 1;
                    true
                }
                Some(b'+') => {
                    self.cur += 1;
                    false
                }
                _ => false,
            };
            let mut digits = 0u32;
            let mut exp = 0i32;
            while let Some(digit) = self.peek_at(0).and_then(|b| (b as char).to_digit(10)) {
                self.cur += 1;
                digits += 1;
                exp = exp.saturating_mul(10).saturating_add(digit as i32);
            }
            if digits == 0 {
                self.consume_affix_run();
                return self.recover(Reason::MalformedExponent);
            }
            if negative {
                exp = -exp;
            }
            let exp_base = if base == 16 { 2.0f64 } else { 10.0 };
            value *= exp_base.powi(exp);
        }
        match self.scan_floating_affix() {
            Ok(affix) => {
                self.produce(TokenKind::Floating { value, affix });
                Advance::Token
            }
            Err(reason) => self.recover(reason),
        }
    }

    fn scan_floating_affix(&mut self) -> Result<Affix, Reason> {
        let mut affix = Affix::None;
        loop {
            match self.peek_at(0) {
                Some(b @ (b'f' | b'F' | b'l' | b'L')) => {
                    self.cur += 1;
                    if affix != Affix::None {
                        self.consume_affix_run();
                        return Err(Reason::DuplicateAffix(b as char));
                    }
                    affix = if matches!(b, b'f' | b'F') { Affix::F } else { Affix::L };
                }
                Some(b) if b.is_ascii_alphanumeric() || b == b'_' => {
                    self.consume_affix_run();
                    return Err(Reason::UnknownAffix(b as char));
                }
                _ => break,
            }
        }
        Ok(affix)
    }

    /// Scans one unit (plain byte run, UTF-8 sequence, or escape) out of a
    /// literal body, returning the decoded code point and its source length.
    fn literal_unit(bytes: &[u8]) -> Result<(u32, usize), Reason> {
        if bytes[0] == b'\\' {
            let (value, consumed) = parse_escape(&bytes[1..])?;
            return Ok((value, consumed + 1));
        }
        if bytes[0].is_ascii() {
            return Ok((u32::from(bytes[0]), 1));
        }
        match utf8::check_character(bytes) {
            Some(len) => {
                let (cp, _) = utf8::decode(&bytes[..len]);
                Ok((cp, len))
            }
            None => Err(Reason::InvalidEncoding),
        }
    }

    /// Finds the offset of the closing unescaped `quote`, relative to
    /// `start`. `None` means the literal runs into a newline or the end of
    /// the buffer.
    fn find_terminator(&self, start: usize, quote: u8) -> Option<usize> {
        let mut i = start;
        while i < self.buf.len() {
            match self.buf[i] {
                b'\n' => return None,
                b'\\' if self.buf.get(i + 1) != Some(&b'\n') => i += 2,
                b if b == quote => return Some(i),
                _ => i += 1,
            }
        }
        None
    }

    fn scan_character(&mut self, wide: bool) -> Advance {
        debug_assert_eq!(self.buf[self.cur], b'\'');
        let body = self.cur + 1;
        let Some(close) = self.find_terminator(body, b'\'') else {
            return self.fatal(Reason::UnterminatedCharacter);
        };
        self.cur = close + 1;
        let content = &self.buf[body..close];
        if content.is_empty() {
            return self.recover(Reason::EmptyCharacterConstant);
        }
        let (value, consumed) = match Self::literal_unit(content) {
            Ok(unit) => unit,
            Err(reason) => return self.recover(reason),
        };
        if consumed < content.len() {
            // gcc-style: keep the first character, warn about the rest
            self.diag(Reason::MultiCharacterConstant);
        }
        self.produce(TokenKind::Character { value, wide });
        Advance::Token
    }

    fn scan_string(&mut self, wide: bool) -> Advance {
        debug_assert_eq!(self.buf[self.cur], b'"');
        let body = self.cur + 1;
        let Some(close) = self.find_terminator(body, b'"') else {
            return self.fatal(Reason::UnterminatedString);
        };
        self.cur = close + 1;

        // Measuring pre-pass: the decoded length is known before any
        // allocation, so the payload buffer is sized exactly once.
        let content = &self.buf[body..close];
        let mut units = 0usize;
        let mut narrow_bytes = 0usize;
        let mut at = 0;
        while at < content.len() {
            let (value, consumed) = match Self::literal_unit(&content[at..]) {
                Ok(unit) => unit,
                Err(reason) => return self.recover(reason),
            };
            units += 1;
            narrow_bytes += if content[at] == b'\\' {
                // numeric and named escapes land in one byte; universal
                // escapes are re-encoded as UTF-8
                if matches!(content[at + 1], b'u' | b'U') {
                    utf8::encoded_length(value)
                } else {
                    1
                }
            } else {
                consumed
            };
            at += consumed;
        }

        let payload = if wide {
            let mut cps = Vec::with_capacity(units);
            let mut at = 0;
            while at < content.len() {
                // already validated by the measuring pass
                let (value, consumed) = match Self::literal_unit(&content[at..]) {
                    Ok(unit) => unit,
                    Err(reason) => return self.recover(reason),
                };
                cps.push(value);
                at += consumed;
            }
            StringPayload::Wide(cps.into_boxed_slice())
        } else {
            let mut bytes = Vec::with_capacity(narrow_bytes);
            let mut at = 0;
            while at < content.len() {
                if content[at] == b'\\' {
                    let (value, consumed) = match parse_escape(&content[at + 1..]) {
                        Ok(unit) => unit,
                        Err(reason) => return self.recover(reason),
                    };
                    if matches!(content[at + 1], b'u' | b'U') {
                        let mut enc = [0u8; 4];
                        let n = utf8::encode(&mut enc, value);
                        bytes.extend_from_slice(&enc[..n]);
                    } else {
                        bytes.push(value as u8);
                    }
                    at += consumed + 1;
                } else {
                    bytes.push(content[at]);
                    at += 1;
                }
            }
            debug_assert_eq!(bytes.len(), narrow_bytes);
            StringPayload::Narrow(bytes.into_boxed_slice())
        };
        self.produce(TokenKind::String(payload));
        Advance::Token
    }

    /// Greedy longest match over the 4-, 3-, 2- and 1-byte punctuator
    /// spellings. On no match, exactly one decoded unit is consumed so the
    /// next call resumes on a fresh position.
    fn scan_punct(&mut self) -> Advance {
        let scanned = {
            let rest = &self.buf[self.cur..];
            let mut hit = None;
            for len in (1..=4.min(rest.len())).rev() {
                if let Some(punct) = Punct::from_spelling(&rest[..len]) {
                    hit = Some((punct, len));
                    break;
                }
            }
            match hit {
                Some(hit) => Ok(hit),
                None => Err(match utf8::check_character(rest) {
                    Some(len) => {
                        let (cp, _) = utf8::decode(&rest[..len]);
                        (Reason::UnexpectedCharacter(cp), len)
                    }
                    None => (Reason::UnexpectedByte(rest[0]), 1),
                }),
            }
        };
        match scanned {
            Ok((punct, len)) => {
                self.cur += len;
                self.produce(TokenKind::Punct(punct));
                Advance::Token
            }
            Err((reason, len)) => {
                self.cur += len;
                self.recover(reason)
            }
        }
    }
}

/// Decodes one escape sequence. `bytes` starts just after the backslash;
/// returns the decoded code point and how many bytes (excluding the
/// backslash) were consumed.
fn parse_escape(bytes: &[u8]) -> Result<(u32, usize), Reason> {
    let Some(&selector) = bytes.first() else {
        return Err(Reason::UnknownEscape(b'\\'));
    };
    let value = match selector {
        b'a' => 0x07,
        b'b' => 0x08,
        b'f' => 0x0C,
        b'n' => b'\n' as u32,
        b'r' => b'\r' as u32,
        b't' => b'\t' as u32,
        b'v' => 0x0B,
        b'\\' | b'\'' | b'"' | b'?' => u32::from(selector),
        b'0'..=b'7' => {
            let mut value = 0u32;
            let mut at = 0;
            while at < 3 && matches!(bytes.get(at), Some(b'0'..=b'7')) {
                value = value * 8 + u32::from(bytes[at] - b'0');
                at += 1;
            }
            return Ok((value, at));
        }
        b'x' => {
            let mut value = 0u32;
            let mut at = 1;
            while at <= 2 && bytes.get(at).is_some_and(u8::is_ascii_hexdigit) {
                value = value * 16 + (bytes[at] as char).to_digit(16).unwrap_or(0);
                at += 1;
            }
            if at == 1 {
                return Err(Reason::EscapeDigits { escape: 'x', expected: 2, found: 0 });
            }
            return Ok((value, at));
        }
        b'u' | b'U' => {
            let expected = if selector == b'u' { 4 } else { 8 };
            let mut value = 0u32;
            let mut found = 0;
            while found < expected && bytes.get(found + 1).is_some_and(u8::is_ascii_hexdigit) {
                value = value * 16 + (bytes[found + 1] as char).to_digit(16).unwrap_or(0);
                found += 1;
            }
            if found != expected {
                return Err(Reason::EscapeDigits {
                    escape: selector as char,
                    expected,
                    found,
                });
            }
            if !utf8::is_scalar(value) {
                return Err(Reason::EscapeNotScalar(value));
            }
            return Ok((value, expected + 1));
        }
        other => return Err(Reason::UnknownEscape(other)),
    };
    Ok((value, 1))
}
