//! Text normalization ahead of the lexer: trigraph expansion,
//! backslash-newline splicing, and comment removal, in that fixed order.
//!
//! Every pass is an in-place forward compaction (the read index runs ahead of
//! the write index) returning the buffer's new logical length. A failing pass
//! yields an error and no partially-rewritten buffer escapes through
//! [`normalize`].

use std::fmt;

use memchr::{memchr, memchr3};
use tracing::{debug, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A string literal still open at end of line or end of file.
    UnterminatedString,
    /// A character literal still open at end of line or end of file.
    UnterminatedCharacter,
    /// A `/*` comment left open at end of file.
    UnterminatedComment,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnterminatedString => write!(f, "unterminated string literal"),
            Error::UnterminatedCharacter => write!(f, "unterminated character literal"),
            Error::UnterminatedComment => write!(f, "file ends mid-comment"),
        }
    }
}

impl std::error::Error for Error {}

/// Runs the three passes over `buf`, truncating it to each pass's logical
/// length on the way through.
pub fn normalize(mut buf: Vec<u8>) -> Result<Vec<u8>, Error> {
    let len = expand_trigraphs(&mut buf);
    buf.truncate(len);
    debug!(len, "expanded trigraphs");

    let splice = splice_lines(&mut buf);
    buf.truncate(splice.len);
    if splice.dangling {
        // Non-fatal: the file is still accepted.
        warn!("file ends in a backslash-newline");
    }
    debug!(len = splice.len, spliced = splice.spliced, "spliced lines");

    let len = strip_comments(&mut buf)?;
    buf.truncate(len);
    debug!(len, "stripped comments");
    Ok(buf)
}

fn trigraph(third: u8) -> Option<u8> {
    Some(match third {
        b'=' => b'#',
        b'(' => b'[',
        b'/' => b'\\',
        b')' => b']',
        b'\'' => b'^',
        b'<' => b'{',
        b'!' => b'|',
        b'>' => b'}',
        b'-' => b'~',
        _ => return None,
    })
}

/// Replaces each complete 3-byte trigraph with its single-byte equivalent.
/// A `??` marker not followed by a designated third byte is copied through
/// unchanged. Returns the new logical length.
pub fn expand_trigraphs(buf: &mut [u8]) -> usize {
    let len = buf.len();
    let (mut r, mut w) = (0, 0);
    while r < len {
        let Some(q) = memchr(b'?', &buf[r..len]) else {
            buf.copy_within(r..len, w);
            w += len - r;
            break;
        };
        buf.copy_within(r..r + q, w);
        r += q;
        w += q;
        if r + 2 < len && buf[r + 1] == b'?' {
            if let Some(replacement) = trigraph(buf[r + 2]) {
                buf[w] = replacement;
                r += 3;
                w += 1;
                continue;
            }
            // a marker with no designated third byte passes through whole
            buf.copy_within(r..r + 3, w);
            r += 3;
            w += 3;
            continue;
        }
        buf[w] = b'?';
        r += 1;
        w += 1;
    }
    w
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Splice {
    /// New logical length.
    pub len: usize,
    /// How many backslash-newline pairs were removed.
    pub spliced: usize,
    /// Whether the file ended right after a backslash-newline.
    pub dangling: bool,
}

/// Removes every backslash immediately followed by a newline, joining the
/// next physical line onto the current one.
pub fn splice_lines(buf: &mut [u8]) -> Splice {
    let len = buf.len();
    let (mut r, mut w) = (0, 0);
    let mut spliced = 0;
    let mut dangling = false;
    while r < len {
        let Some(q) = memchr(b'\\', &buf[r..len]) else {
            buf.copy_within(r..len, w);
            w += len - r;
            break;
        };
        buf.copy_within(r..r + q, w);
        r += q;
        w += q;
        if r + 1 < len && buf[r + 1] == b'\n' {
            r += 2;
            spliced += 1;
            dangling = r == len;
        } else {
            buf[w] = b'\\';
            r += 1;
            w += 1;
        }
    }
    Splice { len: w, spliced, dangling }
}

/// Replaces `//...` (newline kept) and `/*...*/` spans with a single space
/// byte. String and character literal spans delimited by unescaped quotes are
/// copied verbatim, so quoted comment-like text survives. Quotes open literal
/// spans only outside comments.
///
/// Splicing has already run, so a literal may not span physical lines: one
/// still open at a newline or at end of file fails the pass, as does an open
/// `/*` comment at end of file.
pub fn strip_comments(buf: &mut [u8]) -> Result<usize, Error> {
    let len = buf.len();
    let (mut r, mut w) = (0, 0);
    while r < len {
        let Some(q) = memchr3(b'"', b'\'', b'/', &buf[r..len]) else {
            buf.copy_within(r..len, w);
            w += len - r;
            break;
        };
        buf.copy_within(r..r + q, w);
        r += q;
        w += q;
        match buf[r] {
            quote @ (b'"' | b'\'') => {
                buf[w] = quote;
                r += 1;
                w += 1;
                loop {
                    if r >= len || buf[r] == b'\n' {
                        return Err(if quote == b'"' {
                            Error::UnterminatedString
                        } else {
                            Error::UnterminatedCharacter
                        });
                    }
                    let b = buf[r];
                    buf[w] = b;
                    r += 1;
                    w += 1;
                    if b == quote {
                        break;
                    }
                    // an escaped byte can never terminate the literal
                    if b == b'\\' && r < len && buf[r] != b'\n' {
                        buf[w] = buf[r];
                        r += 1;
                        w += 1;
                    }
                }
            }
            _ => {
                if r + 1 < len && buf[r + 1] == b'/' {
                    buf[w] = b' ';
                    w += 1;
                    r = memchr(b'\n', &buf[r..len]).map_or(len, |nl| r + nl);
                } else if r + 1 < len && buf[r + 1] == b'*' {
                    let mut i = r + 2;
                    loop {
                        let Some(star) = memchr(b'*', &buf[i..len]) else {
                            return Err(Error::UnterminatedComment);
                        };
                        i += star + 1;
                        if i < len && buf[i] == b'/' {
                            i += 1;
                            break;
                        }
                        if i >= len {
                            return Err(Error::UnterminatedComment);
                        }
                    }
                    buf[w] = b' ';
                    w += 1;
                    r = i;
                } else {
                    buf[w] = b'/';
                    r += 1;
                    w += 1;
                }
            }
        }
    }
    Ok(w)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn run(pass: impl Fn(&mut [u8]) -> usize, src: &str) -> String {
        let mut buf = src.as_bytes().to_vec();
        let len = pass(&mut buf);
        String::from_utf8(buf[..len].to_vec()).unwrap()
    }

    #[test]
    fn expands_all_nine_trigraphs() {
        assert_eq!(
            run(expand_trigraphs, "??=??(??/??)??'??<??!??>??-"),
            "#[\\]^{|}~"
        );
    }

    #[test]
    fn passes_incomplete_markers_through() {
        assert_eq!(run(expand_trigraphs, "a?b"), "a?b");
        assert_eq!(run(expand_trigraphs, "??x"), "??x");
        assert_eq!(run(expand_trigraphs, "x??"), "x??");
        assert_eq!(run(expand_trigraphs, "?"), "?");
        // 'what??' at end of text
        assert_eq!(run(expand_trigraphs, "what??"), "what??");
    }

    #[test]
    fn splices_continued_lines() {
        let mut buf = b"one\\\ntwo\nthree".to_vec();
        let splice = splice_lines(&mut buf);
        assert_eq!(&buf[..splice.len], b"onetwo\nthree");
        assert_eq!(splice.spliced, 1);
        assert!(!splice.dangling);
    }

    #[test]
    fn keeps_backslashes_that_do_not_continue_a_line() {
        let mut buf = b"a\\b\\".to_vec();
        let splice = splice_lines(&mut buf);
        assert_eq!(&buf[..splice.len], b"a\\b\\");
        assert_eq!(splice.spliced, 0);
    }

    #[test]
    fn reports_a_dangling_splice_without_failing() {
        let mut buf = b"int x;\\\n".to_vec();
        let splice = splice_lines(&mut buf);
        assert_eq!(&buf[..splice.len], b"int x;");
        assert_eq!(splice.spliced, 1);
        assert!(splice.dangling);
    }

    fn comments(src: &str) -> Result<String, Error> {
        let mut buf = src.as_bytes().to_vec();
        let len = strip_comments(&mut buf)?;
        Ok(String::from_utf8(buf[..len].to_vec()).unwrap())
    }

    #[test]
    fn blanks_line_comments_keeping_the_newline() {
        assert_eq!(comments("x // note\ny").unwrap(), "x  \ny");
        assert_eq!(comments("x // no newline at eof").unwrap(), "x  ");
    }

    #[test]
    fn blanks_block_comments() {
        assert_eq!(comments("a/* gone */b").unwrap(), "a b");
        assert_eq!(comments("a/* multi\nline */b").unwrap(), "a b");
        assert_eq!(comments("a/* ** * */b").unwrap(), "a b");
        assert_eq!(comments("a / b").unwrap(), "a / b");
    }

    #[test]
    fn preserves_comment_lookalikes_inside_literals() {
        assert_eq!(comments("\"//not\" y").unwrap(), "\"//not\" y");
        assert_eq!(comments("\"/* no */\"").unwrap(), "\"/* no */\"");
        assert_eq!(comments("'/'//x\n").unwrap(), "'/' \n");
        assert_eq!(comments(r#""say \"hi\" //ok""#).unwrap(), r#""say \"hi\" //ok""#);
    }

    #[test]
    fn fails_on_open_spans() {
        assert_eq!(comments("\"oops\n"), Err(Error::UnterminatedString));
        assert_eq!(comments("'a"), Err(Error::UnterminatedCharacter));
        assert_eq!(comments("/* open"), Err(Error::UnterminatedComment));
        assert_eq!(comments("/* almost *"), Err(Error::UnterminatedComment));
    }

    #[test]
    fn pipeline_runs_the_passes_in_order() {
        let src = b"a??=b\\\nc // x\nd".to_vec();
        let out = normalize(src).unwrap();
        assert_eq!(out, b"a#bc  \nd");
    }

    #[test]
    fn pipeline_propagates_pass_failure() {
        assert_eq!(
            normalize(b"int s = \"abc\\\n".to_vec()),
            Err(Error::UnterminatedString)
        );
    }
}
