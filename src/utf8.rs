//! Minimal UTF-8 codec used by the lexer for wide and universal characters.
//!
//! Validation and decoding are split: [`check_character`] fails closed on
//! malformed input, while [`decode`] assumes its input already passed the
//! check and does no work twice.

/// Largest valid Unicode scalar value.
pub const MAX_CODE_POINT: u32 = 0x10_FFFF;

/// Whether `cp` falls in the surrogate range, which is not encodable.
pub fn is_surrogate(cp: u32) -> bool {
    matches!(cp, 0xD800..=0xDFFF)
}

/// Whether `cp` is a Unicode scalar value (in range and not a surrogate).
pub fn is_scalar(cp: u32) -> bool {
    cp <= MAX_CODE_POINT && !is_surrogate(cp)
}

/// Validates exactly one encoded code point at the start of `buf`.
///
/// Returns the sequence's byte length, or `None` if the buffer starts with a
/// continuation byte, a lead byte outside the 1 to 4 byte forms, a truncated
/// sequence, or a sequence decoding to a surrogate or past
/// [`MAX_CODE_POINT`].
pub fn check_character(buf: &[u8]) -> Option<usize> {
    let lead = *buf.first()?;
    let len = match lead {
        0x00..=0x7F => 1,
        // continuation byte in lead position
        0x80..=0xBF => return None,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        0xF8..=0xFF => return None,
    };
    if buf.len() < len || !buf[1..len].iter().all(|&b| b & 0xC0 == 0x80) {
        return None;
    }
    let (cp, _) = decode(&buf[..len]);
    if is_surrogate(cp) || cp > MAX_CODE_POINT {
        return None;
    }
    Some(len)
}

/// Validates a whole buffer, failing closed at the first bad character.
pub fn check_buffer(mut buf: &[u8]) -> bool {
    while !buf.is_empty() {
        match check_character(buf) {
            Some(len) => buf = &buf[len..],
            None => return false,
        }
    }
    true
}

/// Decodes one code point, returning it with its encoded length.
///
/// Only defined on buffers already accepted by [`check_character`]; the
/// byte-shape preconditions are debug-asserted, not re-checked.
pub fn decode(buf: &[u8]) -> (u32, usize) {
    let lead = buf[0];
    match lead {
        0x00..=0x7F => (u32::from(lead), 1),
        0xC0..=0xDF => {
            let cp = (u32::from(lead & 0x1F) << 6) | cont(buf[1]);
            (cp, 2)
        }
        0xE0..=0xEF => {
            let cp = (u32::from(lead & 0x0F) << 12) | (cont(buf[1]) << 6) | cont(buf[2]);
            (cp, 3)
        }
        _ => {
            debug_assert!(matches!(lead, 0xF0..=0xF7));
            let cp = (u32::from(lead & 0x07) << 18)
                | (cont(buf[1]) << 12)
                | (cont(buf[2]) << 6)
                | cont(buf[3]);
            (cp, 4)
        }
    }
}

fn cont(b: u8) -> u32 {
    debug_assert_eq!(b & 0xC0, 0x80);
    u32::from(b & 0x3F)
}

/// Byte length of the canonical encoding of `cp`.
///
/// Values past [`MAX_CODE_POINT`] are an input-contract violation.
pub fn encoded_length(cp: u32) -> usize {
    debug_assert!(cp <= MAX_CODE_POINT);
    match cp {
        0x00..=0x7F => 1,
        0x80..=0x7FF => 2,
        0x800..=0xFFFF => 3,
        _ => 4,
    }
}

/// Writes the canonical encoding of `cp` into `dst`, returning the byte
/// count. `dst` must have room for [`encoded_length`] bytes.
pub fn encode(dst: &mut [u8], cp: u32) -> usize {
    match encoded_length(cp) {
        1 => {
            dst[0] = cp as u8;
            1
        }
        2 => {
            dst[0] = 0xC0 | (cp >> 6) as u8;
            dst[1] = 0x80 | (cp & 0x3F) as u8;
            2
        }
        3 => {
            dst[0] = 0xE0 | (cp >> 12) as u8;
            dst[1] = 0x80 | ((cp >> 6) & 0x3F) as u8;
            dst[2] = 0x80 | (cp & 0x3F) as u8;
            3
        }
        _ => {
            dst[0] = 0xF0 | (cp >> 18) as u8;
            dst[1] = 0x80 | ((cp >> 12) & 0x3F) as u8;
            dst[2] = 0x80 | ((cp >> 6) & 0x3F) as u8;
            dst[3] = 0x80 | (cp & 0x3F) as u8;
            4
        }
    }
}

/// Encodes a code-point sequence (e.g. a decoded wide-string payload) into
/// narrow UTF-8, stopping early at an embedded NUL terminator.
///
/// `dst` must have room for [`length_of_many`] bytes. Returns bytes written.
pub fn encode_many(dst: &mut [u8], cps: &[u32]) -> usize {
    let mut at = 0;
    for &cp in cps {
        if cp == 0 {
            break;
        }
        at += encode(&mut dst[at..], cp);
    }
    at
}

/// Total encoded byte length of a code-point sequence, stopping early at an
/// embedded NUL terminator.
pub fn length_of_many(cps: &[u32]) -> usize {
    cps.iter()
        .take_while(|&&cp| cp != 0)
        .map(|&cp| encoded_length(cp))
        .sum()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn round_trips_every_scalar_value() {
        let mut buf = [0u8; 4];
        for cp in (0..=MAX_CODE_POINT).filter(|&cp| !is_surrogate(cp)) {
            let written = encode(&mut buf, cp);
            assert_eq!(written, encoded_length(cp));
            assert_eq!(check_character(&buf[..written]), Some(written));
            assert_eq!(decode(&buf[..written]), (cp, written));
        }
    }

    #[test]
    fn rejects_continuation_byte_in_lead_position() {
        assert_eq!(check_character(&[0x80]), None);
        assert_eq!(check_character(&[0xBF, 0x41]), None);
    }

    #[test]
    fn rejects_truncated_sequences() {
        // lead of a 2-byte form with nothing after it
        assert_eq!(check_character(&[0xC3]), None);
        // 3-byte form cut short
        assert_eq!(check_character(&[0xE2, 0x82]), None);
        // continuation replaced by an ASCII byte
        assert_eq!(check_character(&[0xE2, 0x41, 0x82]), None);
    }

    #[test]
    fn rejects_surrogates_and_out_of_range() {
        // U+D800 in raw form
        assert_eq!(check_character(&[0xED, 0xA0, 0x80]), None);
        // one past U+10FFFF
        assert_eq!(check_character(&[0xF4, 0x90, 0x80, 0x80]), None);
        // 5-byte-era lead byte
        assert_eq!(check_character(&[0xF8, 0x80, 0x80, 0x80]), None);
    }

    #[test]
    fn checks_whole_buffers() {
        assert!(check_buffer("touché ≠ touche".as_bytes()));
        assert!(check_buffer(b""));
        assert!(!check_buffer(b"ok so far \xC3"));
        assert!(!check_buffer(b"\x80mid"));
    }

    #[test]
    fn encodes_sequences_up_to_a_terminator() {
        let cps = [u32::from('a'), 0xE9, u32::from('!'), 0, u32::from('x')];
        assert_eq!(length_of_many(&cps), 4);
        let mut buf = [0u8; 8];
        let written = encode_many(&mut buf, &cps);
        assert_eq!(written, 4);
        assert_eq!(&buf[..written], "aé!".as_bytes());
    }

    #[test]
    fn encodes_sequences_without_a_terminator() {
        let cps = [0x1F600, u32::from('z')];
        assert_eq!(length_of_many(&cps), 5);
        let mut buf = [0u8; 5];
        assert_eq!(encode_many(&mut buf, &cps), 5);
        assert_eq!(&buf, "😀z".as_bytes());
    }
}
