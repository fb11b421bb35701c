//! Base64 variable-length quantities as used by the v3 `mappings` field.
//!
//! Each value is split into 5-bit groups, least significant first. The lowest
//! bit of the first group carries the sign and bit 6 of every digit marks a
//! continuation.

use crate::SourceMapError;

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const CONTINUATION: u64 = 0b10_0000;
const MASK: u64 = 0b01_1111;

/// Appends the encoding of `value` to `out`.
pub fn encode_into(value: i64, out: &mut String) {
    let mut vlq = if value < 0 {
        (value.unsigned_abs() << 1) | 1
    } else {
        (value as u64) << 1
    };
    loop {
        let mut digit = vlq & MASK;
        vlq >>= 5;
        if vlq > 0 {
            digit |= CONTINUATION;
        }
        out.push(BASE64[digit as usize] as char);
        if vlq == 0 {
            break;
        }
    }
}

pub fn encode(value: i64) -> String {
    let mut out = String::new();
    encode_into(value, &mut out);
    out
}

fn digit_value(c: char) -> Option<u64> {
    let value = match c {
        'A'..='Z' => c as u8 - b'A',
        'a'..='z' => c as u8 - b'a' + 26,
        '0'..='9' => c as u8 - b'0' + 52,
        '+' => 62,
        '/' => 63,
        _ => return None,
    };
    Some(u64::from(value))
}

/// Decodes one value from the front of `input`, returning it together with
/// the number of bytes consumed.
pub fn decode(input: &str) -> Result<(i64, usize), SourceMapError> {
    let mut result: u64 = 0;
    let mut shift = 0u32;
    for (consumed, c) in input.chars().enumerate() {
        let digit = digit_value(c).ok_or(SourceMapError::InvalidBase64(c))?;
        if shift > 60 {
            return Err(SourceMapError::Overflow);
        }
        result |= (digit & MASK) << shift;
        shift += 5;
        if digit & CONTINUATION == 0 {
            let magnitude = (result >> 1) as i64;
            let value = if result & 1 == 1 { -magnitude } else { magnitude };
            return Ok((value, consumed + 1));
        }
    }
    Err(SourceMapError::UnexpectedEnd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_encodings() {
        assert_eq!(encode(0), "A");
        assert_eq!(encode(1), "C");
        assert_eq!(encode(-1), "D");
        assert_eq!(encode(15), "e");
        assert_eq!(encode(-15), "f");
        assert_eq!(encode(16), "gB");
        assert_eq!(encode(1000), "w+B");
    }

    #[test]
    fn test_decode_reports_consumed() {
        assert_eq!(decode("gBAAA").unwrap(), (16, 2));
        assert_eq!(decode("D").unwrap(), (-1, 1));
        assert_eq!(decode("w+B").unwrap(), (1000, 3));
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(decode("g"), Err(SourceMapError::UnexpectedEnd)));
        assert!(matches!(decode("!"), Err(SourceMapError::InvalidBase64('!'))));
        assert!(matches!(
            decode("gggggggggggggggA"),
            Err(SourceMapError::Overflow)
        ));
    }

    #[test]
    fn test_large_values() {
        for value in [i32::MAX as i64, i32::MIN as i64, 4_294_967_173] {
            assert_eq!(decode(&encode(value)).unwrap().0, value);
        }
    }
}
