//! Shape-inferred attribute values.
//!
//! `BA_` and `BA_DEF_DEF_` lines carry a value with no declared type; the
//! type is inferred from the literal's shape alone.

/// A value whose type was inferred from its literal shape.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttrValue {
    /// Infer a value from raw literal text.
    ///
    /// Trials run in a fixed order: plain decimal integer, floating point
    /// (optional sign/exponent, `.23` and `-12.` forms included), `0x` hex,
    /// `0b` binary, double-quoted string. Anything else is returned as the
    /// trimmed raw text; inference never fails.
    pub fn infer(raw: &str) -> AttrValue {
        let s = raw.trim();
        if let Ok(n) = s.parse::<i64>() {
            return AttrValue::Int(n);
        }
        if is_float_shaped(s) {
            if let Ok(f) = s.parse::<f64>() {
                return AttrValue::Float(f);
            }
        }
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            if let Ok(n) = i64::from_str_radix(hex, 16) {
                return AttrValue::Int(n);
            }
        }
        if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
            if let Ok(n) = i64::from_str_radix(bin, 2) {
                return AttrValue::Int(n);
            }
        }
        if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
            return AttrValue::Text(s[1..s.len() - 1].to_string());
        }
        AttrValue::Text(s.to_string())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(n) => Some(*n as f64),
            AttrValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

// `f64::from_str` also accepts words like "inf" and "NaN"; restricting the
// alphabet first keeps those on the text fallback path.
fn is_float_shaped(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().any(|b| b.is_ascii_digit())
        && s.bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trial_order_is_int_first() {
        assert_eq!(AttrValue::infer("123"), AttrValue::Int(123));
        assert_eq!(AttrValue::infer("-123"), AttrValue::Int(-123));
        assert_eq!(AttrValue::infer("10.23"), AttrValue::Float(10.23));
    }

    #[test]
    fn float_words_stay_text() {
        assert_eq!(AttrValue::infer("inf"), AttrValue::Text("inf".into()));
        assert_eq!(AttrValue::infer("NaN"), AttrValue::Text("NaN".into()));
    }

    #[test]
    fn binary_literal() {
        assert_eq!(AttrValue::infer("0b1010"), AttrValue::Int(10));
    }

    #[test]
    fn unmatched_shape_falls_back_to_raw_text() {
        assert_eq!(
            AttrValue::infer(" foo bar "),
            AttrValue::Text("foo bar".into())
        );
    }
}
