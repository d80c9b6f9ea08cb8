//! The document value model backing PartiQL literals.
//!
//! The lexer validates literal lexemes; the parse-tree lowering calls the
//! constructors here to turn the lexeme text into an opaque [`Value`]. The
//! evaluator and type checker consume these values without caring how they
//! were spelled in the source.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::Serialize;

/// A literal value in the PartiQL data model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    /// Exact decimal, covering both `1.5` and exponent forms like `2e-3`.
    Decimal(BigDecimal),
    String(String),
    /// Symbolic name, used for canonicalized arguments such as trim
    /// specifications and date parts.
    Symbol(String),
    Timestamp(Timestamp),
}

impl Value {
    /// Build an integer value from an integer literal lexeme.
    pub fn parse_integer(text: &str) -> Result<Value, ValueError> {
        text.parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| ValueError::new(format!("integer literal out of range: {text}")))
    }

    /// Build a decimal value from a decimal literal lexeme (with optional
    /// fraction and exponent).
    pub fn parse_decimal(text: &str) -> Result<Value, ValueError> {
        BigDecimal::from_str(text)
            .map(Value::Decimal)
            .map_err(|_| ValueError::new(format!("invalid decimal literal: {text}")))
    }

    /// Build a timestamp value from the inner text of a backtick literal.
    pub fn parse_timestamp(text: &str) -> Result<Value, ValueError> {
        Timestamp::parse(text).map(Value::Timestamp)
    }

    /// Whether this value is a non-negative integer. Type parameters in
    /// `CAST` targets must satisfy this.
    pub fn is_unsigned_integer(&self) -> bool {
        matches!(self, Value::Integer(i) if *i >= 0)
    }

    /// The numeric value, if this is an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// The text content, if this is a string or symbol.
    pub fn text(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is the null sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// A timestamp with Ion-style variable precision.
///
/// Backtick literals support year (`` `2001T` ``), year-month (`` `2001-05T` ``),
/// date (`` `2001-05-03` ``), and full date-time precision. When a time of day
/// is present an offset (`Z` or `+hh:mm`/`-hh:mm`) is required. Seconds may
/// carry a decimal fraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timestamp {
    pub year: u16,
    pub month: Option<u8>,
    pub day: Option<u8>,
    pub hour: Option<u8>,
    pub minute: Option<u8>,
    /// Seconds including any fractional part.
    pub second: Option<BigDecimal>,
    /// Minutes east of UTC. Present exactly when a time of day is present.
    pub offset_minutes: Option<i16>,
}

impl Timestamp {
    fn year_only(year: u16) -> Self {
        Self {
            year,
            month: None,
            day: None,
            hour: None,
            minute: None,
            second: None,
            offset_minutes: None,
        }
    }

    /// Parse the inner text of a backtick timestamp literal.
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let bad = || ValueError::new(format!("invalid timestamp literal: {text}"));
        let mut rest = text;

        let year = take_digits(&mut rest, 4).ok_or_else(bad)?;
        if year == 0 {
            return Err(bad());
        }
        let mut ts = Timestamp::year_only(year as u16);

        // Year precision requires the trailing `T`.
        if rest == "T" {
            return Ok(ts);
        }

        rest = rest.strip_prefix('-').ok_or_else(bad)?;
        let month = take_digits(&mut rest, 2).ok_or_else(bad)?;
        if !(1..=12).contains(&month) {
            return Err(bad());
        }
        ts.month = Some(month as u8);
        if rest == "T" {
            return Ok(ts);
        }

        rest = rest.strip_prefix('-').ok_or_else(bad)?;
        let day = take_digits(&mut rest, 2).ok_or_else(bad)?;
        if !(1..=31).contains(&day) {
            return Err(bad());
        }
        ts.day = Some(day as u8);
        if rest.is_empty() || rest == "T" {
            return Ok(ts);
        }

        rest = rest.strip_prefix('T').ok_or_else(bad)?;
        let hour = take_digits(&mut rest, 2).ok_or_else(bad)?;
        rest = rest.strip_prefix(':').ok_or_else(bad)?;
        let minute = take_digits(&mut rest, 2).ok_or_else(bad)?;
        if hour > 23 || minute > 59 {
            return Err(bad());
        }
        ts.hour = Some(hour as u8);
        ts.minute = Some(minute as u8);

        if let Some(after) = rest.strip_prefix(':') {
            rest = after;
            let start = rest.len();
            let sec = take_digits(&mut rest, 2).ok_or_else(bad)?;
            if sec > 59 {
                return Err(bad());
            }
            let mut sec_text = text[text.len() - start..text.len() - rest.len()].to_string();
            if let Some(after_dot) = rest.strip_prefix('.') {
                let frac_len = after_dot.len() - after_dot.trim_start_matches(|c: char| c.is_ascii_digit()).len();
                if frac_len == 0 {
                    return Err(bad());
                }
                sec_text.push('.');
                sec_text.push_str(&after_dot[..frac_len]);
                rest = &after_dot[frac_len..];
            }
            let seconds = BigDecimal::from_str(&sec_text).map_err(|_| bad())?;
            ts.second = Some(seconds);
        }

        // Offset is mandatory once a time of day is present.
        if let Some(after) = rest.strip_prefix('Z') {
            rest = after;
            ts.offset_minutes = Some(0);
        } else {
            let sign = match rest.chars().next() {
                Some('+') => 1i16,
                Some('-') => -1i16,
                _ => return Err(bad()),
            };
            rest = &rest[1..];
            let oh = take_digits(&mut rest, 2).ok_or_else(bad)?;
            rest = rest.strip_prefix(':').ok_or_else(bad)?;
            let om = take_digits(&mut rest, 2).ok_or_else(bad)?;
            if oh > 23 || om > 59 {
                return Err(bad());
            }
            ts.offset_minutes = Some(sign * (oh as i16 * 60 + om as i16));
        }

        if rest.is_empty() {
            Ok(ts)
        } else {
            Err(bad())
        }
    }
}

/// Consume exactly `n` ASCII digits from the front of `rest`.
fn take_digits(rest: &mut &str, n: usize) -> Option<u32> {
    if rest.len() < n || !rest.as_bytes()[..n].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let value = rest[..n].parse::<u32>().ok()?;
    *rest = &rest[n..];
    Some(value)
}

/// Error from a literal-to-value conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueError {
    pub message: String,
}

impl ValueError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValueError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_integer_values() {
        assert_eq!(Value::parse_integer("42"), Ok(Value::Integer(42)));
        assert_eq!(Value::parse_integer("0"), Ok(Value::Integer(0)));
        assert!(Value::parse_integer("99999999999999999999").is_err());
    }

    #[test]
    fn parse_decimal_values() {
        let d = Value::parse_decimal("3.14").unwrap();
        assert_eq!(d, Value::Decimal(BigDecimal::from_str("3.14").unwrap()));
        assert!(Value::parse_decimal("1e5").is_ok());
        assert!(Value::parse_decimal("2.5e-3").is_ok());
        assert!(Value::parse_decimal("abc").is_err());
    }

    #[test]
    fn unsigned_integer_predicate() {
        assert!(Value::Integer(3).is_unsigned_integer());
        assert!(Value::Integer(0).is_unsigned_integer());
        assert!(!Value::Integer(-1).is_unsigned_integer());
        assert!(!Value::String("3".into()).is_unsigned_integer());
    }

    #[test]
    fn text_accessor() {
        assert_eq!(Value::String("a".into()).text(), Some("a"));
        assert_eq!(Value::Symbol("leading".into()).text(), Some("leading"));
        assert_eq!(Value::Integer(1).text(), None);
    }

    #[test]
    fn timestamp_year_precision() {
        let ts = Timestamp::parse("2001T").unwrap();
        assert_eq!(ts.year, 2001);
        assert_eq!(ts.month, None);
        assert_eq!(ts.offset_minutes, None);
    }

    #[test]
    fn timestamp_month_and_date_precision() {
        let ts = Timestamp::parse("2001-05T").unwrap();
        assert_eq!((ts.year, ts.month, ts.day), (2001, Some(5), None));

        let ts = Timestamp::parse("2001-05-03").unwrap();
        assert_eq!((ts.year, ts.month, ts.day), (2001, Some(5), Some(3)));

        // Trailing `T` after a full date is accepted too.
        assert!(Timestamp::parse("2001-05-03T").is_ok());
    }

    #[test]
    fn timestamp_with_time_requires_offset() {
        let ts = Timestamp::parse("2001-05-03T07:30Z").unwrap();
        assert_eq!((ts.hour, ts.minute), (Some(7), Some(30)));
        assert_eq!(ts.offset_minutes, Some(0));

        let ts = Timestamp::parse("2001-05-03T07:30:59.123-05:30").unwrap();
        assert_eq!(ts.second, Some(BigDecimal::from_str("59.123").unwrap()));
        assert_eq!(ts.offset_minutes, Some(-330));

        assert!(Timestamp::parse("2001-05-03T07:30").is_err());
    }

    #[test]
    fn timestamp_rejects_malformed_text() {
        assert!(Timestamp::parse("2001").is_err()); // year needs trailing T
        assert!(Timestamp::parse("0000T").is_err());
        assert!(Timestamp::parse("2001-13T").is_err());
        assert!(Timestamp::parse("2001-05-32").is_err());
        assert!(Timestamp::parse("2001-05-03T25:00Z").is_err());
        assert!(Timestamp::parse("hello").is_err());
        assert!(Timestamp::parse("2001-05-03T07:30Zx").is_err());
    }
}
