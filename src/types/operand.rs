use std::cmp::Ordering;
use std::fmt;
use std::iter;
use std::str::FromStr;

use super::error::EvalError;

/// Fraction digits beyond this count cannot be represented as an integer `f` operand.
pub const MAX_FRACTION_DIGITS: usize = 18;

/// Decimal digits in `u64::MAX`.
const MAX_INTEGER_DIGITS: usize = 20;

/// CLDR operand letters a rule may refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperandSymbol {
    /// Absolute value of the source number.
    N,
    /// Integer digits of `n`.
    I,
    /// Number of visible fraction digits, with trailing zeros.
    V,
    /// Number of visible fraction digits, without trailing zeros.
    W,
    /// Visible fraction digits, with trailing zeros, as an integer.
    F,
    /// Visible fraction digits, without trailing zeros, as an integer.
    T,
    /// Compact decimal exponent.
    E,
}

impl OperandSymbol {
    pub const ALL: [OperandSymbol; 7] = [
        OperandSymbol::N,
        OperandSymbol::I,
        OperandSymbol::V,
        OperandSymbol::W,
        OperandSymbol::F,
        OperandSymbol::T,
        OperandSymbol::E,
    ];

    /// Map a rule letter to its symbol. `c` is accepted as a synonym of `e`.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'n' => Some(OperandSymbol::N),
            'i' => Some(OperandSymbol::I),
            'v' => Some(OperandSymbol::V),
            'w' => Some(OperandSymbol::W),
            'f' => Some(OperandSymbol::F),
            't' => Some(OperandSymbol::T),
            'e' | 'c' => Some(OperandSymbol::E),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            OperandSymbol::N => 'n',
            OperandSymbol::I => 'i',
            OperandSymbol::V => 'v',
            OperandSymbol::W => 'w',
            OperandSymbol::F => 'f',
            OperandSymbol::T => 't',
            OperandSymbol::E => 'e',
        }
    }
}

impl fmt::Display for OperandSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A number decomposed into the shape CLDR plural rules look at.
///
/// The operand keeps the visible fraction digits verbatim, so `1` and `1.0`
/// are different operands (`v` is 0 and 1 respectively) even though
/// [`cmp_value`](Self::cmp_value) reports them numerically equal. The exponent
/// is metadata only: the digits are stored already shifted, so `1.2c3` has
/// `i = 1200` and `e = 3`.
///
/// # Example
///
/// ```
/// use plurule::Operand;
///
/// let op: Operand = "-12.50".parse().unwrap();
/// assert_eq!(op.sign(), -1);
/// assert_eq!(op.i(), 12);
/// assert_eq!(op.v(), 2);
/// assert_eq!(op.w(), 1);
/// assert_eq!(op.f(), 50);
/// assert_eq!(op.t(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawOperand", into = "RawOperand")
)]
pub struct Operand {
    sign: i8,
    integer: u64,
    integer_digits: u32,
    fraction: Box<str>,
    exponent: i32,
}

impl Operand {
    /// Build an operand from its parts.
    ///
    /// `fraction` holds the visible fraction digits, trailing zeros included.
    /// The sign is normalized: zero values get sign `0`, any other value gets
    /// the sign of `sign` (with `0` read as positive).
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::InvalidOperation`] if `fraction` contains a
    /// non-digit or more than [`MAX_FRACTION_DIGITS`] digits.
    pub fn new(sign: i8, integer: u64, fraction: &str, exponent: i32) -> Result<Self, EvalError> {
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EvalError::invalid(format!(
                "fraction '{fraction}' contains non-digit characters"
            )));
        }
        if fraction.len() > MAX_FRACTION_DIGITS {
            return Err(EvalError::invalid(format!(
                "{} fraction digits exceed the maximum of {MAX_FRACTION_DIGITS}",
                fraction.len()
            )));
        }
        Ok(Self::from_parts(sign, integer, fraction.into(), exponent))
    }

    /// The operand of an absent number: no digits and sign `0`.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            sign: 0,
            integer: 0,
            integer_digits: 0,
            fraction: Box::from(""),
            exponent: 0,
        }
    }

    fn from_parts(sign: i8, integer: u64, fraction: Box<str>, exponent: i32) -> Self {
        let is_zero = integer == 0 && fraction.bytes().all(|b| b == b'0');
        let sign = if is_zero {
            0
        } else if sign < 0 {
            -1
        } else {
            1
        };
        Self {
            sign,
            integer,
            integer_digits: digit_count(integer),
            fraction,
            exponent,
        }
    }

    /// `-1`, `0` or `1`.
    #[must_use]
    pub fn sign(&self) -> i8 {
        self.sign
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.integer_digits == 0 && self.fraction.is_empty()
    }

    /// Number of integer digits; `0` only for [`Operand::empty`].
    #[must_use]
    pub fn integer_digit_count(&self) -> u32 {
        self.integer_digits
    }

    /// Absolute value, keeping every digit.
    #[must_use]
    pub fn n(&self) -> Operand {
        Operand {
            sign: self.sign.abs(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn i(&self) -> u64 {
        self.integer
    }

    #[must_use]
    pub fn v(&self) -> usize {
        self.fraction.len()
    }

    #[must_use]
    pub fn w(&self) -> usize {
        self.trimmed_fraction().len()
    }

    #[must_use]
    pub fn f(&self) -> u64 {
        digits_value(&self.fraction)
    }

    #[must_use]
    pub fn t(&self) -> u64 {
        digits_value(self.trimmed_fraction())
    }

    #[must_use]
    pub fn e(&self) -> i32 {
        self.exponent
    }

    /// Visible fraction digits, trailing zeros included.
    #[must_use]
    pub fn fraction_digits(&self) -> &str {
        &self.fraction
    }

    /// Visible fraction digits with trailing zeros removed.
    #[must_use]
    pub fn trimmed_fraction(&self) -> &str {
        self.fraction.trim_end_matches('0')
    }

    /// The operand component named by `symbol`, as an operand of its own.
    ///
    /// Digit counts (`v`, `w`) and digit sequences (`f`, `t`) become
    /// integer-valued operands.
    #[must_use]
    pub fn component(&self, symbol: OperandSymbol) -> Operand {
        match symbol {
            OperandSymbol::N => self.n(),
            OperandSymbol::I => Operand::from(self.i()),
            OperandSymbol::V => Operand::from(self.v() as u64),
            OperandSymbol::W => Operand::from(self.w() as u64),
            OperandSymbol::F => Operand::from(self.f()),
            OperandSymbol::T => Operand::from(self.t()),
            OperandSymbol::E => Operand::from(i64::from(self.exponent)),
        }
    }

    /// Compare the numeric values of two operands digit by digit.
    ///
    /// Trailing fraction zeros do not affect the result.
    #[must_use]
    pub fn cmp_value(&self, other: &Operand) -> Ordering {
        match self.sign.cmp(&other.sign) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
        let magnitude = self.integer.cmp(&other.integer).then_with(|| {
            cmp_fraction(self.trimmed_fraction(), other.trimmed_fraction())
        });
        if self.sign < 0 {
            magnitude.reverse()
        } else {
            magnitude
        }
    }

    #[must_use]
    pub fn value_eq(&self, other: &Operand) -> bool {
        self.cmp_value(other) == Ordering::Equal
    }

    /// `self mod divisor`, applied to the integer digits.
    ///
    /// Fraction digits, sign and exponent are carried over unchanged, so
    /// `12.5 mod 10` is `2.5` with `v = 1`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::InvalidOperation`] if `divisor` is not positive.
    pub fn modulo(&self, divisor: i32) -> Result<Operand, EvalError> {
        let divisor = u64::try_from(divisor)
            .ok()
            .filter(|d| *d > 0)
            .ok_or_else(|| EvalError::invalid(format!("modulo divisor {divisor} must be positive")))?;
        if self.is_empty() {
            return Ok(self.clone());
        }
        Ok(Self::from_parts(
            self.sign,
            self.integer % divisor,
            self.fraction.clone(),
            self.exponent,
        ))
    }

    /// The signed integer value of this operand.
    ///
    /// Trailing fraction zeros are allowed, so `3.00` yields `3`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::InvalidOperation`] if the operand is empty, has a
    /// non-zero fraction, or does not fit in an `i64`.
    pub fn try_integer_value(&self) -> Result<i64, EvalError> {
        if self.is_empty() {
            return Err(EvalError::invalid("operand has no digits"));
        }
        if !self.trimmed_fraction().is_empty() {
            return Err(EvalError::invalid(format!("{self} has a non-zero fraction")));
        }
        let magnitude = i64::try_from(self.integer)
            .map_err(|_| EvalError::invalid(format!("{self} does not fit in a 64-bit integer")))?;
        Ok(if self.sign < 0 { -magnitude } else { magnitude })
    }
}

fn digit_count(value: u64) -> u32 {
    if value == 0 { 1 } else { value.ilog10() + 1 }
}

fn digits_value(digits: &str) -> u64 {
    digits
        .bytes()
        .fold(0, |acc, b| acc * 10 + u64::from(b - b'0'))
}

fn padded(digits: &str, len: usize) -> impl Iterator<Item = u8> + '_ {
    digits.bytes().chain(iter::repeat(b'0')).take(len)
}

fn cmp_fraction(a: &str, b: &str) -> Ordering {
    let len = a.len().max(b.len());
    padded(a, len).cmp(padded(b, len))
}

impl From<u64> for Operand {
    fn from(v: u64) -> Self {
        Operand::from_parts(1, v, Box::from(""), 0)
    }
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::from_parts(v.signum() as i8, v.unsigned_abs(), Box::from(""), 0)
    }
}

impl From<u32> for Operand {
    fn from(v: u32) -> Self {
        Operand::from(u64::from(v))
    }
}

impl From<i32> for Operand {
    fn from(v: i32) -> Self {
        Operand::from(i64::from(v))
    }
}

/// Wire form of [`Operand`]. Decoding goes through [`Operand::new`], so a
/// payload cannot bypass sign normalization or fraction checks.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct RawOperand {
    sign: i8,
    /// `None` for the empty operand.
    integer: Option<u64>,
    fraction: String,
    exponent: i32,
}

#[cfg(feature = "serde")]
impl From<Operand> for RawOperand {
    fn from(op: Operand) -> Self {
        RawOperand {
            sign: op.sign,
            integer: (!op.is_empty()).then_some(op.integer),
            fraction: op.fraction.into(),
            exponent: op.exponent,
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<RawOperand> for Operand {
    type Error = EvalError;

    fn try_from(raw: RawOperand) -> Result<Self, Self::Error> {
        match raw.integer {
            Some(integer) => Operand::new(raw.sign, integer, &raw.fraction, raw.exponent),
            None if raw.fraction.is_empty() => Ok(Operand::empty()),
            None => Err(EvalError::invalid("empty operand with fraction digits")),
        }
    }
}

/// Parses decimal literals such as `"3"`, `"-1.50"` or the compact forms
/// `"1.2c3"` / `"1.2e3"`.
impl FromStr for Operand {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let not_decimal = || EvalError::invalid(format!("'{s}' is not a decimal literal"));
        let text = s.trim();
        let (sign, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, text.strip_prefix('+').unwrap_or(text)),
        };

        let (mantissa, exponent) = match unsigned.find(|c: char| matches!(c, 'c' | 'e' | 'E')) {
            Some(at) => {
                let exponent: u32 = unsigned[at + 1..].parse().map_err(|_| not_decimal())?;
                (&unsigned[..at], exponent)
            }
            None => (unsigned, 0),
        };

        let (int_text, frac_text) = match mantissa.split_once('.') {
            Some((int_text, frac_text)) if !frac_text.is_empty() => (int_text, frac_text),
            Some(_) => return Err(not_decimal()),
            None => (mantissa, ""),
        };
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if int_text.is_empty() || !all_digits(int_text) || !all_digits(frac_text) {
            return Err(not_decimal());
        }

        let exponent_len = usize::try_from(exponent).map_err(|_| not_decimal())?;
        if int_text.trim_start_matches('0').len() + exponent_len > MAX_INTEGER_DIGITS {
            return Err(EvalError::invalid(format!(
                "integer part of '{s}' does not fit in 64 bits"
            )));
        }
        let shifted = exponent_len.min(frac_text.len());
        let mut integer_text = String::with_capacity(int_text.len() + exponent_len);
        integer_text.push_str(int_text);
        integer_text.push_str(&frac_text[..shifted]);
        integer_text.extend(iter::repeat_n('0', exponent_len - shifted));

        let integer: u64 = integer_text.parse().map_err(|_| {
            EvalError::invalid(format!("integer part of '{s}' does not fit in 64 bits"))
        })?;
        let exponent = i32::try_from(exponent).map_err(|_| not_decimal())?;
        Operand::new(sign, integer, &frac_text[shifted..], exponent)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "empty");
        }
        if self.sign < 0 {
            write!(f, "-")?;
        }
        write!(f, "{}", self.integer)?;
        if !self.fraction.is_empty() {
            write!(f, ".{}", self.fraction)?;
        }
        Ok(())
    }
}
