use std::{
    cmp,
    fmt,
    fmt::Display,
    ops::Mul,
    str::FromStr,
};

use anyhow::{
    Context,
    Error,
};
use num::Integer;
use serde::{
    Deserialize,
    Serialize,
    Serializer,
    de::{
        SeqAccess,
        Unexpected,
        Visitor,
    },
};

/// An unsigned fraction, used for percentages and multipliers in data.
///
/// A fraction deserializes from:
/// - an integer (`20`), which is a whole number.
/// - a floating point number (`1.5`), which is converted to a fraction out of 4096.
/// - a fraction string (`"1/2"`).
/// - a percentage string (`"60%"`).
/// - a two-element array (`[2, 5]`).
#[derive(Debug, Clone, Copy)]
pub struct Fraction {
    num: u32,
    den: u32,
}

impl Fraction {
    /// Creates a new fraction.
    pub const fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }

    /// Creates a new percentage.
    pub fn percentage(n: u32) -> Self {
        Self::new(n, 100).simplify()
    }

    pub fn numerator(&self) -> u32 {
        self.num
    }

    pub fn denominator(&self) -> u32 {
        self.den
    }

    /// Is the fraction a whole number?
    pub fn is_whole(&self) -> bool {
        self.den == 1
    }

    /// Reduces the fraction to lowest terms.
    pub fn simplify(&self) -> Self {
        if self.den == 0 {
            return *self;
        }
        let gcd = self.num.gcd(&self.den);
        if gcd == 0 {
            return *self;
        }
        Self::new(self.num / gcd, self.den / gcd)
    }

    /// The truncated integer value of the fraction.
    pub fn integer(&self) -> u32 {
        self.num.checked_div(self.den).unwrap_or(0)
    }

    /// Scales the fraction to be out of 4096, the fixed-point base used by damage modifiers.
    pub fn to_4096(&self) -> u32 {
        ((self.num as u64 * 4096) / (self.den.max(1) as u64)) as u32
    }

    fn normalize(a: &Self, b: &Self) -> (u64, u64) {
        let lcm = (a.den as u64).lcm(&(b.den as u64)).max(1);
        (
            a.num as u64 * (lcm / (a.den as u64).max(1)),
            b.num as u64 * (lcm / (b.den as u64).max(1)),
        )
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

impl Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole() {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl From<u32> for Fraction {
    fn from(value: u32) -> Self {
        Self::new(value, 1)
    }
}

impl From<f64> for Fraction {
    fn from(value: f64) -> Self {
        Self::new((value * 4096f64).trunc() as u32, 4096).simplify()
    }
}

impl FromStr for Fraction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((n, d)) = s.split_once('/') {
            let n = n
                .trim()
                .parse()
                .context(format!("invalid numerator: {n}"))?;
            let d = d
                .trim()
                .parse()
                .context(format!("invalid denominator: {d}"))?;
            return Ok(Self::new(n, d));
        }
        let s = s.strip_suffix('%').unwrap_or(s);
        Ok(Self::percentage(
            s.trim().parse().context(format!("invalid percentage: {s}"))?,
        ))
    }
}

impl PartialEq for Fraction {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = Self::normalize(self, other);
        a == b
    }
}

impl Eq for Fraction {}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        let (a, b) = Self::normalize(self, other);
        a.cmp(&b)
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Mul<u32> for Fraction {
    type Output = Self;
    fn mul(self, rhs: u32) -> Self::Output {
        Self::new(self.num * rhs, self.den).simplify()
    }
}

impl Mul for Fraction {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        Self::new(self.num * rhs.num, self.den * rhs.den).simplify()
    }
}

impl Serialize for Fraction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.is_whole() {
            serializer.serialize_u32(self.num)
        } else {
            serializer.collect_str(self)
        }
    }
}

struct FractionVisitor;

impl<'de> Visitor<'de> for FractionVisitor {
    type Value = Fraction;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(
            formatter,
            "an integer, a float, a fraction string, a percentage string, or a two-element array"
        )
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        u32::try_from(v)
            .map(Fraction::from)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        u32::try_from(v)
            .map(Fraction::from)
            .map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        if v < 0f64 {
            return Err(E::invalid_value(Unexpected::Float(v), &self));
        }
        Ok(Fraction::from(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Fraction::from_str(v).map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let num = seq
            .next_element()?
            .ok_or_else(|| serde::de::Error::invalid_length(0, &self))?;
        let den = seq
            .next_element()?
            .ok_or_else(|| serde::de::Error::invalid_length(1, &self))?;
        if seq.next_element::<u32>()?.is_some() {
            return Err(serde::de::Error::invalid_length(3, &self));
        }
        Ok(Fraction::new(num, den))
    }
}

impl<'de> Deserialize<'de> for Fraction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(FractionVisitor)
    }
}
