//! Numeric tower: small ints, arbitrary-magnitude integers, fixed-point
//! decimals and floats, with the coercion ladder int -> bigint -> decimal ->
//! float. Small-int arithmetic promotes to `BigInt` when a result no longer
//! fits the 48-bit NaN-box payload. Division is exact only within the
//! int/float pair; mixed big/decimal division falls back to floats (the
//! runtime makes no precision guarantees there).

use std::cmp::Ordering;

use nacre_core::Value;
use nacre_core::value::{TAG_BIGINT, TAG_DECIMAL};

use crate::core::heap::ManagedObject;
use crate::errors::messages::{DIVISION_BY_ZERO, NOT_A_NUMBER};
use crate::runtime::Runtime;

/// Sign-and-magnitude integer; limbs are little-endian base 2^64 with no
/// trailing zero limbs. An empty limb vector is zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BigInt {
    negative: bool,
    limbs: Vec<u64>,
}

impl BigInt {
    pub fn from_i64(i: i64) -> Self {
        Self::from_i128(i as i128)
    }

    pub fn from_i128(i: i128) -> Self {
        let negative = i < 0;
        let mut mag = i.unsigned_abs();
        let mut limbs = Vec::new();
        while mag != 0 {
            limbs.push(mag as u64);
            mag >>= 64;
        }
        Self { negative, limbs }
    }

    pub fn is_zero(&self) -> bool {
        self.limbs.is_empty()
    }

    pub fn limb_count(&self) -> usize {
        self.limbs.len()
    }

    /// Back to i64 when the magnitude fits.
    pub fn to_i64(&self) -> Option<i64> {
        match self.limbs.len() {
            0 => Some(0),
            1 => {
                let mag = self.limbs[0];
                if self.negative {
                    if mag <= 1 << 63 { Some((mag as i128).wrapping_neg() as i64) } else { None }
                } else if mag <= i64::MAX as u64 {
                    Some(mag as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub fn to_f64(&self) -> f64 {
        let mut out = 0.0f64;
        for &limb in self.limbs.iter().rev() {
            out = out * 1.8446744073709552e19 + limb as f64;
        }
        if self.negative { -out } else { out }
    }

    fn normalize(mut self) -> Self {
        while self.limbs.last() == Some(&0) {
            self.limbs.pop();
        }
        if self.limbs.is_empty() {
            self.negative = false;
        }
        self
    }

    fn cmp_magnitude(a: &[u64], b: &[u64]) -> Ordering {
        if a.len() != b.len() {
            return a.len().cmp(&b.len());
        }
        for (x, y) in a.iter().rev().zip(b.iter().rev()) {
            if x != y {
                return x.cmp(y);
            }
        }
        Ordering::Equal
    }

    fn add_magnitude(a: &[u64], b: &[u64]) -> Vec<u64> {
        let mut out = Vec::with_capacity(a.len().max(b.len()) + 1);
        let mut carry = 0u128;
        for i in 0..a.len().max(b.len()) {
            let x = *a.get(i).unwrap_or(&0) as u128;
            let y = *b.get(i).unwrap_or(&0) as u128;
            let sum = x + y + carry;
            out.push(sum as u64);
            carry = sum >> 64;
        }
        if carry != 0 {
            out.push(carry as u64);
        }
        out
    }

    /// Requires |a| >= |b|.
    fn sub_magnitude(a: &[u64], b: &[u64]) -> Vec<u64> {
        let mut out = Vec::with_capacity(a.len());
        let mut borrow = 0i128;
        for i in 0..a.len() {
            let x = a[i] as i128;
            let y = *b.get(i).unwrap_or(&0) as i128;
            let mut diff = x - y - borrow;
            if diff < 0 {
                diff += 1 << 64;
                borrow = 1;
            } else {
                borrow = 0;
            }
            out.push(diff as u64);
        }
        out
    }

    pub fn add(&self, other: &Self) -> Self {
        if self.negative == other.negative {
            return Self {
                negative: self.negative,
                limbs: Self::add_magnitude(&self.limbs, &other.limbs),
            }
            .normalize();
        }
        match Self::cmp_magnitude(&self.limbs, &other.limbs) {
            Ordering::Equal => Self::from_i64(0),
            Ordering::Greater => Self {
                negative: self.negative,
                limbs: Self::sub_magnitude(&self.limbs, &other.limbs),
            }
            .normalize(),
            Ordering::Less => Self {
                negative: other.negative,
                limbs: Self::sub_magnitude(&other.limbs, &self.limbs),
            }
            .normalize(),
        }
    }

    pub fn neg(&self) -> Self {
        if self.is_zero() {
            return self.clone();
        }
        Self {
            negative: !self.negative,
            limbs: self.limbs.clone(),
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    pub fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::from_i64(0);
        }
        let mut limbs = vec![0u64; self.limbs.len() + other.limbs.len()];
        for (i, &x) in self.limbs.iter().enumerate() {
            let mut carry = 0u128;
            for (j, &y) in other.limbs.iter().enumerate() {
                let cur = limbs[i + j] as u128 + x as u128 * y as u128 + carry;
                limbs[i + j] = cur as u64;
                carry = cur >> 64;
            }
            let mut k = i + other.limbs.len();
            while carry != 0 {
                let cur = limbs[k] as u128 + carry;
                limbs[k] = cur as u64;
                carry = cur >> 64;
                k += 1;
            }
        }
        Self {
            negative: self.negative != other.negative,
            limbs,
        }
        .normalize()
    }

    pub fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => Self::cmp_magnitude(&self.limbs, &other.limbs),
            (true, true) => Self::cmp_magnitude(&other.limbs, &self.limbs),
        }
    }

    pub fn to_decimal_string(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        // Peel 19 decimal digits at a time.
        const CHUNK: u64 = 10_000_000_000_000_000_000;
        let mut limbs = self.limbs.clone();
        let mut chunks: Vec<u64> = Vec::new();
        while !limbs.is_empty() {
            let mut rem = 0u128;
            for limb in limbs.iter_mut().rev() {
                let cur = (rem << 64) | *limb as u128;
                *limb = (cur / CHUNK as u128) as u64;
                rem = cur % CHUNK as u128;
            }
            while limbs.last() == Some(&0) {
                limbs.pop();
            }
            chunks.push(rem as u64);
        }
        let mut out = String::new();
        if self.negative {
            out.push('-');
        }
        let mut buf = itoa::Buffer::new();
        out.push_str(buf.format(*chunks.last().expect("nonzero bigint has digits")));
        for &chunk in chunks.iter().rev().skip(1) {
            let digits = buf.format(chunk);
            for _ in digits.len()..19 {
                out.push('0');
            }
            out.push_str(digits);
        }
        out
    }
}

/// Fixed-point decimal: `mantissa * 10^-scale`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decimal {
    pub mantissa: i128,
    pub scale: u32,
}

impl Decimal {
    pub fn new(mantissa: i128, scale: u32) -> Self {
        Self { mantissa, scale }
    }

    pub fn from_i64(i: i64) -> Self {
        Self::new(i as i128, 0)
    }

    fn pow10(exp: u32) -> Option<i128> {
        10i128.checked_pow(exp)
    }

    /// Both mantissas rescaled to the larger scale.
    fn align(a: Self, b: Self) -> Option<(i128, i128, u32)> {
        let scale = a.scale.max(b.scale);
        let am = a.mantissa.checked_mul(Self::pow10(scale - a.scale)?)?;
        let bm = b.mantissa.checked_mul(Self::pow10(scale - b.scale)?)?;
        Some((am, bm, scale))
    }

    pub fn add(&self, other: &Self) -> Option<Self> {
        let (am, bm, scale) = Self::align(*self, *other)?;
        Some(Self::new(am.checked_add(bm)?, scale))
    }

    pub fn sub(&self, other: &Self) -> Option<Self> {
        let (am, bm, scale) = Self::align(*self, *other)?;
        Some(Self::new(am.checked_sub(bm)?, scale))
    }

    pub fn mul(&self, other: &Self) -> Option<Self> {
        Some(Self::new(
            self.mantissa.checked_mul(other.mantissa)?,
            self.scale.checked_add(other.scale)?,
        ))
    }

    pub fn cmp(&self, other: &Self) -> Ordering {
        match Self::align(*self, *other) {
            Some((am, bm, _)) => am.cmp(&bm),
            // overflow on alignment: compare through floats as a last resort
            None => self
                .to_f64()
                .partial_cmp(&other.to_f64())
                .unwrap_or(Ordering::Equal),
        }
    }

    pub fn to_f64(&self) -> f64 {
        self.mantissa as f64 / 10f64.powi(self.scale as i32)
    }

    pub fn to_decimal_string(&self) -> String {
        let mut buf = itoa::Buffer::new();
        if self.scale == 0 {
            return buf.format(self.mantissa).to_string();
        }
        let negative = self.mantissa < 0;
        let digits = buf.format(self.mantissa.unsigned_abs()).to_string();
        let scale = self.scale as usize;
        let mut out = String::new();
        if negative {
            out.push('-');
        }
        if digits.len() <= scale {
            out.push_str("0.");
            for _ in digits.len()..scale {
                out.push('0');
            }
            out.push_str(&digits);
        } else {
            let split = digits.len() - scale;
            out.push_str(&digits[..split]);
            out.push('.');
            out.push_str(&digits[split..]);
        }
        out
    }
}

/// A value lifted into the tower for pairwise coercion.
enum Num {
    Int(i64),
    Big(BigInt),
    Dec(Decimal),
    Float(f64),
}

fn classify(rt: &Runtime, v: Value) -> Result<Num, String> {
    if v.is_int() {
        return Ok(Num::Int(v.as_i64()));
    }
    if v.is_f64() {
        return Ok(Num::Float(v.as_f64()));
    }
    match v.get_tag() {
        TAG_BIGINT => match rt.heap.get(v.as_obj_id()) {
            ManagedObject::BigInt(b) => Ok(Num::Big((**b).clone())),
            _ => Err(NOT_A_NUMBER.to_string()),
        },
        TAG_DECIMAL => match rt.heap.get(v.as_obj_id()) {
            ManagedObject::Decimal(d) => Ok(Num::Dec(**d)),
            _ => Err(NOT_A_NUMBER.to_string()),
        },
        _ => Err(NOT_A_NUMBER.to_string()),
    }
}

/// Box an i128 result: small-int payload when it fits, BigInt otherwise.
pub fn make_int(rt: &mut Runtime, i: i128) -> Value {
    if let Ok(small) = i64::try_from(i) {
        if Value::fits_small_int(small) {
            return Value::from_i64(small);
        }
    }
    rt.new_bigint(BigInt::from_i128(i))
}

fn make_big(rt: &mut Runtime, b: BigInt) -> Value {
    match b.to_i64() {
        Some(i) if Value::fits_small_int(i) => Value::from_i64(i),
        _ => rt.new_bigint(b),
    }
}

fn make_dec(rt: &mut Runtime, d: Option<Decimal>) -> Result<Value, String> {
    match d {
        Some(d) => Ok(rt.new_decimal(d)),
        None => Err("Decimal overflow".to_string()),
    }
}

pub fn num_add(rt: &mut Runtime, a: Value, b: Value) -> Result<Value, String> {
    match (classify(rt, a)?, classify(rt, b)?) {
        (Num::Int(x), Num::Int(y)) => Ok(make_int(rt, x as i128 + y as i128)),
        (Num::Float(x), y) => Ok(Value::from_f64(x + to_f64(&y))),
        (x, Num::Float(y)) => Ok(Value::from_f64(to_f64(&x) + y)),
        (Num::Dec(x), y) => make_dec(rt, x.add(&to_dec(&y))),
        (x, Num::Dec(y)) => make_dec(rt, to_dec(&x).add(&y)),
        (x, y) => Ok(make_big(rt, to_big(&x).add(&to_big(&y)))),
    }
}

pub fn num_sub(rt: &mut Runtime, a: Value, b: Value) -> Result<Value, String> {
    match (classify(rt, a)?, classify(rt, b)?) {
        (Num::Int(x), Num::Int(y)) => Ok(make_int(rt, x as i128 - y as i128)),
        (Num::Float(x), y) => Ok(Value::from_f64(x - to_f64(&y))),
        (x, Num::Float(y)) => Ok(Value::from_f64(to_f64(&x) - y)),
        (Num::Dec(x), y) => make_dec(rt, x.sub(&to_dec(&y))),
        (x, Num::Dec(y)) => make_dec(rt, to_dec(&x).sub(&y)),
        (x, y) => Ok(make_big(rt, to_big(&x).sub(&to_big(&y)))),
    }
}

pub fn num_mul(rt: &mut Runtime, a: Value, b: Value) -> Result<Value, String> {
    match (classify(rt, a)?, classify(rt, b)?) {
        (Num::Int(x), Num::Int(y)) => Ok(make_int(rt, x as i128 * y as i128)),
        (Num::Float(x), y) => Ok(Value::from_f64(x * to_f64(&y))),
        (x, Num::Float(y)) => Ok(Value::from_f64(to_f64(&x) * y)),
        (Num::Dec(x), y) => make_dec(rt, x.mul(&to_dec(&y))),
        (x, Num::Dec(y)) => make_dec(rt, to_dec(&x).mul(&y)),
        (x, y) => Ok(make_big(rt, to_big(&x).mul(&to_big(&y)))),
    }
}

pub fn num_div(rt: &mut Runtime, a: Value, b: Value) -> Result<Value, String> {
    match (classify(rt, a)?, classify(rt, b)?) {
        (Num::Int(x), Num::Int(y)) => {
            if y == 0 {
                return Err(DIVISION_BY_ZERO.to_string());
            }
            Ok(make_int(rt, (x as i128).div_euclid(y as i128)))
        }
        (x, y) => {
            let divisor = to_f64(&y);
            if divisor == 0.0 {
                return Err(DIVISION_BY_ZERO.to_string());
            }
            Ok(Value::from_f64(to_f64(&x) / divisor))
        }
    }
}

pub fn num_cmp(rt: &Runtime, a: Value, b: Value) -> Result<Ordering, String> {
    match (classify(rt, a)?, classify(rt, b)?) {
        (Num::Int(x), Num::Int(y)) => Ok(x.cmp(&y)),
        (Num::Float(x), y) => Ok(x.partial_cmp(&to_f64(&y)).unwrap_or(Ordering::Equal)),
        (x, Num::Float(y)) => Ok(to_f64(&x).partial_cmp(&y).unwrap_or(Ordering::Equal)),
        (Num::Dec(x), y) => Ok(x.cmp(&to_dec(&y))),
        (x, Num::Dec(y)) => Ok(to_dec(&x).cmp(&y)),
        (x, y) => Ok(to_big(&x).cmp(&to_big(&y))),
    }
}

fn to_f64(n: &Num) -> f64 {
    match n {
        Num::Int(i) => *i as f64,
        Num::Big(b) => b.to_f64(),
        Num::Dec(d) => d.to_f64(),
        Num::Float(f) => *f,
    }
}

fn to_big(n: &Num) -> BigInt {
    match n {
        Num::Int(i) => BigInt::from_i64(*i),
        Num::Big(b) => b.clone(),
        // only reached below Dec/Float in the ladder
        Num::Dec(d) => BigInt::from_i128(d.mantissa),
        Num::Float(f) => BigInt::from_i128(*f as i128),
    }
}

fn to_dec(n: &Num) -> Decimal {
    match n {
        Num::Int(i) => Decimal::from_i64(*i),
        Num::Big(b) => Decimal::new(b.to_i64().map(|i| i as i128).unwrap_or(0), 0),
        Num::Dec(d) => *d,
        Num::Float(f) => Decimal::new(*f as i128, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(i: i128) -> BigInt {
        BigInt::from_i128(i)
    }

    #[test]
    fn bigint_add_sub_roundtrip() {
        let a = big(i128::from(i64::MAX) * 3);
        let b = big(12345);
        assert_eq!(a.add(&b).sub(&b), a);
        assert_eq!(a.sub(&a), big(0));
    }

    #[test]
    fn bigint_mixed_signs() {
        assert_eq!(big(100).add(&big(-30)), big(70));
        assert_eq!(big(-100).add(&big(30)), big(-70));
        assert_eq!(big(-5).mul(&big(7)), big(-35));
    }

    #[test]
    fn bigint_decimal_string() {
        assert_eq!(big(0).to_decimal_string(), "0");
        assert_eq!(big(-42).to_decimal_string(), "-42");
        let v = 123456789012345678901234567890i128;
        assert_eq!(big(v).to_decimal_string(), "123456789012345678901234567890");
    }

    #[test]
    fn bigint_cmp_orders_by_sign_then_magnitude() {
        assert_eq!(big(-1).cmp(&big(1)), Ordering::Less);
        assert_eq!(big(i64::MAX as i128 + 1).cmp(&big(i64::MAX as i128)), Ordering::Greater);
        assert_eq!(big(-200).cmp(&big(-100)), Ordering::Less);
    }

    #[test]
    fn decimal_add_aligns_scales() {
        let a = Decimal::new(125, 2); // 1.25
        let b = Decimal::new(5, 1); // 0.5
        let sum = a.add(&b).unwrap();
        assert_eq!(sum.to_decimal_string(), "1.75");
    }

    #[test]
    fn decimal_strings() {
        assert_eq!(Decimal::new(5, 3).to_decimal_string(), "0.005");
        assert_eq!(Decimal::new(-125, 2).to_decimal_string(), "-1.25");
        assert_eq!(Decimal::new(7, 0).to_decimal_string(), "7");
    }
}
