//! 15-bit arithmetic.
//!
//! All results are reduced into the literal range `0..MODULUS`. Inputs are
//! not required to be in range: a register may hold the empty-stack
//! sentinel `0xFFFF`, and invalid operand words read back as themselves.

/// Arithmetic modulus: results of ADD and MULT wrap at 2^15.
pub const MODULUS: u32 = 32768;

const MASK: u16 = 0x7FFF;

/// `(a + b) mod 32768`
#[inline]
pub fn add(a: u16, b: u16) -> u16 {
    ((a as u32 + b as u32) % MODULUS) as u16
}

/// `(a * b) mod 32768`
#[inline]
pub fn mult(a: u16, b: u16) -> u16 {
    ((a as u32 * b as u32) % MODULUS) as u16
}

/// Remainder of `a / b`, or `None` when `b` is zero.
#[inline]
pub fn modulo(a: u16, b: u16) -> Option<u16> {
    a.checked_rem(b).map(|r| r & MASK)
}

#[inline]
pub fn and(a: u16, b: u16) -> u16 {
    a & b & MASK
}

#[inline]
pub fn or(a: u16, b: u16) -> u16 {
    (a | b) & MASK
}

/// 15-bit complement.
#[inline]
pub fn not(a: u16) -> u16 {
    (a ^ MASK) & MASK
}

/// 1 if `a == b`, else 0.
#[inline]
pub fn eq(a: u16, b: u16) -> u16 {
    u16::from(a == b)
}

/// 1 if `a > b`, else 0.
#[inline]
pub fn gt(a: u16, b: u16) -> u16 {
    u16::from(a > b)
}
