//! # GF(2^8) Arithmetic
//!
//! Primitive polynomial x^8 + x^4 + x^3 + x^2 + 1 (0x11D), generator 2.
//! Log/antilog tables are built at compile time; the exponent table is
//! doubled (510 entries) so `log a + log b` (at most 508) indexes it directly
//! without a modulo in the hot path.
//!
//! Addition and subtraction are both XOR (characteristic 2).

use tracing::error;

use crate::error::GfError;

/// Number of field elements.
pub const FIELD_SIZE: usize = 256;

/// Order of the multiplicative group.
pub const GROUP_ORDER: usize = FIELD_SIZE - 1;

/// Primitive polynomial used for reduction.
pub const PRIMITIVE_POLY: u16 = 0x11D;

/// Length of the doubled exponent table.
pub const EXP_TABLE_LEN: usize = 2 * FIELD_SIZE - 2;

const fn gen_tables() -> ([u8; FIELD_SIZE], [u8; EXP_TABLE_LEN]) {
    let mut log = [0u8; FIELD_SIZE];
    let mut exp = [0u8; EXP_TABLE_LEN];
    let mut x: u16 = 1;
    let mut i = 0usize;
    while i < GROUP_ORDER {
        exp[i] = x as u8;
        exp[i + GROUP_ORDER] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE_POLY;
        }
        i += 1;
    }
    // 0 has no logarithm; the slot is never read for a zero operand.
    log[0] = 0;
    (log, exp)
}

const TABLES: ([u8; FIELD_SIZE], [u8; EXP_TABLE_LEN]) = gen_tables();
static LOG_TABLE: [u8; FIELD_SIZE] = TABLES.0;
static EXP_TABLE: [u8; EXP_TABLE_LEN] = TABLES.1;

/// Discrete-log table (`log[0]` is a placeholder).
pub fn log_table() -> &'static [u8; FIELD_SIZE] {
    &LOG_TABLE
}

/// Doubled exponent table: `exp[i] == exp[i + 255]`.
pub fn exp_table() -> &'static [u8; EXP_TABLE_LEN] {
    &EXP_TABLE
}

/// Addition in GF(256).
#[inline]
pub fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Subtraction in GF(256); identical to [`add`].
#[inline]
pub fn sub(a: u8, b: u8) -> u8 {
    add(a, b)
}

/// Multiplication in GF(256).
#[inline]
pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    EXP_TABLE[LOG_TABLE[a as usize] as usize + LOG_TABLE[b as usize] as usize]
}

/// Division in GF(256). `div(0, b) == 0` for any nonzero `b`.
pub fn div(a: u8, b: u8) -> Result<u8, GfError> {
    if b == 0 {
        error!(dividend = a, "division by zero in GF(256)");
        return Err(GfError::DivisionByZero);
    }
    if a == 0 {
        return Ok(0);
    }
    let idx = LOG_TABLE[a as usize] as usize + GROUP_ORDER - LOG_TABLE[b as usize] as usize;
    Ok(EXP_TABLE[idx])
}

/// Multiplicative inverse in GF(256).
pub fn inv(a: u8) -> Result<u8, GfError> {
    if a == 0 {
        error!("inverse of zero in GF(256)");
        return Err(GfError::ZeroInverse);
    }
    Ok(EXP_TABLE[GROUP_ORDER - LOG_TABLE[a as usize] as usize])
}

/// `dst[i] *= c` for every byte.
pub fn mul_slice(dst: &mut [u8], c: u8) {
    match c {
        0 => dst.fill(0),
        1 => {}
        _ => {
            for d in dst.iter_mut() {
                *d = mul(*d, c);
            }
        }
    }
}

/// `dst[i] += c * src[i]` over the common prefix of both slices.
pub fn mul_add_slice(dst: &mut [u8], src: &[u8], c: u8) {
    if c == 0 {
        return;
    }
    if c == 1 {
        for (d, s) in dst.iter_mut().zip(src) {
            *d ^= *s;
        }
        return;
    }
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= mul(c, *s);
    }
}
