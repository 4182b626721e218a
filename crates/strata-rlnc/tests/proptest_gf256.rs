//! Property-based tests for GF(2^8) arithmetic.
//!
//! Field axioms over the full operand range, plus agreement between the
//! table-driven multiply and a bitwise carry-less reference.

use proptest::prelude::*;
use strata_rlnc::error::GfError;
use strata_rlnc::gf256;

/// Shift-and-add multiply reduced by 0x11D.
fn slow_mul(mut a: u8, mut b: u8) -> u8 {
    let mut product = 0u8;
    while b != 0 {
        if b & 1 != 0 {
            product ^= a;
        }
        let carry = a & 0x80 != 0;
        a <<= 1;
        if carry {
            a ^= 0x1D;
        }
        b >>= 1;
    }
    product
}

fn nonzero() -> impl Strategy<Value = u8> {
    1u8..=255
}

// ─── Multiplication ─────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn mul_matches_reference(a in any::<u8>(), b in any::<u8>()) {
        prop_assert_eq!(gf256::mul(a, b), slow_mul(a, b));
    }

    #[test]
    fn mul_is_commutative(a in any::<u8>(), b in any::<u8>()) {
        prop_assert_eq!(gf256::mul(a, b), gf256::mul(b, a));
    }

    #[test]
    fn mul_is_associative(a in any::<u8>(), b in any::<u8>(), c in any::<u8>()) {
        prop_assert_eq!(
            gf256::mul(gf256::mul(a, b), c),
            gf256::mul(a, gf256::mul(b, c))
        );
    }

    #[test]
    fn mul_distributes_over_add(a in any::<u8>(), b in any::<u8>(), c in any::<u8>()) {
        prop_assert_eq!(
            gf256::mul(a, gf256::add(b, c)),
            gf256::add(gf256::mul(a, b), gf256::mul(a, c))
        );
    }

    #[test]
    fn identities(a in any::<u8>()) {
        prop_assert_eq!(gf256::mul(a, 1), a);
        prop_assert_eq!(gf256::mul(a, 0), 0);
        prop_assert_eq!(gf256::add(a, 0), a);
        prop_assert_eq!(gf256::add(a, a), 0);
        prop_assert_eq!(gf256::sub(a, a), 0);
    }
}

// ─── Division & Inverse ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn div_undoes_mul(a in any::<u8>(), b in nonzero()) {
        prop_assert_eq!(gf256::div(gf256::mul(a, b), b), Ok(a));
    }

    #[test]
    fn inverse_is_two_sided(a in nonzero()) {
        let inv = gf256::inv(a).unwrap();
        prop_assert_eq!(gf256::mul(a, inv), 1);
        prop_assert_eq!(gf256::mul(inv, a), 1);
        prop_assert_eq!(gf256::inv(inv), Ok(a));
    }

    #[test]
    fn div_by_zero_is_an_error(a in any::<u8>()) {
        prop_assert_eq!(gf256::div(a, 0), Err(GfError::DivisionByZero));
    }

    #[test]
    fn zero_divided_is_zero(b in nonzero()) {
        prop_assert_eq!(gf256::div(0, b), Ok(0));
    }
}

// ─── Slice Kernels ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn mul_add_slice_matches_scalar(
        dst in proptest::collection::vec(any::<u8>(), 0..64),
        src_seed in any::<u8>(),
        c in any::<u8>(),
    ) {
        let src: Vec<u8> = (0..dst.len()).map(|i| (i as u8).wrapping_mul(31) ^ src_seed).collect();
        let mut out = dst.clone();
        gf256::mul_add_slice(&mut out, &src, c);
        for i in 0..dst.len() {
            prop_assert_eq!(out[i], dst[i] ^ gf256::mul(src[i], c));
        }
    }

    #[test]
    fn mul_slice_then_inverse_restores(
        data in proptest::collection::vec(any::<u8>(), 0..64),
        c in nonzero(),
    ) {
        let mut out = data.clone();
        gf256::mul_slice(&mut out, c);
        gf256::mul_slice(&mut out, gf256::inv(c).unwrap());
        prop_assert_eq!(out, data);
    }
}
