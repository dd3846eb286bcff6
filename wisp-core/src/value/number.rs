//! Arbitrary-precision numeric backing for the `BigInt` and `Rational`
//! value variants (spec §3.1).
//!
//! Grounded on `examples/Downchuck-mm0/mm0-rs/components/mmcc/Cargo.toml`,
//! the only other crate in the example pack implementing a language
//! runtime that needs arbitrary precision arithmetic: it depends on
//! `num = "0.4"`. We reuse the same umbrella crate rather than hand-roll
//! bignum arithmetic.

pub use num::bigint::BigInt;
pub use num::rational::BigRational as Rational;
use num::{One, Zero};

pub fn bigint_zero() -> BigInt {
	BigInt::zero()
}

pub fn rational_zero() -> Rational {
	Rational::zero()
}

pub fn rational_one() -> Rational {
	Rational::one()
}
