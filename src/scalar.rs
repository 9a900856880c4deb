//! Scalar traits binding Rust types to the table ABI's `DataType` slots
//!
//! `Scalar` is the bound every generic facade carries; it connects a Rust
//! type to the table slot its erased entry lives in. `RealScalar` and
//! `ComplexScalar` narrow the bound for operations whose native entry
//! points only exist for one family (factorizations, transforms).

use crate::complex::{Complex32, Complex64};
use crate::types::DataType;
use bytemuck::Pod;
use num_traits::Float;
use std::fmt::Debug;
use std::ops::{Add, Mul, Neg, Sub};

/// Types that can flow through a function-table entry.
///
/// # Bounds
/// - `Pod` - safe reinterpretation of device bytes (bytemuck)
/// - arithmetic ops - needed by the reference kernels
pub trait Scalar:
    Copy
    + Send
    + Sync
    + Pod
    + Debug
    + PartialEq
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
{
    /// Table slot this type's entries live in
    const DTYPE: DataType;

    /// Additive identity
    fn zero() -> Self;

    /// Multiplicative identity
    fn one() -> Self;

    /// Complex conjugate; identity for real types
    fn conj(self) -> Self;

    /// |x| as f64, for pivot selection and test tolerances
    fn abs_val(self) -> f64;
}

/// Real scalars: the types LAPACK, RNG, and sparse entries exist for.
pub trait RealScalar: Scalar + Float + PartialOrd {}

/// Complex scalars: the types DFT entries exist for.
pub trait ComplexScalar: Scalar {
    /// Underlying real component type
    type Real: RealScalar;

    /// Construct from real and imaginary parts
    fn from_parts(re: Self::Real, im: Self::Real) -> Self;

    /// Unit complex number at the given angle (radians)
    fn unit_at(angle: f64) -> Self;

    /// Scale both parts by a real factor
    fn scale_by(self, s: f64) -> Self;
}

impl Scalar for f32 {
    const DTYPE: DataType = DataType::F32;

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn one() -> Self {
        1.0
    }

    #[inline]
    fn conj(self) -> Self {
        self
    }

    #[inline]
    fn abs_val(self) -> f64 {
        (self as f64).abs()
    }
}

impl Scalar for f64 {
    const DTYPE: DataType = DataType::F64;

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn one() -> Self {
        1.0
    }

    #[inline]
    fn conj(self) -> Self {
        self
    }

    #[inline]
    fn abs_val(self) -> f64 {
        self.abs()
    }
}

impl RealScalar for f32 {}
impl RealScalar for f64 {}

impl Scalar for Complex32 {
    const DTYPE: DataType = DataType::C32;

    #[inline]
    fn zero() -> Self {
        Complex32::ZERO
    }

    #[inline]
    fn one() -> Self {
        Complex32::ONE
    }

    #[inline]
    fn conj(self) -> Self {
        Complex32::conj(self)
    }

    #[inline]
    fn abs_val(self) -> f64 {
        self.magnitude() as f64
    }
}

impl Scalar for Complex64 {
    const DTYPE: DataType = DataType::C64;

    #[inline]
    fn zero() -> Self {
        Complex64::ZERO
    }

    #[inline]
    fn one() -> Self {
        Complex64::ONE
    }

    #[inline]
    fn conj(self) -> Self {
        Complex64::conj(self)
    }

    #[inline]
    fn abs_val(self) -> f64 {
        self.magnitude()
    }
}

impl ComplexScalar for Complex32 {
    type Real = f32;

    #[inline]
    fn from_parts(re: f32, im: f32) -> Self {
        Complex32::new(re, im)
    }

    #[inline]
    fn unit_at(angle: f64) -> Self {
        Complex32::cis(angle as f32)
    }

    #[inline]
    fn scale_by(self, s: f64) -> Self {
        self.scale(s as f32)
    }
}

impl ComplexScalar for Complex64 {
    type Real = f64;

    #[inline]
    fn from_parts(re: f64, im: f64) -> Self {
        Complex64::new(re, im)
    }

    #[inline]
    fn unit_at(angle: f64) -> Self {
        Complex64::cis(angle)
    }

    #[inline]
    fn scale_by(self, s: f64) -> Self {
        self.scale(s)
    }
}
