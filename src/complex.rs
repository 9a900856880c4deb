//! Complex scalar types for the complex table entries
//!
//! Storage is interleaved (re, im), matching the layout every vendor FFT
//! and BLAS library expects, so device buffers can be reinterpreted
//! without conversion.

use bytemuck::{Pod, Zeroable};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Implements a complex type over one float width.
macro_rules! impl_complex {
    ($name:ident, $float:ty, $doc_bits:literal) => {
        #[doc = concat!($doc_bits, "-bit complex number, interleaved (re, im) storage")]
        #[repr(C)]
        #[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
        pub struct $name {
            /// Real part
            pub re: $float,
            /// Imaginary part
            pub im: $float,
        }

        impl $name {
            /// Zero complex number
            pub const ZERO: Self = Self { re: 0.0, im: 0.0 };

            /// One (real unit)
            pub const ONE: Self = Self { re: 1.0, im: 0.0 };

            /// Create a new complex number
            #[inline]
            pub const fn new(re: $float, im: $float) -> Self {
                Self { re, im }
            }

            /// Complex conjugate
            #[inline]
            pub fn conj(self) -> Self {
                Self {
                    re: self.re,
                    im: -self.im,
                }
            }

            /// Magnitude |z|
            #[inline]
            pub fn magnitude(self) -> $float {
                (self.re * self.re + self.im * self.im).sqrt()
            }

            /// Unit complex number at the given angle (radians)
            #[inline]
            pub fn cis(angle: $float) -> Self {
                Self {
                    re: angle.cos(),
                    im: angle.sin(),
                }
            }

            /// Scale both parts by a real factor
            #[inline]
            pub fn scale(self, s: $float) -> Self {
                Self {
                    re: self.re * s,
                    im: self.im * s,
                }
            }
        }

        impl Add for $name {
            type Output = Self;
            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self {
                    re: self.re + rhs.re,
                    im: self.im + rhs.im,
                }
            }
        }

        impl Sub for $name {
            type Output = Self;
            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self {
                    re: self.re - rhs.re,
                    im: self.im - rhs.im,
                }
            }
        }

        impl Mul for $name {
            type Output = Self;
            #[inline]
            fn mul(self, rhs: Self) -> Self {
                Self {
                    re: self.re * rhs.re - self.im * rhs.im,
                    im: self.re * rhs.im + self.im * rhs.re,
                }
            }
        }

        impl Neg for $name {
            type Output = Self;
            #[inline]
            fn neg(self) -> Self {
                Self {
                    re: -self.re,
                    im: -self.im,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.im < 0.0 {
                    write!(f, "{}{}i", self.re, self.im)
                } else {
                    write!(f, "{}+{}i", self.re, self.im)
                }
            }
        }
    };
}

impl_complex!(Complex32, f32, "64");
impl_complex!(Complex64, f64, "128");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_and_conj() {
        let z = Complex64::new(3.0, 4.0);
        let w = Complex64::new(1.0, -2.0);
        let p = z * w;
        assert_eq!(p, Complex64::new(11.0, -2.0));
        assert_eq!(z.conj(), Complex64::new(3.0, -4.0));
        assert_eq!(z.magnitude(), 5.0);
    }

    #[test]
    fn test_cis_unit_circle() {
        let q = Complex64::cis(std::f64::consts::FRAC_PI_2);
        assert!(q.re.abs() < 1e-15);
        assert!((q.im - 1.0).abs() < 1e-15);
    }
}
