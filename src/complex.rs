//! Canonical complex-number type for the vector value model.
//!
//! Double-precision Cartesian representation. A complex element is NA iff
//! its real part carries the NA payload (see `value::is_na_real`); that
//! test lives with the other sentinel checks in `value`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    pub real: f64,
    pub imag: f64,
}

impl Complex {
    #[inline]
    pub fn new(real: f64, imag: f64) -> Self {
        Self { real, imag }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { real: 0.0, imag: 0.0 }
    }

    #[inline]
    pub fn from_real(real: f64) -> Self {
        Self::new(real, 0.0)
    }
}

impl fmt::Display for Complex {
    /// Formats like the source language prints complex scalars: `1+2i`,
    /// `3-4i`, with each part rendered as its shortest round-trippable
    /// decimal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.imag.is_sign_negative() && !self.imag.is_nan() {
            write!(f, "{}-{}i", fmt_part(self.real), fmt_part(-self.imag))
        } else {
            write!(f, "{}+{}i", fmt_part(self.real), fmt_part(self.imag))
        }
    }
}

fn fmt_part(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "Inf".to_string() } else { "-Inf".to_string() }
    } else {
        format!("{}", x)
    }
}
