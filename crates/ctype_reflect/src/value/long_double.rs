//! Access to the platform's C `long double` through `f64`.
//!
//! Rust has no `long double`. Values are converted on read and write,
//! rounding to the nearest `f64` when reading wider formats.

use ctype_ptr::{Ptr, PtrMut};

#[cfg(all(
    any(target_arch = "x86_64", target_arch = "x86"),
    not(target_env = "msvc"),
    not(target_os = "android"),
))]
mod repr {
    //! x87 80-bit extended precision, padded to 16 bytes (12 on 32-bit x86).

    pub const SIZE: usize = if cfg!(target_arch = "x86_64") { 16 } else { 12 };
    pub const ALIGN: usize = if cfg!(target_arch = "x86_64") { 16 } else { 4 };

    const BIAS: i32 = 16383;

    pub fn to_f64(bytes: [u8; SIZE]) -> f64 {
        let mut mantissa = [0u8; 8];
        mantissa.copy_from_slice(&bytes[..8]);
        let mantissa = u64::from_le_bytes(mantissa);
        let sign_exp = u16::from_le_bytes([bytes[8], bytes[9]]);
        let negative = sign_exp >> 15 != 0;
        let exp = i32::from(sign_exp & 0x7FFF);

        let magnitude = if exp == 0x7FFF {
            if mantissa << 1 == 0 {
                f64::INFINITY
            } else {
                f64::NAN
            }
        } else if mantissa == 0 {
            0.0
        } else {
            // Denormals share the exponent of the smallest normal.
            let exp = if exp == 0 { 1 } else { exp };
            super::scale(mantissa as f64, exp - BIAS - 63)
        };
        if negative { -magnitude } else { magnitude }
    }

    pub fn from_f64(value: f64) -> [u8; SIZE] {
        let bits = value.to_bits();
        let sign = ((bits >> 63) as u16) << 15;
        let exp = ((bits >> 52) & 0x7FF) as i32;
        let frac = bits & ((1 << 52) - 1);

        let (exp, mantissa): (u16, u64) = match (exp, frac) {
            (0, 0) => (0, 0),
            (0x7FF, 0) => (0x7FFF, 1 << 63),
            (0x7FF, frac) => (0x7FFF, (0b11 << 62) | (frac << 11)),
            (0, frac) => {
                let shift = frac.leading_zeros() as i32;
                ((-1011 - shift + BIAS) as u16, frac << shift)
            }
            (exp, frac) => ((exp - 1023 + BIAS) as u16, (1 << 63) | (frac << 11)),
        };

        let mut bytes = [0u8; SIZE];
        bytes[..8].copy_from_slice(&mantissa.to_le_bytes());
        bytes[8..10].copy_from_slice(&(sign | exp).to_le_bytes());
        bytes
    }
}

#[cfg(any(
    all(target_arch = "aarch64", not(target_vendor = "apple"), not(target_os = "windows")),
    all(target_arch = "x86_64", target_os = "android"),
    target_arch = "riscv64",
    target_arch = "loongarch64",
))]
mod repr {
    //! IEEE 754 binary128.

    pub const SIZE: usize = 16;
    pub const ALIGN: usize = 16;

    const BIAS: i32 = 16383;
    const FRAC_BITS: u32 = 112;

    pub fn to_f64(bytes: [u8; SIZE]) -> f64 {
        let bits = u128::from_ne_bytes(bytes);
        let negative = bits >> 127 != 0;
        let exp = ((bits >> FRAC_BITS) & 0x7FFF) as i32;
        let frac = bits & ((1 << FRAC_BITS) - 1);

        let magnitude = if exp == 0x7FFF {
            if frac == 0 { f64::INFINITY } else { f64::NAN }
        } else if exp == 0 {
            // Below the smallest f64 subnormal.
            0.0
        } else {
            let top = (frac >> (FRAC_BITS - 52)) as u64;
            let round = ((frac >> (FRAC_BITS - 53)) & 1) as u64;
            let mantissa = ((1u64 << 52) | top) + round;
            super::scale(mantissa as f64, exp - BIAS - 52)
        };
        if negative { -magnitude } else { magnitude }
    }

    pub fn from_f64(value: f64) -> [u8; SIZE] {
        let bits = value.to_bits();
        let sign = u128::from(bits >> 63) << 127;
        let exp = ((bits >> 52) & 0x7FF) as i32;
        let frac = bits & ((1 << 52) - 1);

        let (exp, frac): (u128, u64) = match (exp, frac) {
            (0, 0) => (0, 0),
            (0x7FF, frac) => (0x7FFF, frac),
            (0, frac) => {
                // Normalize so the leading one lands on the implicit bit.
                let shift = frac.leading_zeros() - 11;
                ((1 - 1023 - shift as i32 + BIAS) as u128, (frac << shift) & ((1 << 52) - 1))
            }
            (exp, frac) => ((exp - 1023 + BIAS) as u128, frac),
        };

        let bits = sign | (exp << FRAC_BITS) | (u128::from(frac) << (FRAC_BITS - 52));
        bits.to_ne_bytes()
    }
}

#[cfg(not(any(
    all(
        any(target_arch = "x86_64", target_arch = "x86"),
        not(target_env = "msvc"),
        not(target_os = "android"),
    ),
    all(target_arch = "aarch64", not(target_vendor = "apple"), not(target_os = "windows")),
    all(target_arch = "x86_64", target_os = "android"),
    target_arch = "riscv64",
    target_arch = "loongarch64",
)))]
mod repr {
    //! `long double` is `double`.

    pub const SIZE: usize = size_of::<f64>();
    pub const ALIGN: usize = align_of::<f64>();

    pub fn to_f64(bytes: [u8; SIZE]) -> f64 {
        f64::from_ne_bytes(bytes)
    }

    pub fn from_f64(value: f64) -> [u8; SIZE] {
        value.to_ne_bytes()
    }
}

/// Size of `long double` in bytes.
pub const SIZE: usize = repr::SIZE;

/// Alignment of `long double` in bytes.
pub const ALIGN: usize = repr::ALIGN;

/// Multiplies by `2^exp` without overflowing intermediate powers.
#[allow(dead_code, reason = "unused where long double is double")]
fn scale(mut value: f64, mut exp: i32) -> f64 {
    while exp > 1000 {
        value *= 2f64.powi(1000);
        exp -= 1000;
    }
    while exp < -1000 {
        value *= 2f64.powi(-1000);
        exp += 1000;
    }
    value * 2f64.powi(exp)
}

/// Reads a `long double` as the nearest `f64`.
///
/// # Safety
/// `ptr` must point to [`SIZE`] readable bytes.
#[inline]
pub unsafe fn read(ptr: Ptr<'_>) -> f64 {
    // SAFETY: The caller guarantees `SIZE` readable bytes; any bit pattern is valid.
    repr::to_f64(unsafe { ptr.read::<[u8; SIZE]>() })
}

/// Writes an `f64` as a `long double`.
///
/// # Safety
/// `ptr` must point to [`SIZE`] writable bytes.
#[inline]
pub unsafe fn write(mut ptr: PtrMut<'_>, value: f64) {
    // SAFETY: The caller guarantees `SIZE` writable bytes.
    unsafe { ptr.write(repr::from_f64(value)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: f64) -> f64 {
        let mut storage = [0u8; SIZE];
        unsafe {
            write(PtrMut::from_mut(&mut storage), value);
            read(Ptr::from_ref(&storage))
        }
    }

    #[test]
    fn values_survive() {
        for value in [0.0, 1.0, -1.5, 3.25, 1e300, -1e-300, 123456.789, f64::MIN_POSITIVE] {
            assert_eq!(round_trip(value), value);
        }
        assert_eq!(round_trip(5e-324), 5e-324);
    }

    #[test]
    fn special_values() {
        assert_eq!(round_trip(f64::INFINITY), f64::INFINITY);
        assert_eq!(round_trip(f64::NEG_INFINITY), f64::NEG_INFINITY);
        assert!(round_trip(f64::NAN).is_nan());
        assert!(round_trip(-0.0).is_sign_negative());
    }

    #[cfg(all(target_arch = "x86_64", target_os = "linux"))]
    #[test]
    fn x87_layout() {
        let bytes = repr::from_f64(1.0);
        assert_eq!(&bytes[..8], &(1u64 << 63).to_le_bytes());
        assert_eq!(&bytes[8..10], &0x3FFFu16.to_le_bytes());
        assert_eq!(SIZE, 16);
    }
}
