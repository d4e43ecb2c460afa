//! Typed loads and stores of primitive slots.
//!
//! Integers travel as `i128`, wide enough for every C integer of either
//! signedness, so range checks and comparisons need no per-type code.

use core::ffi::{CStr, c_char, c_int, c_long, c_longlong, c_schar, c_short, c_uchar};
use core::ffi::{c_uint, c_ulong, c_ulonglong, c_ushort};
use core::ptr;

use ctype_ptr::{Ptr, PtrMut};

use crate::info::Primitive;
use crate::value::long_double;

/// The value does not fit the destination primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RangeError;

/// Reads an integer or `_Bool` slot.
///
/// # Safety
/// `ptr` must point to a readable slot of type `primitive`.
pub(crate) unsafe fn read_integer(ptr: Ptr<'_>, primitive: Primitive) -> Option<i128> {
    // SAFETY: Guaranteed by the caller.
    unsafe {
        Some(match primitive {
            Primitive::SChar => i128::from(ptr.read::<c_schar>()),
            Primitive::UChar => i128::from(ptr.read::<c_uchar>()),
            Primitive::Short => i128::from(ptr.read::<c_short>()),
            Primitive::UShort => i128::from(ptr.read::<c_ushort>()),
            Primitive::Int => i128::from(ptr.read::<c_int>()),
            Primitive::UInt => i128::from(ptr.read::<c_uint>()),
            Primitive::Long => i128::from(ptr.read::<c_long>()),
            Primitive::ULong => i128::from(ptr.read::<c_ulong>()),
            Primitive::LongLong => i128::from(ptr.read::<c_longlong>()),
            Primitive::ULongLong => i128::from(ptr.read::<c_ulonglong>()),
            // Any non-zero byte is true.
            Primitive::Bool => i128::from(ptr.read::<u8>() != 0),
            _ => return None,
        })
    }
}

macro_rules! store_checked {
    ($ptr:ident, $value:ident, $ty:ty) => {{
        let value = <$ty>::try_from($value).map_err(|_| RangeError)?;
        // SAFETY: Guaranteed by the caller of `write_integer`.
        unsafe { $ptr.write(value) };
        Ok(())
    }};
}

/// Writes an integer or `_Bool` slot, rejecting values outside its range.
///
/// Nothing is written when the value does not fit.
///
/// # Safety
/// `ptr` must point to a writable slot of type `primitive`.
pub(crate) unsafe fn write_integer(
    mut ptr: PtrMut<'_>,
    primitive: Primitive,
    value: i128,
) -> Result<(), RangeError> {
    match primitive {
        Primitive::SChar => store_checked!(ptr, value, c_schar),
        Primitive::UChar => store_checked!(ptr, value, c_uchar),
        Primitive::Short => store_checked!(ptr, value, c_short),
        Primitive::UShort => store_checked!(ptr, value, c_ushort),
        Primitive::Int => store_checked!(ptr, value, c_int),
        Primitive::UInt => store_checked!(ptr, value, c_uint),
        Primitive::Long => store_checked!(ptr, value, c_long),
        Primitive::ULong => store_checked!(ptr, value, c_ulong),
        Primitive::LongLong => store_checked!(ptr, value, c_longlong),
        Primitive::ULongLong => store_checked!(ptr, value, c_ulonglong),
        Primitive::Bool => match value {
            // SAFETY: Guaranteed by the caller.
            0 | 1 => unsafe {
                ptr.write(value == 1);
                Ok(())
            },
            _ => Err(RangeError),
        },
        _ => Err(RangeError),
    }
}

/// Reads a floating-point slot.
///
/// # Safety
/// `ptr` must point to a readable slot of type `primitive`.
pub(crate) unsafe fn read_float(ptr: Ptr<'_>, primitive: Primitive) -> Option<f64> {
    // SAFETY: Guaranteed by the caller.
    unsafe {
        match primitive {
            Primitive::Float => Some(f64::from(ptr.read::<f32>())),
            Primitive::Double => Some(ptr.read::<f64>()),
            Primitive::LongDouble => Some(long_double::read(ptr)),
            _ => None,
        }
    }
}

/// Writes a floating-point slot. `float` receives the nearest `f32`.
///
/// # Safety
/// `ptr` must point to a writable slot of type `primitive`.
pub(crate) unsafe fn write_float(mut ptr: PtrMut<'_>, primitive: Primitive, value: f64) {
    // SAFETY: Guaranteed by the caller.
    unsafe {
        match primitive {
            Primitive::Float => ptr.write(value as f32),
            Primitive::Double => ptr.write(value),
            Primitive::LongDouble => long_double::write(ptr, value),
            _ => {}
        }
    }
}

/// Reads a pointer-sized slot.
///
/// # Safety
/// `ptr` must point to a readable pointer slot.
#[inline]
pub(crate) unsafe fn read_pointer(ptr: Ptr<'_>) -> *mut u8 {
    // SAFETY: Guaranteed by the caller.
    unsafe { ptr.read::<*mut u8>() }
}

/// Writes a pointer-sized slot.
///
/// # Safety
/// `ptr` must point to a writable pointer slot.
#[inline]
pub(crate) unsafe fn write_pointer(mut ptr: PtrMut<'_>, value: *mut u8) {
    // SAFETY: Guaranteed by the caller.
    unsafe { ptr.write(value) }
}

/// Reads a `char *` slot as a C string. `None` for null.
///
/// # Safety
/// `ptr` must point to a readable `char *` slot holding null or a pointer to
/// a NUL-terminated string that lives for `'a`.
pub(crate) unsafe fn read_c_str<'a>(ptr: Ptr<'a>) -> Option<&'a CStr> {
    // SAFETY: Guaranteed by the caller.
    unsafe {
        let raw = ptr.read::<*const c_char>();
        if raw.is_null() {
            None
        } else {
            Some(CStr::from_ptr(raw))
        }
    }
}

/// Borrows `len` bytes behind a `char *` slot. `None` for null.
///
/// # Safety
/// `ptr` must point to a readable `char *` slot holding null or a pointer to
/// at least `len` readable bytes that live for `'a`.
pub(crate) unsafe fn read_sized_bytes<'a>(ptr: Ptr<'a>, len: usize) -> Option<&'a [u8]> {
    // SAFETY: Guaranteed by the caller.
    unsafe {
        let raw = ptr.read::<*const u8>();
        if raw.is_null() {
            None
        } else if len == 0 {
            Some(&[])
        } else {
            Some(&*ptr::slice_from_raw_parts(raw, len))
        }
    }
}
