use alloc::string::String;
use core::fmt::Write;

use crate::encoding::ParseError;
use crate::info::Type;

/// Rust types with a known type encoding.
///
/// Mirrors what a C compiler's `@encode` produces for the equivalent C type,
/// so that values described by parsed encodings can be checked against Rust
/// types by hash (see [`Value::cast`](crate::value::Value::cast)).
///
/// Implement it for `#[repr(C)]` structs by writing their encoding:
///
/// ```
/// use ctype_reflect::info::Encode;
///
/// #[repr(C)]
/// struct Point { x: i32, y: f32 }
///
/// impl Encode for Point {
///     fn encode(out: &mut String) {
///         out.push_str("{Point=i{$x$1=}f{$y$2=}}");
///     }
/// }
///
/// assert_eq!(<[i32; 3]>::encoding(), "[3i]");
/// assert_eq!(<*const Point>::reflect().unwrap().hash(),
///            ctype_reflect::info::Type::from_encoding("^{Point=if}").unwrap().hash());
/// ```
pub trait Encode {
    /// Appends the encoding of `Self` to `out`.
    fn encode(out: &mut String);

    /// The encoding of `Self` as a fresh string.
    fn encoding() -> String {
        let mut out = String::new();
        Self::encode(&mut out);
        out
    }

    /// Parses the encoding of `Self`.
    fn reflect() -> Result<Type, ParseError> {
        Type::from_encoding(&Self::encoding())
    }
}

macro_rules! impl_encode_primitive {
    ($($ty:ty => $byte:literal),* $(,)?) => {
        $(
            impl Encode for $ty {
                #[inline]
                fn encode(out: &mut String) {
                    out.push($byte);
                }
            }
        )*
    };
}

impl_encode_primitive! {
    i8 => 'c',
    u8 => 'C',
    i16 => 's',
    u16 => 'S',
    i32 => 'i',
    u32 => 'I',
    isize => 'l',
    usize => 'L',
    i64 => 'q',
    u64 => 'Q',
    f32 => 'f',
    f64 => 'd',
    bool => 'B',
    () => 'v',
}

impl<T: Encode> Encode for *const T {
    fn encode(out: &mut String) {
        out.push('^');
        T::encode(out);
    }
}

impl<T: Encode> Encode for *mut T {
    fn encode(out: &mut String) {
        out.push('^');
        T::encode(out);
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode(out: &mut String) {
        // Writing to a `String` cannot fail.
        let _ = write!(out, "[{N}");
        T::encode(out);
        out.push(']');
    }
}
