use core::ffi::{c_int, c_long, c_longlong, c_short};
use core::fmt;

use crate::value::long_double;

/// The scalar leaves of the type model.
///
/// Each variant corresponds to a single encoding byte, see
/// [`Primitive::from_encoding`].
///
/// # Examples
///
/// ```
/// use ctype_reflect::info::Primitive;
///
/// let int = Primitive::from_encoding(b'i').unwrap();
/// assert_eq!(int, Primitive::Int);
/// assert_eq!(int.size(), size_of::<core::ffi::c_int>());
/// assert!(int.is_signed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// `signed char`, encoded as `c`.
    SChar,
    /// `unsigned char`, encoded as `C`.
    UChar,
    /// `short`, encoded as `s`.
    Short,
    /// `unsigned short`, encoded as `S`.
    UShort,
    /// `int`, encoded as `i`.
    Int,
    /// `unsigned int`, encoded as `I`.
    UInt,
    /// `long`, encoded as `l`.
    Long,
    /// `unsigned long`, encoded as `L`.
    ULong,
    /// `long long`, encoded as `q`.
    LongLong,
    /// `unsigned long long`, encoded as `Q`.
    ULongLong,
    /// `float`, encoded as `f`.
    Float,
    /// `double`, encoded as `d`.
    Double,
    /// `long double`, encoded as `D`.
    LongDouble,
    /// Null-terminated `char *`, encoded as `*`.
    CString,
    /// An opaque pointer whose pointee is unknown, encoded as `^?`.
    ///
    /// Emitted as its hexadecimal address.
    OpaquePointer,
    /// `_Bool`, encoded as `B`.
    Bool,
    /// `void`, encoded as `v`. Only valid as a pointee.
    Void,
}

impl Primitive {
    /// All primitives, in encoding-table order.
    pub const ALL: [Primitive; 17] = [
        Self::SChar,
        Self::UChar,
        Self::Short,
        Self::UShort,
        Self::Int,
        Self::UInt,
        Self::Long,
        Self::ULong,
        Self::LongLong,
        Self::ULongLong,
        Self::Float,
        Self::Double,
        Self::LongDouble,
        Self::CString,
        Self::OpaquePointer,
        Self::Bool,
        Self::Void,
    ];

    /// Maps a single encoding byte to a primitive.
    ///
    /// `^` is not accepted here: on its own it introduces a pointer type.
    pub const fn from_encoding(byte: u8) -> Option<Self> {
        Some(match byte {
            b'c' => Self::SChar,
            b'C' => Self::UChar,
            b's' => Self::Short,
            b'S' => Self::UShort,
            b'i' => Self::Int,
            b'I' => Self::UInt,
            b'l' => Self::Long,
            b'L' => Self::ULong,
            b'q' => Self::LongLong,
            b'Q' => Self::ULongLong,
            b'f' => Self::Float,
            b'd' => Self::Double,
            b'D' => Self::LongDouble,
            b'*' => Self::CString,
            b'B' => Self::Bool,
            b'v' => Self::Void,
            _ => return None,
        })
    }

    /// The encoding byte of this primitive, which also seeds its hash.
    pub const fn encoding(self) -> u8 {
        match self {
            Self::SChar => b'c',
            Self::UChar => b'C',
            Self::Short => b's',
            Self::UShort => b'S',
            Self::Int => b'i',
            Self::UInt => b'I',
            Self::Long => b'l',
            Self::ULong => b'L',
            Self::LongLong => b'q',
            Self::ULongLong => b'Q',
            Self::Float => b'f',
            Self::Double => b'd',
            Self::LongDouble => b'D',
            Self::CString => b'*',
            Self::OpaquePointer => b'^',
            Self::Bool => b'B',
            Self::Void => b'v',
        }
    }

    /// Size in bytes on the current target.
    pub const fn size(self) -> usize {
        match self {
            Self::SChar | Self::UChar | Self::Bool => 1,
            Self::Short | Self::UShort => size_of::<c_short>(),
            Self::Int | Self::UInt => size_of::<c_int>(),
            Self::Long | Self::ULong => size_of::<c_long>(),
            Self::LongLong | Self::ULongLong => size_of::<c_longlong>(),
            Self::Float => size_of::<f32>(),
            Self::Double => size_of::<f64>(),
            Self::LongDouble => long_double::SIZE,
            Self::CString | Self::OpaquePointer => size_of::<*const u8>(),
            Self::Void => 0,
        }
    }

    /// Natural alignment on the current target.
    pub const fn align(self) -> usize {
        match self {
            Self::SChar | Self::UChar | Self::Bool | Self::Void => 1,
            Self::Short | Self::UShort => align_of::<c_short>(),
            Self::Int | Self::UInt => align_of::<c_int>(),
            Self::Long | Self::ULong => align_of::<c_long>(),
            Self::LongLong | Self::ULongLong => align_of::<c_longlong>(),
            Self::Float => align_of::<f32>(),
            Self::Double => align_of::<f64>(),
            Self::LongDouble => long_double::ALIGN,
            Self::CString | Self::OpaquePointer => align_of::<*const u8>(),
        }
    }

    /// Returns `true` for the ten C integer types.
    ///
    /// `_Bool` is not counted as an integer.
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::SChar
                | Self::UChar
                | Self::Short
                | Self::UShort
                | Self::Int
                | Self::UInt
                | Self::Long
                | Self::ULong
                | Self::LongLong
                | Self::ULongLong
        )
    }

    /// Returns `true` for signed integer types.
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Self::SChar | Self::Short | Self::Int | Self::Long | Self::LongLong
        )
    }

    /// Returns `true` for `float`, `double` and `long double`.
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float | Self::Double | Self::LongDouble)
    }

    /// The C spelling used in diagnostics.
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::SChar => "signed char",
            Self::UChar => "unsigned char",
            Self::Short => "signed short",
            Self::UShort => "unsigned short",
            Self::Int => "signed int",
            Self::UInt => "unsigned int",
            Self::Long => "signed long",
            Self::ULong => "unsigned long",
            Self::LongLong => "signed long long",
            Self::ULongLong => "unsigned long long",
            Self::Float => "float",
            Self::Double => "double",
            Self::LongDouble => "long double",
            Self::CString => "char *",
            Self::OpaquePointer => "void *",
            Self::Bool => "_Bool",
            Self::Void => "void",
        }
    }
}

impl fmt::Display for Primitive {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_bytes_round_trip() {
        for p in Primitive::ALL {
            if p == Primitive::OpaquePointer {
                assert_eq!(Primitive::from_encoding(b'^'), None);
                continue;
            }
            assert_eq!(Primitive::from_encoding(p.encoding()), Some(p));
        }
        assert_eq!(Primitive::from_encoding(b'x'), None);
    }

    #[test]
    fn sizes_follow_c_types() {
        assert_eq!(Primitive::SChar.size(), 1);
        assert_eq!(Primitive::Bool.size(), 1);
        assert_eq!(Primitive::Int.size(), size_of::<c_int>());
        assert_eq!(Primitive::Long.align(), align_of::<c_long>());
        assert_eq!(Primitive::CString.size(), size_of::<usize>());
        assert_eq!(Primitive::Void.size(), 0);
    }

    #[test]
    fn classification() {
        assert!(Primitive::ULongLong.is_integer());
        assert!(!Primitive::ULongLong.is_signed());
        assert!(!Primitive::Bool.is_integer());
        assert!(Primitive::LongDouble.is_float());
        assert_eq!(Primitive::Int.to_string(), "signed int");
    }
}
