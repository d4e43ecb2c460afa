use ctype_ptr::{Ptr, PtrMut};
use thiserror::Error;

use crate::info::{Encode, Type};

// -----------------------------------------------------------------------------
// AccessError

/// Failure of [`Value::access`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccessError {
    #[error("no field named `{0}`")]
    NoField(Box<str>),
    #[error("field `{name}` has type hash {found:#x}, expected {expected:#x}")]
    HashMismatch {
        name: Box<str>,
        expected: u64,
        found: u64,
    },
    #[error("field `{0}` is not aligned for the requested type")]
    Misaligned(Box<str>),
    #[error("the requested type has no valid encoding")]
    InvalidEncoding,
}

// -----------------------------------------------------------------------------
// Value

/// A reflected view of caller-owned memory: a [`Type`] and a pointer to
/// memory laid out as that type.
///
/// `Value` never owns the memory. It is `Copy`, like the shared reference it
/// stands in for.
///
/// # Examples
///
/// ```
/// use ctype_reflect::info::Type;
/// use ctype_reflect::value::Value;
///
/// #[repr(C)]
/// struct Point { x: i32, y: f32 }
///
/// let ty = Type::from_encoding("{ViewPoint=i{$x$1=}f{$y$2=}}").unwrap();
/// let point = Point { x: 3, y: 0.5 };
/// let value = unsafe { Value::from_ref(&ty, &point) };
///
/// assert_eq!(value.access::<f32>("y"), Ok(&0.5));
/// assert!(value.get_value("z").is_none());
/// ```
#[derive(Clone, Copy)]
pub struct Value<'a> {
    ty: &'a Type,
    data: Ptr<'a>,
}

impl<'a> Value<'a> {
    /// Pairs a type with memory.
    ///
    /// # Safety
    ///
    /// `data` must point to initialized memory laid out as `ty` for `'a`.
    /// Pointers inside it must be null or point to memory of their pointee
    /// type that also lives for `'a`, and `char *` slots must hold null or a
    /// NUL-terminated string.
    #[inline]
    pub const unsafe fn new(ty: &'a Type, data: Ptr<'a>) -> Self {
        Self { ty, data }
    }

    /// Pairs a type with a Rust value that has the same layout.
    ///
    /// # Safety
    ///
    /// Same as [`Value::new`]; `T` must be a `#[repr(C)]` mirror of `ty`.
    #[inline]
    pub unsafe fn from_ref<T>(ty: &'a Type, value: &'a T) -> Self {
        debug_assert_eq!(size_of::<T>(), ty.size(), "layout of `{}`", ty.type_name());
        Self {
            ty,
            data: Ptr::from_ref(value),
        }
    }

    #[inline]
    pub fn ty(&self) -> &'a Type {
        self.ty
    }

    #[inline]
    pub fn data(&self) -> Ptr<'a> {
        self.data
    }

    /// The value of a named struct field or union arm.
    ///
    /// Returns `None` when there is no such field or `self` is not a
    /// composite. Anonymous fields are never returned.
    pub fn get_value(&self, name: &str) -> Option<Value<'a>> {
        let field = self.ty.field(name)?;
        Some(Value {
            ty: field.ty(),
            // SAFETY: Field offsets lie within the composite.
            data: unsafe { self.data.byte_add(field.offset()) },
        })
    }

    /// The raw pointer, if `ty` has the same hash as this value's type.
    #[inline]
    pub fn cast_to(&self, ty: &Type) -> Option<Ptr<'a>> {
        (ty.hash() == self.ty.hash()).then_some(self.data)
    }

    /// Borrows the memory as `T` when `T`'s encoding hashes the same as
    /// this value's type.
    pub fn cast<T: Encode>(&self) -> Option<&'a T> {
        let ty = T::reflect().ok()?;
        let data = self.cast_to(&ty)?;
        if !data.is_aligned::<T>() {
            return None;
        }
        // SAFETY: Hashes match, so the memory is laid out as `T`; alignment checked.
        Some(unsafe { data.as_ref::<T>() })
    }

    /// Looks up a field and borrows it as `T`, checking the type hash.
    pub fn access<T: Encode>(&self, name: &str) -> Result<&'a T, AccessError> {
        let field = self
            .get_value(name)
            .ok_or_else(|| AccessError::NoField(name.into()))?;
        let expected = T::reflect().map_err(|_| AccessError::InvalidEncoding)?;
        if expected.hash() != field.ty.hash() {
            return Err(AccessError::HashMismatch {
                name: name.into(),
                expected: expected.hash(),
                found: field.ty.hash(),
            });
        }
        if !field.data.is_aligned::<T>() {
            return Err(AccessError::Misaligned(name.into()));
        }
        // SAFETY: Hashes match and alignment checked.
        Ok(unsafe { field.data.as_ref::<T>() })
    }
}

impl core::fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Value")
            .field("ty", &self.ty.type_name())
            .field("data", &self.data)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ValueMut

/// The mutable counterpart of [`Value`], used as the target of JSON ingest.
pub struct ValueMut<'a> {
    ty: &'a Type,
    data: PtrMut<'a>,
}

impl<'a> ValueMut<'a> {
    /// Pairs a type with writable memory.
    ///
    /// # Safety
    ///
    /// `data` must point to writable memory of at least `ty.size()` bytes,
    /// laid out as `ty`, and exclusively borrowed for `'a`. Pointer slots
    /// must be null or valid as described on [`Value::new`].
    #[inline]
    pub const unsafe fn new(ty: &'a Type, data: PtrMut<'a>) -> Self {
        Self { ty, data }
    }

    /// Pairs a type with a Rust value that has the same layout.
    ///
    /// # Safety
    ///
    /// Same as [`ValueMut::new`]; `T` must be a `#[repr(C)]` mirror of `ty`.
    /// Pointers written by an ingest become owned by `value`'s owner, see
    /// [`release_value`](crate::value::release_value).
    #[inline]
    pub unsafe fn from_mut<T>(ty: &'a Type, value: &'a mut T) -> Self {
        debug_assert_eq!(size_of::<T>(), ty.size(), "layout of `{}`", ty.type_name());
        Self {
            ty,
            data: PtrMut::from_mut(value),
        }
    }

    #[inline]
    pub fn ty(&self) -> &'a Type {
        self.ty
    }

    /// A shared view with a shorter lifetime.
    #[inline]
    pub fn as_value(&self) -> Value<'_> {
        Value {
            ty: self.ty,
            data: self.data.borrow(),
        }
    }

    /// Reborrows with a shorter lifetime.
    #[inline]
    pub fn reborrow(&mut self) -> ValueMut<'_> {
        ValueMut {
            ty: self.ty,
            data: self.data.reborrow(),
        }
    }

    /// The mutable value of a named struct field or union arm.
    pub fn get_value_mut(&mut self, name: &str) -> Option<ValueMut<'_>> {
        let field = self.ty.field(name)?;
        Some(ValueMut {
            ty: field.ty(),
            // SAFETY: Field offsets lie within the composite.
            data: unsafe { self.data.reborrow().byte_add(field.offset()) },
        })
    }

    #[inline]
    pub(crate) fn into_parts(self) -> (&'a Type, PtrMut<'a>) {
        (self.ty, self.data)
    }
}

impl core::fmt::Debug for ValueMut<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ValueMut")
            .field("ty", &self.ty.type_name())
            .field("data", &self.data)
            .finish()
    }
}
