use core::fmt;
use core::marker::PhantomData;
use core::ptr::{self, NonNull};

// -----------------------------------------------------------------------------
// Shared surface

macro_rules! impl_erased {
    ($ptr:ident) => {
        impl From<$ptr<'_>> for NonNull<u8> {
            #[inline]
            fn from(ptr: $ptr<'_>) -> Self {
                ptr.0
            }
        }

        impl $ptr<'_> {
            /// Whether the address satisfies `align_of::<T>()`.
            #[inline]
            pub fn is_aligned<T>(&self) -> bool {
                self.0.cast::<T>().is_aligned()
            }

            /// The numeric address.
            #[inline]
            pub fn addr(&self) -> usize {
                self.0.as_ptr().addr()
            }

            /// Moves the pointer `bytes` forward, typically to a field offset.
            ///
            /// # Safety
            ///
            /// The result must stay inside the same allocation as `self`.
            #[inline]
            pub const unsafe fn byte_add(self, bytes: usize) -> Self {
                // SAFETY: The caller keeps the result in bounds, so it is non-null.
                Self(unsafe { self.0.add(bytes) }, PhantomData)
            }

            /// Loads a `T` from the address. Alignment is not required.
            ///
            /// # Safety
            ///
            /// `size_of::<T>()` bytes starting at the address must be
            /// initialized and form a valid `T`.
            #[inline]
            pub const unsafe fn read<T: Copy>(&self) -> T {
                // SAFETY: Upheld by the caller.
                unsafe { ptr::read_unaligned(self.0.as_ptr().cast::<T>()) }
            }
        }

        impl fmt::Pointer for $ptr<'_> {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Pointer::fmt(&self.0, f)
            }
        }

        impl fmt::Debug for $ptr<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($ptr)).field(&self.0).finish()
            }
        }
    };
}

// -----------------------------------------------------------------------------
// Ptr

/// A shared, untyped view of memory valid for `'a`.
///
/// What lives at the address is described at runtime, usually by a reflected
/// type, so field access is a byte offset followed by an unaligned
/// [`read`](Ptr::read).
///
/// The memory must not be mutated while the pointer is alive.
///
/// # Examples
///
/// ```
/// # use ctype_ptr::Ptr;
/// let pair = [3i32, 4i32];
/// let ptr = Ptr::from_ref(&pair);
///
/// let second = unsafe { ptr.byte_add(4).read::<i32>() };
/// assert_eq!(second, 4);
/// ```
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct Ptr<'a>(NonNull<u8>, PhantomData<&'a u8>);

impl_erased!(Ptr);

impl<'a> Ptr<'a> {
    /// Wraps a raw address.
    ///
    /// # Safety
    ///
    /// The memory behind `ptr` must stay valid and unmodified for `'a`.
    #[inline]
    pub const unsafe fn new(ptr: NonNull<u8>) -> Ptr<'a> {
        Ptr(ptr, PhantomData)
    }

    /// Borrows the memory of `val`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ctype_ptr::Ptr;
    /// let x = 8i32;
    /// let ptr = Ptr::from_ref(&x);
    /// assert!(ptr.is_aligned::<i32>());
    /// ```
    #[inline]
    pub const fn from_ref<T: ?Sized>(val: &'a T) -> Ptr<'a> {
        Ptr(NonNull::from_ref(val).cast(), PhantomData)
    }

    /// The raw address, without the lifetime.
    #[inline]
    pub const fn as_ptr(self) -> *const u8 {
        self.0.as_ptr()
    }

    /// Reinterprets the memory as a `&T` living for `'a`.
    ///
    /// Check [`is_aligned`](Self::is_aligned) first when the layout is not
    /// known to be natural.
    ///
    /// # Safety
    ///
    /// The address must be aligned for `T` and hold a valid `T`.
    #[inline]
    pub const unsafe fn as_ref<T>(self) -> &'a T {
        // SAFETY: Upheld by the caller.
        unsafe { self.0.cast::<T>().as_ref() }
    }
}

impl<'a, T: ?Sized> From<&'a T> for Ptr<'a> {
    #[inline]
    fn from(val: &'a T) -> Self {
        Self::from_ref(val)
    }
}

// -----------------------------------------------------------------------------
// PtrMut

/// An exclusive, untyped view of memory valid for `'a`.
///
/// Not `Copy`: to reach a field without giving up the pointer, take a
/// shorter-lived [`reborrow`](PtrMut::reborrow) and offset that.
///
/// # Examples
///
/// ```
/// # use ctype_ptr::PtrMut;
/// let mut pair = [0i32; 2];
/// let mut ptr = PtrMut::from_mut(&mut pair);
///
/// unsafe { ptr.reborrow().byte_add(4).write(7i32) };
/// assert_eq!(pair, [0, 7]);
/// ```
#[repr(transparent)]
pub struct PtrMut<'a>(NonNull<u8>, PhantomData<&'a mut u8>);

impl_erased!(PtrMut);

impl<'a> PtrMut<'a> {
    /// Wraps a raw address.
    ///
    /// # Safety
    ///
    /// The memory behind `ptr` must be writable and accessed through
    /// nothing else for `'a`.
    #[inline]
    pub const unsafe fn new(ptr: NonNull<u8>) -> PtrMut<'a> {
        PtrMut(ptr, PhantomData)
    }

    /// Borrows the memory of `val` exclusively.
    #[inline]
    pub const fn from_mut<T: ?Sized>(val: &'a mut T) -> PtrMut<'a> {
        PtrMut(NonNull::from_mut(val).cast(), PhantomData)
    }

    /// The raw address, without the lifetime.
    #[inline]
    pub const fn as_ptr(&self) -> *mut u8 {
        self.0.as_ptr()
    }

    /// Stores `value` at the address. Alignment is not required and the
    /// previous contents are not dropped.
    ///
    /// # Safety
    ///
    /// `size_of::<T>()` bytes starting at the address must be writable.
    #[inline]
    pub const unsafe fn write<T>(&mut self, value: T) {
        // SAFETY: Upheld by the caller.
        unsafe { ptr::write_unaligned(self.0.as_ptr().cast::<T>(), value) }
    }

    /// A shared view for as long as `self` is borrowed.
    #[inline]
    pub const fn borrow(&self) -> Ptr<'_> {
        Ptr(self.0, PhantomData)
    }

    /// An exclusive view for as long as `self` is mutably borrowed.
    #[inline]
    pub const fn reborrow(&mut self) -> PtrMut<'_> {
        PtrMut(self.0, PhantomData)
    }
}

impl<'a, T: ?Sized> From<&'a mut T> for PtrMut<'a> {
    #[inline]
    fn from(val: &'a mut T) -> Self {
        Self::from_mut(val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C)]
    struct Sample {
        tag: u8,
        value: u32,
    }

    #[test]
    fn read_at_offsets() {
        let sample = Sample { tag: 3, value: 0xDEAD };
        let ptr = Ptr::from_ref(&sample);

        unsafe {
            assert_eq!(ptr.read::<u8>(), 3);
            assert_eq!(ptr.byte_add(4).read::<u32>(), 0xDEAD);
        }
    }

    #[test]
    fn write_through_reborrow() {
        let mut sample = Sample { tag: 0, value: 0 };
        let mut ptr = PtrMut::from_mut(&mut sample);

        unsafe {
            ptr.reborrow().write(9u8);
            ptr.reborrow().byte_add(4).write(77u32);
            assert_eq!(ptr.borrow().byte_add(4).read::<u32>(), 77);
        }
        assert_eq!(sample.tag, 9);
        assert_eq!(sample.value, 77);
    }

    #[test]
    fn unaligned_access() {
        let mut bytes = [0u8; 9];
        let mut ptr = PtrMut::from_mut(&mut bytes);

        unsafe {
            ptr.reborrow().byte_add(1).write(u64::MAX - 1);
            assert_eq!(ptr.borrow().byte_add(1).read::<u64>(), u64::MAX - 1);
        }
        assert_eq!(bytes[0], 0);
    }
}
