use core::ptr;

use ctype_ptr::PtrMut;

use crate::info::{CompositeInfo, Primitive, Type, TypeKind};
use crate::registry::TypeCache;
use crate::value::ValueMut;
use crate::value::scalar::{read_integer, read_pointer, write_pointer};
use crate::value::tag::select_arm;

/// Frees every heap block reachable from `value` that a JSON ingest could
/// have allocated, and nulls the slots that held them.
///
/// Strings, pointees and sized arrays are released depth-first. Tagged
/// unions are followed through their active arm; untagged unions are left
/// alone since their active arm is unknown.
///
/// # Safety
///
/// Every non-null `char *` and pointer reachable from `value` must have been
/// allocated with the C allocator (as the ingester does) and must not be
/// referenced elsewhere. Sized fields must agree with their length fields.
///
/// # Examples
///
/// ```
/// use core::ffi::c_char;
/// use ctype_reflect::info::Type;
/// use ctype_reflect::serde::json_to_value;
/// use ctype_reflect::value::{ValueMut, release_value};
///
/// #[repr(C)]
/// struct Named { name: *const c_char }
///
/// let ty = Type::from_encoding("{ReleaseNamed=*{$name$1=}}").unwrap();
/// let mut named = Named { name: core::ptr::null() };
///
/// json_to_value(br#"{"name": "heap"}"#, unsafe { ValueMut::from_mut(&ty, &mut named) }).unwrap();
/// assert!(!named.name.is_null());
///
/// unsafe { release_value(ValueMut::from_mut(&ty, &mut named)) };
/// assert!(named.name.is_null());
/// ```
pub unsafe fn release_value(value: ValueMut<'_>) {
    // SAFETY: Forwarded from the caller.
    unsafe { release_value_with(value, TypeCache::global()) }
}

/// Like [`release_value`], resolving forward references through `cache`.
///
/// Use the cache the value was ingested with.
///
/// # Safety
///
/// Same as [`release_value`].
pub unsafe fn release_value_with(value: ValueMut<'_>, cache: &TypeCache) {
    let (ty, data) = value.into_parts();
    // SAFETY: Forwarded from the caller.
    unsafe { release(ty, data, cache) }
}

unsafe fn release(ty: &Type, mut data: PtrMut<'_>, cache: &TypeCache) {
    let ty = cache.resolve_forward(ty);
    match ty.kind() {
        TypeKind::Primitive(Primitive::CString) => {
            // SAFETY: A `char *` slot holding null or a C heap block.
            unsafe { free_slot(data) }
        }
        TypeKind::Pointer(pointee) => {
            // SAFETY: A pointer slot.
            let block = unsafe { read_pointer(data.borrow()) };
            if block.is_null() {
                return;
            }
            if let Some(pointee_data) = walkable(pointee, block, cache) {
                // SAFETY: The block holds one pointee.
                unsafe { release(pointee, pointee_data, cache) }
            }
            // SAFETY: A C heap block owned by this slot.
            unsafe { free_slot(data) }
        }
        TypeKind::Array(array) => {
            let stride = array.item().size();
            for i in 0..array.len() {
                // SAFETY: Elements lie within the array.
                unsafe { release(array.item(), data.reborrow().byte_add(i * stride), cache) }
            }
        }
        TypeKind::Struct(info) => {
            // SAFETY: Forwarded from the caller.
            unsafe { release_struct(info, data, cache) }
        }
        TypeKind::Union(_) | TypeKind::Primitive(_) => {}
    }
}

/// Tagged unions go first, while the tags selecting their arms are intact.
unsafe fn release_struct(info: &CompositeInfo, mut data: PtrMut<'_>, cache: &TypeCache) {
    for field in info.iter() {
        let Some(tag_field) = field.tagged_by() else {
            continue;
        };
        let arms = cache.resolve_forward(field.ty());
        let Some(arms) = arms.as_union() else {
            continue;
        };
        // SAFETY: The struct is initialized.
        if let Ok(index) = unsafe { select_arm(info, tag_field, arms, data.borrow()) } {
            let arm = &arms.fields()[index];
            // SAFETY: Arms lie within the union, which lies within the struct.
            let slot = unsafe { data.reborrow().byte_add(field.offset() + arm.offset()) };
            // SAFETY: Forwarded from the caller.
            unsafe { release(arm.ty(), slot, cache) };
        }
    }

    for field in info.iter().filter(|f| f.tagged_by().is_none()) {
        if let (Some(length_field), Some(item)) = (field.length_field(), field.ty().as_pointee()) {
            let len = info
                .field(length_field)
                .and_then(|f| {
                    let primitive = f.ty().as_primitive()?;
                    // SAFETY: An integer slot of the struct.
                    unsafe { read_integer(data.borrow().byte_add(f.offset()), primitive) }
                })
                .and_then(|len| usize::try_from(len).ok())
                .unwrap_or(0);
            // SAFETY: Field offsets lie within the struct.
            let slot = unsafe { data.reborrow().byte_add(field.offset()) };
            // SAFETY: A sized array of `len` elements.
            unsafe { release_sized(item, len, slot, cache) };
        } else {
            // SAFETY: Field offsets lie within the struct.
            let slot = unsafe { data.reborrow().byte_add(field.offset()) };
            // SAFETY: Forwarded from the caller.
            unsafe { release(field.ty(), slot, cache) };
        }
    }
}

unsafe fn release_sized(item: &Type, len: usize, mut slot: PtrMut<'_>, cache: &TypeCache) {
    // SAFETY: A pointer slot.
    let block = unsafe { read_pointer(slot.borrow()) };
    if block.is_null() {
        return;
    }
    let item = cache.resolve_forward(item);
    let stride = item.size();
    if stride > 0 {
        for i in 0..len {
            // SAFETY: The block holds `len` elements.
            let element = unsafe { PtrMut::new(ptr::NonNull::new_unchecked(block).add(i * stride)) };
            // SAFETY: Forwarded from the caller.
            unsafe { release(&item, element, cache) };
        }
    }
    // SAFETY: A C heap block owned by this slot.
    unsafe { free_slot(slot.reborrow()) }
}

/// The pointee memory, unless the pointee cannot hold heap pointers.
fn walkable<'b>(pointee: &Type, block: *mut u8, cache: &TypeCache) -> Option<PtrMut<'b>> {
    let pointee = cache.resolve_forward(pointee);
    if pointee.size() == 0 {
        return None;
    }
    // SAFETY: `block` is a non-null heap block holding one pointee.
    ptr::NonNull::new(block).map(|block| unsafe { PtrMut::new(block) })
}

/// Frees the block held by a pointer slot and nulls the slot.
unsafe fn free_slot(mut slot: PtrMut<'_>) {
    // SAFETY: A pointer slot holding null or a C heap block.
    unsafe {
        let block = read_pointer(slot.borrow());
        if !block.is_null() {
            libc::free(block.cast());
            write_pointer(slot.reborrow(), ptr::null_mut());
        }
    }
}
