use crate::info::{TypeKind, TypeModifiers};

/// Added to the hash of every union, so a union never collides with a
/// struct of the same name and members.
const UNION_SENTINEL: u64 = b'(' as u64;

/// Added after scaling the pointee hash of a pointer.
const POINTER_SENTINEL: u64 = b'^' as u64;

/// Rolling byte-string hash used for composite names.
///
/// Each byte updates the accumulator as `h = byte + (h << 6) + (h << 16) - h`,
/// in wrapping 64-bit arithmetic.
///
/// ```
/// use ctype_reflect::info::hash_bytes;
///
/// assert_eq!(hash_bytes(b""), 0);
/// assert_eq!(hash_bytes(b"a"), 97);
/// assert_ne!(hash_bytes(b"ab"), hash_bytes(b"ba"));
/// ```
pub const fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0;
    let mut i = 0;
    while i < bytes.len() {
        hash = (bytes[i] as u64)
            .wrapping_add(hash << 6)
            .wrapping_add(hash << 16)
            .wrapping_sub(hash);
        i += 1;
    }
    hash
}

/// Computes the structural hash of a type from its parts.
///
/// Child hashes are read from the already-constructed children, so the whole
/// tree is hashed bottom-up as it is built.
pub(super) fn hash_type(kind: &TypeKind, modifiers: TypeModifiers) -> u64 {
    let base = match kind {
        TypeKind::Primitive(p) => p.encoding() as u64,
        TypeKind::Pointer(pointee) => pointee.hash().wrapping_mul(31).wrapping_add(POINTER_SENTINEL),
        TypeKind::Array(array) => (array.len() as u64).wrapping_mul(array.item().hash()),
        TypeKind::Struct(info) => info
            .fields()
            .iter()
            .fold(hash_bytes(info.name().as_bytes()), |h, f| {
                h.wrapping_add(f.ty().hash())
            }),
        TypeKind::Union(info) => info
            .fields()
            .iter()
            .fold(hash_bytes(info.name().as_bytes()), |h, f| {
                h.wrapping_add(f.ty().hash())
            })
            .wrapping_add(UNION_SENTINEL),
    };
    base.wrapping_add(modifiers.bits() as u64)
}
