use alloc::boxed::Box;
use alloc::sync::Arc;
use core::ops::Deref;
use std::sync::LazyLock;

use arc_swap::ArcSwap;
use ctype_utils::hash::HashMap;

use crate::info::{CompositeKind, Type, TypeModifiers};

// -----------------------------------------------------------------------------
// Table

/// One immutable snapshot of the cache contents.
#[derive(Default, Clone)]
struct CacheTable {
    entries: HashMap<Box<str>, Arc<Type>>,
}

// -----------------------------------------------------------------------------
// TypeCache

/// Add-only store of fully defined structs and unions, keyed by name.
///
/// The parser publishes every composite it reads with a body and consults the
/// cache when an encoding names a composite without one, which is how
/// self-referential types are written. Entries are canonical copies: they
/// carry no modifiers of their own, and a lookup adds the modifiers of the
/// placeholder it replaces.
///
/// Readers load the current snapshot without locking. A publish builds a new
/// snapshot and swaps it in atomically, so readers never observe a partially
/// inserted entry. Nothing is ever removed.
///
/// # Examples
///
/// ```
/// use ctype_reflect::encoding::Parser;
/// use ctype_reflect::registry::TypeCache;
///
/// let cache = TypeCache::new();
/// let node = Parser::new("{Node=i{$val$1=}^{Node}{$next$2=}}")
///     .with_cache(&cache)
///     .parse_type()
///     .unwrap();
///
/// assert!(cache.contains("Node"));
///
/// // The inner `^{Node}` was read before `Node` was complete.
/// let next = node.field("next").unwrap().ty().as_pointee().unwrap();
/// assert_eq!(next.as_struct().unwrap().len(), 0);
/// assert_eq!(cache.resolve_forward(next).as_struct().unwrap().len(), 2);
/// ```
pub struct TypeCache {
    table: ArcSwap<CacheTable>,
}

impl TypeCache {
    /// Creates an empty, independent cache.
    pub fn new() -> Self {
        Self {
            table: ArcSwap::from_pointee(CacheTable::default()),
        }
    }

    /// The process-wide cache used by default.
    pub fn global() -> &'static TypeCache {
        static GLOBAL: LazyLock<TypeCache> = LazyLock::new(TypeCache::new);
        &GLOBAL
    }

    /// Number of published composites.
    pub fn len(&self) -> usize {
        self.table.load().entries.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.load().entries.contains_key(name)
    }

    /// Offers a struct or union to the cache.
    ///
    /// Only named composites with at least one field are stored, and only the
    /// first definition of each name is kept. Returns `true` if `ty` was
    /// inserted.
    pub fn publish(&self, ty: &Type) -> bool {
        let Some((kind, info)) = ty.as_composite() else {
            return false;
        };
        let name = info.name();
        // `?` is how compilers spell an anonymous struct or union.
        if info.is_forward() || name.is_empty() || name == "?" {
            return false;
        }

        if let Some(existing) = self.table.load().entries.get(name) {
            warn_on_kind_clash(existing, kind, name);
            return false;
        }

        let mut canonical = ty.clone();
        canonical.clear_modifiers();
        let canonical = Arc::new(canonical);

        let mut inserted = false;
        self.table.rcu(|table| {
            inserted = false;
            if table.entries.contains_key(name) {
                return Arc::clone(table);
            }
            let mut next = CacheTable::clone(table);
            next.entries.insert(name.into(), Arc::clone(&canonical));
            inserted = true;
            Arc::new(next)
        });

        if inserted {
            log::debug!("published {kind} `{name}` to the definition cache");
        }
        inserted
    }

    /// The published composite of the given kind and name.
    pub fn lookup(&self, kind: CompositeKind, name: &str) -> Option<Arc<Type>> {
        let entry = self.table.load().entries.get(name).cloned()?;
        match entry.as_composite() {
            Some((found, _)) if found == kind => Some(entry),
            _ => None,
        }
    }

    /// A deep copy of the published composite, carrying `modifiers`.
    ///
    /// This is how a body-less `{Name}` or `(Name)` is inflated.
    pub fn instantiate(
        &self,
        kind: CompositeKind,
        name: &str,
        modifiers: TypeModifiers,
    ) -> Option<Type> {
        let entry = self.lookup(kind, name)?;
        log::trace!("definition cache hit for {kind} `{name}`");
        Some(Type::clone(&entry).with_modifiers(modifiers))
    }

    /// Replaces a forward reference by its published definition.
    ///
    /// Types that are not body-less composites, and names that were never
    /// published, are returned as they are.
    pub fn resolve_forward<'t>(&self, ty: &'t Type) -> Resolved<'t> {
        if let Some((kind, info)) = ty.as_composite()
            && info.is_forward()
            && let Some(entry) = self.lookup(kind, info.name())
        {
            log::trace!("resolved forward reference to {kind} `{}`", info.name());
            return Resolved::Shared(entry);
        }
        Resolved::Borrowed(ty)
    }
}

impl Default for TypeCache {
    fn default() -> Self {
        Self::new()
    }
}

fn warn_on_kind_clash(existing: &Type, kind: CompositeKind, name: &str) {
    if let Some((existing_kind, _)) = existing.as_composite()
        && existing_kind != kind
    {
        log::warn!("{kind} `{name}` not cached: the name is already a cached {existing_kind}");
    }
}

// -----------------------------------------------------------------------------
// Resolved

/// A type that may have been swapped for its cached definition.
#[derive(Debug, Clone)]
pub enum Resolved<'t> {
    Borrowed(&'t Type),
    Shared(Arc<Type>),
}

impl Deref for Resolved<'_> {
    type Target = Type;

    #[inline]
    fn deref(&self) -> &Type {
        match self {
            Self::Borrowed(ty) => ty,
            Self::Shared(ty) => ty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::Parser;
    use crate::info::Primitive;

    fn parse_with(cache: &TypeCache, encoding: &str) -> Type {
        Parser::new(encoding).with_cache(cache).parse_type().unwrap()
    }

    #[test]
    fn publish_once_per_name() {
        let cache = TypeCache::new();
        let first = parse_with(&cache, "{Once=i{$a$1=}}");
        assert_eq!(cache.len(), 1);
        assert!(!cache.publish(&first));

        // A different body under the same name is ignored.
        parse_with(&cache, "{Once=d{$b$1=}}");
        let cached = cache.lookup(CompositeKind::Struct, "Once").unwrap();
        assert!(cached.field("a").is_some());
    }

    #[test]
    fn forward_references_are_not_published() {
        let cache = TypeCache::new();
        assert!(!cache.publish(&Type::forward_struct("Empty")));
        assert!(!cache.publish(&Type::primitive(Primitive::Int)));
        parse_with(&cache, "{?=i{$a$1=}}");
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn lookup_checks_kind() {
        let cache = TypeCache::new();
        parse_with(&cache, "(Shape=i{$a$1=}f{$b$2=})");
        assert!(cache.lookup(CompositeKind::Union, "Shape").is_some());
        assert!(cache.lookup(CompositeKind::Struct, "Shape").is_none());
    }

    #[test]
    fn instantiate_keeps_caller_modifiers() {
        let cache = TypeCache::new();
        let original = parse_with(&cache, "r{Konst=i{$a$1=}}");
        assert!(original.is_const());

        let plain = parse_with(&cache, "{Konst}");
        assert!(!plain.is_const());
        assert_eq!(plain.hash(), original.hash() - 1);

        let constant = parse_with(&cache, "r{Konst}");
        assert_eq!(constant.hash(), original.hash());
        assert_eq!(constant.as_struct().unwrap().len(), 1);
    }

    #[test]
    fn recursive_type_via_cache() {
        let cache = TypeCache::new();
        parse_with(&cache, "{CachedNode=(?=i{$val$1=})(?=^{CachedNode}{$next$2=})}");
        let container = parse_with(&cache, "{CacheContainer=(?=^{CachedNode}{$first$1=})}");

        let first = container.field("first").unwrap().ty().as_pointee().unwrap();
        let node = first.as_struct().unwrap();
        assert_eq!(node.len(), 2);
        assert_eq!(node.fields()[0].name(), Some("val"));
    }

    #[test]
    fn concurrent_publishers() {
        let cache = TypeCache::new();
        std::thread::scope(|scope| {
            for t in 0..4 {
                let cache = &cache;
                scope.spawn(move || {
                    for i in 0..16 {
                        let name = format!("Conc{}", (i + t) % 16);
                        parse_with(cache, &format!("{{{name}=i{{$a$1=}}}}"));
                    }
                });
            }
        });
        assert_eq!(cache.len(), 16);
    }
}
