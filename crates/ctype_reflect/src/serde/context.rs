//! Per-call state shared by the serializers and deserializers of one
//! conversion.
//!
//! serde only lets a visitor report a failure as a message. The first typed
//! failure is therefore recorded here, and the public entry points return it
//! in place of the message serde carried up.

use alloc::string::String;
#[cfg(feature = "debug")]
use alloc::vec::Vec;
use core::cell::RefCell;

use serde_core::{de, ser};

use crate::registry::TypeCache;
use crate::serde::{JsonError, JsonErrorKind};
use crate::serde::de::Journal;

#[cfg(feature = "debug")]
enum Segment {
    Key(String),
    Index(usize),
}

pub(super) struct Context<'c> {
    pub cache: &'c TypeCache,
    pub strict: bool,
    pub journal: Journal,
    failure: RefCell<Option<(JsonErrorKind, Option<String>)>>,
    error_path: RefCell<Option<String>>,
    #[cfg(feature = "debug")]
    path: RefCell<Vec<Segment>>,
}

impl<'c> Context<'c> {
    pub fn new(cache: &'c TypeCache) -> Self {
        Self {
            cache,
            strict: false,
            journal: Journal::default(),
            failure: RefCell::new(None),
            error_path: RefCell::new(None),
            #[cfg(feature = "debug")]
            path: RefCell::new(Vec::new()),
        }
    }

    // -------------------------------------------------------------------------
    // Path

    #[inline]
    fn enter_key(&self, key: &str) {
        #[cfg(feature = "debug")]
        self.path.borrow_mut().push(Segment::Key(key.into()));
        #[cfg(not(feature = "debug"))]
        let _ = key;
    }

    #[inline]
    fn enter_index(&self, index: usize) {
        #[cfg(feature = "debug")]
        self.path.borrow_mut().push(Segment::Index(index));
        #[cfg(not(feature = "debug"))]
        let _ = index;
    }

    /// Pops the innermost segment, remembering the full path first when
    /// `failed` and nothing failed before.
    fn leave(&self, failed: bool) {
        if failed {
            let mut error_path = self.error_path.borrow_mut();
            if error_path.is_none() {
                *error_path = self.current_path();
            }
        }
        #[cfg(feature = "debug")]
        self.path.borrow_mut().pop();
    }

    /// Runs `f` with `key` pushed onto the path.
    #[inline]
    pub fn at_key<T, E>(&self, key: &str, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        self.enter_key(key);
        let result = f();
        self.leave(result.is_err());
        result
    }

    /// Runs `f` with `index` pushed onto the path.
    #[inline]
    pub fn at_index<T, E>(&self, index: usize, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        self.enter_index(index);
        let result = f();
        self.leave(result.is_err());
        result
    }

    #[cfg(feature = "debug")]
    fn current_path(&self) -> Option<String> {
        use core::fmt::Write;

        let mut text = String::from("$");
        for segment in self.path.borrow().iter() {
            // Writing to a `String` cannot fail.
            let _ = match segment {
                Segment::Key(key) => write!(text, ".{key}"),
                Segment::Index(index) => write!(text, "[{index}]"),
            };
        }
        Some(text)
    }

    #[cfg(not(feature = "debug"))]
    #[inline]
    fn current_path(&self) -> Option<String> {
        None
    }

    // -------------------------------------------------------------------------
    // Failures

    /// Records `kind` unless an earlier failure was recorded, and returns the
    /// message to hand to serde.
    fn record(&self, kind: JsonErrorKind) -> String {
        let message = kind.to_string();
        let mut failure = self.failure.borrow_mut();
        if failure.is_none() {
            *failure = Some((kind, self.current_path()));
        }
        message
    }

    pub fn de_error<E: de::Error>(&self, kind: JsonErrorKind) -> E {
        E::custom(self.record(kind))
    }

    pub fn ser_error<E: ser::Error>(&self, kind: JsonErrorKind) -> E {
        E::custom(self.record(kind))
    }

    /// Turns the error serde_json returned into the typed failure behind it.
    ///
    /// Failures serde_json raised on its own are classified, and located at
    /// the innermost key or index that reported an error.
    pub fn into_error(self, error: serde_json::Error) -> JsonError {
        match self.failure.into_inner() {
            Some((kind, path)) => JsonError::new(kind, path),
            None => JsonError::new(JsonErrorKind::from_json(error), self.error_path.into_inner()),
        }
    }
}
