// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod indexes;

use ahash::RandomState;
use hashbrown::HashMap;

pub use self::indexes::BaseIndex;
use self::indexes::StringIndex;
use crate::ecmascript::{
    builtins::{
        ArrayBufferHeapData, ArrayHeapData, FunctionHeapData, error::ErrorHeapData,
        indexed_collections::array_objects::array_iterator_objects::ArrayIteratorHeapData,
        typed_array::TypedArrayHeapData,
    },
    types::{BUILTIN_STRINGS_LIST, BigIntHeapData, ObjectHeapData, StringHeapData},
};

/// Index-addressed arenas for every heap-allocated kind.
///
/// Handles (`Array<'a>`, `TypedArray<'a>`, ...) are indexes into these
/// vectors. Entries are never moved or reclaimed while a handle can observe
/// them: marking and compaction belong to the host collector.
#[derive(Debug, Default)]
pub struct Heap {
    pub(crate) arrays: Vec<ArrayHeapData>,
    pub(crate) array_buffers: Vec<ArrayBufferHeapData>,
    pub(crate) array_iterators: Vec<ArrayIteratorHeapData>,
    pub(crate) bigints: Vec<BigIntHeapData>,
    pub(crate) errors: Vec<ErrorHeapData>,
    pub(crate) functions: Vec<FunctionHeapData>,
    pub(crate) objects: Vec<ObjectHeapData>,
    pub(crate) strings: Vec<StringHeapData>,
    /// Strings are interned: equal contents always share one index.
    pub(crate) string_lookup: HashMap<Box<str>, StringIndex<'static>, RandomState>,
    pub(crate) typed_arrays: Vec<TypedArrayHeapData>,
}

/// Allocation of heap data of type `T`, returning the handle `F`.
pub trait CreateHeapData<T, F> {
    fn create(&mut self, data: T) -> F;
}

impl Heap {
    pub(crate) fn new() -> Self {
        let mut heap = Self {
            arrays: Vec::with_capacity(256),
            array_buffers: Vec::with_capacity(64),
            typed_arrays: Vec::with_capacity(64),
            objects: Vec::with_capacity(128),
            functions: Vec::with_capacity(256),
            strings: Vec::with_capacity(256),
            ..Default::default()
        };
        // BUILTIN_STRING_MEMORY refers to these by position.
        for &data in BUILTIN_STRINGS_LIST {
            heap.intern_str(data);
        }
        debug_assert_eq!(heap.strings.len(), BUILTIN_STRINGS_LIST.len());
        heap
    }
}
