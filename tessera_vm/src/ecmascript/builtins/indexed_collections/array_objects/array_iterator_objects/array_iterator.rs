// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ops::{Index, IndexMut};

use crate::{
    ecmascript::{
        execution::{Agent, ProtoIntrinsics},
        types::{InternalMethods, InternalSlots, Object, OrdinaryObject},
    },
    engine::context::{Bindable, NoGcScope, bindable_handle},
    heap::{CreateHeapData, Heap, indexes::ArrayIteratorIndex},
};

/// An iterator over an Array, a TypedArray or an array-like object, created
/// by `keys`, `values` and `entries`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrayIterator<'a>(pub(crate) ArrayIteratorIndex<'a>);
bindable_handle!(ArrayIterator);

impl<'a> ArrayIterator<'a> {
    /// ### [23.1.5.1 CreateArrayIterator ( array, kind )](https://tc39.es/ecma262/#sec-createarrayiterator)
    pub(crate) fn from_object(
        agent: &mut Agent,
        array: Object,
        kind: CollectionIteratorKind,
        _: NoGcScope<'a, '_>,
    ) -> Self {
        agent.heap.create(ArrayIteratorHeapData {
            array: Some(array.unbind()),
            next_index: 0,
            kind,
            backing_object: None,
        })
    }
}

/// What each step of an [`ArrayIterator`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionIteratorKind {
    #[default]
    Key,
    Value,
    KeyAndValue,
}

#[derive(Debug, Clone, Default)]
pub struct ArrayIteratorHeapData {
    /// The iterated object; `None` once the iterator is exhausted.
    pub(crate) array: Option<Object<'static>>,
    pub(crate) next_index: u64,
    pub(crate) kind: CollectionIteratorKind,
    pub(crate) backing_object: Option<OrdinaryObject<'static>>,
}

impl CreateHeapData<ArrayIteratorHeapData, ArrayIterator<'static>> for Heap {
    fn create(&mut self, data: ArrayIteratorHeapData) -> ArrayIterator<'static> {
        self.array_iterators.push(data);
        ArrayIterator(ArrayIteratorIndex::last(&self.array_iterators))
    }
}

impl Index<ArrayIterator<'_>> for Agent {
    type Output = ArrayIteratorHeapData;

    fn index(&self, index: ArrayIterator<'_>) -> &Self::Output {
        &self.heap.array_iterators[index.0.into_index()]
    }
}

impl IndexMut<ArrayIterator<'_>> for Agent {
    fn index_mut(&mut self, index: ArrayIterator<'_>) -> &mut Self::Output {
        &mut self.heap.array_iterators[index.0.into_index()]
    }
}

impl<'a> InternalSlots<'a> for ArrayIterator<'a> {
    fn default_prototype(self) -> ProtoIntrinsics {
        ProtoIntrinsics::ArrayIterator
    }

    fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject<'static>> {
        agent[self].backing_object
    }

    fn set_backing_object(self, agent: &mut Agent, backing_object: OrdinaryObject<'static>) {
        assert!(agent[self].backing_object.replace(backing_object).is_none());
    }
}

impl<'a> InternalMethods<'a> for ArrayIterator<'a> {}
