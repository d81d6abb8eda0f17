// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [23.1.5 Array Iterator Objects](https://tc39.es/ecma262/#sec-array-iterator-objects)

mod array_iterator;
pub(crate) mod array_iterator_prototype;

pub use array_iterator::{ArrayIterator, ArrayIteratorHeapData, CollectionIteratorKind};
