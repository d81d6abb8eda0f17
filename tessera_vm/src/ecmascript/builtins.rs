// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [27 Built-in Objects](https://tc39.es/ecma262/#sec-ecmascript-standard-built-in-objects)

pub mod array;
pub mod array_buffer;
pub mod builtin_function;
pub mod error;
pub(crate) mod fundamental_objects;
pub mod indexed_collections;
pub(crate) mod structured_data;
pub mod typed_array;

pub use array::{Array, ArrayHeapData, ElementsKind};
pub use array_buffer::{ArrayBuffer, ArrayBufferHeapData};
pub use builtin_function::{
    ArgumentsList, Behaviour, Builtin, BuiltinGetter, Function, FunctionHeapData,
    create_derived_constructor, create_native_function,
};
pub use typed_array::TypedArray;
