// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [23.2 TypedArray Objects](https://tc39.es/ecma262/#sec-typedarray-objects)

pub(crate) mod abstract_operations;
pub(crate) mod typed_array_constructors;
pub(crate) mod typed_array_intrinsic_object;
pub(crate) mod typed_array_prototype;
