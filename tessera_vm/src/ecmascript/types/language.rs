// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod bigint;
mod object;
mod string;
mod value;

pub use bigint::{BigInt, BigIntHeapData};
pub use object::{
    InternalMethods, InternalSlots, IntoObject, Object, ObjectHeapData, OrdinaryObject,
    PropertyKey, PropertyStorage, PropertyValue, WellKnownSymbol,
};
pub(crate) use object::{ordinary_get, ordinary_has_property, ordinary_set};
pub use string::{BUILTIN_STRING_MEMORY, BuiltinStrings, String, StringHeapData};
pub(crate) use string::BUILTIN_STRINGS_LIST;
pub use value::{IntoValue, Value};
