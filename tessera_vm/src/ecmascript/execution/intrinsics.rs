// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.3 Realms](https://tc39.es/ecma262/#sec-code-realms)
//!
//! The intrinsic objects of the single realm an [`Agent`] hosts. Intrinsics
//! are allocated empty first so that they can refer to each other, and then
//! populated one builtin at a time.

use super::Agent;
use crate::{
    ecmascript::{
        builtins::{
            Function,
            builtin_function::allocate_builtin_function,
            error::ErrorPrototypes,
            fundamental_objects::{FunctionPrototype, ObjectPrototype},
            indexed_collections::{
                array_objects::{
                    array_constructor::ArrayConstructor,
                    array_iterator_objects::array_iterator_prototype::ArrayIteratorPrototype,
                    array_prototype::{ArrayPrototype, ArrayPrototypeToString, ArrayPrototypeValues},
                },
                typed_array_objects::{
                    typed_array_constructors::{
                        TypedArrayConstructors, allocate_typed_array_constructors,
                    },
                    typed_array_intrinsic_object::TypedArrayIntrinsicObject,
                    typed_array_prototype::{TypedArrayPrototype, TypedArrayPrototypeValues},
                },
            },
            structured_data::{
                array_buffer_objects::{
                    array_buffer_constructor::ArrayBufferConstructor,
                    array_buffer_prototype::ArrayBufferPrototype,
                },
                shared_array_buffer_objects::{
                    shared_array_buffer_constructor::SharedArrayBufferConstructor,
                    shared_array_buffer_prototype::SharedArrayBufferPrototype,
                },
            },
        },
        types::{ElementType, ObjectHeapData, OrdinaryObject},
    },
    heap::{CreateHeapData, Heap},
};

/// Enumeration of intrinsics intended to be used as the \[\[Prototype\]\]
/// value of an object. Used in GetPrototypeFromConstructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtoIntrinsics {
    Array,
    ArrayBuffer,
    ArrayIterator,
    Error,
    Function,
    Object,
    RangeError,
    SharedArrayBuffer,
    SyntaxError,
    TypeError,
    TypedArray(ElementType),
}

#[derive(Debug, Clone)]
pub struct Intrinsics {
    object_prototype: OrdinaryObject<'static>,
    function_prototype: OrdinaryObject<'static>,
    error_prototype: OrdinaryObject<'static>,
    range_error_prototype: OrdinaryObject<'static>,
    syntax_error_prototype: OrdinaryObject<'static>,
    type_error_prototype: OrdinaryObject<'static>,
    array: Function<'static>,
    array_prototype: OrdinaryObject<'static>,
    array_prototype_to_string: Function<'static>,
    array_prototype_values: Function<'static>,
    array_iterator_prototype: OrdinaryObject<'static>,
    array_buffer: Function<'static>,
    array_buffer_prototype: OrdinaryObject<'static>,
    shared_array_buffer: Function<'static>,
    shared_array_buffer_prototype: OrdinaryObject<'static>,
    typed_array: Function<'static>,
    typed_array_prototype: OrdinaryObject<'static>,
    typed_array_prototype_values: Function<'static>,
    typed_array_constructors: [Function<'static>; 11],
    typed_array_prototypes: [OrdinaryObject<'static>; 11],
}

impl Intrinsics {
    pub(crate) fn new(heap: &mut Heap) -> Self {
        let mut object = || -> OrdinaryObject<'static> { heap.create(ObjectHeapData::default()) };
        let object_prototype = object();
        let function_prototype = object();
        let error_prototype = object();
        let range_error_prototype = object();
        let syntax_error_prototype = object();
        let type_error_prototype = object();
        let array_prototype = object();
        let array_iterator_prototype = object();
        let array_buffer_prototype = object();
        let shared_array_buffer_prototype = object();
        let typed_array_prototype = object();
        let typed_array_prototypes = [(); 11].map(|_| object());
        Self {
            object_prototype,
            function_prototype,
            error_prototype,
            range_error_prototype,
            syntax_error_prototype,
            type_error_prototype,
            array: allocate_builtin_function::<ArrayConstructor>(heap),
            array_prototype,
            array_prototype_to_string: allocate_builtin_function::<ArrayPrototypeToString>(heap),
            array_prototype_values: allocate_builtin_function::<ArrayPrototypeValues>(heap),
            array_iterator_prototype,
            array_buffer: allocate_builtin_function::<ArrayBufferConstructor>(heap),
            array_buffer_prototype,
            shared_array_buffer: allocate_builtin_function::<SharedArrayBufferConstructor>(heap),
            shared_array_buffer_prototype,
            typed_array: allocate_builtin_function::<TypedArrayIntrinsicObject>(heap),
            typed_array_prototype,
            typed_array_prototype_values: allocate_builtin_function::<TypedArrayPrototypeValues>(
                heap,
            ),
            typed_array_constructors: allocate_typed_array_constructors(heap),
            typed_array_prototypes,
        }
    }

    pub(crate) fn initialize(agent: &mut Agent) {
        ObjectPrototype::create_intrinsic(agent);
        FunctionPrototype::create_intrinsic(agent);
        ErrorPrototypes::create_intrinsic(agent);
        ArrayConstructor::create_intrinsic(agent);
        ArrayPrototype::create_intrinsic(agent);
        ArrayIteratorPrototype::create_intrinsic(agent);
        ArrayBufferConstructor::create_intrinsic(agent);
        ArrayBufferPrototype::create_intrinsic(agent);
        SharedArrayBufferConstructor::create_intrinsic(agent);
        SharedArrayBufferPrototype::create_intrinsic(agent);
        TypedArrayIntrinsicObject::create_intrinsic(agent);
        TypedArrayPrototype::create_intrinsic(agent);
        TypedArrayConstructors::create_intrinsic(agent);
    }

    pub(crate) fn get_intrinsic_default_proto(
        &self,
        intrinsic_default_proto: ProtoIntrinsics,
    ) -> OrdinaryObject<'static> {
        match intrinsic_default_proto {
            ProtoIntrinsics::Array => self.array_prototype,
            ProtoIntrinsics::ArrayBuffer => self.array_buffer_prototype,
            ProtoIntrinsics::ArrayIterator => self.array_iterator_prototype,
            ProtoIntrinsics::Error => self.error_prototype,
            ProtoIntrinsics::Function => self.function_prototype,
            ProtoIntrinsics::Object => self.object_prototype,
            ProtoIntrinsics::RangeError => self.range_error_prototype,
            ProtoIntrinsics::SharedArrayBuffer => self.shared_array_buffer_prototype,
            ProtoIntrinsics::SyntaxError => self.syntax_error_prototype,
            ProtoIntrinsics::TypeError => self.type_error_prototype,
            ProtoIntrinsics::TypedArray(element_type) => {
                self.typed_array_prototypes[element_type.index()]
            }
        }
    }

    /// %Object.prototype%
    pub fn object_prototype(&self) -> OrdinaryObject<'static> {
        self.object_prototype
    }

    /// %Function.prototype%
    pub fn function_prototype(&self) -> OrdinaryObject<'static> {
        self.function_prototype
    }

    /// %Array%
    pub fn array(&self) -> Function<'static> {
        self.array
    }

    /// %Array.prototype%
    pub fn array_prototype(&self) -> OrdinaryObject<'static> {
        self.array_prototype
    }

    /// %Array.prototype.toString%
    pub fn array_prototype_to_string(&self) -> Function<'static> {
        self.array_prototype_to_string
    }

    /// %Array.prototype.values%
    pub fn array_prototype_values(&self) -> Function<'static> {
        self.array_prototype_values
    }

    /// %ArrayIteratorPrototype%
    pub fn array_iterator_prototype(&self) -> OrdinaryObject<'static> {
        self.array_iterator_prototype
    }

    /// %ArrayBuffer%
    pub fn array_buffer(&self) -> Function<'static> {
        self.array_buffer
    }

    /// %ArrayBuffer.prototype%
    pub fn array_buffer_prototype(&self) -> OrdinaryObject<'static> {
        self.array_buffer_prototype
    }

    /// %SharedArrayBuffer%
    pub fn shared_array_buffer(&self) -> Function<'static> {
        self.shared_array_buffer
    }

    /// %SharedArrayBuffer.prototype%
    pub fn shared_array_buffer_prototype(&self) -> OrdinaryObject<'static> {
        self.shared_array_buffer_prototype
    }

    /// %TypedArray%
    pub fn typed_array(&self) -> Function<'static> {
        self.typed_array
    }

    /// %TypedArray.prototype%
    pub fn typed_array_prototype(&self) -> OrdinaryObject<'static> {
        self.typed_array_prototype
    }

    /// %TypedArray.prototype.values%
    pub fn typed_array_prototype_values(&self) -> Function<'static> {
        self.typed_array_prototype_values
    }

    /// The concrete TypedArray constructor, such as %Int8Array%.
    pub fn typed_array_constructor(&self, element_type: ElementType) -> Function<'static> {
        self.typed_array_constructors[element_type.index()]
    }

    /// The concrete TypedArray prototype, such as %Int8Array.prototype%.
    pub fn typed_array_prototype_of(&self, element_type: ElementType) -> OrdinaryObject<'static> {
        self.typed_array_prototypes[element_type.index()]
    }
}
