// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ops::{Index, IndexMut};

use crate::{
    ecmascript::{
        builders::OrdinaryObjectBuilder,
        execution::{Agent, ExceptionType, ProtoIntrinsics},
        types::{
            BUILTIN_STRING_MEMORY, InternalMethods, InternalSlots, Object, OrdinaryObject,
            PropertyKey, PropertyValue, String,
        },
    },
    engine::context::{Bindable, NoGcScope, bindable_handle},
    heap::{CreateHeapData, Heap, indexes::ErrorIndex},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Error<'a>(pub(crate) ErrorIndex<'a>);
bindable_handle!(Error);

#[derive(Debug, Clone)]
pub struct ErrorHeapData {
    pub(crate) kind: ExceptionType,
    pub(crate) message: Option<String<'static>>,
    pub(crate) backing_object: Option<OrdinaryObject<'static>>,
}

impl ErrorHeapData {
    pub(crate) fn new(kind: ExceptionType, message: Option<String<'static>>) -> Self {
        Self {
            kind,
            message,
            backing_object: None,
        }
    }
}

impl CreateHeapData<ErrorHeapData, Error<'static>> for Heap {
    fn create(&mut self, data: ErrorHeapData) -> Error<'static> {
        self.errors.push(data);
        Error(ErrorIndex::last(&self.errors))
    }
}

impl Index<Error<'_>> for Agent {
    type Output = ErrorHeapData;

    fn index(&self, index: Error<'_>) -> &Self::Output {
        &self.heap.errors[index.0.into_index()]
    }
}

impl IndexMut<Error<'_>> for Agent {
    fn index_mut(&mut self, index: Error<'_>) -> &mut Self::Output {
        &mut self.heap.errors[index.0.into_index()]
    }
}

impl Error<'_> {
    fn kind_prototype(self, agent: &Agent) -> ProtoIntrinsics {
        match agent[self].kind {
            ExceptionType::Error => ProtoIntrinsics::Error,
            ExceptionType::RangeError => ProtoIntrinsics::RangeError,
            ExceptionType::SyntaxError => ProtoIntrinsics::SyntaxError,
            ExceptionType::TypeError => ProtoIntrinsics::TypeError,
        }
    }
}

impl<'a> InternalSlots<'a> for Error<'a> {
    fn default_prototype(self) -> ProtoIntrinsics {
        ProtoIntrinsics::Error
    }

    fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject<'static>> {
        agent[self].backing_object
    }

    fn set_backing_object(self, agent: &mut Agent, backing_object: OrdinaryObject<'static>) {
        assert!(agent[self].backing_object.replace(backing_object).is_none());
    }

    /// The backing object of an error is created with the prototype of its
    /// kind and its own `message` property.
    fn create_backing_object(self, agent: &mut Agent) -> OrdinaryObject<'static> {
        let kind = self.kind_prototype(agent);
        let backing_object =
            OrdinaryObject::create_with_intrinsic_prototype(agent, kind, NoGcScope::intrinsic());
        if let Some(message) = agent[self].message {
            backing_object.set_data_property(agent, BUILTIN_STRING_MEMORY.message.into(), message.into());
        }
        self.set_backing_object(agent, backing_object);
        backing_object
    }
}

impl<'a> InternalMethods<'a> for Error<'a> {
    fn internal_get_own_property<'gc>(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        gc: NoGcScope<'gc, '_>,
    ) -> Option<PropertyValue<'gc>> {
        let backing_object = self.get_or_create_backing_object(agent);
        backing_object.internal_get_own_property(agent, property_key, gc)
    }

    fn internal_has_own_property(self, agent: &Agent, property_key: PropertyKey) -> bool {
        match self.get_backing_object(agent) {
            Some(backing_object) => backing_object.internal_has_own_property(agent, property_key),
            None => {
                property_key == BUILTIN_STRING_MEMORY.message.into() && agent[self].message.is_some()
            }
        }
    }

    fn internal_get_prototype_of(self, agent: &Agent) -> Option<Object<'static>> {
        match self.get_backing_object(agent) {
            Some(backing_object) => agent[backing_object].prototype,
            None => {
                let kind = self.kind_prototype(agent);
                Some(agent.intrinsics().get_intrinsic_default_proto(kind).into())
            }
        }
    }
}

/// The prototypes of the native error kinds.
pub(crate) struct ErrorPrototypes;

impl ErrorPrototypes {
    pub(crate) fn create_intrinsic(agent: &mut Agent) {
        let intrinsics = agent.intrinsics();
        let object_prototype = intrinsics.object_prototype();
        let error_prototype = intrinsics.get_intrinsic_default_proto(ProtoIntrinsics::Error);
        let prototypes = [
            (ExceptionType::Error, error_prototype, Object::from(object_prototype)),
            (
                ExceptionType::RangeError,
                intrinsics.get_intrinsic_default_proto(ProtoIntrinsics::RangeError),
                error_prototype.into(),
            ),
            (
                ExceptionType::SyntaxError,
                intrinsics.get_intrinsic_default_proto(ProtoIntrinsics::SyntaxError),
                error_prototype.into(),
            ),
            (
                ExceptionType::TypeError,
                intrinsics.get_intrinsic_default_proto(ProtoIntrinsics::TypeError),
                error_prototype.into(),
            ),
        ];
        for (kind, this, prototype) in prototypes {
            let name = String::from_str(agent, kind.name(), NoGcScope::intrinsic()).unbind();
            OrdinaryObjectBuilder::new_intrinsic_object(agent, this)
                .with_prototype(prototype)
                .with_data_property(BUILTIN_STRING_MEMORY.name.into(), name.into())
                .with_data_property(BUILTIN_STRING_MEMORY.message.into(), String::EMPTY_STRING.into())
                .build();
        }
    }
}
