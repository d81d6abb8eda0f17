// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{Object, ObjectHeapData, OrdinaryObject};
use crate::{
    ecmascript::execution::{Agent, ProtoIntrinsics},
    engine::context::Bindable,
    heap::CreateHeapData,
};

/// ### [10.1 Ordinary Object Internal Methods and Internal Slots](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots)
///
/// Exotic objects keep their ordinary properties and \[\[Prototype\]\] in a
/// lazily created backing object. Until it exists the object behaves as if
/// it had no own string-keyed properties and its default prototype.
pub trait InternalSlots<'a>
where
    Self: Sized + Copy + Into<Object<'a>>,
{
    /// The intrinsic prototype objects of this kind are created with.
    fn default_prototype(self) -> ProtoIntrinsics;

    fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject<'static>>;

    fn set_backing_object(self, agent: &mut Agent, backing_object: OrdinaryObject<'static>);

    fn create_backing_object(self, agent: &mut Agent) -> OrdinaryObject<'static> {
        let prototype = agent
            .intrinsics()
            .get_intrinsic_default_proto(self.default_prototype());
        let backing_object = agent
            .heap
            .create(ObjectHeapData::new(Some(prototype.into())));
        self.set_backing_object(agent, backing_object);
        backing_object
    }

    fn get_or_create_backing_object(self, agent: &mut Agent) -> OrdinaryObject<'static> {
        match self.get_backing_object(agent) {
            Some(backing_object) => backing_object,
            None => self.create_backing_object(agent),
        }
    }

    /// #### \[\[Prototype\]\]
    fn internal_prototype(self, agent: &Agent) -> Option<Object<'static>> {
        match self.get_backing_object(agent) {
            Some(backing_object) => agent[backing_object].prototype,
            None => Some(
                agent
                    .intrinsics()
                    .get_intrinsic_default_proto(self.default_prototype())
                    .into(),
            ),
        }
    }

    /// #### \[\[Prototype\]\]
    fn internal_set_prototype(self, agent: &mut Agent, prototype: Option<Object>) {
        let backing_object = self.get_or_create_backing_object(agent);
        agent[backing_object].prototype = prototype.map(|p| p.unbind());
    }
}

impl<'a> InternalSlots<'a> for OrdinaryObject<'a> {
    fn default_prototype(self) -> ProtoIntrinsics {
        ProtoIntrinsics::Object
    }

    fn get_backing_object(self, _: &Agent) -> Option<OrdinaryObject<'static>> {
        Some(self.unbind())
    }

    fn set_backing_object(self, _: &mut Agent, _: OrdinaryObject<'static>) {
        unreachable!("ordinary objects are their own backing object")
    }

    fn internal_prototype(self, agent: &Agent) -> Option<Object<'static>> {
        agent[self].prototype
    }

    fn internal_set_prototype(self, agent: &mut Agent, prototype: Option<Object>) {
        agent[self].prototype = prototype.map(|p| p.unbind());
    }
}

impl<'a> InternalSlots<'a> for Object<'a> {
    fn default_prototype(self) -> ProtoIntrinsics {
        super::object_delegate!(self, default_prototype,)
    }

    fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject<'static>> {
        super::object_delegate!(self, get_backing_object, agent)
    }

    fn set_backing_object(self, agent: &mut Agent, backing_object: OrdinaryObject<'static>) {
        super::object_delegate!(self, set_backing_object, agent, backing_object)
    }

    fn create_backing_object(self, agent: &mut Agent) -> OrdinaryObject<'static> {
        super::object_delegate!(self, create_backing_object, agent)
    }

    fn internal_prototype(self, agent: &Agent) -> Option<Object<'static>> {
        super::object_delegate!(self, internal_prototype, agent)
    }

    fn internal_set_prototype(self, agent: &mut Agent, prototype: Option<Object>) {
        super::object_delegate!(self, internal_set_prototype, agent, prototype)
    }
}
