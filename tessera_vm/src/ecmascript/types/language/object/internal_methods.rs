// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{InternalSlots, Object, OrdinaryObject, PropertyKey, PropertyValue};
use crate::{
    ecmascript::{
        abstract_operations::operations_on_objects::call_function,
        execution::{Agent, JsResult},
        types::Value,
    },
    engine::context::{Bindable, GcScope, NoGcScope},
};

/// ### [6.1.7.2 Object Internal Methods and Internal Slots](https://tc39.es/ecma262/#sec-object-internal-methods-and-internal-slots)
///
/// The default implementations are the ordinary object internal methods
/// operating on the backing object. Methods that may call into user code
/// (through getters, setters or value coercion) take a [`GcScope`].
pub trait InternalMethods<'a>
where
    Self: InternalSlots<'a>,
{
    /// ## \[\[GetPrototypeOf\]\]
    fn internal_get_prototype_of(self, agent: &Agent) -> Option<Object<'static>> {
        self.internal_prototype(agent)
    }

    /// ## \[\[SetPrototypeOf\]\]
    fn internal_set_prototype_of(self, agent: &mut Agent, prototype: Option<Object>) {
        self.internal_set_prototype(agent, prototype)
    }

    /// ## \[\[GetOwnProperty\]\]
    ///
    /// Takes the agent mutably as reading an element of a BigInt typed array
    /// allocates.
    fn internal_get_own_property<'gc>(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        gc: NoGcScope<'gc, '_>,
    ) -> Option<PropertyValue<'gc>> {
        let backing_object = self.get_backing_object(agent)?;
        agent[backing_object]
            .properties
            .get(&property_key.unbind())
            .map(|value| value.bind(gc))
    }

    /// Whether the object has an own property with the given key. Never
    /// allocates or calls into user code.
    fn internal_has_own_property(self, agent: &Agent, property_key: PropertyKey) -> bool {
        self.get_backing_object(agent).is_some_and(|backing_object| {
            agent[backing_object]
                .properties
                .contains_key(&property_key.unbind())
        })
    }

    /// ## \[\[DefineOwnProperty\]\]
    fn internal_define_own_property<'gc>(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        property_value: PropertyValue,
        _gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, bool> {
        let backing_object = self.get_or_create_backing_object(agent);
        agent[backing_object]
            .properties
            .insert(property_key.unbind(), property_value.unbind());
        Ok(true)
    }

    /// ## \[\[HasProperty\]\]
    fn internal_has_property(self, agent: &Agent, property_key: PropertyKey) -> bool {
        ordinary_has_property(agent, self.into(), property_key)
    }

    /// ## \[\[Get\]\]
    fn internal_get<'gc>(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        receiver: Value,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        ordinary_get(agent, self.into(), property_key, receiver, gc)
    }

    /// ## \[\[Set\]\]
    fn internal_set<'gc>(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        value: Value,
        receiver: Value,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, bool> {
        ordinary_set(agent, self.into(), property_key, value, receiver, gc)
    }

    /// ## \[\[Delete\]\]
    fn internal_delete(self, agent: &mut Agent, property_key: PropertyKey) -> bool {
        if let Some(backing_object) = self.get_backing_object(agent) {
            agent[backing_object]
                .properties
                .remove(&property_key.unbind());
        }
        true
    }
}

/// ### [10.1.7.1 OrdinaryHasProperty ( O, P )](https://tc39.es/ecma262/#sec-ordinaryhasproperty)
pub(crate) fn ordinary_has_property(agent: &Agent, object: Object, property_key: PropertyKey) -> bool {
    let mut current = Some(object.unbind());
    while let Some(object) = current {
        if object.internal_has_own_property(agent, property_key) {
            return true;
        }
        current = object.internal_get_prototype_of(agent);
    }
    false
}

/// ### [10.1.8.1 OrdinaryGet ( O, P, Receiver )](https://tc39.es/ecma262/#sec-ordinaryget)
pub(crate) fn ordinary_get<'gc>(
    agent: &mut Agent,
    object: Object,
    property_key: PropertyKey,
    receiver: Value,
    gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Value<'gc>> {
    let mut current = object.unbind();
    loop {
        // 1. Let desc be ? O.[[GetOwnProperty]](P).
        let descriptor = current
            .internal_get_own_property(agent, property_key, gc.nogc())
            .unbind();
        match descriptor {
            // 3. If IsDataDescriptor(desc) is true, return desc.[[Value]].
            Some(PropertyValue::Data(value)) => return Ok(value),
            // 5. Let getter be desc.[[Get]].
            Some(PropertyValue::Accessor { get, .. }) => {
                // 6. If getter is undefined, return undefined.
                let Some(getter) = get else {
                    return Ok(Value::Undefined);
                };
                // 7. Return ? Call(getter, Receiver).
                return call_function(agent, getter, receiver, &[], gc);
            }
            // 2. If desc is undefined, then
            None => {
                // a. Let parent be ? O.[[GetPrototypeOf]]().
                // b. If parent is null, return undefined.
                let Some(parent) = current.internal_get_prototype_of(agent) else {
                    return Ok(Value::Undefined);
                };
                // c. Return ? parent.[[Get]](P, Receiver).
                if parent.is_typed_array() {
                    return parent.internal_get(agent, property_key, receiver, gc);
                }
                current = parent;
            }
        }
    }
}

/// ### [10.1.9.1 OrdinarySet ( O, P, V, Receiver )](https://tc39.es/ecma262/#sec-ordinaryset)
///
/// Properties are always writable, so a data property anywhere on the chain
/// results in a data property being created or updated on the receiver.
pub(crate) fn ordinary_set<'gc>(
    agent: &mut Agent,
    object: Object,
    property_key: PropertyKey,
    value: Value,
    receiver: Value,
    gc: GcScope<'gc, '_>,
) -> JsResult<'gc, bool> {
    let mut current = Some(object.unbind());
    while let Some(object) = current {
        let descriptor = object
            .internal_get_own_property(agent, property_key, gc.nogc())
            .unbind();
        match descriptor {
            Some(PropertyValue::Data(_)) => break,
            Some(PropertyValue::Accessor { set, .. }) => {
                let Some(setter) = set else {
                    return Ok(false);
                };
                call_function(agent, setter, receiver, &[value], gc)?;
                return Ok(true);
            }
            None => current = object.internal_get_prototype_of(agent),
        }
    }
    let Ok(receiver) = Object::try_from(receiver) else {
        return Ok(false);
    };
    receiver.internal_define_own_property(agent, property_key, PropertyValue::Data(value), gc)
}

impl<'a> InternalMethods<'a> for OrdinaryObject<'a> {}

impl<'a> InternalMethods<'a> for Object<'a> {
    fn internal_get_prototype_of(self, agent: &Agent) -> Option<Object<'static>> {
        super::object_delegate!(self, internal_get_prototype_of, agent)
    }

    fn internal_set_prototype_of(self, agent: &mut Agent, prototype: Option<Object>) {
        super::object_delegate!(self, internal_set_prototype_of, agent, prototype)
    }

    fn internal_get_own_property<'gc>(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        gc: NoGcScope<'gc, '_>,
    ) -> Option<PropertyValue<'gc>> {
        super::object_delegate!(self, internal_get_own_property, agent, property_key, gc)
    }

    fn internal_has_own_property(self, agent: &Agent, property_key: PropertyKey) -> bool {
        super::object_delegate!(self, internal_has_own_property, agent, property_key)
    }

    fn internal_define_own_property<'gc>(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        property_value: PropertyValue,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, bool> {
        super::object_delegate!(
            self,
            internal_define_own_property,
            agent,
            property_key,
            property_value,
            gc
        )
    }

    fn internal_has_property(self, agent: &Agent, property_key: PropertyKey) -> bool {
        super::object_delegate!(self, internal_has_property, agent, property_key)
    }

    fn internal_get<'gc>(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        receiver: Value,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        super::object_delegate!(self, internal_get, agent, property_key, receiver, gc)
    }

    fn internal_set<'gc>(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        value: Value,
        receiver: Value,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, bool> {
        super::object_delegate!(self, internal_set, agent, property_key, value, receiver, gc)
    }

    fn internal_delete(self, agent: &mut Agent, property_key: PropertyKey) -> bool {
        super::object_delegate!(self, internal_delete, agent, property_key)
    }
}
