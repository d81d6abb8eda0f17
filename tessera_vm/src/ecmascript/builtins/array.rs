// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.4.2 Array Exotic Objects](https://tc39.es/ecma262/#sec-array-exotic-objects)

pub(crate) mod abstract_operations;
mod data;

use std::ops::{Index, IndexMut};

pub use data::{ArrayElements, ArrayHeapData, ElementsKind};
pub(crate) use data::ElementStorage;

use self::abstract_operations::array_set_length;
use crate::{
    ecmascript::{
        execution::{Agent, JsResult, ProtoIntrinsics},
        types::{
            BUILTIN_STRING_MEMORY, InternalMethods, InternalSlots, Object, OrdinaryObject,
            PropertyKey, PropertyValue, Value,
        },
    },
    engine::context::{Bindable, GcScope, NoGcScope, bindable_handle},
    heap::{CreateHeapData, Heap, indexes::ArrayIndex},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Array<'a>(pub(crate) ArrayIndex<'a>);
bindable_handle!(Array);

impl CreateHeapData<ArrayHeapData, Array<'static>> for Heap {
    fn create(&mut self, data: ArrayHeapData) -> Array<'static> {
        self.arrays.push(data);
        Array(ArrayIndex::last(&self.arrays))
    }
}

impl Index<Array<'_>> for Agent {
    type Output = ArrayHeapData;

    fn index(&self, index: Array<'_>) -> &Self::Output {
        &self.heap.arrays[index.0.into_index()]
    }
}

impl IndexMut<Array<'_>> for Agent {
    fn index_mut(&mut self, index: Array<'_>) -> &mut Self::Output {
        &mut self.heap.arrays[index.0.into_index()]
    }
}

impl<'a> Array<'a> {
    /// Creates a new array with the given elements.
    ///
    /// This is equal to the [CreateArrayFromList](https://tc39.es/ecma262/#sec-createarrayfromlist)
    /// abstract operation.
    pub fn from_slice(agent: &mut Agent, elements: &[Value], gc: NoGcScope<'a, '_>) -> Self {
        let storage = elements.iter().map(|value| Some(value.unbind())).collect();
        Self::from_storage(agent, storage, gc)
    }

    /// Creates a packed array owning `storage`. `None` entries are holes.
    pub(crate) fn from_storage(
        agent: &mut Agent,
        storage: Vec<Option<Value<'static>>>,
        _: NoGcScope<'a, '_>,
    ) -> Self {
        agent.heap.create(ArrayHeapData {
            elements: ArrayElements::from_vec(storage),
            backing_object: None,
        })
    }

    /// Creates a packed array sharing this array's element storage. The
    /// storage is cloned by whichever array writes to it first.
    pub(crate) fn shared_copy(self, agent: &mut Agent, _: NoGcScope<'a, '_>) -> Option<Self> {
        let ArrayElements::Packed { storage, kind } = &agent[self].elements else {
            return None;
        };
        let elements = ArrayElements::Packed {
            storage: ElementStorage::clone(storage),
            kind: *kind,
        };
        Some(agent.heap.create(ArrayHeapData {
            elements,
            backing_object: None,
        }))
    }

    #[inline]
    pub fn len(self, agent: &Agent) -> u32 {
        agent[self].elements.len()
    }

    #[inline]
    pub fn is_empty(self, agent: &Agent) -> bool {
        self.len(agent) == 0
    }

    /// The elements kind of packed storage, or `None` for a dictionary.
    pub fn elements_kind(self, agent: &Agent) -> Option<ElementsKind> {
        match &agent[self].elements {
            ArrayElements::Packed { kind, .. } => Some(*kind),
            ArrayElements::Dictionary { .. } => None,
        }
    }

    pub fn is_dictionary(self, agent: &Agent) -> bool {
        !agent[self].elements.is_packed()
    }

    /// IsFastPathEligible: whether algorithms may read and write this
    /// array's storage directly instead of going through the property
    /// protocol.
    ///
    /// Holey storage is only eligible while nothing on the prototype chain
    /// could provide an element for a hole.
    pub fn is_fast_path_eligible(self, agent: &Agent) -> bool {
        if agent.options.disable_fast_paths {
            return false;
        }
        match agent[self].elements {
            ArrayElements::Packed {
                kind: ElementsKind::Holey,
                ..
            } => !prototype_chain_has_indexed_properties(agent, self.into()),
            ArrayElements::Packed { .. } => true,
            ArrayElements::Dictionary { .. } => false,
        }
    }

    /// Packed storage, for reading.
    pub(crate) fn as_slice(self, agent: &Agent) -> Option<&[Option<Value<'static>>]> {
        match &agent[self].elements {
            ArrayElements::Packed { storage, .. } => Some(storage.as_slice()),
            ArrayElements::Dictionary { .. } => None,
        }
    }

    /// EnsureExclusiveStorage: packed storage for writing, cloned first if
    /// it is shared with another array.
    ///
    /// The elements kind is reset to what the storage now holds when the
    /// returned vector is released through [`Array::reclassify`].
    pub(crate) fn as_mut_vec(self, agent: &mut Agent) -> Option<&mut Vec<Option<Value<'static>>>> {
        agent[self].elements.storage_mut()
    }

    /// Recompute the elements kind after a direct write to storage.
    pub(crate) fn reclassify(self, agent: &mut Agent) {
        if let ArrayElements::Packed { storage, kind } = &mut agent[self].elements {
            *kind = ElementsKind::classify(storage);
        }
    }

    /// Whether the array has no elements at all, only holes.
    pub(crate) fn has_no_elements(self, agent: &Agent) -> bool {
        !agent[self].elements.has_elements()
    }

    /// Install `storage` as the elements of an array that holds none yet.
    /// The length becomes the length of `storage`.
    pub(crate) fn replace_elements(self, agent: &mut Agent, storage: Vec<Option<Value<'static>>>) {
        debug_assert!(self.has_no_elements(agent));
        agent[self].elements = ArrayElements::from_vec(storage);
    }

    /// Read an own element without consulting the prototype chain.
    pub(crate) fn get_element(self, agent: &Agent, index: u32) -> Option<PropertyValue<'static>> {
        agent[self].elements.get(index)
    }

    /// Write an own data element, growing the array if needed.
    pub(crate) fn set_element(self, agent: &mut Agent, index: u32, value: Value) {
        let threshold = agent.options.sparse_array_threshold;
        agent[self]
            .elements
            .set(index, PropertyValue::Data(value.unbind()), threshold);
    }

    /// Set the length directly, truncating or extending with holes.
    pub(crate) fn set_len(self, agent: &mut Agent, new_len: u32) {
        let threshold = agent.options.sparse_array_threshold;
        agent[self].elements.set_len(new_len, threshold);
    }
}

/// Whether any object on the prototype chain of `object` (excluding
/// `object` itself) may have an integer-keyed property.
pub(crate) fn prototype_chain_has_indexed_properties(agent: &Agent, object: Object) -> bool {
    let mut current = object.internal_get_prototype_of(agent);
    while let Some(prototype) = current {
        let has_indexed = match prototype {
            Object::Array(array) => agent[array].elements.has_elements(),
            Object::Object(object) => agent[object]
                .properties
                .keys()
                .any(|key| key.is_integer()),
            Object::ArrayBuffer(_) | Object::ArrayIterator(_) | Object::Error(_) | Object::Function(_) => {
                prototype
                    .get_backing_object(agent)
                    .is_some_and(|backing_object| {
                        agent[backing_object]
                            .properties
                            .keys()
                            .any(|key| key.is_integer())
                    })
            }
            _ => true,
        };
        if has_indexed {
            return true;
        }
        current = prototype.internal_get_prototype_of(agent);
    }
    false
}

impl<'a> InternalSlots<'a> for Array<'a> {
    fn default_prototype(self) -> ProtoIntrinsics {
        ProtoIntrinsics::Array
    }

    fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject<'static>> {
        agent[self].backing_object
    }

    fn set_backing_object(self, agent: &mut Agent, backing_object: OrdinaryObject<'static>) {
        assert!(agent[self].backing_object.replace(backing_object).is_none());
    }
}

fn is_length_key(property_key: PropertyKey) -> bool {
    property_key == PropertyKey::from(BUILTIN_STRING_MEMORY.length)
}

impl<'a> InternalMethods<'a> for Array<'a> {
    fn internal_get_own_property<'gc>(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        gc: NoGcScope<'gc, '_>,
    ) -> Option<PropertyValue<'gc>> {
        if let Some(index) = property_key.as_array_index() {
            return self.get_element(agent, index).map(|value| value.bind(gc));
        }
        if is_length_key(property_key) {
            return Some(PropertyValue::Data(self.len(agent).into()));
        }
        let backing_object = self.get_backing_object(agent)?;
        backing_object.internal_get_own_property(agent, property_key, gc)
    }

    fn internal_has_own_property(self, agent: &Agent, property_key: PropertyKey) -> bool {
        if let Some(index) = property_key.as_array_index() {
            return agent[self].elements.has(index);
        }
        if is_length_key(property_key) {
            return true;
        }
        self.get_backing_object(agent)
            .is_some_and(|backing_object| backing_object.internal_has_own_property(agent, property_key))
    }

    /// ### [10.4.2.1 \[\[DefineOwnProperty\]\] ( P, Desc )](https://tc39.es/ecma262/#sec-array-exotic-objects-defineownproperty-p-desc)
    fn internal_define_own_property<'gc>(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        property_value: PropertyValue,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, bool> {
        // 1. If P is "length", then
        if is_length_key(property_key) {
            // a. Return ? ArraySetLength(A, Desc).
            return match property_value {
                PropertyValue::Data(value) => array_set_length(agent, self, value, gc),
                PropertyValue::Accessor { .. } => Ok(false),
            };
        }
        // 2. Else if P is an array index, then
        if let Some(index) = property_key.as_array_index() {
            // k. If index ≥ length, then
            //   i. Set lengthDesc.[[Value]] to index + 1𝔽.
            // Storing into an accessor converts the elements to a dictionary.
            let threshold = agent.options.sparse_array_threshold;
            agent[self]
                .elements
                .set(index, property_value.unbind(), threshold);
            // l. Return true.
            return Ok(true);
        }
        // 3. Return ? OrdinaryDefineOwnProperty(A, P, Desc).
        let backing_object = self.get_or_create_backing_object(agent);
        backing_object.internal_define_own_property(agent, property_key, property_value, gc)
    }

    fn internal_delete(self, agent: &mut Agent, property_key: PropertyKey) -> bool {
        if let Some(index) = property_key.as_array_index() {
            agent[self].elements.delete(index);
            return true;
        }
        if is_length_key(property_key) {
            // "length" is non-configurable.
            return false;
        }
        if let Some(backing_object) = self.get_backing_object(agent) {
            backing_object.internal_delete(agent, property_key);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::{
        abstract_operations::operations_on_objects::{get, set},
        execution::Options,
        types::IntoObject,
    };

    #[test]
    fn length_is_an_own_property() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let array = Array::from_slice(agent, &[Value::Number(1.0), Value::Null], gc.nogc()).unbind();
            let length = get(
                agent,
                array.into_object(),
                BUILTIN_STRING_MEMORY.length.into(),
                gc.reborrow(),
            )
            .unwrap();
            assert_eq!(length, Value::Number(2.0));
            assert!(array.internal_has_own_property(agent, BUILTIN_STRING_MEMORY.length.into()));
            assert!(!array.internal_delete(agent, BUILTIN_STRING_MEMORY.length.into()));
        });
    }

    #[test]
    fn writing_past_the_end_grows_the_array() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let array = Array::from_slice(agent, &[], gc.nogc()).unbind();
            set(
                agent,
                array.into_object(),
                PropertyKey::from(4u32),
                Value::Boolean(true),
                true,
                gc.reborrow(),
            )
            .unwrap();
            assert_eq!(array.len(agent), 5);
            assert_eq!(array.elements_kind(agent), Some(ElementsKind::Holey));
            assert!(array.is_fast_path_eligible(agent));
        });
    }

    #[test]
    fn holey_arrays_lose_eligibility_when_the_prototype_has_elements() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let array = Array::from_slice(agent, &[Value::Number(1.0)], gc.nogc()).unbind();
            array.set_len(agent, 3);
            assert!(array.is_fast_path_eligible(agent));
            let array_prototype = agent.intrinsics().array_prototype();
            array_prototype.set_data_property(agent, PropertyKey::from(1u32), Value::Number(7.0));
            assert!(!array.is_fast_path_eligible(agent));
            agent[array_prototype]
                .properties
                .remove(&PropertyKey::from(1u32));
            assert!(array.is_fast_path_eligible(agent));
        });
    }

    #[test]
    fn shared_copies_do_not_observe_each_other() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let a = Array::from_slice(agent, &[Value::Number(1.0), Value::Number(2.0)], gc.nogc()).unbind();
            let b = a.shared_copy(agent, gc.nogc()).unwrap().unbind();
            b.set_element(agent, 0, Value::Number(5.0));
            assert_eq!(a.get_element(agent, 0), Some(PropertyValue::Data(Value::Number(1.0))));
            assert_eq!(b.get_element(agent, 0), Some(PropertyValue::Data(Value::Number(5.0))));
        });
    }

    #[test]
    fn disabled_fast_paths_are_never_eligible() {
        let mut agent = Agent::new(Options {
            disable_fast_paths: true,
            ..Options::default()
        });
        agent.run(|agent, gc| {
            let array = Array::from_slice(agent, &[Value::Number(1.0)], gc.nogc());
            assert!(!array.is_fast_path_eligible(agent));
        });
    }
}
