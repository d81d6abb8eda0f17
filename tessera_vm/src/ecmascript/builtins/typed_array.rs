// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [23.2 TypedArray Objects](https://tc39.es/ecma262/#sec-typedarray-objects)
//!
//! A TypedArray is a view of elements of one [`ElementType`] over a range of
//! an [`ArrayBuffer`]. The element type is carried in the handle's variant;
//! the view's offset and length live in the heap.

use std::ops::{Index, IndexMut};

use crate::{
    ecmascript::{
        abstract_operations::type_conversion::{canonical_numeric_index_string, to_big_int, to_number},
        builtins::ArrayBuffer,
        execution::{Agent, JsResult, ProtoIntrinsics},
        types::{
            BigInt, ElementType, ElementValue, InternalMethods, InternalSlots, Object, OrdinaryObject,
            PropertyKey, PropertyValue, Value, Viewable, ordinary_get, ordinary_has_property,
            ordinary_set,
        },
    },
    engine::context::{Bindable, GcScope, NoGcScope, bindable_handle},
    heap::{CreateHeapData, Heap, indexes::TypedArrayIndex},
};

/// Evaluate an expression with `$T` aliased to the [`Viewable`] element type
/// matching an [`ElementType`].
///
/// ```ignore
/// let size = with_typed_array_viewable!(element_type, size_of::<T>(), T);
/// ```
macro_rules! with_typed_array_viewable {
    ($element_type: expr, $expr: expr, $T: ident) => {{
        use $crate::ecmascript::types::ElementType;
        match $element_type {
            ElementType::Int8 => {
                type $T = i8;
                $expr
            }
            ElementType::Uint8 => {
                type $T = u8;
                $expr
            }
            ElementType::Uint8Clamped => {
                type $T = $crate::ecmascript::types::U8Clamped;
                $expr
            }
            ElementType::Int16 => {
                type $T = i16;
                $expr
            }
            ElementType::Uint16 => {
                type $T = u16;
                $expr
            }
            ElementType::Int32 => {
                type $T = i32;
                $expr
            }
            ElementType::Uint32 => {
                type $T = u32;
                $expr
            }
            ElementType::BigInt64 => {
                type $T = i64;
                $expr
            }
            ElementType::BigUint64 => {
                type $T = u64;
                $expr
            }
            ElementType::Float32 => {
                type $T = f32;
                $expr
            }
            ElementType::Float64 => {
                type $T = f64;
                $expr
            }
        }
    }};
}
pub(crate) use with_typed_array_viewable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypedArray<'a> {
    Int8Array(TypedArrayIndex<'a>),
    Uint8Array(TypedArrayIndex<'a>),
    Uint8ClampedArray(TypedArrayIndex<'a>),
    Int16Array(TypedArrayIndex<'a>),
    Uint16Array(TypedArrayIndex<'a>),
    Int32Array(TypedArrayIndex<'a>),
    Uint32Array(TypedArrayIndex<'a>),
    BigInt64Array(TypedArrayIndex<'a>),
    BigUint64Array(TypedArrayIndex<'a>),
    Float32Array(TypedArrayIndex<'a>),
    Float64Array(TypedArrayIndex<'a>),
}
bindable_handle!(TypedArray);

#[derive(Debug)]
pub struct TypedArrayHeapData {
    /// \[\[ViewedArrayBuffer\]\]
    pub(crate) viewed_array_buffer: ArrayBuffer<'static>,
    /// \[\[ByteOffset\]\]
    pub(crate) byte_offset: usize,
    /// \[\[ArrayLength\]\]; `None` for a length-tracking view of a resizable
    /// buffer.
    pub(crate) array_length: Option<usize>,
    /// \[\[TypedArrayName\]\]
    pub(crate) element_type: ElementType,
    pub(crate) backing_object: Option<OrdinaryObject<'static>>,
}

impl CreateHeapData<TypedArrayHeapData, TypedArray<'static>> for Heap {
    fn create(&mut self, data: TypedArrayHeapData) -> TypedArray<'static> {
        let element_type = data.element_type;
        self.typed_arrays.push(data);
        TypedArray::from_parts(element_type, TypedArrayIndex::last(&self.typed_arrays))
    }
}

impl Index<TypedArray<'_>> for Agent {
    type Output = TypedArrayHeapData;

    fn index(&self, index: TypedArray<'_>) -> &Self::Output {
        &self.heap.typed_arrays[index.get_index().into_index()]
    }
}

impl IndexMut<TypedArray<'_>> for Agent {
    fn index_mut(&mut self, index: TypedArray<'_>) -> &mut Self::Output {
        &mut self.heap.typed_arrays[index.get_index().into_index()]
    }
}

impl<'a> TypedArray<'a> {
    fn from_parts(element_type: ElementType, index: TypedArrayIndex<'a>) -> Self {
        match element_type {
            ElementType::Int8 => Self::Int8Array(index),
            ElementType::Uint8 => Self::Uint8Array(index),
            ElementType::Uint8Clamped => Self::Uint8ClampedArray(index),
            ElementType::Int16 => Self::Int16Array(index),
            ElementType::Uint16 => Self::Uint16Array(index),
            ElementType::Int32 => Self::Int32Array(index),
            ElementType::Uint32 => Self::Uint32Array(index),
            ElementType::BigInt64 => Self::BigInt64Array(index),
            ElementType::BigUint64 => Self::BigUint64Array(index),
            ElementType::Float32 => Self::Float32Array(index),
            ElementType::Float64 => Self::Float64Array(index),
        }
    }

    const fn get_index(self) -> TypedArrayIndex<'a> {
        match self {
            Self::Int8Array(index)
            | Self::Uint8Array(index)
            | Self::Uint8ClampedArray(index)
            | Self::Int16Array(index)
            | Self::Uint16Array(index)
            | Self::Int32Array(index)
            | Self::Uint32Array(index)
            | Self::BigInt64Array(index)
            | Self::BigUint64Array(index)
            | Self::Float32Array(index)
            | Self::Float64Array(index) => index,
        }
    }

    /// \[\[TypedArrayName\]\]
    pub const fn element_type(self) -> ElementType {
        match self {
            Self::Int8Array(_) => ElementType::Int8,
            Self::Uint8Array(_) => ElementType::Uint8,
            Self::Uint8ClampedArray(_) => ElementType::Uint8Clamped,
            Self::Int16Array(_) => ElementType::Int16,
            Self::Uint16Array(_) => ElementType::Uint16,
            Self::Int32Array(_) => ElementType::Int32,
            Self::Uint32Array(_) => ElementType::Uint32,
            Self::BigInt64Array(_) => ElementType::BigInt64,
            Self::BigUint64Array(_) => ElementType::BigUint64,
            Self::Float32Array(_) => ElementType::Float32,
            Self::Float64Array(_) => ElementType::Float64,
        }
    }

    pub const fn element_size(self) -> usize {
        self.element_type().element_size()
    }

    /// \[\[ContentType\]\] is BigInt.
    pub const fn is_bigint(self) -> bool {
        self.element_type().is_bigint()
    }

    /// \[\[ViewedArrayBuffer\]\]
    pub fn viewed_array_buffer(self, agent: &Agent) -> ArrayBuffer<'a> {
        agent[self].viewed_array_buffer
    }

    /// \[\[ArrayLength\]\] as stored; `None` for length-tracking views.
    pub(crate) fn array_length(self, agent: &Agent) -> Option<usize> {
        agent[self].array_length
    }

    /// ### [10.4.5.13 IsTypedArrayOutOfBounds ( taRecord )](https://tc39.es/ecma262/#sec-istypedarrayoutofbounds)
    ///
    /// True also for views over a detached buffer.
    pub fn is_out_of_bounds(self, agent: &Agent) -> bool {
        let data = &agent[self];
        let buffer = data.viewed_array_buffer;
        // 2. If IsDetachedBuffer(O.[[ViewedArrayBuffer]]) is true, return true.
        if buffer.is_detached(agent) {
            return true;
        }
        // 3. Let byteOffsetStart be O.[[ByteOffset]].
        let byte_offset_start = data.byte_offset;
        // 4. If O.[[ArrayLength]] is AUTO, then
        //   a. Let byteOffsetEnd be bufferByteLength.
        // 5. Else,
        //   b. Let byteOffsetEnd be byteOffsetStart + O.[[ArrayLength]] × elementSize.
        let buffer_byte_length = buffer.byte_length(agent);
        let byte_offset_end = match data.array_length {
            None => buffer_byte_length,
            Some(array_length) => checked_byte_end(byte_offset_start, array_length, self.element_size()),
        };
        // 6. If byteOffsetStart > bufferByteLength or byteOffsetEnd >
        //    bufferByteLength, return true.
        // 8. Return false.
        byte_offset_start > buffer_byte_length || byte_offset_end > buffer_byte_length
    }

    /// ### [10.4.5.12 TypedArrayLength ( taRecord )](https://tc39.es/ecma262/#sec-typedarraylength)
    ///
    /// Zero for views that are out of bounds or detached.
    pub fn length(self, agent: &Agent) -> usize {
        if self.is_out_of_bounds(agent) {
            return 0;
        }
        let data = &agent[self];
        // 2. If O.[[ArrayLength]] is not AUTO, return O.[[ArrayLength]].
        if let Some(array_length) = data.array_length {
            return array_length;
        }
        // 5. Let byteOffset be O.[[ByteOffset]].
        // 6. Let elementSize be TypedArrayElementSize(O).
        // 7. Let byteLength be taRecord.[[CachedBufferByteLength]].
        // 9. Return floor((byteLength - byteOffset) / elementSize).
        let byte_length = data.viewed_array_buffer.byte_length(agent);
        (byte_length - data.byte_offset) / self.element_size()
    }

    /// ### [10.4.5.11 TypedArrayByteLength ( taRecord )](https://tc39.es/ecma262/#sec-typedarraybytelength)
    pub fn byte_length(self, agent: &Agent) -> usize {
        self.length(agent) * self.element_size()
    }

    /// \[\[ByteOffset\]\], or zero for views that are out of bounds.
    pub fn byte_offset(self, agent: &Agent) -> usize {
        if self.is_out_of_bounds(agent) {
            0
        } else {
            agent[self].byte_offset
        }
    }

    /// The stored \[\[ByteOffset\]\], valid while the view is in bounds.
    pub(crate) fn raw_byte_offset(self, agent: &Agent) -> usize {
        agent[self].byte_offset
    }

    /// ### [10.4.5.14 IsTypedArrayFixedLength ( O )](https://tc39.es/ecma262/#sec-istypedarrayfixedlength)
    pub fn is_fixed_length(self, agent: &Agent) -> bool {
        let data = &agent[self];
        // 1. If O.[[ArrayLength]] is AUTO, return false.
        if data.array_length.is_none() {
            return false;
        }
        // 2. Let buffer be O.[[ViewedArrayBuffer]].
        // 3. If IsFixedLengthArrayBuffer(buffer) is false and
        //    IsSharedArrayBuffer(buffer) is false, return false.
        let buffer = data.viewed_array_buffer;
        buffer.is_fixed_length(agent) || buffer.is_shared(agent)
    }

    /// ### [10.4.5.15 IsValidIntegerIndex ( O, index )](https://tc39.es/ecma262/#sec-isvalidintegerindex)
    ///
    /// Returns the index as a `usize` if it is valid.
    pub(crate) fn is_valid_integer_index(self, agent: &Agent, index: i64) -> Option<usize> {
        // 1. If IsDetachedBuffer(O.[[ViewedArrayBuffer]]) is true, return false.
        // 2. If IsIntegralNumber(index) is false, return false.
        // 3. If index is -0𝔽, return false.
        // 7. If ℝ(index) < 0 or ℝ(index) ≥ length, return false.
        let index = usize::try_from(index).ok()?;
        (index < self.length(agent)).then_some(index)
    }

    /// Byte index of an element, for an index already known to be valid.
    pub(crate) fn element_byte_index(self, agent: &Agent, index: usize) -> usize {
        checked_byte_end(agent[self].byte_offset, index, self.element_size())
    }

    /// ### [10.4.5.16 TypedArrayGetElement ( O, index )](https://tc39.es/ecma262/#sec-typedarraygetelement)
    ///
    /// `None` for indexes outside of the view.
    pub fn get_element<'gc>(
        self,
        agent: &mut Agent,
        index: i64,
        gc: NoGcScope<'gc, '_>,
    ) -> Option<Value<'gc>> {
        let value = self.get_element_value(agent, index)?;
        Some(element_value_to_value(agent, value, gc))
    }

    /// TypedArrayGetElement without converting the element to a Value.
    pub(crate) fn get_element_value(self, agent: &Agent, index: i64) -> Option<ElementValue> {
        // 1. If IsValidIntegerIndex(O, index) is false, return undefined.
        let index = self.is_valid_integer_index(agent, index)?;
        // 2. Let offset be O.[[ByteOffset]].
        // 3. Let elementSize be TypedArrayElementSize(O).
        // 4. Let byteIndexInBuffer be (ℝ(index) × elementSize) + offset.
        let byte_index = self.element_byte_index(agent, index);
        // 6. Return GetValueFromBuffer(O.[[ViewedArrayBuffer]],
        //    byteIndexInBuffer, elementType, true, unordered).
        get_value_from_buffer(agent, self.viewed_array_buffer(agent), byte_index, self.element_type())
    }

    /// ### [10.4.5.17 TypedArraySetElement ( O, index, value )](https://tc39.es/ecma262/#sec-typedarraysetelement)
    ///
    /// > Note
    /// >
    /// > This operation always appears to succeed, but it has no effect when
    /// > attempting to write past the end of a TypedArray or to a TypedArray
    /// > which is backed by a detached ArrayBuffer.
    pub fn set_element<'gc>(
        self,
        agent: &mut Agent,
        index: i64,
        value: Value,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, ()> {
        let o = self.unbind();
        // 1. If O.[[ContentType]] is BIGINT, let numValue be ? ToBigInt(value).
        // 2. Otherwise, let numValue be ? ToNumber(value).
        let num_value = to_element_value(agent, value, o.is_bigint(), gc)?;
        // 3. If IsValidIntegerIndex(O, index) is true, then
        o.set_element_value(agent, index, num_value);
        // 4. Return UNUSED.
        Ok(())
    }

    /// Step 3 of TypedArraySetElement: store an already coerced value if the
    /// index is valid.
    pub(crate) fn set_element_value(self, agent: &mut Agent, index: i64, value: ElementValue) {
        if let Some(index) = self.is_valid_integer_index(agent, index) {
            let byte_index = self.element_byte_index(agent, index);
            set_value_in_buffer(agent, self.viewed_array_buffer(agent), byte_index, self.element_type(), value);
        }
    }
}

#[cold]
#[inline(never)]
fn handle_byte_range_overflow() -> ! {
    panic!("TypedArray byte range arithmetic overflowed")
}

/// `offset + count × element_size`, or `None` if that does not fit a `usize`.
pub(crate) fn byte_end(offset: usize, count: usize, element_size: usize) -> Option<usize> {
    count
        .checked_mul(element_size)
        .and_then(|bytes| bytes.checked_add(offset))
}

/// [`byte_end`] for ranges inside a buffer that already exists, where
/// overflow means a view's bounds were never validated.
pub(crate) fn checked_byte_end(offset: usize, count: usize, element_size: usize) -> usize {
    match byte_end(offset, count, element_size) {
        Some(end) => end,
        None => handle_byte_range_overflow(),
    }
}

/// Read one element of the given type from a buffer.
pub(crate) fn get_value_from_buffer(
    agent: &Agent,
    buffer: ArrayBuffer,
    byte_index: usize,
    element_type: ElementType,
) -> Option<ElementValue> {
    with_typed_array_viewable!(
        element_type,
        buffer.get_value::<T>(agent, byte_index).map(Viewable::into_element),
        T
    )
}

/// Write one element of the given type into a buffer.
pub(crate) fn set_value_in_buffer(
    agent: &mut Agent,
    buffer: ArrayBuffer,
    byte_index: usize,
    element_type: ElementType,
    value: ElementValue,
) {
    with_typed_array_viewable!(
        element_type,
        buffer.set_value::<T>(agent, byte_index, T::from_element(value)),
        T
    )
}

/// Coerce a value for storing into a view with the given content type.
pub(crate) fn to_element_value<'gc>(
    agent: &mut Agent,
    value: Value,
    is_bigint: bool,
    gc: GcScope<'gc, '_>,
) -> JsResult<'gc, ElementValue> {
    if is_bigint {
        let value = to_big_int(agent, value, gc)?;
        Ok(ElementValue::BigInt(value.to_big_uint64(agent) as i128))
    } else {
        Ok(ElementValue::Number(to_number(agent, value, gc)?))
    }
}

/// Convert a primitive to an element value without calling into user code.
/// `None` if the value is not of the given content type.
pub(crate) fn primitive_to_element_value(agent: &Agent, value: Value, is_bigint: bool) -> Option<ElementValue> {
    match value {
        Value::Number(n) if !is_bigint => Some(ElementValue::Number(n)),
        Value::BigInt(b) if is_bigint => i128::try_from(b.data(agent)).ok().map(ElementValue::BigInt),
        _ => None,
    }
}

pub(crate) fn element_value_to_value<'gc>(
    agent: &mut Agent,
    value: ElementValue,
    gc: NoGcScope<'gc, '_>,
) -> Value<'gc> {
    match value {
        ElementValue::Number(n) => Value::Number(n),
        ElementValue::BigInt(n) => BigInt::from_num_bigint(agent, n.into(), gc).into(),
    }
}

/// Integer-indexed keys of a TypedArray: integer keys, or canonical numeric
/// strings that can never name an element.
enum TypedArrayKey {
    Index(i64),
    NotAnIndex,
}

fn typed_array_key(agent: &Agent, property_key: PropertyKey) -> Option<TypedArrayKey> {
    match property_key {
        PropertyKey::Integer(index) => Some(TypedArrayKey::Index(index as i64)),
        PropertyKey::String(key) => {
            canonical_numeric_index_string(key.as_str(agent)).map(|_| TypedArrayKey::NotAnIndex)
        }
        PropertyKey::Symbol(_) => None,
    }
}

impl<'a> TryFrom<Value<'a>> for TypedArray<'a> {
    type Error = ();

    fn try_from(value: Value<'a>) -> Result<Self, ()> {
        Object::try_from(value).and_then(TypedArray::try_from)
    }
}

impl<'a> TryFrom<Object<'a>> for TypedArray<'a> {
    type Error = ();

    fn try_from(value: Object<'a>) -> Result<Self, ()> {
        match value {
            Object::Int8Array(t) => Ok(Self::Int8Array(t)),
            Object::Uint8Array(t) => Ok(Self::Uint8Array(t)),
            Object::Uint8ClampedArray(t) => Ok(Self::Uint8ClampedArray(t)),
            Object::Int16Array(t) => Ok(Self::Int16Array(t)),
            Object::Uint16Array(t) => Ok(Self::Uint16Array(t)),
            Object::Int32Array(t) => Ok(Self::Int32Array(t)),
            Object::Uint32Array(t) => Ok(Self::Uint32Array(t)),
            Object::BigInt64Array(t) => Ok(Self::BigInt64Array(t)),
            Object::BigUint64Array(t) => Ok(Self::BigUint64Array(t)),
            Object::Float32Array(t) => Ok(Self::Float32Array(t)),
            Object::Float64Array(t) => Ok(Self::Float64Array(t)),
            _ => Err(()),
        }
    }
}

impl<'a> InternalSlots<'a> for TypedArray<'a> {
    fn default_prototype(self) -> ProtoIntrinsics {
        ProtoIntrinsics::TypedArray(self.element_type())
    }

    fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject<'static>> {
        agent[self].backing_object
    }

    fn set_backing_object(self, agent: &mut Agent, backing_object: OrdinaryObject<'static>) {
        assert!(agent[self].backing_object.replace(backing_object).is_none());
    }
}

/// ### [10.4.5 TypedArray Exotic Objects](https://tc39.es/ecma262/#sec-typedarray-exotic-objects)
impl<'a> InternalMethods<'a> for TypedArray<'a> {
    /// ### [10.4.5.1 \[\[GetOwnProperty\]\] ( P )](https://tc39.es/ecma262/#sec-typedarray-getownproperty)
    fn internal_get_own_property<'gc>(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        gc: NoGcScope<'gc, '_>,
    ) -> Option<PropertyValue<'gc>> {
        // 1. If P is a String, then
        //   a. Let numericIndex be CanonicalNumericIndexString(P).
        //   b. If numericIndex is not undefined, then
        match typed_array_key(agent, property_key) {
            // i. Let value be TypedArrayGetElement(O, numericIndex).
            // ii. If value is undefined, return undefined.
            // iii. Return the PropertyDescriptor { [[Value]]: value, ... }.
            Some(TypedArrayKey::Index(index)) => self.get_element(agent, index, gc).map(PropertyValue::Data),
            Some(TypedArrayKey::NotAnIndex) => None,
            // 2. Return OrdinaryGetOwnProperty(O, P).
            None => {
                let backing_object = self.get_backing_object(agent)?;
                agent[backing_object]
                    .properties
                    .get(&property_key.unbind())
                    .map(|value| value.bind(gc))
            }
        }
    }

    fn internal_has_own_property(self, agent: &Agent, property_key: PropertyKey) -> bool {
        match typed_array_key(agent, property_key) {
            Some(TypedArrayKey::Index(index)) => self.is_valid_integer_index(agent, index).is_some(),
            Some(TypedArrayKey::NotAnIndex) => false,
            None => self.get_backing_object(agent).is_some_and(|backing_object| {
                agent[backing_object]
                    .properties
                    .contains_key(&property_key.unbind())
            }),
        }
    }

    /// ### [10.4.5.4 \[\[DefineOwnProperty\]\] ( P, Desc )](https://tc39.es/ecma262/#sec-typedarray-defineownproperty)
    fn internal_define_own_property<'gc>(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        property_value: PropertyValue,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, bool> {
        match typed_array_key(agent, property_key) {
            Some(TypedArrayKey::Index(index)) => {
                // i. If IsValidIntegerIndex(O, numericIndex) is false, return false.
                if self.is_valid_integer_index(agent, index).is_none() {
                    return Ok(false);
                }
                // iv. If IsAccessorDescriptor(Desc) is true, return false.
                let PropertyValue::Data(value) = property_value else {
                    return Ok(false);
                };
                // vi. If Desc has a [[Value]] field, perform ?
                //     TypedArraySetElement(O, numericIndex, Desc.[[Value]]).
                self.set_element(agent, index, value, gc)?;
                // vii. Return true.
                Ok(true)
            }
            Some(TypedArrayKey::NotAnIndex) => Ok(false),
            // 2. Return ! OrdinaryDefineOwnProperty(O, P, Desc).
            None => {
                let backing_object = self.get_or_create_backing_object(agent);
                agent[backing_object]
                    .properties
                    .insert(property_key.unbind(), property_value.unbind());
                Ok(true)
            }
        }
    }

    /// ### [10.4.5.3 \[\[HasProperty\]\] ( P )](https://tc39.es/ecma262/#sec-typedarray-hasproperty)
    fn internal_has_property(self, agent: &Agent, property_key: PropertyKey) -> bool {
        match typed_array_key(agent, property_key) {
            // b. If numericIndex is not undefined, return IsValidIntegerIndex(O, numericIndex).
            Some(TypedArrayKey::Index(index)) => self.is_valid_integer_index(agent, index).is_some(),
            Some(TypedArrayKey::NotAnIndex) => false,
            // 2. Return ? OrdinaryHasProperty(O, P).
            None => ordinary_has_property(agent, self.into(), property_key),
        }
    }

    /// ### [10.4.5.5 \[\[Get\]\] ( P, Receiver )](https://tc39.es/ecma262/#sec-typedarray-get)
    fn internal_get<'gc>(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        receiver: Value,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        match typed_array_key(agent, property_key) {
            // i. Return TypedArrayGetElement(O, numericIndex).
            Some(TypedArrayKey::Index(index)) => Ok(self
                .unbind()
                .get_element(agent, index, gc.into_nogc())
                .unwrap_or(Value::Undefined)),
            Some(TypedArrayKey::NotAnIndex) => Ok(Value::Undefined),
            // 2. Return ? OrdinaryGet(O, P, Receiver).
            None => ordinary_get(agent, self.into(), property_key, receiver, gc),
        }
    }

    /// ### [10.4.5.6 \[\[Set\]\] ( P, V, Receiver )](https://tc39.es/ecma262/#sec-typedarray-set)
    fn internal_set<'gc>(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        value: Value,
        receiver: Value,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, bool> {
        let is_receiver = receiver == Value::from(self);
        match typed_array_key(agent, property_key) {
            Some(TypedArrayKey::Index(index)) => {
                // i. If SameValue(O, Receiver) is true, then
                if is_receiver {
                    // 1. Perform ? TypedArraySetElement(O, numericIndex, V).
                    self.set_element(agent, index, value, gc)?;
                    // 2. Return true.
                    return Ok(true);
                }
                // ii. If IsValidIntegerIndex(O, numericIndex) is false, return true.
                if self.is_valid_integer_index(agent, index).is_none() {
                    return Ok(true);
                }
            }
            Some(TypedArrayKey::NotAnIndex) => {
                if is_receiver {
                    // The value is still coerced even though no element is
                    // written.
                    to_element_value(agent, value, self.is_bigint(), gc)?;
                }
                return Ok(true);
            }
            None => {}
        }
        // 2. Return ? OrdinarySet(O, P, V, Receiver).
        ordinary_set(agent, self.into(), property_key, value, receiver, gc)
    }

    /// ### [10.4.5.7 \[\[Delete\]\] ( P )](https://tc39.es/ecma262/#sec-typedarray-delete)
    fn internal_delete(self, agent: &mut Agent, property_key: PropertyKey) -> bool {
        match typed_array_key(agent, property_key) {
            // i. If IsValidIntegerIndex(O, numericIndex) is false, return true;
            //    else return false.
            Some(TypedArrayKey::Index(index)) => self.is_valid_integer_index(agent, index).is_none(),
            Some(TypedArrayKey::NotAnIndex) => true,
            // 2. Return ! OrdinaryDelete(O, P).
            None => {
                if let Some(backing_object) = self.get_backing_object(agent) {
                    agent[backing_object]
                        .properties
                        .remove(&property_key.unbind());
                }
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::{
        execution::Options,
        types::{BUILTIN_STRING_MEMORY, String},
    };

    fn create_view<'a>(
        agent: &mut Agent,
        element_type: ElementType,
        buffer: ArrayBuffer,
        byte_offset: usize,
        array_length: Option<usize>,
    ) -> TypedArray<'a> {
        agent.heap.create(TypedArrayHeapData {
            viewed_array_buffer: buffer.unbind(),
            byte_offset,
            array_length,
            element_type,
            backing_object: None,
        })
    }

    #[test]
    fn byte_ranges_report_overflow() {
        assert_eq!(byte_end(4, 3, 8), Some(28));
        assert_eq!(byte_end(0, usize::MAX, 2), None);
        assert_eq!(byte_end(usize::MAX, 1, 1), None);
    }

    #[test]
    fn views_share_their_buffer() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let buffer = ArrayBuffer::from_bytes(agent, &[0; 8], gc.nogc()).unwrap().unbind();
            let bytes = create_view(agent, ElementType::Uint8, buffer, 0, Some(8));
            let words = create_view(agent, ElementType::Uint16, buffer, 2, None);
            assert_eq!(words.length(agent), 3);
            words
                .set_element(agent, 0, Value::Number(0x0102 as f64), gc.reborrow())
                .unwrap();
            let low = u16::to_ne_bytes(0x0102);
            assert_eq!(bytes.get_element_value(agent, 2), Some(ElementValue::Number(low[0] as f64)));
            assert_eq!(bytes.get_element_value(agent, 3), Some(ElementValue::Number(low[1] as f64)));
        });
    }

    #[test]
    fn detached_views_are_empty() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let buffer = ArrayBuffer::from_bytes(agent, &[1, 2, 3, 4], gc.nogc()).unwrap();
            let view = create_view(agent, ElementType::Int8, buffer, 1, Some(2));
            assert_eq!(view.length(agent), 2);
            assert_eq!(view.byte_offset(agent), 1);
            buffer.detach(agent, gc.nogc()).unwrap();
            assert!(view.is_out_of_bounds(agent));
            assert_eq!(view.length(agent), 0);
            assert_eq!(view.byte_length(agent), 0);
            assert_eq!(view.byte_offset(agent), 0);
            assert_eq!(view.get_element_value(agent, 0), None);
        });
    }

    #[test]
    fn numeric_string_keys_never_reach_the_backing_object() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let buffer = ArrayBuffer::from_bytes(agent, &[7, 8], gc.nogc()).unwrap();
            let view = create_view(agent, ElementType::Uint8, buffer, 0, Some(2));
            let minus_one = PropertyKey::from_str(agent, "-1", gc.nogc()).unbind();
            let defined = view
                .internal_define_own_property(agent, minus_one, PropertyValue::Data(Value::Null), gc.reborrow())
                .unwrap();
            assert!(!defined);
            assert!(!view.internal_has_property(agent, minus_one));
            assert!(view.internal_has_property(agent, PropertyKey::from(1u32)));
            assert!(!view.internal_has_property(agent, PropertyKey::from(2u32)));
            assert!(!view.internal_delete(agent, PropertyKey::from(0u32)));
            let length: PropertyKey = BUILTIN_STRING_MEMORY.length.into();
            assert!(!view.internal_has_own_property(agent, length));
            let name = String::from_str(agent, "name", gc.nogc()).unbind();
            view.internal_define_own_property(
                agent,
                PropertyKey::from(name),
                PropertyValue::Data(Value::Boolean(true)),
                gc.reborrow(),
            )
            .unwrap();
            assert!(view.internal_has_own_property(agent, PropertyKey::from(name)));
        });
    }

    #[test]
    fn bigint_views_store_modulo_two_to_the_64() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let buffer = ArrayBuffer::from_bytes(agent, &[0; 8], gc.nogc()).unwrap().unbind();
            let signed = create_view(agent, ElementType::BigInt64, buffer, 0, Some(1));
            let unsigned = create_view(agent, ElementType::BigUint64, buffer, 0, Some(1));
            let minus_one = BigInt::from_i64(agent, -1, gc.nogc()).unbind();
            signed.set_element(agent, 0, minus_one.into(), gc.reborrow()).unwrap();
            assert_eq!(unsigned.get_element_value(agent, 0), Some(ElementValue::BigInt(u64::MAX as i128)));
            assert_eq!(signed.get_element_value(agent, 0), Some(ElementValue::BigInt(-1)));
            let error = signed
                .set_element(agent, 0, Value::Number(1.0), gc.reborrow())
                .unwrap_err();
            assert_eq!(agent.exception_type(error), Some(crate::ecmascript::execution::ExceptionType::TypeError));
        });
    }
}
