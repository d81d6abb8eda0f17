// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [6.2.9 Data Blocks](https://tc39.es/ecma262/#sec-data-blocks)

use core::{
    cmp::Ordering,
    fmt::Debug,
    ptr::{NonNull, read_unaligned, write_bytes, write_unaligned},
    sync::atomic::{self, AtomicU8, AtomicU16, AtomicU32, AtomicU64, AtomicUsize},
};
use std::{
    alloc::{Layout, alloc_zeroed, dealloc, handle_alloc_error},
    sync::Arc,
};

use crate::{
    ecmascript::execution::{Agent, ExceptionType, JsResult},
    engine::context::NoGcScope,
};

/// # Data Block
///
/// The Data Block specification type is used to describe a distinct and
/// mutable sequence of byte-sized (8 bit) numeric values. A Data Block value
/// is created with a fixed number of bytes that each have the initial value
/// 0.
///
/// The allocation is always aligned to 8 bytes so that any element type can
/// be viewed in place. Resizable buffers allocate their maximum byte length
/// up front; resizing never moves the data.
pub struct DataBlock {
    ptr: Option<NonNull<u8>>,
    byte_length: usize,
    capacity: usize,
}

impl Debug for DataBlock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DataBlock")
            .field("byte_length", &self.byte_length)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl Drop for DataBlock {
    fn drop(&mut self) {
        if let Some(ptr) = self.ptr {
            // SAFETY: The pointer was allocated with this same layout.
            unsafe { dealloc(ptr.as_ptr(), block_layout(self.capacity)) }
        }
    }
}

fn block_layout(capacity: usize) -> Layout {
    match Layout::from_size_align(capacity, 8) {
        Ok(layout) => layout,
        Err(_) => handle_layout_overflow(),
    }
}

fn allocate_zeroed(capacity: usize) -> Option<NonNull<u8>> {
    if capacity == 0 {
        return None;
    }
    let layout = block_layout(capacity);
    // SAFETY: Size of allocation is non-zero.
    let data = unsafe { alloc_zeroed(layout) };
    if data.is_null() {
        handle_alloc_error(layout);
    }
    debug_assert_eq!(data.align_offset(8), 0);
    NonNull::new(data)
}

impl DataBlock {
    pub fn new(byte_length: usize) -> Self {
        Self::new_with_capacity(byte_length, byte_length)
    }

    pub fn new_with_capacity(byte_length: usize, capacity: usize) -> Self {
        debug_assert!(capacity >= byte_length);
        Self {
            ptr: allocate_zeroed(capacity),
            byte_length,
            capacity,
        }
    }

    /// Copy host-provided bytes into a new block.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut block = Self::new(bytes.len());
        block.as_mut_slice().copy_from_slice(bytes);
        block
    }

    pub fn len(&self) -> usize {
        self.byte_length
    }

    pub fn is_empty(&self) -> bool {
        self.byte_length == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the byte length within the allocated capacity. Bytes beyond the
    /// new length are zeroed so that growing again observes zeroes.
    pub fn resize(&mut self, new_byte_length: usize) {
        assert!(new_byte_length <= self.capacity);
        let old_byte_length = self.byte_length;
        self.byte_length = new_byte_length;
        if new_byte_length < old_byte_length
            && let Some(data) = self.ptr
        {
            // SAFETY: The zeroed range is within the allocation.
            unsafe {
                write_bytes(
                    data.as_ptr().add(new_byte_length),
                    0,
                    old_byte_length - new_byte_length,
                )
            }
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        match self.ptr {
            // SAFETY: The allocation is initialised up to capacity and
            // byte_length never exceeds it.
            Some(data) => unsafe { core::slice::from_raw_parts(data.as_ptr(), self.byte_length) },
            None => &[],
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match self.ptr {
            // SAFETY: As above, and we hold the only reference.
            Some(data) => unsafe {
                core::slice::from_raw_parts_mut(data.as_ptr(), self.byte_length)
            },
            None => &mut [],
        }
    }

    /// Read one element at a byte offset. Returns `None` if the element does
    /// not fit within the block.
    pub fn get<T: Viewable>(&self, byte_offset: usize) -> Option<T> {
        let end = byte_offset.checked_add(size_of::<T>())?;
        if end > self.byte_length {
            return None;
        }
        let data = self.ptr?;
        // SAFETY: The read is fully within the initialised length.
        Some(unsafe { read_unaligned(data.as_ptr().add(byte_offset).cast::<T>()) })
    }

    /// Write one element at a byte offset. Writes that do not fit within the
    /// block are ignored.
    pub fn set<T: Viewable>(&mut self, byte_offset: usize, value: T) {
        let Some(end) = byte_offset.checked_add(size_of::<T>()) else {
            return;
        };
        if end > self.byte_length {
            return;
        }
        if let Some(data) = self.ptr {
            // SAFETY: The write is fully within the initialised length.
            unsafe { write_unaligned(data.as_ptr().add(byte_offset).cast::<T>(), value) }
        }
    }

    /// View `length` elements starting at `byte_offset` as a typed slice.
    ///
    /// The byte offset must be a multiple of the element size.
    pub fn view<T: Viewable>(&self, byte_offset: usize, length: usize) -> Option<&[T]> {
        debug_assert_eq!(byte_offset % size_of::<T>(), 0);
        let end = length
            .checked_mul(size_of::<T>())
            .and_then(|byte_length| byte_length.checked_add(byte_offset))?;
        if end > self.byte_length {
            return None;
        }
        let Some(data) = self.ptr else {
            return Some(&[]);
        };
        // SAFETY: The block is 8-aligned and the byte offset is a multiple of
        // the element size, so the pointer is aligned for T. The range is
        // within the initialised length and every bit pattern is a valid T.
        Some(unsafe { core::slice::from_raw_parts(data.as_ptr().add(byte_offset).cast::<T>(), length) })
    }

    pub fn view_mut<T: Viewable>(&mut self, byte_offset: usize, length: usize) -> Option<&mut [T]> {
        debug_assert_eq!(byte_offset % size_of::<T>(), 0);
        let end = length
            .checked_mul(size_of::<T>())
            .and_then(|byte_length| byte_length.checked_add(byte_offset))?;
        if end > self.byte_length {
            return None;
        }
        let Some(data) = self.ptr else {
            return Some(&mut []);
        };
        // SAFETY: As in `view`, and we hold the only reference.
        Some(unsafe {
            core::slice::from_raw_parts_mut(data.as_ptr().add(byte_offset).cast::<T>(), length)
        })
    }

    /// Overlap-safe byte move within the block.
    pub fn copy_within(&mut self, dst_byte_offset: usize, src_byte_offset: usize, byte_count: usize) {
        if byte_count == 0 {
            return;
        }
        let src_end = checked_end(src_byte_offset, byte_count);
        assert!(src_end <= self.byte_length && checked_end(dst_byte_offset, byte_count) <= self.byte_length);
        self.as_mut_slice()
            .copy_within(src_byte_offset..src_end, dst_byte_offset);
    }

    /// ### [6.2.9.1 CreateByteDataBlock ( size )](https://tc39.es/ecma262/#sec-createbytedatablock)
    ///
    /// `max_byte_length` is the capacity reserved for a resizable buffer.
    pub fn create_byte_data_block<'a>(
        agent: &mut Agent,
        size: u64,
        max_byte_length: Option<u64>,
        gc: NoGcScope<'a, '_>,
    ) -> JsResult<'a, Self> {
        let capacity = max_byte_length.unwrap_or(size);
        // 1. If size > 2**53 - 1, throw a RangeError exception.
        // 2. Let db be a new Data Block value consisting of size bytes. If it
        //    is impossible to create such a Data Block, throw a RangeError
        //    exception.
        if capacity > agent.options.max_array_buffer_byte_length as u64 {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::RangeError,
                "Array buffer allocation failed",
                gc,
            ));
        }
        // 3. Set all of the bytes of db to 0.
        // 4. Return db.
        Ok(Self::new_with_capacity(size as usize, capacity as usize))
    }

    /// ### [6.2.9.3 CopyDataBlockBytes ( toBlock, toIndex, fromBlock, fromIndex, count )](https://tc39.es/ecma262/#sec-copydatablockbytes)
    pub fn copy_data_block_bytes(&mut self, to_index: usize, from_block: &Self, from_index: usize, count: usize) {
        // 1. Assert: fromBlock and toBlock are distinct values.
        assert!(self.ptr.is_none() || self.ptr != from_block.ptr);
        // 3. Assert: fromIndex + count ≤ fromSize.
        let from_end = checked_end(from_index, count);
        // 5. Assert: toIndex + count ≤ toSize.
        let to_end = checked_end(to_index, count);
        // 6. Repeat, while count > 0,
        //   b. ii. Set toBlock[toIndex] to fromBlock[fromIndex].
        self.as_mut_slice()[to_index..to_end].copy_from_slice(&from_block.as_slice()[from_index..from_end]);
        // 7. Return UNUSED.
    }
}

/// Storage of a Shared Data Block. Every access goes through atomic lanes.
struct SharedStorage {
    ptr: Option<NonNull<u8>>,
    byte_length: AtomicUsize,
    capacity: usize,
}

// SAFETY: The bytes behind the pointer are only ever accessed atomically,
// and the allocation lives until the last reference is dropped.
unsafe impl Send for SharedStorage {}
// SAFETY: See above.
unsafe impl Sync for SharedStorage {}

impl Drop for SharedStorage {
    fn drop(&mut self) {
        if let Some(ptr) = self.ptr {
            // SAFETY: The pointer was allocated with this same layout.
            unsafe { dealloc(ptr.as_ptr(), block_layout(self.capacity)) }
        }
    }
}

/// # Shared Data Block
///
/// A reference counted Data Block that may be observed by other agents.
/// Shared blocks can only grow, and only within the capacity reserved at
/// creation.
#[derive(Clone)]
pub struct SharedDataBlock(Arc<SharedStorage>);

impl Debug for SharedDataBlock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharedDataBlock")
            .field("byte_length", &self.len())
            .field("capacity", &self.0.capacity)
            .finish()
    }
}

impl SharedDataBlock {
    /// ### [6.2.9.2 CreateSharedByteDataBlock ( size )](https://tc39.es/ecma262/#sec-createsharedbytedatablock)
    pub fn new_with_capacity(byte_length: usize, capacity: usize) -> Self {
        debug_assert!(capacity >= byte_length);
        Self(Arc::new(SharedStorage {
            ptr: allocate_zeroed(capacity),
            byte_length: AtomicUsize::new(byte_length),
            capacity,
        }))
    }

    pub fn len(&self) -> usize {
        self.0.byte_length.load(atomic::Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.0.capacity
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Grow the byte length. Fails if the new length is smaller than the
    /// current one or exceeds the capacity.
    pub fn grow(&self, new_byte_length: usize) -> bool {
        if new_byte_length > self.0.capacity {
            return false;
        }
        let mut current = self.len();
        loop {
            if new_byte_length < current {
                return false;
            }
            match self.0.byte_length.compare_exchange(
                current,
                new_byte_length,
                atomic::Ordering::SeqCst,
                atomic::Ordering::SeqCst,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }

    fn lane_ptr(&self, byte_index: usize, size: usize) -> *mut u8 {
        let Some(data) = self.0.ptr else {
            handle_shared_out_of_bounds()
        };
        if checked_end(byte_index, size) > self.len() || byte_index % size != 0 {
            handle_shared_out_of_bounds()
        }
        // SAFETY: Checked to be within the allocation.
        unsafe { data.as_ptr().add(byte_index) }
    }

    /// Unordered atomic load of one element.
    pub fn load<T: Viewable>(&self, byte_index: usize) -> T {
        let ptr = self.lane_ptr(byte_index, size_of::<T>());
        let order = atomic::Ordering::Relaxed;
        // SAFETY: The lane is aligned to its size and within the allocation,
        // and all access to shared storage is atomic.
        let bits = unsafe {
            match size_of::<T>() {
                1 => AtomicU8::from_ptr(ptr).load(order) as u64,
                2 => AtomicU16::from_ptr(ptr.cast()).load(order) as u64,
                4 => AtomicU32::from_ptr(ptr.cast()).load(order) as u64,
                8 => AtomicU64::from_ptr(ptr.cast()).load(order),
                _ => unreachable!(),
            }
        };
        T::from_bits(bits)
    }

    /// Unordered atomic store of one element.
    pub fn store<T: Viewable>(&self, byte_index: usize, value: T) {
        let ptr = self.lane_ptr(byte_index, size_of::<T>());
        let order = atomic::Ordering::Relaxed;
        let bits = value.to_bits();
        // SAFETY: As in `load`.
        unsafe {
            match size_of::<T>() {
                1 => AtomicU8::from_ptr(ptr).store(bits as u8, order),
                2 => AtomicU16::from_ptr(ptr.cast()).store(bits as u16, order),
                4 => AtomicU32::from_ptr(ptr.cast()).store(bits as u32, order),
                8 => AtomicU64::from_ptr(ptr.cast()).store(bits, order),
                _ => unreachable!(),
            }
        }
    }
}

fn checked_end(start: usize, count: usize) -> usize {
    match start.checked_add(count) {
        Some(end) => end,
        None => handle_index_overflow(),
    }
}

#[cold]
#[inline(never)]
fn handle_index_overflow() -> ! {
    panic!("Data block index arithmetic overflowed")
}

#[cold]
#[inline(never)]
fn handle_layout_overflow() -> ! {
    panic!("Data block capacity exceeds the maximum allocation size")
}

#[cold]
#[inline(never)]
fn handle_shared_out_of_bounds() -> ! {
    panic!("Shared data block access out of bounds or misaligned")
}

/// The element type tag of a typed view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    BigInt64,
    BigUint64,
    Float32,
    Float64,
}

impl ElementType {
    pub const fn element_size(self) -> usize {
        match self {
            ElementType::Int8 | ElementType::Uint8 | ElementType::Uint8Clamped => 1,
            ElementType::Int16 | ElementType::Uint16 => 2,
            ElementType::Int32 | ElementType::Uint32 | ElementType::Float32 => 4,
            ElementType::BigInt64 | ElementType::BigUint64 | ElementType::Float64 => 8,
        }
    }

    /// ### [\[\[ContentType\]\]](https://tc39.es/ecma262/#sec-properties-of-typedarray-instances)
    pub const fn is_bigint(self) -> bool {
        matches!(self, ElementType::BigInt64 | ElementType::BigUint64)
    }

    pub const fn name(self) -> &'static str {
        match self {
            ElementType::Int8 => "Int8Array",
            ElementType::Uint8 => "Uint8Array",
            ElementType::Uint8Clamped => "Uint8ClampedArray",
            ElementType::Int16 => "Int16Array",
            ElementType::Uint16 => "Uint16Array",
            ElementType::Int32 => "Int32Array",
            ElementType::Uint32 => "Uint32Array",
            ElementType::BigInt64 => "BigInt64Array",
            ElementType::BigUint64 => "BigUint64Array",
            ElementType::Float32 => "Float32Array",
            ElementType::Float64 => "Float64Array",
        }
    }

    pub const ALL: [ElementType; 11] = [
        ElementType::Int8,
        ElementType::Uint8,
        ElementType::Uint8Clamped,
        ElementType::Int16,
        ElementType::Uint16,
        ElementType::Int32,
        ElementType::Uint32,
        ElementType::BigInt64,
        ElementType::BigUint64,
        ElementType::Float32,
        ElementType::Float64,
    ];

    /// Position of the element type in [`ElementType::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A numeric value after Number or BigInt coercion, ready to be stored into
/// or just loaded from a typed view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementValue {
    Number(f64),
    /// The mathematical BigInt value. Stores keep its value modulo
    /// 2<sup>64</sup>.
    BigInt(i128),
}

/// A Uint8 lane with clamping conversion semantics.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct U8Clamped(pub u8);

mod private {
    use super::U8Clamped;

    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for U8Clamped {}
    impl Sealed for i8 {}
    impl Sealed for u16 {}
    impl Sealed for i16 {}
    impl Sealed for u32 {}
    impl Sealed for i32 {}
    impl Sealed for u64 {}
    impl Sealed for i64 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Element types that can be viewed in place inside a [`DataBlock`].
pub trait Viewable: private::Sealed + Copy + PartialEq + Debug + 'static {
    const ELEMENT_TYPE: ElementType;
    const IS_BIGINT: bool = false;
    const IS_FLOAT: bool = false;

    /// ### [25.1.3.17 NumericToRawBytes ( type, value, isLittleEndian )](https://tc39.es/ecma262/#sec-numerictorawbytes)
    ///
    /// Convert a coerced numeric value into this element type. A value of the
    /// wrong content type converts to zero; callers check the content type
    /// before coercing.
    fn from_element(value: ElementValue) -> Self;

    fn into_element(self) -> ElementValue;

    /// Exact conversion used by searches: `None` when no element of this type
    /// can be equal to the value.
    fn try_from_element(value: ElementValue) -> Option<Self>;

    fn to_bits(self) -> u64;
    fn from_bits(bits: u64) -> Self;

    /// Default sort order of %TypedArray%.prototype.sort.
    fn ecmascript_cmp(&self, other: &Self) -> Ordering;

    /// Whether the value is NaN. Only floats can be.
    fn is_nan(self) -> bool {
        false
    }
}

/// Truncate a Number to an integer modulo 2<sup>64</sup>, as the ToIntN
/// family of conversions do before narrowing.
fn f64_to_int_modulo(value: f64) -> u64 {
    if !value.is_finite() {
        return 0;
    }
    let value = value.trunc();
    if value.abs() < 9.223_372_036_854_775_807e18 {
        return value as i64 as u64;
    }
    const TWO_TO_64: f64 = 18_446_744_073_709_551_616.0;
    let mut modulo = value % TWO_TO_64;
    if modulo < 0.0 {
        modulo += TWO_TO_64;
    }
    modulo as u64
}

macro_rules! viewable_integer {
    ($type: ty, $element_type: ident) => {
        impl Viewable for $type {
            const ELEMENT_TYPE: ElementType = ElementType::$element_type;

            fn from_element(value: ElementValue) -> Self {
                match value {
                    ElementValue::Number(value) => f64_to_int_modulo(value) as $type,
                    ElementValue::BigInt(_) => 0,
                }
            }

            fn into_element(self) -> ElementValue {
                ElementValue::Number(self as f64)
            }

            fn try_from_element(value: ElementValue) -> Option<Self> {
                match value {
                    ElementValue::Number(value)
                        if value.trunc() == value
                            && value >= <$type>::MIN as f64
                            && value <= <$type>::MAX as f64 =>
                    {
                        Some(value as $type)
                    }
                    _ => None,
                }
            }

            fn to_bits(self) -> u64 {
                self as u64
            }

            fn from_bits(bits: u64) -> Self {
                bits as $type
            }

            fn ecmascript_cmp(&self, other: &Self) -> Ordering {
                self.cmp(other)
            }
        }
    };
}

viewable_integer!(i8, Int8);
viewable_integer!(u8, Uint8);
viewable_integer!(i16, Int16);
viewable_integer!(u16, Uint16);
viewable_integer!(i32, Int32);
viewable_integer!(u32, Uint32);

impl Viewable for U8Clamped {
    const ELEMENT_TYPE: ElementType = ElementType::Uint8Clamped;

    /// ### [7.1.12 ToUint8Clamp ( argument )](https://tc39.es/ecma262/#sec-touint8clamp)
    fn from_element(value: ElementValue) -> Self {
        match value {
            // 2. If number is NaN, return +0𝔽.
            ElementValue::Number(value) if value.is_nan() => U8Clamped(0),
            // 3. Let mv be the extended mathematical value of number.
            // 4. Let clamped be the result of clamping mv between 0 and 255.
            // 5. Let f be floor(clamped).
            // 6. If clamped < f + 0.5, return 𝔽(f).
            // 7. If clamped > f + 0.5, return 𝔽(f + 1).
            // 8. If f is even, return 𝔽(f). Otherwise, return 𝔽(f + 1).
            ElementValue::Number(value) => U8Clamped(value.clamp(0.0, 255.0).round_ties_even() as u8),
            ElementValue::BigInt(_) => U8Clamped(0),
        }
    }

    fn into_element(self) -> ElementValue {
        ElementValue::Number(self.0 as f64)
    }

    fn try_from_element(value: ElementValue) -> Option<Self> {
        u8::try_from_element(value).map(U8Clamped)
    }

    fn to_bits(self) -> u64 {
        self.0 as u64
    }

    fn from_bits(bits: u64) -> Self {
        U8Clamped(bits as u8)
    }

    fn ecmascript_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

macro_rules! viewable_bigint {
    ($type: ty, $element_type: ident) => {
        impl Viewable for $type {
            const ELEMENT_TYPE: ElementType = ElementType::$element_type;
            const IS_BIGINT: bool = true;

            fn from_element(value: ElementValue) -> Self {
                match value {
                    // Truncation keeps the value modulo 2^64.
                    ElementValue::BigInt(value) => value as $type,
                    ElementValue::Number(_) => 0,
                }
            }

            fn into_element(self) -> ElementValue {
                ElementValue::BigInt(self as i128)
            }

            fn try_from_element(value: ElementValue) -> Option<Self> {
                match value {
                    ElementValue::BigInt(value) => <$type>::try_from(value).ok(),
                    ElementValue::Number(_) => None,
                }
            }

            fn to_bits(self) -> u64 {
                self as u64
            }

            fn from_bits(bits: u64) -> Self {
                bits as $type
            }

            fn ecmascript_cmp(&self, other: &Self) -> Ordering {
                self.cmp(other)
            }
        }
    };
}

viewable_bigint!(i64, BigInt64);
viewable_bigint!(u64, BigUint64);

macro_rules! viewable_float {
    ($type: ty, $element_type: ident, $bits: ty) => {
        impl Viewable for $type {
            const ELEMENT_TYPE: ElementType = ElementType::$element_type;
            const IS_FLOAT: bool = true;

            fn from_element(value: ElementValue) -> Self {
                match value {
                    ElementValue::Number(value) => value as $type,
                    ElementValue::BigInt(_) => 0.0,
                }
            }

            fn into_element(self) -> ElementValue {
                ElementValue::Number(self as f64)
            }

            fn try_from_element(value: ElementValue) -> Option<Self> {
                match value {
                    ElementValue::Number(value) if value.is_nan() => Some(<$type>::NAN),
                    ElementValue::Number(value) if (value as $type) as f64 == value => {
                        Some(value as $type)
                    }
                    _ => None,
                }
            }

            fn to_bits(self) -> u64 {
                <$type>::to_bits(self) as u64
            }

            fn from_bits(bits: u64) -> Self {
                <$type>::from_bits(bits as $bits)
            }

            /// NaN sorts last and -0 sorts before +0.
            fn ecmascript_cmp(&self, other: &Self) -> Ordering {
                match (self.is_nan(), other.is_nan()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => match self.partial_cmp(other) {
                        Some(Ordering::Equal) => {
                            other.is_sign_negative().cmp(&self.is_sign_negative())
                        }
                        Some(ordering) => ordering,
                        None => unreachable!(),
                    },
                }
            }

            fn is_nan(self) -> bool {
                <$type>::is_nan(self)
            }
        }
    };
}

viewable_float!(f32, Float32, u32);
viewable_float!(f64, Float64, u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_data_block_is_zeroed_and_aligned() {
        let db = DataBlock::new(0);
        assert_eq!(db.len(), 0);
        assert_eq!(db.get::<u8>(0), None);

        let db = DataBlock::new_with_capacity(16, 32);
        assert_eq!(db.len(), 16);
        assert_eq!(db.capacity(), 32);
        assert!(db.as_slice().iter().all(|byte| *byte == 0));
        assert_eq!(db.view::<f64>(8, 1), Some(&[0.0][..]));
        assert_eq!(db.view::<f64>(8, 2), None);
    }

    #[test]
    fn resize_zeroes_dropped_bytes() {
        let mut db = DataBlock::new_with_capacity(8, 8);
        db.as_mut_slice().copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        db.resize(4);
        assert_eq!(db.as_slice(), &[1, 2, 3, 4]);
        db.resize(8);
        assert_eq!(db.as_slice(), &[1, 2, 3, 4, 0, 0, 0, 0]);
    }

    #[test]
    fn copy_within_is_overlap_safe() {
        let mut db = DataBlock::from_bytes(&[1, 2, 3, 4, 5, 6, 7, 8]);
        db.copy_within(2, 0, 6);
        assert_eq!(db.as_slice(), &[1, 2, 1, 2, 3, 4, 5, 6]);
        let mut db = DataBlock::from_bytes(&[1, 2, 3, 4, 5, 6, 7, 8]);
        db.copy_within(0, 2, 6);
        assert_eq!(db.as_slice(), &[3, 4, 5, 6, 7, 8, 7, 8]);
    }

    #[test]
    fn copy_data_block_bytes_between_blocks() {
        let mut to = DataBlock::new(8);
        let from = DataBlock::from_bytes(&[1, 2, 3, 4, 5, 6, 7, 8]);
        to.copy_data_block_bytes(2, &from, 4, 4);
        assert_eq!(to.as_slice(), &[0, 0, 5, 6, 7, 8, 0, 0]);
    }

    #[test]
    fn unaligned_get_and_set_preserve_bits() {
        let mut db = DataBlock::new(16);
        db.set::<f64>(3, -0.0);
        assert_eq!(db.get::<f64>(3).map(f64::to_bits), Some((-0.0f64).to_bits()));
        let nan = f32::from_bits(0x7fc0_1234);
        db.set::<f32>(0, nan);
        assert_eq!(db.get::<f32>(0).map(f32::to_bits), Some(0x7fc0_1234));
        assert_eq!(db.get::<u64>(9), None);
    }

    #[test]
    fn numeric_conversions_wrap() {
        assert_eq!(i8::from_element(ElementValue::Number(200.0)), -56);
        assert_eq!(u8::from_element(ElementValue::Number(-1.0)), 255);
        assert_eq!(u16::from_element(ElementValue::Number(65537.9)), 1);
        assert_eq!(i32::from_element(ElementValue::Number(f64::INFINITY)), 0);
        assert_eq!(u32::from_element(ElementValue::Number(4294967296.0 * 3.0 + 5.0)), 5);
        assert_eq!(i32::from_element(ElementValue::Number(2147483648.0)), i32::MIN);
        assert_eq!(u8::from_element(ElementValue::Number(-1e20)), 0);
        assert_eq!(u64::from_element(ElementValue::BigInt(-1)), u64::MAX);
        assert_eq!(i64::from_element(ElementValue::BigInt(1 << 64)), 0);
    }

    #[test]
    fn uint8_clamped_rounds_half_to_even() {
        let clamp = |value: f64| U8Clamped::from_element(ElementValue::Number(value)).0;
        assert_eq!(clamp(-5.0), 0);
        assert_eq!(clamp(300.0), 255);
        assert_eq!(clamp(1.5), 2);
        assert_eq!(clamp(2.5), 2);
        assert_eq!(clamp(f64::NAN), 0);
    }

    #[test]
    fn float_order_puts_nan_last_and_negative_zero_first() {
        let mut values = [f64::NAN, 1.0, 0.0, -0.0, f64::NEG_INFINITY];
        values.sort_by(Viewable::ecmascript_cmp);
        assert_eq!(values[0], f64::NEG_INFINITY);
        assert!(values[1] == 0.0 && values[1].is_sign_negative());
        assert!(values[2] == 0.0 && values[2].is_sign_positive());
        assert_eq!(values[3], 1.0);
        assert!(values[4].is_nan());
    }

    #[test]
    fn search_conversion_is_exact() {
        assert_eq!(u8::try_from_element(ElementValue::Number(3.0)), Some(3));
        assert_eq!(u8::try_from_element(ElementValue::Number(3.5)), None);
        assert_eq!(u8::try_from_element(ElementValue::Number(256.0)), None);
        assert_eq!(f32::try_from_element(ElementValue::Number(0.1)), None);
        assert_eq!(f32::try_from_element(ElementValue::Number(0.5)), Some(0.5));
        assert_eq!(i64::try_from_element(ElementValue::Number(1.0)), None);
        assert_eq!(u64::try_from_element(ElementValue::BigInt(-1)), None);
    }

    #[test]
    fn shared_blocks_grow_and_use_atomic_lanes() {
        let block = SharedDataBlock::new_with_capacity(8, 16);
        let alias = block.clone();
        block.store::<u32>(4, 0xdead_beef);
        assert_eq!(alias.load::<u32>(4), 0xdead_beef);
        assert_eq!(alias.load::<u8>(4), 0xdead_beef_u32.to_ne_bytes()[0]);
        assert!(!block.grow(4));
        assert!(block.grow(16));
        assert_eq!(alias.len(), 16);
        assert!(!block.grow(17));
        assert!(block.ptr_eq(&alias));
    }
}
