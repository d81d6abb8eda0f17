// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::{collections::BTreeMap, rc::Rc};

use crate::ecmascript::types::{OrdinaryObject, PropertyValue, Value};

/// Packed element storage. `None` is a hole.
///
/// The vector may be shared between arrays; it is cloned on the first write
/// through a sharing array.
pub(crate) type ElementStorage = Rc<Vec<Option<Value<'static>>>>;

/// What is known about every element of a packed array.
///
/// Kinds only ever generalise: PackedInt, then PackedDouble, then
/// PackedGeneric, then Holey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ElementsKind {
    /// Every element is a Number with an exact i32 value (and not -0).
    PackedInt,
    /// Every element is a Number.
    PackedDouble,
    /// No holes.
    PackedGeneric,
    /// May contain holes.
    Holey,
}

impl ElementsKind {
    pub(crate) fn of(value: Option<Value>) -> Self {
        match value {
            None => ElementsKind::Holey,
            Some(Value::Number(n)) if is_int_element(n) => ElementsKind::PackedInt,
            Some(Value::Number(_)) => ElementsKind::PackedDouble,
            Some(_) => ElementsKind::PackedGeneric,
        }
    }

    pub(crate) fn classify(values: &[Option<Value>]) -> Self {
        values
            .iter()
            .map(|value| ElementsKind::of(*value))
            .max()
            .unwrap_or(ElementsKind::PackedInt)
    }

    pub(crate) fn generalize(self, other: Self) -> Self {
        self.max(other)
    }

    pub const fn is_holey(self) -> bool {
        matches!(self, ElementsKind::Holey)
    }
}

fn is_int_element(n: f64) -> bool {
    n.trunc() == n
        && n >= i32::MIN as f64
        && n <= i32::MAX as f64
        && !(n == 0.0 && n.is_sign_negative())
}

/// The two element representations of an Array.
#[derive(Debug, Clone)]
pub enum ArrayElements {
    /// Storage length equals the logical length.
    Packed {
        storage: ElementStorage,
        kind: ElementsKind,
    },
    /// Sparse elements keyed by index. Elements may be accessors.
    Dictionary {
        length: u32,
        entries: BTreeMap<u32, PropertyValue<'static>>,
    },
}

impl Default for ArrayElements {
    fn default() -> Self {
        ArrayElements::Packed {
            storage: Rc::default(),
            kind: ElementsKind::PackedInt,
        }
    }
}

impl ArrayElements {
    pub(crate) fn from_vec(values: Vec<Option<Value<'static>>>) -> Self {
        let kind = ElementsKind::classify(&values);
        ArrayElements::Packed {
            storage: Rc::new(values),
            kind,
        }
    }

    /// Elements of `length` holes. Lengths over the sparse threshold start
    /// out as a dictionary.
    pub(crate) fn with_holes(length: u32, sparse_threshold: u32) -> Self {
        if length > sparse_threshold {
            ArrayElements::Dictionary {
                length,
                entries: BTreeMap::new(),
            }
        } else {
            ArrayElements::from_vec(vec![None; length as usize])
        }
    }

    pub(crate) fn len(&self) -> u32 {
        match self {
            ArrayElements::Packed { storage, .. } => storage.len() as u32,
            ArrayElements::Dictionary { length, .. } => *length,
        }
    }

    pub(crate) fn is_packed(&self) -> bool {
        matches!(self, ArrayElements::Packed { .. })
    }

    pub(crate) fn get(&self, index: u32) -> Option<PropertyValue<'static>> {
        match self {
            ArrayElements::Packed { storage, .. } => storage
                .get(index as usize)
                .copied()
                .flatten()
                .map(PropertyValue::Data),
            ArrayElements::Dictionary { entries, .. } => entries.get(&index).copied(),
        }
    }

    pub(crate) fn has(&self, index: u32) -> bool {
        match self {
            ArrayElements::Packed { storage, .. } => {
                storage.get(index as usize).is_some_and(Option::is_some)
            }
            ArrayElements::Dictionary { entries, .. } => entries.contains_key(&index),
        }
    }

    /// EnsureExclusiveStorage: the packed vector, cloned first if another
    /// array shares it.
    pub(crate) fn storage_mut(&mut self) -> Option<&mut Vec<Option<Value<'static>>>> {
        match self {
            ArrayElements::Packed { storage, .. } => {
                if Rc::strong_count(storage) > 1 {
                    log::debug!("cloning shared array storage of {} elements", storage.len());
                }
                Some(Rc::make_mut(storage))
            }
            ArrayElements::Dictionary { .. } => None,
        }
    }

    /// Write an element, growing the length if needed.
    pub(crate) fn set(&mut self, index: u32, value: PropertyValue<'static>, sparse_threshold: u32) {
        let len = self.len();
        let fits_packed = index < len || index - len <= sparse_threshold;
        if let ArrayElements::Packed { storage, kind } = self
            && let PropertyValue::Data(data) = value
            && fits_packed
        {
            let storage = Rc::make_mut(storage);
            if index as usize >= storage.len() {
                if index > len {
                    *kind = ElementsKind::Holey;
                }
                storage.resize(index as usize + 1, None);
            }
            storage[index as usize] = Some(data);
            *kind = kind.generalize(ElementsKind::of(Some(data)));
            return;
        }
        self.make_dictionary();
        let ArrayElements::Dictionary { length, entries } = self else {
            unreachable!()
        };
        entries.insert(index, value);
        if index >= *length {
            *length = index + 1;
        }
    }

    /// Remove an element without changing the length.
    pub(crate) fn delete(&mut self, index: u32) {
        match self {
            ArrayElements::Packed { storage, kind } => {
                if storage.get(index as usize).is_some_and(Option::is_some) {
                    Rc::make_mut(storage)[index as usize] = None;
                    *kind = ElementsKind::Holey;
                }
            }
            ArrayElements::Dictionary { entries, .. } => {
                entries.remove(&index);
            }
        }
    }

    /// Set the logical length. Shrinking drops the elements past the new
    /// length; growing by more than the sparse threshold converts to a
    /// dictionary.
    pub(crate) fn set_len(&mut self, new_len: u32, sparse_threshold: u32) {
        let len = self.len();
        match self {
            ArrayElements::Packed { storage, .. } if new_len <= len => {
                if new_len < len {
                    Rc::make_mut(storage).truncate(new_len as usize);
                }
            }
            ArrayElements::Packed { storage, kind } if new_len - len <= sparse_threshold => {
                Rc::make_mut(storage).resize(new_len as usize, None);
                *kind = ElementsKind::Holey;
            }
            ArrayElements::Packed { .. } => {
                self.make_dictionary();
                if let ArrayElements::Dictionary { length, .. } = self {
                    *length = new_len;
                }
            }
            ArrayElements::Dictionary { length, entries } => {
                if new_len < *length {
                    entries.split_off(&new_len);
                }
                *length = new_len;
            }
        }
    }

    fn make_dictionary(&mut self) {
        let ArrayElements::Packed { storage, .. } = self else {
            return;
        };
        log::debug!("array elements converted to dictionary at length {}", storage.len());
        let length = storage.len() as u32;
        let entries = storage
            .iter()
            .enumerate()
            .filter_map(|(index, value)| value.map(|value| (index as u32, PropertyValue::Data(value))))
            .collect();
        *self = ArrayElements::Dictionary { length, entries };
    }

    /// Whether any element is present.
    pub(crate) fn has_elements(&self) -> bool {
        match self {
            ArrayElements::Packed { storage, kind } => {
                !storage.is_empty() && (!kind.is_holey() || storage.iter().any(Option::is_some))
            }
            ArrayElements::Dictionary { entries, .. } => !entries.is_empty(),
        }
    }

    /// Indexes of present elements in ascending order.
    pub(crate) fn keys(&self) -> Vec<u32> {
        match self {
            ArrayElements::Packed { storage, .. } => storage
                .iter()
                .enumerate()
                .filter(|(_, value)| value.is_some())
                .map(|(index, _)| index as u32)
                .collect(),
            ArrayElements::Dictionary { entries, .. } => entries.keys().copied().collect(),
        }
    }
}

/// An Array is an exotic object that gives special treatment to array index
/// property keys. A property whose property name is an array index is also
/// called an element. Every Array has a non-configurable `length` property
/// whose value is always a non-negative integral Number whose mathematical
/// value is strictly less than 2<sup>32</sup>.
#[derive(Debug, Clone, Default)]
pub struct ArrayHeapData {
    pub(crate) elements: ArrayElements,
    pub(crate) backing_object: Option<OrdinaryObject<'static>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(n: f64) -> PropertyValue<'static> {
        PropertyValue::Data(Value::Number(n))
    }

    #[test]
    fn kinds_generalise_on_write() {
        let mut elements = ArrayElements::from_vec(vec![Some(Value::Number(1.0))]);
        assert!(matches!(elements, ArrayElements::Packed { kind: ElementsKind::PackedInt, .. }));
        elements.set(1, number(1.5), 100);
        assert!(matches!(elements, ArrayElements::Packed { kind: ElementsKind::PackedDouble, .. }));
        elements.set(0, PropertyValue::Data(Value::Undefined), 100);
        assert!(matches!(elements, ArrayElements::Packed { kind: ElementsKind::PackedGeneric, .. }));
        elements.set(0, number(2.0), 100);
        assert!(matches!(elements, ArrayElements::Packed { kind: ElementsKind::PackedGeneric, .. }));
    }

    #[test]
    fn negative_zero_is_not_an_int_element() {
        assert_eq!(ElementsKind::of(Some(Value::Number(-0.0))), ElementsKind::PackedDouble);
        assert_eq!(ElementsKind::of(Some(Value::Number(0.0))), ElementsKind::PackedInt);
    }

    #[test]
    fn small_gaps_stay_packed_and_holey() {
        let mut elements = ArrayElements::default();
        elements.set(3, number(1.0), 100);
        assert_eq!(elements.len(), 4);
        assert!(matches!(elements, ArrayElements::Packed { kind: ElementsKind::Holey, .. }));
        assert!(!elements.has(0));
        assert!(elements.has(3));
    }

    #[test]
    fn large_gaps_convert_to_dictionary() {
        let mut elements = ArrayElements::from_vec(vec![Some(Value::Number(1.0))]);
        elements.set(1 + 101, number(2.0), 100);
        assert!(!elements.is_packed());
        assert_eq!(elements.len(), 103);
        assert_eq!(elements.get(0), Some(number(1.0)));
        assert_eq!(elements.keys(), vec![0, 102]);
    }

    #[test]
    fn length_changes() {
        let mut elements = ArrayElements::from_vec(vec![Some(Value::Number(1.0)); 4]);
        elements.set_len(2, 100);
        assert_eq!(elements.len(), 2);
        assert!(elements.is_packed());
        elements.set_len(10, 100);
        assert!(matches!(elements, ArrayElements::Packed { kind: ElementsKind::Holey, .. }));
        elements.set_len(1000, 100);
        assert!(!elements.is_packed());
        elements.set(500, number(5.0), 100);
        elements.set_len(3, 100);
        assert_eq!(elements.keys(), vec![0, 1]);
        assert_eq!(elements.len(), 3);
    }

    #[test]
    fn shared_storage_is_copied_on_write() {
        let mut a = ArrayElements::from_vec(vec![Some(Value::Number(1.0)), Some(Value::Number(2.0))]);
        let b = a.clone();
        a.storage_mut().unwrap()[0] = Some(Value::Number(9.0));
        assert_eq!(a.get(0), Some(number(9.0)));
        assert_eq!(b.get(0), Some(number(1.0)));
    }

    #[test]
    fn delete_leaves_a_hole() {
        let mut elements = ArrayElements::from_vec(vec![Some(Value::Number(1.0)); 3]);
        elements.delete(1);
        assert_eq!(elements.len(), 3);
        assert!(!elements.has(1));
        assert!(matches!(elements, ArrayElements::Packed { kind: ElementsKind::Holey, .. }));
    }
}
