// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element searches for `includes`, `indexOf` and `lastIndexOf`.
//!
//! [`IndexOfDispatch`] picks a comparison from the type of the search value
//! once, instead of running the generic equality algorithm per element. The
//! typed array search compares raw elements of the view's element type.

use crate::ecmascript::{
    builtins::{
        ElementsKind,
        typed_array::{TypedArray, primitive_to_element_value, with_typed_array_viewable},
    },
    execution::Agent,
    types::{BigInt, Value, Viewable},
};

/// Which equality a search uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SearchMode {
    /// SameValueZero: NaN finds NaN, and holes read as undefined.
    Includes,
    /// IsStrictlyEqual: NaN finds nothing, and holes are skipped.
    IndexOf,
}

/// The comparison used to scan for one search value.
#[derive(Debug, Clone, Copy)]
pub(crate) enum IndexOfDispatch<'a> {
    /// An integral Number; only Number elements can match.
    Int(f64),
    /// Any other Number. `NaN` is only ever constructed for `includes`.
    Double(f64),
    /// Strings are interned, so equal strings are the same handle.
    String(Value<'a>),
    BigInt(BigInt<'a>),
    /// Undefined, null, booleans and objects match only themselves.
    Identity(Value<'a>),
    /// Nothing can match, such as NaN for `indexOf`.
    NoMatch,
}

impl<'a> IndexOfDispatch<'a> {
    pub(crate) fn new(search_element: Value<'a>, mode: SearchMode) -> Self {
        let dispatch = match search_element {
            Value::Number(n) if n.is_nan() => match mode {
                SearchMode::Includes => IndexOfDispatch::Double(n),
                SearchMode::IndexOf => IndexOfDispatch::NoMatch,
            },
            Value::Number(n) if n.trunc() == n && n.abs() <= i32::MAX as f64 => IndexOfDispatch::Int(n),
            Value::Number(n) => IndexOfDispatch::Double(n),
            Value::String(_) => IndexOfDispatch::String(search_element),
            Value::BigInt(b) => IndexOfDispatch::BigInt(b),
            _ => IndexOfDispatch::Identity(search_element),
        };
        log::trace!("IndexOfDispatch: {dispatch:?}");
        dispatch
    }

    /// Whether storage of the given elements kind could hold a match at all.
    pub(crate) fn can_match_kind(&self, kind: ElementsKind) -> bool {
        match (self, kind) {
            (IndexOfDispatch::NoMatch, _) => false,
            (IndexOfDispatch::Int(_), _) => true,
            // A non-integral Number is never an int element.
            (IndexOfDispatch::Double(_), ElementsKind::PackedInt) => false,
            (IndexOfDispatch::Double(_), _) => true,
            // Packed Number storage holds only Numbers.
            (_, ElementsKind::PackedInt | ElementsKind::PackedDouble) => false,
            _ => true,
        }
    }

    /// Compare one element. `None` is a hole or an absent property, which
    /// only matches undefined when searching with `includes`.
    pub(crate) fn matches(&self, agent: &Agent, element: Option<Value>, mode: SearchMode) -> bool {
        let Some(element) = element else {
            return mode == SearchMode::Includes
                && matches!(self, IndexOfDispatch::Identity(Value::Undefined));
        };
        match (self, element) {
            (IndexOfDispatch::Int(n), Value::Number(x)) => x == *n,
            (IndexOfDispatch::Double(n), Value::Number(x)) => x == *n || (n.is_nan() && x.is_nan()),
            (IndexOfDispatch::String(s), Value::String(_)) => *s == element,
            (IndexOfDispatch::BigInt(b), Value::BigInt(x)) => BigInt::equals(agent, *b, x),
            (IndexOfDispatch::Identity(v), _) => *v == element,
            _ => false,
        }
    }

    /// Scan `elements[from..]` for the first match.
    pub(crate) fn find_forward(
        &self,
        agent: &Agent,
        elements: &[Option<Value<'static>>],
        from: usize,
        mode: SearchMode,
    ) -> Option<usize> {
        let candidates = elements.get(from..)?;
        candidates
            .iter()
            .position(|element| self.matches(agent, *element, mode))
            .map(|position| position + from)
    }

    /// Scan `elements[..=from]` for the last match.
    pub(crate) fn find_backward(
        &self,
        agent: &Agent,
        elements: &[Option<Value<'static>>],
        from: usize,
        mode: SearchMode,
    ) -> Option<usize> {
        let end = from.checked_add(1)?.min(elements.len());
        elements[..end]
            .iter()
            .rposition(|element| self.matches(agent, *element, mode))
    }
}

/// Direction and bounds of a typed array search.
#[derive(Debug, Clone, Copy)]
pub(crate) enum TypedSearchRange {
    /// Indexes `from..to`, ascending.
    Forward { from: usize, to: usize },
    /// Indexes `0..=from`, descending.
    Backward { from: usize },
}

/// Search the elements of a typed array for a Number or BigInt.
///
/// Elements past the current length of the view are never found; callers
/// handle what reading past the end means for their method.
pub(crate) fn search_typed_array(
    agent: &Agent,
    o: TypedArray,
    search_element: Value,
    mode: SearchMode,
    range: TypedSearchRange,
) -> Option<usize> {
    let target = primitive_to_element_value(agent, search_element, o.is_bigint())?;
    let len = o.length(agent);
    let (start, end) = match range {
        TypedSearchRange::Forward { from, to } => (from, to.min(len)),
        TypedSearchRange::Backward { from } => (0, from.checked_add(1)?.min(len)),
    };
    if start >= end {
        return None;
    }
    let backward = matches!(range, TypedSearchRange::Backward { .. });
    with_typed_array_viewable!(
        o.element_type(),
        search_elements::<T>(agent, o, target, mode, start, end, backward),
        T
    )
}

fn search_elements<T: Viewable>(
    agent: &Agent,
    o: TypedArray,
    target: crate::ecmascript::types::ElementValue,
    mode: SearchMode,
    start: usize,
    end: usize,
    backward: bool,
) -> Option<usize> {
    let target = T::try_from_element(target)?;
    let find_nan = target.is_nan();
    if find_nan && mode == SearchMode::IndexOf {
        return None;
    }
    let is_match = |x: &T| *x == target || (find_nan && x.is_nan());
    let buffer = o.viewed_array_buffer(agent);
    let byte_offset = o.element_byte_index(agent, start);
    if let Some(elements) = buffer
        .as_data_block(agent)
        .and_then(|block| block.view::<T>(byte_offset, end - start))
    {
        let position = if backward {
            elements.iter().rposition(is_match)
        } else {
            elements.iter().position(is_match)
        };
        return position.map(|position| position + start);
    }
    // Shared storage is read one atomic lane at a time.
    let element_size = size_of::<T>();
    let read = |k: usize| buffer.get_value::<T>(agent, byte_offset + (k - start) * element_size);
    if backward {
        (start..end).rev().find(|&k| read(k).is_some_and(|x| is_match(&x)))
    } else {
        (start..end).find(|&k| read(k).is_some_and(|x| is_match(&x)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::{
        builtins::{ArrayBuffer, typed_array::TypedArrayHeapData},
        execution::Options,
        types::{ElementType, String},
    };
    use crate::{engine::context::Bindable, heap::CreateHeapData};

    #[test]
    fn numbers_compare_by_value_and_nan_only_for_includes() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, _| {
            let elements = [
                Some(Value::Number(1.0)),
                None,
                Some(Value::Number(f64::NAN)),
                Some(Value::Number(-0.0)),
            ];
            let nan = Value::Number(f64::NAN);
            let includes = IndexOfDispatch::new(nan, SearchMode::Includes);
            assert_eq!(includes.find_forward(agent, &elements, 0, SearchMode::Includes), Some(2));
            let index_of = IndexOfDispatch::new(nan, SearchMode::IndexOf);
            assert_eq!(index_of.find_forward(agent, &elements, 0, SearchMode::IndexOf), None);

            let zero = IndexOfDispatch::new(Value::Number(0.0), SearchMode::IndexOf);
            assert_eq!(zero.find_forward(agent, &elements, 0, SearchMode::IndexOf), Some(3));
            assert_eq!(zero.find_backward(agent, &elements, 2, SearchMode::IndexOf), None);
        });
    }

    #[test]
    fn holes_match_undefined_only_for_includes() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, _| {
            let elements = [Some(Value::Number(1.0)), None, Some(Value::Undefined)];
            let undefined = IndexOfDispatch::new(Value::Undefined, SearchMode::Includes);
            assert_eq!(undefined.find_forward(agent, &elements, 0, SearchMode::Includes), Some(1));
            assert_eq!(undefined.find_forward(agent, &elements, 0, SearchMode::IndexOf), Some(2));
            assert_eq!(undefined.find_backward(agent, &elements, 1, SearchMode::IndexOf), None);
        });
    }

    #[test]
    fn strings_and_bigints_compare_by_content() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let a = String::from_str(agent, "a", gc.nogc()).unbind();
            let b = BigInt::from_i64(agent, 7, gc.nogc()).unbind();
            let b2 = BigInt::from_i64(agent, 7, gc.nogc()).unbind();
            let elements = [Some(Value::Number(7.0)), Some(b.into()), Some(a.into())];
            let search_a = String::from_str(agent, "a", gc.nogc()).unbind();
            let strings = IndexOfDispatch::new(search_a.into(), SearchMode::IndexOf);
            assert_eq!(strings.find_forward(agent, &elements, 0, SearchMode::IndexOf), Some(2));
            let bigints = IndexOfDispatch::new(b2.into(), SearchMode::IndexOf);
            assert_eq!(bigints.find_forward(agent, &elements, 0, SearchMode::IndexOf), Some(1));
        });
    }

    #[test]
    fn packed_number_kinds_rule_out_other_types() {
        let dispatch = IndexOfDispatch::new(Value::Undefined, SearchMode::Includes);
        assert!(!dispatch.can_match_kind(ElementsKind::PackedInt));
        assert!(dispatch.can_match_kind(ElementsKind::Holey));
        let half = IndexOfDispatch::new(Value::Number(0.5), SearchMode::IndexOf);
        assert!(!half.can_match_kind(ElementsKind::PackedInt));
        assert!(half.can_match_kind(ElementsKind::PackedDouble));
    }

    #[test]
    fn typed_searches_use_exact_element_values() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let buffer = ArrayBuffer::from_bytes(agent, &[0; 32], gc.nogc()).unwrap().unbind();
            let view: TypedArray = agent.heap.create(TypedArrayHeapData {
                viewed_array_buffer: buffer,
                byte_offset: 0,
                array_length: Some(4),
                element_type: ElementType::Float64,
                backing_object: None,
            });
            buffer.set_value::<f64>(agent, 8, f64::NAN);
            buffer.set_value::<f64>(agent, 16, 2.5);
            buffer.set_value::<f64>(agent, 24, 2.5);
            let forward = TypedSearchRange::Forward { from: 0, to: 4 };
            let nan = Value::Number(f64::NAN);
            assert_eq!(search_typed_array(agent, view, nan, SearchMode::Includes, forward), Some(1));
            assert_eq!(search_typed_array(agent, view, nan, SearchMode::IndexOf, forward), None);
            let value = Value::Number(2.5);
            assert_eq!(search_typed_array(agent, view, value, SearchMode::IndexOf, forward), Some(2));
            let backward = TypedSearchRange::Backward { from: 3 };
            assert_eq!(search_typed_array(agent, view, value, SearchMode::IndexOf, backward), Some(3));
            // -0 finds +0.
            let zero = Value::Number(-0.0);
            assert_eq!(search_typed_array(agent, view, zero, SearchMode::IndexOf, forward), Some(0));
            // A value of the wrong content type is never found.
            let big = BigInt::from_i64(agent, 0, gc.nogc()).unbind();
            assert_eq!(search_typed_array(agent, view, big.into(), SearchMode::Includes, forward), None);
        });
    }
}
