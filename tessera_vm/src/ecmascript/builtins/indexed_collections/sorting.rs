// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binary insertion sort shared by Array.prototype.sort and
//! %TypedArray%.prototype.sort and their copying variants.
//!
//! The comparator may call into user code and fail. Sorting happens on a
//! list of values taken out of the receiver, so a comparator that mutates
//! the receiver cannot disturb the sort; the caller writes the result back
//! only once the sort has completed.

use core::cmp::Ordering;

use crate::{
    ecmascript::{
        abstract_operations::{
            operations_on_objects::call_function, testing_and_comparison::require_callable,
            type_conversion::to_number,
        },
        builtins::Function,
        execution::{Agent, JsResult},
        types::Value,
    },
    engine::{
        Scopable, Scoped,
        context::{Bindable, GcScope, NoGcScope},
    },
};

/// Stable binary insertion sort with a fallible comparator.
///
/// Each element is placed after every element that compares equal to it.
/// On error the slice holds a permutation of its original contents.
pub(crate) fn insertion_sort_by<T, E>(
    items: &mut [T],
    mut compare: impl FnMut(&T, &T) -> Result<Ordering, E>,
) -> Result<(), E> {
    for i in 1..items.len() {
        let mut low = 0;
        let mut high = i;
        while low < high {
            let mid = low + (high - low) / 2;
            if compare(&items[i], &items[mid])? == Ordering::Less {
                high = mid;
            } else {
                low = mid + 1;
            }
        }
        items[low..=i].rotate_right(1);
    }
    Ok(())
}

/// Step 1 of the sort methods: the comparator must be undefined or callable.
pub(crate) fn optional_comparator<'gc, 'scope>(
    agent: &mut Agent,
    comparator: Value,
    gc: NoGcScope<'gc, 'scope>,
) -> JsResult<'gc, Option<Scoped<'scope, Function<'static>>>> {
    if comparator.is_undefined() {
        return Ok(None);
    }
    let comparator = require_callable(
        agent,
        comparator,
        "The comparison function must be either a function or undefined",
        gc,
    )?;
    Ok(Some(comparator.scope(agent, gc)))
}

/// Call a user comparator and turn its result into an ordering.
///
/// Shared step of CompareArrayElements and CompareTypedArrayElements:
///
/// > a. Let v be ? ToNumber(? Call(comparator, undefined, « x, y »)).
/// > b. If v is NaN, return +0𝔽.
/// > c. Return v.
pub(crate) fn call_comparator<'gc>(
    agent: &mut Agent,
    comparator: Function,
    x: Value,
    y: Value,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Ordering> {
    let comparator = comparator.unbind();
    let v = call_function(
        agent,
        comparator,
        Value::Undefined,
        &[x.unbind(), y.unbind()],
        gc.reborrow(),
    )
    .unbind()?;
    let v = to_number(agent, v, gc)?;
    Ok(number_to_ordering(v))
}

fn number_to_ordering(v: f64) -> Ordering {
    if v < 0.0 {
        Ordering::Less
    } else if v > 0.0 {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::types::Viewable;

    #[test]
    fn sorts_and_keeps_equal_elements_in_order() {
        let mut items = vec![(3, 'a'), (1, 'b'), (3, 'c'), (2, 'd'), (1, 'e')];
        insertion_sort_by(&mut items, |a, b| Ok::<_, ()>(a.0.cmp(&b.0))).unwrap();
        assert_eq!(items, [(1, 'b'), (1, 'e'), (2, 'd'), (3, 'a'), (3, 'c')]);
    }

    #[test]
    fn comparator_errors_stop_the_sort() {
        let mut items = vec![5, 4, 3, 2, 1];
        let mut calls = 0;
        let result = insertion_sort_by(&mut items, |a: &i32, b: &i32| {
            calls += 1;
            if calls == 3 { Err("thrown") } else { Ok(a.cmp(b)) }
        });
        assert_eq!(result, Err("thrown"));
        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn default_float_order_puts_nan_last_and_negative_zero_first() {
        let mut items = vec![f64::NAN, 1.0, 0.0, -0.0, -1.0];
        insertion_sort_by(&mut items, |a, b| Ok::<_, ()>(a.ecmascript_cmp(b))).unwrap();
        assert_eq!(items[0], -1.0);
        assert!(items[1] == 0.0 && items[1].is_sign_negative());
        assert!(items[2] == 0.0 && items[2].is_sign_positive());
        assert_eq!(items[3], 1.0);
        assert!(items[4].is_nan());
    }

    #[test]
    fn comparator_results_map_to_orderings() {
        assert_eq!(number_to_ordering(-0.5), Ordering::Less);
        assert_eq!(number_to_ordering(f64::INFINITY), Ordering::Greater);
        assert_eq!(number_to_ordering(-0.0), Ordering::Equal);
        assert_eq!(number_to_ordering(f64::NAN), Ordering::Equal);
    }
}
