// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [7.4 Operations on Iterator Objects](https://tc39.es/ecma262/#sec-operations-on-iterator-objects)

use super::{
    operations_on_objects::{call, call_function, get, get_method},
    type_conversion::to_boolean,
};
use crate::{
    ecmascript::{
        builtins::Function,
        execution::{Agent, ExceptionType, JsError, JsResult, ProtoIntrinsics},
        types::{BUILTIN_STRING_MEMORY, Object, OrdinaryObject, Value},
    },
    engine::{
        Scopable, Scoped,
        context::{Bindable, GcScope, NoGcScope},
    },
};

/// ### [7.4.1 Iterator Records](https://tc39.es/ecma262/#sec-iterator-records)
#[derive(Debug, Clone, Copy)]
pub(crate) struct IteratorRecord<'scope> {
    pub(crate) iterator: Scoped<'scope, Object<'static>>,
    pub(crate) next_method: Scoped<'scope, Value<'static>>,
}

// SAFETY: The record only holds scoped roots, which are not bound to the GC
// lifetime.
unsafe impl<'scope> Bindable for IteratorRecord<'scope> {
    type Of<'a> = IteratorRecord<'scope>;

    #[inline(always)]
    fn unbind(self) -> Self::Of<'static> {
        self
    }

    #[inline(always)]
    fn bind<'a>(self, _gc: NoGcScope<'a, '_>) -> Self::Of<'a> {
        self
    }
}

/// ### [7.4.14 CreateIteratorResultObject ( value, done )](https://tc39.es/ecma262/#sec-createiterresultobject)
pub(crate) fn create_iter_result_object<'gc>(
    agent: &mut Agent,
    value: Value,
    done: bool,
    gc: NoGcScope<'gc, '_>,
) -> OrdinaryObject<'gc> {
    // 1. Let obj be OrdinaryObjectCreate(%Object.prototype%).
    let obj = OrdinaryObject::create_with_intrinsic_prototype(agent, ProtoIntrinsics::Object, gc);
    // 2. Perform ! CreateDataPropertyOrThrow(obj, "value", value).
    obj.set_data_property(agent, BUILTIN_STRING_MEMORY.value.into(), value);
    // 3. Perform ! CreateDataPropertyOrThrow(obj, "done", done).
    obj.set_data_property(agent, BUILTIN_STRING_MEMORY.done.into(), done.into());
    // 4. Return obj.
    obj
}

/// ### [7.4.2 GetIteratorFromMethod ( obj, method )](https://tc39.es/ecma262/#sec-getiteratorfrommethod)
pub(crate) fn get_iterator_from_method<'gc, 'scope>(
    agent: &mut Agent,
    obj: Value,
    method: Function,
    mut gc: GcScope<'gc, 'scope>,
) -> JsResult<'gc, IteratorRecord<'scope>> {
    // 1. Let iterator be ? Call(method, obj).
    let iterator = call_function(agent, method, obj, &[], gc.reborrow()).unbind()?;
    // 2. If iterator is not an Object, throw a TypeError exception.
    let Ok(iterator) = Object::try_from(iterator) else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Result of the Symbol.iterator method is not an object",
            gc.into_nogc(),
        ));
    };
    let iterator = iterator.scope(agent, gc.nogc());
    // 3. Let nextMethod be ? Get(iterator, "next").
    let next_method = get(
        agent,
        iterator.get(agent),
        BUILTIN_STRING_MEMORY.next.into(),
        gc.reborrow(),
    )
    .unbind()?;
    let next_method = next_method.scope(agent, gc.nogc());
    // 4. Let iteratorRecord be the Iterator Record { [[Iterator]]: iterator,
    //    [[NextMethod]]: nextMethod, [[Done]]: false }.
    // 5. Return iteratorRecord.
    Ok(IteratorRecord {
        iterator,
        next_method,
    })
}

/// ### [7.4.8 IteratorStepValue ( iteratorRecord )](https://tc39.es/ecma262/#sec-iteratorstepvalue)
///
/// Returns `None` once the iterator is done.
pub(crate) fn iterator_step_value<'gc>(
    agent: &mut Agent,
    iterator_record: IteratorRecord,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Option<Value<'gc>>> {
    // IteratorNext: Let result be ? Call(iteratorRecord.[[NextMethod]],
    // iteratorRecord.[[Iterator]]).
    let result = call(
        agent,
        iterator_record.next_method.get(agent),
        iterator_record.iterator.get(agent).into(),
        &[],
        gc.reborrow(),
    )
    .unbind()?;
    // If result is not an Object, throw a TypeError exception.
    let Ok(result) = Object::try_from(result) else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Iterator result is not an object",
            gc.into_nogc(),
        ));
    };
    let result = result.scope(agent, gc.nogc());
    // IteratorComplete: Return ToBoolean(? Get(iterResult, "done")).
    let done = get(
        agent,
        result.get(agent),
        BUILTIN_STRING_MEMORY.done.into(),
        gc.reborrow(),
    )
    .unbind()?;
    if to_boolean(agent, done) {
        return Ok(None);
    }
    // IteratorValue: Return ? Get(iterResult, "value").
    get(agent, result.get(agent), BUILTIN_STRING_MEMORY.value.into(), gc).map(Some)
}

/// ### [7.4.11 IteratorClose ( iteratorRecord, completion )](https://tc39.es/ecma262/#sec-iteratorclose)
///
/// Only throw completions are passed through here: errors from the
/// iterator's `return` method are discarded in favour of `error`.
pub(crate) fn iterator_close_with_error<'gc>(
    agent: &mut Agent,
    iterator_record: IteratorRecord,
    error: JsError,
    mut gc: GcScope<'gc, '_>,
) -> JsError<'gc> {
    let error = error.value().scope(agent, gc.nogc());
    let iterator = iterator_record.iterator.get(agent);
    // 3. Let innerResult be Completion(GetMethod(iterator, "return")).
    let return_method = get_method(
        agent,
        iterator.into(),
        BUILTIN_STRING_MEMORY.r#return.into(),
        gc.reborrow(),
    )
    .unbind();
    // 4. If innerResult is a normal completion, then
    if let Ok(Some(return_method)) = return_method {
        // b. Set innerResult to Completion(Call(return, iterator)).
        let _ = call_function(
            agent,
            return_method,
            iterator_record.iterator.get(agent).into(),
            &[],
            gc.reborrow(),
        );
    }
    // 5. If completion is a throw completion, return ? completion.
    JsError::new(error.get(agent))
}

/// ### [7.4.13 IteratorToList ( iteratorRecord )](https://tc39.es/ecma262/#sec-iteratortolist)
///
/// The collected values are unbound: the heap does not reclaim objects, so
/// the list stays valid across the `next` calls.
pub(crate) fn iterator_to_list<'gc>(
    agent: &mut Agent,
    iterator_record: IteratorRecord,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Vec<Value<'static>>> {
    // 1. Let values be a new empty List.
    let mut values = Vec::new();
    // 2. Repeat,
    //   a. Let next be ? IteratorStepValue(iteratorRecord).
    //   b. If next is DONE, return values.
    //   c. Append next to values.
    while let Some(next) = iterator_step_value(agent, iterator_record, gc.reborrow()).unbind()? {
        values.push(next);
    }
    Ok(values)
}
