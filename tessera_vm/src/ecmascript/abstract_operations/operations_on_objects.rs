// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [7.3 Operations on Objects](https://tc39.es/ecma262/#sec-operations-on-objects)

use super::{
    testing_and_comparison::{is_callable, is_constructor},
    type_conversion::{to_length, to_object},
};
use crate::{
    ecmascript::{
        builtins::{
            ArgumentsList, Behaviour, Function,
            builtin_function::FunctionKind,
        },
        execution::{Agent, ExceptionType, JsResult, ProtoIntrinsics},
        types::{
            BUILTIN_STRING_MEMORY, InternalMethods, Object, PropertyKey, PropertyValue, Value,
            WellKnownSymbol,
        },
    },
    engine::{
        Scopable,
        context::{Bindable, GcScope, NoGcScope},
    },
};

/// ### [7.3.2 Get ( O, P )](https://tc39.es/ecma262/#sec-get-o-p)
pub fn get<'gc>(
    agent: &mut Agent,
    o: Object,
    p: PropertyKey,
    gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Value<'gc>> {
    // 1. Return ? O.[[Get]](P, O).
    o.internal_get(agent, p, o.into(), gc)
}

/// ### [7.3.3 GetV ( V, P )](https://tc39.es/ecma262/#sec-getv)
pub fn get_v<'gc>(
    agent: &mut Agent,
    v: Value,
    p: PropertyKey,
    gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Value<'gc>> {
    // 1. Let O be ? ToObject(V).
    let o = to_object(agent, v, gc.nogc()).unbind()?;
    // 2. Return ? O.[[Get]](P, V).
    o.internal_get(agent, p, v, gc)
}

/// ### [7.3.4 Set ( O, P, V, Throw )](https://tc39.es/ecma262/#sec-set-o-p-v-throw)
pub fn set<'gc>(
    agent: &mut Agent,
    o: Object,
    p: PropertyKey,
    v: Value,
    throw: bool,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, ()> {
    // 1. Let success be ? O.[[Set]](P, V, O).
    let success = o
        .internal_set(agent, p, v, o.into(), gc.reborrow())
        .unbind()?;
    // 2. If success is false and Throw is true, throw a TypeError exception.
    if !success && throw {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Could not set property",
            gc.into_nogc(),
        ));
    }
    // 3. Return UNUSED.
    Ok(())
}

/// ### [7.3.5 CreateDataProperty ( O, P, V )](https://tc39.es/ecma262/#sec-createdataproperty)
pub fn create_data_property<'gc>(
    agent: &mut Agent,
    object: Object,
    property_key: PropertyKey,
    value: Value,
    gc: GcScope<'gc, '_>,
) -> JsResult<'gc, bool> {
    // 1. Let newDesc be the PropertyDescriptor { [[Value]]: V, [[Writable]]: true,
    //    [[Enumerable]]: true, [[Configurable]]: true }.
    // 2. Return ? O.[[DefineOwnProperty]](P, newDesc).
    object.internal_define_own_property(agent, property_key, PropertyValue::Data(value), gc)
}

/// ### [7.3.7 CreateDataPropertyOrThrow ( O, P, V )](https://tc39.es/ecma262/#sec-createdatapropertyorthrow)
pub fn create_data_property_or_throw<'gc>(
    agent: &mut Agent,
    object: Object,
    property_key: PropertyKey,
    value: Value,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, ()> {
    // 1. Let success be ? CreateDataProperty(O, P, V).
    let success =
        create_data_property(agent, object, property_key, value, gc.reborrow()).unbind()?;
    // 2. If success is false, throw a TypeError exception.
    if !success {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Could not define property",
            gc.into_nogc(),
        ));
    }
    // 3. Return UNUSED.
    Ok(())
}

/// ### [7.3.10 DeletePropertyOrThrow ( O, P )](https://tc39.es/ecma262/#sec-deletepropertyorthrow)
pub fn delete_property_or_throw<'gc>(
    agent: &mut Agent,
    o: Object,
    p: PropertyKey,
    gc: NoGcScope<'gc, '_>,
) -> JsResult<'gc, ()> {
    // 1. Let success be ? O.[[Delete]](P).
    // 2. If success is false, throw a TypeError exception.
    if !o.internal_delete(agent, p) {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Cannot delete property",
            gc,
        ));
    }
    // 3. Return UNUSED.
    Ok(())
}

/// ### [7.3.11 GetMethod ( V, P )](https://tc39.es/ecma262/#sec-getmethod)
pub fn get_method<'gc>(
    agent: &mut Agent,
    v: Value,
    p: PropertyKey,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Option<Function<'gc>>> {
    // 1. Let func be ? GetV(V, P).
    let func = get_v(agent, v, p, gc.reborrow()).unbind()?;
    // 2. If func is either undefined or null, return undefined.
    if func.is_nullish() {
        return Ok(None);
    }
    // 3. If IsCallable(func) is false, throw a TypeError exception.
    let Some(func) = is_callable(func) else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Method is not callable",
            gc.into_nogc(),
        ));
    };
    // 4. Return func.
    Ok(Some(func))
}

/// ### [7.3.12 HasProperty ( O, P )](https://tc39.es/ecma262/#sec-hasproperty)
pub fn has_property(agent: &Agent, o: Object, p: PropertyKey) -> bool {
    // 1. Return ? O.[[HasProperty]](P).
    o.internal_has_property(agent, p)
}

/// ### [7.3.13 HasOwnProperty ( O, P )](https://tc39.es/ecma262/#sec-hasownproperty)
pub fn has_own_property(agent: &Agent, o: Object, p: PropertyKey) -> bool {
    o.internal_has_own_property(agent, p)
}

/// ### [7.3.14 Call ( F, V \[ , argumentsList \] )](https://tc39.es/ecma262/#sec-call)
pub fn call<'gc>(
    agent: &mut Agent,
    f: Value,
    v: Value,
    arguments_list: &[Value],
    gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Value<'gc>> {
    // 2. If IsCallable(F) is false, throw a TypeError exception.
    let Some(f) = is_callable(f) else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Value is not a function",
            gc.into_nogc(),
        ));
    };
    // 3. Return ? F.[[Call]](V, argumentsList).
    call_function(agent, f, v, arguments_list, gc)
}

/// ### [10.3.1 \[\[Call\]\] ( thisArgument, argumentsList )](https://tc39.es/ecma262/#sec-built-in-function-objects-call-thisargument-argumentslist)
///
/// Values rooted by the callee are released when it returns.
pub fn call_function<'gc>(
    agent: &mut Agent,
    f: Function,
    this_argument: Value,
    arguments_list: &[Value],
    gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Value<'gc>> {
    let depth = agent.stack_refs.borrow().len();
    let arguments = ArgumentsList::from_slice(arguments_list);
    let kind = agent[f].kind.clone();
    let result = match kind {
        FunctionKind::Builtin(Behaviour::Regular(behaviour)) => {
            behaviour(agent, this_argument, arguments, gc)
        }
        FunctionKind::Builtin(Behaviour::Constructor(behaviour)) => {
            behaviour(agent, this_argument, arguments, None, gc)
        }
        FunctionKind::Host(host) => (host.0)(agent, this_argument, arguments, gc),
        FunctionKind::Derived { .. } => Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Class constructor cannot be invoked without 'new'",
            gc.into_nogc(),
        )),
    };
    agent.stack_refs.borrow_mut().truncate(depth);
    result
}

/// ### [7.3.15 Construct ( F \[ , argumentsList \[ , newTarget \] \] )](https://tc39.es/ecma262/#sec-construct)
pub fn construct<'gc>(
    agent: &mut Agent,
    f: Function,
    arguments_list: &[Value],
    new_target: Option<Function>,
    gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Object<'gc>> {
    // 1. If newTarget is not present, set newTarget to F.
    let new_target = new_target.unwrap_or(f).unbind();
    let depth = agent.stack_refs.borrow().len();
    let kind = agent[f].kind.clone();
    // 3. Return ? F.[[Construct]](argumentsList, newTarget).
    let result = match kind {
        FunctionKind::Builtin(Behaviour::Constructor(behaviour)) => behaviour(
            agent,
            Value::Undefined,
            ArgumentsList::from_slice(arguments_list),
            Some(new_target.into()),
            gc,
        ),
        FunctionKind::Derived { parent } => {
            return construct(agent, parent, arguments_list, Some(new_target), gc);
        }
        FunctionKind::Builtin(Behaviour::Regular(_)) | FunctionKind::Host(_) => {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "Value is not a constructor",
                gc.into_nogc(),
            ));
        }
    };
    agent.stack_refs.borrow_mut().truncate(depth);
    match result {
        Ok(value) => match Object::try_from(value) {
            Ok(object) => Ok(object),
            Err(()) => unreachable!("constructors always return objects"),
        },
        Err(error) => Err(error),
    }
}

/// ### [7.3.18 LengthOfArrayLike ( obj )](https://tc39.es/ecma262/#sec-lengthofarraylike)
pub fn length_of_array_like<'gc>(
    agent: &mut Agent,
    obj: Object,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, u64> {
    if let Object::Array(array) = obj {
        return Ok(array.len(agent) as u64);
    }
    // 1. Return ℝ(? ToLength(? Get(obj, "length"))).
    let length = get(agent, obj, BUILTIN_STRING_MEMORY.length.into(), gc.reborrow()).unbind()?;
    to_length(agent, length, gc)
}

/// ### [7.3.20 Invoke ( V, P \[ , argumentsList \] )](https://tc39.es/ecma262/#sec-invoke)
pub fn invoke<'gc>(
    agent: &mut Agent,
    v: Value,
    p: PropertyKey,
    arguments_list: &[Value],
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Value<'gc>> {
    let scoped_v = v.scope(agent, gc.nogc());
    // 2. Let func be ? GetV(V, P).
    let func = get_v(agent, v, p, gc.reborrow()).unbind()?;
    // 3. Return ? Call(func, V, argumentsList).
    call(agent, func, scoped_v.get(agent), arguments_list, gc)
}

/// ### [7.3.22 SpeciesConstructor ( O, defaultConstructor )](https://tc39.es/ecma262/#sec-speciesconstructor)
pub(crate) fn species_constructor<'gc>(
    agent: &mut Agent,
    o: Object,
    default_constructor: Function,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Function<'gc>> {
    let default_constructor = default_constructor.unbind();
    // 1. Let C be ? Get(O, "constructor").
    let c = get(
        agent,
        o,
        BUILTIN_STRING_MEMORY.constructor.into(),
        gc.reborrow(),
    )
    .unbind()?;
    // 2. If C is undefined, return defaultConstructor.
    if c.is_undefined() {
        return Ok(default_constructor);
    }
    // 3. If C is not an Object, throw a TypeError exception.
    let Ok(c) = Object::try_from(c) else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Object constructor property is not an object",
            gc.into_nogc(),
        ));
    };
    // 4. Let S be ? Get(C, %Symbol.species%).
    let s = get(agent, c, WellKnownSymbol::Species.into(), gc.reborrow()).unbind()?;
    // 5. If S is either undefined or null, return defaultConstructor.
    if s.is_nullish() {
        return Ok(default_constructor);
    }
    // 6. If IsConstructor(S) is true, return S.
    if let Some(s) = is_constructor(agent, s) {
        return Ok(s);
    }
    // 7. Throw a TypeError exception.
    Err(agent.throw_exception_with_static_message(
        ExceptionType::TypeError,
        "Object's [Symbol.species] is not a constructor",
        gc.into_nogc(),
    ))
}

/// ### [10.1.14 GetPrototypeFromConstructor ( constructor, intrinsicDefaultProto )](https://tc39.es/ecma262/#sec-getprototypefromconstructor)
pub(crate) fn get_prototype_from_constructor<'gc>(
    agent: &mut Agent,
    constructor: Function,
    intrinsic_default_proto: ProtoIntrinsics,
    gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Object<'gc>> {
    // 2. Let proto be ? Get(constructor, "prototype").
    let proto = get(
        agent,
        constructor.into(),
        BUILTIN_STRING_MEMORY.prototype.into(),
        gc,
    )?;
    // 3. If proto is not an Object, then
    //   a. Let realm be ? GetFunctionRealm(constructor).
    //   b. Set proto to realm's intrinsic object named intrinsicDefaultProto.
    // 4. Return proto.
    match Object::try_from(proto) {
        Ok(proto) => Ok(proto),
        Err(()) => Ok(agent
            .intrinsics()
            .get_intrinsic_default_proto(intrinsic_default_proto)
            .into()),
    }
}
