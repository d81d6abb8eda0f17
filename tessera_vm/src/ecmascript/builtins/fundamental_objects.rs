// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [20 Fundamental Objects](https://tc39.es/ecma262/#sec-fundamental-objects)
//!
//! Only the parts of %Object.prototype% and %Function.prototype% that the
//! indexed collections rely on.

use crate::{
    ecmascript::{
        abstract_operations::{
            operations_on_objects::{get, has_own_property},
            type_conversion::{to_object, to_property_key},
        },
        builders::OrdinaryObjectBuilder,
        builtins::{ArgumentsList, Behaviour, Builtin},
        execution::{Agent, JsResult},
        types::{BUILTIN_STRING_MEMORY, Object, String, Value, WellKnownSymbol},
    },
    engine::{
        Scopable,
        context::{Bindable, GcScope},
    },
};

pub(crate) struct ObjectPrototype;

struct ObjectPrototypeHasOwnProperty;
impl Builtin for ObjectPrototypeHasOwnProperty {
    const NAME: &'static str = "hasOwnProperty";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ObjectPrototype::has_own_property);
}

pub(crate) struct ObjectPrototypeToString;
impl Builtin for ObjectPrototypeToString {
    const NAME: &'static str = "toString";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ObjectPrototype::to_string);
}

struct ObjectPrototypeValueOf;
impl Builtin for ObjectPrototypeValueOf {
    const NAME: &'static str = "valueOf";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ObjectPrototype::value_of);
}

impl ObjectPrototype {
    /// ### [20.1.3.2 Object.prototype.hasOwnProperty ( V )](https://tc39.es/ecma262/#sec-object.prototype.hasownproperty)
    fn has_own_property<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let this_value = this_value.scope(agent, gc.nogc());
        // 1. Let P be ? ToPropertyKey(V).
        let p = to_property_key(agent, arguments.get(0), gc.reborrow()).unbind()?;
        // 2. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value.get(agent), gc.nogc()).unbind()?;
        // 3. Return ? HasOwnProperty(O, P).
        Ok(has_own_property(agent, o, p).into())
    }

    /// ### [20.1.3.6 Object.prototype.toString ( )](https://tc39.es/ecma262/#sec-object.prototype.tostring)
    pub(crate) fn to_string<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. If the this value is undefined, return "[object Undefined]".
        // 2. If the this value is null, return "[object Null]".
        match this_value {
            Value::Undefined => {
                return Ok(String::from_str(agent, "[object Undefined]", gc.into_nogc()).into());
            }
            Value::Null => return Ok(String::from_str(agent, "[object Null]", gc.into_nogc()).into()),
            _ => {}
        }
        // 3. Let O be ! ToObject(this value).
        let o = to_object(agent, this_value, gc.nogc()).unbind()?;
        // 4. Let isArray be ? IsArray(O).
        // 5. If isArray is true, let builtinTag be "Array".
        // 8. Else if O has a [[Call]] internal method, let builtinTag be "Function".
        // 9. Else if O has an [[ErrorData]] internal slot, let builtinTag be "Error".
        // 15. Else, let builtinTag be "Object".
        let builtin_tag = match o {
            Object::Array(_) => "Array",
            Object::Function(_) => "Function",
            Object::Error(_) => "Error",
            _ => "Object",
        };
        // 16. Let tag be ? Get(O, %Symbol.toStringTag%).
        let tag = get(agent, o, WellKnownSymbol::ToStringTag.into(), gc.reborrow()).unbind()?;
        // 17. If tag is not a String, set tag to builtinTag.
        let tag = match tag {
            Value::String(tag) => tag.as_str(agent).to_owned(),
            _ => builtin_tag.to_owned(),
        };
        // 18. Return the string-concatenation of "[object ", tag, and "]".
        Ok(String::from_string(agent, format!("[object {tag}]"), gc.into_nogc()).into())
    }

    /// ### [20.1.3.7 Object.prototype.valueOf ( )](https://tc39.es/ecma262/#sec-object.prototype.valueof)
    fn value_of<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. Return ? ToObject(this value).
        Ok(to_object(agent, this_value, gc.into_nogc())?.into())
    }

    pub(crate) fn create_intrinsic(agent: &mut Agent) {
        let this = agent.intrinsics().object_prototype();
        OrdinaryObjectBuilder::new_intrinsic_object(agent, this)
            .with_property_capacity(3)
            .with_builtin_function_property::<ObjectPrototypeHasOwnProperty>()
            .with_builtin_function_property::<ObjectPrototypeToString>()
            .with_builtin_function_property::<ObjectPrototypeValueOf>()
            .build();
    }
}

pub(crate) struct FunctionPrototype;

impl FunctionPrototype {
    /// %Function.prototype% is only used as a prototype here; it is not
    /// itself callable.
    pub(crate) fn create_intrinsic(agent: &mut Agent) {
        let this = agent.intrinsics().function_prototype();
        let object_prototype = agent.intrinsics().object_prototype();
        OrdinaryObjectBuilder::new_intrinsic_object(agent, this)
            .with_prototype(object_prototype)
            .with_data_property(BUILTIN_STRING_MEMORY.name.into(), String::EMPTY_STRING.into())
            .with_data_property(BUILTIN_STRING_MEMORY.length.into(), Value::from(0u32))
            .build();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::{
        abstract_operations::operations_on_objects::invoke,
        builtins::Array,
        execution::Options,
        types::PropertyKey,
    };

    #[test]
    fn to_string_uses_the_builtin_tag() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let array = Array::from_slice(agent, &[], gc.nogc()).unbind();
            let result = ObjectPrototype::to_string(
                agent,
                array.into(),
                ArgumentsList::default(),
                gc.reborrow(),
            )
            .unwrap()
            .unbind();
            let Value::String(result) = result else {
                panic!("expected a string");
            };
            assert_eq!(result.as_str(agent), "[object Array]");
        });
    }

    #[test]
    fn has_own_property_sees_array_elements() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let array = Array::from_slice(agent, &[Value::Null], gc.nogc()).unbind();
            let key = PropertyKey::from_str(agent, "hasOwnProperty", gc.nogc()).unbind();
            let own = invoke(agent, array.into(), key, &[Value::Number(0.0)], gc.reborrow())
                .unwrap()
                .unbind();
            assert_eq!(own, Value::Boolean(true));
            let own = invoke(agent, array.into(), key, &[Value::Number(1.0)], gc.reborrow()).unwrap();
            assert_eq!(own, Value::Boolean(false));
        });
    }
}
