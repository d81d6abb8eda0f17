// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use clap::ValueEnum;
use tessera_vm::{
    ecmascript::{
        abstract_operations::operations_on_objects::{get, invoke, length_of_array_like},
        builtins::Array,
        execution::{Agent, JsError, JsResult},
        types::{ElementType, Object, PropertyKey, String, Value},
    },
    engine::{Bindable, GcScope},
};

/// The collection a command builds its input values into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Collection {
    Array,
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl Collection {
    fn element_type(self) -> Option<ElementType> {
        match self {
            Collection::Array => None,
            Collection::Int8 => Some(ElementType::Int8),
            Collection::Uint8 => Some(ElementType::Uint8),
            Collection::Uint8Clamped => Some(ElementType::Uint8Clamped),
            Collection::Int16 => Some(ElementType::Int16),
            Collection::Uint16 => Some(ElementType::Uint16),
            Collection::Int32 => Some(ElementType::Int32),
            Collection::Uint32 => Some(ElementType::Uint32),
            Collection::Float32 => Some(ElementType::Float32),
            Collection::Float64 => Some(ElementType::Float64),
        }
    }
}

/// Build an Array, or a TypedArray through its `from` method, holding the
/// given numbers.
pub fn build_collection(
    agent: &mut Agent,
    collection: Collection,
    values: &[f64],
    mut gc: GcScope,
) -> JsResult<'static, Value<'static>> {
    let elements = values.iter().map(|n| Value::from_f64(*n)).collect::<Vec<_>>();
    let array = Array::from_slice(agent, &elements, gc.nogc()).unbind();
    let Some(element_type) = collection.element_type() else {
        return Ok(array.into());
    };
    let constructor = agent.intrinsics().typed_array_constructor(element_type);
    call_method(agent, constructor, "from", &[array.into()], gc.reborrow())
}

pub fn call_method(
    agent: &mut Agent,
    receiver: impl Into<Value<'static>>,
    name: &str,
    arguments: &[Value<'static>],
    mut gc: GcScope,
) -> JsResult<'static, Value<'static>> {
    let key = String::from_str(agent, name, gc.nogc()).unbind();
    invoke(agent, receiver.into(), key.into(), arguments, gc.reborrow()).unbind()
}

/// Render a value for the terminal. Array-likes are listed element by
/// element.
pub fn render(agent: &mut Agent, value: Value, mut gc: GcScope) -> JsResult<'static, std::string::String> {
    if let Ok(string) = String::try_from(value) {
        return Ok(format!("{:?}", string.as_str(agent)));
    }
    let Ok(o) = Object::try_from(value) else {
        return Ok(match value {
            Value::Undefined => "undefined".to_owned(),
            Value::Null => "null".to_owned(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            value => format!("{value:?}"),
        });
    };
    let o = o.unbind();
    let len = length_of_array_like(agent, o, gc.reborrow()).unbind()?;
    let mut elements = Vec::with_capacity(len as usize);
    for k in 0..len {
        let element = get(agent, o, PropertyKey::from(k), gc.reborrow()).unbind()?;
        elements.push(render(agent, element, gc.reborrow())?);
    }
    Ok(format!("[{}]", elements.join(", ")))
}

/// The message of an uncaught exception.
pub fn describe_error(agent: &Agent, error: JsError) -> std::string::String {
    match (agent.exception_type(error), agent.exception_message(error)) {
        (Some(kind), Some(message)) => format!("{}: {message}", kind.name()),
        (Some(kind), None) => kind.name().to_owned(),
        (None, _) => format!("{:?}", error.value()),
    }
}
