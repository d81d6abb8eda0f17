// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::{
    fmt::Debug,
    ops::{Deref, Index, IndexMut},
    rc::Rc,
};

use crate::{
    ecmascript::{
        execution::{Agent, JsResult, ProtoIntrinsics},
        types::{
            BUILTIN_STRING_MEMORY, InternalMethods, InternalSlots, Object, ObjectHeapData,
            OrdinaryObject, PropertyKey, PropertyValue, String, Value,
        },
    },
    engine::context::{Bindable, GcScope, NoGcScope, bindable_handle},
    heap::{CreateHeapData, Heap, indexes::FunctionIndex},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ArgumentsList<'slice, 'value>(pub(crate) &'slice [Value<'value>]);

impl<'slice, 'value> ArgumentsList<'slice, 'value> {
    pub const fn from_slice(arguments: &'slice [Value<'value>]) -> Self {
        Self(arguments)
    }

    #[inline]
    pub fn get(&self, index: usize) -> Value<'value> {
        *self.0.get(index).unwrap_or(&Value::Undefined)
    }

    /// The argument at `index`, or `None` if fewer arguments were passed.
    #[inline]
    pub fn get_if_present(&self, index: usize) -> Option<Value<'value>> {
        self.0.get(index).copied()
    }

    /// Arguments from `start` onwards.
    pub fn slice_from(&self, start: usize) -> ArgumentsList<'slice, 'value> {
        ArgumentsList(self.0.get(start..).unwrap_or(&[]))
    }
}

impl<'slice, 'value> Deref for ArgumentsList<'slice, 'value> {
    type Target = &'slice [Value<'value>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub type RegularFn =
    for<'gc> fn(&mut Agent, Value, ArgumentsList, GcScope<'gc, '_>) -> JsResult<'gc, Value<'gc>>;
pub type ConstructorFn = for<'gc> fn(
    &mut Agent,
    Value,
    ArgumentsList,
    Option<Object>,
    GcScope<'gc, '_>,
) -> JsResult<'gc, Value<'gc>>;

#[derive(Clone, Copy)]
pub enum Behaviour {
    Regular(RegularFn),
    Constructor(ConstructorFn),
}

impl Debug for Behaviour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Behaviour::Regular(_) => f.write_str("Behaviour::Regular"),
            Behaviour::Constructor(_) => f.write_str("Behaviour::Constructor"),
        }
    }
}

impl Behaviour {
    pub(crate) fn is_constructor(&self) -> bool {
        matches!(self, Behaviour::Constructor(_))
    }
}

pub trait Builtin {
    const NAME: &'static str;
    const LENGTH: u8;
    const BEHAVIOUR: Behaviour;

    /// Set to Some if this builtin's property key is different from `NAME`.
    const KEY: Option<PropertyKey<'static>> = None;
}

/// A builtin installed as an accessor property's getter.
pub trait BuiltinGetter: Builtin {
    const GETTER_KEY: PropertyKey<'static>;
}

pub type HostBehaviour = dyn for<'gc> Fn(&mut Agent, Value, ArgumentsList, GcScope<'gc, '_>) -> JsResult<'gc, Value<'gc>>;

/// A function implemented by a Rust closure supplied by the host.
#[derive(Clone)]
pub struct HostFunction(pub(crate) Rc<HostBehaviour>);

impl Debug for HostFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HostFunction")
    }
}

#[derive(Debug, Clone)]
pub enum FunctionKind {
    Builtin(Behaviour),
    Host(HostFunction),
    /// A subclass constructor created with [`create_derived_constructor`].
    /// Construction is forwarded to the parent with the subclass as
    /// NewTarget.
    Derived { parent: Function<'static> },
}

#[derive(Debug)]
pub struct FunctionHeapData {
    /// Holds `name`, `length`, `prototype` and the function's \[\[Prototype\]\].
    pub(crate) object: OrdinaryObject<'static>,
    pub(crate) kind: FunctionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Function<'a>(pub(crate) FunctionIndex<'a>);
bindable_handle!(Function);

impl CreateHeapData<FunctionHeapData, Function<'static>> for Heap {
    fn create(&mut self, data: FunctionHeapData) -> Function<'static> {
        self.functions.push(data);
        Function(FunctionIndex::last(&self.functions))
    }
}

impl Index<Function<'_>> for Agent {
    type Output = FunctionHeapData;

    fn index(&self, index: Function<'_>) -> &Self::Output {
        &self.heap.functions[index.0.into_index()]
    }
}

impl IndexMut<Function<'_>> for Agent {
    fn index_mut(&mut self, index: Function<'_>) -> &mut Self::Output {
        &mut self.heap.functions[index.0.into_index()]
    }
}

impl<'a> Function<'a> {
    /// ### [7.2.4 IsConstructor ( argument )](https://tc39.es/ecma262/#sec-isconstructor)
    pub fn is_constructor(self, agent: &Agent) -> bool {
        match &agent[self].kind {
            FunctionKind::Builtin(behaviour) => behaviour.is_constructor(),
            FunctionKind::Host(_) => false,
            FunctionKind::Derived { .. } => true,
        }
    }

    /// The function's `name` property, if it is a plain data property.
    pub fn name(self, agent: &Agent) -> Option<&str> {
        let object = agent[self].object;
        match agent[object]
            .properties
            .get(&PropertyKey::from(BUILTIN_STRING_MEMORY.name))
        {
            Some(PropertyValue::Data(Value::String(name))) => Some(name.as_str(agent)),
            _ => None,
        }
    }
}

impl<'a> InternalSlots<'a> for Function<'a> {
    fn default_prototype(self) -> ProtoIntrinsics {
        ProtoIntrinsics::Function
    }

    fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject<'static>> {
        Some(agent[self].object)
    }

    fn set_backing_object(self, _: &mut Agent, _: OrdinaryObject<'static>) {
        unreachable!("functions are created with their backing object")
    }
}

impl<'a> InternalMethods<'a> for Function<'a> {}

fn allocate_function(
    heap: &mut Heap,
    kind: FunctionKind,
    prototype: Option<Object<'static>>,
) -> Function<'static> {
    let object = heap.create(ObjectHeapData::new(prototype));
    heap.create(FunctionHeapData { object, kind })
}

/// Allocate a builtin function whose properties are filled in later by
/// [`initialize_function_properties`]. Used for intrinsics that must exist
/// before the objects they reference.
pub(crate) fn allocate_builtin_function<T: Builtin>(heap: &mut Heap) -> Function<'static> {
    allocate_function(heap, FunctionKind::Builtin(T::BEHAVIOUR), None)
}

/// Set the `length` and `name` properties and the \[\[Prototype\]\] of a
/// function object.
pub(crate) fn initialize_function_properties(
    agent: &mut Agent,
    function: Function,
    name: String,
    length: u8,
    prototype: Option<Object>,
) {
    let object = agent[function].object;
    let data = &mut agent[object];
    data.prototype = prototype.map(|p| p.unbind());
    data.properties.insert(
        BUILTIN_STRING_MEMORY.length.into(),
        PropertyValue::Data(Value::from(length as u32)),
    );
    data.properties.insert(
        BUILTIN_STRING_MEMORY.name.into(),
        PropertyValue::Data(name.unbind().into()),
    );
}

/// ### [10.3.4 CreateBuiltinFunction ( behaviour, length, name, additionalInternalSlotsList \[ , realm \[ , prototype \[ , prefix \] \] \] )](https://tc39.es/ecma262/#sec-createbuiltinfunction)
pub(crate) fn create_builtin_function<'gc>(
    agent: &mut Agent,
    behaviour: Behaviour,
    name: &str,
    length: u8,
    gc: NoGcScope<'gc, '_>,
) -> Function<'gc> {
    let function_prototype = agent
        .intrinsics()
        .get_intrinsic_default_proto(ProtoIntrinsics::Function);
    let function = allocate_function(&mut agent.heap, FunctionKind::Builtin(behaviour), None);
    let name = String::from_str(agent, name, gc);
    initialize_function_properties(agent, function, name, length, Some(function_prototype.into()));
    function
}

/// Create a function object backed by a host closure.
///
/// The closure receives the this value and arguments of each call and may
/// call back into the engine through the agent.
pub fn create_native_function<'gc, F>(
    agent: &mut Agent,
    behaviour: F,
    name: &str,
    length: u8,
    gc: NoGcScope<'gc, '_>,
) -> Function<'gc>
where
    F: for<'a> Fn(&mut Agent, Value, ArgumentsList, GcScope<'a, '_>) -> JsResult<'a, Value<'a>>
        + 'static,
{
    let function_prototype = agent
        .intrinsics()
        .get_intrinsic_default_proto(ProtoIntrinsics::Function);
    let host = HostFunction(Rc::new(behaviour));
    let function = allocate_function(&mut agent.heap, FunctionKind::Host(host), None);
    let name = String::from_str(agent, name, gc);
    initialize_function_properties(agent, function, name, length, Some(function_prototype.into()));
    function
}

/// Create the equivalent of `class <name> extends <parent> {}`.
///
/// The new constructor inherits from `parent`, and its `prototype` object
/// inherits from `parent.prototype`. Constructing it constructs `parent`
/// with the derived constructor as NewTarget, so the result takes its
/// prototype from the derived constructor.
pub fn create_derived_constructor<'gc>(
    agent: &mut Agent,
    parent: Function,
    name: &str,
    gc: NoGcScope<'gc, '_>,
) -> Function<'gc> {
    let parent = parent.unbind();
    let parent_object = agent[parent].object;
    let parent_prototype = match agent[parent_object]
        .properties
        .get(&PropertyKey::from(BUILTIN_STRING_MEMORY.prototype))
    {
        Some(PropertyValue::Data(value)) => Object::try_from(*value).ok(),
        _ => None,
    };
    let function = allocate_function(
        &mut agent.heap,
        FunctionKind::Derived { parent },
        Some(parent.into()),
    );
    let length = match agent[parent_object]
        .properties
        .get(&PropertyKey::from(BUILTIN_STRING_MEMORY.length))
    {
        Some(PropertyValue::Data(Value::Number(length))) => *length as u8,
        _ => 0,
    };
    let name = String::from_str(agent, name, gc);
    initialize_function_properties(agent, function, name, length, Some(parent.into()));
    let prototype = OrdinaryObject::create(agent, parent_prototype, gc).unbind();
    prototype.set_data_property(agent, BUILTIN_STRING_MEMORY.constructor.into(), function.into());
    let function_object = agent[function].object;
    function_object.set_data_property(agent, BUILTIN_STRING_MEMORY.prototype.into(), prototype.into());
    function
}
