// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Builders used to populate the intrinsic objects.

use crate::{
    ecmascript::{
        builtins::{
            Builtin, BuiltinGetter, Function,
            builtin_function::{create_builtin_function, initialize_function_properties},
        },
        execution::Agent,
        types::{BUILTIN_STRING_MEMORY, Object, OrdinaryObject, PropertyKey, PropertyValue, String, Value},
    },
    engine::context::{Bindable, NoGcScope},
};

/// Fills in a preallocated intrinsic ordinary object.
pub(crate) struct OrdinaryObjectBuilder<'agent> {
    agent: &'agent mut Agent,
    this: OrdinaryObject<'static>,
    properties: Vec<(PropertyKey<'static>, PropertyValue<'static>)>,
}

impl<'agent> OrdinaryObjectBuilder<'agent> {
    #[must_use]
    pub(crate) fn new_intrinsic_object(agent: &'agent mut Agent, this: OrdinaryObject<'static>) -> Self {
        Self {
            agent,
            this,
            properties: Vec::new(),
        }
    }

    #[must_use]
    pub(crate) fn with_prototype(self, prototype: impl Into<Object<'static>>) -> Self {
        self.agent[self.this].prototype = Some(prototype.into());
        self
    }

    #[must_use]
    pub(crate) fn with_property_capacity(mut self, capacity: usize) -> Self {
        self.properties.reserve(capacity);
        self
    }

    #[must_use]
    pub(crate) fn with_data_property(mut self, key: PropertyKey<'static>, value: Value<'static>) -> Self {
        self.properties.push((key, PropertyValue::Data(value)));
        self
    }

    #[must_use]
    pub(crate) fn with_constructor_property(self, constructor: Function<'static>) -> Self {
        self.with_data_property(BUILTIN_STRING_MEMORY.constructor.into(), constructor.into())
    }

    #[must_use]
    pub(crate) fn with_builtin_function_property<T: Builtin>(mut self) -> Self {
        let function = build_builtin_function::<T>(self.agent);
        let key = builtin_key::<T>(self.agent);
        self.properties
            .push((key, PropertyValue::Data(function.into())));
        self
    }

    /// Install an already allocated intrinsic function, such as
    /// `%Array.prototype.values%`, as a property.
    #[must_use]
    pub(crate) fn with_intrinsic_function_property<T: Builtin>(mut self, function: Function<'static>) -> Self {
        let name = String::from_str(self.agent, T::NAME, NoGcScope::intrinsic()).unbind();
        let function_prototype = self.agent.intrinsics().function_prototype();
        initialize_function_properties(self.agent, function, name, T::LENGTH, Some(function_prototype.into()));
        let key = builtin_key::<T>(self.agent);
        self.properties
            .push((key, PropertyValue::Data(function.into())));
        self
    }

    /// Install an existing function under an additional key.
    #[must_use]
    pub(crate) fn with_function_alias(mut self, key: PropertyKey<'static>, function: Function<'static>) -> Self {
        self.properties
            .push((key, PropertyValue::Data(function.into())));
        self
    }

    #[must_use]
    pub(crate) fn with_builtin_function_getter_property<T: BuiltinGetter>(mut self) -> Self {
        let getter = build_builtin_function::<T>(self.agent);
        self.properties.push((
            T::GETTER_KEY,
            PropertyValue::Accessor {
                get: Some(getter),
                set: None,
            },
        ));
        self
    }

    pub(crate) fn build(self) -> OrdinaryObject<'static> {
        let data = &mut self.agent[self.this];
        data.properties.extend(self.properties);
        self.this
    }
}

/// Fills in a preallocated intrinsic constructor.
pub(crate) struct BuiltinFunctionBuilder<'agent> {
    inner: OrdinaryObjectBuilder<'agent>,
}

impl<'agent> BuiltinFunctionBuilder<'agent> {
    #[must_use]
    pub(crate) fn new_intrinsic_constructor<T: Builtin>(
        agent: &'agent mut Agent,
        this: Function<'static>,
        prototype: Option<Object<'static>>,
    ) -> Self {
        let prototype = prototype.or_else(|| Some(agent.intrinsics().function_prototype().into()));
        let name = String::from_str(agent, T::NAME, NoGcScope::intrinsic()).unbind();
        initialize_function_properties(agent, this, name, T::LENGTH, prototype);
        let object = agent[this].object;
        Self {
            inner: OrdinaryObjectBuilder::new_intrinsic_object(agent, object),
        }
    }

    #[must_use]
    pub(crate) fn with_prototype_property(self, prototype: impl Into<Object<'static>>) -> Self {
        let prototype: Object<'static> = prototype.into();
        Self {
            inner: self
                .inner
                .with_data_property(BUILTIN_STRING_MEMORY.prototype.into(), prototype.into()),
        }
    }

    #[must_use]
    pub(crate) fn with_property_capacity(self, capacity: usize) -> Self {
        Self {
            inner: self.inner.with_property_capacity(capacity),
        }
    }

    #[must_use]
    pub(crate) fn with_builtin_function_property<T: Builtin>(self) -> Self {
        Self {
            inner: self.inner.with_builtin_function_property::<T>(),
        }
    }

    #[must_use]
    pub(crate) fn with_builtin_function_getter_property<T: BuiltinGetter>(self) -> Self {
        Self {
            inner: self.inner.with_builtin_function_getter_property::<T>(),
        }
    }

    #[must_use]
    pub(crate) fn with_data_property(self, key: PropertyKey<'static>, value: Value<'static>) -> Self {
        Self {
            inner: self.inner.with_data_property(key, value),
        }
    }

    pub(crate) fn build(self) {
        self.inner.build();
    }
}

fn builtin_key<T: Builtin>(agent: &mut Agent) -> PropertyKey<'static> {
    match T::KEY {
        Some(key) => key,
        None => PropertyKey::String(String::from_str(agent, T::NAME, NoGcScope::intrinsic()).unbind()),
    }
}

fn build_builtin_function<T: Builtin>(agent: &mut Agent) -> Function<'static> {
    create_builtin_function(agent, T::BEHAVIOUR, T::NAME, T::LENGTH, NoGcScope::intrinsic()).unbind()
}
