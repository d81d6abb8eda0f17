// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cell::RefCell;

use super::Intrinsics;
use crate::{
    ecmascript::{
        builtins::error::{Error, ErrorHeapData},
        types::{Object, String, Value},
    },
    engine::context::{Bindable, GcScope, NoGcScope, bindable_handle},
    heap::{CreateHeapData, Heap},
};

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct Options {
    /// Force every algorithm onto the generic property protocol path.
    pub disable_fast_paths: bool,
    /// Largest gap past the end of a packed array that keeps the array
    /// packed. Larger writes convert the elements to dictionary storage.
    pub sparse_array_threshold: u32,
    /// Allocation limit for array buffers, in bytes.
    pub max_array_buffer_byte_length: usize,
    /// Log every fallback from a fast path at debug level.
    pub log_fast_path_bailouts: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            disable_fast_paths: false,
            sparse_array_threshold: 100,
            max_array_buffer_byte_length: 1 << 32,
            log_fast_path_bailouts: false,
        }
    }
}

pub type JsResult<'a, T> = std::result::Result<T, JsError<'a>>;

/// A thrown value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsError<'a>(Value<'a>);
bindable_handle!(JsError);

impl<'a> JsError<'a> {
    pub(crate) fn new(value: Value<'a>) -> Self {
        Self(value)
    }

    pub fn value(self) -> Value<'a> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionType {
    Error,
    RangeError,
    SyntaxError,
    TypeError,
}

impl ExceptionType {
    pub const fn name(self) -> &'static str {
        match self {
            ExceptionType::Error => "Error",
            ExceptionType::RangeError => "RangeError",
            ExceptionType::SyntaxError => "SyntaxError",
            ExceptionType::TypeError => "TypeError",
        }
    }
}

/// ### [9.7 Agents](https://tc39.es/ecma262/#sec-agents)
#[derive(Debug)]
pub struct Agent {
    pub(crate) heap: Heap,
    pub(crate) options: Options,
    intrinsics: Intrinsics,
    /// Roots of [`Scoped`](crate::engine::Scoped) values. Truncated when a
    /// native call scope ends.
    pub(crate) stack_refs: RefCell<Vec<Value<'static>>>,
    /// Receivers of the Array.prototype.join calls currently on the native
    /// stack.
    pub(crate) join_stack: Vec<Object<'static>>,
}

impl Agent {
    pub fn new(options: Options) -> Self {
        let mut heap = Heap::new();
        let intrinsics = Intrinsics::new(&mut heap);
        let mut agent = Self {
            heap,
            options,
            intrinsics,
            stack_refs: RefCell::new(Vec::with_capacity(64)),
            join_stack: Vec::new(),
        };
        Intrinsics::initialize(&mut agent);
        agent
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    /// Run a closure on a fresh native call stack.
    ///
    /// Values rooted during the closure are released when it returns.
    pub fn run<F, R>(&mut self, f: F) -> R
    where
        F: for<'gc, 'scope> FnOnce(&mut Agent, GcScope<'gc, 'scope>) -> R,
    {
        let depth = self.stack_refs.borrow().len();
        // SAFETY: The root is only alive for the duration of the closure,
        // and the closure cannot obtain another Agent borrow to nest in.
        let (mut gc, mut scope) = unsafe { GcScope::create_root() };
        let result = f(self, GcScope::new(&mut gc, &mut scope));
        self.stack_refs.borrow_mut().truncate(depth);
        result
    }

    /// ### [5.2.3.2 Throw an Exception](https://tc39.es/ecma262/#sec-throw-an-exception)
    pub fn throw_exception_with_static_message<'a>(
        &mut self,
        kind: ExceptionType,
        message: &'static str,
        gc: NoGcScope<'a, '_>,
    ) -> JsError<'a> {
        let message = String::from_str(self, message, gc);
        self.create_exception(kind, message)
    }

    pub fn throw_exception<'a>(
        &mut self,
        kind: ExceptionType,
        message: std::string::String,
        gc: NoGcScope<'a, '_>,
    ) -> JsError<'a> {
        let message = String::from_string(self, message, gc);
        self.create_exception(kind, message)
    }

    fn create_exception<'a>(&mut self, kind: ExceptionType, message: String<'a>) -> JsError<'a> {
        let error: Error<'a> = self
            .heap
            .create(ErrorHeapData::new(kind, Some(message.unbind())));
        JsError(error.into())
    }

    /// The kind of a thrown error object, or `None` if a non-error value was
    /// thrown.
    pub fn exception_type(&self, error: JsError) -> Option<ExceptionType> {
        match error.0 {
            Value::Error(error) => Some(self[error].kind),
            _ => None,
        }
    }

    pub fn exception_message(&self, error: JsError) -> Option<&str> {
        match error.0 {
            Value::Error(error) => self[error].message.map(|message| message.as_str(self)),
            _ => None,
        }
    }

    /// Record a fallback from an algorithm's fast path.
    pub(crate) fn log_bailout(&self, algorithm: &'static str, reason: &'static str) {
        if self.options.log_fast_path_bailouts {
            log::debug!("{algorithm}: leaving fast path ({reason})");
        }
    }
}
