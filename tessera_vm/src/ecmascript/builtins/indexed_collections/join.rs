// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Two-pass string joining for Array.prototype.join and
//! %TypedArray%.prototype.join.
//!
//! The first pass is driven by the caller: every element is coerced to a
//! string and pushed into a [`JoinParts`], which keeps a running length and
//! throws as soon as the result would be too long. The second pass writes
//! every part into one buffer sized up front.

use log::trace;

use crate::{
    ecmascript::{
        execution::{Agent, ExceptionType, JsResult},
        types::{Object, String},
    },
    engine::context::{Bindable, GcScope, NoGcScope},
};

/// Maximum length of a string in UTF-16 code units.
pub(crate) const MAX_STRING_LENGTH: usize = (1 << 30) - 25;

/// Parts are reserved up front for at most this many elements; longer
/// (usually sparse) receivers grow the list as they go.
const MAX_PREALLOCATED_PARTS: usize = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinStrategy {
    NoSeparator,
    SingleChar(char),
    MultiChar,
}

/// Coerced element strings of one join, in index order.
#[derive(Debug)]
pub(crate) struct JoinParts {
    separator: String<'static>,
    separator_len: usize,
    parts: Vec<String<'static>>,
    len: usize,
    max_len: usize,
    all_ascii: bool,
}

impl JoinParts {
    pub(crate) fn new(agent: &Agent, separator: String, element_count: usize) -> Self {
        Self {
            separator: separator.unbind(),
            separator_len: separator.utf16_len(agent),
            parts: Vec::with_capacity(element_count.min(MAX_PREALLOCATED_PARTS)),
            len: 0,
            max_len: MAX_STRING_LENGTH,
            all_ascii: separator.is_ascii(agent),
        }
    }

    #[cfg(test)]
    fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Append the string form of the next element.
    ///
    /// Throws a RangeError once the joined result would exceed the maximum
    /// string length.
    pub(crate) fn push<'gc>(
        &mut self,
        agent: &mut Agent,
        part: String,
        gc: NoGcScope<'gc, '_>,
    ) -> JsResult<'gc, ()> {
        let separator_len = if self.parts.is_empty() { 0 } else { self.separator_len };
        let len = self
            .len
            .checked_add(separator_len)
            .and_then(|len| len.checked_add(part.utf16_len(agent)));
        match len {
            Some(len) if len <= self.max_len => self.len = len,
            _ => {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::RangeError,
                    "Invalid string length",
                    gc,
                ));
            }
        }
        self.all_ascii &= part.is_ascii(agent);
        self.parts.push(part.unbind());
        Ok(())
    }

    /// Append an element that joins as the empty string: a hole, undefined
    /// or null.
    pub(crate) fn push_empty<'gc>(&mut self, agent: &mut Agent, gc: NoGcScope<'gc, '_>) -> JsResult<'gc, ()> {
        self.push(agent, String::EMPTY_STRING, gc)
    }

    /// Write every part into a single buffer.
    pub(crate) fn finish<'gc>(self, agent: &mut Agent, gc: NoGcScope<'gc, '_>) -> String<'gc> {
        let Self {
            separator,
            parts,
            len,
            all_ascii,
            ..
        } = self;
        let Some((first, rest)) = parts.split_first() else {
            return String::EMPTY_STRING;
        };
        let separator_str = separator.as_str(agent);
        let strategy = {
            let mut chars = separator_str.chars();
            match (chars.next(), chars.next()) {
                (None, _) => JoinStrategy::NoSeparator,
                (Some(c), None) => JoinStrategy::SingleChar(c),
                _ => JoinStrategy::MultiChar,
            }
        };
        let capacity = if all_ascii {
            len
        } else {
            parts.iter().map(|part| part.as_str(agent).len()).sum::<usize>()
                + separator_str.len() * (parts.len() - 1)
        };
        trace!(
            "join: {} parts, {len} code units, {strategy:?}, ascii: {all_ascii}",
            parts.len()
        );
        let mut buffer = std::string::String::with_capacity(capacity);
        buffer.push_str(first.as_str(agent));
        match strategy {
            JoinStrategy::NoSeparator => {
                for part in rest {
                    buffer.push_str(part.as_str(agent));
                }
            }
            JoinStrategy::SingleChar(c) => {
                for part in rest {
                    buffer.push(c);
                    buffer.push_str(part.as_str(agent));
                }
            }
            JoinStrategy::MultiChar => {
                for part in rest {
                    buffer.push_str(separator_str);
                    buffer.push_str(part.as_str(agent));
                }
            }
        }
        debug_assert_eq!(buffer.len(), capacity);
        String::from_string(agent, buffer, gc)
    }
}

/// Run `join` with `receiver` on the ArrayJoinStack.
///
/// A receiver that is already being joined further up the native stack
/// joins to the empty string instead, which breaks cycles such as an array
/// that contains itself.
pub(crate) fn with_join_stack<'gc, 'scope>(
    agent: &mut Agent,
    receiver: Object,
    gc: GcScope<'gc, 'scope>,
    join: impl FnOnce(&mut Agent, GcScope<'gc, 'scope>) -> JsResult<'gc, String<'gc>>,
) -> JsResult<'gc, String<'gc>> {
    let receiver = receiver.unbind();
    if agent.join_stack.contains(&receiver) {
        trace!("join: cycle detected, joining to the empty string");
        return Ok(String::EMPTY_STRING);
    }
    agent.join_stack.push(receiver);
    let result = join(agent, gc);
    let popped = agent.join_stack.pop();
    debug_assert_eq!(popped, Some(receiver));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::{builtins::Array, execution::Options};

    fn join(agent: &mut Agent, parts: &[&str], separator: &str) -> std::string::String {
        let separator = String::from_str(agent, separator, NoGcScope::intrinsic());
        let mut joined = JoinParts::new(agent, separator, parts.len());
        for part in parts {
            let part = String::from_str(agent, part, NoGcScope::intrinsic());
            joined.push(agent, part, NoGcScope::intrinsic()).unwrap();
        }
        joined.finish(agent, NoGcScope::intrinsic()).as_str(agent).to_owned()
    }

    #[test]
    fn joins_with_every_separator_strategy() {
        let mut agent = Agent::new(Options::default());
        assert_eq!(join(&mut agent, &["1", "", "3"], "-"), "1--3");
        assert_eq!(join(&mut agent, &["a", "b", "c"], ", "), "a, b, c");
        assert_eq!(join(&mut agent, &["a", "b", "c"], ""), "abc");
        assert_eq!(join(&mut agent, &["ä", "b"], "→"), "ä→b");
        assert_eq!(join(&mut agent, &[], ","), "");
        assert_eq!(join(&mut agent, &["only"], ","), "only");
    }

    #[test]
    fn overlong_results_throw_a_range_error() {
        let mut agent = Agent::new(Options::default());
        let gc = NoGcScope::intrinsic();
        let separator = String::from_str(&mut agent, ",", gc);
        let part = String::from_str(&mut agent, "abc", gc);
        let mut joined = JoinParts::new(&agent, separator, 3).with_max_len(7);
        joined.push(&mut agent, part, gc).unwrap();
        joined.push(&mut agent, part, gc).unwrap();
        let error = joined.push(&mut agent, part, gc).unwrap_err();
        assert_eq!(agent.exception_type(error), Some(ExceptionType::RangeError));
        assert_eq!(agent.exception_message(error), Some("Invalid string length"));
    }

    #[test]
    fn nested_joins_of_the_same_receiver_are_empty() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let array = Array::from_slice(agent, &[], gc.nogc()).unbind();
            let result = with_join_stack(agent, array.into(), gc, |agent, gc| {
                let inner = with_join_stack(agent, array.into(), gc, |_, _| {
                    unreachable!("cycle must not be joined again")
                })?;
                assert!(inner.is_empty());
                Ok(String::from_str(agent, "outer", NoGcScope::intrinsic()))
            })
            .unwrap();
            assert_eq!(result.as_str(agent), "outer");
            assert!(agent.join_stack.is_empty());
        });
    }
}
