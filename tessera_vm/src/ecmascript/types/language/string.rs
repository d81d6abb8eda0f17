// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cmp::Ordering;

use crate::{
    ecmascript::execution::Agent,
    engine::context::{NoGcScope, bindable_handle},
    heap::{Heap, indexes::StringIndex},
};

/// ### [6.1.4 The String Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-string-type)
///
/// Strings are interned on creation: two `String` handles are equal if and
/// only if their contents are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct String<'a>(pub(crate) StringIndex<'a>);
bindable_handle!(String);

#[derive(Debug)]
pub struct StringHeapData {
    data: Box<str>,
    utf16_len: usize,
    ascii: bool,
}

impl StringHeapData {
    fn new(data: &str) -> Self {
        Self {
            utf16_len: data.encode_utf16().count(),
            ascii: data.is_ascii(),
            data: data.into(),
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.data
    }
}

impl Heap {
    pub(crate) fn intern_str(&mut self, data: &str) -> StringIndex<'static> {
        if let Some(&index) = self.string_lookup.get(data) {
            return index;
        }
        self.strings.push(StringHeapData::new(data));
        let index = StringIndex::last(&self.strings);
        self.string_lookup.insert(data.into(), index);
        index
    }
}

impl<'a> String<'a> {
    pub const EMPTY_STRING: String<'static> = BUILTIN_STRING_MEMORY.empty;

    pub fn from_str(agent: &mut Agent, data: &str, _: NoGcScope<'a, '_>) -> Self {
        String(agent.heap.intern_str(data))
    }

    pub fn from_string(agent: &mut Agent, data: std::string::String, gc: NoGcScope<'a, '_>) -> Self {
        Self::from_str(agent, &data, gc)
    }

    pub fn as_str<'agent>(self, agent: &'agent Agent) -> &'agent str {
        agent.heap.strings[self.0.into_index()].as_str()
    }

    /// Length in UTF-16 code units.
    pub fn utf16_len(self, agent: &Agent) -> usize {
        agent.heap.strings[self.0.into_index()].utf16_len
    }

    pub fn is_empty(self) -> bool {
        self == String::EMPTY_STRING
    }

    pub fn is_ascii(self, agent: &Agent) -> bool {
        agent.heap.strings[self.0.into_index()].ascii
    }

    /// Lexicographic comparison of the UTF-16 code unit sequences, as used by
    /// IsLessThan for two Strings.
    pub fn code_unit_cmp(self, other: String, agent: &Agent) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }
        let a = self.as_str(agent);
        let b = other.as_str(agent);
        if a.is_ascii() && b.is_ascii() {
            return a.as_bytes().cmp(b.as_bytes());
        }
        a.encode_utf16().cmp(b.encode_utf16())
    }

    /// Concatenate strings into a new interned string.
    pub fn concat(agent: &mut Agent, strings: &[String], gc: NoGcScope<'a, '_>) -> Self {
        let total = strings.iter().map(|s| s.as_str(agent).len()).sum();
        let mut buffer = std::string::String::with_capacity(total);
        for s in strings {
            buffer.push_str(s.as_str(agent));
        }
        Self::from_string(agent, buffer, gc)
    }
}

macro_rules! builtin_strings {
    ($($field: ident: $text: literal),* $(,)?) => {
        /// Strings interned into every heap at creation, in declaration order.
        #[allow(non_snake_case)]
        #[derive(Debug, Clone, Copy)]
        pub struct BuiltinStrings {
            $(pub $field: String<'static>,)*
        }

        pub(crate) const BUILTIN_STRINGS_LIST: &[&str] = &[$($text),*];

        pub const BUILTIN_STRING_MEMORY: BuiltinStrings = {
            let mut index = 0;
            BuiltinStrings {
                $($field: {
                    let s = String(StringIndex::from_index(index));
                    index += 1;
                    s
                },)*
            }
        };
    };
}

builtin_strings! {
    empty: "",
    comma: ",",
    length: "length",
    constructor: "constructor",
    prototype: "prototype",
    name: "name",
    message: "message",
    next: "next",
    value: "value",
    done: "done",
    r#return: "return",
    join: "join",
    byteLength: "byteLength",
    maxByteLength: "maxByteLength",
    byteOffset: "byteOffset",
    buffer: "buffer",
    resizable: "resizable",
    detached: "detached",
    growable: "growable",
    toString: "toString",
    valueOf: "valueOf",
    undefined: "undefined",
    null: "null",
    r#true: "true",
    r#false: "false",
    NaN: "NaN",
    Infinity: "Infinity",
    NegativeInfinity: "-Infinity",
    zero: "0",
    object: "object",
    BYTES_PER_ELEMENT: "BYTES_PER_ELEMENT",
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::execution::{Agent, Options};

    #[test]
    fn builtin_strings_are_interned_in_order() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let length = String::from_str(agent, "length", gc.nogc());
            assert_eq!(length, BUILTIN_STRING_MEMORY.length);
            let empty = String::from_str(agent, "", gc.nogc());
            assert!(empty.is_empty());
            assert_eq!(BUILTIN_STRING_MEMORY.Infinity.as_str(agent), "Infinity");
        });
    }

    #[test]
    fn interning_deduplicates() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let a = String::from_str(agent, "tessera", gc.nogc());
            let b = String::from_string(agent, "tess".to_owned() + "era", gc.nogc());
            assert_eq!(a, b);
        });
    }

    #[test]
    fn code_unit_order_differs_from_code_point_order() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            // U+FF61 is a single code unit; U+1F600 is a surrogate pair
            // starting with 0xD83D, which sorts before 0xFF61.
            let halfwidth = String::from_str(agent, "\u{FF61}", gc.nogc());
            let emoji = String::from_str(agent, "\u{1F600}", gc.nogc());
            assert_eq!(emoji.code_unit_cmp(halfwidth, agent), Ordering::Less);
            assert_eq!(emoji.utf16_len(agent), 2);
        });
    }
}
