// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::{
    ecmascript::{
        builtins::Function,
        execution::Agent,
        types::{String, Value},
    },
    engine::context::{NoGcScope, bindable_handle},
};

/// The well-known symbols the indexed collections consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownSymbol {
    IsConcatSpreadable,
    Iterator,
    Species,
    ToStringTag,
}

impl WellKnownSymbol {
    /// The description used when naming functions keyed by this symbol.
    pub const fn description(self) -> &'static str {
        match self {
            WellKnownSymbol::IsConcatSpreadable => "[Symbol.isConcatSpreadable]",
            WellKnownSymbol::Iterator => "[Symbol.iterator]",
            WellKnownSymbol::Species => "[Symbol.species]",
            WellKnownSymbol::ToStringTag => "[Symbol.toStringTag]",
        }
    }
}

/// ### [6.1.7 The Object Type](https://tc39.es/ecma262/#sec-object-type)
///
/// Integer keys cover every canonical numeric string from `0` up to
/// 2<sup>53</sup> - 1; all other string keys are interned strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey<'a> {
    Integer(u64),
    String(String<'a>),
    Symbol(WellKnownSymbol),
}
bindable_handle!(PropertyKey);

impl<'a> PropertyKey<'a> {
    /// 2<sup>53</sup> - 1
    pub const MAX_INTEGER: u64 = (1 << 53) - 1;

    pub fn from_str(agent: &mut Agent, key: &str, gc: NoGcScope<'a, '_>) -> Self {
        match parse_canonical_integer(key) {
            Some(index) => PropertyKey::Integer(index),
            None => PropertyKey::String(String::from_str(agent, key, gc)),
        }
    }

    /// Convert an interned string into a key, normalising canonical integer
    /// strings to integer keys.
    pub fn from_string(agent: &Agent, key: String<'a>) -> Self {
        match parse_canonical_integer(key.as_str(agent)) {
            Some(index) => PropertyKey::Integer(index),
            None => PropertyKey::String(key),
        }
    }

    /// ### [array index](https://tc39.es/ecma262/#array-index)
    ///
    /// An integer index whose numeric value is below 2<sup>32</sup> - 1.
    pub fn as_array_index(self) -> Option<u32> {
        match self {
            PropertyKey::Integer(index) if index < u32::MAX as u64 => Some(index as u32),
            _ => None,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, PropertyKey::Integer(_))
    }
}

impl From<u32> for PropertyKey<'_> {
    fn from(value: u32) -> Self {
        PropertyKey::Integer(value as u64)
    }
}

impl From<u64> for PropertyKey<'_> {
    fn from(value: u64) -> Self {
        debug_assert!(value <= PropertyKey::MAX_INTEGER);
        PropertyKey::Integer(value)
    }
}

impl From<WellKnownSymbol> for PropertyKey<'_> {
    fn from(value: WellKnownSymbol) -> Self {
        PropertyKey::Symbol(value)
    }
}

/// Builtin names are never numeric, so they convert without a lookup.
impl<'a> From<String<'a>> for PropertyKey<'a> {
    fn from(value: String<'a>) -> Self {
        PropertyKey::String(value)
    }
}

fn parse_canonical_integer(key: &str) -> Option<u64> {
    let bytes = key.as_bytes();
    match bytes {
        [] => None,
        [b'0'] => Some(0),
        [b'0', ..] => None,
        _ if bytes.len() > 16 || !bytes.iter().all(u8::is_ascii_digit) => None,
        _ => key
            .parse::<u64>()
            .ok()
            .filter(|index| *index <= PropertyKey::MAX_INTEGER),
    }
}

/// ### [6.2.6 The Property Descriptor Specification Type](https://tc39.es/ecma262/#sec-property-descriptor-specification-type)
///
/// Properties are always writable, enumerable and configurable; only the
/// data/accessor distinction is tracked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue<'a> {
    Data(Value<'a>),
    Accessor {
        get: Option<Function<'a>>,
        set: Option<Function<'a>>,
    },
}
bindable_handle!(PropertyValue);

#[cfg(test)]
mod tests {
    use super::parse_canonical_integer;

    #[test]
    fn canonical_integers() {
        assert_eq!(parse_canonical_integer("0"), Some(0));
        assert_eq!(parse_canonical_integer("4294967295"), Some(4294967295));
        assert_eq!(parse_canonical_integer("9007199254740991"), Some((1 << 53) - 1));
        assert_eq!(parse_canonical_integer("9007199254740992"), None);
        assert_eq!(parse_canonical_integer("01"), None);
        assert_eq!(parse_canonical_integer("-1"), None);
        assert_eq!(parse_canonical_integer("1.5"), None);
        assert_eq!(parse_canonical_integer(""), None);
    }
}
