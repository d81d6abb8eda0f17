// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cmp::Ordering;

use num_bigint::Sign;
use num_traits::{FromPrimitive, ToPrimitive, Zero};

use super::String;
use crate::{
    ecmascript::execution::Agent,
    engine::context::{NoGcScope, bindable_handle},
    heap::{CreateHeapData, Heap, indexes::BigIntIndex},
};

/// ### [6.1.6.2 The BigInt Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-bigint-type)
///
/// BigInt handles compare by identity; use [`BigInt::equals`] for the
/// mathematical comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BigInt<'a>(pub(crate) BigIntIndex<'a>);
bindable_handle!(BigInt);

#[derive(Debug, Clone)]
pub struct BigIntHeapData {
    pub(crate) data: num_bigint::BigInt,
}

impl CreateHeapData<BigIntHeapData, BigInt<'static>> for Heap {
    fn create(&mut self, data: BigIntHeapData) -> BigInt<'static> {
        self.bigints.push(data);
        BigInt(BigIntIndex::last(&self.bigints))
    }
}

impl<'a> BigInt<'a> {
    pub fn from_num_bigint(agent: &mut Agent, data: num_bigint::BigInt, _: NoGcScope<'a, '_>) -> Self {
        agent.heap.create(BigIntHeapData { data })
    }

    pub fn from_i64(agent: &mut Agent, value: i64, gc: NoGcScope<'a, '_>) -> Self {
        Self::from_num_bigint(agent, value.into(), gc)
    }

    pub fn from_u64(agent: &mut Agent, value: u64, gc: NoGcScope<'a, '_>) -> Self {
        Self::from_num_bigint(agent, value.into(), gc)
    }

    pub fn data(self, agent: &Agent) -> &num_bigint::BigInt {
        &agent.heap.bigints[self.0.into_index()].data
    }

    pub fn is_zero(self, agent: &Agent) -> bool {
        self.data(agent).is_zero()
    }

    /// ### [7.1.15 ToBigInt64 ( argument )](https://tc39.es/ecma262/#sec-tobigint64)
    pub fn to_big_int64(self, agent: &Agent) -> i64 {
        self.to_big_uint64(agent) as i64
    }

    /// ### [7.1.16 ToBigUint64 ( argument )](https://tc39.es/ecma262/#sec-tobiguint64)
    pub fn to_big_uint64(self, agent: &Agent) -> u64 {
        let (sign, digits) = self.data(agent).to_u64_digits();
        let low = digits.first().copied().unwrap_or(0);
        match sign {
            Sign::Minus => low.wrapping_neg(),
            Sign::NoSign | Sign::Plus => low,
        }
    }

    /// Mathematical equality of two BigInts.
    pub fn equals(agent: &Agent, a: BigInt, b: BigInt) -> bool {
        a == b || a.data(agent) == b.data(agent)
    }

    pub fn compare(agent: &Agent, a: BigInt, b: BigInt) -> Ordering {
        a.data(agent).cmp(b.data(agent))
    }

    /// Compare against a Number the way IsLessThan and IsLooselyEqual do.
    /// Returns `None` when `number` is NaN.
    pub fn compare_to_number(self, agent: &Agent, number: f64) -> Option<Ordering> {
        if number.is_nan() {
            return None;
        }
        if number.is_infinite() {
            return Some(if number > 0.0 {
                Ordering::Less
            } else {
                Ordering::Greater
            });
        }
        let data = self.data(agent);
        let truncated = number.trunc();
        let whole = num_bigint::BigInt::from_f64(truncated)?;
        Some(match data.cmp(&whole) {
            Ordering::Equal if number > truncated => Ordering::Less,
            Ordering::Equal if number < truncated => Ordering::Greater,
            ordering => ordering,
        })
    }

    pub fn to_f64(self, agent: &Agent) -> f64 {
        self.data(agent).to_f64().unwrap_or(f64::NAN)
    }

    /// ### [6.1.6.2.21 BigInt::toString ( x, radix )](https://tc39.es/ecma262/#sec-numeric-types-bigint-tostring)
    pub fn to_string_radix_10<'gc>(self, agent: &mut Agent, gc: NoGcScope<'gc, '_>) -> String<'gc> {
        let text = self.data(agent).to_str_radix(10);
        String::from_string(agent, text, gc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::execution::{Agent, Options};

    #[test]
    fn big_int64_wraps_modulo_two_to_the_64() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let big: num_bigint::BigInt = num_bigint::BigInt::from(u64::MAX) + 2u32;
            let value = BigInt::from_num_bigint(agent, big, gc.nogc());
            assert_eq!(value.to_big_uint64(agent), 1);
            let negative = BigInt::from_i64(agent, -1, gc.nogc());
            assert_eq!(negative.to_big_uint64(agent), u64::MAX);
            assert_eq!(negative.to_big_int64(agent), -1);
        });
    }

    #[test]
    fn compares_against_fractional_numbers() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let two = BigInt::from_i64(agent, 2, gc.nogc());
            assert_eq!(two.compare_to_number(agent, 2.5), Some(Ordering::Less));
            assert_eq!(two.compare_to_number(agent, 2.0), Some(Ordering::Equal));
            assert_eq!(two.compare_to_number(agent, 1.5), Some(Ordering::Greater));
            assert_eq!(two.compare_to_number(agent, f64::NAN), None);
        });
    }
}
