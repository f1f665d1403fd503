//! Memory sizes of constants, in 64-bit words, as seen by costing functions.

use num_bigint::BigInt;
use num_traits::{Signed as _, ToPrimitive as _, Zero as _};
use uplc_ast::{Constant, ConstantList, PlutusData};

/// Per-node overhead of a data value.
const DATA_NODE: i64 = 4;

fn words(len: u64, word: u64) -> i64 {
    len.div_ceil(word).try_into().unwrap_or(i64::MAX)
}

/// Size of an integer: one word for zero, otherwise the number of 64-bit
/// words holding its magnitude.
pub fn integer_ex_mem(i: &BigInt) -> i64 {
    if i.is_zero() {
        return 1;
    }
    words(i.bits(), 64)
}

/// Size of a byte string: one word for the empty string, otherwise the
/// number of 8-byte words.
pub fn byte_string_ex_mem(b: &[u8]) -> i64 {
    if b.is_empty() {
        return 1;
    }
    words(b.len() as u64, 8)
}

/// Size of a string: characters counted in groups of eight.
pub fn string_ex_mem(s: &str) -> i64 {
    words(s.chars().count() as u64, 8)
}

/// Size of a data value: a fixed overhead per node plus leaf payloads.
pub fn data_ex_mem(d: &PlutusData) -> i64 {
    DataSizes::new(d).fold(0, i64::saturating_add)
}

/// The size used by `equalsData`.
///
/// Both values are walked together and sizing stops once either is
/// exhausted, so comparing a large value against a small one costs
/// roughly the size of the smaller.
pub fn equals_data_ex_mem(a: &PlutusData, b: &PlutusData) -> i64 {
    let (mut xs, mut ys) = (DataSizes::new(a), DataSizes::new(b));
    let (mut x_total, mut y_total) = (0i64, 0i64);
    loop {
        match (xs.next(), ys.next()) {
            (Some(x), Some(y)) => {
                x_total = x_total.saturating_add(x);
                y_total = y_total.saturating_add(y);
            }
            (Some(x), None) => return y_total.min(x_total.saturating_add(x)),
            (None, Some(y)) => return x_total.min(y_total.saturating_add(y)),
            (None, None) => return x_total.min(y_total),
        }
    }
}

/// Size of any constant.
pub fn constant_ex_mem(c: &Constant) -> i64 {
    match c {
        Constant::Integer(i) => integer_ex_mem(i),
        Constant::ByteString(b) => byte_string_ex_mem(b),
        Constant::String(s) => string_ex_mem(s),
        Constant::Unit | Constant::Bool(_) => 1,
        Constant::Data(d) => data_ex_mem(d),
        Constant::ProtoList(_, items) => items
            .iter()
            .map(constant_ex_mem)
            .fold(0, i64::saturating_add),
        Constant::ProtoPair(_, _, a, b) => 1i64
            .saturating_add(constant_ex_mem(a))
            .saturating_add(constant_ex_mem(b)),
        Constant::ProtoArray(_, items) => items.len().try_into().unwrap_or(i64::MAX),
        Constant::Bls12_381G1Element(_) => 18,
        Constant::Bls12_381G2Element(_) => 36,
        Constant::Bls12_381MlResult(_) => 72,
        Constant::Value(v) => v.len().try_into().unwrap_or(i64::MAX),
    }
}

/// An integer argument costed by its magnitude rather than its width.
///
/// Huge values saturate.
pub fn literal_size(i: &BigInt) -> i64 {
    i.abs().to_i64().unwrap_or(i64::MAX)
}

/// An integer argument that counts bytes, costed in 8-byte words.
pub fn bytes_as_words(i: &BigInt) -> i64 {
    if i.is_zero() {
        return 0;
    }
    match i.abs().to_u64() {
        Some(n) => words(n, 8),
        None => i64::MAX,
    }
}

/// A list argument costed by its length.
pub fn list_length(items: &ConstantList) -> i64 {
    items.len().try_into().unwrap_or(i64::MAX)
}

/// Yields the size contribution of each node of a data value, in
/// depth-first order.
struct DataSizes<'d> {
    stack: Vec<&'d PlutusData>,
}

impl<'d> DataSizes<'d> {
    fn new(d: &'d PlutusData) -> Self {
        Self { stack: vec![d] }
    }
}

impl Iterator for DataSizes<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let d = self.stack.pop()?;
        let payload = match d {
            PlutusData::Constr { fields, .. } => {
                self.stack.extend(fields.iter().rev());
                0
            }
            PlutusData::Map(entries) => {
                for (k, v) in entries.iter().rev() {
                    self.stack.push(v);
                    self.stack.push(k);
                }
                0
            }
            PlutusData::List(items) => {
                self.stack.extend(items.iter().rev());
                0
            }
            PlutusData::Integer(i) => integer_ex_mem(i),
            PlutusData::ByteString(b) => byte_string_ex_mem(b),
        };
        Some(DATA_NODE.saturating_add(payload))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_integer_sizes() {
        assert_eq!(integer_ex_mem(&BigInt::from(0)), 1);
        assert_eq!(integer_ex_mem(&BigInt::from(1)), 1);
        assert_eq!(integer_ex_mem(&BigInt::from(-1)), 1);
        assert_eq!(integer_ex_mem(&BigInt::from(u64::MAX)), 1);
        assert_eq!(integer_ex_mem(&(BigInt::from(u64::MAX) + 1)), 2);
    }

    #[test]
    fn test_byte_and_string_sizes() {
        assert_eq!(byte_string_ex_mem(&[]), 1);
        assert_eq!(byte_string_ex_mem(&[0; 8]), 1);
        assert_eq!(byte_string_ex_mem(&[0; 9]), 2);
        assert_eq!(string_ex_mem(""), 0);
        assert_eq!(string_ex_mem("héllo"), 1);
        assert_eq!(string_ex_mem("123456789"), 2);
    }

    #[test]
    fn test_data_sizes() {
        let d = PlutusData::List(vec![PlutusData::integer(1), PlutusData::bytes(vec![])]);
        assert_eq!(data_ex_mem(&d), 4 + 5 + 5);
        let small = PlutusData::integer(0);
        assert_eq!(equals_data_ex_mem(&d, &small), 5);
        assert_eq!(equals_data_ex_mem(&small, &d), 5);
        assert_eq!(equals_data_ex_mem(&d, &d), 14);
    }

    #[test]
    fn test_literal_measures() {
        assert_eq!(literal_size(&BigInt::from(-5)), 5);
        assert_eq!(literal_size(&BigInt::from(5)), 5);
        assert_eq!(literal_size(&(BigInt::from(i64::MAX) * 4)), i64::MAX);
        assert_eq!(bytes_as_words(&BigInt::from(0)), 0);
        assert_eq!(bytes_as_words(&BigInt::from(8)), 1);
        assert_eq!(bytes_as_words(&BigInt::from(9)), 2);
    }
}
