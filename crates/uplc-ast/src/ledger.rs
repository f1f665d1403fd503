use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_traits::{One as _, Zero as _};

use crate::PlutusData;

/// Longest currency symbol or token name, in bytes.
pub const MAX_LEDGER_KEY_LEN: usize = 32;

/// Ways a multi-asset value can be malformed.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum LedgerValueError {
    /// A currency symbol or token name is longer than [`MAX_LEDGER_KEY_LEN`].
    #[error("key of {0} bytes exceeds {MAX_LEDGER_KEY_LEN} bytes")]
    KeyTooLong(usize),
    /// A quantity falls outside the signed 128-bit range.
    #[error("quantity {0} is outside the signed 128-bit range")]
    QuantityOutOfRange(BigInt),
    /// Data did not have the shape of a value.
    #[error("malformed value data: {0}")]
    Malformed(&'static str),
}

/// A multi-asset ledger value: currency symbol to token name to quantity.
///
/// Invariants: keys are at most [`MAX_LEDGER_KEY_LEN`] bytes, quantities are
/// non-zero and fit in 128 signed bits, and inner maps are never empty.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct LedgerValue(BTreeMap<Vec<u8>, BTreeMap<Vec<u8>, BigInt>>);

impl LedgerValue {
    /// The empty value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of (currency, token) entries.
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    /// Reports whether the value holds no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Looks up a quantity, returning zero when absent.
    pub fn lookup(&self, currency: &[u8], token: &[u8]) -> BigInt {
        self.0
            .get(currency)
            .and_then(|tokens| tokens.get(token))
            .cloned()
            .unwrap_or_default()
    }

    /// Sets a quantity, removing the entry when `quantity` is zero.
    pub fn insert(
        &mut self,
        currency: &[u8],
        token: &[u8],
        quantity: BigInt,
    ) -> Result<(), LedgerValueError> {
        check_key(currency)?;
        check_key(token)?;
        check_quantity(&quantity)?;
        if quantity.is_zero() {
            if let Some(tokens) = self.0.get_mut(currency) {
                tokens.remove(token);
                if tokens.is_empty() {
                    self.0.remove(currency);
                }
            }
        } else {
            self.0
                .entry(currency.to_vec())
                .or_default()
                .insert(token.to_vec(), quantity);
        }
        Ok(())
    }

    /// Iterates over `(currency, token, quantity)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8], &BigInt)> {
        self.0.iter().flat_map(|(currency, tokens)| {
            tokens
                .iter()
                .map(move |(token, q)| (currency.as_slice(), token.as_slice(), q))
        })
    }

    /// Pointwise sum.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn union(&self, other: &Self) -> Result<Self, LedgerValueError> {
        let mut out = self.clone();
        for (currency, token, q) in other.iter() {
            let sum = out.lookup(currency, token) + q;
            out.insert(currency, token, sum)?;
        }
        Ok(out)
    }

    /// Multiplies every quantity by `factor`.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn scale(&self, factor: &BigInt) -> Result<Self, LedgerValueError> {
        let mut out = Self::new();
        for (currency, token, q) in self.iter() {
            out.insert(currency, token, q * factor)?;
        }
        Ok(out)
    }

    /// Reports whether every quantity in `other` is at most the matching
    /// quantity in `self`.
    pub fn contains(&self, other: &Self) -> bool {
        other
            .iter()
            .all(|(currency, token, q)| self.lookup(currency, token) >= *q)
    }

    /// Encodes as `Map [(B currency, Map [(B token, I quantity)])]`.
    pub fn to_data(&self) -> PlutusData {
        PlutusData::Map(
            self.0
                .iter()
                .map(|(currency, tokens)| {
                    (
                        PlutusData::bytes(currency.clone()),
                        PlutusData::Map(
                            tokens
                                .iter()
                                .map(|(token, q)| {
                                    (PlutusData::bytes(token.clone()), PlutusData::Integer(q.clone()))
                                })
                                .collect(),
                        ),
                    )
                })
                .collect(),
        )
    }

    /// Decodes the shape produced by [`LedgerValue::to_data`].
    ///
    /// Zero quantities, empty inner maps and repeated keys are rejected.
    pub fn from_data(data: &PlutusData) -> Result<Self, LedgerValueError> {
        let PlutusData::Map(outer) = data else {
            return Err(LedgerValueError::Malformed("expected a map"));
        };
        let mut out = Self::new();
        for (k, v) in outer {
            let (PlutusData::ByteString(currency), PlutusData::Map(inner)) = (k, v) else {
                return Err(LedgerValueError::Malformed("expected bytes => map"));
            };
            if inner.is_empty() {
                return Err(LedgerValueError::Malformed("empty token map"));
            }
            if out.0.contains_key(currency) {
                return Err(LedgerValueError::Malformed("duplicate currency symbol"));
            }
            for (k, v) in inner {
                let (PlutusData::ByteString(token), PlutusData::Integer(q)) = (k, v) else {
                    return Err(LedgerValueError::Malformed("expected bytes => integer"));
                };
                if q.is_zero() {
                    return Err(LedgerValueError::Malformed("zero quantity"));
                }
                if out.0.get(currency).is_some_and(|t| t.contains_key(token)) {
                    return Err(LedgerValueError::Malformed("duplicate token name"));
                }
                out.insert(currency, token, q.clone())?;
            }
        }
        Ok(out)
    }
}

fn check_key(key: &[u8]) -> Result<(), LedgerValueError> {
    if key.len() > MAX_LEDGER_KEY_LEN {
        return Err(LedgerValueError::KeyTooLong(key.len()));
    }
    Ok(())
}

#[allow(clippy::arithmetic_side_effects)]
fn check_quantity(q: &BigInt) -> Result<(), LedgerValueError> {
    let bound = BigInt::one() << 127u32;
    if *q >= bound || *q < -bound {
        return Err(LedgerValueError::QuantityOutOfRange(q.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use num_traits::One as _;

    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut v = LedgerValue::new();
        v.insert(b"cur", b"tok", 5.into()).unwrap();
        assert_eq!(v.lookup(b"cur", b"tok"), BigInt::from(5));
        assert_eq!(v.lookup(b"cur", b"other"), BigInt::from(0));
        assert_eq!(v.len(), 1);

        v.insert(b"cur", b"tok", 0.into()).unwrap();
        assert!(v.is_empty());
    }

    #[test]
    fn test_limits() {
        let mut v = LedgerValue::new();
        assert_eq!(
            v.insert(&[0; 33], b"tok", 1.into()),
            Err(LedgerValueError::KeyTooLong(33))
        );
        let too_big = BigInt::one() << 127u32;
        assert!(matches!(
            v.insert(b"c", b"t", too_big),
            Err(LedgerValueError::QuantityOutOfRange(_))
        ));
    }

    #[test]
    fn test_union_cancels() {
        let mut a = LedgerValue::new();
        a.insert(b"c", b"t", 3.into()).unwrap();
        let mut b = LedgerValue::new();
        b.insert(b"c", b"t", (-3).into()).unwrap();
        b.insert(b"d", b"t", 1.into()).unwrap();
        let u = a.union(&b).unwrap();
        assert_eq!(u.len(), 1);
        assert_eq!(u.lookup(b"d", b"t"), BigInt::from(1));
    }

    #[test]
    fn test_data_round_trip() {
        let mut v = LedgerValue::new();
        v.insert(b"c", b"t", 3.into()).unwrap();
        v.insert(b"", b"", (-7).into()).unwrap();
        assert_eq!(LedgerValue::from_data(&v.to_data()).unwrap(), v);
    }
}
