use ciborium_io::Write;
use ciborium_ll::{Encoder, Header};
use num_bigint::{BigInt, Sign};
use num_traits::{ToPrimitive as _, Zero as _};

/// Longest byte string chunk the canonical encoding emits.
const BYTES_CHUNK: usize = 64;

/// Failure to encode [`PlutusData`].
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The underlying writer failed.
    #[error("CBOR encoding failed: {0}")]
    Encode(String),
}

/// The Plutus `Data` type.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum PlutusData {
    /// A constructor with a tag and fields.
    Constr {
        /// The constructor tag.
        tag: BigInt,
        /// The fields.
        fields: Vec<PlutusData>,
    },
    /// An association list.
    Map(Vec<(PlutusData, PlutusData)>),
    /// A list.
    List(Vec<PlutusData>),
    /// An integer.
    Integer(BigInt),
    /// A byte string.
    ByteString(Vec<u8>),
}

impl PlutusData {
    /// `Constr tag fields`
    pub fn constr(tag: impl Into<BigInt>, fields: Vec<PlutusData>) -> Self {
        Self::Constr {
            tag: tag.into(),
            fields,
        }
    }

    /// `I i`
    pub fn integer(i: impl Into<BigInt>) -> Self {
        Self::Integer(i.into())
    }

    /// `B bytes`
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::ByteString(bytes.into())
    }

    /// Serialises to the canonical Plutus CBOR encoding.
    pub fn to_cbor(&self) -> Result<Vec<u8>, DataError> {
        let mut buf = Vec::new();
        let mut enc = Encoder::from(&mut buf);
        self.encode(&mut enc)
            .map_err(|e| DataError::Encode(e.to_string()))?;
        Ok(buf)
    }

    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), W::Error> {
        match self {
            Self::Constr { tag, fields } => match constr_cbor_tag(tag) {
                Some(cbor_tag) => {
                    enc.push(Header::Tag(cbor_tag))?;
                    encode_list(enc, fields)
                }
                None => {
                    enc.push(Header::Tag(102))?;
                    enc.push(Header::Array(Some(2)))?;
                    encode_integer(enc, tag)?;
                    encode_list(enc, fields)
                }
            },
            Self::Map(entries) => {
                enc.push(Header::Map(Some(entries.len())))?;
                for (k, v) in entries {
                    k.encode(enc)?;
                    v.encode(enc)?;
                }
                Ok(())
            }
            Self::List(items) => encode_list(enc, items),
            Self::Integer(i) => encode_integer(enc, i),
            Self::ByteString(bytes) => enc.bytes(bytes, BYTES_CHUNK),
        }
    }
}

/// The compact CBOR tag for constructor alternatives 0 through 127.
fn constr_cbor_tag(tag: &BigInt) -> Option<u64> {
    match tag.to_u64()? {
        t @ 0..=6 => Some(121u64.checked_add(t)?),
        t @ 7..=127 => Some(1280u64.checked_add(t)?.checked_sub(7)?),
        _ => None,
    }
}

fn encode_list<W: Write>(enc: &mut Encoder<W>, items: &[PlutusData]) -> Result<(), W::Error> {
    if items.is_empty() {
        return enc.push(Header::Array(Some(0)));
    }
    enc.push(Header::Array(None))?;
    for item in items {
        item.encode(enc)?;
    }
    enc.push(Header::Break)
}

#[allow(clippy::arithmetic_side_effects)]
fn encode_integer<W: Write>(enc: &mut Encoder<W>, i: &BigInt) -> Result<(), W::Error> {
    if let Some(n) = i.to_u64() {
        return enc.push(Header::Positive(n));
    }
    // CBOR negative integers store -1 - n.
    let magnitude = -i - 1u8;
    if i.sign() == Sign::Minus {
        if let Some(n) = magnitude.to_u64() {
            return enc.push(Header::Negative(n));
        }
        enc.push(Header::Tag(3))?;
        let (_, bytes) = magnitude.to_bytes_be();
        return enc.bytes(&bytes, BYTES_CHUNK);
    }
    debug_assert!(!i.is_zero());
    enc.push(Header::Tag(2))?;
    let (_, bytes) = i.to_bytes_be();
    enc.bytes(&bytes, BYTES_CHUNK)
}
