//! Hash and signature builtins.

use blake2::{
    Blake2b,
    digest::{
        Digest,
        consts::{U28, U32},
    },
};
use uplc_ast::DefaultFunction;

use super::{CallResult, take};
use crate::{BuiltinError, RunState, Value, byte_string_ex_mem};

pub(super) fn hash<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
    digest: fn(&[u8]) -> Vec<u8>,
) -> CallResult<'a> {
    let [b] = take::<1>(args)?;
    let bytes = b.unwrap_byte_string()?;
    rs.charge(fun, &[byte_string_ex_mem(bytes)])?;
    Ok(Value::byte_string(digest(bytes)))
}

pub(super) fn sha2_256(msg: &[u8]) -> Vec<u8> {
    sha2::Sha256::digest(msg).to_vec()
}

pub(super) fn sha3_256(msg: &[u8]) -> Vec<u8> {
    sha3::Sha3_256::digest(msg).to_vec()
}

pub(super) fn blake2b_256(msg: &[u8]) -> Vec<u8> {
    Blake2b::<U32>::digest(msg).to_vec()
}

pub(super) fn blake2b_224(msg: &[u8]) -> Vec<u8> {
    Blake2b::<U28>::digest(msg).to_vec()
}

pub(super) fn keccak_256(msg: &[u8]) -> Vec<u8> {
    sha3::Keccak256::digest(msg).to_vec()
}

pub(super) fn ripemd_160(msg: &[u8]) -> Vec<u8> {
    ripemd::Ripemd160::digest(msg).to_vec()
}

/// Verifies `(key, message, signature)`.
///
/// Malformed keys and signatures are errors; a well-formed signature that
/// does not verify is `False`.
pub(super) fn verify<'a>(
    rs: &mut RunState<'a>,
    fun: DefaultFunction,
    args: &[Value<'a>],
    check: fn(&[u8], &[u8], &[u8]) -> Result<bool, BuiltinError>,
) -> CallResult<'a> {
    let [k, m, s] = take::<3>(args)?;
    let (key, msg, sig) = (
        k.unwrap_byte_string()?,
        m.unwrap_byte_string()?,
        s.unwrap_byte_string()?,
    );
    rs.charge(
        fun,
        &[
            byte_string_ex_mem(key),
            byte_string_ex_mem(msg),
            byte_string_ex_mem(sig),
        ],
    )?;
    Ok(Value::bool(check(key, msg, sig)?))
}

fn fixed<'b, const N: usize>(what: &'static str, bytes: &'b [u8]) -> Result<&'b [u8; N], BuiltinError> {
    bytes.try_into().map_err(|_| BuiltinError::InvalidLength {
        what,
        expected: N,
        got: bytes.len(),
    })
}

pub(super) fn ed25519(key: &[u8], msg: &[u8], sig: &[u8]) -> Result<bool, BuiltinError> {
    use ed25519_dalek::{Signature, Verifier as _, VerifyingKey};

    let key = VerifyingKey::from_bytes(fixed::<32>("Ed25519 public key", key)?)
        .map_err(|_| BuiltinError::Malformed("Ed25519 public key"))?;
    let sig = Signature::from_bytes(fixed::<64>("Ed25519 signature", sig)?);
    Ok(key.verify(msg, &sig).is_ok())
}

pub(super) fn ecdsa_secp256k1(key: &[u8], msg: &[u8], sig: &[u8]) -> Result<bool, BuiltinError> {
    use k256::ecdsa::{Signature, VerifyingKey, signature::hazmat::PrehashVerifier as _};

    let key = fixed::<33>("ECDSA public key", key)?;
    let msg = fixed::<32>("ECDSA message hash", msg)?;
    let sig = fixed::<64>("ECDSA signature", sig)?;
    let key = VerifyingKey::from_sec1_bytes(key)
        .map_err(|_| BuiltinError::Malformed("ECDSA public key"))?;
    let sig =
        Signature::from_slice(sig).map_err(|_| BuiltinError::Malformed("ECDSA signature"))?;
    Ok(key.verify_prehash(msg, &sig).is_ok())
}

pub(super) fn schnorr_secp256k1(key: &[u8], msg: &[u8], sig: &[u8]) -> Result<bool, BuiltinError> {
    use k256::schnorr::{Signature, VerifyingKey};

    let key = fixed::<32>("Schnorr public key", key)?;
    let sig = fixed::<64>("Schnorr signature", sig)?;
    let key =
        VerifyingKey::from_bytes(key).map_err(|_| BuiltinError::Malformed("Schnorr public key"))?;
    let sig = Signature::try_from(sig.as_slice())
        .map_err(|_| BuiltinError::Malformed("Schnorr signature"))?;
    Ok(key.verify_raw(msg, &sig).is_ok())
}
