//! Signature verification against public keys and public JWKs.
use crate::algorithm::Algorithm;
use crate::error::{Error, Result};
use ecdsa::elliptic_curve::{
    generic_array::ArrayLength,
    sec1::{FromEncodedPoint, ModulusSize, ToEncodedPoint},
    AffinePoint, CurveArithmetic, FieldBytesSize, PrimeCurve, PublicKey,
};
use ecdsa::hazmat::{DigestPrimitive, VerifyPrimitive};
use ecdsa::signature::Verifier;
use ecdsa::{Signature, SignatureSize, VerifyingKey};
use elliptic_curve::JwkEcKey;

/// Verifies a `r || s` signature of `msg` with the public half of `jwk`.
pub fn verify_signature(jwk: &JwkEcKey, msg: &[u8], signature: &[u8]) -> Result<()> {
    match Algorithm::from_curve(jwk.crv()) {
        Some(Algorithm::Es256) => verify_with(
            &p256::PublicKey::from_jwk(jwk).map_err(Error::InvalidKey)?,
            msg,
            signature,
        ),
        Some(Algorithm::Es256k) => verify_with(
            &k256::PublicKey::from_jwk(jwk).map_err(Error::InvalidKey)?,
            msg,
            signature,
        ),
        None => Err(Error::UnsupportedCurve(jwk.crv().into())),
    }
}

pub(crate) fn verify_with<C>(public_key: &PublicKey<C>, msg: &[u8], signature: &[u8]) -> Result<()>
where
    C: PrimeCurve + CurveArithmetic + DigestPrimitive,
    AffinePoint<C>: VerifyPrimitive<C> + FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
    SignatureSize<C>: ArrayLength<u8>,
{
    let verifying_key = VerifyingKey::<C>::from(public_key);
    let signature = Signature::<C>::from_slice(signature)?;
    Ok(verifying_key.verify(msg, &signature)?)
}
