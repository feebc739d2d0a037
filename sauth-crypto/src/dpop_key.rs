use crate::algorithm::Algorithm;
use crate::error::{Error, Result};
use crate::verify::verify_with;
use ecdsa::elliptic_curve::{
    generic_array::ArrayLength, ops::Invert, subtle::CtOption, CurveArithmetic, PrimeCurve,
    Scalar, SecretKey,
};
use ecdsa::hazmat::{DigestPrimitive, SignPrimitive};
use ecdsa::signature::Signer;
use ecdsa::{Signature, SignatureSize, SigningKey};
use elliptic_curve::JwkEcKey;
use rand::rngs::ThreadRng;

#[derive(Clone, Debug, PartialEq)]
enum Material {
    P256Secret(p256::SecretKey),
    P256Public(p256::PublicKey),
    Secp256k1Secret(k256::SecretKey),
    Secp256k1Public(k256::PublicKey),
}

/// A live DPoP signing key handle.
///
/// The handle always exposes its public JWK. It exposes its private JWK only when it holds
/// secret material and was created extractable.
#[derive(Clone, Debug, PartialEq)]
pub struct DpopKey {
    material: Material,
    extractable: bool,
}

impl DpopKey {
    /// Generates a fresh, extractable key for `alg`.
    pub fn generate(alg: Algorithm) -> Self {
        let mut rng = ThreadRng::default();
        let material = match alg {
            Algorithm::Es256 => Material::P256Secret(p256::SecretKey::random(&mut rng)),
            Algorithm::Es256k => Material::Secp256k1Secret(k256::SecretKey::random(&mut rng)),
        };
        Self { material, extractable: true }
    }
    /// Generates a key for the most preferred algorithm in `allowed_algos`.
    pub fn generate_for<S: AsRef<str>>(allowed_algos: &[S]) -> Option<Self> {
        Algorithm::preferred(allowed_algos).map(Self::generate)
    }
    /// Rebuilds a signing key from a JWK that carries the private `d` parameter.
    pub fn from_private_jwk(jwk: &JwkEcKey) -> Result<Self> {
        let material = match Self::algorithm_of(jwk)? {
            Algorithm::Es256 => {
                Material::P256Secret(p256::SecretKey::from_jwk(jwk).map_err(Error::InvalidKey)?)
            }
            Algorithm::Es256k => Material::Secp256k1Secret(
                k256::SecretKey::from_jwk(jwk).map_err(Error::InvalidKey)?,
            ),
        };
        Ok(Self { material, extractable: true })
    }
    /// Builds a verification-only key from a public JWK.
    pub fn from_public_jwk(jwk: &JwkEcKey) -> Result<Self> {
        let material = match Self::algorithm_of(jwk)? {
            Algorithm::Es256 => {
                Material::P256Public(p256::PublicKey::from_jwk(jwk).map_err(Error::InvalidKey)?)
            }
            Algorithm::Es256k => Material::Secp256k1Public(
                k256::PublicKey::from_jwk(jwk).map_err(Error::InvalidKey)?,
            ),
        };
        Ok(Self { material, extractable: false })
    }
    /// Marks the key as non-extractable: it keeps signing but never exports a private JWK.
    pub fn into_non_extractable(mut self) -> Self {
        self.extractable = false;
        self
    }
    pub fn algorithm(&self) -> Algorithm {
        match self.material {
            Material::P256Secret(_) | Material::P256Public(_) => Algorithm::Es256,
            Material::Secp256k1Secret(_) | Material::Secp256k1Public(_) => Algorithm::Es256k,
        }
    }
    /// Whether the handle holds secret material and can sign.
    pub fn can_sign(&self) -> bool {
        matches!(self.material, Material::P256Secret(_) | Material::Secp256k1Secret(_))
    }
    pub fn is_extractable(&self) -> bool {
        self.extractable
    }
    /// The private JWK, or `None` for public-only and non-extractable keys.
    pub fn private_jwk(&self) -> Option<JwkEcKey> {
        if !self.extractable {
            return None;
        }
        match &self.material {
            Material::P256Secret(secret) => Some(secret.to_jwk()),
            Material::Secp256k1Secret(secret) => Some(secret.to_jwk()),
            _ => None,
        }
    }
    pub fn public_jwk(&self) -> JwkEcKey {
        match &self.material {
            Material::P256Secret(secret) => secret.public_key().to_jwk(),
            Material::P256Public(public) => public.to_jwk(),
            Material::Secp256k1Secret(secret) => secret.public_key().to_jwk(),
            Material::Secp256k1Public(public) => public.to_jwk(),
        }
    }
    /// Signs `msg`, returning the fixed-size `r || s` signature bytes used by JWS.
    pub fn sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
        match &self.material {
            Material::P256Secret(secret) => sign_with(secret, msg),
            Material::Secp256k1Secret(secret) => sign_with(secret, msg),
            _ => Err(Error::PublicKey),
        }
    }
    pub fn verify(&self, msg: &[u8], signature: &[u8]) -> Result<()> {
        match &self.material {
            Material::P256Secret(secret) => verify_with(&secret.public_key(), msg, signature),
            Material::P256Public(public) => verify_with(public, msg, signature),
            Material::Secp256k1Secret(secret) => verify_with(&secret.public_key(), msg, signature),
            Material::Secp256k1Public(public) => verify_with(public, msg, signature),
        }
    }
    fn algorithm_of(jwk: &JwkEcKey) -> Result<Algorithm> {
        Algorithm::from_curve(jwk.crv()).ok_or_else(|| Error::UnsupportedCurve(jwk.crv().into()))
    }
}

fn sign_with<C>(secret: &SecretKey<C>, msg: &[u8]) -> Result<Vec<u8>>
where
    C: PrimeCurve + CurveArithmetic + DigestPrimitive,
    Scalar<C>: Invert<Output = CtOption<Scalar<C>>> + SignPrimitive<C>,
    SignatureSize<C>: ArrayLength<u8>,
{
    let signing_key = SigningKey::<C>::from(secret.clone());
    let signature: Signature<C> = signing_key.try_sign(msg)?;
    Ok(signature.to_bytes().to_vec())
}
