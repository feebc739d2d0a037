use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// JWS signing algorithms supported for DPoP keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// ECDSA using P-256 and SHA-256.
    Es256,
    /// ECDSA using secp256k1 and SHA-256.
    Es256k,
}

impl Algorithm {
    const CURVE_P256: &'static str = "P-256";
    const CURVE_SECP256K1: &'static str = "secp256k1";

    /// The JWA name, e.g. `ES256`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Es256 => "ES256",
            Self::Es256k => "ES256K",
        }
    }
    /// The JWK `crv` value of keys for this algorithm.
    pub fn curve(&self) -> &'static str {
        match self {
            Self::Es256 => Self::CURVE_P256,
            Self::Es256k => Self::CURVE_SECP256K1,
        }
    }
    pub fn from_curve(crv: &str) -> Option<Self> {
        match crv {
            Self::CURVE_P256 => Some(Self::Es256),
            Self::CURVE_SECP256K1 => Some(Self::Es256k),
            _ => None,
        }
    }
    /// Picks the most preferred supported algorithm among `algs`, ES256K before ES256.
    /// Unsupported names are skipped.
    pub fn preferred<S: AsRef<str>>(algs: &[S]) -> Option<Self> {
        algs.iter().filter_map(|alg| alg.as_ref().parse().ok()).min_by_key(Self::rank)
    }
    fn rank(&self) -> u8 {
        match self {
            Self::Es256k => 0,
            Self::Es256 => 1,
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ES256" => Ok(Self::Es256),
            "ES256K" => Ok(Self::Es256k),
            _ => Err(Error::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferred() {
        assert_eq!(Algorithm::preferred(&["RS256", "ES256"]), Some(Algorithm::Es256));
        assert_eq!(Algorithm::preferred(&["ES256", "ES256K"]), Some(Algorithm::Es256k));
        assert_eq!(
            Algorithm::preferred(&["PS384", "ES384", "ES256", "EdDSA"]),
            Some(Algorithm::Es256)
        );
        assert_eq!(Algorithm::preferred(&["RS256", "EdDSA"]), None);
        assert_eq!(Algorithm::preferred::<&str>(&[]), None);
    }

    #[test]
    fn curves() {
        for alg in [Algorithm::Es256, Algorithm::Es256k] {
            assert_eq!(Algorithm::from_curve(alg.curve()), Some(alg));
            assert_eq!(alg.as_str().parse::<Algorithm>().expect("should parse"), alg);
        }
        assert_eq!(Algorithm::from_curve("P-384"), None);
        assert!("HS256".parse::<Algorithm>().is_err());
    }
}
