use const_oid::ObjectIdentifier;
use der::{Decode, Encode};
use ecdsa::signature::{SignatureEncoding, Signer};
use ed25519_dalek::{SigningKey as Ed25519SigningKey, VerifyingKey as Ed25519VerifyingKey};
use p256::ecdsa::{SigningKey as P256SigningKey, VerifyingKey as P256VerifyingKey};
use p384::ecdsa::{SigningKey as P384SigningKey, VerifyingKey as P384VerifyingKey};
use pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::SignatureAlgorithm;
use crate::error::{ProfileError, Result};
use crate::pem_utils;

/// Algorithm used when a profile has to generate its own subject key pair.
pub const DEFAULT_KEY_ALGORITHM: KeyAlgorithm = KeyAlgorithm::EcdsaP256;

const PRIVATE_KEY_PEM_LABEL: &str = "PRIVATE KEY";
const PUBLIC_KEY_PEM_LABEL: &str = "PUBLIC KEY";

/// Key algorithms a key pair can be generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    Rsa2048,
    Rsa3072,
    Rsa4096,
    EcdsaP256,
    EcdsaP384,
    Ed25519,
}

impl KeyAlgorithm {
    /// Returns `true` for the RSA family.
    pub fn is_rsa(self) -> bool {
        matches!(
            self,
            KeyAlgorithm::Rsa2048 | KeyAlgorithm::Rsa3072 | KeyAlgorithm::Rsa4096
        )
    }
}

/// A private key together with its public half.
#[derive(Debug, Clone)]
pub enum KeyPair {
    Rsa {
        private: Box<RsaPrivateKey>,
        public: RsaPublicKey,
    },
    EcdsaP256 {
        signing_key: P256SigningKey,
        verifying_key: P256VerifyingKey,
    },
    EcdsaP384 {
        signing_key: P384SigningKey,
        verifying_key: P384VerifyingKey,
    },
    Ed25519 {
        signing_key: Ed25519SigningKey,
    },
}

impl KeyPair {
    /// Generate a key pair for the given algorithm from the OS random source.
    ///
    /// # Errors
    /// Returns [`ProfileError::KeyGenerationError`] when the underlying generator fails.
    pub fn generate(algorithm: KeyAlgorithm) -> Result<Self> {
        tracing::debug!(?algorithm, "generating key pair");
        match algorithm {
            KeyAlgorithm::Rsa2048 => Self::generate_rsa(2048),
            KeyAlgorithm::Rsa3072 => Self::generate_rsa(3072),
            KeyAlgorithm::Rsa4096 => Self::generate_rsa(4096),
            KeyAlgorithm::EcdsaP256 => Ok(Self::generate_ecdsa_p256()),
            KeyAlgorithm::EcdsaP384 => Ok(Self::generate_ecdsa_p384()),
            KeyAlgorithm::Ed25519 => Ok(Self::generate_ed25519()),
        }
    }

    /// Generate an RSA key pair with the specified number of bits.
    pub fn generate_rsa(bits: usize) -> Result<Self> {
        let mut rng = rand_core::OsRng;
        let private = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| ProfileError::KeyGenerationError(e.to_string()))?;
        let public = RsaPublicKey::from(&private);
        Ok(KeyPair::Rsa {
            private: Box::new(private),
            public,
        })
    }

    /// Generate an ECDSA P-256 key pair.
    pub fn generate_ecdsa_p256() -> Self {
        let mut rng = rand_core::OsRng;
        let signing_key = P256SigningKey::random(&mut rng);
        let verifying_key = signing_key.verifying_key().to_owned();
        KeyPair::EcdsaP256 {
            signing_key,
            verifying_key,
        }
    }

    /// Generate an ECDSA P-384 key pair.
    pub fn generate_ecdsa_p384() -> Self {
        let mut rng = rand_core::OsRng;
        let signing_key = P384SigningKey::random(&mut rng);
        let verifying_key = signing_key.verifying_key().to_owned();
        KeyPair::EcdsaP384 {
            signing_key,
            verifying_key,
        }
    }

    /// Generate an Ed25519 key pair.
    pub fn generate_ed25519() -> Self {
        let mut rng = rand_core::OsRng;
        let signing_key = Ed25519SigningKey::generate(&mut rng);
        KeyPair::Ed25519 { signing_key }
    }

    /// Returns the public half of this key pair.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_key_pair(self)
    }

    pub fn is_rsa(&self) -> bool {
        matches!(self, KeyPair::Rsa { .. })
    }

    /// Signature algorithm this key produces when signing certificates.
    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        match self {
            KeyPair::Rsa { .. } => SignatureAlgorithm::Sha256WithRSA,
            KeyPair::EcdsaP256 { .. } => SignatureAlgorithm::Sha256WithECDSA,
            KeyPair::EcdsaP384 { .. } => SignatureAlgorithm::Sha384WithECDSA,
            KeyPair::Ed25519 { .. } => SignatureAlgorithm::Ed25519,
        }
    }

    /// Signs `data`. ECDSA signatures are returned DER-encoded, as X.509 expects.
    pub fn sign_data(&self, data: &[u8]) -> Result<Vec<u8>> {
        let signing_error = |e: ecdsa::signature::Error| ProfileError::SigningError(e.to_string());
        match self {
            KeyPair::Rsa { private, .. } => {
                let signing_key = rsa::pkcs1v15::SigningKey::<Sha256>::new((**private).clone());
                let signature = signing_key.try_sign(data).map_err(signing_error)?;
                Ok(signature.to_vec())
            }
            KeyPair::EcdsaP256 { signing_key, .. } => {
                let signature: p256::ecdsa::Signature =
                    signing_key.try_sign(data).map_err(signing_error)?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            KeyPair::EcdsaP384 { signing_key, .. } => {
                let signature: p384::ecdsa::Signature =
                    signing_key.try_sign(data).map_err(signing_error)?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            KeyPair::Ed25519 { signing_key } => {
                let signature = signing_key.try_sign(data).map_err(signing_error)?;
                Ok(signature.to_bytes().to_vec())
            }
        }
    }

    /// Exports the private key as PKCS#8 DER.
    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>> {
        let document = match self {
            KeyPair::Rsa { private, .. } => private.to_pkcs8_der(),
            KeyPair::EcdsaP256 { signing_key, .. } => signing_key.to_pkcs8_der(),
            KeyPair::EcdsaP384 { signing_key, .. } => signing_key.to_pkcs8_der(),
            KeyPair::Ed25519 { signing_key } => signing_key.to_pkcs8_der(),
        }
        .map_err(|e| ProfileError::EncodingError(e.to_string()))?;
        Ok(document.as_bytes().to_vec())
    }

    /// Exports the private key as a PKCS#8 `PRIVATE KEY` PEM block.
    pub fn to_pkcs8_pem(&self) -> Result<String> {
        Ok(pem_utils::der_to_pem(
            &self.to_pkcs8_der()?,
            PRIVATE_KEY_PEM_LABEL,
        ))
    }

    /// Imports a PKCS#8 DER private key, dispatching on its algorithm identifier.
    pub fn import_from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let info = pkcs8::PrivateKeyInfo::from_der(der)?;
        match info.algorithm.oid {
            const_oid::db::rfc5912::RSA_ENCRYPTION => {
                let private = RsaPrivateKey::from_pkcs8_der(der)?;
                let public = RsaPublicKey::from(&private);
                Ok(KeyPair::Rsa {
                    private: Box::new(private),
                    public,
                })
            }
            const_oid::db::rfc5912::ID_EC_PUBLIC_KEY => match info.algorithm.parameters_oid()? {
                const_oid::db::rfc5912::SECP_256_R_1 => {
                    let signing_key = P256SigningKey::from_pkcs8_der(der)?;
                    let verifying_key = signing_key.verifying_key().to_owned();
                    Ok(KeyPair::EcdsaP256 {
                        signing_key,
                        verifying_key,
                    })
                }
                const_oid::db::rfc5912::SECP_384_R_1 => {
                    let signing_key = P384SigningKey::from_pkcs8_der(der)?;
                    let verifying_key = signing_key.verifying_key().to_owned();
                    Ok(KeyPair::EcdsaP384 {
                        signing_key,
                        verifying_key,
                    })
                }
                curve => Err(ProfileError::InvalidInput(format!(
                    "unsupported elliptic curve {curve}"
                ))),
            },
            const_oid::db::rfc8410::ID_ED_25519 => Ok(KeyPair::Ed25519 {
                signing_key: Ed25519SigningKey::from_pkcs8_der(der)?,
            }),
            oid => Err(ProfileError::InvalidInput(format!(
                "unsupported private key algorithm {oid}"
            ))),
        }
    }

    /// Imports a PKCS#8 `PRIVATE KEY` PEM block.
    pub fn import_from_pkcs8_pem(pem: &str) -> Result<Self> {
        let der = pem_utils::pem_to_der(pem, PRIVATE_KEY_PEM_LABEL)?;
        Self::import_from_pkcs8_der(&der)
    }
}

/// An algorithm-tagged public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    EcdsaP256(P256VerifyingKey),
    EcdsaP384(P384VerifyingKey),
    Ed25519(Ed25519VerifyingKey),
}

impl PublicKey {
    pub fn from_key_pair(key_pair: &KeyPair) -> Self {
        match key_pair {
            KeyPair::Rsa { public, .. } => PublicKey::Rsa(public.clone()),
            KeyPair::EcdsaP256 { verifying_key, .. } => PublicKey::EcdsaP256(verifying_key.clone()),
            KeyPair::EcdsaP384 { verifying_key, .. } => PublicKey::EcdsaP384(verifying_key.clone()),
            KeyPair::Ed25519 { signing_key } => PublicKey::Ed25519(signing_key.verifying_key()),
        }
    }

    pub fn is_rsa(&self) -> bool {
        matches!(self, PublicKey::Rsa(_))
    }

    /// Encodes the key as a DER `SubjectPublicKeyInfo`.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        let document = match self {
            PublicKey::Rsa(key) => key.to_public_key_der(),
            PublicKey::EcdsaP256(key) => key.to_public_key_der(),
            PublicKey::EcdsaP384(key) => key.to_public_key_der(),
            PublicKey::Ed25519(key) => key.to_public_key_der(),
        }
        .map_err(|e| ProfileError::EncodingError(e.to_string()))?;
        Ok(document.as_bytes().to_vec())
    }

    pub fn to_pem(&self) -> Result<String> {
        Ok(pem_utils::der_to_pem(&self.to_der()?, PUBLIC_KEY_PEM_LABEL))
    }

    pub fn to_spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        Ok(SubjectPublicKeyInfoOwned::from_der(&self.to_der()?)?)
    }

    /// Decodes a `SubjectPublicKeyInfo`, failing for algorithms this crate cannot use.
    pub fn from_x509spki(spki: &SubjectPublicKeyInfoOwned) -> Result<Self> {
        let der = spki.to_der()?;
        match spki.algorithm.oid {
            const_oid::db::rfc5912::RSA_ENCRYPTION => {
                Ok(PublicKey::Rsa(RsaPublicKey::from_public_key_der(&der)?))
            }
            const_oid::db::rfc5912::ID_EC_PUBLIC_KEY => match named_curve(spki)? {
                const_oid::db::rfc5912::SECP_256_R_1 => Ok(PublicKey::EcdsaP256(
                    P256VerifyingKey::from_public_key_der(&der)?,
                )),
                const_oid::db::rfc5912::SECP_384_R_1 => Ok(PublicKey::EcdsaP384(
                    P384VerifyingKey::from_public_key_der(&der)?,
                )),
                curve => Err(ProfileError::InvalidInput(format!(
                    "unsupported elliptic curve {curve}"
                ))),
            },
            const_oid::db::rfc8410::ID_ED_25519 => Ok(PublicKey::Ed25519(
                Ed25519VerifyingKey::from_public_key_der(&der)?,
            )),
            oid => Err(ProfileError::InvalidInput(format!(
                "unsupported public key algorithm {oid}"
            ))),
        }
    }

    /// SHA-1 over the subject public key bits (RFC 5280 section 4.2.1.2, method 1).
    pub fn key_identifier(&self) -> Result<Vec<u8>> {
        let spki = self.to_spki()?;
        let digest = <sha1::Sha1 as sha1::Digest>::digest(spki.subject_public_key.raw_bytes());
        Ok(digest.to_vec())
    }
}

/// Named curve OID carried in the parameters of an `id-ecPublicKey` algorithm identifier.
fn named_curve(spki: &SubjectPublicKeyInfoOwned) -> Result<ObjectIdentifier> {
    let parameters = spki.algorithm.parameters.as_ref().ok_or_else(|| {
        ProfileError::DecodingError("EC public key without curve parameters".to_string())
    })?;
    Ok(parameters.decode_as::<ObjectIdentifier>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_matches_algorithm() {
        assert!(matches!(
            KeyPair::generate(KeyAlgorithm::EcdsaP256).unwrap(),
            KeyPair::EcdsaP256 { .. }
        ));
        assert!(matches!(
            KeyPair::generate(KeyAlgorithm::EcdsaP384).unwrap(),
            KeyPair::EcdsaP384 { .. }
        ));
        assert!(matches!(
            KeyPair::generate(KeyAlgorithm::Ed25519).unwrap(),
            KeyPair::Ed25519 { .. }
        ));
        assert!(KeyPair::generate(KeyAlgorithm::Rsa2048).unwrap().is_rsa());
    }

    #[test]
    fn test_spki_decodes_to_same_key() {
        for key_pair in [
            KeyPair::generate_ecdsa_p256(),
            KeyPair::generate_ecdsa_p384(),
            KeyPair::generate_ed25519(),
        ] {
            let public = key_pair.public_key();
            let decoded = PublicKey::from_x509spki(&public.to_spki().unwrap()).unwrap();
            assert_eq!(public, decoded);
        }
    }

    #[test]
    fn test_pkcs8_pem_import() {
        let key_pair = KeyPair::generate_ecdsa_p384();
        let pem = key_pair.to_pkcs8_pem().unwrap();
        assert!(pem.contains("BEGIN PRIVATE KEY"));

        let imported = KeyPair::import_from_pkcs8_pem(&pem).unwrap();
        assert_eq!(imported.public_key(), key_pair.public_key());
    }

    #[test]
    fn test_import_rejects_wrong_label() {
        let pem = KeyPair::generate_ed25519().public_key().to_pem().unwrap();
        let err = KeyPair::import_from_pkcs8_pem(&pem).unwrap_err();
        assert!(matches!(err, ProfileError::DecodingError(_)));
    }

    #[test]
    fn test_key_identifier_is_sha1_sized() {
        let id = KeyPair::generate_ed25519()
            .public_key()
            .key_identifier()
            .unwrap();
        assert_eq!(id.len(), 20);
    }
}
