use std::sync::Arc;

use der::Encode;
use der::asn1::BitString;
use x509_cert::certificate::CertificateInner;

use crate::cert::Certificate;
use crate::cert::extensions::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, KeyUsage, KeyUsages,
    SubjectKeyIdentifier,
};
use crate::cert::params::ExtensionParam;
use crate::cert::template::CertificateTemplate;
use crate::error::{ProfileError, Result};
use crate::key::KeyPair;
use crate::profile::Profile;
use crate::tbs_certificate::TbsCertificate;

/// Represents an entity capable of issuing certificates.
///
/// Implementors provide the issuing certificate and its private key; [`Issuer::issue`]
/// turns an unsigned [`CertificateTemplate`] into a signed [`Certificate`].
pub trait Issuer {
    /// The issuing certificate.
    fn certificate(&self) -> &CertificateTemplate;

    /// The key signing issued certificates, `None` if this issuer cannot sign.
    fn signing_key(&self) -> Option<&KeyPair>;

    /// Signs `subject`.
    ///
    /// Fails with [`ProfileError::InvalidInput`] when there is no signing key, when
    /// `subject` has no public key, or when its validity window is empty.
    fn issue(&self, subject: &CertificateTemplate) -> Result<Certificate> {
        let signing_key = self.signing_key().ok_or_else(|| {
            ProfileError::InvalidInput("issuer has no private key to sign with".to_string())
        })?;
        sign_template(self.certificate(), signing_key, subject)
    }
}

/// A profile issues certificates with its own subject certificate and key, so a signed
/// root or intermediate profile can sign the next level of the chain.
impl Issuer for Profile {
    fn certificate(&self) -> &CertificateTemplate {
        self.subject()
    }

    fn signing_key(&self) -> Option<&KeyPair> {
        self.subject_private_key().map(Arc::as_ref)
    }
}

impl Profile {
    /// Signs the subject certificate of this profile with the issuer private key.
    pub fn create_certificate(&self) -> Result<Certificate> {
        let signing_key = self.issuer_private_key().ok_or_else(|| {
            ProfileError::InvalidInput("profile has no issuer private key".to_string())
        })?;
        sign_template(self.issuer(), signing_key, self.subject())
    }
}

/// An existing CA certificate together with its private key.
#[derive(Debug, Clone)]
pub struct CertificateAuthority {
    template: Arc<CertificateTemplate>,
    private_key: Arc<KeyPair>,
}

impl CertificateAuthority {
    pub fn new(certificate: &Certificate, private_key: KeyPair) -> Result<Self> {
        let template = CertificateTemplate::from_certificate(certificate)?;
        if template.public_key.as_ref() != Some(&private_key.public_key()) {
            return Err(ProfileError::InvalidInput(
                "private key does not match the CA certificate".to_string(),
            ));
        }
        Ok(Self {
            template: Arc::new(template),
            private_key: Arc::new(private_key),
        })
    }

    /// Loads a CA from a PEM certificate and a PKCS#8 PEM private key.
    pub fn from_pem(certificate_pem: &str, private_key_pem: &str) -> Result<Self> {
        Self::new(
            &Certificate::from_pem(certificate_pem)?,
            KeyPair::import_from_pkcs8_pem(private_key_pem)?,
        )
    }

    /// The CA certificate, shareable with the profiles it issues.
    pub fn template(&self) -> Arc<CertificateTemplate> {
        self.template.clone()
    }

    pub fn private_key(&self) -> Arc<KeyPair> {
        self.private_key.clone()
    }
}

impl Issuer for CertificateAuthority {
    fn certificate(&self) -> &CertificateTemplate {
        &self.template
    }

    fn signing_key(&self) -> Option<&KeyPair> {
        Some(self.private_key.as_ref())
    }
}

fn sign_template(
    issuer: &CertificateTemplate,
    signing_key: &KeyPair,
    subject: &CertificateTemplate,
) -> Result<Certificate> {
    let subject_public_key = subject.public_key.clone().ok_or_else(|| {
        ProfileError::InvalidInput("subject certificate has no public key".to_string())
    })?;
    if subject.not_after <= subject.not_before {
        return Err(ProfileError::InvalidInput(format!(
            "not_after ({}) must be later than not_before ({})",
            subject.not_after, subject.not_before
        )));
    }

    // the subject's own issuer field names the signer unless it was left empty
    let issuer_name = if subject.issuer.is_empty() {
        issuer.subject.clone()
    } else {
        subject.issuer.clone()
    };

    let mut key_usage = subject.key_usage;
    if !subject_public_key.is_rsa() {
        key_usage -= KeyUsages::KeyEncipherment;
    }

    let mut extensions = vec![
        ExtensionParam::from_extension(
            SubjectKeyIdentifier(subject_public_key.key_identifier()?),
            false,
        )?,
        ExtensionParam::from_extension(
            AuthorityKeyIdentifier {
                key_identifier: signing_key.public_key().key_identifier()?,
            },
            false,
        )?,
    ];
    if subject.basic_constraints_valid {
        let basic_constraints = BasicConstraints {
            is_ca: subject.is_ca,
            max_path_length: if subject.is_ca {
                subject.path_len_constraint()
            } else {
                None
            },
        };
        extensions.push(ExtensionParam::from_extension(basic_constraints, true)?);
    }
    if !key_usage.is_empty() {
        extensions.push(ExtensionParam::from_extension(KeyUsage(key_usage), true)?);
    }
    if !subject.ext_key_usage.is_empty() {
        let extended_key_usage = ExtendedKeyUsage {
            usage: subject.ext_key_usage.clone(),
        };
        extensions.push(ExtensionParam::from_extension(extended_key_usage, false)?);
    }
    let subject_alt_name = subject.subject_alt_name();
    if !subject_alt_name.is_empty() {
        // RFC 5280 section 4.2.1.6: critical when the subject name is empty
        let critical = subject.subject.is_empty();
        extensions.push(ExtensionParam::from_extension(subject_alt_name, critical)?);
    }

    // explicitly requested extensions replace generated ones with the same OID
    extensions.retain(|generated| {
        !subject
            .extra_extensions
            .iter()
            .any(|extra| extra.oid == generated.oid)
    });
    extensions.extend(subject.extra_extensions.iter().cloned());

    let signature_algorithm = signing_key.signature_algorithm();
    let tbs_certificate = TbsCertificate {
        serial_number: subject.serial_number.clone().unwrap_or_else(random_serial_number),
        signature_algorithm,
        issuer: issuer_name,
        not_before: subject.not_before,
        not_after: subject.not_after,
        subject: subject.subject.clone(),
        subject_public_key,
        extensions,
    }
    .to_tbs_certificate_inner()?;

    let tbs_der = tbs_certificate
        .to_der()
        .map_err(|e| ProfileError::EncodingError(e.to_string()))?;
    let signature = signing_key.sign_data(&tbs_der)?;

    tracing::debug!(
        subject = %subject.subject.common_name,
        issuer = %issuer.subject.common_name,
        ?signature_algorithm,
        "certificate signed"
    );

    Ok(Certificate {
        inner: CertificateInner {
            tbs_certificate,
            signature_algorithm: signature_algorithm.into(),
            signature: BitString::from_bytes(&signature)
                .map_err(|e| ProfileError::EncodingError(e.to_string()))?,
        },
    })
}

/// 128 random bits, made positive and non-zero for DER INTEGER encoding.
fn random_serial_number() -> Vec<u8> {
    let mut serial: [u8; 16] = rand::random();
    serial[0] = (serial[0] & 0x7f) | 0x01;
    serial.to_vec()
}
