//! Certificate profiles: an unsigned template bundled with the key material to sign it.
//!
//! Every profile is built by the same constructor. An entry point (see [`leaf`] and
//! [`ca`]) computes a kind-specific default template, then [`Profile::construct`]
//! applies the caller's [`ProfileOption`]s in order and resolves the subject key pair:
//!
//! ```text
//! Unconstructed --options--> OptionsApplied --key resolution--> Finalized
//! ```
//!
//! A finalized profile is immutable. The only exception is the issuer-key link made by
//! the self-signed entry points, which cannot be reached from outside this module.

pub mod ca;
pub mod leaf;
pub mod options;

use std::sync::Arc;

use time::Duration;

pub use options::ProfileOption;

use crate::cert::params::DistinguishedName;
use crate::cert::template::CertificateTemplate;
use crate::error::{ProfileError, Result};
use crate::key::{DEFAULT_KEY_ALGORITHM, KeyAlgorithm, KeyPair, PublicKey};

/// Validity of a freshly built leaf certificate.
pub const DEFAULT_CERT_VALIDITY: Duration = Duration::hours(24);

/// Validity of a freshly built intermediate CA certificate.
pub const DEFAULT_INTERMEDIATE_CERT_VALIDITY: Duration = Duration::days(365 * 10);

/// Validity of a freshly built root CA certificate.
pub const DEFAULT_ROOT_CERT_VALIDITY: Duration = Duration::days(365 * 10);

/// The certificate variants a profile can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    Leaf,
    Intermediate,
    Root,
}

impl ProfileKind {
    /// Default template for this kind, valid from now.
    pub fn default_template(
        self,
        subject: DistinguishedName,
        issuer: DistinguishedName,
    ) -> CertificateTemplate {
        match self {
            ProfileKind::Leaf => leaf::default_leaf_template(subject, issuer),
            ProfileKind::Intermediate => ca::default_intermediate_template(subject, issuer),
            ProfileKind::Root => ca::default_root_template(subject, issuer),
        }
    }

    pub fn default_validity(self) -> Duration {
        match self {
            ProfileKind::Leaf => DEFAULT_CERT_VALIDITY,
            ProfileKind::Intermediate => DEFAULT_INTERMEDIATE_CERT_VALIDITY,
            ProfileKind::Root => DEFAULT_ROOT_CERT_VALIDITY,
        }
    }
}

/// The subject's key material. `private_key` is `None` when only the public key was
/// supplied (template and CSR profiles).
#[derive(Debug, Clone)]
pub struct SubjectKeyPair {
    public_key: PublicKey,
    private_key: Option<Arc<KeyPair>>,
}

impl SubjectKeyPair {
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn private_key(&self) -> Option<&Arc<KeyPair>> {
        self.private_key.as_ref()
    }
}

/// Where the issuer certificate of a profile comes from.
#[derive(Debug, Clone)]
pub(crate) enum IssuerCertificate {
    Certificate(Arc<CertificateTemplate>),
    /// Self-signed: the subject template is its own issuer.
    Subject,
}

/// How the subject public key is sourced.
#[derive(Debug, Clone)]
pub(crate) enum KeySource {
    /// Generated unless an option already produced a key pair.
    Generate,
    /// Taken from the caller's template or request; nothing is generated.
    Supplied(PublicKey),
}

/// Profile state while options are being applied.
#[derive(Debug)]
pub(crate) struct ProfileDraft {
    pub(crate) kind: ProfileKind,
    pub(crate) subject: CertificateTemplate,
    pub(crate) public_key: Option<PublicKey>,
    pub(crate) private_key: Option<Arc<KeyPair>>,
    pub(crate) key_algorithm: KeyAlgorithm,
    pub(crate) key_supplied: bool,
}

/// An unsigned certificate template with the key material needed to sign it.
#[derive(Debug, Clone)]
pub struct Profile {
    kind: ProfileKind,
    subject: CertificateTemplate,
    issuer: IssuerCertificate,
    subject_key: SubjectKeyPair,
    issuer_private_key: Option<Arc<KeyPair>>,
}

impl Profile {
    /// The shared constructor behind every entry point.
    ///
    /// Options are applied in order, then the subject key is resolved: a supplied public
    /// key is installed last, otherwise a key pair is generated unless an option already
    /// produced one. Either a finalized profile or an error comes back.
    pub(crate) fn construct(
        kind: ProfileKind,
        subject: CertificateTemplate,
        issuer: IssuerCertificate,
        issuer_private_key: Option<Arc<KeyPair>>,
        key_source: KeySource,
        options: impl IntoIterator<Item = ProfileOption>,
    ) -> Result<Self> {
        if let IssuerCertificate::Certificate(certificate) = &issuer {
            require_issuer_subject(certificate)?;
        }

        let mut draft = ProfileDraft {
            kind,
            subject,
            public_key: None,
            private_key: None,
            key_algorithm: DEFAULT_KEY_ALGORITHM,
            key_supplied: matches!(key_source, KeySource::Supplied(_)),
        };

        for option in options {
            option.apply(&mut draft)?;
        }

        if let KeySource::Supplied(public_key) = key_source {
            draft.public_key = Some(public_key);
            draft.private_key = None;
        }

        let subject_key = match draft.public_key {
            Some(public_key) => SubjectKeyPair {
                public_key,
                private_key: draft.private_key,
            },
            None => {
                let key_pair = KeyPair::generate(draft.key_algorithm)?;
                SubjectKeyPair {
                    public_key: key_pair.public_key(),
                    private_key: Some(Arc::new(key_pair)),
                }
            }
        };

        let mut subject = draft.subject;
        subject.public_key = Some(subject_key.public_key.clone());

        tracing::debug!(
            ?kind,
            subject = %subject.subject.common_name,
            has_private_key = subject_key.private_key.is_some(),
            "profile constructed"
        );

        Ok(Profile {
            kind,
            subject,
            issuer,
            subject_key,
            issuer_private_key,
        })
    }

    /// Closes the self-signed bootstrap cycle: the subject key signs its own certificate.
    fn link_issuer_key_to_subject(&mut self) {
        self.issuer_private_key = self.subject_key.private_key.clone();
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    /// The unsigned subject certificate.
    pub fn subject(&self) -> &CertificateTemplate {
        &self.subject
    }

    /// The issuer certificate. For self-signed profiles this is the subject template.
    pub fn issuer(&self) -> &CertificateTemplate {
        match &self.issuer {
            IssuerCertificate::Certificate(certificate) => certificate,
            IssuerCertificate::Subject => &self.subject,
        }
    }

    pub fn is_self_signed(&self) -> bool {
        matches!(self.issuer, IssuerCertificate::Subject)
    }

    pub fn subject_key_pair(&self) -> &SubjectKeyPair {
        &self.subject_key
    }

    pub fn subject_public_key(&self) -> &PublicKey {
        &self.subject_key.public_key
    }

    pub fn subject_private_key(&self) -> Option<&Arc<KeyPair>> {
        self.subject_key.private_key.as_ref()
    }

    /// The key that will sign the subject certificate, if this profile can be signed.
    pub fn issuer_private_key(&self) -> Option<&Arc<KeyPair>> {
        self.issuer_private_key.as_ref()
    }
}

/// The issuer's subject name, which must not be empty.
pub(crate) fn require_issuer_subject(issuer: &CertificateTemplate) -> Result<DistinguishedName> {
    if issuer.subject.is_empty() {
        return Err(ProfileError::InvalidInput(
            "issuer certificate has an empty subject".to_string(),
        ));
    }
    Ok(issuer.subject.clone())
}

/// Common names feed the subject of generated profiles and must not be empty.
pub(crate) fn require_common_name(common_name: &str) -> Result<DistinguishedName> {
    if common_name.trim().is_empty() {
        return Err(ProfileError::InvalidInput(
            "common name must not be empty".to_string(),
        ));
    }
    Ok(DistinguishedName::from_common_name(common_name))
}
