//! Leaf (end-entity) profiles.

use std::sync::Arc;

use time::OffsetDateTime;

use super::{
    DEFAULT_CERT_VALIDITY, IssuerCertificate, KeySource, Profile, ProfileKind, ProfileOption,
    require_common_name, require_issuer_subject,
};
use crate::cert::extensions::{ExtendedKeyUsageOption, KeyUsages};
use crate::cert::params::DistinguishedName;
use crate::cert::request::CertificateRequest;
use crate::cert::template::CertificateTemplate;
use crate::error::{ProfileError, Result};
use crate::key::KeyPair;

/// The template every leaf entry point starts from.
pub fn default_leaf_template(
    subject: DistinguishedName,
    issuer: DistinguishedName,
) -> CertificateTemplate {
    let not_before = OffsetDateTime::now_utc();
    CertificateTemplate {
        subject,
        issuer,
        not_before,
        not_after: not_before + DEFAULT_CERT_VALIDITY,
        is_ca: false,
        // KeyEncipherment is only meaningful for RSA keys. The subject key may not be
        // known yet, so Issuer::issue strips the bit for non-RSA keys at signing time.
        key_usage: KeyUsages::KeyEncipherment | KeyUsages::DigitalSignature,
        ext_key_usage: vec![
            ExtendedKeyUsageOption::ServerAuth,
            ExtendedKeyUsageOption::ClientAuth,
        ],
        basic_constraints_valid: false,
        max_path_len: 0,
        max_path_len_zero: false,
        ..CertificateTemplate::default()
    }
}

impl Profile {
    /// Leaf profile for `common_name`, issued by `issuer`.
    ///
    /// A key pair is generated for the subject unless
    /// [`ProfileOption::GenerateKeyPair`] already produced one.
    pub fn leaf(
        common_name: &str,
        issuer: Arc<CertificateTemplate>,
        issuer_private_key: Option<Arc<KeyPair>>,
        options: impl IntoIterator<Item = ProfileOption>,
    ) -> Result<Self> {
        let subject = default_leaf_template(
            require_common_name(common_name)?,
            require_issuer_subject(&issuer)?,
        );
        Profile::construct(
            ProfileKind::Leaf,
            subject,
            IssuerCertificate::Certificate(issuer),
            issuer_private_key,
            KeySource::Generate,
            options,
        )
    }

    /// Leaf profile using `subject` verbatim as the subject certificate.
    ///
    /// No key pair is generated: the subject public key is taken from the template,
    /// which therefore must carry one. The profile has no subject private key.
    pub fn leaf_with_template(
        subject: CertificateTemplate,
        issuer: Arc<CertificateTemplate>,
        issuer_private_key: Option<Arc<KeyPair>>,
        options: impl IntoIterator<Item = ProfileOption>,
    ) -> Result<Self> {
        let public_key = subject.public_key.clone().ok_or_else(|| {
            ProfileError::InvalidInput("subject template must have a public key".to_string())
        })?;
        Profile::construct(
            ProfileKind::Leaf,
            subject,
            IssuerCertificate::Certificate(issuer),
            issuer_private_key,
            KeySource::Supplied(public_key),
            options,
        )
    }

    /// Leaf profile populated from a certificate signing request.
    ///
    /// Subject, extensions and subject alternative names are copied from the request
    /// as they are. No key pair is generated: the subject public key is the request's.
    pub fn leaf_with_csr(
        csr: &CertificateRequest,
        issuer: Arc<CertificateTemplate>,
        issuer_private_key: Option<Arc<KeyPair>>,
        options: impl IntoIterator<Item = ProfileOption>,
    ) -> Result<Self> {
        let public_key = csr.public_key.clone().ok_or_else(|| {
            ProfileError::InvalidInput("certificate request must have a public key".to_string())
        })?;

        let mut subject =
            default_leaf_template(csr.subject.clone(), require_issuer_subject(&issuer)?);
        subject.extra_extensions = csr.extensions.clone();
        subject.dns_names = csr.dns_names.clone();
        subject.email_addresses = csr.email_addresses.clone();
        subject.ip_addresses = csr.ip_addresses.clone();
        subject.uris = csr.uris.clone();

        Profile::construct(
            ProfileKind::Leaf,
            subject,
            IssuerCertificate::Certificate(issuer),
            issuer_private_key,
            KeySource::Supplied(public_key),
            options,
        )
    }

    /// Self-signed leaf profile: subject and issuer are both `common_name`, and the
    /// generated subject key is also the issuer key.
    pub fn self_signed_leaf(
        common_name: &str,
        options: impl IntoIterator<Item = ProfileOption>,
    ) -> Result<Self> {
        let name = require_common_name(common_name)?;
        let subject = default_leaf_template(name.clone(), name);
        let mut profile = Profile::construct(
            ProfileKind::Leaf,
            subject,
            IssuerCertificate::Subject,
            None,
            KeySource::Generate,
            options,
        )?;
        profile.link_issuer_key_to_subject();
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::params::ExtensionParam;

    fn issuer() -> (Arc<CertificateTemplate>, Arc<KeyPair>) {
        let key = KeyPair::generate_ecdsa_p256();
        let template = CertificateTemplate {
            subject: DistinguishedName::builder()
                .common_name("Leaf Test CA")
                .organization("Example")
                .build(),
            public_key: Some(key.public_key()),
            ..CertificateTemplate::default()
        };
        (Arc::new(template), Arc::new(key))
    }

    #[test]
    fn test_default_leaf_template() {
        let template = default_leaf_template(
            DistinguishedName::from_common_name("s"),
            DistinguishedName::from_common_name("i"),
        );
        assert!(!template.is_ca);
        assert!(!template.basic_constraints_valid);
        assert_eq!(template.max_path_len, 0);
        assert!(!template.max_path_len_zero);
        assert_eq!(template.not_after - template.not_before, DEFAULT_CERT_VALIDITY);
        assert_eq!(
            template.key_usage,
            KeyUsages::KeyEncipherment | KeyUsages::DigitalSignature
        );
        assert_eq!(
            template.ext_key_usage,
            [
                ExtendedKeyUsageOption::ServerAuth,
                ExtendedKeyUsageOption::ClientAuth
            ]
        );
    }

    #[test]
    fn test_leaf_subject_and_issuer_names() {
        let (issuer, issuer_key) = issuer();
        let profile = Profile::leaf("svc.local", issuer.clone(), Some(issuer_key.clone()), []).unwrap();

        assert_eq!(profile.subject().subject.common_name, "svc.local");
        assert_eq!(profile.subject().issuer, issuer.subject);
        assert_eq!(profile.issuer(), issuer.as_ref());
        assert!(Arc::ptr_eq(profile.issuer_private_key().unwrap(), &issuer_key));
        assert!(profile.subject_private_key().is_some());
        assert!(!profile.is_self_signed());
    }

    #[test]
    fn test_leaf_rejects_empty_common_name() {
        let (issuer, issuer_key) = issuer();
        let err = Profile::leaf("  ", issuer, Some(issuer_key), []).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidInput(_)));
    }

    #[test]
    fn test_leaf_rejects_public_key_option() {
        let (issuer, issuer_key) = issuer();
        let err = Profile::leaf(
            "svc.local",
            issuer,
            Some(issuer_key),
            [ProfileOption::PublicKey(KeyPair::generate_ed25519().public_key())],
        )
        .unwrap_err();
        assert!(matches!(err, ProfileError::OptionApplicationError(_)));
    }

    #[test]
    fn test_leaf_with_template_uses_template_key() {
        let (issuer, issuer_key) = issuer();
        let subject_key = KeyPair::generate_ed25519().public_key();
        let template = CertificateTemplate {
            subject: DistinguishedName::from_common_name("templated"),
            issuer: issuer.subject.clone(),
            is_ca: false,
            public_key: Some(subject_key.clone()),
            ..default_leaf_template(DistinguishedName::default(), DistinguishedName::default())
        };

        let profile =
            Profile::leaf_with_template(template.clone(), issuer, Some(issuer_key), []).unwrap();

        assert_eq!(profile.subject(), &template);
        assert_eq!(profile.subject_public_key(), &subject_key);
        assert!(profile.subject_private_key().is_none());
    }

    #[test]
    fn test_leaf_with_template_requires_public_key() {
        let (issuer, issuer_key) = issuer();
        let template = default_leaf_template(
            DistinguishedName::from_common_name("keyless"),
            issuer.subject.clone(),
        );
        let err = Profile::leaf_with_template(template, issuer, Some(issuer_key), []).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidInput(_)));
    }

    #[test]
    fn test_leaf_with_csr_copies_request_fields() {
        let (issuer, issuer_key) = issuer();
        let request_key = KeyPair::generate_ecdsa_p256().public_key();
        let csr = CertificateRequest::builder()
            .subject(DistinguishedName::from_common_name("csr.local"))
            .public_key(request_key.clone())
            .extensions(vec![ExtensionParam {
                oid: const_oid::ObjectIdentifier::new_unwrap("1.3.6.1.4.1.55555.1"),
                critical: false,
                value: vec![0x04, 0x01, 0xff],
            }])
            .dns_names(vec!["csr.local".to_string(), "alt.csr.local".to_string()])
            .email_addresses(vec!["csr@local".to_string()])
            .ip_addresses(vec!["10.0.0.7".parse().unwrap()])
            .uris(vec!["https://csr.local/id".to_string()])
            .build();

        let profile = Profile::leaf_with_csr(&csr, issuer.clone(), Some(issuer_key), []).unwrap();
        let subject = profile.subject();

        assert_eq!(subject.subject, csr.subject);
        assert_eq!(subject.issuer, issuer.subject);
        assert_eq!(subject.extra_extensions, csr.extensions);
        assert_eq!(subject.dns_names, csr.dns_names);
        assert_eq!(subject.email_addresses, csr.email_addresses);
        assert_eq!(subject.ip_addresses, csr.ip_addresses);
        assert_eq!(subject.uris, csr.uris);
        assert_eq!(profile.subject_public_key(), &request_key);
        assert!(profile.subject_private_key().is_none());
    }

    #[test]
    fn test_leaf_with_csr_without_public_key_is_invalid_input() {
        let (issuer, issuer_key) = issuer();
        let csr = CertificateRequest::builder()
            .subject(DistinguishedName::from_common_name("bad"))
            .dns_names(vec!["bad.local".to_string()])
            .build();

        let err = Profile::leaf_with_csr(&csr, issuer, Some(issuer_key), []).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidInput(_)));
    }

    #[test]
    fn test_self_signed_leaf_links_keys() {
        let profile = Profile::self_signed_leaf("self.local", []).unwrap();

        assert!(profile.is_self_signed());
        assert_eq!(profile.subject(), profile.issuer());
        assert_eq!(profile.subject().subject, profile.subject().issuer);
        assert!(Arc::ptr_eq(
            profile.issuer_private_key().unwrap(),
            profile.subject_private_key().unwrap()
        ));
    }

    #[test]
    fn test_self_signed_leaf_propagates_option_errors() {
        let err = Profile::self_signed_leaf(
            "self.local",
            [ProfileOption::Hosts(String::new())],
        )
        .unwrap_err();
        assert!(matches!(err, ProfileError::OptionApplicationError(_)));
    }

    #[test]
    fn test_generated_keys_differ_between_calls() {
        let (issuer, issuer_key) = issuer();
        let a = Profile::leaf("same.local", issuer.clone(), Some(issuer_key.clone()), []).unwrap();
        let b = Profile::leaf("same.local", issuer, Some(issuer_key), []).unwrap();

        assert_ne!(a.subject_public_key(), b.subject_public_key());

        // apart from key and timestamps the two templates are identical
        let b_subject = b.subject();
        let a_normalized = CertificateTemplate {
            not_before: b_subject.not_before,
            not_after: b_subject.not_after,
            public_key: b_subject.public_key.clone(),
            ..a.subject().clone()
        };
        assert_eq!(&a_normalized, b_subject);
    }
}
