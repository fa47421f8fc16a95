//! Root and intermediate CA profiles.

use std::sync::Arc;

use time::OffsetDateTime;

use super::{
    DEFAULT_INTERMEDIATE_CERT_VALIDITY, DEFAULT_ROOT_CERT_VALIDITY, IssuerCertificate, KeySource,
    Profile, ProfileKind, ProfileOption, require_common_name, require_issuer_subject,
};
use crate::cert::extensions::KeyUsages;
use crate::cert::params::DistinguishedName;
use crate::cert::template::CertificateTemplate;
use crate::error::Result;
use crate::key::KeyPair;

/// Root CA template: may sign one level of intermediates.
pub fn default_root_template(
    subject: DistinguishedName,
    issuer: DistinguishedName,
) -> CertificateTemplate {
    let not_before = OffsetDateTime::now_utc();
    CertificateTemplate {
        subject,
        issuer,
        not_before,
        not_after: not_before + DEFAULT_ROOT_CERT_VALIDITY,
        is_ca: true,
        key_usage: KeyUsages::KeyCertSign | KeyUsages::CRLSign,
        basic_constraints_valid: true,
        max_path_len: 1,
        max_path_len_zero: false,
        ..CertificateTemplate::default()
    }
}

/// Intermediate CA template: signs leaves only.
pub fn default_intermediate_template(
    subject: DistinguishedName,
    issuer: DistinguishedName,
) -> CertificateTemplate {
    let not_before = OffsetDateTime::now_utc();
    CertificateTemplate {
        subject,
        issuer,
        not_before,
        not_after: not_before + DEFAULT_INTERMEDIATE_CERT_VALIDITY,
        is_ca: true,
        key_usage: KeyUsages::KeyCertSign | KeyUsages::CRLSign,
        basic_constraints_valid: true,
        max_path_len: 0,
        max_path_len_zero: true,
        ..CertificateTemplate::default()
    }
}

impl Profile {
    /// Self-signed root CA profile for `common_name`.
    pub fn root(
        common_name: &str,
        options: impl IntoIterator<Item = ProfileOption>,
    ) -> Result<Self> {
        let name = require_common_name(common_name)?;
        let subject = default_root_template(name.clone(), name);
        let mut profile = Profile::construct(
            ProfileKind::Root,
            subject,
            IssuerCertificate::Subject,
            None,
            KeySource::Generate,
            options,
        )?;
        profile.link_issuer_key_to_subject();
        Ok(profile)
    }

    /// Intermediate CA profile for `common_name`, issued by `issuer`.
    pub fn intermediate(
        common_name: &str,
        issuer: Arc<CertificateTemplate>,
        issuer_private_key: Option<Arc<KeyPair>>,
        options: impl IntoIterator<Item = ProfileOption>,
    ) -> Result<Self> {
        let subject = default_intermediate_template(
            require_common_name(common_name)?,
            require_issuer_subject(&issuer)?,
        );
        Profile::construct(
            ProfileKind::Intermediate,
            subject,
            IssuerCertificate::Certificate(issuer),
            issuer_private_key,
            KeySource::Generate,
            options,
        )
    }
}
