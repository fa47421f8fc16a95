use std::net::IpAddr;

use time::OffsetDateTime;

use super::Certificate;
use super::extensions::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, ExtendedKeyUsageOption, FlagSet,
    KeyUsage, KeyUsages, SubjectAltName, SubjectKeyIdentifier, ToAndFromX509Extension,
};
use super::params::{DistinguishedName, ExtensionParam};
use crate::error::Result;
use crate::key::PublicKey;

/// An unsigned certificate: every field a signer needs except the signature itself.
///
/// Templates are plain data. Profiles fill them with defaults, options override fields,
/// and [`crate::issuer::Issuer::issue`] turns them into a signed [`Certificate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateTemplate {
    pub subject: DistinguishedName,
    pub issuer: DistinguishedName,
    /// Big-endian serial number. A random one is chosen at signing time when `None`.
    pub serial_number: Option<Vec<u8>>,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
    pub is_ca: bool,
    pub key_usage: FlagSet<KeyUsages>,
    pub ext_key_usage: Vec<ExtendedKeyUsageOption>,
    /// Whether a basic constraints extension is emitted at all.
    pub basic_constraints_valid: bool,
    pub max_path_len: u8,
    /// Distinguishes an explicit path length of zero from "unset" when `max_path_len == 0`.
    pub max_path_len_zero: bool,
    pub extra_extensions: Vec<ExtensionParam>,
    pub dns_names: Vec<String>,
    pub email_addresses: Vec<String>,
    pub ip_addresses: Vec<IpAddr>,
    pub uris: Vec<String>,
    pub public_key: Option<PublicKey>,
}

impl Default for CertificateTemplate {
    fn default() -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            subject: DistinguishedName::default(),
            issuer: DistinguishedName::default(),
            serial_number: None,
            not_before: now,
            not_after: now,
            is_ca: false,
            key_usage: FlagSet::empty(),
            ext_key_usage: Vec::new(),
            basic_constraints_valid: false,
            max_path_len: 0,
            max_path_len_zero: false,
            extra_extensions: Vec::new(),
            dns_names: Vec::new(),
            email_addresses: Vec::new(),
            ip_addresses: Vec::new(),
            uris: Vec::new(),
            public_key: None,
        }
    }
}

impl CertificateTemplate {
    /// Path length constraint to encode, if any.
    pub fn path_len_constraint(&self) -> Option<u8> {
        if self.max_path_len > 0 || self.max_path_len_zero {
            Some(self.max_path_len)
        } else {
            None
        }
    }

    pub fn subject_alt_name(&self) -> SubjectAltName {
        SubjectAltName {
            dns_names: self.dns_names.clone(),
            email_addresses: self.email_addresses.clone(),
            ip_addresses: self.ip_addresses.clone(),
            uris: self.uris.clone(),
        }
    }

    /// Decodes a signed certificate back into a template.
    ///
    /// Recognised extensions populate their fields; key identifiers are dropped since
    /// they are recomputed at signing time; everything else lands in `extra_extensions`.
    pub fn from_certificate(certificate: &Certificate) -> Result<Self> {
        let tbs = &certificate.inner.tbs_certificate;

        let mut template = CertificateTemplate {
            subject: DistinguishedName::from_x509_name(&tbs.subject),
            issuer: DistinguishedName::from_x509_name(&tbs.issuer),
            serial_number: Some(tbs.serial_number.as_bytes().to_vec()),
            not_before: OffsetDateTime::from(tbs.validity.not_before.to_system_time()),
            not_after: OffsetDateTime::from(tbs.validity.not_after.to_system_time()),
            public_key: Some(PublicKey::from_x509spki(&tbs.subject_public_key_info)?),
            ..CertificateTemplate::default()
        };

        let extensions = tbs.extensions.as_deref().unwrap_or_default();
        for extension in extensions.iter().map(ExtensionParam::from_x509_extension) {
            match extension.oid {
                oid if oid == BasicConstraints::OID => {
                    let bc: BasicConstraints = extension.to_extension()?;
                    template.basic_constraints_valid = true;
                    template.is_ca = bc.is_ca;
                    template.max_path_len = bc.max_path_length.unwrap_or(0);
                    template.max_path_len_zero = bc.max_path_length == Some(0);
                }
                oid if oid == KeyUsage::OID => {
                    let ku: KeyUsage = extension.to_extension()?;
                    template.key_usage = ku.0;
                }
                oid if oid == ExtendedKeyUsage::OID => {
                    let eku: ExtendedKeyUsage = extension.to_extension()?;
                    template.ext_key_usage = eku.usage;
                }
                oid if oid == SubjectAltName::OID => {
                    let san: SubjectAltName = extension.to_extension()?;
                    template.dns_names = san.dns_names;
                    template.email_addresses = san.email_addresses;
                    template.ip_addresses = san.ip_addresses;
                    template.uris = san.uris;
                }
                oid if oid == SubjectKeyIdentifier::OID || oid == AuthorityKeyIdentifier::OID => {}
                _ => template.extra_extensions.push(extension),
            }
        }

        Ok(template)
    }
}
