use std::net::IpAddr;

use bon::Builder;
use const_oid::AssociatedOid;
use der::{Decode, Encode};
use x509_cert::request::{CertReq, ExtensionReq};

use super::extensions::{SubjectAltName, ToAndFromX509Extension};
use super::params::{DistinguishedName, ExtensionParam};
use crate::error::Result;
use crate::key::PublicKey;
use crate::pem_utils;

const CSR_PEM_LABEL: &str = "CERTIFICATE REQUEST";

/// The parts of a certificate signing request a profile consumes.
///
/// `public_key` is `None` when the request carried a key this crate cannot use; such a
/// request is rejected by [`crate::profile::Profile::leaf_with_csr`].
#[derive(Clone, Debug, Builder, Default, PartialEq, Eq)]
pub struct CertificateRequest {
    pub subject: DistinguishedName,
    pub public_key: Option<PublicKey>,
    /// Every extension requested through the PKCS#9 extensionRequest attribute.
    #[builder(default)]
    pub extensions: Vec<ExtensionParam>,
    #[builder(default)]
    pub dns_names: Vec<String>,
    #[builder(default)]
    pub email_addresses: Vec<String>,
    #[builder(default)]
    pub ip_addresses: Vec<IpAddr>,
    #[builder(default)]
    pub uris: Vec<String>,
}

impl CertificateRequest {
    /// Parses a DER-encoded PKCS#10 request. The request signature is not checked.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let csr = CertReq::from_der(der)?;
        let info = &csr.info;

        let public_key = match PublicKey::from_x509spki(&info.public_key) {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::warn!(error = %e, "certificate request carries an unusable public key");
                None
            }
        };

        let mut request = CertificateRequest {
            subject: DistinguishedName::from_x509_name(&info.subject),
            public_key,
            ..CertificateRequest::default()
        };

        for attribute in info.attributes.iter() {
            if attribute.oid != ExtensionReq::OID {
                continue;
            }
            for value in attribute.values.iter() {
                let requested = ExtensionReq::from_der(&value.to_der()?)?;
                request
                    .extensions
                    .extend(requested.0.iter().map(ExtensionParam::from_x509_extension));
            }
        }

        if let Some(san) = request
            .extensions
            .iter()
            .find(|ext| ext.oid == SubjectAltName::OID)
        {
            let san: SubjectAltName = san.to_extension()?;
            request.dns_names = san.dns_names;
            request.email_addresses = san.email_addresses;
            request.ip_addresses = san.ip_addresses;
            request.uris = san.uris;
        }

        Ok(request)
    }

    pub fn from_pem(pem: &str) -> Result<Self> {
        Self::from_der(&pem_utils::pem_to_der(pem, CSR_PEM_LABEL)?)
    }
}
