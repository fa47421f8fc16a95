use bon::Builder;
use const_oid::ObjectIdentifier;
use const_oid::db::rfc4519;
use x509_cert::name::RdnSequence;

use super::extensions::ToAndFromX509Extension;
use crate::error::{ProfileError, Result};

/// Distinguished name used as the subject or issuer of a certificate.
///
/// The typed fields cover the attributes profiles set themselves. A name decoded from
/// a certificate or request also keeps its original RDN sequence, so attributes
/// without a field (serialNumber, emailAddress, DC, a second OU, ...) survive
/// re-encoding. Once a typed field is changed the name is rebuilt from the fields.
///
/// Two names are equal when they encode to the same RDN sequence.
///
/// # Fields
/// * `common_name` - The common name (CN).
/// * `country` - The country (C).
/// * `state` - The state or province (ST).
/// * `locality` - The locality or city (L).
/// * `organization` - The organization (O).
/// * `organization_unit` - The organizational unit (OU).
#[derive(Clone, Debug, Builder, Default)]
pub struct DistinguishedName {
    #[builder(into)]
    pub common_name: String,
    #[builder(into)]
    pub country: Option<String>,
    #[builder(into)]
    pub state: Option<String>,
    #[builder(into)]
    pub locality: Option<String>,
    #[builder(into)]
    pub organization: Option<String>,
    #[builder(into)]
    pub organization_unit: Option<String>,
    #[builder(skip)]
    decoded: Option<RdnSequence>,
}

impl DistinguishedName {
    /// A name carrying only a common name.
    pub fn from_common_name(common_name: impl Into<String>) -> Self {
        Self {
            common_name: common_name.into(),
            ..Self::default()
        }
    }

    /// `true` when the name has no attribute at all.
    pub fn is_empty(&self) -> bool {
        match self.preserved() {
            Some(decoded) => decoded.0.is_empty(),
            None => {
                self.common_name.is_empty()
                    && self.country.is_none()
                    && self.state.is_none()
                    && self.locality.is_none()
                    && self.organization.is_none()
                    && self.organization_unit.is_none()
            }
        }
    }

    /// Converts the distinguished name to an X.509 name.
    ///
    /// A decoded name whose typed fields are unchanged is returned as it was decoded;
    /// otherwise the name is built from the typed fields and unset ones are omitted.
    pub fn as_x509_name(&self) -> Result<x509_cert::name::DistinguishedName> {
        use core::str::FromStr;

        if let Some(decoded) = self.preserved() {
            return Ok(decoded.clone());
        }

        let attributes = [
            ("CN", Some(&self.common_name).filter(|cn| !cn.is_empty())),
            ("OU", self.organization_unit.as_ref()),
            ("O", self.organization.as_ref()),
            ("L", self.locality.as_ref()),
            ("ST", self.state.as_ref()),
            ("C", self.country.as_ref()),
        ];
        let rfc4514_name = attributes
            .iter()
            .filter_map(|(key, value)| value.map(|v| format!("{key}={}", escape_rfc4514(v))))
            .collect::<Vec<_>>()
            .join(",");

        if rfc4514_name.is_empty() {
            return Ok(RdnSequence::default());
        }
        RdnSequence::from_str(&rfc4514_name).map_err(|e| {
            ProfileError::InvalidInput(format!("invalid distinguished name {rfc4514_name}: {e}"))
        })
    }

    /// Creates a `DistinguishedName` from an X.509 name.
    ///
    /// Each typed field takes the first CN, C, ST, L, O or OU value. The full name is
    /// kept for re-encoding.
    pub fn from_x509_name(x509dn: &x509_cert::name::DistinguishedName) -> Self {
        let mut name = Self::typed_fields(x509dn);
        name.decoded = Some(x509dn.clone());
        name
    }

    fn typed_fields(x509dn: &x509_cert::name::DistinguishedName) -> Self {
        let mut name = DistinguishedName::default();
        let mut common_name = None;

        for rdn in x509dn.0.iter() {
            for attr in rdn.0.iter() {
                // PrintableString, UTF8String and IA5String all carry UTF-8 compatible bytes
                let Ok(value) = String::from_utf8(attr.value.value().to_vec()) else {
                    continue;
                };
                let slot = match attr.oid {
                    oid if oid == rfc4519::CN => &mut common_name,
                    oid if oid == rfc4519::C => &mut name.country,
                    oid if oid == rfc4519::ST => &mut name.state,
                    oid if oid == rfc4519::L => &mut name.locality,
                    oid if oid == rfc4519::O => &mut name.organization,
                    oid if oid == rfc4519::OU => &mut name.organization_unit,
                    _ => continue,
                };
                slot.get_or_insert(value);
            }
        }

        name.common_name = common_name.unwrap_or_default();
        name
    }

    /// The decoded RDN sequence, while the typed fields still describe it.
    fn preserved(&self) -> Option<&RdnSequence> {
        let decoded = self.decoded.as_ref()?;
        let current = Self::typed_fields(decoded);
        let unchanged = current.common_name == self.common_name
            && current.country == self.country
            && current.state == self.state
            && current.locality == self.locality
            && current.organization == self.organization
            && current.organization_unit == self.organization_unit;
        unchanged.then_some(decoded)
    }
}

impl PartialEq for DistinguishedName {
    fn eq(&self, other: &Self) -> bool {
        match (self.as_x509_name(), other.as_x509_name()) {
            (Ok(a), Ok(b)) => a == b,
            // names that cannot be encoded compare by their fields
            _ => {
                self.common_name == other.common_name
                    && self.country == other.country
                    && self.state == other.state
                    && self.locality == other.locality
                    && self.organization == other.organization
                    && self.organization_unit == other.organization_unit
            }
        }
    }
}

impl Eq for DistinguishedName {}

fn escape_rfc4514(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);
    for (i, c) in value.chars().enumerate() {
        let special = matches!(c, ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=')
            || (i == 0 && (c == '#' || c == ' '))
            || (i == last && c == ' ');
        if special {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Represents an X.509 extension.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Creates an `ExtensionParam` from a specific extension.
    ///
    /// # Arguments
    /// * `extension` - The extension to encode.
    /// * `critical` - Indicates if the extension is critical.
    pub fn from_extension<E: ToAndFromX509Extension>(extension: E, critical: bool) -> Result<Self> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes an `ExtensionParam` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E> {
        E::from_x509_extension_value(&self.value)
    }

    pub(crate) fn from_x509_extension(ext: &x509_cert::ext::Extension) -> Self {
        Self {
            oid: ext.extn_id,
            critical: ext.critical,
            value: ext.extn_value.as_bytes().to_vec(),
        }
    }

    pub(crate) fn to_x509_extension(&self) -> Result<x509_cert::ext::Extension> {
        Ok(x509_cert::ext::Extension {
            extn_id: self.oid,
            critical: self.critical,
            extn_value: der::asn1::OctetString::new(self.value.clone())?,
        })
    }
}
