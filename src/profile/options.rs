use std::net::IpAddr;
use std::sync::Arc;

use time::{Duration, OffsetDateTime};

use super::ProfileDraft;
use crate::cert::params::ExtensionParam;
use crate::error::{ProfileError, Result};
use crate::key::{KeyAlgorithm, KeyPair, PublicKey};

/// A declarative override applied to a profile while it is being constructed.
///
/// Options run left to right, once each. When two options touch the same field the
/// later one wins.
#[derive(Debug, Clone)]
pub enum ProfileOption {
    /// Subject public key override. Always rejected with
    /// [`ProfileError::OptionApplicationError`].
    ///
    /// A generating profile would be left without the matching private key, and
    /// template or request profiles take their key from the template or the request.
    /// Use [`crate::profile::Profile::leaf_with_template`] to issue for a known key.
    PublicKey(PublicKey),
    /// Replace the validity window.
    NotBeforeAfter {
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
    },
    /// Replace the validity window, filling gaps: a missing `not_before` means now, a
    /// missing `not_after` means `not_before + duration` (the kind's default validity
    /// when `duration` is zero).
    NotBeforeAfterDuration {
        not_before: Option<OffsetDateTime>,
        not_after: Option<OffsetDateTime>,
        duration: Duration,
    },
    /// Append one extension to the template's extra extensions.
    ExtraExtension(ExtensionParam),
    /// Comma-separated hosts replacing the subject alternative names. Each entry is
    /// classified as an IP address, a URI (contains `://`), an email address (contains
    /// `@`) or a DNS name.
    Hosts(String),
    /// Algorithm used if the constructor has to generate the subject key pair.
    KeyAlgorithm(KeyAlgorithm),
    /// Generate the subject key pair now, with this algorithm.
    GenerateKeyPair(KeyAlgorithm),
}

impl ProfileOption {
    pub(crate) fn apply(self, draft: &mut ProfileDraft) -> Result<()> {
        match self {
            ProfileOption::PublicKey(_) => {
                let reason = if draft.key_supplied {
                    "the subject public key comes from the template or certificate request"
                } else {
                    "this profile generates its own key pair"
                };
                return Err(ProfileError::OptionApplicationError(format!(
                    "public key override rejected: {reason}"
                )));
            }
            ProfileOption::NotBeforeAfter {
                not_before,
                not_after,
            } => set_validity(draft, not_before, not_after)?,
            ProfileOption::NotBeforeAfterDuration {
                not_before,
                not_after,
                duration,
            } => {
                let not_before = not_before.unwrap_or_else(OffsetDateTime::now_utc);
                let not_after = not_after.unwrap_or_else(|| {
                    if duration.is_zero() {
                        not_before + draft.kind.default_validity()
                    } else {
                        not_before + duration
                    }
                });
                set_validity(draft, not_before, not_after)?;
            }
            ProfileOption::ExtraExtension(extension) => {
                if extension.value.is_empty() {
                    return Err(ProfileError::OptionApplicationError(format!(
                        "extension {} has an empty value",
                        extension.oid
                    )));
                }
                draft.subject.extra_extensions.push(extension);
            }
            ProfileOption::Hosts(hosts) => set_hosts(draft, &hosts)?,
            ProfileOption::KeyAlgorithm(algorithm) => draft.key_algorithm = algorithm,
            ProfileOption::GenerateKeyPair(algorithm) => {
                if draft.key_supplied {
                    return Err(ProfileError::OptionApplicationError(
                        "the subject public key of this profile is supplied by the caller; \
                         no key pair can be generated"
                            .to_string(),
                    ));
                }
                let key_pair = KeyPair::generate(algorithm)?;
                draft.public_key = Some(key_pair.public_key());
                draft.private_key = Some(Arc::new(key_pair));
            }
        }
        Ok(())
    }
}

fn set_validity(
    draft: &mut ProfileDraft,
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
) -> Result<()> {
    if not_after <= not_before {
        return Err(ProfileError::OptionApplicationError(format!(
            "not_after ({not_after}) must be later than not_before ({not_before})"
        )));
    }
    draft.subject.not_before = not_before;
    draft.subject.not_after = not_after;
    Ok(())
}

fn set_hosts(draft: &mut ProfileDraft, hosts: &str) -> Result<()> {
    let mut dns_names = Vec::new();
    let mut email_addresses = Vec::new();
    let mut ip_addresses = Vec::new();
    let mut uris = Vec::new();

    for host in hosts.split(',').map(str::trim).filter(|h| !h.is_empty()) {
        if let Ok(ip) = host.parse::<IpAddr>() {
            ip_addresses.push(ip);
        } else if host.contains("://") {
            uris.push(host.to_string());
        } else if host.contains('@') {
            email_addresses.push(host.to_string());
        } else {
            dns_names.push(host.to_string());
        }
    }

    if dns_names.is_empty() && email_addresses.is_empty() && ip_addresses.is_empty() && uris.is_empty()
    {
        return Err(ProfileError::OptionApplicationError(format!(
            "no hosts found in {hosts:?}"
        )));
    }

    draft.subject.dns_names = dns_names;
    draft.subject.email_addresses = email_addresses;
    draft.subject.ip_addresses = ip_addresses;
    draft.subject.uris = uris;
    Ok(())
}
