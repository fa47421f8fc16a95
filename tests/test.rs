mod util;

use std::sync::Arc;

use certprofile::cert::extensions::{ExtendedKeyUsageOption, KeyUsages};
use certprofile::cert::params::{DistinguishedName, ExtensionParam};
use certprofile::cert::request::CertificateRequest;
use certprofile::cert::template::CertificateTemplate;
use certprofile::error::ProfileError;
use certprofile::issuer::Issuer;
use certprofile::key::{KeyAlgorithm, KeyPair, PublicKey};
use certprofile::profile::{DEFAULT_CERT_VALIDITY, Profile, ProfileOption};
use const_oid::ObjectIdentifier;
use time::{Duration, OffsetDateTime};

pub type Result<T> = std::result::Result<T, ProfileError>;

/// Generates the CA certificate and saves it as a PEM file.
#[test]
fn generate_ca_cert() -> Result<()> {
    let ca = util::generate_ca();

    assert!(ca.template.is_ca);
    assert_eq!(ca.template.subject, ca.template.issuer);
    util::write_debug_pem("ca_cert", &ca.certificate.to_pem()?);
    Ok(())
}

/// A leaf built from a common name carries the leaf defaults and a fresh key pair.
#[test]
fn generate_server_cert() -> Result<()> {
    let ca = util::generate_ca();
    let before = OffsetDateTime::now_utc();

    let profile = Profile::leaf("server.myca.local", ca.template.clone(), ca.private_key(), [])?;
    let subject = profile.subject();

    assert_eq!(subject.subject.common_name, "server.myca.local");
    assert_eq!(subject.issuer, ca.template.subject);
    assert!(!subject.is_ca);
    assert!(!subject.basic_constraints_valid);
    assert_eq!(
        subject.ext_key_usage,
        [ExtendedKeyUsageOption::ServerAuth, ExtendedKeyUsageOption::ClientAuth]
    );
    assert!(subject.not_before >= before);
    assert_eq!(subject.not_after - subject.not_before, DEFAULT_CERT_VALIDITY);
    assert!(profile.subject_private_key().is_some());

    let certificate = profile.create_certificate()?;
    util::write_debug_pem("server_cert", &certificate.to_pem()?);
    Ok(())
}

#[test]
fn leaf_options_apply_in_order() -> Result<()> {
    let ca = util::generate_ca();
    let t0 = OffsetDateTime::now_utc() + Duration::hours(1);
    let custom = ExtensionParam {
        oid: ObjectIdentifier::new_unwrap("1.3.6.1.4.1.55555.7"),
        critical: false,
        value: vec![0x0c, 0x02, b'o', b'k'],
    };

    let profile = Profile::leaf(
        "client.myca.local",
        ca.template.clone(),
        ca.private_key(),
        [
            ProfileOption::NotBeforeAfter {
                not_before: t0,
                not_after: t0 + Duration::days(1),
            },
            ProfileOption::ExtraExtension(custom.clone()),
            ProfileOption::NotBeforeAfter {
                not_before: t0,
                not_after: t0 + Duration::days(30),
            },
            ProfileOption::Hosts("client.myca.local,192.0.2.10".to_string()),
        ],
    )?;

    let subject = profile.subject();
    assert_eq!(subject.not_before, t0);
    assert_eq!(subject.not_after, t0 + Duration::days(30));
    assert_eq!(subject.extra_extensions, [custom.clone()]);
    assert_eq!(subject.dns_names, ["client.myca.local"]);

    let signed = CertificateTemplate::from_certificate(&profile.create_certificate()?)?;
    assert_eq!(signed.extra_extensions, [custom]);
    assert_eq!(signed.dns_names, ["client.myca.local"]);
    assert_eq!(signed.ip_addresses, ["192.0.2.10".parse::<std::net::IpAddr>().unwrap()]);
    Ok(())
}

#[test]
fn inverted_validity_window_is_rejected() {
    let ca = util::generate_ca();
    let now = OffsetDateTime::now_utc();

    let err = Profile::leaf(
        "late.myca.local",
        ca.template.clone(),
        ca.private_key(),
        [ProfileOption::NotBeforeAfter {
            not_before: now,
            not_after: now - Duration::days(1),
        }],
    )
    .unwrap_err();

    assert!(matches!(err, ProfileError::OptionApplicationError(_)));
}

#[test]
fn issuer_with_empty_subject_is_rejected() {
    let err = Profile::leaf(
        "orphan.local",
        Arc::new(CertificateTemplate::default()),
        None,
        [],
    )
    .unwrap_err();

    assert!(matches!(err, ProfileError::InvalidInput(_)));
}

/// A certificate decoded back into a template can be re-issued under the same key.
#[test]
fn leaf_from_signed_template() -> Result<()> {
    let ca = util::generate_ca();
    let original = Profile::leaf("reissue.myca.local", ca.template.clone(), ca.private_key(), [])?;
    let template = CertificateTemplate::from_certificate(&original.create_certificate()?)?;

    let reissued = Profile::leaf_with_template(template.clone(), ca.template.clone(), ca.private_key(), [])?;

    assert_eq!(reissued.subject(), &template);
    assert_eq!(reissued.subject_public_key(), original.subject_public_key());
    assert!(reissued.subject_private_key().is_none());
    assert!(reissued.create_certificate().is_ok());
    Ok(())
}

#[test]
fn leaf_template_rejects_public_key_option() {
    let ca = util::generate_ca();
    let template = CertificateTemplate {
        subject: DistinguishedName::from_common_name("override.myca.local"),
        not_after: OffsetDateTime::now_utc() + Duration::days(1),
        public_key: Some(KeyPair::generate_ecdsa_p256().public_key()),
        ..CertificateTemplate::default()
    };

    let err = Profile::leaf_with_template(
        template,
        ca.template.clone(),
        ca.private_key(),
        [ProfileOption::PublicKey(KeyPair::generate_ed25519().public_key())],
    )
    .unwrap_err();

    assert!(matches!(err, ProfileError::OptionApplicationError(_)));
}

#[test]
fn leaf_from_certificate_request() -> Result<()> {
    let ca = util::generate_ca();
    let request_key = KeyPair::generate_ed25519().public_key();
    let csr = CertificateRequest::builder()
        .subject(
            DistinguishedName::builder()
                .common_name("csr.myca.local")
                .organization("Crab widgits SE")
                .build(),
        )
        .public_key(request_key.clone())
        .dns_names(vec!["csr.myca.local".to_string()])
        .uris(vec!["spiffe://myca.local/csr".to_string()])
        .build();

    let profile = Profile::leaf_with_csr(&csr, ca.template.clone(), ca.private_key(), [])?;
    assert_eq!(profile.subject_public_key(), &request_key);
    assert!(profile.subject_private_key().is_none());

    let signed = CertificateTemplate::from_certificate(&profile.create_certificate()?)?;
    assert_eq!(signed.subject, csr.subject);
    assert_eq!(signed.dns_names, csr.dns_names);
    assert_eq!(signed.uris, csr.uris);
    assert_eq!(signed.public_key, Some(request_key));
    assert!(!signed.key_usage.contains(KeyUsages::KeyEncipherment));
    Ok(())
}

#[test]
fn certificate_request_without_usable_key_is_rejected() {
    let ca = util::generate_ca();
    let csr = CertificateRequest::builder()
        .subject(DistinguishedName::from_common_name("broken.myca.local"))
        .build();

    let err = Profile::leaf_with_csr(&csr, ca.template.clone(), ca.private_key(), []).unwrap_err();
    assert!(matches!(err, ProfileError::InvalidInput(_)));
}

#[test]
fn self_signed_leaf_signs_itself() -> Result<()> {
    let profile = Profile::self_signed_leaf("standalone.local", [ProfileOption::KeyAlgorithm(KeyAlgorithm::EcdsaP384)])?;

    assert!(profile.is_self_signed());
    assert!(Arc::ptr_eq(
        profile.issuer_private_key().unwrap(),
        profile.subject_private_key().unwrap()
    ));
    assert!(matches!(profile.subject_public_key(), PublicKey::EcdsaP384(_)));

    let signed = CertificateTemplate::from_certificate(&profile.create_certificate()?)?;
    assert_eq!(signed.subject, signed.issuer);
    Ok(())
}

/// Root -> intermediate -> leaf, each level issued by the one above.
#[test]
fn three_level_chain() -> Result<()> {
    let root = Profile::root("Chain Root", [])?;
    let root_template = Arc::new(root.subject().clone());

    let intermediate = Profile::intermediate(
        "Chain Intermediate",
        root_template.clone(),
        root.subject_private_key().cloned(),
        [],
    )?;
    let intermediate_certificate = intermediate.create_certificate()?;
    let intermediate_template =
        Arc::new(CertificateTemplate::from_certificate(&intermediate_certificate)?);

    let leaf = Profile::leaf(
        "chain.leaf.local",
        intermediate_template.clone(),
        intermediate.subject_private_key().cloned(),
        [],
    )?;
    let leaf_certificate = leaf.create_certificate()?;
    let leaf_template = CertificateTemplate::from_certificate(&leaf_certificate)?;

    assert_eq!(intermediate_template.issuer, root_template.subject);
    assert_eq!(leaf_template.issuer, intermediate_template.subject);
    assert_eq!(intermediate_template.path_len_constraint(), Some(0));

    // the same leaf, issued through the trait on the intermediate profile
    let via_trait = CertificateTemplate::from_certificate(&intermediate.issue(leaf.subject())?)?;
    assert_eq!(via_trait.issuer, intermediate_template.subject);
    Ok(())
}
