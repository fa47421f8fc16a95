//! # CertProfile - X.509 Certificate Profiles in Pure Rust
//!
//! CertProfile builds unsigned X.509 certificate templates ("profiles") together with
//! the key material needed to sign them, using only rustcrypto libraries. A profile is
//! constructed once from a kind-specific default template, the caller's options and a
//! resolved subject key pair; signing it yields a DER/PEM certificate.
//!
//! ## Profile Kinds
//!
//! - **Leaf**: end-entity certificates, built from a common name, a template, or a
//!   certificate signing request, or self-signed
//! - **Intermediate**: CA certificates that sign leaves only
//! - **Root**: self-signed CA certificates
//!
//! ## Supported Key Types
//!
//! - **RSA**: 2048, 3072, and 4096-bit keys
//! - **ECDSA**: P-256 (the default) and P-384 curves
//! - **Ed25519**: Edwards curve digital signature algorithm
//!
//! ## Quick Start
//!
//! ### Issuing a Leaf Certificate
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use certprofile::profile::{Profile, ProfileOption};
//!
//! # fn main() -> Result<(), certprofile::error::ProfileError> {
//! let root = Profile::root("Example Root CA", [])?;
//! let root_certificate = root.create_certificate()?;
//!
//! let leaf = Profile::leaf(
//!     "svc.example.com",
//!     Arc::new(root.subject().clone()),
//!     root.subject_private_key().cloned(),
//!     [ProfileOption::Hosts("svc.example.com,10.0.0.1".to_string())],
//! )?;
//! let leaf_certificate = leaf.create_certificate()?;
//!
//! println!("{}", root_certificate.to_pem()?);
//! println!("{}", leaf_certificate.to_pem()?);
//! # Ok(())
//! # }
//! ```
//!
//! ### Signing a Certificate Request
//!
//! ```rust,no_run
//! use certprofile::{cert::request::CertificateRequest, issuer::CertificateAuthority, profile::Profile};
//!
//! # fn main() -> Result<(), certprofile::error::ProfileError> {
//! # let (ca_pem, ca_key_pem, csr_pem) = (String::new(), String::new(), String::new());
//! let ca = CertificateAuthority::from_pem(&ca_pem, &ca_key_pem)?;
//! let csr = CertificateRequest::from_pem(&csr_pem)?;
//!
//! let profile = Profile::leaf_with_csr(&csr, ca.template(), Some(ca.private_key()), [])?;
//! let certificate = profile.create_certificate()?;
//! # let _ = certificate;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns a [`error::ProfileError`]:
//!
//! ```rust
//! use certprofile::{error::ProfileError, profile::Profile};
//!
//! match Profile::self_signed_leaf("", []) {
//!     Ok(_) => unreachable!(),
//!     Err(ProfileError::InvalidInput(msg)) => println!("Invalid input: {}", msg),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`profile`]: Profile construction, entry points and options
//! - [`issuer`]: Signing profiles into certificates
//! - [`cert`]: Certificate templates, extensions, requests and encoding
//! - [`key`]: Key generation, import/export, and cryptographic operations
//! - [`error`]: Error types
//! - [`tbs_certificate`]: Low-level certificate structure manipulation

pub mod cert;
pub mod error;
pub mod issuer;
pub mod key;
pub mod pem_utils;
pub mod profile;
pub mod tbs_certificate;
