use std::sync::Arc;

use certprofile::cert::Certificate;
use certprofile::cert::template::CertificateTemplate;
use certprofile::key::KeyPair;
use certprofile::profile::Profile;

/// A signed test CA: its profile, its certificate, and the certificate decoded back
/// into a template the way a caller loading a CA from disk would see it.
pub struct TestCa {
    pub profile: Profile,
    pub certificate: Certificate,
    pub template: Arc<CertificateTemplate>,
}

impl TestCa {
    pub fn private_key(&self) -> Option<Arc<KeyPair>> {
        self.profile.subject_private_key().cloned()
    }
}

pub fn generate_ca() -> TestCa {
    let profile = Profile::root("myca.local", []).unwrap();
    let certificate = profile.create_certificate().unwrap();
    let template = Arc::new(CertificateTemplate::from_certificate(&certificate).unwrap());
    TestCa {
        profile,
        certificate,
        template,
    }
}

#[allow(dead_code)]
pub fn write_debug_pem(name: &str, pem: &str) {
    std::fs::create_dir_all(".debug_certs").unwrap();
    std::fs::write(format!(".debug_certs/{name}.pem"), pem).unwrap();
}
