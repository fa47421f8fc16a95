use crate::error::{ProfileError, Result};

/// Convert DER‑encoded data into a PEM‑encoded string with the provided label.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(&pem, pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF))
}

/// Convert the first PEM block of `pem_str` to DER, requiring its label to be `label`.
pub fn pem_to_der(pem_str: &str, label: &str) -> Result<Vec<u8>> {
    let pem = pem::parse(pem_str).map_err(|e| ProfileError::DecodingError(e.to_string()))?;
    if pem.tag() != label {
        return Err(ProfileError::DecodingError(format!(
            "expected PEM label {label}, found {}",
            pem.tag()
        )));
    }
    Ok(pem.contents().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pem_label_is_checked() {
        let pem = der_to_pem(&[0x30, 0x00], "CERTIFICATE REQUEST");
        assert_eq!(pem_to_der(&pem, "CERTIFICATE REQUEST").unwrap(), vec![0x30, 0x00]);
        assert!(matches!(
            pem_to_der(&pem, "CERTIFICATE"),
            Err(ProfileError::DecodingError(_))
        ));
    }
}
