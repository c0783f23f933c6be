// crates/attestguard-verifiers/src/gateway_checks.rs
// ============================================================================
// Module: Gateway-Only Checks
// Description: TEE-key, certificate-key, DNS CAA, and CT-log checks.
// Purpose: Domain-trust checks unique to the GatewayVerifier variant.
// Dependencies: attestguard-clients, attestguard-core
// ============================================================================

//! ## Overview
//! Gateway-only checks (spec.md §4.3 "Gateway-only checks") bind the
//! gateway's TEE-held key to both its own quote and the live TLS
//! certificate, then check CAA/CT-log domain-trust signals. All four raise
//! `DomainUntrusted` on failure.

use attestguard_core::DataObjectCollector;
use attestguard_core::DataObjectField;
use attestguard_core::DataObjectKind;
use attestguard_core::FieldValue;
use attestguard_core::VerifyError;
use attestguard_core::VerifyErrorKind;

use crate::clients::VerifierClients;

fn untrusted(message: impl Into<String>) -> VerifyError {
    VerifyError::new(VerifyErrorKind::DomainUntrusted, message.into())
}

/// Asserts the gateway's certificate signing key is bound into its quote's
/// report data, reading `cert_pubkey` from the `gateway-main` object.
///
/// # Errors
///
/// Returns [`VerifyError`] of kind `DomainUntrusted` when the field is
/// missing or does not hash-match the quote's report data.
pub fn verify_tee_controlled_key(collector: &mut DataObjectCollector) -> Result<(), VerifyError> {
    let main_id = attestguard_core::DataObjectId::new(DataObjectKind::Gateway, DataObjectField::Main)
        .map_err(|err| VerifyError::new(VerifyErrorKind::Internal, err.to_string()))?;
    let quote_id = attestguard_core::DataObjectId::new(DataObjectKind::Gateway, DataObjectField::Quote)
        .map_err(|err| VerifyError::new(VerifyErrorKind::Internal, err.to_string()))?;

    let cert_pubkey = collector
        .get(&main_id)
        .and_then(|object| object.fields.get("cert_pubkey"))
        .and_then(FieldValue::as_str)
        .ok_or_else(|| untrusted("gateway-main missing cert_pubkey"))?
        .to_string();
    let report_data = collector
        .get(&quote_id)
        .and_then(|object| object.fields.get("report_data"))
        .and_then(FieldValue::as_str)
        .ok_or_else(|| untrusted("gateway-quote missing report_data"))?
        .to_string();

    let digest = attestguard_core::hashing::sha256_hex(cert_pubkey.as_bytes());
    if !report_data.eq_ignore_ascii_case(&digest) {
        return Err(untrusted("cert_pubkey does not hash-match quote report data"));
    }
    collector.set_field(main_id, "tee_controlled_key_verified", FieldValue::Json(serde_json::Value::Bool(true)));
    Ok(())
}

/// Fetches the live TLS certificate on `domain` and asserts its fingerprint
/// equals the TEE-bound key recorded by [`verify_tee_controlled_key`].
///
/// # Errors
///
/// Returns [`VerifyError`] of kind `DomainUntrusted` or `UpstreamUnavailable`.
pub fn verify_certificate_key(
    clients: &VerifierClients,
    collector: &mut DataObjectCollector,
    domain: &str,
) -> Result<(), VerifyError> {
    let main_id = attestguard_core::DataObjectId::new(DataObjectKind::Gateway, DataObjectField::Main)
        .map_err(|err| VerifyError::new(VerifyErrorKind::Internal, err.to_string()))?;
    let tee_pubkey = collector
        .get(&main_id)
        .and_then(|object| object.fields.get("cert_pubkey"))
        .and_then(FieldValue::as_str)
        .ok_or_else(|| untrusted("gateway-main missing cert_pubkey"))?
        .to_string();
    let live = clients
        .live_cert
        .fetch(domain)
        .map_err(|err| VerifyError::new(VerifyErrorKind::UpstreamUnavailable, err.to_string()))?;
    if !tee_pubkey.eq_ignore_ascii_case(&live.fingerprint_sha256_hex()) {
        return Err(untrusted(format!(
            "live certificate public key for {domain} does not match tee-bound key"
        )));
    }
    Ok(())
}

/// Resolves CAA for `domain` and asserts issuance is restricted to
/// `expected_issuer`/`expected_account`.
///
/// # Errors
///
/// Returns [`VerifyError`] of kind `DomainUntrusted` or `UpstreamUnavailable`.
pub fn verify_dns_caa(
    clients: &VerifierClients,
    domain: &str,
    expected_issuer: &str,
    expected_account: &str,
) -> Result<(), VerifyError> {
    let records = clients
        .dns_caa
        .resolve_caa(domain)
        .map_err(|err| VerifyError::new(VerifyErrorKind::UpstreamUnavailable, err.to_string()))?;
    let restricted = records.iter().any(|record| {
        record.tag == "issue"
            && record.issuer().eq_ignore_ascii_case(expected_issuer)
            && record.account_uri() == Some(expected_account)
    });
    if !restricted {
        return Err(untrusted(format!(
            "no caa record on {domain} restricts issuance to {expected_issuer} account {expected_account}"
        )));
    }
    Ok(())
}

/// Queries the CT-log index for `domain` and asserts the live fingerprint is
/// present with no unexpected issuers in the retention window.
///
/// # Errors
///
/// Returns [`VerifyError`] of kind `DomainUntrusted` or `UpstreamUnavailable`.
pub fn verify_ct_log(
    clients: &VerifierClients,
    domain: &str,
    trusted_issuers: &[&str],
) -> Result<(), VerifyError> {
    let live = clients
        .live_cert
        .fetch(domain)
        .map_err(|err| VerifyError::new(VerifyErrorKind::UpstreamUnavailable, err.to_string()))?;
    let live_fingerprint = live.fingerprint_sha256_hex();
    let entries = clients
        .ct_log
        .query(domain)
        .map_err(|err| VerifyError::new(VerifyErrorKind::UpstreamUnavailable, err.to_string()))?;

    let fingerprint_seen = entries
        .iter()
        .any(|entry| entry.sha256_fingerprint.as_deref().is_some_and(|fp| fp.eq_ignore_ascii_case(&live_fingerprint)));
    if !fingerprint_seen {
        return Err(untrusted(format!("live certificate fingerprint not found in ct log for {domain}")));
    }

    let unexpected_issuer = entries
        .iter()
        .find(|entry| !trusted_issuers.iter().any(|issuer| entry.issuer_name.eq_ignore_ascii_case(issuer)));
    if let Some(entry) = unexpected_issuer {
        return Err(untrusted(format!("unexpected historical issuer {} for {domain}", entry.issuer_name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use attestguard_core::DataObject;
    use attestguard_core::DataObjectCollector;
    use attestguard_core::DataObjectField;
    use attestguard_core::DataObjectId;
    use attestguard_core::DataObjectKind;
    use attestguard_core::FieldValue;
    use attestguard_core::hashing;

    use super::verify_tee_controlled_key;

    #[test]
    fn tee_controlled_key_passes_when_digest_matches() {
        let mut collector = DataObjectCollector::new();
        let cert_pubkey = "deadbeef";
        let digest = hashing::sha256_hex(cert_pubkey.as_bytes());
        let main_id = DataObjectId::new(DataObjectKind::Gateway, DataObjectField::Main).expect("id");
        let quote_id = DataObjectId::new(DataObjectKind::Gateway, DataObjectField::Quote).expect("id");
        collector.register(
            DataObject::new(main_id, "gateway-main", "").with_field("cert_pubkey", FieldValue::Hex(cert_pubkey.to_string())),
        );
        collector
            .register(DataObject::new(quote_id, "gateway-quote", "").with_field("report_data", FieldValue::Hex(digest)));

        assert!(verify_tee_controlled_key(&mut collector).is_ok());
    }

    #[test]
    fn tee_controlled_key_fails_on_mismatch() {
        let mut collector = DataObjectCollector::new();
        let main_id = DataObjectId::new(DataObjectKind::Gateway, DataObjectField::Main).expect("id");
        let quote_id = DataObjectId::new(DataObjectKind::Gateway, DataObjectField::Quote).expect("id");
        collector.register(
            DataObject::new(main_id, "gateway-main", "").with_field("cert_pubkey", FieldValue::Hex("aa".to_string())),
        );
        collector.register(
            DataObject::new(quote_id, "gateway-quote", "").with_field("report_data", FieldValue::Hex("bb".to_string())),
        );
        assert!(verify_tee_controlled_key(&mut collector).is_err());
    }
}
