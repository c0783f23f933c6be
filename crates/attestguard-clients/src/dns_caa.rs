// crates/attestguard-clients/src/dns_caa.rs
// ============================================================================
// Module: DNS CAA Resolver
// Description: Adapter for resolving CAA records on the gateway's guarded domain.
// Purpose: Confirm certificate issuance is restricted to the gateway's account.
// Dependencies: trust-dns-resolver
// ============================================================================

//! ## Overview
//! `verifyDnsCAA` (spec.md §4.6) requires the CAA record set for a domain
//! to restrict issuance to an account the gateway controls; this adapter
//! only resolves the record set; the verifier itself judges issuer and
//! account-URI match against configured values.

use trust_dns_resolver::Resolver;
use trust_dns_resolver::config::ResolverConfig;
use trust_dns_resolver::config::ResolverOpts;
use trust_dns_resolver::proto::rr::rdata::caa::Value as CaaValue;
use trust_dns_resolver::rr::RData;
use trust_dns_resolver::rr::RecordType;

use crate::error::ClientError;

/// A single CAA record, as resolved from DNS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaaRecord {
    /// CAA tag, e.g. `"issue"`, `"issuewild"`, `"iodef"`.
    pub tag: String,
    /// Tag value, typically an issuer domain optionally followed by `; account=...`.
    pub value: String,
}

impl CaaRecord {
    /// Extracts the `account=` parameter from the value, when present.
    #[must_use]
    pub fn account_uri(&self) -> Option<&str> {
        self.value.split(';').find_map(|part| part.trim().strip_prefix("account="))
    }

    /// Returns the issuer domain portion of the value (before any `;`).
    #[must_use]
    pub fn issuer(&self) -> &str {
        self.value.split(';').next().unwrap_or(&self.value).trim()
    }
}

/// Narrow capability for resolving CAA records.
pub trait DnsCaaResolver {
    /// Resolves the CAA record set for `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when resolution fails.
    fn resolve_caa(&self, domain: &str) -> Result<Vec<CaaRecord>, ClientError>;
}

/// [`DnsCaaResolver`] backed by the system/default DNS resolver configuration.
pub struct SystemDnsCaaResolver {
    resolver: Resolver,
}

impl SystemDnsCaaResolver {
    /// Builds a resolver using the OS-configured nameservers, falling back to
    /// Cloudflare's public resolver when none can be read.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the resolver cannot be constructed.
    pub fn new() -> Result<Self, ClientError> {
        let resolver = Resolver::new(ResolverConfig::cloudflare(), ResolverOpts::default())
            .map_err(|err| ClientError::InvalidRequest(format!("dns resolver init: {err}")))?;
        Ok(Self { resolver })
    }
}

impl DnsCaaResolver for SystemDnsCaaResolver {
    fn resolve_caa(&self, domain: &str) -> Result<Vec<CaaRecord>, ClientError> {
        let lookup = self
            .resolver
            .lookup(domain, RecordType::CAA)
            .map_err(|err| ClientError::Upstream(format!("caa lookup for {domain}: {err}")))?;
        let mut records = Vec::new();
        for record in lookup.iter() {
            if let RData::CAA(caa) = record {
                let tag = caa.tag().to_string();
                let value = match caa.value() {
                    CaaValue::Issuer(issuer, params) => {
                        let issuer_name = issuer.as_ref().map(ToString::to_string).unwrap_or_else(|| ";".to_string());
                        let params_suffix: String = params
                            .iter()
                            .map(|kv| format!("; {}={}", kv.key(), kv.value()))
                            .collect();
                        format!("{issuer_name}{params_suffix}")
                    }
                    CaaValue::Url(url) => url.to_string(),
                    CaaValue::Unknown(raw) => String::from_utf8_lossy(raw).into_owned(),
                };
                records.push(CaaRecord { tag, value });
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::CaaRecord;

    #[test]
    fn account_uri_extracts_trailing_parameter() {
        let record = CaaRecord {
            tag: "issue".to_string(),
            value: "letsencrypt.org; account=12345".to_string(),
        };
        assert_eq!(record.account_uri(), Some("12345"));
        assert_eq!(record.issuer(), "letsencrypt.org");
    }

    #[test]
    fn issuer_handles_records_with_no_parameters() {
        let record = CaaRecord {
            tag: "issue".to_string(),
            value: "letsencrypt.org".to_string(),
        };
        assert_eq!(record.issuer(), "letsencrypt.org");
        assert_eq!(record.account_uri(), None);
    }
}
