// crates/attestguard-clients/src/quote.rs
// ============================================================================
// Module: TDX Quote Decoder/Verifier
// Description: Adapter to a bundled command-line tool that decodes and verifies TDX quotes.
// Purpose: Turn raw quote bytes into decoded measurement registers and a signature verdict.
// Dependencies: hex, serde_json, std::process
// ============================================================================

//! ## Overview
//! The quote tool is a local binary invoked as `decode [--hex] [--fmspc]
//! <file>` and `verify [--hex] <file>`, both emitting JSON on stdout
//! (spec.md §6). Callers on an async runtime MUST dispatch through
//! `tokio::task::spawn_blocking` (§5) since this shells out to a subprocess;
//! this adapter itself is synchronous and working-directory-free, writing
//! its temp file per call so concurrent runs never contaminate each other
//! (spec.md §9 "External binary for quote verification").

use std::io::Write as _;
use std::process::Command;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ClientError;

/// Decoded TDX quote measurement registers and report data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedQuote {
    /// Build-time measurement register, hex-encoded.
    pub mrtd: String,
    /// Runtime measurement registers 0..=3, hex-encoded.
    pub rtmr: [String; 4],
    /// Report data embedded in the quote, hex-encoded.
    pub report_data: String,
    /// FMSPC platform identifier, when requested.
    pub fmspc: Option<String>,
}

/// Result of a quote signature verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteVerification {
    /// True when the quote's signature chain verifies.
    pub signature_valid: bool,
}

/// Narrow capability for decoding and verifying TDX quotes.
pub trait QuoteDecoder {
    /// Decodes a quote (hex or binary) into its measurement registers.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the tool fails or emits unparsable output.
    fn decode(&self, quote: &[u8], hex_encoded: bool, want_fmspc: bool) -> Result<DecodedQuote, ClientError>;

    /// Verifies a quote's signature chain.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the tool fails or emits unparsable output.
    fn verify(&self, quote: &[u8], hex_encoded: bool) -> Result<QuoteVerification, ClientError>;
}

/// [`QuoteDecoder`] backed by a configured external binary.
#[derive(Debug, Clone)]
pub struct TdxQuoteTool {
    binary_path: String,
}

impl TdxQuoteTool {
    /// Builds an adapter pointed at the given binary path.
    #[must_use]
    pub fn new(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Writes `quote` to a fresh temp file and runs the tool subcommand
    /// against it, parsing stdout as JSON.
    fn run(&self, subcommand: &str, quote: &[u8], extra_args: &[&str]) -> Result<serde_json::Value, ClientError> {
        let mut file = tempfile::NamedTempFile::new()
            .map_err(|err| ClientError::InvalidRequest(format!("temp file: {err}")))?;
        file.write_all(quote).map_err(|err| ClientError::InvalidRequest(format!("temp file: {err}")))?;
        let path = file.path();
        let mut command = Command::new(&self.binary_path);
        command.arg(subcommand);
        command.args(extra_args);
        command.arg(path);
        let output = command
            .output()
            .map_err(|err| ClientError::Upstream(format!("quote tool spawn failed: {err}")))?;
        if !output.status.success() {
            return Err(ClientError::Upstream(format!(
                "quote tool exited with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        serde_json::from_slice(&output.stdout)
            .map_err(|err| ClientError::InvalidResponse(format!("quote tool output: {err}")))
    }
}

impl QuoteDecoder for TdxQuoteTool {
    fn decode(&self, quote: &[u8], hex_encoded: bool, want_fmspc: bool) -> Result<DecodedQuote, ClientError> {
        let mut args = Vec::new();
        if hex_encoded {
            args.push("--hex");
        }
        if want_fmspc {
            args.push("--fmspc");
        }
        let value = self.run("decode", quote, &args)?;
        serde_json::from_value(value)
            .map_err(|err| ClientError::InvalidResponse(format!("decode output shape: {err}")))
    }

    fn verify(&self, quote: &[u8], hex_encoded: bool) -> Result<QuoteVerification, ClientError> {
        let args: Vec<&str> = if hex_encoded { vec!["--hex"] } else { vec![] };
        let value = self.run("verify", quote, &args)?;
        serde_json::from_value(value)
            .map_err(|err| ClientError::InvalidResponse(format!("verify output shape: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write as _;
    use std::os::unix::fs::PermissionsExt as _;

    use super::QuoteDecoder;
    use super::TdxQuoteTool;

    fn write_fake_tool(body: &str) -> tempfile::TempPath {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(body.as_bytes()).expect("write script");
        let path = file.into_temp_path();
        let mut perms = fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("chmod");
        path
    }

    #[test]
    fn decode_parses_tool_json_output() {
        let script = "#!/bin/sh\necho '{\"mrtd\":\"aa\",\"rtmr\":[\"00\",\"11\",\"22\",\"33\"],\"report_data\":\"ff\",\"fmspc\":null}'\n";
        let path = write_fake_tool(script);
        let tool = TdxQuoteTool::new(path.to_string_lossy().to_string());
        let decoded = tool.decode(b"fake-quote", false, false).expect("decode");
        assert_eq!(decoded.mrtd, "aa");
        assert_eq!(decoded.rtmr[2], "22");
    }

    #[test]
    fn verify_surfaces_nonzero_exit_as_upstream_error() {
        let script = "#!/bin/sh\nexit 1\n";
        let path = write_fake_tool(script);
        let tool = TdxQuoteTool::new(path.to_string_lossy().to_string());
        let result = tool.verify(b"fake-quote", false);
        assert!(result.is_err());
    }
}
