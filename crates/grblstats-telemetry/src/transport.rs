//! Report transport
//!
//! A single form-encoded POST per report, bounded by a request timeout and
//! never retried. Delivery counts only when the response body is exactly
//! [`SUCCESS_MARKER`].

use crate::error::TransportError;
use crate::report::Report;
use grblstats_settings::TelemetrySettings;
use reqwest::blocking::Client;
use reqwest::Url;
use std::time::Duration;

/// Body the collection endpoint returns on acceptance
pub const SUCCESS_MARKER: &str = "Success!";

/// Longest response excerpt kept in an error
const BODY_EXCERPT_LEN: usize = 64;

/// Something that can deliver a report
pub trait ReportTransport: Send {
    /// Submit `report` once. `Ok` only on confirmed acceptance.
    fn send(&self, report: &Report) -> Result<(), TransportError>;
}

/// Delivers reports to an HTTP(S) collection endpoint
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: Url,
    timeout: Duration,
    client: Client,
}

impl HttpTransport {
    /// Create a transport for `endpoint` with the given request timeout
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, TransportError> {
        let url = Url::parse(endpoint.trim()).map_err(|e| TransportError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(TransportError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("grblstats/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            endpoint: url,
            timeout,
            client,
        })
    }

    /// Transport for the configured endpoint
    pub fn from_settings(settings: &TelemetrySettings) -> Result<Self, TransportError> {
        let endpoint = settings.endpoint().ok_or(TransportError::NotConfigured)?;
        Self::new(endpoint, settings.request_timeout())
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn map_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            TransportError::Network(e.to_string())
        }
    }
}

impl ReportTransport for HttpTransport {
    fn send(&self, report: &Report) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .form(report.fields())
            .send()
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(|e| self.map_error(e))?;
        check_body(&body)
    }
}

fn check_body(body: &str) -> Result<(), TransportError> {
    if body == SUCCESS_MARKER {
        Ok(())
    } else {
        Err(TransportError::UnexpectedResponse {
            body: body.chars().take(BODY_EXCERPT_LEN).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_body_requires_exact_marker() {
        assert!(check_body("Success!").is_ok());
        assert!(check_body("Success! ").is_err());
        assert!(check_body("success!").is_err());
        assert!(check_body("Fail").is_err());
        assert!(check_body("").is_err());
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = "x".repeat(500);
        match check_body(&body) {
            Err(TransportError::UnexpectedResponse { body }) => {
                assert_eq!(body.len(), BODY_EXCERPT_LEN)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_invalid_endpoints() {
        assert!(matches!(
            HttpTransport::new("not a url", Duration::from_secs(5)),
            Err(TransportError::InvalidEndpoint { .. })
        ));
        assert!(matches!(
            HttpTransport::new("ftp://stats.example.org", Duration::from_secs(5)),
            Err(TransportError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_from_settings() {
        let settings = TelemetrySettings::default();
        assert!(matches!(
            HttpTransport::from_settings(&settings),
            Err(TransportError::NotConfigured)
        ));

        let settings = TelemetrySettings::new().with_endpoint("https://stats.example.org/collect");
        let transport = HttpTransport::from_settings(&settings).unwrap();
        assert_eq!(transport.timeout(), Duration::from_millis(5000));
        assert_eq!(transport.endpoint().host_str(), Some("stats.example.org"));
    }
}
