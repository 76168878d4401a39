//! HTTP connector to the monitoring backend, backed by blocking reqwest
//! when the `http` feature is enabled.

use std::sync::Arc;

use openkit_core::constants::{AGENT_TECHNOLOGY_TYPE, OPENKIT_VERSION, PLATFORM_TYPE_OPENKIT};
use openkit_core::{Configuration, Connector, StatusResponse, TimeSyncResponse, TransportError};

const REQUEST_TYPE_MOBILE: &str = "type=m";
const REQUEST_TYPE_TIMESYNC: &str = "type=mts";
#[cfg_attr(not(feature = "http"), allow(dead_code))]
const CLIENT_IP_HEADER: &str = "X-Client-IP";

/// Convert a string into a TransportError::NetworkError.
#[cfg_attr(not(feature = "http"), allow(dead_code))]
fn net_err(reason: String) -> TransportError {
    TransportError::NetworkError { reason }
}

#[derive(Debug)]
pub struct HttpConnector {
    configuration: Arc<Configuration>,
    #[cfg(feature = "http")]
    client: reqwest::blocking::Client,
}

impl HttpConnector {
    pub fn new(configuration: Arc<Configuration>) -> Result<Self, TransportError> {
        #[cfg(feature = "http")]
        {
            let client = reqwest::blocking::Client::builder()
                .timeout(configuration.settings().communication.http_timeout())
                .gzip(true)
                .build()
                .map_err(|e| net_err(e.to_string()))?;
            Ok(Self {
                configuration,
                client,
            })
        }

        #[cfg(not(feature = "http"))]
        {
            Ok(Self { configuration })
        }
    }

    /// URL for status and beacon requests. The server id is read on every
    /// call because status responses may change it.
    pub fn monitor_url(&self) -> String {
        let settings = self.configuration.settings();
        format!(
            "{}?{REQUEST_TYPE_MOBILE}&srvid={}&app={}&va={}&pt={PLATFORM_TYPE_OPENKIT}&tt={AGENT_TECHNOLOGY_TYPE}",
            settings.endpoint_url,
            self.configuration.server_id(),
            urlencoding::encode(&settings.application_id),
            urlencoding::encode(OPENKIT_VERSION),
        )
    }

    pub fn time_sync_url(&self) -> String {
        format!(
            "{}?{REQUEST_TYPE_TIMESYNC}",
            self.configuration.settings().endpoint_url
        )
    }

    #[cfg(feature = "http")]
    fn read_body(
        response: reqwest::blocking::Response,
    ) -> Result<(u16, String), TransportError> {
        let code = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| TransportError::MalformedResponse {
                reason: e.to_string(),
            })?;
        Ok((code, body))
    }

    #[cfg(not(feature = "http"))]
    fn disabled<T>() -> Result<T, TransportError> {
        Err(TransportError::FeatureDisabled {
            feature: "http".to_string(),
        })
    }
}

impl Connector for HttpConnector {
    fn send_status_request(&self) -> Result<StatusResponse, TransportError> {
        #[cfg(feature = "http")]
        {
            let url = self.monitor_url();
            tracing::debug!(url = %url, "sending status request");
            let response = self
                .client
                .get(&url)
                .send()
                .map_err(|e| net_err(e.to_string()))?;
            let (code, body) = Self::read_body(response)?;
            Ok(StatusResponse::parse(&body, code))
        }

        #[cfg(not(feature = "http"))]
        {
            Self::disabled()
        }
    }

    fn send_beacon_request(
        &self,
        client_ip: &str,
        payload: &[u8],
    ) -> Result<StatusResponse, TransportError> {
        #[cfg(feature = "http")]
        {
            let url = self.monitor_url();
            tracing::debug!(url = %url, bytes = payload.len(), "sending beacon request");
            let mut request = self.client.post(&url).body(payload.to_vec());
            if !client_ip.is_empty() {
                request = request.header(CLIENT_IP_HEADER, client_ip);
            }
            let response = request.send().map_err(|e| net_err(e.to_string()))?;
            let (code, body) = Self::read_body(response)?;
            Ok(StatusResponse::parse(&body, code))
        }

        #[cfg(not(feature = "http"))]
        {
            let _ = (client_ip, payload);
            Self::disabled()
        }
    }

    fn send_time_sync_request(&self) -> Result<TimeSyncResponse, TransportError> {
        #[cfg(feature = "http")]
        {
            let url = self.time_sync_url();
            let response = self
                .client
                .get(&url)
                .send()
                .map_err(|e| net_err(e.to_string()))?;
            let (code, body) = Self::read_body(response)?;
            Ok(TimeSyncResponse::parse(&body, code))
        }

        #[cfg(not(feature = "http"))]
        {
            Self::disabled()
        }
    }
}
