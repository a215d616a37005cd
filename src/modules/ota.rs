//! Firmware-update service client.

use crate::config::OtaConfig;
use crate::errors::UpdateError;
use crate::relay::UpdateService;
use log::info;
use reqwest::StatusCode;

/// Asks the update service whether a newer firmware exists for this
/// device. Image download and flashing belong to the service side; here
/// only the version sync call is made.
pub struct OtaClient {
    http: reqwest::Client,
    url: String,
    token: String,
}

impl OtaClient {
    pub fn new(config: &OtaConfig) -> Self {
        OtaClient {
            http: reqwest::Client::new(),
            url: format!("{}/update", config.url.trim_end_matches('/')),
            token: config.token.clone(),
        }
    }
}

impl UpdateService for OtaClient {
    async fn check_update(&mut self, version: &str) -> Result<(), UpdateError> {
        let resp = self
            .http
            .get(&self.url)
            .query(&[("k", self.token.as_str()), ("v", &format!("v@{}", version))])
            .send()
            .await
            .map_err(|e| UpdateError(e.to_string()))?;

        let status = resp.status();
        // 304 means the running version is current.
        if status.is_success() || status == StatusCode::NOT_MODIFIED {
            info!("firmware check complete ({})", status);
            Ok(())
        } else {
            Err(UpdateError(format!("update service returned {}", status)))
        }
    }
}
