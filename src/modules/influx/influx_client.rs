use crate::config::InfluxConfig;
use crate::errors::PublishError;
use crate::relay::models::SensorReading;
use crate::relay::StoreSink;
use log::{info, warn};

/// Time-series sink writing InfluxDB v2 line protocol over HTTP.
///
/// One point per reading: the configured measurement, an `id` tag and the
/// four numeric fields, stamped with the wall clock in milliseconds.
pub struct InfluxSink {
    http: reqwest::Client,
    write_url: String,
    ping_url: String,
    token: String,
    measurement: String,
}

impl InfluxSink {
    pub fn new(config: &InfluxConfig) -> Self {
        let base = config.url.trim_end_matches('/');
        InfluxSink {
            http: reqwest::Client::new(),
            write_url: format!(
                "{}/api/v2/write?org={}&bucket={}&precision=ms",
                base, config.org, config.bucket
            ),
            ping_url: format!("{}/ping", base),
            token: config.token.clone(),
            measurement: config.measurement.clone(),
        }
    }

    /// Startup check, logged either way; the relay runs regardless.
    pub async fn validate_connection(&self) -> bool {
        match self.http.get(&self.ping_url).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                warn!("store ping returned {}", resp.status());
                false
            }
            Err(e) => {
                warn!("store ping failed: {}", e);
                false
            }
        }
    }

    fn line_protocol(&self, reading: &SensorReading, timestamp_ms: i64) -> String {
        format!(
            "{},id={} hum={},temp={},ppm={},lux={} {}",
            self.measurement,
            escape_tag_value(&reading.id),
            reading.humidity,
            reading.temperature,
            reading.gas_ppm,
            reading.luminosity,
            timestamp_ms
        )
    }
}

impl StoreSink for InfluxSink {
    async fn write(&mut self, reading: &SensorReading) -> Result<(), PublishError> {
        let body = self.line_protocol(reading, chrono::Utc::now().timestamp_millis());
        let resp = self
            .http
            .post(&self.write_url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|e| PublishError::StoreWriteFailed(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            return Err(PublishError::StoreWriteFailed(format!(
                "{}: {}",
                status,
                detail.trim()
            )));
        }
        info!("point written for station {}", reading.id);
        Ok(())
    }
}

/// Line-protocol tag values escape commas, spaces and equals signs.
fn escape_tag_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(',', "\\,")
        .replace(' ', "\\ ")
        .replace('=', "\\=")
}
