use indobot_relay::config::RelayConfig;
use indobot_relay::logger;
use indobot_relay::modules::influx::InfluxSink;
use indobot_relay::modules::mqtt::MqttLink;
use indobot_relay::modules::net::WirelessLink;
use indobot_relay::modules::ota::OtaClient;
use indobot_relay::modules::serial::SerialSource;
use indobot_relay::relay::{MonotonicClock, Relay, RelayOptions};
use log::{info, warn};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> indobot_relay::errors::Result<()> {
    logger::start_log();

    let config_path =
        env::var("RELAY_CONFIG").unwrap_or_else(|_| "/etc/indobot-relay.toml".to_string());
    info!("using config: {}", config_path);
    let config = RelayConfig::load_from_file(&config_path)?;

    let source = SerialSource::open(&config.serial)?;
    let broker = MqttLink::new(&config.mqtt);
    let net = WirelessLink::new(&config.network);
    let updater = OtaClient::new(&config.ota);

    let store = InfluxSink::new(&config.influx);
    if store.validate_connection().await {
        info!("connected to InfluxDB: {}", config.influx.url);
    } else {
        warn!("InfluxDB connection check failed: {}", config.influx.url);
    }

    let options = RelayOptions {
        reconnect_backoff: Duration::from_secs(config.mqtt.reconnect_backoff_secs),
        sync_interval: Duration::from_secs(config.ota.sync_interval_secs),
        firmware_version: config.ota.firmware_version.clone(),
    };

    let mut relay = Relay::new(
        options,
        broker,
        store,
        net,
        updater,
        source,
        MonotonicClock::new(),
    );
    info!("relay started");

    loop {
        let report = relay.tick().await;
        if report.is_idle() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}
