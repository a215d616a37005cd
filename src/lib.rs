//! Telemetry relay for the indobot station: reads line-delimited sensor
//! readings from a serial peer and forwards each accepted reading to an
//! MQTT broker and an InfluxDB bucket, while keeping the wireless link and
//! broker session alive and periodically syncing the firmware version.
//!
//! The engine lives in [`relay`] and talks to the outside world only
//! through the seam traits defined there; the concrete MQTT, InfluxDB,
//! serial, network and update-service implementations live in [`modules`].

pub mod config;
pub mod errors;
pub mod logger;
pub mod modules;
pub mod relay;
