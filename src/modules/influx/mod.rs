mod influx_client;

pub use influx_client::InfluxSink;
