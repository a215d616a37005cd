mod mqtt_client;

pub use mqtt_client::MqttLink;
