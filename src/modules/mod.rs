pub mod influx;
pub mod mqtt;
pub mod net;
pub mod ota;
pub mod serial;
