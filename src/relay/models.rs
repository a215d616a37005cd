//! Data carried through the ingestion pipeline.

/// One decoded sensor reading. Constructed fresh from each accepted line,
/// never mutated, discarded after fan-out.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    /// Station identifier; always non-empty.
    pub id: String,
    /// Relative humidity (%), wire key `hum`.
    pub humidity: f64,
    /// Temperature (deg C), wire key `temp`.
    pub temperature: f64,
    /// Gas concentration (ppm), wire key `ppm`.
    pub gas_ppm: f64,
    /// Luminosity (lux), wire key `lux`.
    pub luminosity: f64,
}

/// An inbound publish drained from the broker session.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: String,
}
