//! Turning one serial line into a [`SensorReading`].

use crate::errors::DecodeError;
use crate::relay::models::SensorReading;
use serde_json::{Map, Value};

/// Decode one trimmed line.
///
/// The station firmware omits sensor fields it could not sample, so the
/// numeric keys (`hum`, `temp`, `ppm`, `lux`) are optional and default to
/// 0.0, which also means an absent field is indistinguishable from a true
/// zero in the store. Downstream consumers rely on that, so it stays. The
/// `id` key is mandatory: without a non-empty string id no reading exists.
pub fn decode(line: &str) -> Result<SensorReading, DecodeError> {
    let doc: Value =
        serde_json::from_str(line).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    let obj = doc
        .as_object()
        .ok_or_else(|| DecodeError::Malformed("not a JSON object".to_string()))?;

    let id = obj.get("id").and_then(Value::as_str).unwrap_or("");
    if id.is_empty() {
        return Err(DecodeError::MissingId);
    }

    Ok(SensorReading {
        id: id.to_string(),
        humidity: numeric_field(obj, "hum"),
        temperature: numeric_field(obj, "temp"),
        gas_ppm: numeric_field(obj, "ppm"),
        luminosity: numeric_field(obj, "lux"),
    })
}

fn numeric_field(obj: &Map<String, Value>, key: &str) -> f64 {
    obj.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_reading() {
        let reading =
            decode(r#"{"id":"s1","hum":55.2,"temp":24.1,"ppm":410,"lux":120}"#).unwrap();
        assert_eq!(reading.id, "s1");
        assert_eq!(reading.humidity, 55.2);
        assert_eq!(reading.temperature, 24.1);
        assert_eq!(reading.gas_ppm, 410.0);
        assert_eq!(reading.luminosity, 120.0);
    }

    #[test]
    fn missing_numeric_fields_default_to_zero() {
        let reading = decode(r#"{"id":"s2","temp":19.5}"#).unwrap();
        assert_eq!(reading.temperature, 19.5);
        assert_eq!(reading.humidity, 0.0);
        assert_eq!(reading.gas_ppm, 0.0);
        assert_eq!(reading.luminosity, 0.0);
    }

    #[test]
    fn absent_id_is_rejected() {
        assert!(matches!(
            decode(r#"{"hum":55.2}"#),
            Err(DecodeError::MissingId)
        ));
    }

    #[test]
    fn empty_id_is_rejected() {
        assert!(matches!(
            decode(r#"{"id":"","temp":20}"#),
            Err(DecodeError::MissingId)
        ));
    }

    #[test]
    fn non_string_id_is_rejected() {
        // Matches the station contract: the id must be a string.
        assert!(matches!(
            decode(r#"{"id":5,"temp":20}"#),
            Err(DecodeError::MissingId)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(decode("not json"), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn non_object_json_is_malformed() {
        assert!(matches!(decode("[1,2,3]"), Err(DecodeError::Malformed(_))));
        assert!(matches!(decode("\"s1\""), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn non_numeric_field_values_default_to_zero() {
        let reading = decode(r#"{"id":"s3","hum":"wet"}"#).unwrap();
        assert_eq!(reading.humidity, 0.0);
    }

    #[test]
    fn extra_keys_are_ignored() {
        let reading = decode(r#"{"id":"s4","temp":21.0,"battery":88}"#).unwrap();
        assert_eq!(reading.id, "s4");
        assert_eq!(reading.temperature, 21.0);
    }
}
