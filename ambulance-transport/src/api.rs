use ambulance_logic::{
    AmbulanceRecord, Coordinate, DEFAULT_AMBULANCE_STATUS, DEFAULT_NOT_FOUND_MESSAGE,
    DispatchResult, prelude::*,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
/// Body of a search request
pub struct SearchRequest<'a> {
    lat: f64,
    lon: f64,
    timestamp: &'a str,
}

impl<'a> SearchRequest<'a> {
    pub fn new(origin: Coordinate, timestamp: &'a str) -> Self {
        Self {
            lat: origin.latitude(),
            lon: origin.longitude(),
            timestamp,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
/// The service doesn't agree with itself on whether IDs are numbers or strings
enum WireId {
    Text(String),
    Number(serde_json::Number),
}

impl From<WireId> for String {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Text(s) => s,
            WireId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireAmbulance {
    id: WireId,
    lat: f64,
    lon: f64,
    estado: Option<String>,
    tiempo_estimado: Option<f64>,
}

#[derive(Debug, Deserialize)]
/// Body of a search response
pub struct SearchResponse {
    ok: bool,
    ambulancia: Option<WireAmbulance>,
    distancia: Option<f64>,
    mensaje: Option<String>,
}

impl SearchResponse {
    pub fn into_result(self) -> Result<DispatchResult> {
        if !self.ok {
            let message = self
                .mensaje
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_NOT_FOUND_MESSAGE.to_string());
            return Ok(DispatchResult::NotFound { message });
        }

        let amb = self
            .ambulancia
            .context("Response is ok but has no ambulance")?;

        let coordinate =
            Coordinate::new(amb.lat, amb.lon).context("Ambulance has an invalid location")?;

        let ambulance = AmbulanceRecord {
            id: amb.id.into(),
            coordinate,
            status: amb
                .estado
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_AMBULANCE_STATUS.to_string()),
            eta_minutes: amb.tiempo_estimado,
        };

        Ok(DispatchResult::Found {
            ambulance,
            distance_km: self.distancia,
        })
    }
}

pub fn decode_response(body: &[u8]) -> Result<DispatchResult> {
    serde_json::from_slice::<SearchResponse>(body)
        .context("Failed to parse response")?
        .into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found() {
        let body = br#"{"ok":true,"ambulancia":{"id":"A1","lat":19.41,"lon":-99.11,"tiempo_estimado":7},"distancia":1.2}"#;

        let res = decode_response(body).expect("Failed to decode");

        match res {
            DispatchResult::Found {
                ambulance,
                distance_km,
            } => {
                assert_eq!(ambulance.id, "A1");
                assert_eq!(ambulance.coordinate.latitude(), 19.41);
                assert_eq!(ambulance.coordinate.longitude(), -99.11);
                assert_eq!(ambulance.status, "En camino", "Status didn't default");
                assert_eq!(ambulance.eta_minutes, Some(7.0));
                assert_eq!(distance_km, Some(1.2));
            }
            other => panic!("Expected Found, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_id_and_status() {
        let body = br#"{"ok":true,"ambulancia":{"id":12,"lat":0,"lon":0,"estado":"Disponible"}}"#;

        match decode_response(body).expect("Failed to decode") {
            DispatchResult::Found {
                ambulance,
                distance_km,
            } => {
                assert_eq!(ambulance.id, "12");
                assert_eq!(ambulance.status, "Disponible");
                assert_eq!(ambulance.eta_minutes, None);
                assert_eq!(distance_km, None);
            }
            other => panic!("Expected Found, got {other:?}"),
        }
    }

    #[test]
    fn test_not_found() {
        let res = decode_response(br#"{"ok":false,"mensaje":"sin unidades"}"#)
            .expect("Failed to decode");
        assert_eq!(
            res,
            DispatchResult::NotFound {
                message: "sin unidades".to_string()
            }
        );

        let res = decode_response(br#"{"ok":false}"#).expect("Failed to decode");
        assert_eq!(
            res,
            DispatchResult::NotFound {
                message: "No se pudo encontrar ambulancia".to_string()
            },
            "Missing message didn't default"
        );
    }

    #[test]
    fn test_malformed() {
        assert!(decode_response(b"<html>").is_err(), "Non JSON accepted");
        assert!(decode_response(br#"{"mensaje":"x"}"#).is_err(), "Missing ok accepted");
        assert!(
            decode_response(br#"{"ok":true}"#).is_err(),
            "Ok without ambulance accepted"
        );
        assert!(
            decode_response(br#"{"ok":true,"ambulancia":{"id":"A1","lat":95,"lon":0}}"#)
                .is_err(),
            "Out of range ambulance accepted"
        );
    }

    #[test]
    fn test_request_shape() {
        let origin = Coordinate::new(19.4, -99.1).unwrap();
        let value = serde_json::to_value(SearchRequest::new(origin, "2026-10-15T12:00:00.000Z"))
            .expect("Failed to encode");
        assert_eq!(
            value,
            serde_json::json!({
                "lat": 19.4,
                "lon": -99.1,
                "timestamp": "2026-10-15T12:00:00.000Z",
            })
        );
    }
}
