use serde::{Deserialize, Serialize};

/// A device position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `true` when both components are finite and inside the valid
    /// latitude/longitude ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5},{:.5}", self.latitude, self.longitude)
    }
}

/// One pharmacy entry shown to the user.
///
/// `maps_uri` is the identity key: a result set never holds two entries with
/// the same link. `id` is unique within one result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PharmacyResult {
    pub id: String,
    pub name: String,
    pub snippet: String,
    pub maps_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_validity_checks_ranges() {
        assert!(Coordinates::new(12.97, 77.59).is_valid());
        assert!(Coordinates::new(-90.0, 180.0).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn pharmacy_result_omits_absent_optional_fields() {
        let result = PharmacyResult {
            id: "p-1".to_string(),
            name: "Apollo Pharmacy".to_string(),
            snippet: "Open late".to_string(),
            maps_uri: "https://maps.google.com/?cid=1".to_string(),
            opening_hours: None,
            address: None,
            rating: None,
            distance: None,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["name"], "Apollo Pharmacy");
        assert!(json.get("opening_hours").is_none());
        assert!(json.get("address").is_none());
    }
}
