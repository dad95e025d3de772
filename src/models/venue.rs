use serde::Serialize;
use serde_json::{json, Value};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Venue {
    pub id: i32,
    pub organizer_id: i32,
    pub venue_type_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website_link: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub state_code: Option<String>,
    pub country_code: Option<String>,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VenueListItem {
    pub id: i32,
    pub name: String,
    pub organizer_id: i32,
    pub organizer_name: String,
    pub venue_type: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
}

/// GeoJSON FeatureCollection of the venues that have a position.
pub fn feature_collection(venues: &[VenueListItem]) -> Value {
    let features: Vec<Value> = venues
        .iter()
        .filter_map(|v| {
            let (lon, lat) = (v.lon?, v.lat?);
            Some(json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [lon, lat] },
                "properties": {
                    "id": v.id,
                    "name": v.name,
                    "organizer_id": v.organizer_id,
                    "organizer_name": v.organizer_name,
                    "venue_type": v.venue_type,
                    "street": v.street,
                    "house_number": v.house_number,
                    "postal_code": v.postal_code,
                    "city": v.city,
                    "country_code": v.country_code,
                },
            }))
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue(id: i32, pos: Option<(f64, f64)>) -> VenueListItem {
        VenueListItem {
            id,
            name: format!("Venue {}", id),
            organizer_id: 1,
            organizer_name: "Kulturverein".to_string(),
            venue_type: Some("club".to_string()),
            street: None,
            house_number: None,
            postal_code: Some("24937".to_string()),
            city: Some("Flensburg".to_string()),
            country_code: Some("DE".to_string()),
            lon: pos.map(|p| p.0),
            lat: pos.map(|p| p.1),
        }
    }

    #[test]
    fn test_feature_collection_skips_unpositioned() {
        let fc = feature_collection(&[venue(1, Some((9.43, 54.78))), venue(2, None)]);
        assert_eq!(fc["type"], "FeatureCollection");
        let features = fc["features"].as_array().unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0]["geometry"]["coordinates"], json!([9.43, 54.78]));
        assert_eq!(features[0]["properties"]["id"], 1);
        assert_eq!(features[0]["properties"]["city"], "Flensburg");
    }
}
