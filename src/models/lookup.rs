use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// An id/name pair offered in admin select boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Choosable {
    pub id: i32,
    pub name: String,
}

/// An event type with the genres that may be paired with it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventTypeGenres {
    pub id: i32,
    pub name: String,
    pub genres: Json<Vec<Choosable>>,
}

/// One bit of the accessibility bitmask, grouped by topic.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct AccessibilityFlag {
    #[serde(rename = "id")]
    pub flag: i32,
    pub topic_id: i32,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_genres_serialize_flat() {
        let item = EventTypeGenres {
            id: 1,
            name: "concert".to_string(),
            genres: Json(vec![Choosable { id: 3, name: "jazz".to_string() }]),
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["genres"][0]["name"], "jazz");
        assert_eq!(value["genres"][0]["id"], 3);
    }

    #[test]
    fn test_accessibility_flag_exposes_bit_as_id() {
        let flag = AccessibilityFlag { flag: 5, topic_id: 2, name: "hearing loop".to_string() };
        let value = serde_json::to_value(&flag).unwrap();
        assert_eq!(value["id"], 5);
        assert!(value.get("flag").is_none());
    }
}
