use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Something a musician offers for booking. Only the owner link is fixed;
/// the rest (name, price, duration...) is whatever was stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOffering {
    pub id: String,
    pub musician_id: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_free_form_fields() {
        let offering: ServiceOffering = serde_json::from_value(json!({
            "id": "s1",
            "musicianId": "m1",
            "name": "Mixing",
            "price": 40
        }))
        .unwrap();
        assert_eq!(offering.details.get("price"), Some(&json!(40)));

        let value = serde_json::to_value(&offering).unwrap();
        assert_eq!(value, json!({ "id": "s1", "musicianId": "m1", "name": "Mixing", "price": 40 }));
    }
}
