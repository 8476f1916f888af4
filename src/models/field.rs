use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Reads a nullable column as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Field {
    pub id: String,
    pub name: String,
    pub address: String,
    pub price_per_hour: i64,
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amenities: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewField {
    pub name: String,
    pub address: String,
    pub price_per_hour: i64,
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amenities: BTreeSet<String>,
}

impl NewField {
    pub fn into_field(self, id: String) -> Field {
        Field {
            id,
            name: self.name,
            address: self.address,
            price_per_hour: self.price_per_hour,
            description: self.description,
            image_url: self.image_url,
            latitude: self.latitude,
            longitude: self.longitude,
            rating: self.rating,
            amenities: self.amenities,
        }
    }
}

/// Partial admin edit. Absent attributes are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_hour: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amenities: Option<BTreeSet<String>>,
}

impl FieldPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.address.is_none()
            && self.price_per_hour.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.rating.is_none()
            && self.amenities.is_none()
    }
}

impl Field {
    pub fn apply(&mut self, patch: FieldPatch) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.address {
            self.address = v;
        }
        if let Some(v) = patch.price_per_hour {
            self.price_per_hour = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.image_url {
            self.image_url = v;
        }
        if let Some(v) = patch.latitude {
            self.latitude = v;
        }
        if let Some(v) = patch.longitude {
            self.longitude = v;
        }
        if let Some(v) = patch.rating {
            self.rating = v;
        }
        if let Some(v) = patch.amenities {
            self.amenities = v;
        }
    }

    /// Case-insensitive substring match on name, address or description.
    pub fn matches_search(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self.address.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

pub fn search_fields(fields: &[Field], query: &str) -> Vec<Field> {
    fields
        .iter()
        .filter(|f| f.matches_search(query))
        .cloned()
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn field(id: &str, name: &str, price: i64) -> Field {
        Field {
            id: id.to_string(),
            name: name.to_string(),
            address: "Boulevard Mohammed V, Khouribga".to_string(),
            price_per_hour: price,
            description: "Modern football field".to_string(),
            image_url: String::new(),
            latitude: 32.8959,
            longitude: -6.9190,
            rating: 4.5,
            amenities: ["Parking", "Lighting"].iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let f = field("1", "Stadium Khouribga", 150);
        assert!(f.matches_search("stadium"));
        assert!(f.matches_search("STADIUM"));
    }

    #[test]
    fn test_search_covers_address_and_description() {
        let f = field("1", "Stadium Khouribga", 150);
        assert!(f.matches_search("mohammed"));
        assert!(f.matches_search("football"));
        assert!(!f.matches_search("benguerir"));
    }

    #[test]
    fn test_empty_search_matches_all() {
        let fields = vec![field("1", "A", 100), field("2", "B", 120)];
        assert_eq!(search_fields(&fields, "  ").len(), 2);
    }

    #[test]
    fn test_patch_only_touches_present_attributes() {
        let mut f = field("1", "Stadium Khouribga", 150);
        f.apply(FieldPatch {
            price_per_hour: Some(175),
            rating: Some(0.0),
            ..Default::default()
        });
        assert_eq!(f.price_per_hour, 175);
        assert_eq!(f.rating, 0.0);
        assert_eq!(f.name, "Stadium Khouribga");
    }

    #[test]
    fn test_amenities_are_a_set() {
        let json = r#"{"id":"1","name":"X","address":"Y","price_per_hour":100,"description":"Z",
            "latitude":1.0,"longitude":2.0,"amenities":["Parking","Parking","Cafeteria"]}"#;
        let f: Field = serde_json::from_str(json).unwrap();
        assert_eq!(f.amenities.len(), 2);
        assert_eq!(f.rating, 0.0);
    }

    #[test]
    fn test_null_rating_and_amenities_read_as_defaults() {
        let json = r#"{"id":"1","name":"X","address":"Y","price_per_hour":100,"description":"Z",
            "image_url":"","latitude":1.0,"longitude":2.0,"rating":null,"amenities":null}"#;
        let f: Field = serde_json::from_str(json).unwrap();
        assert_eq!(f.rating, 0.0);
        assert!(f.amenities.is_empty());
    }

    #[test]
    fn test_empty_patch_serializes_to_empty_object() {
        let patch = FieldPatch::default();
        assert!(patch.is_empty());
        assert_eq!(serde_json::to_string(&patch).unwrap(), "{}");
    }
}
