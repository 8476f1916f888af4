use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Favorite {
    pub user_id: String,
    pub booking_id: String,
}

/// Presence-only favorite markers.
#[derive(Debug, Clone, Default)]
pub struct FavoriteSet {
    marks: HashSet<Favorite>,
}

impl FavoriteSet {
    /// Flips the marker and returns whether it is now present.
    pub fn toggle(&mut self, user_id: &str, booking_id: &str) -> bool {
        let key = Favorite {
            user_id: user_id.to_string(),
            booking_id: booking_id.to_string(),
        };
        if self.marks.remove(&key) {
            false
        } else {
            self.marks.insert(key);
            true
        }
    }

    pub fn contains(&self, user_id: &str, booking_id: &str) -> bool {
        self.marks
            .iter()
            .any(|f| f.user_id == user_id && f.booking_id == booking_id)
    }

    pub fn insert(&mut self, user_id: &str, booking_id: &str) {
        self.marks.insert(Favorite {
            user_id: user_id.to_string(),
            booking_id: booking_id.to_string(),
        });
    }

    pub fn booking_ids_for(&self, user_id: &str) -> HashSet<String> {
        self.marks
            .iter()
            .filter(|f| f.user_id == user_id)
            .map(|f| f.booking_id.clone())
            .collect()
    }
}
