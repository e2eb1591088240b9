use serde::{Deserialize, Serialize};

/// One ranked dining spot near a resort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiningPlace {
    pub place_id: String,
    pub name: String,
    pub rating: f64,
    pub total_ratings: u32,
    /// 0 (free) to 4 (very expensive), when Google reports one.
    pub price_level: Option<u8>,
    /// Short human-readable address.
    pub vicinity: String,
    pub open_now: Option<bool>,
    pub website: Option<String>,
    pub phone: Option<String>,
}
