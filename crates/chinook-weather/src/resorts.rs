//! Built-in Canadian ski resort directory.

use crate::types::Location;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkiResort {
    pub id: &'static str,
    pub name: &'static str,
    /// Two-letter province code.
    pub province: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub total_runs: u32,
}

impl From<&SkiResort> for Location {
    fn from(resort: &SkiResort) -> Self {
        Location {
            name: resort.name.to_string(),
            admin1: Some(resort.province.to_string()),
            latitude: resort.latitude,
            longitude: resort.longitude,
            timezone: None,
        }
    }
}

/// Display order for the grouped resort picker, west to east.
pub const PROVINCE_ORDER: [&str; 5] = ["BC", "AB", "ON", "QC", "NL"];

const fn resort(
    id: &'static str,
    name: &'static str,
    province: &'static str,
    latitude: f64,
    longitude: f64,
    total_runs: u32,
) -> SkiResort {
    SkiResort {
        id,
        name,
        province,
        latitude,
        longitude,
        total_runs,
    }
}

#[rustfmt::skip]
pub const SKI_RESORTS: [SkiResort; 22] = [
    resort("whistler-blackcomb", "Whistler Blackcomb",          "BC", 50.1163, -122.9574, 200),
    resort("big-white",          "Big White",                   "BC", 49.7306, -118.9436, 119),
    resort("sun-peaks",          "Sun Peaks",                   "BC", 50.8837, -119.8891, 138),
    resort("revelstoke",         "Revelstoke Mountain Resort",  "BC", 50.9583, -118.1636,  75),
    resort("kicking-horse",      "Kicking Horse",               "BC", 51.2976, -117.0483, 129),
    resort("fernie",             "Fernie Alpine Resort",        "BC", 49.4627, -115.0871, 145),
    resort("silver-star",        "SilverStar Mountain Resort",  "BC", 50.3601, -119.0611, 132),
    resort("whitewater",         "Whitewater Ski Resort",       "BC", 49.2447, -117.1436,  82),
    resort("lake-louise",        "Lake Louise",                 "AB", 51.4419, -116.1625, 164),
    resort("sunshine-village",   "Sunshine Village",            "AB", 51.1152, -115.7593, 137),
    resort("norquay",            "Mt. Norquay",                 "AB", 51.2021, -115.5936,  60),
    resort("marmot-basin",       "Marmot Basin",                "AB", 52.8003, -118.0866,  91),
    resort("nakiska",            "Nakiska",                     "AB", 50.9425, -115.1514,  79),
    resort("blue-mountain",      "Blue Mountain",               "ON", 44.5015,  -80.3097,  43),
    resort("mount-st-louis",     "Mount St. Louis Moonstone",   "ON", 44.6333,  -79.6833,  36),
    resort("calabogie-peaks",    "Calabogie Peaks",             "ON", 45.2623,  -76.7624,  24),
    resort("searchmont",         "Searchmont Resort",           "ON", 46.7852,  -84.0534,  21),
    resort("mont-tremblant",     "Mont-Tremblant",              "QC", 46.2094,  -74.5858, 102),
    resort("mont-sainte-anne",   "Mont-Sainte-Anne",            "QC", 47.0754,  -70.9049,  71),
    resort("le-massif",          "Le Massif de Charlevoix",     "QC", 47.2824,  -70.5899,  53),
    resort("bromont",            "Bromont, montagne d'expériences", "QC", 45.2990, -72.6508, 141),
    resort("marble-mountain",    "Marble Mountain",             "NL", 48.9367,  -57.8167,  39),
];

/// Look up a resort by its stable id.
pub fn resort_by_id(id: &str) -> Option<&'static SkiResort> {
    SKI_RESORTS.iter().find(|r| r.id == id)
}

/// Resorts for one province, in table order.
pub fn resorts_by_province(province: &str) -> Vec<&'static SkiResort> {
    SKI_RESORTS.iter().filter(|r| r.province == province).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        for (i, a) in SKI_RESORTS.iter().enumerate() {
            for b in &SKI_RESORTS[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn test_lookup_by_id() {
        let resort = resort_by_id("lake-louise").unwrap();
        assert_eq!(resort.name, "Lake Louise");
        assert_eq!(resort.province, "AB");
        assert!(resort_by_id("mont-blanc").is_none());
    }

    #[test]
    fn test_every_resort_has_a_known_province() {
        for resort in &SKI_RESORTS {
            assert!(
                PROVINCE_ORDER.contains(&resort.province),
                "{} has unknown province {}",
                resort.id,
                resort.province
            );
        }
    }

    #[test]
    fn test_grouping_covers_the_table() {
        let grouped: usize = PROVINCE_ORDER
            .iter()
            .map(|p| resorts_by_province(p).len())
            .sum();
        assert_eq!(grouped, SKI_RESORTS.len());
    }

    #[test]
    fn test_coordinates_are_in_canada() {
        for resort in &SKI_RESORTS {
            assert!(resort.latitude > 41.0 && resort.latitude < 70.0, "{}", resort.id);
            assert!(resort.longitude > -141.0 && resort.longitude < -52.0, "{}", resort.id);
        }
    }

    #[test]
    fn test_resort_converts_to_location() {
        let loc: Location = resort_by_id("mont-tremblant").unwrap().into();
        assert_eq!(loc.name, "Mont-Tremblant");
        assert_eq!(loc.admin1.as_deref(), Some("QC"));
    }
}
