//! Nearby dining lookup for Chinook resort pages
//!
//! Queries the Google Places web service across all dining types in
//! parallel, merges the results into one ranking, and enriches the
//! winners with contact details.

pub mod client;
pub mod types;

pub use client::PlacesClient;
pub use types::DiningPlace;
