//! Session orchestration for Chinook
//!
//! Ties the weather, alerts and places clients together behind one
//! [`Session`]: selections cancel whatever they supersede, forecast and
//! alerts load concurrently, and the view-state machine tracks what the
//! presentation layer should show.

pub mod session;

pub use session::{Session, SessionData};
