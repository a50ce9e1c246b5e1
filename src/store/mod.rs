//! Plain create, get and filter operations per entity. No business rules live here.

pub mod cities;
pub mod picnics;
pub mod registrations;
pub mod users;
