pub mod access;
pub mod auth;
pub mod event_dates;
pub mod events;
pub mod health;
pub mod lookups;
pub mod organizers;
pub mod spaces;
pub mod team;
pub mod user;
pub mod venues;

pub use health::health_check;
