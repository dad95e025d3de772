pub mod event;
pub mod lookup;
pub mod organizer;
pub mod permission;
pub mod space;
pub mod user;
pub mod venue;

pub use permission::{Permission, Role};
