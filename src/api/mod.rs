pub mod admin;
pub mod attendance;
pub mod documents;
pub mod roster;
