pub mod categories;
pub mod messages;
pub mod tags;
