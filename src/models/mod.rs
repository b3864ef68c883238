pub mod auth;
pub mod feedback;
pub mod meal;
pub mod selection;
pub mod stats;
pub mod user;
