pub mod auth;
pub mod feedback;
pub mod meals;
pub mod realtime;
pub mod selections;
pub mod stats;
pub mod users;
