pub mod comments;
pub mod related;
pub mod reports;
pub mod users;
