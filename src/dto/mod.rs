pub mod comments;
pub mod reports;
