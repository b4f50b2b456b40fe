pub mod approval;
pub mod authors;
pub mod cascade;
pub mod comments;
pub mod content;
pub mod context;
pub mod reports;
pub mod sanitize;
pub mod threads;
