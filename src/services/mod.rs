pub mod config;
pub mod content_filter;
pub mod email;
pub mod maintenance;
pub mod notifier;
