pub mod auth;
pub mod http;
pub mod query;
pub mod store;
