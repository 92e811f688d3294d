pub mod auth_client;
pub mod data_store;
pub mod project;
