pub mod option_fields;
pub mod project;
pub mod session;
pub mod user;
pub mod view;
