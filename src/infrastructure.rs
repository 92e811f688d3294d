pub mod backend;
pub mod limiter;
pub mod utils;
