#![allow(dead_code)]

pub mod test_user;
pub mod test_utils;
