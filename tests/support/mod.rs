#![allow(dead_code)]

pub mod fivedash_env;
pub mod mock_backend;
