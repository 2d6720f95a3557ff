// src/lib.rs

//! Fixture Crawler Library

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod trigger;
pub mod utils;
