//! Test helpers para quotegate-server.

#![allow(dead_code, unused_imports)]

pub mod client;
pub mod upstream;

pub use client::{TestClient, TestResponse, client_for};
pub use upstream::*;
