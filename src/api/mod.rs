pub mod client;
pub mod models;
pub mod renewal;
pub mod response;

pub use client::ApiClient;
pub use renewal::{RenewalClient, REFRESH_PATH};
