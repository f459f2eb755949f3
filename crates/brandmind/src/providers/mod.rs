pub mod api_client;
pub mod base;
pub mod errors;
pub mod factory;
pub mod formats;
pub mod google;
pub mod openai;
pub mod proxy;
pub mod retry;
