mod api;
mod client;
mod server;

pub use client::HttpDispatchClient;
pub use server::search_url;
