pub mod client;
pub mod parser;

pub use client::fetch_feed;
pub use parser::FeedEntry;
