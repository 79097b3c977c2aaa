pub mod exchangerate;
pub mod feeds;
pub mod http;
pub mod snapshot;
