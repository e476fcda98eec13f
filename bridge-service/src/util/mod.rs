pub mod http;

pub use http::{build_client, endpoint, USER_AGENT};
