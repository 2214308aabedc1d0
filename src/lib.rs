pub mod errors;
pub mod fetch;
pub mod options;
pub mod profile;
pub mod request;
pub mod response;

pub use errors::FetchError;
pub use fetch::{PendingRequest, Reply, RequestId};
pub use http::Method;
pub use options::Opts;
pub use profile::{close, DEFAULT_PROFILE};
pub use response::{Body, Headers, Response};
