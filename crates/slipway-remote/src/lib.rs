//! REST clients for the services slipway drives: Jenkins for pipeline jobs
//! and builds, Harbor for registry projects.
//!
//! Both clients are generic over [`HttpTransport`], so tests swap the
//! network for a mock while production uses [`ReqwestTransport`]. Failures
//! from either service surface as [`ApiError`], one taxonomy across both.

pub mod error;
pub mod harbor;
pub mod jenkins;
pub mod transport;

pub use error::ApiError;
pub use harbor::HarborClient;
pub use jenkins::JenkinsClient;
pub use transport::{
    ApiRequest, ApiResponse, HttpTransport, Method, RequestBody, ReqwestTransport, TransportError,
};
