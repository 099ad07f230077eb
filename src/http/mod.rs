//! Request execution: building, sending, classifying and retrying.

pub mod classify;
pub mod executor;
pub mod request;
pub mod retry;
pub mod transport;

pub use classify::{DEFAULT_RETRY_AFTER_SECS, classify, decode_json, retry_after_secs};
pub use executor::{CallOptions, CancelHandle, CancelSignal, Executor, cancel_pair};
pub use request::{
    PreparedRequest, QueryParams, RequestSpec, USER_AGENT, build_request, path_segment,
};
pub use retry::{backoff_delay, with_retry};
pub use transport::{RawResponse, ReqwestTransport, Transport, TransportError};
