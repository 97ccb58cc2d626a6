//! Apple push provider, speaking the binary gateway interface.

mod dispatcher;
mod payload;
mod response;
mod status;
mod transport;

pub use dispatcher::ApnsDispatcher;
pub use payload::ApnsPayload;
pub use response::ApnsResponse;
pub use status::{ApnsErrorCode, ApnsOutcome};
pub use transport::{ApnsCredentials, ApnsTransport, TlsApnsTransport};
