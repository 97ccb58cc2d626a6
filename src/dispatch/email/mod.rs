//! Email provider, delivering notifications over SMTP.

mod dispatcher;
mod payload;
mod response;
mod transport;

pub use dispatcher::EmailDispatcher;
pub use payload::EmailPayload;
pub use response::EmailResponse;
pub use transport::{MailTransport, SmtpMailTransport};
