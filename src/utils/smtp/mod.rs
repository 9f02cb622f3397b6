//! Raw-wire SMTP probing.

pub mod reply;
pub mod session;

pub use reply::SmtpReply;
pub use session::probe_host;
