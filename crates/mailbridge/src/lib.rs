//! # mailbridge
//!
//! A minimal helper library for sending email over SMTP, with two
//! interchangeable delivery paths behind one backend interface.
//!
//! ## Features
//!
//! ### Message Model
//! - **EmailModel**: plain value record (sender, recipients, subject, body,
//!   attachments) with a fluent builder
//! - **Attachment**: in-memory attachment with automatic MIME type detection
//! - **StreamAttachment**: attachment read from an async byte stream, with
//!   optional filename
//!
//! ### Two Delivery Paths
//! - **BasicBackend**: builds the outgoing message with `mail-builder` and
//!   delivers it through a `mail-send` SMTP client
//! - **MimeBackend**: builds an explicit MIME message (multipart/mixed when
//!   attachments are present) with `lettre` and returns the server's reply
//!   text
//!
//! Both paths are stateless: each send opens a session, authenticates with
//! the sender address and the configured credential, transmits the message,
//! and releases the connection. There is no pooling, retry, or queueing;
//! failures from the underlying transports propagate unchanged.
//!
//! ## Examples
//!
//! ### Basic path
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use mailbridge::{Attachment, EmailConfigurations, EmailModel, send_email};
//!
//! let config = EmailConfigurations::new("smtp.example.com", 465)
//!     .with_password("app-password");
//!
//! let model = EmailModel::builder(config)
//!     .from("reports@example.com")
//!     .to(vec!["user@example.com".to_string()])
//!     .subject("Monthly Report")
//!     .body("<h1>Report attached</h1>")
//!     .attachment(Attachment::new("report.pdf", b"%PDF-1.4".to_vec()))
//!     .build();
//!
//! send_email(model).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ### MIME path
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use mailbridge::{EmailConfigurations, EmailModel, StreamAttachment, send_mime_email};
//!
//! let config = EmailConfigurations::new("smtp.example.com", 465)
//!     .with_password("app-password");
//!
//! let model = EmailModel::builder(config)
//!     .from("reports@example.com")
//!     .to(vec!["user@example.com".to_string()])
//!     .subject("Monthly Report")
//!     .body("<h1>Report attached</h1>")
//!     .attachment(StreamAttachment::from_bytes(b"%PDF-1.4".to_vec()).with_filename("report.pdf"))
//!     .build();
//!
//! let reply = send_mime_email(model).await?;
//! println!("server replied: {reply}");
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod config;
pub mod message;
pub mod utils;

use thiserror::Error;

pub use backends::{BasicBackend, EmailBackend, MimeBackend};
pub use config::{CredentialProvider, EmailConfigurations, Secret};
pub use message::{Attachment, EmailModel, EmailModelBuilder, StreamAttachment};
pub use utils::{send_email, send_mime_email};

/// Errors surfaced by either delivery path.
///
/// Every failure mode is a pass-through from one of the underlying
/// transport/MIME libraries; nothing is translated or retried here, and no
/// transient/permanent distinction is made. Callers inspect the wrapped
/// error when they need more than "the send failed".
#[derive(Debug, Error)]
pub enum EmailError {
	/// Mailbox syntax rejected by the MIME library's address parser.
	#[error(transparent)]
	Address(#[from] lettre::address::AddressError),

	/// MIME message could not be assembled.
	#[error(transparent)]
	Message(#[from] lettre::error::Error),

	/// Content type string rejected by the MIME library.
	#[error(transparent)]
	ContentType(#[from] lettre::message::header::ContentTypeErr),

	/// SMTP failure on the MIME path (connection, authentication, or
	/// transmission).
	#[error(transparent)]
	Mime(#[from] lettre::transport::smtp::Error),

	/// SMTP or message failure on the basic path.
	#[error(transparent)]
	Transport(#[from] mail_send::Error),

	/// An attachment stream could not be read.
	#[error(transparent)]
	Io(#[from] std::io::Error),

	/// The credential provider could not produce a password.
	#[error("credential resolution failed: {0}")]
	Credentials(String),
}

pub type EmailResult<T> = std::result::Result<T, EmailError>;
