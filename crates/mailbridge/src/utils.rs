//! Convenience send functions over the two backends.

use crate::EmailResult;
use crate::backends::{BasicBackend, EmailBackend, MimeBackend};
use crate::message::{Attachment, EmailModel, StreamAttachment};

/// Send a message through the basic transport path.
///
/// Equivalent to [`BasicBackend::send_message`](crate::EmailBackend::send_message).
///
/// # Examples
///
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use mailbridge::{EmailConfigurations, EmailModel, send_email};
///
/// let config = EmailConfigurations::new("smtp.example.com", 465).with_password("secret");
/// let model = EmailModel::builder(config)
///     .from("sender@example.com")
///     .to(vec!["recipient@example.com".to_string()])
///     .subject("Hello")
///     .body("<p>Hello!</p>")
///     .build();
///
/// send_email(model).await?;
/// # Ok(())
/// # }
/// ```
pub async fn send_email(model: EmailModel<Attachment>) -> EmailResult<()> {
	BasicBackend.send_message(model).await
}

/// Send a message through the MIME path and return the server's reply text.
///
/// Equivalent to [`MimeBackend::send_message`](crate::EmailBackend::send_message).
///
/// # Examples
///
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use mailbridge::{EmailConfigurations, EmailModel, send_mime_email};
///
/// let config = EmailConfigurations::new("smtp.example.com", 465).with_password("secret");
/// let model = EmailModel::builder(config)
///     .from("sender@example.com")
///     .to(vec!["recipient@example.com".to_string()])
///     .subject("Hello")
///     .body("<p>Hello!</p>")
///     .build();
///
/// let reply = send_mime_email(model).await?;
/// println!("{reply}");
/// # Ok(())
/// # }
/// ```
pub async fn send_mime_email(model: EmailModel<StreamAttachment>) -> EmailResult<String> {
	MimeBackend.send_message(model).await
}
