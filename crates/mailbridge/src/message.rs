use std::fmt;
use std::path::PathBuf;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::config::EmailConfigurations;

/// An in-memory file attachment for the basic delivery path.
///
/// The MIME type is detected from the filename extension and can be
/// overridden.
///
/// # Examples
///
/// ```
/// use mailbridge::Attachment;
///
/// let attachment = Attachment::new("report.pdf", b"%PDF-1.4".to_vec());
/// assert_eq!(attachment.filename(), "report.pdf");
/// assert_eq!(attachment.mime_type(), "application/pdf");
/// ```
#[derive(Debug, Clone)]
pub struct Attachment {
	filename: String,
	content: Vec<u8>,
	mime_type: String,
}

impl Attachment {
	/// Create an attachment from raw bytes.
	///
	/// The MIME type is detected from the filename extension, falling back
	/// to `application/octet-stream`.
	pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
		let filename = filename.into();
		let mime_type = Self::detect_mime_type(&filename);

		Self {
			filename,
			content,
			mime_type,
		}
	}

	/// Create an attachment by reading a file from disk.
	pub fn from_path(path: PathBuf, filename: impl Into<String>) -> std::io::Result<Self> {
		let content = std::fs::read(&path)?;
		Ok(Self::new(filename, content))
	}

	/// Override the detected MIME type.
	pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
		self.mime_type = mime_type.into();
		self
	}

	/// The attachment filename.
	pub fn filename(&self) -> &str {
		&self.filename
	}

	/// The attachment content.
	pub fn content(&self) -> &[u8] {
		&self.content
	}

	/// The attachment MIME type.
	pub fn mime_type(&self) -> &str {
		&self.mime_type
	}

	fn detect_mime_type(filename: &str) -> String {
		mime_guess::from_path(filename)
			.first()
			.map(|mime| mime.to_string())
			.unwrap_or_else(|| "application/octet-stream".to_string())
	}
}

/// A streamed attachment for the MIME delivery path.
///
/// Wraps an async byte source that is read to its end while the message is
/// being assembled. The filename is optional; an unnamed attachment is
/// labelled `attachment-N` (1-based position in the message) when sent.
///
/// # Examples
///
/// ```
/// use mailbridge::StreamAttachment;
///
/// let named = StreamAttachment::from_bytes(b"data".to_vec()).with_filename("data.bin");
/// assert_eq!(named.filename(), Some("data.bin"));
///
/// let unnamed = StreamAttachment::from_bytes(b"data".to_vec());
/// assert_eq!(unnamed.filename(), None);
/// ```
pub struct StreamAttachment {
	content: Box<dyn AsyncRead + Send + Unpin>,
	filename: Option<String>,
}

impl StreamAttachment {
	/// Wrap an async byte source.
	pub fn new(content: impl AsyncRead + Send + Unpin + 'static) -> Self {
		Self {
			content: Box::new(content),
			filename: None,
		}
	}

	/// Wrap an in-memory buffer.
	pub fn from_bytes(content: Vec<u8>) -> Self {
		Self::new(std::io::Cursor::new(content))
	}

	/// Name the attachment.
	pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
		self.filename = Some(filename.into());
		self
	}

	/// The attachment filename, if one was provided.
	pub fn filename(&self) -> Option<&str> {
		self.filename.as_deref()
	}

	/// Consume the attachment, reading the stream to its end.
	///
	/// Returns the optional filename together with the collected bytes.
	pub async fn into_parts(mut self) -> std::io::Result<(Option<String>, Vec<u8>)> {
		let mut content = Vec::new();
		self.content.read_to_end(&mut content).await?;
		Ok((self.filename, content))
	}
}

impl fmt::Debug for StreamAttachment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StreamAttachment")
			.field("filename", &self.filename)
			.field("content", &"<stream>")
			.finish()
	}
}

/// An outgoing email, generic over the attachment representation.
///
/// A plain value record: connection configuration, sender address, ordered
/// recipient list (uniqueness is not enforced), subject, body, and an
/// optional attachment list. No invariants beyond type shape are enforced
/// here — address syntax and recipient handling are the transport
/// libraries' concern.
///
/// The two attachment representations select the delivery path:
/// [`Attachment`](crate::Attachment) for [`BasicBackend`](crate::BasicBackend)
/// and [`StreamAttachment`](crate::StreamAttachment) for
/// [`MimeBackend`](crate::MimeBackend); they are not interchangeable.
///
/// # Examples
///
/// ```
/// use mailbridge::{Attachment, EmailConfigurations, EmailModel};
///
/// let config = EmailConfigurations::new("smtp.example.com", 465).with_password("secret");
///
/// let model: EmailModel<Attachment> = EmailModel::builder(config)
/// 	.from("sender@example.com")
/// 	.to(vec!["recipient@example.com".to_string()])
/// 	.subject("Hello")
/// 	.body("Hello, world!")
/// 	.build();
///
/// assert_eq!(model.from_email(), "sender@example.com");
/// assert!(model.attachments().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct EmailModel<A> {
	pub(crate) configurations: EmailConfigurations,
	pub(crate) from_email: String,
	pub(crate) to_emails: Vec<String>,
	pub(crate) subject: String,
	pub(crate) body: String,
	pub(crate) attachments: Option<Vec<A>>,
}

impl<A> EmailModel<A> {
	/// Start building a model for the given configuration.
	pub fn builder(configurations: EmailConfigurations) -> EmailModelBuilder<A> {
		EmailModelBuilder {
			configurations,
			from_email: String::new(),
			to_emails: Vec::new(),
			subject: String::new(),
			body: String::new(),
			attachments: None,
		}
	}

	/// The connection configuration.
	pub fn configurations(&self) -> &EmailConfigurations {
		&self.configurations
	}

	/// The sender address (also the authentication username).
	pub fn from_email(&self) -> &str {
		&self.from_email
	}

	/// The recipient addresses, in order.
	pub fn to_emails(&self) -> &[String] {
		&self.to_emails
	}

	/// The subject line.
	pub fn subject(&self) -> &str {
		&self.subject
	}

	/// The message body.
	pub fn body(&self) -> &str {
		&self.body
	}

	/// The attachments, if any were provided.
	pub fn attachments(&self) -> Option<&[A]> {
		self.attachments.as_deref()
	}
}

/// Fluent builder for [`EmailModel`].
pub struct EmailModelBuilder<A> {
	configurations: EmailConfigurations,
	from_email: String,
	to_emails: Vec<String>,
	subject: String,
	body: String,
	attachments: Option<Vec<A>>,
}

impl<A> EmailModelBuilder<A> {
	/// Set the sender address.
	pub fn from(mut self, from: impl Into<String>) -> Self {
		self.from_email = from.into();
		self
	}

	/// Replace the recipient list.
	pub fn to(mut self, to: Vec<String>) -> Self {
		self.to_emails = to;
		self
	}

	/// Append a recipient.
	pub fn add_to(mut self, to: impl Into<String>) -> Self {
		self.to_emails.push(to.into());
		self
	}

	/// Set the subject line.
	pub fn subject(mut self, subject: impl Into<String>) -> Self {
		self.subject = subject.into();
		self
	}

	/// Set the message body.
	pub fn body(mut self, body: impl Into<String>) -> Self {
		self.body = body.into();
		self
	}

	/// Append an attachment.
	pub fn attachment(mut self, attachment: A) -> Self {
		self.attachments.get_or_insert_with(Vec::new).push(attachment);
		self
	}

	/// Replace the attachment list.
	pub fn attachments(mut self, attachments: Vec<A>) -> Self {
		self.attachments = Some(attachments);
		self
	}

	/// Finish the model. No validation is performed.
	pub fn build(self) -> EmailModel<A> {
		EmailModel {
			configurations: self.configurations,
			from_email: self.from_email,
			to_emails: self.to_emails,
			subject: self.subject,
			body: self.body,
			attachments: self.attachments,
		}
	}
}
