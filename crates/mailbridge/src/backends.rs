//! The two delivery paths behind one capability interface.
//!
//! Each backend owns the whole "build transport message from model, open
//! client, authenticate, send" flow of its underlying library. Both are
//! stateless unit values: every send is an isolated session, and nothing is
//! shared between concurrent calls.

use async_trait::async_trait;
use lettre::message::header::{ContentDisposition, ContentTransferEncoding, ContentType};
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use mail_builder::MessageBuilder;
use mail_send::SmtpClientBuilder;
use tracing::{debug, info};

use crate::EmailResult;
use crate::message::{Attachment, EmailModel, StreamAttachment};

/// A delivery path: builds the outgoing message from an [`EmailModel`] and
/// transmits it over an authenticated SMTP session.
///
/// The two implementations differ in attachment representation and in the
/// underlying transport library; they are selected at the call site and
/// share no state.
#[async_trait]
pub trait EmailBackend: Send + Sync {
	/// Attachment representation this backend accepts.
	type Attachment: Send;

	/// Value produced by a successful send.
	type Receipt: Send;

	/// Build the transport message and deliver it in one round-trip.
	///
	/// Fails by propagating the underlying library's error unchanged; no
	/// retry is attempted and no partial success is reported.
	async fn send_message(&self, model: EmailModel<Self::Attachment>) -> EmailResult<Self::Receipt>;
}

/// Delivery through a plain transport client.
///
/// The message is assembled with `mail-builder` — subject and body plus one
/// part per [`Attachment`], each attached directly with its own filename
/// and MIME type — and handed to a `mail-send` SMTP client. The body is an
/// HTML or plain-text part according to the configuration's `html` flag.
/// Returns nothing on success.
///
/// # Examples
///
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use mailbridge::{Attachment, BasicBackend, EmailBackend, EmailConfigurations, EmailModel};
///
/// let config = EmailConfigurations::new("smtp.example.com", 465).with_password("secret");
/// let model = EmailModel::builder(config)
///     .from("sender@example.com")
///     .to(vec!["recipient@example.com".to_string()])
///     .subject("Hello")
///     .body("<p>Hello!</p>")
///     .build();
///
/// BasicBackend.send_message(model).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicBackend;

#[async_trait]
impl EmailBackend for BasicBackend {
	type Attachment = Attachment;
	type Receipt = ();

	async fn send_message(&self, model: EmailModel<Attachment>) -> EmailResult<()> {
		let EmailModel {
			configurations,
			from_email,
			to_emails,
			subject,
			body,
			attachments,
		} = model;

		let password = configurations.password()?;

		let mut message = MessageBuilder::new()
			.from(from_email.clone())
			.to(to_emails)
			.subject(subject);
		message = if configurations.html() {
			message.html_body(body)
		} else {
			message.text_body(body)
		};
		if let Some(attachments) = attachments {
			for attachment in attachments {
				message = message.attachment(
					attachment.mime_type().to_owned(),
					attachment.filename().to_owned(),
					attachment.content().to_vec(),
				);
			}
		}

		debug!(
			host = configurations.host(),
			port = %configurations.port(),
			ssl = configurations.ssl(),
			"sending via basic transport"
		);

		let client = SmtpClientBuilder::new(configurations.host().to_owned(), configurations.port())
			.credentials((from_email, password.expose().to_owned()));
		if configurations.ssl() {
			client.connect().await?.send(message).await?;
		} else {
			client.connect_plain().await?.send(message).await?;
		}

		info!(host = configurations.host(), "message sent");
		Ok(())
	}
}

/// Delivery through an explicit MIME message.
///
/// The message is assembled with `lettre`: with one or more
/// [`StreamAttachment`]s the body is a `multipart/mixed` container holding
/// an HTML text part plus one base64-encoded `application/octet-stream`
/// part per attachment; with none, the body is a single HTML text part.
/// Unnamed attachments are labelled `attachment-N` by position. Returns the
/// server's reply text after the message is accepted.
///
/// # Examples
///
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use mailbridge::{EmailBackend, EmailConfigurations, EmailModel, MimeBackend, StreamAttachment};
///
/// let config = EmailConfigurations::new("smtp.example.com", 465).with_password("secret");
/// let model = EmailModel::builder(config)
///     .from("sender@example.com")
///     .to(vec!["recipient@example.com".to_string()])
///     .subject("Hello")
///     .body("<p>Hello!</p>")
///     .attachment(StreamAttachment::from_bytes(vec![1, 2, 3]).with_filename("data.bin"))
///     .build();
///
/// let reply = MimeBackend.send_message(model).await?;
/// println!("{reply}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MimeBackend;

#[async_trait]
impl EmailBackend for MimeBackend {
	type Attachment = StreamAttachment;
	type Receipt = String;

	async fn send_message(&self, model: EmailModel<StreamAttachment>) -> EmailResult<String> {
		let EmailModel {
			configurations,
			from_email,
			to_emails,
			subject,
			body,
			attachments,
		} = model;

		let password = configurations.password()?;

		let mut builder = Message::builder()
			.from(from_email.parse::<Mailbox>()?)
			.subject(subject);
		for to in &to_emails {
			builder = builder.to(to.parse::<Mailbox>()?);
		}

		let html_part = SinglePart::builder()
			.header(ContentType::TEXT_HTML)
			.body(body);

		let message = match attachments {
			Some(attachments) if !attachments.is_empty() => {
				let mut multipart = MultiPart::mixed().singlepart(html_part);
				for (index, attachment) in attachments.into_iter().enumerate() {
					let (filename, content) = attachment.into_parts().await?;
					let filename =
						filename.unwrap_or_else(|| format!("attachment-{}", index + 1));
					// Generic binary part, base64 regardless of content.
					let part = SinglePart::builder()
						.header(ContentType::parse("application/octet-stream")?)
						.header(ContentDisposition::attachment(&filename))
						.header(ContentTransferEncoding::Base64)
						.body(content);
					multipart = multipart.singlepart(part);
				}
				builder.multipart(multipart)?
			}
			_ => builder.singlepart(html_part)?,
		};

		debug!(
			host = configurations.host(),
			port = %configurations.port(),
			ssl = configurations.ssl(),
			"sending via MIME transport"
		);

		let transport = if configurations.ssl() {
			AsyncSmtpTransport::<Tokio1Executor>::relay(configurations.host())?
		} else {
			AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(configurations.host())
		}
		.port(configurations.port())
		.credentials(Credentials::new(from_email, password.expose().to_owned()))
		.build();

		let response = transport.send(message).await?;
		let reply = format!(
			"{} {}",
			response.code(),
			response.message().collect::<Vec<_>>().join(" ")
		);

		info!(host = configurations.host(), reply = %reply, "message accepted");
		Ok(reply)
	}
}
