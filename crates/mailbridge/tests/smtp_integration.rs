//! End-to-end delivery tests against an in-process SMTP server
//!
//! A scripted server accepts one session per connection, records every DATA
//! payload it receives, and answers the end-of-data mark with a configurable
//! reply line. Both delivery paths are driven over plain TCP (ssl disabled)
//! so the wire messages can be inspected directly.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use mailbridge::{
	Attachment, CredentialProvider, EmailConfigurations, EmailError, EmailModel, EmailResult,
	Secret, StreamAttachment, send_email, send_mime_email,
};
use rstest::rstest;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

const ACCEPT_REPLY: &str = "250 2.0.0 Ok: queued as 4FC31A0E57";

/// Scripted SMTP endpoint capturing DATA payloads.
struct MockSmtp {
	addr: SocketAddr,
	messages: Arc<Mutex<Vec<String>>>,
}

impl MockSmtp {
	async fn start() -> Self {
		Self::start_with_reply(ACCEPT_REPLY).await
	}

	async fn start_with_reply(reply: &'static str) -> Self {
		let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock server");
		let addr = listener.local_addr().expect("local addr");
		let messages = Arc::new(Mutex::new(Vec::new()));
		let sink = messages.clone();
		tokio::spawn(async move {
			while let Ok((stream, _)) = listener.accept().await {
				tokio::spawn(session(stream, sink.clone(), reply));
			}
		});
		Self { addr, messages }
	}

	fn host(&self) -> String {
		self.addr.ip().to_string()
	}

	fn port(&self) -> u16 {
		self.addr.port()
	}

	fn messages(&self) -> Vec<String> {
		self.messages.lock().expect("messages lock").clone()
	}
}

/// One SMTP session: greeting, EHLO capabilities, AUTH PLAIN (inline or
/// challenge form), envelope commands, DATA capture, QUIT.
async fn session(stream: TcpStream, sink: Arc<Mutex<Vec<String>>>, reply: &'static str) {
	let (reader, mut writer) = stream.into_split();
	let mut reader = BufReader::new(reader);
	if writer.write_all(b"220 mock.test ESMTP ready\r\n").await.is_err() {
		return;
	}

	let mut line = String::new();
	let mut payload = String::new();
	let mut in_data = false;
	let mut awaiting_auth = false;
	let mut rcpt_count = 0usize;

	loop {
		line.clear();
		match reader.read_line(&mut line).await {
			Ok(0) | Err(_) => return,
			Ok(_) => {}
		}

		if in_data {
			if line == ".\r\n" {
				sink.lock().expect("messages lock").push(std::mem::take(&mut payload));
				in_data = false;
				if writer.write_all(format!("{reply}\r\n").as_bytes()).await.is_err() {
					return;
				}
			} else {
				payload.push_str(&line);
			}
			continue;
		}

		if awaiting_auth {
			// The line is the base64 credential blob of a challenge-style
			// AUTH exchange; accept it unconditionally.
			awaiting_auth = false;
			if writer
				.write_all(b"235 2.7.0 Authentication succeeded\r\n")
				.await
				.is_err()
			{
				return;
			}
			continue;
		}

		let verb = line.trim_end().to_ascii_uppercase();
		let response: &[u8] = if verb.starts_with("EHLO") || verb.starts_with("HELO") {
			b"250-mock.test\r\n250-AUTH PLAIN\r\n250 8BITMIME\r\n"
		} else if verb.starts_with("AUTH") {
			if verb == "AUTH PLAIN" {
				awaiting_auth = true;
				b"334 \r\n"
			} else {
				b"235 2.7.0 Authentication succeeded\r\n"
			}
		} else if verb.starts_with("MAIL") {
			b"250 2.1.0 Ok\r\n"
		} else if verb.starts_with("RCPT") {
			rcpt_count += 1;
			b"250 2.1.5 Ok\r\n"
		} else if verb.starts_with("DATA") {
			if rcpt_count == 0 {
				b"554 5.5.1 Error: no valid recipients\r\n"
			} else {
				in_data = true;
				b"354 End data with <CR><LF>.<CR><LF>\r\n"
			}
		} else if verb.starts_with("QUIT") {
			let _ = writer.write_all(b"221 2.0.0 Bye\r\n").await;
			return;
		} else {
			b"250 2.0.0 Ok\r\n"
		};

		if writer.write_all(response).await.is_err() {
			return;
		}
	}
}

fn config_for(server: &MockSmtp) -> EmailConfigurations {
	EmailConfigurations::new(server.host(), server.port())
		.with_ssl(false)
		.with_password("secret")
}

/// Test: basic send with html disabled produces a plain-text body
#[rstest]
#[tokio::test]
async fn test_basic_send_plain_text_body() {
	// Arrange
	let server = MockSmtp::start().await;
	let model = EmailModel::builder(config_for(&server).with_html(false))
		.from("sender@example.com")
		.to(vec!["recipient@example.com".to_string()])
		.subject("Plain")
		.body("just text")
		.build();

	// Act
	send_email(model).await.expect("send");

	// Assert
	let messages = server.messages();
	assert_eq!(messages.len(), 1);
	assert!(messages[0].contains("text/plain"));
	assert!(!messages[0].contains("text/html"));
	assert!(messages[0].contains("just text"));
}

/// Test: basic send with html enabled produces an HTML body
#[rstest]
#[tokio::test]
async fn test_basic_send_html_body() {
	let server = MockSmtp::start().await;
	let model = EmailModel::builder(config_for(&server))
		.from("sender@example.com")
		.to(vec!["recipient@example.com".to_string()])
		.subject("Html")
		.body("<h1>hello</h1>")
		.build();

	send_email(model).await.expect("send");

	let messages = server.messages();
	assert_eq!(messages.len(), 1);
	assert!(messages[0].contains("text/html"));
}

/// Test: basic send carries each attachment with its filename and type
#[rstest]
#[tokio::test]
async fn test_basic_send_with_attachments() {
	let server = MockSmtp::start().await;
	// Non-text bytes so the transport has to fall back to base64.
	let content = vec![0x00, 0x9f, 0x92, 0x96, 0x01, 0x02, 0x03];
	let model = EmailModel::builder(config_for(&server))
		.from("sender@example.com")
		.to(vec!["recipient@example.com".to_string()])
		.subject("Attached")
		.body("<p>see attachment</p>")
		.attachment(Attachment::new("data.bin", content.clone()))
		.build();

	send_email(model).await.expect("send");

	let messages = server.messages();
	assert_eq!(messages.len(), 1);
	assert!(messages[0].contains("data.bin"));
	assert!(messages[0].contains("base64"));
	assert!(messages[0].contains(&BASE64.encode(&content)));
}

/// Test: MIME send with two attachment streams builds one text part plus
/// one base64 binary part per attachment
#[rstest]
#[tokio::test]
async fn test_mime_send_two_attachments_multipart() {
	// Arrange
	let server = MockSmtp::start().await;
	let first = b"first attachment payload".to_vec();
	let second = b"second attachment payload".to_vec();
	let model = EmailModel::builder(config_for(&server))
		.from("sender@example.com")
		.to(vec!["recipient@example.com".to_string()])
		.subject("Attachments")
		.body("<h1>report</h1>")
		.attachment(StreamAttachment::from_bytes(first.clone()).with_filename("report.pdf"))
		.attachment(StreamAttachment::from_bytes(second.clone()))
		.build();

	// Act
	send_mime_email(model).await.expect("send");

	// Assert
	let messages = server.messages();
	assert_eq!(messages.len(), 1);
	let payload = &messages[0];
	assert!(payload.contains("multipart/mixed"));
	assert_eq!(payload.matches("text/html").count(), 1);
	assert_eq!(payload.matches("application/octet-stream").count(), 2);
	assert_eq!(payload.matches("Content-Transfer-Encoding: base64").count(), 2);
	assert!(payload.contains(&BASE64.encode(&first)));
	assert!(payload.contains(&BASE64.encode(&second)));
	assert!(payload.contains("filename=\"report.pdf\""));
	// The unnamed stream gets a positional default.
	assert!(payload.contains("filename=\"attachment-2\""));
}

/// Test: MIME send without attachments stays a single text part
#[rstest]
#[tokio::test]
async fn test_mime_send_no_attachments_single_part() {
	let server = MockSmtp::start().await;
	let model = EmailModel::builder(config_for(&server))
		.from("sender@example.com")
		.to(vec!["recipient@example.com".to_string()])
		.subject("No attachments")
		.body("<p>just the body</p>")
		.build();

	send_mime_email(model).await.expect("send");

	let messages = server.messages();
	assert_eq!(messages.len(), 1);
	assert!(messages[0].contains("text/html"));
	assert!(!messages[0].contains("multipart/mixed"));
}

/// Test: the MIME sender returns the server's literal reply text
#[rstest]
#[tokio::test]
async fn test_mime_send_returns_server_reply() {
	let server = MockSmtp::start_with_reply("250 2.0.0 Ok: queued as AB12CD34").await;
	let model = EmailModel::builder(config_for(&server))
		.from("sender@example.com")
		.to(vec!["recipient@example.com".to_string()])
		.subject("Reply")
		.body("<p>body</p>")
		.build();

	let reply = send_mime_email(model).await.expect("send");

	assert_eq!(reply, "250 2.0.0 Ok: queued as AB12CD34");
}

/// Test: an unreachable host surfaces a connection error on both paths
#[rstest]
#[tokio::test]
async fn test_unreachable_host_errors() {
	// Bind then drop to obtain a port nothing listens on.
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
	let addr = listener.local_addr().expect("local addr");
	drop(listener);

	let config = EmailConfigurations::new(addr.ip().to_string(), addr.port())
		.with_ssl(false)
		.with_password("secret");

	let basic = EmailModel::builder(config.clone())
		.from("sender@example.com")
		.to(vec!["recipient@example.com".to_string()])
		.subject("Unreachable")
		.body("body")
		.build();
	assert!(send_email(basic).await.is_err());

	let mime = EmailModel::builder(config)
		.from("sender@example.com")
		.to(vec!["recipient@example.com".to_string()])
		.subject("Unreachable")
		.body("body")
		.build();
	assert!(send_mime_email(mime).await.is_err());
}

/// Test: an empty recipient list is refused, not silently defaulted
#[rstest]
#[tokio::test]
async fn test_empty_recipients_rejected() {
	let server = MockSmtp::start().await;

	let basic: EmailModel<Attachment> = EmailModel::builder(config_for(&server))
		.from("sender@example.com")
		.subject("Nobody")
		.body("body")
		.build();
	assert!(send_email(basic).await.is_err());

	let mime: EmailModel<StreamAttachment> = EmailModel::builder(config_for(&server))
		.from("sender@example.com")
		.subject("Nobody")
		.body("body")
		.build();
	assert!(send_mime_email(mime).await.is_err());

	// Nothing must have reached the wire.
	assert!(server.messages().is_empty());
}

/// Test: a malformed sender address propagates the parser's error
#[rstest]
#[tokio::test]
async fn test_malformed_address_propagates() {
	let config = EmailConfigurations::new("localhost", 2525)
		.with_ssl(false)
		.with_password("secret");
	let model: EmailModel<StreamAttachment> = EmailModel::builder(config)
		.from("not an address")
		.to(vec!["recipient@example.com".to_string()])
		.subject("Bad address")
		.body("body")
		.build();

	assert!(matches!(
		send_mime_email(model).await,
		Err(EmailError::Address(_))
	));
}

/// Test: credential resolution failure aborts before any connection
#[rstest]
#[tokio::test]
async fn test_credential_failure_aborts_send() {
	struct Unavailable;

	impl CredentialProvider for Unavailable {
		fn resolve(&self) -> EmailResult<Secret> {
			Err(EmailError::Credentials("store unreachable".into()))
		}
	}

	// Port nothing listens on; resolution must fail before it matters.
	let config = EmailConfigurations::new("127.0.0.1", 1)
		.with_ssl(false)
		.with_credentials(Arc::new(Unavailable));
	let model: EmailModel<Attachment> = EmailModel::builder(config)
		.from("sender@example.com")
		.to(vec!["recipient@example.com".to_string()])
		.subject("No credentials")
		.body("body")
		.build();

	assert!(matches!(
		send_email(model).await,
		Err(EmailError::Credentials(_))
	));
}

/// Test: concurrent sends are independent sessions
#[rstest]
#[tokio::test]
async fn test_concurrent_sends() {
	let server = MockSmtp::start().await;

	let mut tasks = vec![];
	for i in 1..=3 {
		let config = config_for(&server);
		tasks.push(tokio::spawn(async move {
			let model = EmailModel::builder(config)
				.from("concurrent@example.com")
				.to(vec![format!("user{i}@example.com")])
				.subject(format!("Concurrent {i}"))
				.body("body")
				.build();
			send_email(model).await
		}));
	}

	let results = futures::future::join_all(tasks).await;
	for result in results {
		result.expect("task completes").expect("send succeeds");
	}

	assert_eq!(server.messages().len(), 3);
}
