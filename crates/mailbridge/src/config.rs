use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::{EmailError, EmailResult};

/// Supplies the SMTP password at send time.
///
/// The built-in provider is [`Secret`], which holds the password in memory.
/// Implementing this trait on another type allows plugging in a secret
/// store without changing how messages are constructed or sent.
///
/// # Examples
///
/// ```
/// use mailbridge::{CredentialProvider, EmailResult, Secret};
///
/// struct Vault;
///
/// impl CredentialProvider for Vault {
/// 	fn resolve(&self) -> EmailResult<Secret> {
/// 		// fetch from the real secret store here
/// 		Ok(Secret::new("from-the-vault"))
/// 	}
/// }
/// ```
pub trait CredentialProvider: Send + Sync {
	/// Produce the password used for SMTP authentication.
	fn resolve(&self) -> EmailResult<Secret>;
}

/// An in-memory SMTP password.
///
/// The backing string is zeroized when the value is dropped, and the
/// content never appears in `Debug` output.
///
/// # Examples
///
/// ```
/// use mailbridge::Secret;
///
/// let secret = Secret::new("app-password");
/// assert_eq!(secret.expose(), "app-password");
/// assert_eq!(format!("{secret:?}"), "Secret(***)");
/// ```
#[derive(Clone)]
pub struct Secret(Zeroizing<String>);

impl Secret {
	/// Wrap a password.
	pub fn new(password: impl Into<String>) -> Self {
		Self(Zeroizing::new(password.into()))
	}

	/// Borrow the wrapped password.
	pub fn expose(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for Secret {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Secret(***)")
	}
}

impl From<&str> for Secret {
	fn from(password: &str) -> Self {
		Self::new(password)
	}
}

impl From<String> for Secret {
	fn from(password: String) -> Self {
		Self::new(password)
	}
}

impl CredentialProvider for Secret {
	fn resolve(&self) -> EmailResult<Secret> {
		Ok(self.clone())
	}
}

fn default_true() -> bool {
	true
}

fn default_credentials() -> Arc<dyn CredentialProvider> {
	Arc::new(Secret::new(String::new()))
}

/// Connection parameters for an SMTP endpoint.
///
/// An immutable value record: host, port, whether the session is encrypted
/// (`ssl`, default `true`), whether message bodies are HTML (`html`,
/// default `true`), and the credential used to authenticate. The sender
/// address of the message doubles as the authentication username.
///
/// The credential is held behind [`CredentialProvider`] and resolved
/// immediately before authentication; it is excluded from serialization
/// and redacted from `Debug` output.
///
/// # Examples
///
/// ```
/// use mailbridge::EmailConfigurations;
///
/// let config = EmailConfigurations::new("smtp.example.com", 465)
/// 	.with_password("app-password")
/// 	.with_html(false);
///
/// assert_eq!(config.host(), "smtp.example.com");
/// assert_eq!(config.port(), 465);
/// assert!(config.ssl());
/// assert!(!config.html());
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct EmailConfigurations {
	host: String,
	port: u16,
	#[serde(default = "default_true")]
	ssl: bool,
	#[serde(default = "default_true")]
	html: bool,
	#[serde(skip, default = "default_credentials")]
	credentials: Arc<dyn CredentialProvider>,
}

impl EmailConfigurations {
	/// Create a configuration for the given host and port.
	///
	/// Encryption and HTML bodies are both enabled by default; the
	/// credential starts out as an empty password.
	pub fn new(host: impl Into<String>, port: u16) -> Self {
		Self {
			host: host.into(),
			port,
			ssl: true,
			html: true,
			credentials: default_credentials(),
		}
	}

	/// Use a plain in-memory password for authentication.
	pub fn with_password(mut self, password: impl Into<String>) -> Self {
		self.credentials = Arc::new(Secret::new(password));
		self
	}

	/// Use a custom credential provider for authentication.
	pub fn with_credentials(mut self, provider: Arc<dyn CredentialProvider>) -> Self {
		self.credentials = provider;
		self
	}

	/// Enable or disable the encrypted session.
	pub fn with_ssl(mut self, ssl: bool) -> Self {
		self.ssl = ssl;
		self
	}

	/// Mark message bodies as HTML (or plain text).
	pub fn with_html(mut self, html: bool) -> Self {
		self.html = html;
		self
	}

	/// SMTP server hostname.
	pub fn host(&self) -> &str {
		&self.host
	}

	/// SMTP server port.
	pub fn port(&self) -> u16 {
		self.port
	}

	/// Whether the session is encrypted.
	pub fn ssl(&self) -> bool {
		self.ssl
	}

	/// Whether message bodies are HTML.
	pub fn html(&self) -> bool {
		self.html
	}

	/// Resolve the configured credential.
	pub fn password(&self) -> EmailResult<Secret> {
		self.credentials.resolve()
	}
}

impl fmt::Debug for EmailConfigurations {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EmailConfigurations")
			.field("host", &self.host)
			.field("port", &self.port)
			.field("ssl", &self.ssl)
			.field("html", &self.html)
			.field("credentials", &"***")
			.finish()
	}
}
