//! Email service for double opt-in and confirmation notifications.
//!
//! Uses SMTP via lettre for delivery with Askama templates. The signup flow
//! only sees the [`Mailer`] trait so tests can record mail instead of sending it.

use askama::Template;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use signup_core::{Email, Locale};

use crate::config::EmailConfig;

/// HTML template for the double opt-in email.
#[derive(Template)]
#[template(path = "email/signup.html")]
struct SignupEmailHtml<'a> {
    german: bool,
    recipient_name: &'a str,
    recipient_email: &'a str,
    confirm_link: &'a str,
}

/// Plain text template for the double opt-in email.
#[derive(Template)]
#[template(path = "email/signup.txt")]
struct SignupEmailText<'a> {
    german: bool,
    recipient_name: &'a str,
    recipient_email: &'a str,
    confirm_link: &'a str,
}

/// HTML template for the tenant-ready email.
#[derive(Template)]
#[template(path = "email/confirm.html")]
struct ConfirmEmailHtml<'a> {
    german: bool,
    recipient_name: &'a str,
    username: &'a str,
}

/// Plain text template for the tenant-ready email.
#[derive(Template)]
#[template(path = "email/confirm.txt")]
struct ConfirmEmailText<'a> {
    german: bool,
    recipient_name: &'a str,
    username: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Which notification is being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTemplate {
    /// Double opt-in request carrying the confirmation link.
    Signup,
    /// Tenant provisioned, carrying the admin login name.
    Confirm,
}

/// Template variables, one variant per [`EmailTemplate`].
#[derive(Clone)]
pub enum MailContent {
    /// Double opt-in request.
    Signup {
        recipient_name: String,
        recipient_email: String,
        /// Full confirmation token.
        confirm_id: String,
        /// Link the applicant follows to confirm.
        confirm_link: String,
    },
    /// Tenant provisioned.
    Confirm {
        recipient_name: String,
        recipient_email: String,
        /// Admin login name, `admin@<domain>`.
        username: String,
    },
}

impl MailContent {
    /// The template this content renders with.
    #[must_use]
    pub const fn template(&self) -> EmailTemplate {
        match self {
            Self::Signup { .. } => EmailTemplate::Signup,
            Self::Confirm { .. } => EmailTemplate::Confirm,
        }
    }
}

/// A notification ready to hand to a [`Mailer`].
#[derive(Clone)]
pub struct OutgoingMail {
    pub to: Email,
    pub from: Email,
    pub locale: Locale,
    pub content: MailContent,
}

// The signup variant carries a bearer token, so only the envelope is printed.
impl std::fmt::Debug for OutgoingMail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutgoingMail")
            .field("to", &self.to)
            .field("from", &self.from)
            .field("locale", &self.locale)
            .field("template", &self.content.template())
            .finish_non_exhaustive()
    }
}

/// Subject line and both bodies of a rendered notification.
#[derive(Debug, Clone)]
pub struct RenderedMail {
    pub subject: &'static str,
    pub text: String,
    pub html: String,
}

/// Render a notification in its locale.
///
/// # Errors
///
/// Returns `EmailError::Template` if a template fails to render.
pub fn render(mail: &OutgoingMail) -> Result<RenderedMail, EmailError> {
    let german = mail.locale == Locale::De;

    let rendered = match &mail.content {
        MailContent::Signup {
            recipient_name,
            recipient_email,
            confirm_link,
            ..
        } => RenderedMail {
            subject: if german {
                "Bitte bestätigen Sie Ihre Registrierung"
            } else {
                "Please confirm your signup"
            },
            text: SignupEmailText {
                german,
                recipient_name,
                recipient_email,
                confirm_link,
            }
            .render()?,
            html: SignupEmailHtml {
                german,
                recipient_name,
                recipient_email,
                confirm_link,
            }
            .render()?,
        },
        MailContent::Confirm {
            recipient_name,
            username,
            ..
        } => RenderedMail {
            subject: if german {
                "Ihr Zugang ist bereit"
            } else {
                "Your account is ready"
            },
            text: ConfirmEmailText {
                german,
                recipient_name,
                username,
            }
            .render()?,
            html: ConfirmEmailHtml {
                german,
                recipient_name,
                username,
            }
            .render()?,
        },
    };

    Ok(rendered)
}

/// Delivers notifications.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Render and send a notification.
    async fn send(&self, mail: &OutgoingMail) -> Result<(), EmailError>;
}

/// SMTP-backed [`Mailer`].
#[derive(Clone)]
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Create a new SMTP mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self { mailer })
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        from: &str,
        to: &str,
        rendered: RenderedMail,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|_| EmailError::InvalidAddress(from.to_string()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(rendered.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(rendered.text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(rendered.html),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %rendered.subject, "Email sent successfully");
        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), EmailError> {
        let rendered = render(mail)?;
        self.send_multipart_email(mail.from.as_str(), mail.to.as_str(), rendered)
            .await
    }
}
