use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::SmtpConfig;

/// Outgoing mail. When no SMTP host is configured the mailer runs in no-op
/// mode and logs reset links at info level instead of sending anything,
/// which is what local development and the test suite rely on.
#[derive(Clone)]
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
    frontend_url: String,
}

impl Mailer {
    pub fn new(smtp: &SmtpConfig, frontend_url: &str) -> Result<Self> {
        let transport = if smtp.host.is_empty() {
            None
        } else {
            let mut builder = if smtp.use_starttls {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
                    .context("Failed to build STARTTLS transport")?
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
                    .context("Failed to build SMTP transport")?
            };

            builder = builder.port(smtp.port);

            if let (Some(username), Some(password)) = (&smtp.username, &smtp.password) {
                builder = builder.credentials(Credentials::new(
                    username.clone(),
                    password.clone(),
                ));
            }

            Some(builder.build())
        };

        Ok(Self {
            transport,
            from: smtp.from.clone(),
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Sends a password-reset email carrying a link into the web client's
    /// change-password page.
    pub async fn send_password_reset(&self, recipient: &str, token: &str) -> Result<()> {
        let link = format!("{}/change-password/{token}", self.frontend_url);

        let Some(transport) = &self.transport else {
            info!(recipient, link, "SMTP not configured; logging reset link");
            return Ok(());
        };

        let email = Message::builder()
            .from(self.from.parse().context("Invalid from address")?)
            .to(recipient.parse().context("Invalid recipient address")?)
            .subject("Change password")
            .header(ContentType::TEXT_HTML)
            .body(format!("<a href=\"{link}\">Reset password</a>"))
            .context("Failed to build reset email")?;

        transport
            .send(email)
            .await
            .context("Failed to send reset email")?;

        info!(recipient, "Password reset email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_host_means_noop_mode() {
        let mailer = Mailer::new(&SmtpConfig::default(), "http://localhost:3000").unwrap();
        assert!(!mailer.is_enabled());
    }

    #[tokio::test]
    async fn noop_send_succeeds() {
        let mailer = Mailer::new(&SmtpConfig::default(), "http://localhost:3000/").unwrap();
        mailer
            .send_password_reset("ben@example.com", "some-token")
            .await
            .unwrap();
    }
}
