//! Outbound notification sink.
//!
//! Account handlers only talk to the [`Mailer`] trait. The default for local
//! development is [`LogMailer`], which logs the payload and reports success.
//! [`SmtpMailer`] delivers over SMTP with TLS. Delivery is synchronous from
//! the caller's point of view: a failed send propagates back so the
//! reset-token state it was carrying can be rolled back.

use anyhow::{Context, Result, anyhow};
use lettre::{
    Message, SmtpTransport, Transport,
    message::header::ContentType,
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::info;

/// Email delivery abstraction used by the account handlers.
pub trait Mailer: Send + Sync {
    /// Deliver a plain-text message or return an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the message cannot be built or delivered.
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Local dev sink that logs the message instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        info!(to_email = %to, subject = %subject, body = %body, "email send stub");
        Ok(())
    }
}

/// SMTP delivery with required TLS.
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: String,
}

impl SmtpMailer {
    /// Build a pooled SMTP transport against `host`.
    ///
    /// # Errors
    ///
    /// Returns an error when the relay or its TLS parameters cannot be built.
    pub fn new(
        host: &str,
        port: u16,
        username: &str,
        password: &SecretString,
        from: &str,
    ) -> Result<Self> {
        let tls = TlsParameters::new(host.to_string())
            .map_err(|err| anyhow!("failed to build TLS parameters: {err}"))?;
        let transport = SmtpTransport::relay(host)
            .map_err(|err| anyhow!("failed to create SMTP transport: {err}"))?
            .credentials(Credentials::new(
                username.to_string(),
                password.expose_secret().to_string(),
            ))
            .port(port)
            .tls(Tls::Required(tls))
            .timeout(Some(Duration::from_secs(10)))
            .build();
        Ok(Self {
            transport,
            from: from.to_string(),
        })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let message = Message::builder()
            .from(self.from.parse().context("invalid from address")?)
            .to(to.parse().context("invalid to address")?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .context("failed to build email")?;
        self.transport
            .send(&message)
            .context("failed to send email")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingMailer {
        sent: Mutex<Vec<(String, String, String)>>,
    }

    impl Mailer for RecordingMailer {
        fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
            self.sent
                .lock()
                .map_err(|_| anyhow!("poisoned"))?
                .push((to.to_string(), subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    #[test]
    fn log_mailer_reports_success() {
        assert!(LogMailer.send("a@example.com", "subject", "body").is_ok());
    }

    #[test]
    fn mailer_trait_is_object_safe() -> Result<()> {
        let mailer: Box<dyn Mailer> = Box::new(RecordingMailer {
            sent: Mutex::new(Vec::new()),
        });
        mailer.send("a@example.com", "Password reset request", "link inside")?;
        Ok(())
    }
}
