use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;

use crate::config::SmtpConfig;
use crate::user::errors::MailerError;
use crate::user::ports::Mailer;

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    verify_base_url: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig, verify_base_url: String) -> Result<Self, MailerError> {
        let credentials =
            Credentials::new(config.username.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| MailerError::BuildFailed(e.to_string()))?
            .port(config.port)
            .credentials(credentials)
            .build();

        let from = format!("{} <{}>", config.from_name, config.from_address)
            .parse()
            .map_err(|e: lettre::address::AddressError| {
                MailerError::InvalidAddress(e.to_string())
            })?;

        Ok(Self {
            transport,
            from,
            verify_base_url,
        })
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), MailerError> {
        let to: Mailbox = to
            .parse()
            .map_err(|e: lettre::address::AddressError| {
                MailerError::InvalidAddress(e.to_string())
            })?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body)
            .map_err(|e| MailerError::BuildFailed(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailerError::SendFailed(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_verification_email(
        &self,
        to: &str,
        username: &str,
        token: &str,
    ) -> Result<(), MailerError> {
        let verify_url = format!("{}?token={}", self.verify_base_url, token);

        let body = format!(
            r#"<html>
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h1>Welcome, {username}!</h1>
    <p>Thank you for registering. Please verify your email address by clicking the link below:</p>
    <p style="margin: 30px 0;"><a href="{verify_url}">Verify Email</a></p>
    <p>If you did not create this account, you can safely ignore this message.</p>
</body>
</html>"#
        );

        self.send(to, "Verify your email address", body).await
    }

    async fn send_welcome_email(&self, to: &str, username: &str) -> Result<(), MailerError> {
        let body = format!(
            r#"<html>
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h1>Hi {username},</h1>
    <p>Your email address is verified and your account is ready to use.</p>
</body>
</html>"#
        );

        self.send(to, "Your account is ready", body).await
    }
}
