use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials, Message,
    SmtpTransport, Transport,
};
use std::time::Duration;

use crate::config::SmtpConfig;
use crate::models::Organization;
use service_core::error::AppError;

/// Outbound notification dispatcher. One call, one send.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Invite an existing user to join the organization.
    async fn send_invitation(
        &self,
        to_email: &str,
        organization: &Organization,
    ) -> Result<(), AppError>;

    /// Send a registration link carrying a pre-filled org-join token to an
    /// address with no account yet.
    async fn send_registration_link(
        &self,
        to_email: &str,
        organization: &Organization,
        registration_link: &str,
    ) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct EmailNotifier {
    mailer: SmtpTransport,
    from_email: String,
}

impl EmailNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, AppError> {
        let creds = Credentials::new(config.user.clone(), config.password.clone());

        let mailer = SmtpTransport::relay(&config.host)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!(e.to_string())))?
            .credentials(creds)
            .port(config.port)
            .timeout(Some(Duration::from_secs(10)))
            .build();

        tracing::info!(host = %config.host, "Email notifier initialized");

        Ok(Self {
            mailer,
            from_email: config.from_email.clone(),
        })
    }

    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        plain_body: &str,
        html_body: &str,
    ) -> Result<(), AppError> {
        let email = Message::builder()
            .from(self.from_email.parse().map_err(
                |e: lettre::address::AddressError| AppError::InternalError(e.into()),
            )?)
            .to(to_email.parse().map_err(
                |e: lettre::address::AddressError| AppError::InternalError(e.into()),
            )?)
            .subject(subject)
            .multipart(
                lettre::message::MultiPart::alternative()
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(plain_body.to_string()),
                    )
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::InternalError(e.into()))?;

        // Send in the blocking pool; the SMTP transport is synchronous.
        let mailer = self.mailer.clone();
        let result = tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::InternalError(e.into()))?;

        match result {
            Ok(_) => {
                tracing::info!(to = %to_email, subject = %subject, "Email sent");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e.to_string(), to = %to_email, "Failed to send email");
                Err(AppError::EmailError(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send_invitation(
        &self,
        to_email: &str,
        organization: &Organization,
    ) -> Result<(), AppError> {
        let html_body = format!(
            r###"<html>
                <body style="font-family: Arial, sans-serif;">
                    <h2>You have been invited to join {org}</h2>
                    <p>An administrator of {org} has invited you to join their organization.</p>
                    <p>Sign in to your existing account to accept the invitation.</p>
                    <p style="color: #666; font-size: 12px;">
                        If you were not expecting this invitation, please ignore this email.
                    </p>
                </body>
            </html>"###,
            org = organization.name
        );

        let plain_body = format!(
            "You have been invited to join {org}\n\n\
            An administrator of {org} has invited you to join their organization.\n\
            Sign in to your existing account to accept the invitation.\n\n\
            If you were not expecting this invitation, please ignore this email.",
            org = organization.name
        );

        self.send_email(
            to_email,
            &format!("Invitation to join {}", organization.name),
            &plain_body,
            &html_body,
        )
        .await
    }

    async fn send_registration_link(
        &self,
        to_email: &str,
        organization: &Organization,
        registration_link: &str,
    ) -> Result<(), AppError> {
        let html_body = format!(
            r###"<html>
                <body style="font-family: Arial, sans-serif;">
                    <h2>Join {org}</h2>
                    <p>You have been invited to join {org}. Create your account using the link below:</p>
                    <p>
                        <a href="{link}" style="background-color: #4CAF50; color: white; padding: 14px 20px; text-decoration: none; border-radius: 4px;">
                            Create Account
                        </a>
                    </p>
                    <p style="color: #666; font-size: 12px;">
                        If you were not expecting this invitation, please ignore this email.
                    </p>
                </body>
            </html>"###,
            org = organization.name,
            link = registration_link
        );

        let plain_body = format!(
            "Join {org}\n\n\
            You have been invited to join {org}. Create your account using the following link:\n\n\
            {link}\n\n\
            If you were not expecting this invitation, please ignore this email.",
            org = organization.name,
            link = registration_link
        );

        self.send_email(
            to_email,
            &format!("Create your {} account", organization.name),
            &plain_body,
            &html_body,
        )
        .await
    }
}

/// Notification recorded by [`MockNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentNotification {
    Invitation {
        to: String,
        org_id: String,
    },
    RegistrationLink {
        to: String,
        org_id: String,
        link: String,
    },
}

/// Recording notifier used by tests.
#[derive(Default)]
pub struct MockNotifier {
    sent: std::sync::Mutex<Vec<SentNotification>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn invitation_count(&self) -> usize {
        self.sent()
            .iter()
            .filter(|n| matches!(n, SentNotification::Invitation { .. }))
            .count()
    }

    pub fn registration_count(&self) -> usize {
        self.sent()
            .iter()
            .filter(|n| matches!(n, SentNotification::RegistrationLink { .. }))
            .count()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send_invitation(
        &self,
        to_email: &str,
        organization: &Organization,
    ) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(SentNotification::Invitation {
            to: to_email.to_string(),
            org_id: organization.id.clone(),
        });
        Ok(())
    }

    async fn send_registration_link(
        &self,
        to_email: &str,
        organization: &Organization,
        registration_link: &str,
    ) -> Result<(), AppError> {
        self.sent
            .lock()
            .unwrap()
            .push(SentNotification::RegistrationLink {
                to: to_email.to_string(),
                org_id: organization.id.clone(),
                link: registration_link.to_string(),
            });
        Ok(())
    }
}
