// src/services/notifier.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgConnection;
use std::sync::Arc;

use crate::{
    common::error::AppError, db::NotificationRepository, i18n::I18nStore, models::auth::User,
};

/// Outbound e-mail seam. Delivery is an external concern; the default
/// implementation only logs, test code can swap in a recorder.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_notification_email(
        &self,
        template: &str,
        recipients: &[String],
        data: &Value,
    ) -> anyhow::Result<()>;
}

pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send_notification_email(
        &self,
        template: &str,
        recipients: &[String],
        _data: &Value,
    ) -> anyhow::Result<()> {
        tracing::info!("email '{template}' -> {}", recipients.join(", "));
        Ok(())
    }
}

/// E-mail staged inside a transaction, dispatched after commit.
pub struct EmailJob {
    pub template: String,
    pub recipients: Vec<String>,
    pub data: Value,
}

#[derive(Clone)]
pub struct Notifier {
    repo: NotificationRepository,
    email: Arc<dyn EmailSender>,
    i18n: Arc<I18nStore>,
}

impl Notifier {
    pub fn new(repo: NotificationRepository, email: Arc<dyn EmailSender>, i18n: Arc<I18nStore>) -> Self {
        Self { repo, email, i18n }
    }

    /// Writes one in-app notification per recipient, localized to each
    /// recipient's preferred language, inside the caller's transaction.
    /// Returns the matching e-mail job for dispatch after commit.
    pub async fn stage(
        &self,
        conn: &mut PgConnection,
        recipients: &[User],
        kind: &str,
        args: &[(&str, &str)],
        data: Value,
    ) -> Result<EmailJob, AppError> {
        let title_key = format!("notifications.{kind}.title");
        let message_key = format!("notifications.{kind}.message");

        let mut emails = Vec::with_capacity(recipients.len());
        for user in recipients {
            let lang = &user.preferred_language;
            let title = self.i18n.translate_with(lang, &title_key, args);
            let message = self.i18n.translate_with(lang, &message_key, args);
            self.repo
                .insert(
                    &mut *conn,
                    user.id,
                    &kind.to_uppercase(),
                    &title,
                    &message,
                    Some(&data),
                )
                .await?;
            emails.push(user.email.clone());
        }

        Ok(EmailJob {
            template: kind.to_string(),
            recipients: emails,
            data,
        })
    }

    /// Best-effort: failures are logged and never bubble up. The database
    /// transaction that staged these jobs has already committed.
    pub async fn dispatch(&self, jobs: Vec<EmailJob>) {
        for job in jobs {
            if job.recipients.is_empty() {
                continue;
            }
            if let Err(e) = self
                .email
                .send_notification_email(&job.template, &job.recipients, &job.data)
                .await
            {
                tracing::warn!("email '{}' failed: {e}", job.template);
            }
        }
    }
}
