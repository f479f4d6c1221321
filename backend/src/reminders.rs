use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::db::GameStore;

const REMINDER_SUBJECT: &str = "You have incomplete Hangman games!!";

/// A reminder for one user with unfinished games
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderNotice {
    pub user_name: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivery of reminder notices
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, sender: &str, notice: &ReminderNotice) -> Result<()>;
}

/// Mailer that writes notices to the log instead of sending them
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, sender: &str, notice: &ReminderNotice) -> Result<()> {
        tracing::info!(
            "Reminder from {} to {} <{}>: {}",
            sender,
            notice.user_name,
            notice.to,
            notice.subject
        );
        Ok(())
    }
}

/// One notice per user who has an email address and at least one active game
pub async fn collect_notices(store: &dyn GameStore) -> Result<Vec<ReminderNotice>> {
    let users = store.users_with_active_games().await?;
    Ok(users
        .into_iter()
        .map(|user| ReminderNotice {
            body: format!(
                "Hello {}, stop what you're doing and finish your game",
                user.name
            ),
            subject: REMINDER_SUBJECT.to_string(),
            to: user.email,
            user_name: user.name,
        })
        .collect())
}

/// Send reminders to every eligible user. Returns how many were delivered.
pub async fn send_reminders(store: &dyn GameStore, mailer: &dyn Mailer, sender: &str) -> Result<usize> {
    let notices = collect_notices(store).await?;
    let mut sent = 0;

    for notice in &notices {
        match mailer.send(sender, notice).await {
            Ok(()) => sent += 1,
            Err(e) => tracing::warn!("Failed to send reminder to {}: {:#}", notice.to, e),
        }
    }

    tracing::info!("Sent {} of {} reminder notices", sent, notices.len());
    Ok(sent)
}
