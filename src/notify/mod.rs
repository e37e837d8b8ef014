pub mod telegram;

pub use telegram::{format_telegram_message, TelegramNotifier};

use std::future::Future;

use crate::error::NotifyError;
use crate::models::Notification;

/// Forwards notifications to a sink beyond the console
pub trait Notifier {
    fn notify(&self, notification: &Notification) -> impl Future<Output = Result<(), NotifyError>>;
}

/// No forwarding
impl Notifier for () {
    async fn notify(&self, _notification: &Notification) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Forwards only when a sink is configured
impl<N: Notifier> Notifier for Option<N> {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        match self {
            Some(notifier) => notifier.notify(notification).await,
            None => Ok(()),
        }
    }
}
