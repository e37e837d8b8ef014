use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::TelegramConfig;
use crate::error::NotifyError;
use crate::logging::LogContext;
use crate::models::Notification;
use crate::notify::Notifier;

const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends each notification to one chat through the Telegram Bot API
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_base_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig, timeout_seconds: u64) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.trim().to_string(),
            chat_id: config.chat_id.trim().to_string(),
        })
    }

    /// `None` when no bot token is configured
    pub fn from_config(config: &TelegramConfig, timeout_seconds: u64) -> Result<Option<Self>, NotifyError> {
        if !config.enabled() {
            return Ok(None);
        }
        let notifier = Self::new(config, timeout_seconds)?;
        LogContext::new("telegram", "initialization")
            .with_metadata("chat_id", serde_json::json!(notifier.chat_id))
            .info("Telegram notifications enabled");
        Ok(Some(notifier))
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Path of the sendMessage method; contains the bot token
    pub fn send_message_path(bot_token: &str) -> String {
        format!("/bot{}/sendMessage", bot_token)
    }

    async fn send(&self, text: String) -> Result<(), NotifyError> {
        let url = format!("{}{}", self.api_base_url, Self::send_message_path(&self.bot_token));
        let message = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        // reqwest errors carry the URL, which includes the bot token
        let response = self
            .client
            .post(&url)
            .json(&message)
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NotifyError::Http(e.without_url()))?;
        let parsed = serde_json::from_str::<ApiResponse>(&body).ok();

        if !status.is_success() {
            let detail = parsed
                .and_then(|r| r.description)
                .unwrap_or(body);
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body: detail.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        match parsed {
            Some(ApiResponse { ok: false, description }) => Err(NotifyError::Rejected(
                description.unwrap_or_else(|| "no description".to_string()),
            )),
            _ => Ok(()),
        }
    }
}

impl Notifier for TelegramNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.send(format_telegram_message(notification)).await?;

        LogContext::new("telegram", "send_message")
            .with_address(&notification.address)
            .with_signature(&notification.signature)
            .debug("Notification sent to Telegram");
        Ok(())
    }
}

/// HTML message body for one notification
pub fn format_telegram_message(notification: &Notification) -> String {
    format!(
        "<b>New transaction</b>\n\
         Wallet: {} (<code>{}</code>)\n\
         Type: {}\n\
         Signature: <code>{}</code>\n\
         <a href=\"{}\">View on Solscan</a>",
        escape_html(&notification.wallet_name()),
        escape_html(&notification.address),
        escape_html(&notification.tx_type),
        escape_html(&notification.signature),
        notification.viewer_url(),
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
