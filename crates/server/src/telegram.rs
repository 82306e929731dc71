//! Telegram Bot API messenger
//!
//! Markdown produced by `composer` is converted to Bot API HTML before
//! sending. Entity budgets are checked locally with [`MarkdownMeasurer`].

use std::path::Path;

use async_trait::async_trait;
use composer::{MarkdownMeasurer, Measurement, MessageRef, TextMeasurer, markdown_to_html};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::ingestion::{IngestionError, Messenger, Result};
use crate::models::{ChatTarget, TelegramSettings};

const PARSE_MODE: &str = "HTML";

/// Bot API response envelope
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Message {
    message_id: i64,
    chat: Chat,
    message_thread_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

impl From<Message> for MessageRef {
    fn from(message: Message) -> Self {
        MessageRef {
            chat_id: message.chat.id,
            message_id: message.message_id,
            thread_id: message.message_thread_id,
            link: None,
        }
    }
}

pub struct TelegramMessenger {
    client: Client,
    api_url: String,
    bot_token: String,
}

impl TelegramMessenger {
    pub fn new(settings: &TelegramSettings) -> Self {
        Self::with_client(Client::new(), settings)
    }

    pub fn with_client(client: Client, settings: &TelegramSettings) -> Self {
        Self {
            client,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            bot_token: settings.bot_token.clone(),
        }
    }

    fn url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.bot_token, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> Result<T> {
        let response = self
            .client
            .post(self.url(method))
            .json(&body)
            .send()
            .await
            .map_err(|e| IngestionError::Messaging(format!("{}: {}", method, e)))?;
        Self::parse(method, response).await
    }

    async fn parse<T: DeserializeOwned>(method: &str, response: reqwest::Response) -> Result<T> {
        let text = response
            .text()
            .await
            .map_err(|e| IngestionError::Messaging(format!("{}: {}", method, e)))?;
        parse_response(method, &text)
    }

    /// Edits that change nothing are rejected by the API; treat them as done.
    async fn edit(&self, method: &str, body: Value) -> Result<()> {
        match self.call::<Value>(method, body).await {
            Ok(_) => Ok(()),
            Err(IngestionError::Messaging(e)) if e.contains("message is not modified") => {
                tracing::debug!("[telegram] {} skipped, content unchanged", method);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Decode a Bot API response body.
fn parse_response<T: DeserializeOwned>(method: &str, text: &str) -> Result<T> {
    let response: ApiResponse<T> = serde_json::from_str(text)
        .map_err(|e| IngestionError::Messaging(format!("{}: invalid response: {}", method, e)))?;

    match (response.ok, response.result) {
        (true, Some(result)) => Ok(result),
        _ => Err(IngestionError::Messaging(format!(
            "{} failed ({}): {}",
            method,
            response.error_code.unwrap_or_default(),
            response.description.unwrap_or_default()
        ))),
    }
}

/// Public link of a message in a private supergroup or channel.
///
/// `-1001234567890` becomes `https://t.me/c/1234567890/...`; forum
/// messages include their thread id.
pub fn private_message_link(message: &MessageRef) -> String {
    let raw = message.chat_id.unsigned_abs().to_string();
    let chat = raw.strip_prefix("100").unwrap_or(&raw);
    match message.thread_id {
        Some(thread) => format!("https://t.me/c/{}/{}/{}", chat, thread, message.message_id),
        None => format!("https://t.me/c/{}/{}", chat, message.message_id),
    }
}

fn with_target(mut body: Value, target: &ChatTarget) -> Value {
    body["chat_id"] = json!(target.chat_id);
    if let Some(thread) = target.thread_id {
        body["message_thread_id"] = json!(thread);
    }
    body
}

#[async_trait]
impl TextMeasurer for TelegramMessenger {
    async fn measure(&self, text: &str) -> composer::Result<Measurement> {
        MarkdownMeasurer.measure_text(text)
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(
        &self,
        target: &ChatTarget,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<MessageRef> {
        let mut body = json!({
            "text": markdown_to_html(text),
            "parse_mode": PARSE_MODE,
            "link_preview_options": { "is_disabled": true },
        });
        if let Some(message_id) = reply_to {
            body["reply_parameters"] = json!({ "message_id": message_id });
        }
        let message: Message = self.call("sendMessage", with_target(body, target)).await?;
        Ok(message.into())
    }

    async fn send_photo(
        &self,
        target: &ChatTarget,
        photo_url: &str,
        caption: &str,
    ) -> Result<MessageRef> {
        let body = json!({
            "photo": photo_url,
            "caption": markdown_to_html(caption),
            "parse_mode": PARSE_MODE,
        });
        let message: Message = self.call("sendPhoto", with_target(body, target)).await?;
        Ok(message.into())
    }

    async fn send_video(&self, target: &ChatTarget, path: &Path, caption: &str) -> Result<MessageRef> {
        let file = tokio::fs::File::open(path).await?;
        let length = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video.mp4".to_string());

        let mut form = Form::new()
            .text("chat_id", target.chat_id.to_string())
            .text("caption", markdown_to_html(caption))
            .text("parse_mode", PARSE_MODE)
            .text("supports_streaming", "true")
            .part(
                "video",
                Part::stream_with_length(file, length).file_name(file_name),
            );
        if let Some(thread) = target.thread_id {
            form = form.text("message_thread_id", thread.to_string());
        }

        tracing::debug!("[telegram] Uploading {} ({} bytes)", path.display(), length);
        let response = self
            .client
            .post(self.url("sendVideo"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| IngestionError::Messaging(format!("sendVideo: {}", e)))?;
        let message: Message = Self::parse("sendVideo", response).await?;
        Ok(message.into())
    }

    async fn edit_text(&self, message: &MessageRef, text: &str) -> Result<()> {
        self.edit(
            "editMessageText",
            json!({
                "chat_id": message.chat_id,
                "message_id": message.message_id,
                "text": markdown_to_html(text),
                "parse_mode": PARSE_MODE,
                "link_preview_options": { "is_disabled": true },
            }),
        )
        .await
    }

    async fn edit_caption(&self, message: &MessageRef, caption: &str) -> Result<()> {
        self.edit(
            "editMessageCaption",
            json!({
                "chat_id": message.chat_id,
                "message_id": message.message_id,
                "caption": markdown_to_html(caption),
                "parse_mode": PARSE_MODE,
            }),
        )
        .await
    }

    async fn message_link(&self, message: &MessageRef) -> Result<String> {
        Ok(private_message_link(message))
    }
}
