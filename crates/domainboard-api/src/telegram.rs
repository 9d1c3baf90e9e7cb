use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;

impl ApiClient {
    /// Relay a message to the listings channel through the server's bot.
    ///
    /// `POST /telegram/notify`
    pub async fn send_telegram_notification(&self, message: &str) -> Result<serde_json::Value, Error> {
        debug!(chars = message.chars().count(), "sending telegram notification");
        self.post("telegram/notify", &json!({ "message": message })).await
    }
}
