//! Minimal client for the LINE Messaging API push endpoint.

use crate::error::Error;
use crate::models::line::PushMessage;

use url::Url;

const PUSH_PATH: &str = "v2/bot/message/push";

#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    api_base: Url,
    token: String,
}

impl Client {
    pub fn new(http: reqwest::Client, api_base: Url, token: impl Into<String>) -> Self {
        Self {
            http,
            api_base,
            token: token.into(),
        }
    }

    fn push_url(&self) -> String {
        format!("{}/{}", self.api_base.as_str().trim_end_matches('/'), PUSH_PATH)
    }

    pub async fn push_message(&self, msg: &PushMessage) -> Result<(), Error> {
        let response = self
            .http
            .post(self.push_url())
            .bearer_auth(&self.token)
            .json(msg)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api { status, body });
        }
        Ok(())
    }
}
