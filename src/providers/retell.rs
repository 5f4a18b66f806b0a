//! Voice-AI provider client backed by the Retell REST API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{
    ChatCompletion, ProviderError, VoiceCredentials, VoiceProvider, WebCall, endpoint,
    http_client, parse_base_url, read_json,
};

const PROVIDER: &str = "Retell";

#[derive(Debug, Serialize)]
struct CreateWebCallBody<'a> {
    agent_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateWebCallResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    agent_id: &'a str,
    user_message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
}

/// The agent's reply has been observed under three different keys.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    agent_message: Option<String>,
    response: Option<String>,
    content: Option<String>,
    conversation_id: Option<String>,
}

impl From<ChatCompletionResponse> for ChatCompletion {
    fn from(r: ChatCompletionResponse) -> Self {
        Self {
            response: r.agent_message.or(r.response).or(r.content),
            conversation_id: r.conversation_id,
        }
    }
}

pub struct RetellClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RetellClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http: http_client(PROVIDER, timeout)?,
            base_url: parse_base_url(PROVIDER, base_url)?,
        })
    }
}

#[async_trait]
impl VoiceProvider for RetellClient {
    async fn create_web_call(
        &self,
        credentials: &VoiceCredentials,
    ) -> Result<WebCall, ProviderError> {
        let url = endpoint(PROVIDER, &self.base_url, "/v2/create-web-call")?;

        let response = self
            .http
            .post(url)
            .bearer_auth(&credentials.api_key)
            .json(&CreateWebCallBody {
                agent_id: &credentials.agent_id,
            })
            .send()
            .await;

        let body: CreateWebCallResponse = read_json(PROVIDER, response).await?;
        Ok(WebCall {
            access_token: body.access_token,
        })
    }

    async fn create_chat_completion(
        &self,
        credentials: &VoiceCredentials,
        message: &str,
        conversation_id: Option<&str>,
    ) -> Result<ChatCompletion, ProviderError> {
        let url = endpoint(PROVIDER, &self.base_url, "/v2/create-chat-completion")?;

        let response = self
            .http
            .post(url)
            .bearer_auth(&credentials.api_key)
            .json(&ChatCompletionBody {
                agent_id: &credentials.agent_id,
                user_message: message,
                conversation_id,
            })
            .send()
            .await;

        let body: ChatCompletionResponse = read_json(PROVIDER, response).await?;
        Ok(body.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_reply_prefers_agent_message() {
        let raw = r#"{"agent_message": "hi", "content": "ignored", "conversation_id": "c1"}"#;
        let reply: ChatCompletion = serde_json::from_str::<ChatCompletionResponse>(raw)
            .unwrap()
            .into();

        assert_eq!(reply.response.as_deref(), Some("hi"));
        assert_eq!(reply.conversation_id.as_deref(), Some("c1"));
    }

    #[test]
    fn chat_reply_falls_back_to_content() {
        let raw = r#"{"content": "hello"}"#;
        let reply: ChatCompletion = serde_json::from_str::<ChatCompletionResponse>(raw)
            .unwrap()
            .into();

        assert_eq!(reply.response.as_deref(), Some("hello"));
        assert!(reply.conversation_id.is_none());
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = RetellClient::new("ftp://api.retellai.com", Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::InvalidBaseUrl { .. }));
    }
}
