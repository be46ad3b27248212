use reqwest::Client;
use secrecy::{ExposeSecret, Secret};

use crate::domain::UserEmail;

/// Body of an outgoing email; Postmark accepts either flavour.
#[derive(Debug, Clone, Copy)]
pub enum EmailBody<'a> {
    Html(&'a str),
    Text(&'a str),
}

pub struct EmailClient {
    http_client: Client,
    base_url: String,
    sender: UserEmail,
    authorization_token: Secret<String>,
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: UserEmail,
        authorization_token: Secret<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
            sender,
            authorization_token,
        })
    }

    #[tracing::instrument(name = "Send an email", skip(self, body), fields(recipient = %recipient))]
    pub async fn send_email(
        &self,
        recipient: &UserEmail,
        recipient_name: &str,
        subject: &str,
        body: EmailBody<'_>,
    ) -> Result<(), reqwest::Error> {
        let url = format!("{}/email", self.base_url);
        let to = if recipient_name.trim().is_empty() {
            recipient.as_ref().to_string()
        } else {
            format!("{} <{}>", recipient_name, recipient)
        };
        let (html_body, text_body) = match body {
            EmailBody::Html(html) => (Some(html), None),
            EmailBody::Text(text) => (None, Some(text)),
        };
        let request_body = SendEmailRequest {
            from: self.sender.as_ref(),
            to: &to,
            subject,
            html_body,
            text_body,
        };
        self.http_client
            .post(&url)
            .header("X-Postmark-Server-Token", self.authorization_token.expose_secret())
            .json(&request_body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html_body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_body: Option<&'a str>,
}
