use crate::domain::UserEmail;
use crate::email_client::{EmailBody, EmailClient};

#[derive(thiserror::Error, Debug)]
pub enum MailerError {
    #[error("The message has no recipient")]
    MissingRecipient,
    #[error("No mail transport is configured")]
    TransportUnavailable,
    #[error("Failed to format mail template: {0}")]
    Template(String),
    #[error("Failed to deliver the message")]
    Delivery(#[from] reqwest::Error),
}

/// Fill the `%s` placeholders of a printf-style template, in order.
///
/// `%%` renders a literal `%`. Supplying fewer arguments than placeholders is
/// an error, extra arguments are ignored.
pub fn format_template(template: &str, arguments: &[&str]) -> Result<String, MailerError> {
    let mut output = String::with_capacity(template.len());
    let mut arguments = arguments.iter();
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            output.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => output.push('%'),
            Some('s') => {
                let argument = arguments.next().ok_or_else(|| {
                    MailerError::Template(format!("too few arguments for `{}`", template))
                })?;
                output.push_str(argument);
            }
            Some(other) => {
                return Err(MailerError::Template(format!(
                    "unsupported conversion `%{}` in `{}`",
                    other, template
                )))
            }
            None => {
                return Err(MailerError::Template(format!(
                    "dangling `%` at the end of `{}`",
                    template
                )))
            }
        }
    }
    Ok(output)
}

/// A message being put together before it is handed back to the `Mailer`.
#[derive(Debug, Default, Clone)]
pub struct MailAdapter {
    recipient: Option<(UserEmail, String)>,
    html: bool,
    subject: String,
    body: String,
}

impl MailAdapter {
    pub fn to(&mut self, email: UserEmail, name: impl Into<String>) -> &mut Self {
        self.recipient = Some((email, name.into()));
        self
    }

    pub fn is_html(&mut self) -> &mut Self {
        self.html = true;
        self
    }

    pub fn subject(&mut self, subject: impl Into<String>) -> &mut Self {
        self.subject = subject.into();
        self
    }

    pub fn body(&mut self, body: impl Into<String>) -> &mut Self {
        self.body = body.into();
        self
    }

    pub fn recipient(&self) -> Option<&(UserEmail, String)> {
        self.recipient.as_ref()
    }

    pub fn get_subject(&self) -> &str {
        &self.subject
    }

    pub fn get_body(&self) -> &str {
        &self.body
    }
}

/// Hands out adapters and delivers them through the configured transport.
///
/// A `Mailer` without transport offers no adapter, callers then skip
/// composing the message altogether.
pub struct Mailer {
    transport: Option<EmailClient>,
}

impl Mailer {
    pub fn new(transport: Option<EmailClient>) -> Self {
        Self { transport }
    }

    pub fn get_adapter(&self) -> Option<MailAdapter> {
        self.transport.as_ref().map(|_| MailAdapter::default())
    }

    #[tracing::instrument(name = "Deliver a message", skip(self, adapter))]
    pub async fn send(&self, adapter: MailAdapter) -> Result<(), MailerError> {
        let transport = self
            .transport
            .as_ref()
            .ok_or(MailerError::TransportUnavailable)?;
        let (email, name) = adapter.recipient.as_ref().ok_or(MailerError::MissingRecipient)?;
        let body = if adapter.html {
            EmailBody::Html(&adapter.body)
        } else {
            EmailBody::Text(&adapter.body)
        };
        transport
            .send_email(email, name, &adapter.subject, body)
            .await?;
        Ok(())
    }
}
