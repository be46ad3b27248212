use std::collections::HashMap;

use actix_web::{web, HttpRequest, HttpResponse};
use actix_web_flash_messages::FlashMessage;
use anyhow::Context;
use secrecy::ExposeSecret;

use super::{RegistrationError, RegistrationHandler};
use crate::domain::UserEntity;
use crate::forms::{RegistrationField, RegistrationForm};
use crate::mailer::{format_template, Mailer};
use crate::repository::RepositoryError;
use crate::telemetry::spawn_blocking_with_tracing;
use crate::url_helper::{UrlHelper, UrlOptions};
use crate::utils::see_other;

const EMAIL_TAKEN: &str = "An account with this email address already exists.";

impl RegistrationHandler {
    /// Validate the submitted fields and, when they are acceptable, store the
    /// user, mail out the verification link and redirect home.
    ///
    /// Invalid submissions re-render the form with its errors. Any failure
    /// after validation is returned as-is to the caller.
    #[tracing::instrument(
        name = "Register a new user",
        skip(self, request, body, mailer),
        fields(user_email = tracing::field::Empty, user_id = tracing::field::Empty)
    )]
    pub async fn handle_post(
        &self,
        request: &HttpRequest,
        body: HashMap<String, String>,
        mailer: Option<&Mailer>,
    ) -> Result<HttpResponse, RegistrationError> {
        let mut form = RegistrationForm::new();
        form.set_data(body);
        if !form.is_valid() {
            return self.render_form(&form);
        }
        let mut user = form
            .get_data()
            .context("A valid registration form yielded no user")?;
        tracing::Span::current().record("user_email", &tracing::field::display(&user.email));

        let existing = self
            .repository
            .find_by_email(user.email.as_ref())
            .await
            .context("Failed to look up the email address")?;
        if existing.is_some() {
            form.add_error(RegistrationField::Email, EMAIL_TAKEN);
            return self.render_form(&form);
        }

        let url_helper = UrlHelper::new(request);
        let origin = &self.base_url.0;

        user.unset_conf_password();
        let user = spawn_blocking_with_tracing(move || -> Result<UserEntity, anyhow::Error> {
            let mut user = user;
            user.hash_password()?;
            Ok(user)
        })
        .await
        .context("Failed to spawn blocking task.")??;

        let stored = match self.repository.save(user, UserEntity::PRIMARY_KEY).await {
            Ok(stored) => stored,
            Err(RepositoryError::DuplicateEmail) => {
                form.add_error(RegistrationField::Email, EMAIL_TAKEN);
                return self.render_form(&form);
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context("Failed to store the new user")
                    .into())
            }
        };
        let id = stored.id.context("The stored user has no id")?;
        tracing::Span::current().record("user_id", &tracing::field::display(&id));

        let mut adapter = mailer.and_then(Mailer::get_adapter);
        if let Some(adapter) = adapter.as_mut() {
            let token = stored
                .verification_token
                .as_ref()
                .context("The stored user has no verification token")?;
            let verification_url = url_helper
                .generate(
                    "Verify Account",
                    [id.to_string(), token.expose_secret().clone()],
                    UrlOptions { reuse_query_params: false },
                )
                .context("Failed to generate the verification link")?;
            let templates = &self.mail_settings.message_templates;
            let subject = format_template(
                &templates.verify_subject,
                &[self.app_settings.app_name.as_str()],
            )
            .context("Failed to format the verification subject")?;
            let body = format_template(
                &templates.verify_message_body,
                &[
                    self.app_settings.token_lifetime.verification_token.as_str(),
                    origin.as_str(),
                    verification_url.as_str(),
                ],
            )
            .context("Failed to format the verification message")?;

            adapter
                .to(stored.email.clone(), stored.full_name())
                .is_html()
                .subject(subject)
                .body(body);
        }
        if let (Some(mailer), Some(adapter)) = (mailer, adapter) {
            mailer
                .send(adapter)
                .await
                .context("Failed to send the verification email")?;
        }

        FlashMessage::info("Thanks for registering. Please check your inbox to verify your account.")
            .send();
        let home = url_helper
            .generate_static("Home")
            .context("Failed to generate the home link")?;
        Ok(see_other(&home))
    }
}

pub async fn register(
    request: HttpRequest,
    form: web::Form<HashMap<String, String>>,
    handler: web::Data<RegistrationHandler>,
    mailer: Option<web::Data<Mailer>>,
) -> Result<HttpResponse, RegistrationError> {
    handler
        .handle_post(&request, form.into_inner(), mailer.as_ref().map(|m| m.get_ref()))
        .await
}
