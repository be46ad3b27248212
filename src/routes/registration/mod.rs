mod get;
mod post;

pub use get::registration_form;
pub use post::register;

use std::sync::Arc;

use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::configuration::{AppSettings, MailSettings};
use crate::forms::RegistrationForm;
use crate::repository::UserRepository;
use crate::routes::error_chain_fmt;
use crate::startup::ApplicationBaseUrl;
use crate::templates::{TemplateRenderer, ViewModel, REGISTRATION_TEMPLATE};

#[derive(thiserror::Error)]
pub enum RegistrationError {
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for RegistrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for RegistrationError {
    fn status_code(&self) -> StatusCode {
        match self {
            RegistrationError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Renders the registration form and turns valid submissions into stored,
/// not yet verified, accounts.
pub struct RegistrationHandler {
    renderer: Arc<dyn TemplateRenderer>,
    repository: Arc<dyn UserRepository>,
    base_url: ApplicationBaseUrl,
    app_settings: AppSettings,
    mail_settings: MailSettings,
}

impl RegistrationHandler {
    pub fn new(
        renderer: Arc<dyn TemplateRenderer>,
        repository: Arc<dyn UserRepository>,
        base_url: ApplicationBaseUrl,
        app_settings: AppSettings,
        mail_settings: MailSettings,
    ) -> Self {
        Self {
            renderer,
            repository,
            base_url,
            app_settings,
            mail_settings,
        }
    }

    fn render_form(&self, form: &RegistrationForm) -> Result<HttpResponse, RegistrationError> {
        let mut model = ViewModel::new();
        model.set_variable("form", form);
        let html = self.renderer.render(REGISTRATION_TEMPLATE, &model)?;
        Ok(HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(html))
    }
}
