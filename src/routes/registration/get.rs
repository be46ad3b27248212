use actix_web::{web, HttpResponse};

use super::{RegistrationError, RegistrationHandler};
use crate::forms::RegistrationForm;

impl RegistrationHandler {
    pub fn handle_get(&self) -> Result<HttpResponse, RegistrationError> {
        self.render_form(&RegistrationForm::new())
    }
}

pub async fn registration_form(
    handler: web::Data<RegistrationHandler>,
) -> Result<HttpResponse, RegistrationError> {
    handler.handle_get()
}
