use actix_web::{web, HttpRequest, HttpResponse};
use actix_web_flash_messages::FlashMessage;
use uuid::Uuid;

use crate::repository::UserRepository;
use crate::url_helper::UrlHelper;
use crate::utils::{e500, see_other};

#[derive(serde::Deserialize)]
pub struct Parameters {
    id: Uuid,
    token: String,
}

#[tracing::instrument(
    name = "Verify a registered account",
    skip(request, repository, parameters),
    fields(user_id = %parameters.id)
)]
pub async fn verify_account(
    request: HttpRequest,
    repository: web::Data<dyn UserRepository>,
    parameters: web::Path<Parameters>,
) -> Result<HttpResponse, actix_web::Error> {
    let Parameters { id, token } = parameters.into_inner();
    let verified = repository
        .verify_account(id, &token)
        .await
        .map_err(e500)?;
    if !verified {
        return Ok(HttpResponse::Unauthorized().finish());
    }

    FlashMessage::info("Your account has been verified.").send();
    let home = UrlHelper::new(&request).generate_static("Home").map_err(e500)?;
    Ok(see_other(&home))
}
