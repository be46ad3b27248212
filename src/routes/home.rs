use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};
use actix_web_flash_messages::IncomingFlashMessages;

use crate::templates::{TemplateRenderer, ViewModel, HOME_TEMPLATE};
use crate::utils::e500;

pub async fn home(
    renderer: web::Data<dyn TemplateRenderer>,
    flash_messages: IncomingFlashMessages,
) -> Result<HttpResponse, actix_web::Error> {
    let messages: Vec<&str> = flash_messages
        .iter()
        .map(|message| message.content())
        .collect();
    let mut model = ViewModel::new();
    model.set_variable("messages", &messages);
    let html = renderer.render(HOME_TEMPLATE, &model).map_err(e500)?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(html))
}
