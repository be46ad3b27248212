pub mod configuration;
pub mod domain;
pub mod email_client;
pub mod forms;
pub mod mailer;
pub mod repository;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod templates;
pub mod url_helper;
pub mod utils;
