use std::net::TcpListener;
use std::sync::Arc;

use actix_web::cookie::Key;
use actix_web::dev::Server;
use actix_web::web::Data;
use actix_web::{web, App, HttpServer};
use actix_web_flash_messages::storage::CookieMessageStore;
use actix_web_flash_messages::FlashMessagesFramework;
use anyhow::Context;
use secrecy::{ExposeSecret, Secret};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_actix_web::TracingLogger;

use crate::configuration::{DatabaseSettings, EmailClientSettings, Settings};
use crate::email_client::EmailClient;
use crate::mailer::Mailer;
use crate::repository::{PostgresUserRepository, UserRepository};
use crate::routes::{self, RegistrationHandler};
use crate::templates::{TemplateRenderer, TeraRenderer};

pub type DbConnectionKind = PgPool;

/// Origin of the public address, prefixed to links sent out by email.
#[derive(Debug, Clone)]
pub struct ApplicationBaseUrl(pub String);

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Build the application on top of Postgres and the configured email API.
    pub fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let connection_pool = get_connection_pool(&configuration.database);
        let repository: Arc<dyn UserRepository> =
            Arc::new(PostgresUserRepository::new(connection_pool));
        let mailer = get_mailer(configuration.email_client.as_ref())?;
        Self::build_with(configuration, repository, Some(mailer))
    }

    /// Build the application around an existing repository and mailer.
    ///
    /// Without a mailer no verification email is attempted at all.
    pub fn build_with(
        configuration: Settings,
        repository: Arc<dyn UserRepository>,
        mailer: Option<Mailer>,
    ) -> Result<Self, anyhow::Error> {
        let address = format!(
            "{address}:{port}",
            address = configuration.application.host,
            port = configuration.application.port
        );
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind {}", address))?;
        // We retrieve the port assigned to us by the OS
        let port = listener.local_addr()?.port();

        let renderer: Arc<dyn TemplateRenderer> = Arc::new(
            TeraRenderer::new(configuration.app_settings.app_name.clone())
                .context("Failed to load templates")?,
        );
        let base_url = ApplicationBaseUrl(
            configuration
                .application
                .origin()
                .context("Invalid application base url")?,
        );
        let registration = RegistrationHandler::new(
            renderer.clone(),
            repository.clone(),
            base_url,
            configuration.app_settings,
            configuration.mail,
        );
        let server = run(
            listener,
            renderer,
            repository,
            registration,
            mailer,
            configuration.application.hmac_secret,
        )?;
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn get_connection_pool(configuration: &DatabaseSettings) -> DbConnectionKind {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(configuration.with_db())
}

/// A missing `email_client` section yields a mailer without transport.
pub fn get_mailer(configuration: Option<&EmailClientSettings>) -> Result<Mailer, anyhow::Error> {
    let transport = match configuration {
        Some(configuration) => {
            let sender_email = configuration
                .sender()
                .map_err(|e| anyhow::anyhow!(e))
                .context("Invalid sender email address")?;
            let email_client = EmailClient::new(
                configuration.base_url.clone(),
                sender_email,
                configuration.authorization_token.clone(),
                configuration.timeout(),
            )
            .context("Failed to build the email client")?;
            Some(email_client)
        }
        None => None,
    };
    Ok(Mailer::new(transport))
}

pub fn run(
    listener: TcpListener,
    renderer: Arc<dyn TemplateRenderer>,
    repository: Arc<dyn UserRepository>,
    registration: RegistrationHandler,
    mailer: Option<Mailer>,
    hmac_secret: Secret<String>,
) -> Result<Server, anyhow::Error> {
    let secret_key = Key::try_from(hmac_secret.expose_secret().as_bytes())
        .map_err(|e| anyhow::anyhow!("Invalid HMAC secret: {:?}", e))?;
    let message_store = CookieMessageStore::builder(secret_key).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let renderer: Data<dyn TemplateRenderer> = Data::from(renderer);
    let repository: Data<dyn UserRepository> = Data::from(repository);
    let registration = Data::new(registration);
    let mailer = mailer.map(Data::new);
    let server = HttpServer::new(move || {
        let app = App::new()
            .wrap(message_framework.clone())
            .wrap(TracingLogger::default())
            .service(
                web::resource("/")
                    .name("Home")
                    .route(web::get().to(routes::home)),
            )
            .route("/health", web::get().to(routes::health_check))
            .service(
                web::resource("/register")
                    .name("Register")
                    .route(web::get().to(routes::registration_form))
                    .route(web::post().to(routes::register)),
            )
            .service(
                web::resource("/verify/{id}/{token}")
                    .name("Verify Account")
                    .route(web::get().to(routes::verify_account)),
            )
            .app_data(renderer.clone())
            .app_data(repository.clone())
            .app_data(registration.clone());
        match &mailer {
            Some(mailer) => app.app_data(mailer.clone()),
            None => app,
        }
    })
        .listen(listener)?
        .run();
    Ok(server)
}
