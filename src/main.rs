use user_manager::configuration::get_configuration;
use user_manager::startup::Application;
use user_manager::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber(
        "user_manager".into(),
        "info".into(),
        std::io::stdout,
    );
    init_subscriber(subscriber);

    let config = get_configuration()
        .expect("Failed to read config file");
    let application = Application::build(config)?;
    application.run_until_stopped().await?;
    Ok(())
}
