pub mod health_check;
pub mod home;
pub mod registration;
pub mod verify_account;

pub use health_check::health_check;
pub use home::home;
pub use registration::{register, registration_form, RegistrationHandler};
pub use verify_account::verify_account;

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
