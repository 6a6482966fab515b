use tripcart_core::config::BackendConfig;

use crate::auth::{clear_stored_session, load_stored_session, SupabaseAuthService};
use crate::cli::AuthCommands;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

fn auth_error(error: impl std::fmt::Display) -> CliError {
    CliError::Auth(error.to_string())
}

fn profile_backend(
    config: &CliProfilesConfig,
    profile_name: &str,
) -> Result<Option<BackendConfig>, CliError> {
    config
        .client_config(profile_name)
        .backend()
        .map_err(CliError::Config)
}

pub async fn run_auth(command: AuthCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(global_profile);
    let backend = profile_backend(&config, &profile_name)?;

    match command {
        AuthCommands::Login { email, password } => {
            let backend = backend.ok_or_else(|| {
                CliError::Config(format!(
                    "Profile '{profile_name}' has no Supabase config. Run `tripcart config init --profile {profile_name}` first."
                ))
            })?;
            let session = SupabaseAuthService::new(&profile_name, &backend)
                .map_err(auth_error)?
                .sign_in(&email, &password)
                .await
                .map_err(auth_error)?;
            let email_label = session.user.email.as_deref().unwrap_or("(no email)");
            println!("Signed in profile '{profile_name}' as {email_label}");
            Ok(())
        }
        AuthCommands::Status => {
            let session = match &backend {
                Some(backend) => SupabaseAuthService::new(&profile_name, backend)
                    .map_err(auth_error)?
                    .restore_session()
                    .await
                    .map_err(auth_error)?,
                None => load_stored_session(&profile_name).map_err(auth_error)?,
            };

            if let Some(session) = session {
                let email_label = session.user.email.as_deref().unwrap_or("(no email)");
                println!(
                    "Profile '{}' is signed in as {} (expires_at={})",
                    profile_name, email_label, session.expires_at
                );
            } else {
                println!("Profile '{profile_name}' is not signed in.");
            }
            Ok(())
        }
        AuthCommands::Logout => {
            let stored_session = load_stored_session(&profile_name).map_err(auth_error)?;
            match (backend, stored_session) {
                (Some(backend), Some(session)) => {
                    SupabaseAuthService::new(&profile_name, &backend)
                        .map_err(auth_error)?
                        .sign_out(&session.access_token)
                        .await
                        .map_err(auth_error)?;
                }
                _ => clear_stored_session(&profile_name).map_err(auth_error)?,
            }

            println!("Signed out profile '{profile_name}'");
            Ok(())
        }
    }
}
