use tripcart_core::util::normalize_text_option;

use crate::cli::ConfigCommands;
use crate::config_profiles::{CliProfile, CliProfilesConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            supabase_url,
            supabase_anon_key,
            items_table,
            no_activate,
        } => {
            let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
            let profile_name = config.resolve_profile_name(global_profile);
            let update = CliProfile {
                supabase_url,
                supabase_anon_key,
                items_table,
            };
            let profile = apply_profile_update(&mut config, &profile_name, update, no_activate)?;

            let path = config.save().map_err(CliError::Config)?;
            println!(
                "Profile '{}' initialized at {}",
                profile_name,
                path.display()
            );

            let missing = missing_fields(&profile);
            if missing.is_empty() {
                println!(
                    "Profile '{profile_name}' is ready. Run `tripcart auth login --email <email> --password <password>`."
                );
            } else {
                println!(
                    "Profile '{}' is missing: {}",
                    profile_name,
                    missing.join(", ")
                );
            }
            Ok(())
        }
    }
}

/// Merge explicit values, then environment, then what the profile had.
///
/// Returns the resulting profile after validating it.
pub fn apply_profile_update(
    config: &mut CliProfilesConfig,
    profile_name: &str,
    update: CliProfile,
    no_activate: bool,
) -> Result<CliProfile, CliError> {
    let existing = config.profile(profile_name).cloned().unwrap_or_default();
    let env_fallback = CliProfile::default().client_config().with_env_fallback();

    let merged = CliProfile {
        supabase_url: normalize_text_option(update.supabase_url)
            .or(env_fallback.supabase_url)
            .or(existing.supabase_url),
        supabase_anon_key: normalize_text_option(update.supabase_anon_key)
            .or(env_fallback.supabase_anon_key)
            .or(existing.supabase_anon_key),
        items_table: normalize_text_option(update.items_table)
            .or(env_fallback.items_table)
            .or(existing.items_table),
    };

    merged
        .client_config()
        .backend()
        .map_err(CliError::Config)?;

    *config.profile_mut_or_default(profile_name) = merged.clone();
    if !no_activate {
        config.active_profile = Some(profile_name.to_string());
    }
    Ok(merged)
}

pub fn missing_fields(profile: &CliProfile) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if normalize_text_option(profile.supabase_url.clone()).is_none() {
        missing.push("supabase_url");
    }
    if normalize_text_option(profile.supabase_anon_key.clone()).is_none() {
        missing.push("supabase_anon_key");
    }
    missing
}
