use crate::cli::GlobalArgs;
use crate::commands::common::{format_timestamp, open_app};
use crate::error::CliError;

pub async fn run_status(global: &GlobalArgs) -> Result<(), CliError> {
    let app = open_app(global).await?;
    let context = &app.context;

    let backend = app
        .backend
        .as_ref()
        .map_or("not configured", |backend| backend.supabase_url.as_str());
    let last_sync = context
        .last_synced_at()
        .await
        .map_or_else(|| "never".to_string(), format_timestamp);

    println!("Profile:     {}", app.profile_name);
    println!("Backend:     {backend}");
    println!(
        "Signed in:   {}",
        if app.signed_in { "yes" } else { "no" }
    );
    println!(
        "Connection:  {}",
        if context.is_online() { "online" } else { "offline" }
    );
    println!("Sync status: {}", context.status());
    println!("Queued:      {}", context.pending().await.len());
    println!("Last sync:   {last_sync}");
    Ok(())
}
