use std::time::Duration;

use tokio::sync::watch;

use crate::cli::GlobalArgs;
use crate::commands::common::{open_app, probe};
use crate::error::CliError;

pub async fn run_watch(interval_secs: u64, global: &GlobalArgs) -> Result<(), CliError> {
    let app = open_app(global).await?;
    let Some(backend) = app.backend.clone() else {
        return Err(CliError::BackendNotConfigured);
    };
    let context = &app.context;
    let interval = Duration::from_secs(interval_secs.max(1));

    println!(
        "Watching {} every {}s ({} queued, currently {}). Ctrl-C to stop.",
        backend.supabase_url,
        interval.as_secs(),
        context.pending().await.len(),
        if context.is_online() { "online" } else { "offline" }
    );

    let (sender, receiver) = watch::channel(context.is_online());
    let probe_loop = async move {
        loop {
            tokio::time::sleep(interval).await;
            sender.send_replace(!global.offline && probe(&backend).await);
        }
    };

    tokio::select! {
        () = context.watch_connectivity(receiver) => {}
        _ = probe_loop => {}
        result = tokio::signal::ctrl_c() => result?,
    }

    println!("Stopped ({} queued).", context.pending().await.len());
    Ok(())
}
