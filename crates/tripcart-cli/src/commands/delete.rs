use crate::cli::GlobalArgs;
use crate::commands::common::{known_items, open_app, resolve_item_id, short_id};
use crate::error::CliError;

pub async fn run_delete(id: &str, global: &GlobalArgs) -> Result<(), CliError> {
    let app = open_app(global).await?;
    let id = resolve_item_id(id, &known_items(&app.context).await)?;
    app.context.delete_item(&id).await?;
    println!("Deleted {}", short_id(&id));
    Ok(())
}
