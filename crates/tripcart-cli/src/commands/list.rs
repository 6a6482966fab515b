use tripcart_core::view::ItemFilter;
use tripcart_core::ItemId;

use crate::cli::GlobalArgs;
use crate::commands::common::{format_item_lines, item_to_list_entry, open_app, ItemListEntry};
use crate::error::CliError;

pub async fn run_list(
    filter: &ItemFilter,
    as_json: bool,
    global: &GlobalArgs,
) -> Result<(), CliError> {
    let app = open_app(global).await?;
    let items = app.context.items().await;
    let pending = app
        .context
        .pending()
        .await
        .into_iter()
        .map(|item| item.id)
        .collect::<Vec<ItemId>>();
    let shown = filter.apply(&items);

    if as_json {
        let json_items = shown
            .iter()
            .map(|item| item_to_list_entry(item, pending.contains(&item.id)))
            .collect::<Vec<ItemListEntry>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if shown.is_empty() {
        println!("No items.");
        return Ok(());
    }

    let shown = shown.into_iter().cloned().collect::<Vec<_>>();
    for line in format_item_lines(&shown, &pending) {
        println!("{line}");
    }
    Ok(())
}
