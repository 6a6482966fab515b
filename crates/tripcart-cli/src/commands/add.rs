use tripcart_core::NewShoppingItem;

use crate::cli::GlobalArgs;
use crate::commands::common::{format_item_price, open_app, short_id};
use crate::error::CliError;

pub struct AddArgs {
    pub name: Vec<String>,
    pub price: f64,
    pub currency: String,
    pub to: Option<String>,
    pub rate: Option<f64>,
    pub photo: Option<String>,
}

pub fn build_draft(args: AddArgs) -> Result<NewShoppingItem, CliError> {
    let mut draft = NewShoppingItem::new(args.name.join(" "), args.price, args.currency);
    if let Some(to) = args.to {
        let same_currency = to.trim().eq_ignore_ascii_case(draft.original_currency.trim());
        let rate = match args.rate {
            Some(rate) => rate,
            None if same_currency => 1.0,
            None => {
                return Err(CliError::MissingRate {
                    from: draft.original_currency,
                    to,
                })
            }
        };
        draft = draft.with_conversion(to, rate);
    }
    if let Some(photo) = args.photo {
        draft = draft.with_photo(photo);
    }
    Ok(draft)
}

pub async fn run_add(args: AddArgs, global: &GlobalArgs) -> Result<(), CliError> {
    let draft = build_draft(args)?;
    let app = open_app(global).await?;
    let item = app.context.add_item(draft).await?;

    let queued = app
        .context
        .pending()
        .await
        .iter()
        .any(|pending| pending.id == item.id);
    let where_label = if queued { "queued for sync" } else { "synced" };
    println!(
        "Added {} {} for {} ({where_label})",
        short_id(&item.id),
        item.name,
        format_item_price(&item)
    );
    Ok(())
}
