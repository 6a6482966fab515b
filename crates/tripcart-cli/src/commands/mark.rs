use tripcart_core::ItemPatch;

use crate::cli::GlobalArgs;
use crate::commands::common::{known_items, open_app, resolve_item_id, short_id};
use crate::error::CliError;

/// Flag edits exposed as subcommands
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mark {
    Like,
    Unlike,
    Purchase,
    Unpurchase,
}

impl Mark {
    pub fn patch(self) -> ItemPatch {
        match self {
            Self::Like => ItemPatch::liked(true),
            Self::Unlike => ItemPatch::liked(false),
            Self::Purchase => ItemPatch::purchased(true),
            Self::Unpurchase => ItemPatch::purchased(false),
        }
    }

    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Like => "Liked",
            Self::Unlike => "Unliked",
            Self::Purchase => "Marked purchased",
            Self::Unpurchase => "Marked not purchased",
        }
    }
}

pub async fn run_mark(mark: Mark, id: &str, global: &GlobalArgs) -> Result<(), CliError> {
    let app = open_app(global).await?;
    let id = resolve_item_id(id, &known_items(&app.context).await)?;
    let item = app.context.update_item(&id, &mark.patch()).await?;
    println!("{} {} {}", mark.past_tense(), short_id(&item.id), item.name);
    Ok(())
}
