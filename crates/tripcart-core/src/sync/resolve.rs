use crate::models::ShoppingItem;

/// What to do with one queued item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No remote row with this id
    Create,
    /// Local copy is newer; overwrite the remote row
    Update,
    /// Remote row is newer; drop the local change
    KeepRemote,
    /// Same `updated_at` on both sides
    InSync,
}

/// Last write wins on `updated_at`; no field-level merge.
pub fn resolve(local: &ShoppingItem, remote: Option<&ShoppingItem>) -> Resolution {
    let Some(remote) = remote else {
        return Resolution::Create;
    };

    match local.updated_at.cmp(&remote.updated_at) {
        std::cmp::Ordering::Greater => Resolution::Update,
        std::cmp::Ordering::Less => Resolution::KeepRemote,
        std::cmp::Ordering::Equal => Resolution::InSync,
    }
}
