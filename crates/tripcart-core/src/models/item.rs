//! Shopping item model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::currency::{convert, normalize_currency_code, validate_price, validate_rate};
use crate::error::{Error, Result};

/// Identifier of a shopping item.
///
/// Ids minted on this device are UUID v7 strings; ids assigned by the backend
/// are kept verbatim, so the inner value is treated as opaque text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Mint a new client-side id
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ItemId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("item id must not be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A tracked purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub id: ItemId,
    pub name: String,
    /// Photo reference (URL or storage path)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Price in the currency it was paid in
    pub price_original: f64,
    /// Price in the traveller's home currency
    pub price_converted: f64,
    pub original_currency: String,
    pub converted_currency: String,
    pub exchange_rate: f64,
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub purchased: bool,
    pub created_at: DateTime<Utc>,
    /// Last write time; the only field consulted when resolving conflicts
    pub updated_at: DateTime<Utc>,
    /// Owner, attached by the remote store; absent while only queued locally
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ShoppingItem {
    /// Refresh `updated_at` to the mutation time.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }

    /// Check if name matches a case-insensitive substring query
    #[must_use]
    pub fn matches_name(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

/// User-entered draft of a new purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShoppingItem {
    pub name: String,
    pub photo: Option<String>,
    pub price_original: f64,
    pub original_currency: String,
    pub converted_currency: String,
    pub exchange_rate: f64,
}

impl NewShoppingItem {
    /// Draft priced in a single currency (no conversion).
    pub fn new(name: impl Into<String>, price: f64, currency: impl Into<String>) -> Self {
        let currency = currency.into();
        Self {
            name: name.into(),
            photo: None,
            price_original: price,
            original_currency: currency.clone(),
            converted_currency: currency,
            exchange_rate: 1.0,
        }
    }

    /// Convert into `currency` at `rate` units per original unit
    #[must_use]
    pub fn with_conversion(mut self, currency: impl Into<String>, rate: f64) -> Self {
        self.converted_currency = currency.into();
        self.exchange_rate = rate;
        self
    }

    #[must_use]
    pub fn with_photo(mut self, photo: impl Into<String>) -> Self {
        self.photo = Some(photo.into());
        self
    }

    /// Validate the draft and build an item stamped at `now`
    pub fn into_item(self, now: DateTime<Utc>) -> Result<ShoppingItem> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidInput("item name cannot be empty".into()));
        }
        let price_original = validate_price(self.price_original)?;
        let exchange_rate = validate_rate(self.exchange_rate)?;
        let original_currency = normalize_currency_code(&self.original_currency)?;
        let converted_currency = normalize_currency_code(&self.converted_currency)?;

        Ok(ShoppingItem {
            id: ItemId::new(),
            name,
            photo: crate::util::normalize_text_option(self.photo),
            price_original,
            price_converted: convert(price_original, exchange_rate),
            original_currency,
            converted_currency,
            exchange_rate,
            liked: false,
            purchased: false,
            created_at: now,
            updated_at: now,
            user_id: None,
        })
    }
}

/// Partial update of an item; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub photo: Option<String>,
    pub liked: Option<bool>,
    pub purchased: Option<bool>,
    pub price_original: Option<f64>,
    pub converted_currency: Option<String>,
    pub exchange_rate: Option<f64>,
}

impl ItemPatch {
    #[must_use]
    pub fn liked(liked: bool) -> Self {
        Self {
            liked: Some(liked),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn purchased(purchased: bool) -> Self {
        Self {
            purchased: Some(purchased),
            ..Self::default()
        }
    }

    /// Apply the patch and refresh `updated_at`.
    ///
    /// The item is left untouched when any field fails validation.
    pub fn apply(&self, item: &mut ShoppingItem, now: DateTime<Utc>) -> Result<()> {
        let mut next = item.clone();

        if let Some(name) = &self.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::InvalidInput("item name cannot be empty".into()));
            }
            next.name = name.to_string();
        }
        if let Some(photo) = &self.photo {
            next.photo = crate::util::normalize_text_option(Some(photo.clone()));
        }
        if let Some(liked) = self.liked {
            next.liked = liked;
        }
        if let Some(purchased) = self.purchased {
            next.purchased = purchased;
        }

        let reprice = self.price_original.is_some()
            || self.exchange_rate.is_some()
            || self.converted_currency.is_some();
        if let Some(price) = self.price_original {
            next.price_original = validate_price(price)?;
        }
        if let Some(rate) = self.exchange_rate {
            next.exchange_rate = validate_rate(rate)?;
        }
        if let Some(currency) = &self.converted_currency {
            next.converted_currency = normalize_currency_code(currency)?;
        }
        if reprice {
            next.price_converted = convert(next.price_original, next.exchange_rate);
        }

        next.touch(now);
        *item = next;
        Ok(())
    }
}
