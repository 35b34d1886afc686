use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ServiceError, ServiceResult};
use crate::store::{Document, Model};

/// A dish on the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Assigned by the store on insert; empty before that.
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default = "available_by_default")]
    pub available: bool,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: String,
}

impl Model for MenuItem {
    const COLLECTION: &'static str = "menu";

    fn id(&self) -> &str {
        &self.id
    }
}

impl MenuItem {
    pub fn new(name: impl Into<String>, price: Decimal, category: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            description: String::new(),
            price,
            available: true,
            category: category.into(),
            image_url: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    pub(crate) fn validate(&self) -> ServiceResult<()> {
        check_price(self.price)
    }
}

/// Partial update for a menu item. Only the fields that are set change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl MenuItemPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The `$set`-style document for this patch.
    pub(crate) fn into_document(self) -> ServiceResult<Document> {
        if let Some(price) = self.price {
            check_price(price)?;
        }
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Ok(Document::new()),
            Err(e) => Err(ServiceError::Invalid(e.to_string())),
        }
    }
}

fn available_by_default() -> bool {
    true
}

fn check_price(price: Decimal) -> ServiceResult<()> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ServiceError::Invalid(format!(
            "price must not be negative, got {}",
            price
        )));
    }
    Ok(())
}
