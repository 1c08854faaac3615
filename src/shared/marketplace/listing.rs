//! Listing Data Structures
//!
//! A listing is an item offered for sale. Listings are created by their
//! owner, browsed by everyone, and become unavailable once purchased.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Default page size for browse results
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound on a single browse page
pub const MAX_PAGE_SIZE: u32 = 100;

/// Listing category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electronics,
    Clothing,
    Home,
    Books,
    Sports,
    Toys,
    Furniture,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Electronics,
        Category::Clothing,
        Category::Home,
        Category::Books,
        Category::Sports,
        Category::Toys,
        Category::Furniture,
        Category::Other,
    ];

    /// Storage/wire name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "electronics",
            Category::Clothing => "clothing",
            Category::Home => "home",
            Category::Books => "books",
            Category::Sports => "sports",
            Category::Toys => "toys",
            Category::Furniture => "furniture",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = SharedError;

    /// Case-insensitive parse, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| {
                SharedError::validation(
                    "category",
                    format!(
                        "Invalid category '{}'. Expected one of: {}",
                        s.trim(),
                        Category::ALL.map(|c| c.as_str()).join(", ")
                    ),
                )
            })
    }
}

/// An item offered for sale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub price: f64,
    pub owner_id: Uuid,
    pub is_available: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Build a fresh, available listing from validated input
    pub fn new(owner_id: Uuid, input: NewListing) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            category: input.category,
            price: input.price,
            owner_id,
            is_available: true,
            image_url: input.image_url,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, account_id: Uuid) -> bool {
        self.owner_id == account_id
    }

    /// Apply a validated partial update in place
    pub fn apply(&mut self, update: ListingUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(image_url) = update.image_url {
            self.image_url = Some(image_url);
        }
        self.updated_at = Utc::now();
    }
}

/// Compact listing view embedded in cart, purchase and chat responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    pub id: Uuid,
    pub title: String,
    pub image_url: Option<String>,
    pub price: f64,
}

impl From<&Listing> for ListingSummary {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id,
            title: listing.title.clone(),
            image_url: listing.image_url.clone(),
            price: listing.price,
        }
    }
}

fn required_text(field: &str, value: Option<&str>) -> Result<String, SharedError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(SharedError::validation(field, format!("{} is required", field))),
    }
}

/// Parse and check a price. Prices are non-negative and finite.
pub fn parse_price(raw: &str) -> Result<f64, SharedError> {
    let price: f64 = raw
        .trim()
        .parse()
        .map_err(|_| SharedError::validation("price", "Price must be a valid number"))?;
    validate_price(price)
}

pub fn validate_price(price: f64) -> Result<f64, SharedError> {
    if !price.is_finite() || price < 0.0 {
        return Err(SharedError::validation(
            "price",
            "Price must be a valid non-negative number",
        ));
    }
    Ok(price)
}

/// Validated input for a new listing
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub price: f64,
    pub image_url: Option<String>,
}

/// Raw listing fields as they arrive in a form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
}

impl ListingForm {
    /// Validate every field required to create a listing
    pub fn into_new_listing(self) -> Result<NewListing, SharedError> {
        let missing: Vec<&str> = [
            ("title", &self.title),
            ("description", &self.description),
            ("category", &self.category),
            ("price", &self.price),
        ]
        .into_iter()
        .filter(|(_, v)| v.as_deref().map(str::trim).unwrap_or("").is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(SharedError::validation(
                missing[0],
                format!(
                    "All fields are required: title, description, category, price (missing: {})",
                    missing.join(", ")
                ),
            ));
        }

        Ok(NewListing {
            title: required_text("title", self.title.as_deref())?,
            description: required_text("description", self.description.as_deref())?,
            category: self.category.as_deref().unwrap_or_default().parse()?,
            price: parse_price(self.price.as_deref().unwrap_or_default())?,
            image_url: None,
        })
    }

    /// Validate only the fields that were supplied
    pub fn into_update(self) -> Result<ListingUpdate, SharedError> {
        let title = match self.title {
            Some(t) => Some(required_text("title", Some(&t))?),
            None => None,
        };
        let description = match self.description {
            Some(d) => Some(required_text("description", Some(&d))?),
            None => None,
        };
        let category = match self.category {
            Some(c) => Some(c.parse()?),
            None => None,
        };
        let price = match self.price {
            Some(p) => Some(parse_price(&p)?),
            None => None,
        };
        Ok(ListingUpdate {
            title,
            description,
            category,
            price,
            image_url: None,
        })
    }
}

/// Validated partial update for a listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
}

impl ListingUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.image_url.is_none()
    }
}

/// Raw browse query parameters (`GET /api/products`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Normalized browse query. Only available listings are ever returned.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub search: Option<String>,
    pub category: Option<Category>,
    pub page: u32,
    pub limit: u32,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListingQuery {
    pub fn from_params(params: ListingParams) -> Result<Self, SharedError> {
        let search = params
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let category = match params.category.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => Some(c.parse()?),
            _ => None,
        };
        Ok(Self {
            search,
            category,
            page: params.page.unwrap_or(1).max(1),
            limit: params
                .limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Case-insensitive substring match on title or description
    pub fn matches(&self, listing: &Listing) -> bool {
        if !listing.is_available {
            return false;
        }
        if let Some(category) = self.category {
            if listing.category != category {
                return false;
            }
        }
        match &self.search {
            Some(needle) => {
                let needle = needle.to_lowercase();
                listing.title.to_lowercase().contains(&needle)
                    || listing.description.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}
