//! Book create/edit form: the values an admin edits, the rules they must pass and
//! the mapping into the payload the backend accepts.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::api::{
    Book, BookFormat, BookVariant, CreateBookPayload, CreateBookVariant, UpdateBookPayload,
    Visibility,
};
use crate::price::{self, PriceError};
use crate::validation::ValidationErrors;

const TITLE_MAX_CHARS: usize = 255;
const MAX_TAX_PERCENTAGE: f64 = 100.0;
/// The backend keeps stock as an unsigned 32-bit count
const MAX_STOCK_QUANTITY: i64 = u32::MAX as i64;
const API_PATH_SUFFIX: &str = "/api/v1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VariantFormValues {
    pub format: BookFormat,
    #[serde(default)]
    pub original_price: Option<f64>,
    /// Selling price, the discounted one when `original_price` is set
    pub price: f64,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub include_tax: bool,
    #[serde(default)]
    pub tax_percentage: Option<f64>,
}

impl Default for VariantFormValues {
    fn default() -> Self {
        Self {
            format: BookFormat::Paperback,
            original_price: None,
            price: 0.0,
            stock_quantity: 0,
            isbn: Some(String::new()),
            include_tax: false,
            tax_percentage: None,
        }
    }
}

impl VariantFormValues {
    fn from_variant(variant: &BookVariant) -> Result<Self, PriceError> {
        Ok(Self {
            format: variant.format,
            original_price: variant
                .original_price
                .as_ref()
                .map(|money| price::parse_money_amount(&money.amount))
                .transpose()?,
            price: price::parse_money_amount(&variant.price.amount)?,
            stock_quantity: variant.stock_quantity.into(),
            isbn: variant.isbn.clone(),
            include_tax: variant.include_tax.unwrap_or_default(),
            tax_percentage: variant.tax_percentage,
        })
    }

    /// Discount badge shown next to the price
    pub fn discount_percentage(&self) -> u32 {
        price::discount_percentage(self.original_price.unwrap_or_default(), self.price)
    }

    fn validate(&self, index: usize, errors: &mut ValidationErrors) {
        let path = |field: &str| format!("variants.{}.{}", index, field);

        if let Some(original_price) = self.original_price {
            errors.check(
                original_price >= 0.0,
                path("originalPrice"),
                "Original price must be positive",
            );
            errors.check(
                price::has_at_most_two_decimals(original_price),
                path("originalPrice"),
                "Price must have at most 2 decimal places",
            );
        }
        errors.check(
            self.price >= 0.0,
            path("price"),
            "Discounted price must be positive",
        );
        errors.check(
            price::has_at_most_two_decimals(self.price),
            path("price"),
            "Price must have at most 2 decimal places",
        );
        errors.check(
            self.stock_quantity >= 0,
            path("stockQuantity"),
            "Stock quantity must be positive",
        );
        errors.check(
            self.stock_quantity <= MAX_STOCK_QUANTITY,
            path("stockQuantity"),
            "Stock quantity is too large",
        );
        if let Some(tax_percentage) = self.tax_percentage {
            errors.check(
                tax_percentage >= 0.0,
                path("taxPercentage"),
                "Tax must be positive",
            );
            errors.check(
                tax_percentage <= MAX_TAX_PERCENTAGE,
                path("taxPercentage"),
                "Tax cannot exceed 100%",
            );
        }

        if let Some(original_price) = self.original_price.filter(|&p| p > 0.0) {
            errors.check(
                self.price < original_price,
                path("price"),
                "Discounted price must be less than original price",
            );
        }
        if self.include_tax {
            errors.check(
                self.tax_percentage.is_some_and(|tax| tax > 0.0),
                path("taxPercentage"),
                "Tax percentage is required when tax is included",
            );
        }
    }

    fn to_payload(&self) -> CreateBookVariant {
        CreateBookVariant {
            format: self.format,
            original_price_cents: self
                .original_price
                .filter(|&p| p > 0.0)
                .map(price::to_minor_units),
            price_cents: price::to_minor_units(self.price),
            stock_quantity: u32::try_from(self.stock_quantity).unwrap_or(u32::MAX),
            isbn: self.isbn.clone(),
            file_url: None,
            include_tax: Some(self.include_tax),
            tax_percentage: if self.include_tax {
                self.tax_percentage
            } else {
                None
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BookFormValues {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author_name: String,
    pub genre: Option<String>,
    pub slug: Option<String>,
    pub category_ids: Vec<String>,
    pub age_group_ids: Vec<String>,
    pub short_description: String,
    pub bullets: Vec<String>,
    pub cover_image_url: String,
    pub snapshots: Vec<String>,
    pub visibility: Visibility,
    pub is_featured: bool,
    pub is_bestseller: bool,
    pub is_new_release: bool,
    pub allow_reviews: bool,
    pub allow_wishlist: bool,
    pub meta_title: String,
    pub meta_description: String,
    pub variants: Vec<VariantFormValues>,
}

impl Default for BookFormValues {
    fn default() -> Self {
        Self::new_book()
    }
}

impl BookFormValues {
    /// Values of an empty create form
    pub fn new_book() -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            description: String::new(),
            author_name: String::new(),
            genre: Some("fantasy".to_string()),
            slug: None,
            category_ids: vec![],
            age_group_ids: vec![],
            short_description: String::new(),
            bullets: vec![],
            cover_image_url: String::new(),
            snapshots: vec![],
            visibility: Visibility::Draft,
            is_featured: false,
            is_bestseller: false,
            is_new_release: true,
            allow_reviews: true,
            allow_wishlist: true,
            meta_title: String::new(),
            meta_description: String::new(),
            variants: vec![VariantFormValues::default()],
        }
    }

    /// Values of the edit form for an existing book
    pub fn from_book(book: &Book) -> Result<Self, PriceError> {
        Ok(Self {
            title: book.title.clone(),
            subtitle: book.subtitle.clone().unwrap_or_default(),
            description: book.description.clone().unwrap_or_default(),
            author_name: book.author_name.clone(),
            genre: Some(book.genre.clone().unwrap_or_default()),
            slug: Some(book.slug.clone()),
            category_ids: book.category_ids.clone(),
            age_group_ids: book.age_group_ids.clone(),
            short_description: book.short_description.clone().unwrap_or_default(),
            bullets: book.bullets.clone(),
            cover_image_url: book.cover_image_url.clone().unwrap_or_default(),
            snapshots: book.snapshot_urls.clone(),
            visibility: Visibility::parse_lenient(&book.visibility),
            is_featured: book.is_featured,
            is_bestseller: book.is_bestseller,
            is_new_release: book.is_new_release,
            allow_reviews: book.allow_reviews,
            allow_wishlist: book.allow_wishlist,
            meta_title: book.meta_title.clone().unwrap_or_default(),
            meta_description: book.meta_description.clone().unwrap_or_default(),
            variants: book
                .variants
                .iter()
                .map(VariantFormValues::from_variant)
                .collect::<Result<_, _>>()?,
        })
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        errors.check(!self.title.is_empty(), "title", "Title is required");
        errors.check(
            self.title.chars().count() <= TITLE_MAX_CHARS,
            "title",
            "Title must be at most 255 characters",
        );
        errors.check(
            !self.author_name.is_empty(),
            "authorName",
            "Author name is required",
        );
        errors.check(
            self.cover_image_url.is_empty() || Url::parse(&self.cover_image_url).is_ok(),
            "coverImageUrl",
            "Valid URL required",
        );
        errors.check(
            !self.variants.is_empty(),
            "variants",
            "At least one variant is required",
        );
        for (index, variant) in self.variants.iter().enumerate() {
            variant.validate(index, &mut errors);
        }

        errors.into_result()
    }

    /// Maps the form shape to the create payload. `api_base_url` resolves relative snapshot urls
    pub fn to_payload(&self, api_base_url: &str) -> CreateBookPayload {
        CreateBookPayload {
            title: self.title.clone(),
            subtitle: Some(self.subtitle.clone()),
            description: Some(self.description.clone()),
            short_description: Some(self.short_description.clone()),
            bullets: self.bullets.clone(),
            author_name: self.author_name.clone(),
            slug: self.slug.clone().filter(|slug| !slug.is_empty()),
            genre: self
                .genre
                .as_deref()
                .filter(|genre| !genre.is_empty())
                .map(str::to_lowercase),
            cover_image_url: Some(self.cover_image_url.clone()).filter(|url| !url.is_empty()),
            snapshots: self
                .snapshots
                .iter()
                .filter(|url| !url.is_empty())
                .map(|url| normalize_snapshot_url(url, api_base_url))
                .collect(),
            visibility: Some(self.visibility),
            is_bestseller: Some(self.is_bestseller),
            is_featured: Some(self.is_featured),
            is_new_release: Some(self.is_new_release),
            allow_reviews: Some(self.allow_reviews),
            allow_wishlist: Some(self.allow_wishlist),
            category_ids: self.category_ids.clone(),
            age_group_ids: self.age_group_ids.clone(),
            meta_title: Some(self.meta_title.clone()),
            meta_description: Some(self.meta_description.clone()),
            variants: self.variants.iter().map(VariantFormValues::to_payload).collect(),
        }
    }

    /// Validates and maps in one go, nothing is produced for an invalid form
    pub fn submit(&self, api_base_url: &str) -> Result<CreateBookPayload, ValidationErrors> {
        self.validate()?;
        Ok(self.to_payload(api_base_url))
    }

    /// Maps the edit form to the update payload. A cleared cover url is sent empty,
    /// leaving it out would keep the stored cover
    pub fn to_update_payload(&self, api_base_url: &str) -> UpdateBookPayload {
        let mut payload = UpdateBookPayload::from(self.to_payload(api_base_url));
        payload.cover_image_url = Some(self.cover_image_url.clone());
        payload
    }

    pub fn submit_update(&self, api_base_url: &str) -> Result<UpdateBookPayload, ValidationErrors> {
        self.validate()?;
        Ok(self.to_update_payload(api_base_url))
    }
}

/// The backend rejects `localhost` hosts and relative paths in snapshot urls
pub fn normalize_snapshot_url(url: &str, api_base_url: &str) -> String {
    if url.starts_with("http") {
        return url.replacen("localhost", "127.0.0.1", 1);
    }

    let trimmed_base = api_base_url.trim_end_matches('/');
    let origin = trimmed_base
        .strip_suffix(API_PATH_SUFFIX)
        .unwrap_or(trimmed_base)
        .replacen("localhost", "127.0.0.1", 1);
    let separator = if url.starts_with('/') { "" } else { "/" };
    format!("{}{}{}", origin, separator, url)
}
