use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use bookstore_admin::api::{
    AgeGroup, AuthResponse, Book, BookQueryParams, BookVariant, Category, CreateAgeGroupPayload,
    CreateBookPayload, CreateCategoryPayload, FindAllBooksResponse, ListParams, Money, OrderUser,
    PageMeta, PaymentProvider, RefundRequest, SignIn, Transaction, TransactionOrder,
    TransactionQueryParams, TransactionStatus, TransactionsMeta, TransactionsResponse,
    UpdateAgeGroupPayload, UpdateBookPayload, UpdateCategoryPayload, Visibility, VisibilityFilter,
};
use bookstore_admin::price::{discount_percentage, format_minor_units, to_major_units};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::catalog_store::{slugify, CatalogStore, CatalogStoreError, RecordedRequest};

const CURRENCY: &str = "INR";
const DEFAULT_PAGE_SIZE: u32 = 10;

pub const ADMIN_EMAIL: &str = "admin@bookstore.test";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const CUSTOMER_EMAIL: &str = "reader@bookstore.test";
pub const CUSTOMER_PASSWORD: &str = "reader123";

const SEED_CATEGORIES: [(&str, &str); 6] = [
    ("550e8400-e29b-41d4-a716-446655440000", "Fiction"),
    ("550e8400-e29b-41d4-a716-446655440001", "Non-Fiction"),
    ("550e8400-e29b-41d4-a716-446655440002", "Science Fiction"),
    ("550e8400-e29b-41d4-a716-446655440003", "Mystery"),
    ("550e8400-e29b-41d4-a716-446655440004", "Children"),
    ("550e8400-e29b-41d4-a716-446655440005", "Self-Help"),
];

const SEED_AGE_GROUPS: [(&str, &str); 6] = [
    ("550e8400-e29b-41d4-a716-446655440010", "0-2 Years"),
    ("550e8400-e29b-41d4-a716-446655440011", "3-5 Years"),
    ("550e8400-e29b-41d4-a716-446655440012", "6-8 Years"),
    ("550e8400-e29b-41d4-a716-446655440013", "9-12 Years"),
    ("550e8400-e29b-41d4-a716-446655440014", "Teens"),
    ("550e8400-e29b-41d4-a716-446655440015", "Adults"),
];

struct StubUser {
    user_id: i64,
    email: &'static str,
    password: &'static str,
    role: &'static str,
}

const USERS: [StubUser; 2] = [
    StubUser {
        user_id: 1,
        email: ADMIN_EMAIL,
        password: ADMIN_PASSWORD,
        role: "admin",
    },
    StubUser {
        user_id: 2,
        email: CUSTOMER_EMAIL,
        password: CUSTOMER_PASSWORD,
        role: "customer",
    },
];

/// Book as written by the admin, rendered into [`Book`] on every read
struct StoredBook {
    id: String,
    sequence: u64,
    created_at: String,
    updated_at: String,
    details: CreateBookPayload,
}

impl StoredBook {
    fn slug(&self) -> String {
        self.details
            .slug
            .clone()
            .filter(|slug| !slug.is_empty())
            .unwrap_or_else(|| slugify(&self.details.title))
    }

    fn visibility(&self) -> Visibility {
        self.details.visibility.unwrap_or_default()
    }

    fn to_book(&self) -> Book {
        let details = &self.details;
        let variants = details
            .variants
            .iter()
            .enumerate()
            .map(|(index, variant)| BookVariant {
                id: format!("{}-{}", self.id, index),
                format: variant.format,
                original_price: variant.original_price_cents.map(money),
                price: money(variant.price_cents),
                discount_percentage: variant
                    .original_price_cents
                    .filter(|&original| original > variant.price_cents)
                    .map(|original| {
                        discount_percentage(
                            to_major_units(original),
                            to_major_units(variant.price_cents),
                        )
                    }),
                stock_quantity: variant.stock_quantity,
                isbn: variant.isbn.clone(),
                include_tax: variant.include_tax,
                tax_percentage: variant.tax_percentage,
            })
            .collect();

        Book {
            id: self.id.clone(),
            title: details.title.clone(),
            subtitle: details.subtitle.clone(),
            description: details.description.clone(),
            short_description: details.short_description.clone(),
            bullets: details.bullets.clone(),
            slug: self.slug(),
            author_name: details.author_name.clone(),
            author_id: None,
            cover_image_url: details
                .cover_image_url
                .clone()
                .filter(|url| !url.is_empty()),
            snapshots: details.snapshots.clone(),
            snapshot_urls: details.snapshots.clone(),
            variants,
            category_ids: details.category_ids.clone(),
            age_group_ids: details.age_group_ids.clone(),
            genre: details.genre.clone(),
            is_featured: details.is_featured.unwrap_or_default(),
            is_bestseller: details.is_bestseller.unwrap_or_default(),
            is_new_release: details.is_new_release.unwrap_or_default(),
            allow_reviews: details.allow_reviews.unwrap_or(true),
            allow_wishlist: details.allow_wishlist.unwrap_or(true),
            visibility: json!(self.visibility())
                .as_str()
                .unwrap_or("draft")
                .to_string(),
            meta_title: details.meta_title.clone(),
            meta_description: details.meta_description.clone(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }
}

fn money(minor: i64) -> Money {
    Money {
        amount: format!("{:.2}", to_major_units(minor)),
        currency: CURRENCY.to_string(),
        display: format_minor_units(minor, CURRENCY),
    }
}

/// Applies a JSON merge patch of `patch` onto `record`
fn merge<T: Serialize + DeserializeOwned, P: Serialize>(
    record: &T,
    patch: &P,
) -> Result<T, CatalogStoreError> {
    let mut merged = serde_json::to_value(record)?;
    json_patch::merge(&mut merged, &serde_json::to_value(patch)?);
    Ok(serde_json::from_value(merged)?)
}

fn page_of<T: Clone>(items: &[T], page: u32, limit: u32) -> Vec<T> {
    let skip = page.saturating_sub(1) as usize * limit as usize;
    items.iter().skip(skip).take(limit as usize).cloned().collect()
}

fn total_pages(total: u64, limit: u32) -> u32 {
    if limit == 0 {
        0
    } else {
        total.div_ceil(u64::from(limit)) as u32
    }
}

fn matches_search(text: &str, search: Option<&str>) -> bool {
    search.map_or(true, |search| {
        text.to_lowercase().contains(&search.to_lowercase())
    })
}

fn seed_transactions() -> Vec<Transaction> {
    let transaction = |id: &str, order_id, amount, status, provider| Transaction {
        id: id.to_string(),
        amount,
        currency: CURRENCY.to_string(),
        status,
        provider,
        created_at: Utc::now().to_rfc3339(),
        gateway_ref_id: Some(format!("gw_{}", id)),
        order: TransactionOrder {
            id: order_id,
            user: OrderUser {
                email: CUSTOMER_EMAIL.to_string(),
                first_name: Some("Riya".to_string()),
                last_name: None,
            },
        },
    };
    vec![
        transaction(
            "txn_001",
            1001,
            499.0,
            TransactionStatus::Success,
            PaymentProvider::Phonepe,
        ),
        transaction(
            "txn_002",
            1002,
            299.5,
            TransactionStatus::Pending,
            PaymentProvider::Razorpay,
        ),
        transaction(
            "txn_003",
            1003,
            150.0,
            TransactionStatus::Failed,
            PaymentProvider::Phonepe,
        ),
    ]
}

pub struct InMemoryCatalogStore {
    sequence_generator: AtomicU64,
    tokens: parking_lot::RwLock<HashSet<String>>,
    books: parking_lot::RwLock<HashMap<String, StoredBook>>,
    categories: parking_lot::RwLock<Vec<Category>>,
    age_groups: parking_lot::RwLock<Vec<AgeGroup>>,
    transactions: parking_lot::RwLock<Vec<Transaction>>,
    uploads: parking_lot::RwLock<Vec<String>>,
    recorded_requests: parking_lot::Mutex<Vec<RecordedRequest>>,
}

impl Default for InMemoryCatalogStore {
    fn default() -> Self {
        let categories = SEED_CATEGORIES
            .iter()
            .map(|(id, name)| Category {
                id: id.to_string(),
                name: name.to_string(),
                slug: slugify(name),
                age_group: String::new(),
                parent_id: None,
                children: vec![],
            })
            .collect();
        let age_groups = SEED_AGE_GROUPS
            .iter()
            .zip(0..)
            .map(|((id, label), sort_order)| AgeGroup {
                id: id.to_string(),
                label: label.to_string(),
                sort_order,
                description: String::new(),
                hero_image: String::new(),
            })
            .collect();

        Self {
            sequence_generator: Default::default(),
            tokens: Default::default(),
            books: Default::default(),
            categories: parking_lot::RwLock::new(categories),
            age_groups: parking_lot::RwLock::new(age_groups),
            transactions: parking_lot::RwLock::new(seed_transactions()),
            uploads: Default::default(),
            recorded_requests: Default::default(),
        }
    }
}

impl InMemoryCatalogStore {
    /// Invalidates every issued token, as an expired session would
    pub fn revoke_tokens(&self) {
        self.tokens.write().clear();
    }

    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.recorded_requests.lock().clone()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.read().clone()
    }

    fn slug_taken(&self, slug: &str, except_id: Option<&str>) -> bool {
        self.books
            .read()
            .values()
            .any(|book| Some(book.id.as_str()) != except_id && book.slug() == slug)
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn login(&self, sign_in: SignIn) -> Result<AuthResponse, CatalogStoreError> {
        let user = USERS
            .iter()
            .find(|user| user.email == sign_in.email && user.password == sign_in.password)
            .ok_or(CatalogStoreError::InvalidCredentials)?;
        if user.role != "admin" {
            return Err(CatalogStoreError::NotAnAdmin);
        }

        let access_token = uuid::Uuid::new_v4().to_string();
        self.tokens.write().insert(access_token.clone());
        Ok(AuthResponse {
            access_token,
            user_id: user.user_id,
            email: user.email.to_string(),
            role: user.role.to_string(),
        })
    }

    fn is_token_valid(&self, token: &str) -> bool {
        self.tokens.read().contains(token)
    }

    fn record_request(&self, request: RecordedRequest) {
        self.recorded_requests.lock().push(request);
    }

    async fn list_books(
        &self,
        params: BookQueryParams,
    ) -> Result<FindAllBooksResponse, CatalogStoreError> {
        let page = params.page.unwrap_or(1).max(1);
        let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        let visibility = match params.visibility {
            Some(VisibilityFilter::Draft) => Some(Visibility::Draft),
            Some(VisibilityFilter::Public) => Some(Visibility::Public),
            Some(VisibilityFilter::Private) => Some(Visibility::Private),
            Some(VisibilityFilter::All) | None => None,
        };

        let books = self.books.read();
        let mut matching: Vec<&StoredBook> = books
            .values()
            .filter(|book| matches_search(&book.details.title, params.search.as_deref()))
            .filter(|book| visibility.map_or(true, |v| book.visibility() == v))
            .collect();
        matching.sort_by(|a, b| b.sequence.cmp(&a.sequence));
        let rendered: Vec<Book> = matching.iter().map(|book| book.to_book()).collect();

        let total_items = rendered.len() as u64;
        Ok(FindAllBooksResponse {
            data: page_of(&rendered, page, limit),
            meta: PageMeta {
                items_per_page: limit,
                total_items,
                current_page: page,
                total_pages: total_pages(total_items, limit),
            },
        })
    }

    async fn get_book(&self, book_id: String) -> Result<Book, CatalogStoreError> {
        self.books
            .read()
            .get(&book_id)
            .map(StoredBook::to_book)
            .ok_or(CatalogStoreError::NotFound(format!("Book {}", book_id)))
    }

    async fn add_book(&self, payload: CreateBookPayload) -> Result<Book, CatalogStoreError> {
        let now = Utc::now().to_rfc3339();
        let book = StoredBook {
            id: uuid::Uuid::new_v4().to_string(),
            sequence: self.sequence_generator.fetch_add(1, Ordering::Relaxed),
            created_at: now.clone(),
            updated_at: now,
            details: payload,
        };
        let slug = book.slug();
        if self.slug_taken(&slug, None) {
            return Err(CatalogStoreError::Conflict(format!(
                "Book with slug '{}' already exists",
                slug
            )));
        }

        let rendered = book.to_book();
        self.books.write().insert(book.id.clone(), book);
        Ok(rendered)
    }

    async fn update_book(
        &self,
        book_id: String,
        patch: UpdateBookPayload,
    ) -> Result<Book, CatalogStoreError> {
        let details = {
            let books = self.books.read();
            let book = books
                .get(&book_id)
                .ok_or(CatalogStoreError::NotFound(format!("Book {}", book_id)))?;
            merge(&book.details, &patch)?
        };
        if let Some(slug) = details.slug.as_deref() {
            if self.slug_taken(slug, Some(&book_id)) {
                return Err(CatalogStoreError::Conflict(format!(
                    "Book with slug '{}' already exists",
                    slug
                )));
            }
        }

        let mut books = self.books.write();
        let book = books
            .get_mut(&book_id)
            .ok_or(CatalogStoreError::NotFound(format!("Book {}", book_id)))?;
        book.details = details;
        book.updated_at = Utc::now().to_rfc3339();
        Ok(book.to_book())
    }

    async fn delete_book(&self, book_id: String) -> Result<(), CatalogStoreError> {
        self.books
            .write()
            .remove(&book_id)
            .map(|_| ())
            .ok_or(CatalogStoreError::NotFound(format!("Book {}", book_id)))
    }

    async fn list_categories(&self, params: ListParams) -> Result<Vec<Category>, CatalogStoreError> {
        let matching: Vec<Category> = self
            .categories
            .read()
            .iter()
            .filter(|category| matches_search(&category.name, params.search.as_deref()))
            .cloned()
            .collect();
        Ok(match params.limit {
            Some(limit) => page_of(&matching, params.page.unwrap_or(1), limit),
            None => matching,
        })
    }

    async fn get_category(&self, category_id: String) -> Result<Category, CatalogStoreError> {
        self.categories
            .read()
            .iter()
            .find(|category| category.id == category_id)
            .cloned()
            .ok_or(CatalogStoreError::NotFound(format!("Category {}", category_id)))
    }

    async fn add_category(
        &self,
        payload: CreateCategoryPayload,
    ) -> Result<Category, CatalogStoreError> {
        let category = Category {
            id: uuid::Uuid::new_v4().to_string(),
            slug: payload
                .slug
                .filter(|slug| !slug.is_empty())
                .unwrap_or_else(|| slugify(&payload.name)),
            name: payload.name,
            age_group: payload.age_group.unwrap_or_default(),
            parent_id: payload.parent_id,
            children: vec![],
        };
        self.categories.write().push(category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        category_id: String,
        patch: UpdateCategoryPayload,
    ) -> Result<Category, CatalogStoreError> {
        let mut categories = self.categories.write();
        let category = categories
            .iter_mut()
            .find(|category| category.id == category_id)
            .ok_or(CatalogStoreError::NotFound(format!("Category {}", category_id)))?;
        *category = merge(&*category, &patch)?;
        Ok(category.clone())
    }

    async fn delete_category(&self, category_id: String) -> Result<(), CatalogStoreError> {
        let mut categories = self.categories.write();
        let before = categories.len();
        categories.retain(|category| category.id != category_id);
        if categories.len() == before {
            return Err(CatalogStoreError::NotFound(format!(
                "Category {}",
                category_id
            )));
        }
        Ok(())
    }

    async fn list_age_groups(&self, params: ListParams) -> Result<Vec<AgeGroup>, CatalogStoreError> {
        let mut matching: Vec<AgeGroup> = self
            .age_groups
            .read()
            .iter()
            .filter(|age_group| matches_search(&age_group.label, params.search.as_deref()))
            .cloned()
            .collect();
        matching.sort_by_key(|age_group| age_group.sort_order);
        Ok(match params.limit {
            Some(limit) => page_of(&matching, params.page.unwrap_or(1), limit),
            None => matching,
        })
    }

    async fn get_age_group(&self, age_group_id: String) -> Result<AgeGroup, CatalogStoreError> {
        self.age_groups
            .read()
            .iter()
            .find(|age_group| age_group.id == age_group_id)
            .cloned()
            .ok_or(CatalogStoreError::NotFound(format!("Age group {}", age_group_id)))
    }

    async fn add_age_group(
        &self,
        payload: CreateAgeGroupPayload,
    ) -> Result<AgeGroup, CatalogStoreError> {
        let mut age_groups = self.age_groups.write();
        let age_group = AgeGroup {
            id: uuid::Uuid::new_v4().to_string(),
            label: payload.label,
            sort_order: payload.sort_order.unwrap_or(age_groups.len() as i32),
            description: payload.description.unwrap_or_default(),
            hero_image: payload.hero_image.unwrap_or_default(),
        };
        age_groups.push(age_group.clone());
        Ok(age_group)
    }

    async fn update_age_group(
        &self,
        age_group_id: String,
        patch: UpdateAgeGroupPayload,
    ) -> Result<AgeGroup, CatalogStoreError> {
        let mut age_groups = self.age_groups.write();
        let age_group = age_groups
            .iter_mut()
            .find(|age_group| age_group.id == age_group_id)
            .ok_or(CatalogStoreError::NotFound(format!("Age group {}", age_group_id)))?;
        *age_group = merge(&*age_group, &patch)?;
        Ok(age_group.clone())
    }

    async fn delete_age_group(&self, age_group_id: String) -> Result<(), CatalogStoreError> {
        let mut age_groups = self.age_groups.write();
        let before = age_groups.len();
        age_groups.retain(|age_group| age_group.id != age_group_id);
        if age_groups.len() == before {
            return Err(CatalogStoreError::NotFound(format!(
                "Age group {}",
                age_group_id
            )));
        }
        Ok(())
    }

    async fn store_upload(&self, file_name: String) -> Result<String, CatalogStoreError> {
        let stored_name = format!("{}-{}", uuid::Uuid::new_v4(), file_name);
        self.uploads.write().push(stored_name.clone());
        Ok(format!("/uploads/{}", stored_name))
    }

    async fn list_transactions(
        &self,
        params: TransactionQueryParams,
    ) -> Result<TransactionsResponse, CatalogStoreError> {
        let matching: Vec<Transaction> = self
            .transactions
            .read()
            .iter()
            .filter(|transaction| params.status.map_or(true, |status| transaction.status == status))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let page = params.page.max(1);
        Ok(TransactionsResponse {
            data: page_of(&matching, page, params.limit),
            meta: TransactionsMeta {
                total,
                page,
                limit: params.limit,
                total_pages: total_pages(total, params.limit),
            },
        })
    }

    async fn refund_transaction(
        &self,
        transaction_id: String,
        refund: RefundRequest,
    ) -> Result<serde_json::Value, CatalogStoreError> {
        let mut transactions = self.transactions.write();
        let transaction = transactions
            .iter_mut()
            .find(|transaction| transaction.id == transaction_id)
            .ok_or(CatalogStoreError::NotFound(format!(
                "Transaction {}",
                transaction_id
            )))?;
        if transaction.status != TransactionStatus::Success {
            return Err(CatalogStoreError::Rejected(
                "Only successful transactions can be refunded".to_string(),
            ));
        }
        let amount = refund.amount.unwrap_or(transaction.amount);
        if amount <= 0.0 || amount > transaction.amount {
            return Err(CatalogStoreError::Rejected(
                "Refund amount must be positive and at most the transaction amount".to_string(),
            ));
        }

        transaction.status = TransactionStatus::Refunded;
        Ok(json!({
            "message": "Refund initiated",
            "transactionId": transaction.id,
            "refundAmount": amount,
            "reason": refund.reason,
        }))
    }
}
