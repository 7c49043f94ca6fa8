use bookstore_admin::api::{
    BookQueryParams, CreateAgeGroupPayload, CreateCategoryPayload, ListParams,
    TransactionStatus, UpdateCategoryPayload,
};
use bookstore_admin::book_form::BookFormValues;
use bookstore_admin::errors::ApiError;
use bookstore_admin::session::Route;
use bookstore_admin::uploads::{UploadError, UploadKind};
use bookstore_catalog_stub::catalog_store::{
    CatalogStore, ADMIN_EMAIL, ADMIN_PASSWORD, CUSTOMER_EMAIL, CUSTOMER_PASSWORD,
};
use futures_util::future::join3;
use reqwest::StatusCode;

use crate::harness::{book_form, Harness};

#[tokio::test]
/// 1. Logs in with a wrong password - expects a toast and no redirect
/// 2. Logs in as a customer - expects the access denied toast
/// 3. Logs in as the admin - expects a session and a redirect to the books screen
async fn login_outcomes() {
    let harness = Harness::start();
    let auth = harness.console.auth();

    let wrong = auth.login(ADMIN_EMAIL, "wrong").await;
    assert!(matches!(wrong, Err(ApiError::Unauthorized)));
    assert_eq!(harness.errors(), vec!["Invalid email or password"]);
    assert!(harness.navigator.routes().is_empty());

    let customer = auth.login(CUSTOMER_EMAIL, CUSTOMER_PASSWORD).await;
    assert_eq!(customer.unwrap_err().status(), Some(StatusCode::FORBIDDEN));
    assert_eq!(
        harness.errors().last().unwrap(),
        "Access Denied: You do not have administrator privileges."
    );
    assert!(!harness.console.session().is_authenticated());

    let admin = auth
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("Failed to log in");
    assert_eq!(admin.email, ADMIN_EMAIL);
    assert_eq!(harness.successes(), vec!["Login successful"]);
    assert_eq!(harness.navigator.routes(), vec![Route::Books]);

    let user = auth.current_user();
    assert_eq!(user.name, "admin");
    assert_eq!(user.email, ADMIN_EMAIL);
}

#[tokio::test]
async fn guard_follows_the_session() {
    let harness = Harness::start();
    assert_eq!(
        harness.console.session().guard("/admin/books"),
        Some(Route::Login)
    );
    assert_eq!(harness.console.session().guard("/login"), None);

    harness
        .console
        .auth()
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .unwrap();
    assert_eq!(
        harness.console.session().guard("/login"),
        Some(Route::Books)
    );
    assert_eq!(harness.console.session().guard("/admin/categories"), None);
}

#[tokio::test]
/// 1. Submits the form of a new book
/// 2. Checks the body the server got carries prices in minor units
/// 3. Checks the toast and the redirect to the listing
async fn creating_a_book_sends_minor_units() {
    let harness = Harness::start_logged_in().await;

    let book = harness
        .console
        .books()
        .submit_form(&book_form("The Hobbit"), None)
        .await
        .expect("Failed to create book");
    assert_eq!(book.slug, "the-hobbit");
    assert_eq!(book.variants[0].price.amount, "299.99");

    let requests = harness.stub.store.recorded_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/api/v1/admin/books");
    let variant = &requests[0].body["variants"][0];
    assert_eq!(variant["priceCents"], 29999);
    assert_eq!(variant["originalPriceCents"], 39900);
    assert_eq!(variant["taxPercentage"], 5.0);
    assert_eq!(requests[0].body["visibility"], "draft");
    assert_eq!(requests[0].body["genre"], "fantasy");

    assert_eq!(
        harness.successes(),
        vec!["Login successful", "Book created successfully"]
    );
    assert_eq!(harness.navigator.routes(), vec![Route::Books, Route::Books]);
}

#[tokio::test]
async fn invalid_form_is_never_sent() {
    let harness = Harness::start_logged_in().await;
    let mut form = book_form("");
    form.variants[0].price = 450.0;

    let result = harness.console.books().submit_form(&form, None).await;

    let errors = match result {
        Err(ApiError::Validation(errors)) => errors,
        other => panic!("Expected validation errors, got {:?}", other),
    };
    assert_eq!(errors.messages_for("title"), vec!["Title is required"]);
    assert_eq!(
        errors.messages_for("variants.0.price"),
        vec!["Discounted price must be less than original price"]
    );
    assert!(harness.stub.store.recorded_requests().is_empty());
    assert!(harness.errors().is_empty());
}

#[tokio::test]
/// 1. Lists books - nothing there yet
/// 2. Adds a book behind the console's back - the cached list still answers
/// 3. Creates a book through the console - lists are refetched and show both
async fn creating_a_book_refreshes_cached_lists() {
    let harness = Harness::start_logged_in().await;
    let books = harness.console.books();
    let params = BookQueryParams::default();

    assert!(books.list(&params).await.unwrap().data.is_empty());

    harness
        .stub
        .store
        .add_book(book_form("Dune").to_payload(&harness.stub.api_url()))
        .await
        .unwrap();
    assert!(books.list(&params).await.unwrap().data.is_empty());

    books
        .submit_form(&book_form("Emma"), None)
        .await
        .expect("Failed to create book");

    let listed = books.list(&params).await.unwrap();
    let titles: Vec<_> = listed.data.iter().map(|book| book.title.as_str()).collect();
    assert_eq!(titles, vec!["Emma", "Dune"]);
    assert_eq!(listed.meta.total_items, 2);
}

#[tokio::test]
/// 1. Creates a book and loads its edit form
/// 2. Changes title and price, then submits as an update
/// 3. Checks the stored book and the detail served from cache
async fn editing_a_book_round_trips_prices() {
    let harness = Harness::start_logged_in().await;
    let books = harness.console.books();
    let created = books
        .submit_form(&book_form("Persuasion"), None)
        .await
        .unwrap();

    let loaded = books.get(&created.id).await.unwrap();
    let mut form = BookFormValues::from_book(&loaded).unwrap();
    assert_eq!(form.variants[0].price, 299.99);
    assert_eq!(form.variants[0].original_price, Some(399.0));
    assert_eq!(form.variants[0].discount_percentage(), 25);

    form.title = "Persuasion (Annotated)".to_string();
    form.variants[0].price = 249.5;
    let updated = books
        .submit_form(&form, Some(&created.id))
        .await
        .expect("Failed to update book");
    assert_eq!(updated.variants[0].price.amount, "249.50");

    let stored = harness.stub.store.get_book(created.id.clone()).await.unwrap();
    assert_eq!(stored.title, "Persuasion (Annotated)");

    let update_request = harness.stub.store.recorded_requests().pop().unwrap();
    assert_eq!(update_request.method, "PUT");
    assert_eq!(update_request.body["variants"][0]["priceCents"], 24950);

    // Changed behind the console's back, the detail entry set by the update still answers
    harness
        .stub
        .store
        .delete_book(created.id.clone())
        .await
        .unwrap();
    assert_eq!(books.get(&created.id).await.unwrap().title, "Persuasion (Annotated)");
    assert!(harness
        .successes()
        .contains(&"Book updated successfully".to_string()));
}

#[tokio::test]
/// 1. Creates a book with a cover
/// 2. Clears the cover in its edit form and submits the update
/// 3. Expects the update body to carry the empty cover and the stored book to have none
async fn clearing_the_cover_removes_it() {
    let harness = Harness::start_logged_in().await;
    let books = harness.console.books();
    let mut form = book_form("Middlemarch");
    form.cover_image_url = "http://127.0.0.1:9000/cover.png".to_string();
    let created = books.submit_form(&form, None).await.unwrap();
    assert_eq!(
        created.cover_image_url.as_deref(),
        Some("http://127.0.0.1:9000/cover.png")
    );

    let mut edit_form = BookFormValues::from_book(&created).unwrap();
    edit_form.cover_image_url.clear();
    let updated = books
        .submit_form(&edit_form, Some(&created.id))
        .await
        .expect("Failed to update book");

    let update_request = harness.stub.store.recorded_requests().pop().unwrap();
    assert_eq!(update_request.method, "PUT");
    assert_eq!(update_request.body["coverImageUrl"], "");
    assert_eq!(updated.cover_image_url, None);
    let stored = harness.stub.store.get_book(created.id.clone()).await.unwrap();
    assert_eq!(stored.cover_image_url, None);
    assert_eq!(BookFormValues::from_book(&stored).unwrap().cover_image_url, "");
}

#[tokio::test]
async fn backend_message_is_shown_for_a_failed_create() {
    let harness = Harness::start_logged_in().await;
    let books = harness.console.books();
    books.submit_form(&book_form("Ulysses"), None).await.unwrap();

    let duplicate = books.submit_form(&book_form("Ulysses"), None).await;

    assert_eq!(duplicate.unwrap_err().status(), Some(StatusCode::CONFLICT));
    assert_eq!(
        harness.errors(),
        vec!["Book with slug 'ulysses' already exists"]
    );
}

#[tokio::test]
async fn deleting_a_book_drops_its_detail() {
    let harness = Harness::start_logged_in().await;
    let books = harness.console.books();
    let book = books.submit_form(&book_form("Beloved"), None).await.unwrap();
    books.get(&book.id).await.unwrap();

    books.delete(&book.id).await.expect("Failed to delete");

    let missing = books.get(&book.id).await;
    assert_eq!(missing.unwrap_err().status(), Some(StatusCode::NOT_FOUND));
    assert!(harness
        .successes()
        .contains(&"Book deleted successfully".to_string()));
}

#[tokio::test]
/// 1. Logs in and revokes the token on the server
/// 2. Runs three queries at once - all fail with 401
/// 3. Expects exactly one redirect to login and the token gone
/// 4. Logs in again, revokes again - expects another single redirect
async fn expired_session_redirects_to_login_once() {
    let harness = Harness::start_logged_in().await;
    harness.stub.store.revoke_tokens();

    let params = ListParams::default();
    let (books, categories, age_groups) = join3(
        harness.console.books().list(&BookQueryParams::default()),
        harness.console.categories().list(&params),
        harness.console.age_groups().list(&params),
    )
    .await;
    assert!(books.unwrap_err().is_unauthorized());
    assert!(categories.unwrap_err().is_unauthorized());
    assert!(age_groups.unwrap_err().is_unauthorized());

    assert_eq!(harness.navigator.routes(), vec![Route::Books, Route::Login]);
    assert!(harness.console.session().current().is_none());
    assert!(harness.errors().is_empty());

    harness
        .console
        .auth()
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .unwrap();
    harness.stub.store.revoke_tokens();
    let refund = harness
        .console
        .transactions()
        .refund("txn_001", None, None)
        .await;
    assert!(refund.unwrap_err().is_unauthorized());
    assert_eq!(
        harness.navigator.routes(),
        vec![Route::Books, Route::Login, Route::Books, Route::Login]
    );
}

#[tokio::test]
async fn form_options_come_from_categories_and_age_groups() {
    let harness = Harness::start_logged_in().await;

    let options = harness.console.books().form_options().await.unwrap();

    assert_eq!(options.categories.len(), 6);
    assert_eq!(options.categories[0].name, "Fiction");
    assert_eq!(options.age_groups.len(), 6);
    assert_eq!(options.age_groups[5].label, "Adults");
}

#[tokio::test]
/// 1. Creates, renames and deletes a category
/// 2. Deletes it again - expects the backend message as a toast
async fn category_lifecycle() {
    let harness = Harness::start_logged_in().await;
    let categories = harness.console.categories();
    let params = ListParams::default();
    assert_eq!(categories.list(&params).await.unwrap().data.len(), 6);

    let created = categories
        .create(&CreateCategoryPayload {
            name: "Graphic Novels".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.slug, "graphic-novels");
    assert_eq!(categories.list(&params).await.unwrap().data.len(), 7);

    let renamed = categories
        .update(
            &created.id,
            &UpdateCategoryPayload {
                name: Some("Comics".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Comics");
    assert_eq!(renamed.slug, "graphic-novels");
    assert_eq!(categories.get(&created.id).await.unwrap().name, "Comics");

    categories.delete(&created.id).await.unwrap();
    assert!(categories.delete(&created.id).await.is_err());

    assert_eq!(
        harness.successes(),
        vec![
            "Login successful",
            "Category created successfully",
            "Category updated successfully",
            "Category deleted successfully",
        ]
    );
    assert_eq!(
        harness.errors(),
        vec![format!("Category {} not found", created.id)]
    );
}

#[tokio::test]
async fn age_groups_are_listed_in_sort_order() {
    let harness = Harness::start_logged_in().await;
    let age_groups = harness.console.age_groups();

    age_groups
        .create(&CreateAgeGroupPayload {
            label: "Newborn".to_string(),
            sort_order: Some(-1),
            ..Default::default()
        })
        .await
        .unwrap();

    let listed = age_groups.list(&ListParams::default()).await.unwrap();
    assert_eq!(listed.data.len(), 7);
    assert_eq!(listed.data[0].label, "Newborn");
    assert_eq!(
        harness.successes().last().unwrap(),
        "Age group created successfully"
    );
}

#[tokio::test]
/// 1. Uploads a cover image - expects a url under /uploads
/// 2. Tries a text file as an image - rejected before sending
async fn uploads_are_checked_before_sending() {
    let harness = Harness::start_logged_in().await;
    let dir = tempfile::tempdir().unwrap();
    let cover = dir.path().join("cover.png");
    std::fs::write(&cover, b"\x89PNG\r\n\x1a\nfake image").unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, b"plain text").unwrap();

    let uploaded = harness
        .console
        .books()
        .upload_file(&cover, UploadKind::Image)
        .await
        .expect("Failed to upload");
    assert!(uploaded.url.starts_with(&harness.stub.address));
    assert!(uploaded.url.contains("/uploads/"));
    assert!(uploaded.url.ends_with("cover.png"));

    let rejected = harness
        .console
        .books()
        .upload_file(&notes, UploadKind::Image)
        .await;
    assert!(matches!(
        rejected,
        Err(ApiError::Upload(UploadError::NotAnImage))
    ));

    assert_eq!(harness.stub.store.uploads().len(), 1);
    assert!(harness
        .successes()
        .contains(&"File uploaded successfully".to_string()));
    assert_eq!(harness.errors(), vec!["Only image files are allowed"]);
}

#[tokio::test]
/// 1. Lists successful transactions
/// 2. Refunds a pending one - expects the backend reason in the toast
/// 3. Refunds part of the successful one - expects it listed as refunded
async fn refunds() {
    let harness = Harness::start_logged_in().await;
    let transactions = harness.console.transactions();

    let successful = transactions
        .list(1, 10, Some(TransactionStatus::Success))
        .await
        .unwrap();
    assert_eq!(successful.meta.total, 1);
    assert_eq!(successful.data[0].id, "txn_001");

    assert!(transactions.refund("txn_002", None, None).await.is_err());
    assert_eq!(
        harness.errors(),
        vec!["Refund failed: Only successful transactions can be refunded"]
    );

    let outcome = transactions
        .refund("txn_001", Some(100.0), Some("Damaged copy".to_string()))
        .await
        .expect("Failed to refund");
    assert_eq!(outcome["refundAmount"], 100.0);
    assert_eq!(
        harness.successes().last().unwrap(),
        "Refund initiated successfully"
    );

    let refund_request = harness.stub.store.recorded_requests().pop().unwrap();
    assert_eq!(refund_request.path, "/api/v1/transactions/txn_001/refund");
    assert_eq!(refund_request.body["reason"], "Damaged copy");

    let successful = transactions
        .list(1, 10, Some(TransactionStatus::Success))
        .await
        .unwrap();
    assert!(successful.data.is_empty());
}

#[tokio::test]
async fn logout_forgets_everything() {
    let harness = Harness::start_logged_in().await;
    harness
        .console
        .categories()
        .list(&ListParams::default())
        .await
        .unwrap();
    assert!(!harness.console.cache().is_empty());

    harness.console.auth().logout().await.unwrap();

    assert!(harness.console.cache().is_empty());
    assert!(!harness.console.session().is_authenticated());
    assert_eq!(
        harness.successes().last().unwrap(),
        "Logged out successfully"
    );
    assert_eq!(harness.navigator.routes().last(), Some(&Route::Login));
    assert_eq!(harness.console.auth().current_user().name, "Admin User");
}
