use std::sync::Arc;
use std::time::Duration;

use bookstore_admin::api::BookFormat;
use bookstore_admin::book_form::{BookFormValues, VariantFormValues};
use bookstore_admin::client::{BookstoreAdminClient, ClientConfig};
use bookstore_admin::console::AdminConsole;
use bookstore_admin::notifications::{NotificationLevel, RecordingNotifier};
use bookstore_admin::query_cache::QueryCache;
use bookstore_admin::session::{InMemorySessionStore, RecordingNavigator, Session};
use bookstore_catalog_stub::catalog_store::{ADMIN_EMAIL, ADMIN_PASSWORD};
use bookstore_catalog_stub::server::{spawn, StubServer};

/// Console wired to recording feedback, talking to a stub of its own
pub struct Harness {
    pub stub: StubServer,
    pub console: AdminConsole,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub fn start() -> Self {
        Self::start_with_read_retries(0)
    }

    pub fn start_with_read_retries(max_read_retries: u32) -> Self {
        let stub = spawn().expect("Failed to spawn stub");
        let (console, notifier, navigator) =
            console_with_read_retries(&stub.api_url(), max_read_retries);
        Self {
            stub,
            console,
            notifier,
            navigator,
        }
    }

    pub async fn start_logged_in() -> Self {
        Self::start().log_in().await
    }

    pub async fn log_in(self) -> Self {
        self
            .console
            .auth()
            .login(ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .expect("Failed to log in");
        self
    }

    pub fn successes(&self) -> Vec<String> {
        self.notifier.messages(NotificationLevel::Success)
    }

    pub fn errors(&self) -> Vec<String> {
        self.notifier.messages(NotificationLevel::Error)
    }
}

pub fn console_for(
    api_url: &str,
) -> (AdminConsole, Arc<RecordingNotifier>, Arc<RecordingNavigator>) {
    console_with_read_retries(api_url, 0)
}

pub fn console_with_read_retries(
    api_url: &str,
    max_read_retries: u32,
) -> (AdminConsole, Arc<RecordingNotifier>, Arc<RecordingNavigator>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let session = Arc::new(Session::new(
        Arc::new(InMemorySessionStore::default()),
        navigator.clone(),
        Duration::from_secs(3600),
    ));
    let client = BookstoreAdminClient::new(
        &ClientConfig {
            base_url: api_url.to_string(),
            timeout: Duration::from_secs(10),
            max_read_retries,
        },
        session.clone(),
    )
    .expect("Failed to create client");

    let console = AdminConsole::new(
        Arc::new(client),
        Arc::new(QueryCache::new(Duration::from_secs(300))),
        session,
        notifier.clone(),
    );
    (console, notifier, navigator)
}

/// Valid form with a single discounted paperback
pub fn book_form(title: &str) -> BookFormValues {
    BookFormValues {
        title: title.to_string(),
        author_name: "J. R. R. Tolkien".to_string(),
        description: "There and back again".to_string(),
        variants: vec![VariantFormValues {
            format: BookFormat::Paperback,
            original_price: Some(399.0),
            price: 299.99,
            stock_quantity: 12,
            isbn: Some("9780261103344".to_string()),
            include_tax: true,
            tax_percentage: Some(5.0),
        }],
        ..BookFormValues::new_book()
    }
}
