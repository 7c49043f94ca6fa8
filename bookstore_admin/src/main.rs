use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use bookstore_admin::api::{
    BookQueryParams, CreateAgeGroupPayload, CreateCategoryPayload, ListParams,
    TransactionStatus, UpdateAgeGroupPayload, UpdateCategoryPayload, VisibilityFilter,
};
use bookstore_admin::book_form::BookFormValues;
use bookstore_admin::client::BookstoreAdminClient;
use bookstore_admin::console::AdminConsole;
use bookstore_admin::errors::ApiError;
use bookstore_admin::notifications::ConsoleNotifier;
use bookstore_admin::query_cache::QueryCache;
use bookstore_admin::session::{ConsoleNavigator, FileSessionStore, Route, Session};
use bookstore_admin::settings::Settings;
use bookstore_admin::telemetry::{init_telemetry, shutdown_telemetry, TelemetryConfig};
use bookstore_admin::uploads::UploadKind;

#[derive(Parser)]
#[command(name = "bookstore-admin", version, about = "Manage the bookstore catalog from the terminal")]
struct Cli {
    /// Configuration file, `bookstore_admin.toml` by default
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides `api.base_url`
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Overrides `session.file`
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in as an administrator
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "BOOKSTORE_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    /// Show the signed in administrator
    Whoami,
    #[command(subcommand)]
    Books(BooksCommand),
    /// Upload an image or a book file and print its url
    Upload {
        path: PathBuf,
        #[arg(long, value_enum, default_value = "image")]
        kind: UploadKind,
    },
    #[command(subcommand)]
    Categories(CategoriesCommand),
    #[command(subcommand)]
    AgeGroups(AgeGroupsCommand),
    #[command(subcommand)]
    Transactions(TransactionsCommand),
}

#[derive(Subcommand)]
enum BooksCommand {
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        visibility: Option<VisibilityFilter>,
    },
    Get {
        id: String,
    },
    /// Print the values of an empty book form as JSON
    Template,
    /// Print the form values of an existing book as JSON
    EditTemplate {
        id: String,
    },
    /// Create a book from a form file
    Create {
        #[arg(long)]
        form: PathBuf,
    },
    /// Update a book from a form file
    Update {
        id: String,
        #[arg(long)]
        form: PathBuf,
    },
    Delete {
        id: String,
    },
}

#[derive(Args)]
struct ListArgs {
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long)]
    search: Option<String>,
}

impl From<ListArgs> for ListParams {
    fn from(args: ListArgs) -> Self {
        ListParams {
            page: args.page,
            limit: args.limit,
            search: args.search,
            status: None,
        }
    }
}

#[derive(Subcommand)]
enum CategoriesCommand {
    List(ListArgs),
    Get {
        id: String,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        age_group: Option<String>,
        #[arg(long)]
        parent_id: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        age_group: Option<String>,
        #[arg(long)]
        parent_id: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum AgeGroupsCommand {
    List(ListArgs),
    Get {
        id: String,
    },
    Create {
        #[arg(long)]
        label: String,
        #[arg(long)]
        sort_order: Option<i32>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        hero_image: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        sort_order: Option<i32>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        hero_image: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum TransactionsCommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long, value_enum)]
        status: Option<TransactionStatus>,
    },
    /// Refund a transaction, fully unless an amount is given
    Refund {
        id: String,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        reason: Option<String>,
    },
}

impl Command {
    /// Screen of the admin panel the command stands for
    fn path(&self) -> &'static str {
        match self {
            Command::Login { .. } => Route::Login.path(),
            Command::Books(_) | Command::Upload { .. } => "/admin/books",
            Command::Categories(_) => "/admin/categories",
            Command::AgeGroups(_) => "/admin/age-groups",
            Command::Transactions(_) => "/admin/transactions",
            Command::Logout | Command::Whoami => "/admin",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url {
        settings.api.base_url = api_url;
    }
    if let Some(session_file) = cli.session_file {
        settings.session.file = session_file;
    }

    init_telemetry(TelemetryConfig {
        app_name: "bookstore_admin",
        default_filter: "warn",
        jaeger_enabled: settings.telemetry.jaeger_enabled,
        writer: std::io::stderr,
    })?;

    let result = run(cli.command, &settings).await;
    shutdown_telemetry();

    if let Err(err) = result {
        // Console errors were already shown as notifications
        if err.downcast_ref::<ApiError>().is_none() {
            eprintln!("✘ {:#}", err);
        }
        std::process::exit(1);
    }
    Ok(())
}

fn build_console(settings: &Settings) -> anyhow::Result<AdminConsole> {
    let session = Arc::new(Session::new(
        Arc::new(FileSessionStore::new(&settings.session.file)),
        Arc::new(ConsoleNavigator),
        settings.session_ttl(),
    ));
    let client = BookstoreAdminClient::new(&settings.client_config(), session.clone())?;
    Ok(AdminConsole::new(
        Arc::new(client),
        Arc::new(QueryCache::new(settings.stale_time())),
        session,
        Arc::new(ConsoleNotifier),
    ))
}

async fn run(command: Command, settings: &Settings) -> anyhow::Result<()> {
    let console = build_console(settings)?;
    if let Some(route) = console.session().guard(command.path()) {
        tracing::info!("Command redirected to {}", route.path());
        return match route {
            Route::Login => Err(ApiError::Unauthorized.into()),
            Route::Books => Ok(()),
        };
    }

    match command {
        Command::Login { email, password } => {
            console.auth().login(&email, &password).await?;
        }
        Command::Logout => console.auth().logout().await?,
        Command::Whoami => {
            let user = console.auth().current_user();
            println!("{} <{}>", user.name, user.email);
        }
        Command::Books(command) => run_books(&console, command).await?,
        Command::Upload { path, kind } => {
            let uploaded = console.books().upload_file(&path, kind).await?;
            println!("{}", uploaded.url);
        }
        Command::Categories(command) => run_categories(&console, command).await?,
        Command::AgeGroups(command) => run_age_groups(&console, command).await?,
        Command::Transactions(command) => run_transactions(&console, command).await?,
    }
    Ok(())
}

async fn run_books(console: &AdminConsole, command: BooksCommand) -> anyhow::Result<()> {
    let books = console.books();
    match command {
        BooksCommand::List {
            page,
            limit,
            search,
            visibility,
        } => {
            let params = BookQueryParams {
                page,
                limit,
                search,
                status: None,
                visibility,
            };
            print_json(&books.list(&params).await.map_err(read_failed)?)
        }
        BooksCommand::Get { id } => print_json(&books.get(&id).await.map_err(read_failed)?),
        BooksCommand::Template => print_json(&BookFormValues::new_book()),
        BooksCommand::EditTemplate { id } => {
            let book = books.get(&id).await.map_err(read_failed)?;
            let form = BookFormValues::from_book(&book)
                .with_context(|| format!("Book {} has a price that cannot be edited", id))?;
            print_json(&form)
        }
        BooksCommand::Create { form } => {
            let form = read_form(&form).await?;
            let book = books.submit_form(&form, None).await.map_err(form_failed)?;
            println!("{}", book.id);
            Ok(())
        }
        BooksCommand::Update { id, form } => {
            let form = read_form(&form).await?;
            books
                .submit_form(&form, Some(&id))
                .await
                .map_err(form_failed)?;
            Ok(())
        }
        BooksCommand::Delete { id } => Ok(books.delete(&id).await?),
    }
}

async fn run_categories(console: &AdminConsole, command: CategoriesCommand) -> anyhow::Result<()> {
    let categories = console.categories();
    match command {
        CategoriesCommand::List(args) => {
            print_json(&categories.list(&args.into()).await.map_err(read_failed)?)
        }
        CategoriesCommand::Get { id } => {
            print_json(&categories.get(&id).await.map_err(read_failed)?)
        }
        CategoriesCommand::Create {
            name,
            slug,
            age_group,
            parent_id,
        } => {
            let payload = CreateCategoryPayload {
                name,
                slug,
                age_group,
                parent_id,
            };
            print_json(&categories.create(&payload).await?)
        }
        CategoriesCommand::Update {
            id,
            name,
            slug,
            age_group,
            parent_id,
        } => {
            let payload = UpdateCategoryPayload {
                name,
                slug,
                age_group,
                parent_id,
            };
            print_json(&categories.update(&id, &payload).await?)
        }
        CategoriesCommand::Delete { id } => Ok(categories.delete(&id).await?),
    }
}

async fn run_age_groups(console: &AdminConsole, command: AgeGroupsCommand) -> anyhow::Result<()> {
    let age_groups = console.age_groups();
    match command {
        AgeGroupsCommand::List(args) => {
            print_json(&age_groups.list(&args.into()).await.map_err(read_failed)?)
        }
        AgeGroupsCommand::Get { id } => {
            print_json(&age_groups.get(&id).await.map_err(read_failed)?)
        }
        AgeGroupsCommand::Create {
            label,
            sort_order,
            description,
            hero_image,
        } => {
            let payload = CreateAgeGroupPayload {
                label,
                sort_order,
                description,
                hero_image,
            };
            print_json(&age_groups.create(&payload).await?)
        }
        AgeGroupsCommand::Update {
            id,
            label,
            sort_order,
            description,
            hero_image,
        } => {
            let payload = UpdateAgeGroupPayload {
                label,
                sort_order,
                description,
                hero_image,
            };
            print_json(&age_groups.update(&id, &payload).await?)
        }
        AgeGroupsCommand::Delete { id } => Ok(age_groups.delete(&id).await?),
    }
}

async fn run_transactions(
    console: &AdminConsole,
    command: TransactionsCommand,
) -> anyhow::Result<()> {
    let transactions = console.transactions();
    match command {
        TransactionsCommand::List {
            page,
            limit,
            status,
        } => print_json(
            &transactions
                .list(page, limit, status)
                .await
                .map_err(read_failed)?,
        ),
        TransactionsCommand::Refund { id, amount, reason } => {
            print_json(&transactions.refund(&id, amount, reason).await?)
        }
    }
}

async fn read_form(path: &Path) -> anyhow::Result<BookFormValues> {
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read form {}", path.display()))?;
    serde_json::from_slice(&content)
        .with_context(|| format!("Form {} is not valid JSON", path.display()))
}

/// Reads are not notified by the console, their failures are printed here
fn read_failed(err: ApiError) -> ApiError {
    if !err.is_unauthorized() {
        eprintln!("✘ {}", err.user_message(&err.to_string()));
    }
    err
}

/// Lists field errors, which block the submit without a notification
fn form_failed(err: ApiError) -> ApiError {
    if let ApiError::Validation(errors) = &err {
        for error in errors.errors() {
            eprintln!("✘ {}", error);
        }
    }
    err
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
