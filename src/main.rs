use std::path::PathBuf;
use std::sync::Arc;

use catalog_admin::config::{ClientConfig, ConfigError};
use catalog_admin::forms::{
    ForgotPasswordForm, LoginForm, NewUserForm, ProductForm, SetPasswordForm, ValidationError,
};
use catalog_admin::net::client::ApiClient;
use catalog_admin::net::transport::{ReqwestTransport, TransportError};
use catalog_admin::net::types::{ApiResponse, ProductPage};
use catalog_admin::roles::is_admin;
use catalog_admin::routes::Route;
use catalog_admin::routes::guard::{GuardDecision, check};
use catalog_admin::services::auth::AuthService;
use catalog_admin::services::catalog::{PageQuery, ProductService, RoleService, default_role_id};
use catalog_admin::state::storage::FileStorage;
use catalog_admin::state::session::SessionStore;
use catalog_admin::ui::{ConsoleNotifier, RecordingNavigator};
use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("cannot open {page}: redirected to {target}")]
    Redirected { page: Route, target: Route },
    #[error("server returned error {code}: {message}")]
    Api { code: i32, message: String },
    #[error("{0}")]
    Rejected(&'static str),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "catalog-admin", about = "Product catalog admin client")]
struct Cli {
    #[arg(long, env = "CATALOG_API_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "CATALOG_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CATALOG_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    /// Show the stored session's role.
    Whoami,
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    SetPassword {
        /// Token from the reset link.
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    Products(ProductsCommand),
    Roles(RolesCommand),
    Users(UsersCommand),
}

#[derive(Args, Debug)]
struct ProductsCommand {
    #[command(subcommand)]
    command: ProductsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProductsSubcommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = catalog_admin::services::catalog::DEFAULT_PAGE_SIZE)]
        page_size: u32,
        #[arg(long, default_value = "")]
        search: String,
    },
    Get {
        id: String,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: String,
        #[arg(long)]
        quantity: String,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        quantity: Option<String>,
    },
}

#[derive(Args, Debug)]
struct RolesCommand {
    #[command(subcommand)]
    command: RolesSubcommand,
}

#[derive(Subcommand, Debug)]
enum RolesSubcommand {
    List,
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Role id. Defaults to the first role the server lists.
        #[arg(long)]
        role: Option<String>,
    },
}

/// One tab's worth of services over the session file.
struct CliContext {
    config: ClientConfig,
    auth: AuthService,
    products: ProductService,
    roles: RoleService,
    navigator: Arc<RecordingNavigator>,
}

impl CliContext {
    fn new(config: ClientConfig) -> Result<Self, CliError> {
        let session = Arc::new(SessionStore::new(Arc::new(FileStorage::new(config.session_file.clone()))));
        let transport = Arc::new(ReqwestTransport::new(config.timeouts)?);
        let navigator = Arc::new(RecordingNavigator::new());
        let client = ApiClient::new(
            &config.api_base_url,
            transport,
            session,
            Arc::new(ConsoleNotifier),
            navigator.clone(),
        );
        Ok(Self {
            config,
            auth: AuthService::new(client.clone()),
            products: ProductService::new(client.clone()),
            roles: RoleService::new(client),
            navigator,
        })
    }

    /// Run the route guard for the page a command stands for.
    fn enter(&self, route: &Route) -> Result<(), CliError> {
        let state = self.auth.hydrate();
        match check(&state, &route.path()) {
            GuardDecision::Render | GuardDecision::Loading => Ok(()),
            GuardDecision::Redirect(target) => {
                tracing::debug!(page = %route, %target, "command blocked by route guard");
                Err(CliError::Redirected { page: route.clone(), target })
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url)?;
    }
    if let Some(path) = cli.session_file {
        config = config.with_session_file(path);
    }

    let ctx = CliContext::new(config)?;
    let is_logout = matches!(cli.command, Command::Logout);
    let result = run(&ctx, cli.command).await;

    if !is_logout && ctx.navigator.last() == Some(Route::Login) {
        eprintln!("session expired; run `catalog-admin login` to sign in again");
    }
    result
}

async fn run(ctx: &CliContext, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { email, password } => run_login(ctx, email, password).await,
        Command::Logout => {
            ctx.auth.logout().await;
            println!("signed out");
            Ok(())
        }
        Command::Whoami => run_whoami(ctx),
        Command::ForgotPassword { email } => {
            ctx.enter(&Route::ForgotPassword)?;
            let request = ForgotPasswordForm { email }.validate()?;
            if !ctx.auth.forgot_password(&request.email).await {
                return Err(CliError::Rejected("password reset request failed"));
            }
            println!("if the address is registered, a reset link has been sent");
            Ok(())
        }
        Command::SetPassword { token, password, confirm_password } => {
            ctx.enter(&Route::SetPassword)?;
            let request = SetPasswordForm { token, password, confirm_password }.validate()?;
            if !ctx.auth.set_password(&request).await {
                return Err(CliError::Rejected("the link may have expired or is invalid"));
            }
            println!("password updated; you can now sign in");
            Ok(())
        }
        Command::Products(products) => run_products(ctx, products).await,
        Command::Roles(roles) => match roles.command {
            RolesSubcommand::List => {
                ctx.enter(&Route::NewUser)?;
                let roles = into_result(ctx.roles.list().await)?;
                print_json(&serde_json::to_value(roles)?)
            }
        },
        Command::Users(users) => run_users(ctx, users).await,
    }
}

async fn run_login(ctx: &CliContext, email: String, password: String) -> Result<(), CliError> {
    ctx.enter(&Route::Login)?;
    let request = LoginForm { email, password }.validate()?;
    if !ctx.auth.login(&request.email, &request.password).await {
        return Err(CliError::Rejected("login failed"));
    }
    let role = ctx.auth.state().role.unwrap_or_default();
    println!("signed in as {role}");
    Ok(())
}

fn run_whoami(ctx: &CliContext) -> Result<(), CliError> {
    let state = ctx.auth.hydrate();
    print_json(&json!({
        "authenticated": state.is_authenticated(),
        "role": state.role,
        "isAdmin": is_admin(state.role.as_deref()),
        "apiBaseUrl": ctx.config.api_base_url,
        "sessionFile": ctx.config.session_file.display().to_string(),
    }))
}

async fn run_products(ctx: &CliContext, products: ProductsCommand) -> Result<(), CliError> {
    match products.command {
        ProductsSubcommand::List { page, page_size, search } => {
            ctx.enter(&Route::Products)?;
            let query = PageQuery { page_size, ..PageQuery::default() }
                .with_search(search)
                .with_page(page);
            let page = into_result(ctx.products.list(&query).await)?;
            let admin = is_admin(ctx.auth.state().role.as_deref());
            print_json(&render_page(&page, admin)?)
        }
        ProductsSubcommand::Get { id } => {
            ctx.enter(&Route::ProductDetail(id.clone()))?;
            let product = into_result(ctx.products.get(&id).await)?;
            print_json(&serde_json::to_value(product)?)
        }
        ProductsSubcommand::Create { name, price, quantity } => {
            ctx.enter(&Route::NewProduct)?;
            let request = ProductForm { name, price, quantity }.validate()?;
            let product = into_result(ctx.products.create(&request).await)?;
            print_json(&serde_json::to_value(product)?)
        }
        ProductsSubcommand::Update { id, name, price, quantity } => {
            ctx.enter(&Route::ProductDetail(id.clone()))?;
            let existing = into_result(ctx.products.get(&id).await)?;
            let mut form = ProductForm::from_product(&existing);
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(price) = price {
                form.price = price;
            }
            if let Some(quantity) = quantity {
                form.quantity = quantity;
            }
            let request = form.validate()?;
            let product = into_result(ctx.products.update(&id, &request).await)?;
            print_json(&serde_json::to_value(product)?)
        }
    }
}

async fn run_users(ctx: &CliContext, users: UsersCommand) -> Result<(), CliError> {
    match users.command {
        UsersSubcommand::Create { name, email, role } => {
            ctx.enter(&Route::NewUser)?;
            let role = match role {
                Some(role) => role,
                None => {
                    let roles = into_result(ctx.roles.list().await)?;
                    default_role_id(&roles)
                        .map(|id| id.to_string())
                        .ok_or(CliError::Rejected("no roles available"))?
                }
            };
            let request = NewUserForm { name, email, role }.validate()?;
            if !ctx.auth.create_user(&request).await {
                return Err(CliError::Rejected("user creation failed"));
            }
            println!("user {} created", request.email);
            Ok(())
        }
    }
}

/// Product page as shown in the list. Non-admins see name and price only.
fn render_page(page: &ProductPage, admin: bool) -> Result<Value, CliError> {
    let items = if admin {
        serde_json::to_value(&page.items)?
    } else {
        Value::Array(
            page.items
                .iter()
                .map(|p| json!({ "name": p.name, "price": p.price }))
                .collect(),
        )
    };
    Ok(json!({
        "items": items,
        "totalCount": page.total_count,
        "currentPage": page.current_page,
        "totalPages": page.page_count(),
    }))
}

fn into_result<T>(response: ApiResponse<T>) -> Result<T, CliError> {
    let code = response.error_code;
    let message = response.error_message.clone().unwrap_or_default();
    response.into_result().ok_or(CliError::Api { code, message })
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
