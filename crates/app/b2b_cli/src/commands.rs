use std::sync::Arc;
use std::time::Duration;

use b2b_api_client::GraphqlClient;
use b2b_core::auth::{ExpiryWatch, token_expiry};
use b2b_core::config::ClientConfig;
use b2b_core::context::AppContext;
use b2b_core::guard::GuardDecision;
use b2b_core::models::{ActiveCustomer, Cart, Customer, ListRecord, Quote, UserType, Wishlist};
use b2b_core::query::Entity;
use b2b_core::storage::{FileStore, KeyValueStore};
use b2b_core::view::{ListView, ViewStatus};
use tokio::sync::Mutex;
use tracing::info;

use crate::cli::{ActiveCustomerCommand, Commands, ListArgs};
use crate::render::{self, TableRow};
use crate::{Error, Result};

/// Everything a command needs, built from the resolved configuration.
pub struct Client {
    pub config: ClientConfig,
    pub api: Arc<GraphqlClient>,
    pub ctx: AppContext,
}

impl Client {
    pub fn open(config: ClientConfig) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.state_dir)?);
        let api = Arc::new(GraphqlClient::new(config.api_url.clone()));
        let ctx = AppContext::new(store, api.clone());
        Ok(Self { config, api, ctx })
    }
}

pub async fn dispatch(command: Commands, client: Client) -> Result<()> {
    match command {
        Commands::Login {
            email,
            password,
            role,
        } => login(client, &email, &password, role.into()).await,
        Commands::Logout => {
            let mut client = client;
            client.ctx.logout();
            println!("Signed out.");
            Ok(())
        }
        Commands::Status => {
            status(&client.ctx);
            Ok(())
        }
        Commands::Watch { interval_secs } => {
            let period = interval_secs
                .map(Duration::from_secs)
                .unwrap_or(client.config.session_check_interval);
            watch(client, period).await
        }
        Commands::ActiveCustomer(action) => active_customer(client, action),
        Commands::Customers(args) => list::<Customer>(client, args).await,
        Commands::Carts(args) => list::<Cart>(client, args).await,
        Commands::Quotes(args) => list::<Quote>(client, args).await,
        Commands::Wishlists(args) => list::<Wishlist>(client, args).await,
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn login(mut client: Client, email: &str, password: &str, role: UserType) -> Result<()> {
    let session = client.ctx.login(email, password, role).await?;
    println!(
        "Signed in as {} ({}) [{}]",
        session.user.full_name(),
        session.user.email,
        role.label()
    );
    Ok(())
}

fn status(ctx: &AppContext) {
    match ctx.session().session().filter(|_| ctx.is_authenticated()) {
        Some(session) => {
            println!(
                "Signed in as {} ({}) [{}]",
                session.user.full_name(),
                session.user.email,
                session.user_type.label()
            );
            if let Some(expiry) = token_expiry(&session.token) {
                println!("Session expires {}", expiry.format("%b %-d, %Y %-I:%M %p UTC"));
            }
        }
        None => println!("Not signed in."),
    }
    match ctx.active_customer().get() {
        Some(customer) => println!("Active customer: {}", customer.display_name()),
        None => println!("No active customer."),
    }
}

async fn watch(client: Client, period: Duration) -> Result<()> {
    if !client.ctx.is_authenticated() {
        return Err(Error::Custom("Not signed in.".into()));
    }

    let ctx = Arc::new(Mutex::new(client.ctx));
    let watch = ExpiryWatch::spawn(ctx, period).await;
    info!(period_secs = period.as_secs(), "watching session");

    tokio::select! {
        _ = watch.signed_out() => println!("Session expired. Signed out."),
        result = tokio::signal::ctrl_c() => {
            result?;
            println!("Stopped.");
        }
    }
    watch.shutdown().await;
    Ok(())
}

fn active_customer(mut client: Client, action: ActiveCustomerCommand) -> Result<()> {
    let customers = client.ctx.active_customer_mut();
    match action {
        ActiveCustomerCommand::Show => match customers.get() {
            Some(customer) => println!("Active customer: {}", customer.display_name()),
            None => println!("No active customer."),
        },
        ActiveCustomerCommand::Set {
            id,
            first_name,
            last_name,
            email,
        } => {
            let customer = ActiveCustomer {
                id,
                first_name,
                last_name,
                email,
            };
            println!("Active customer: {}", customer.display_name());
            customers.set(customer)?;
        }
        ActiveCustomerCommand::Clear => {
            customers.clear()?;
            println!("Active customer cleared.");
        }
    }
    Ok(())
}

async fn list<T: ListRecord + TableRow>(client: Client, args: ListArgs) -> Result<()> {
    let entity = T::ENTITY;
    if let GuardDecision::Redirect(path) = client.ctx.authorize(Some(UserType::SalesRep), None) {
        return Err(Error::Custom(format!(
            "Sign in as a sales rep to view {entity} (redirected to {path})."
        )));
    }

    let mut view = ListView::<T>::open(args.query.as_deref().unwrap_or_default());
    apply_overrides(&mut view, &args);

    let status = view
        .load(
            client.api.as_ref(),
            client.ctx.session().token(),
            client.ctx.active_customer().get(),
        )
        .await;

    match status {
        ViewStatus::NeedsActiveCustomer => {
            println!("No Active Customer Selected");
            println!("Please select an active customer from the customers page to view their {entity}.");
        }
        ViewStatus::Empty => println!("No {entity} found."),
        ViewStatus::Populated(_) => {
            if entity == Entity::Carts
                && let Some(customer) = client.ctx.active_customer().get()
            {
                println!("Showing carts for: {}", customer.display_name());
            }
            println!("{}", render::table(view.rows()));
            if let Some(pagination) = view.pagination() {
                println!(
                    "Page {} of {} ({} items)",
                    view.query().page,
                    pagination.total_pages.max(1),
                    pagination.total_items
                );
            }
        }
        ViewStatus::Error(message) => {
            return Err(Error::Custom(format!("Error loading {entity}: {message}")));
        }
        ViewStatus::Idle | ViewStatus::Loading => {}
    }
    println!("Link: {}", view.location());
    Ok(())
}

/// Apply flag overrides through the same actions a page uses. The search
/// goes first because submitting it resets the page.
fn apply_overrides<T: ListRecord>(view: &mut ListView<T>, args: &ListArgs) {
    if args.filter_field.is_some() || args.filter_value.is_some() {
        if let Some(field) = &args.filter_field {
            view.set_filter_field(field);
        }
        if let Some(value) = &args.filter_value {
            view.set_filter_input(value);
        }
        view.submit_search();
    }
    if let Some(field) = &args.sort_field {
        view.set_sort_field(field);
    }
    if let Some(direction) = args.sort_direction {
        view.set_sort_direction(direction.into());
    }
    if let Some(page) = args.page {
        view.go_to_page(page);
    }
}
