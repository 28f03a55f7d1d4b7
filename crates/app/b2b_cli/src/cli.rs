use std::path::PathBuf;

use b2b_core::models::UserType;
use b2b_core::query::SortDirection;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "b2b", version, about = "B2B dashboard client")]
pub struct Cli {
    /// GraphQL endpoint (overrides B2B_API_URL).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory holding the persisted session (overrides B2B_STATE_DIR).
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and persist the session
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long, value_enum, default_value_t = Role::SalesRep)]
        role: Role,
    },

    /// Sign out and forget the active customer
    Logout,

    /// Show the signed-in user and the active customer
    Status,

    /// Print version
    Version,

    /// Check the session periodically until it expires or Ctrl-C
    Watch {
        /// Seconds between checks (defaults to B2B_SESSION_CHECK_SECS or 60)
        #[arg(long)]
        interval_secs: Option<u64>,
    },

    /// Manage the customer being acted for
    #[command(subcommand)]
    ActiveCustomer(ActiveCustomerCommand),

    /// List customers
    Customers(ListArgs),

    /// List carts of the active customer
    Carts(ListArgs),

    /// List quotes
    Quotes(ListArgs),

    /// List wishlists
    Wishlists(ListArgs),
}

#[derive(Subcommand, Debug)]
pub enum ActiveCustomerCommand {
    Show,

    Set {
        #[arg(long)]
        id: i64,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        email: String,
    },

    Clear,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Page query string, e.g. `page=2&sortField=name&sortDirection=DESC`
    pub query: Option<String>,

    #[arg(long)]
    pub page: Option<u32>,

    #[arg(long)]
    pub sort_field: Option<String>,

    #[arg(long, value_enum)]
    pub sort_direction: Option<Direction>,

    #[arg(long)]
    pub filter_field: Option<String>,

    #[arg(long)]
    pub filter_value: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    SalesRep,
    Customer,
    Admin,
}

impl From<Role> for UserType {
    fn from(role: Role) -> Self {
        match role {
            Role::SalesRep => UserType::SalesRep,
            Role::Customer => UserType::Customer,
            Role::Admin => UserType::Admin,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl From<Direction> for SortDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Asc => SortDirection::Asc,
            Direction::Desc => SortDirection::Desc,
        }
    }
}
