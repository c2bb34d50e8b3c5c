//! `mindful` - journal calendar and entry tool for the Mindful Companion backend.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use mindful_client::render::{render_detail, render_help_types, render_month};
use mindful_client::services::date_utils::parse_month_arg;
use mindful_client::{ApiClient, AuthContext, Config, EntryStore, FileTokenStore, JournalCalendar, MonthNavigator};
use shared::{CreateEntryRequest, CreatedEntry, HelpType, LoginCredentials, RegisterCredentials};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Browse and write journal entries from the terminal.
#[derive(Parser, Debug)]
#[command(name = "mindful", version, about, long_about = None)]
struct Cli {
    /// Month to open, as YYYY-MM (defaults to the current month)
    #[arg(long, global = true)]
    month: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the month grid with one entry per day.
    Calendar,
    /// Open the entry shown on a day of the month.
    Show {
        #[arg(long)]
        day: u32,
    },
    /// Delete the entry shown on a day of the month.
    Delete {
        #[arg(long)]
        day: u32,
    },
    /// Save a new journal entry (requires login).
    Write {
        #[arg(long)]
        content: String,
        #[arg(long)]
        title: Option<String>,
        /// See `mindful help-types` for the accepted values
        #[arg(long)]
        help_type: Option<HelpType>,
    },
    /// Ask for a response without saving anything.
    Ask {
        #[arg(long)]
        content: String,
        #[arg(long, default_value = "acute_validation")]
        help_type: HelpType,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        password_confirm: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    Logout,
    /// List the kinds of AI support that can be requested.
    HelpTypes,
    /// Show who is signed in.
    Whoami,
    /// Check that the backend is reachable.
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env().context("failed to load configuration")?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_filter.clone()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!(base_url = %config.base_url, "configuration loaded");

    let tokens = Arc::new(FileTokenStore::new(config.token_path.clone()));
    let client = Arc::new(ApiClient::new(&config, tokens)?);

    let navigator = match cli.month.as_deref() {
        Some(month) => match parse_month_arg(month) {
            Some(date) => MonthNavigator::new(date),
            None => bail!("--month must look like 2024-03, got '{}'", month),
        },
        None => MonthNavigator::starting_today(),
    };

    match cli.command {
        Commands::Calendar => {
            let mut calendar = JournalCalendar::new(client, navigator);
            // A failed load still renders the empty month, followed by the error
            let loaded = calendar.open().await;
            print!("{}", render_month(calendar.view()));
            if let Err(error) = loaded {
                report(Some(&error.user_message()));
            }
        }
        Commands::Show { day } => {
            let mut calendar = JournalCalendar::new(client, navigator);
            calendar.open().await?;
            calendar.select_day(day).await?;
            if let Some(view) = calendar.selection().detail() {
                print!("{}", render_detail(view));
            }
        }
        Commands::Delete { day } => {
            let mut calendar = JournalCalendar::new(client, navigator);
            calendar.open().await?;
            calendar.select_day(day).await?;
            let entry_id = calendar.delete_selected().await?;
            println!("Deleted entry {}.", entry_id);
            print!("{}", render_month(calendar.view()));
            report(calendar.error_message());
        }
        Commands::Write {
            content,
            title,
            help_type,
        } => {
            let request = CreateEntryRequest {
                title,
                content,
                requested_help_type: help_type,
                ..CreateEntryRequest::default()
            };
            match client.create_entry(&request).await? {
                CreatedEntry::WithResponse(entry) => {
                    println!("Saved entry {}.\n\n{}", entry.id, entry.ai_response);
                }
                CreatedEntry::AiFailed(entry) => {
                    println!("Saved entry {}, but no response was generated: {}", entry.id, entry.ai_error);
                }
                CreatedEntry::Saved(entry) => println!("Saved entry {}.", entry.id),
            }
        }
        Commands::Ask { content, help_type } => {
            let response = client.request_anonymous_response(&content, help_type).await?;
            println!("{}", response.ai_response);
        }
        Commands::Login { email, password } => {
            let mut auth = AuthContext::new();
            let user = auth
                .login(client.as_ref(), &LoginCredentials { email, password })
                .await?;
            println!("Signed in as {}.", user.display_name());
        }
        Commands::Register {
            email,
            password,
            password_confirm,
            first_name,
            last_name,
        } => {
            let mut auth = AuthContext::new();
            let credentials = RegisterCredentials {
                email,
                password1: password,
                password2: password_confirm,
                first_name,
                last_name,
            };
            let user = auth.register(client.as_ref(), &credentials).await?;
            println!("Welcome, {}.", user.display_name());
        }
        Commands::Logout => {
            let mut auth = AuthContext::new();
            auth.logout(client.as_ref()).await?;
            println!("Signed out.");
        }
        Commands::HelpTypes => print!("{}", render_help_types()),
        Commands::Whoami => {
            let auth = AuthContext::initialize(client.as_ref()).await;
            match auth.user() {
                Some(user) => println!("{} <{}>", user.display_name(), user.email),
                None => println!("Not signed in."),
            }
        }
        Commands::Ping => {
            let response = client.test_connection().await?;
            println!("{} ({})", response.message, response.status);
        }
    }

    Ok(())
}

fn report(error_message: Option<&str>) {
    if let Some(message) = error_message {
        eprintln!("\n{}", message);
    }
}
