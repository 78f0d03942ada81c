//! zentao-desk command-line client.
//!
//! Drives the same session-aware containers a desktop UI would: every command
//! bootstraps the backend, runs one flow and prints the resulting notices.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use zentao_desk::observability::init_tracing;
use zentao_desk::{Desk, DeskError, LoginConfig, LoginRequired, Notice, NoticeLevel, Notifier, Settings};

/// Exit status when the user has to log in again.
const EXIT_LOGIN_REQUIRED: u8 = 2;

#[derive(Parser)]
#[command(name = "zentao-desk")]
#[command(about = "ZenTao desktop client: bugs, products and session", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Settings file (default: <config_dir>/zentao-desk/settings.toml)
    #[arg(long, env = "ZENTAO_DESK_SETTINGS", global = true)]
    settings: Option<PathBuf>,

    /// Use an in-process backend seeded from a JSON fixture
    #[arg(long, value_name = "FIXTURE", global = true)]
    offline: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the session state and the remembered login
    Status,

    /// Log in to a ZenTao server
    Login {
        /// Server URL (default: the remembered one)
        #[arg(short, long)]
        url: Option<String>,
        /// Account name (default: the remembered one)
        #[arg(short, long)]
        account: Option<String>,
        /// Password (default: the remembered one)
        #[arg(short, long, env = "ZENTAO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Remember the login for the next start
        #[arg(short, long)]
        remember: bool,
    },

    /// End the session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List products
    Products,

    /// List the bugs of one or more products
    Bugs {
        /// Product IDs
        #[arg(required = true)]
        product_ids: Vec<u32>,
    },

    /// Show one bug
    Bug {
        /// Bug ID
        id: u32,
    },

    /// Show one product
    Product {
        /// Product ID
        id: u32,
    },

    /// Fetch an image referenced from bug steps
    Image {
        /// Image path as found in the steps
        path: String,
    },
}

/// Prints notices as they arrive.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        let tag = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        println!("[{tag}] {notice}");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load(cli.settings.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&settings);

    match run(cli, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(DeskError::LoginRequired(_)) => {
            eprintln!("login required: run `zentao-desk login` first");
            ExitCode::from(EXIT_LOGIN_REQUIRED)
        }
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, settings: &Settings) -> zentao_desk::Result<()> {
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
    let desk = match &cli.offline {
        Some(fixture) => zentao_desk::connect_offline(settings, fixture, notifier)?,
        None => zentao_desk::connect(settings, notifier)?,
    };

    let remembered = desk.bootstrap().await?;

    match cli.command {
        Commands::Status => {
            println!("session: {:?}", desk.session().state());
            match remembered {
                Some(config) => println!("remembered: {} at {}", config.account, config.base_url),
                None => println!("remembered: none"),
            }
        }
        Commands::Login {
            url,
            account,
            password,
            remember,
        } => {
            let config = login_config(remembered, url, account, password)?;
            if !desk.login(&config, remember).await? {
                eprintln!("login rejected for {}", config.account);
                return Err(LoginRequired.into());
            }
            println!("logged in as {}", config.account);
        }
        Commands::Logout => {
            desk.logout().await?;
            println!("logged out");
        }
        Commands::Whoami => whoami(&desk).await?,
        Commands::Products => {
            desk.products().refresh().await?;
            desk.products().with_value(|products| {
                for product in products {
                    println!("{:>6}  {:<12}  {}", product.id, product.code, product.name);
                }
            });
        }
        Commands::Bugs { product_ids } => {
            desk.bugs().fetch(product_ids).await?;
            desk.bugs().with_value(|bugs| {
                for bug in bugs {
                    println!(
                        "{:>6}  {:<10}  S{} P{}  {}  {}",
                        bug.id, bug.status.name, bug.severity, bug.pri, bug.opened_date_formatted, bug.title
                    );
                }
            });
        }
        Commands::Bug { id } => {
            let bug = desk.bug_detail(id).await?;
            println!("#{} {}", bug.id, bug.title);
            println!("status:   {}", bug.status.name);
            println!("severity: {}  priority: {}", bug.severity, bug.pri);
            if let Some(opened_by) = &bug.opened_by {
                println!("opened:   {} by {}", bug.opened_date_formatted, opened_by.display_name());
            }
            if let Some(assigned_to) = &bug.assigned_to {
                println!("assigned: {}", assigned_to.display_name());
            }
            if !bug.steps.is_empty() {
                println!();
                println!("{}", bug.steps);
            }
        }
        Commands::Product { id } => {
            let product = desk.product_detail(id).await?;
            println!("#{} {} ({})", product.id, product.name, product.code);
            println!("type: {:?}  acl: {:?}", product.product_type, product.acl);
            if let Some(po) = &product.po {
                println!("owner: {}", po.display_name());
            }
            if !product.desc.is_empty() {
                println!();
                println!("{}", product.desc);
            }
        }
        Commands::Image { path } => println!("{}", desk.image(&path).await?),
    }

    Ok(())
}

async fn whoami(desk: &Desk) -> zentao_desk::Result<()> {
    desk.profile().refresh().await?;
    match desk.profile().value() {
        Some(user) => {
            println!("{} ({})", user.display_name(), user.account);
            Ok(())
        }
        None if desk.session().is_expired() => Err(LoginRequired.into()),
        None => {
            println!("no user information available");
            Ok(())
        }
    }
}

fn login_config(
    remembered: Option<LoginConfig>,
    url: Option<String>,
    account: Option<String>,
    password: Option<String>,
) -> zentao_desk::Result<LoginConfig> {
    let remembered = remembered.unwrap_or_else(|| LoginConfig::new("", "", ""));
    let config = LoginConfig {
        base_url: url.unwrap_or(remembered.base_url),
        account: account.unwrap_or(remembered.account),
        password: password.unwrap_or(remembered.password),
    };

    if config.base_url.is_empty() || config.account.is_empty() {
        return Err(DeskError::Config(
            "no remembered login: pass --url and --account".to_string(),
        ));
    }
    Ok(config)
}
