//! tkt - service-ticket tracker
//!
//! Front desk, technician and admin workflows over a single JSON snapshot.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "tkt")]
#[command(about = "Service-ticket tracker for front desk, technicians and admins")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Snapshot file (overrides data_file from the config)
    #[arg(long, global = true, env = "TKT_DATA")]
    data: Option<PathBuf>,

    /// Config file
    #[arg(long = "config", global = true, env = "TKT_CONFIG")]
    config_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new ticket
    Create {
        /// Customer name
        #[arg(short, long)]
        name: String,

        /// Customer phone
        #[arg(short, long)]
        phone: String,

        /// Address
        #[arg(short, long, default_value = "")]
        address: String,

        /// Reported problem
        #[arg(short, long, default_value = "")]
        description: String,

        /// Image reference (repeatable)
        #[arg(short, long = "image")]
        images: Vec<String>,
    },

    /// Technician worklist
    List {
        /// Filter by status (all, waiting, in_progress, completed)
        #[arg(short, long, default_value = "all")]
        status: String,

        /// Filter by technician (all, none, or a name)
        #[arg(short = 'k', long, default_value = "all")]
        technician: String,
    },

    /// Admin table with search and filters
    Admin {
        /// Search name, phone or ticket ID
        #[arg(short = 'q', long, default_value = "")]
        search: String,

        /// Filter by status
        #[arg(short, long, default_value = "all")]
        status: String,

        /// Filter by technician
        #[arg(short = 'k', long, default_value = "all")]
        technician: String,

        /// Created on or after (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Created on or before (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Ticket counts and revenue
    Stats,

    /// Show ticket details
    Show {
        /// Ticket ID
        id: String,
    },

    /// Update a ticket
    Update {
        /// Ticket ID
        id: String,

        /// Assign to a technician (empty string to unassign)
        #[arg(long)]
        assign: Option<String>,

        /// New status
        #[arg(short, long)]
        status: Option<String>,

        /// Root cause found
        #[arg(long)]
        root_cause: Option<String>,

        /// Actions taken
        #[arg(long)]
        actions: Option<String>,

        /// Service fee (non-numeric input counts as 0)
        #[arg(short, long)]
        fee: Option<String>,

        /// Image reference to append (repeatable)
        #[arg(short, long = "image")]
        images: Vec<String>,
    },

    /// Delete a ticket
    Delete {
        /// Ticket ID
        id: String,

        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// Write a backup of all tickets
    Export {
        /// Output file (defaults to ticket-backup-<date>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace all tickets with a backup
    Import {
        /// Backup file
        path: PathBuf,

        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// Delete all tickets
    Clear {
        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// Show storage details
    Info,

    /// List configured technicians
    Technicians,

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Print the config file path
    Path,
    /// Reset to default configuration
    Reset,
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let ctx = commands::Context::new(cli.config_file, cli.data, cli.json)?;

    match cli.command {
        Commands::Create {
            name,
            phone,
            address,
            description,
            images,
        } => commands::create(
            &ctx,
            tkt_core::NewTicket {
                name,
                phone,
                address,
                description,
                images,
            },
        ),
        Commands::List { status, technician } => commands::list(&ctx, &status, &technician),
        Commands::Admin {
            search,
            status,
            technician,
            from,
            to,
        } => commands::admin(&ctx, search, &status, &technician, from, to),
        Commands::Stats => commands::stats(&ctx),
        Commands::Show { id } => commands::show(&ctx, &id),
        Commands::Update {
            id,
            assign,
            status,
            root_cause,
            actions,
            fee,
            images,
        } => commands::update(
            &ctx,
            &id,
            commands::UpdateArgs {
                assign,
                status,
                root_cause,
                actions,
                fee,
                images,
            },
        ),
        Commands::Delete { id, yes } => commands::delete(&ctx, &id, yes),
        Commands::Export { output } => commands::export(&ctx, output),
        Commands::Import { path, yes } => commands::import(&ctx, &path, yes),
        Commands::Clear { yes } => commands::clear(&ctx, yes),
        Commands::Info => commands::info(&ctx),
        Commands::Technicians => commands::technicians(&ctx),
        Commands::Config { command } => match command {
            Some(ConfigCommands::Show) | None => commands::config_show(&ctx),
            Some(ConfigCommands::Path) => commands::config_path(&ctx),
            Some(ConfigCommands::Reset) => commands::config_reset(&ctx),
        },
    }
}
