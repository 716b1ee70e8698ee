//! `gema`: command-line client for the GEMA maintenance backend.
//!
//! Manages contexts and sessions, browses and edits the technical location
//! hierarchy, and administers work groups and technicians.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gema_core::Level;
use gema_core::validate::WorkGroupForm;
use tracing_subscriber::EnvFilter;

use commands::Output;
use commands::locations::{CreateArgs, EditArgs, SegmentArgs};

/// GEMA CLI tool.
#[derive(Parser, Debug)]
#[command(name = "gema", about = "GEMA maintenance management client")]
struct Cli {
    /// Path to client config file (default: ~/.gema/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Output format.
    #[arg(long = "output", short = 'o', global = true, value_enum, default_value = "table")]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage backend contexts.
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Switch the current context.
    Use {
        #[command(subcommand)]
        what: UseWhat,
    },

    /// Log in to the current context's backend.
    Login {
        /// Institutional email (@ucab.edu.ve).
        #[arg(long)]
        email: Option<String>,
        /// Password (prefer the interactive prompt).
        #[arg(long)]
        password: Option<String>,
    },

    /// Drop the session of the current context.
    Logout,

    /// Show the current context and user.
    Status,

    /// Technical locations.
    #[command(alias = "loc")]
    Locations {
        #[command(subcommand)]
        action: LocationAction,
    },

    /// Work groups and their technicians.
    Groups {
        #[command(subcommand)]
        action: GroupAction,
    },

    /// Technicians.
    Technicians {
        #[command(subcommand)]
        action: TechnicianAction,
    },

    /// Download the guide to technical locations.
    Guide {
        /// Output directory.
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum ContextAction {
    /// Create a new context.
    Create {
        name: String,
        /// Backend URL (e.g. http://localhost:3000).
        #[arg(long, default_value = "")]
        server: String,
    },
    /// List all contexts.
    List,
    /// Set properties on a context.
    Set {
        name: String,
        #[arg(long)]
        server: Option<String>,
    },
    /// Delete a context.
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
enum UseWhat {
    /// Switch to a context.
    Context { name: String },
}

#[derive(Subcommand, Debug)]
enum LocationAction {
    /// Locations grouped by module.
    List,
    /// Location tree, optionally filtered by level values.
    Tree {
        #[command(flatten)]
        filter: SegmentArgs,
        /// Also report codes and levels that do not follow their parent.
        #[arg(long)]
        check: bool,
    },
    /// Values available at a level, given the values chosen above it.
    Options {
        /// Level name or number (1-7).
        #[arg(long)]
        level: Level,
        #[command(flatten)]
        upstream: SegmentArgs,
    },
    /// Create a location from its code segments.
    Create {
        #[command(flatten)]
        segments: SegmentArgs,
        #[arg(long)]
        description: String,
        /// The location is an equipment item that can serve others.
        #[arg(long)]
        equipment: bool,
        /// Id of a location this equipment also serves (repeatable).
        #[arg(long = "virtual-parent")]
        virtual_parents: Vec<i64>,
    },
    /// Edit a location.
    Edit {
        id: i64,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        abbreviation: Option<String>,
        /// New physical parent id.
        #[arg(long)]
        parent: Option<i64>,
        #[arg(long = "virtual-parent")]
        virtual_parents: Vec<i64>,
    },
    /// Delete a location.
    Delete {
        id: i64,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },
    /// Locations depending on a location.
    Branches {
        id: i64,
        /// Only this level (name or number).
        #[arg(long)]
        level: Option<Level>,
    },
    /// Physical and virtual parents of a location.
    Parents { id: i64 },
    /// Download the spreadsheet export.
    Export {
        /// Output directory.
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct GroupForm {
    #[arg(long)]
    code: String,
    #[arg(long)]
    name: String,
    /// Supervisor user id.
    #[arg(long)]
    supervisor: String,
}

impl From<GroupForm> for WorkGroupForm {
    fn from(f: GroupForm) -> Self {
        WorkGroupForm {
            code: f.code,
            name: f.name,
            supervisor: f.supervisor,
        }
    }
}

#[derive(Subcommand, Debug)]
enum GroupAction {
    /// List work groups.
    List,
    /// Create a work group.
    Create {
        #[command(flatten)]
        form: GroupForm,
    },
    /// Replace a work group's fields.
    Update {
        id: i64,
        #[command(flatten)]
        form: GroupForm,
    },
    /// Delete a work group.
    Delete {
        id: i64,
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },
    /// Technicians of a work group.
    Members {
        #[command(subcommand)]
        action: MemberAction,
    },
}

#[derive(Subcommand, Debug)]
enum MemberAction {
    List { group: i64 },
    Add { group: i64, technician: i64 },
    Remove { group: i64, technician: i64 },
}

#[derive(Subcommand, Debug)]
enum TechnicianAction {
    /// List technicians and their groups.
    List,
    /// Register a technician.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = cli.output;

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(config::ClientConfig::default_path);
    let config_path = config_path.as_path();

    match cli.command {
        Commands::Context { action } => match action {
            ContextAction::Create { name, server } => {
                commands::context::create(&name, &server, config_path)?;
            }
            ContextAction::List => {
                commands::context::list(config_path)?;
            }
            ContextAction::Set { name, server } => {
                commands::context::set(&name, server.as_deref(), config_path)?;
            }
            ContextAction::Delete { name } => {
                commands::context::delete(&name, config_path)?;
            }
        },

        Commands::Use { what } => match what {
            UseWhat::Context { name } => {
                commands::context::use_context(&name, config_path)?;
            }
        },

        Commands::Login { email, password } => {
            let email = match email {
                Some(e) => e,
                None => {
                    eprint!("Email: ");
                    let mut s = String::new();
                    std::io::stdin().read_line(&mut s)?;
                    s.trim().to_string()
                }
            };
            let password = match password {
                Some(p) => p,
                None => rpassword::prompt_password("Password: ")?,
            };
            commands::login::login(&email, &password, config_path).await?;
        }

        Commands::Logout => {
            commands::login::logout(config_path)?;
        }

        Commands::Status => {
            commands::login::status(config_path)?;
        }

        Commands::Locations { action } => match action {
            LocationAction::List => {
                commands::locations::list(output, config_path).await?;
            }
            LocationAction::Tree { filter, check } => {
                commands::locations::tree(&filter, check, output, config_path).await?;
            }
            LocationAction::Options { level, upstream } => {
                commands::locations::options(level, &upstream, output, config_path).await?;
            }
            LocationAction::Create {
                segments,
                description,
                equipment,
                virtual_parents,
            } => {
                let args = CreateArgs {
                    segments,
                    description,
                    equipment,
                    virtual_parents,
                };
                commands::locations::create(args, output, config_path).await?;
            }
            LocationAction::Edit {
                id,
                description,
                abbreviation,
                parent,
                virtual_parents,
            } => {
                let args = EditArgs {
                    id,
                    description,
                    abbreviation,
                    parent,
                    virtual_parents,
                };
                commands::locations::edit(args, output, config_path).await?;
            }
            LocationAction::Delete { id, yes } => {
                if !yes && !commands::confirm(&format!("Delete location {id}?"))? {
                    println!("Cancelled.");
                    return Ok(());
                }
                commands::locations::delete(id, config_path).await?;
            }
            LocationAction::Branches { id, level } => {
                commands::locations::branches(id, level, output, config_path).await?;
            }
            LocationAction::Parents { id } => {
                commands::locations::parents(id, output, config_path).await?;
            }
            LocationAction::Export { out } => {
                commands::locations::export(&out, config_path).await?;
            }
        },

        Commands::Groups { action } => match action {
            GroupAction::List => {
                commands::groups::list(output, config_path).await?;
            }
            GroupAction::Create { form } => {
                commands::groups::create(form.into(), output, config_path).await?;
            }
            GroupAction::Update { id, form } => {
                commands::groups::update(id, form.into(), config_path).await?;
            }
            GroupAction::Delete { id, yes } => {
                if !yes && !commands::confirm(&format!("Delete work group {id}?"))? {
                    println!("Cancelled.");
                    return Ok(());
                }
                commands::groups::delete(id, config_path).await?;
            }
            GroupAction::Members { action } => match action {
                MemberAction::List { group } => {
                    commands::groups::members(group, output, config_path).await?;
                }
                MemberAction::Add { group, technician } => {
                    commands::groups::add_member(group, technician, config_path).await?;
                }
                MemberAction::Remove { group, technician } => {
                    if !commands::confirm(&format!(
                        "Remove technician {technician} from work group {group}?"
                    ))? {
                        println!("Cancelled.");
                        return Ok(());
                    }
                    commands::groups::remove_member(group, technician, config_path).await?;
                }
            },
        },

        Commands::Technicians { action } => match action {
            TechnicianAction::List => {
                commands::technicians::list(output, config_path).await?;
            }
            TechnicianAction::Create { name, email } => {
                commands::technicians::create(&name, &email, config_path).await?;
            }
        },

        Commands::Guide { out } => {
            commands::guide::download(&out, config_path).await?;
        }

        Commands::Version => {
            println!("gema cli v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
