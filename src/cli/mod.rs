//! Command-line interface for td
//!
//! This module defines the CLI structure using clap derive macros. Session,
//! profile, and task commands live in their own submodules; each command
//! composes the containers, restores any persisted session, runs one
//! operation, and emits the shared output envelope.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;

mod profile;
mod session;
mod task;

/// td - taskdeck
///
/// Track personal tasks against a hosted backend: log in, add and edit
/// tasks, filter them, and watch progress from a terminal dashboard.
#[derive(Parser, Debug)]
#[command(name = "td")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, env = "TASKDECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with an email and password
    Login {
        /// Account email
        email: String,

        /// Account password
        #[arg(long, env = "TASKDECK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account
    Register {
        /// Account email
        email: String,

        /// Display name for the new profile
        #[arg(long)]
        username: String,

        /// Account password
        #[arg(long, env = "TASKDECK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// End the session and clear local credentials
    Logout,

    /// Show the current session and profile
    Whoami,

    /// Profile management
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Open the terminal dashboard
    Dash,
}

/// Profile subcommands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Show the profile row
    Show,

    /// Update profile fields; only the given fields are sent
    Set {
        /// New display name
        #[arg(long)]
        username: Option<String>,

        /// New avatar URL
        #[arg(long)]
        avatar_url: Option<String>,

        /// Theme preference: light or dark
        #[arg(long)]
        theme: Option<String>,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(long, default_value = "")]
        description: String,

        /// Priority: low, medium, or high
        #[arg(long, default_value = "medium")]
        priority: String,
    },

    /// List tasks, optionally filtered
    Ls {
        /// Status filter: todo, in-progress, completed, or all
        #[arg(long, default_value = "all")]
        status: String,

        /// Priority filter: low, medium, high, or all
        #[arg(long, default_value = "all")]
        priority: String,

        /// Case-insensitive title search
        #[arg(long)]
        search: Option<String>,
    },

    /// Show per-status task counts
    Count,

    /// Show one task
    Show {
        /// Task id (full or unique prefix)
        id: String,
    },

    /// Edit task fields; only the given fields are sent
    Edit {
        /// Task id (full or unique prefix)
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New priority
        #[arg(long)]
        priority: Option<String>,

        /// New status
        #[arg(long)]
        status: Option<String>,
    },

    /// Advance a task to the next status in the cycle
    Cycle {
        /// Task id (full or unique prefix)
        id: String,
    },

    /// Mark a task completed
    Done {
        /// Task id (full or unique prefix)
        id: String,
    },

    /// Delete a task
    Rm {
        /// Task id (full or unique prefix)
        id: String,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Login { email, password } => {
                session::run_login(session::LoginOptions {
                    email,
                    password,
                    config: self.config,
                    json: self.json,
                    quiet: self.quiet,
                })
                .await
            }
            Commands::Register {
                email,
                username,
                password,
            } => {
                session::run_register(session::RegisterOptions {
                    email,
                    username,
                    password,
                    config: self.config,
                    json: self.json,
                    quiet: self.quiet,
                })
                .await
            }
            Commands::Logout => {
                session::run_logout(session::LogoutOptions {
                    config: self.config,
                    json: self.json,
                    quiet: self.quiet,
                })
                .await
            }
            Commands::Whoami => {
                session::run_whoami(session::WhoamiOptions {
                    config: self.config,
                    json: self.json,
                    quiet: self.quiet,
                })
                .await
            }
            Commands::Profile(cmd) => match cmd {
                ProfileCommands::Show => {
                    profile::run_show(profile::ShowOptions {
                        config: self.config,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                ProfileCommands::Set {
                    username,
                    avatar_url,
                    theme,
                } => {
                    profile::run_set(profile::SetOptions {
                        username,
                        avatar_url,
                        theme,
                        config: self.config,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
            },
            Commands::Task(cmd) => match cmd {
                TaskCommands::Add {
                    title,
                    description,
                    priority,
                } => {
                    task::run_add(task::AddOptions {
                        title,
                        description,
                        priority,
                        config: self.config,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Ls {
                    status,
                    priority,
                    search,
                } => {
                    task::run_ls(task::LsOptions {
                        status,
                        priority,
                        search,
                        config: self.config,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Count => {
                    task::run_count(task::CountOptions {
                        config: self.config,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Show { id } => {
                    task::run_show(task::ShowOptions {
                        id,
                        config: self.config,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Edit {
                    id,
                    title,
                    description,
                    priority,
                    status,
                } => {
                    task::run_edit(task::EditOptions {
                        id,
                        title,
                        description,
                        priority,
                        status,
                        config: self.config,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Cycle { id } => {
                    task::run_cycle(task::CycleOptions {
                        id,
                        config: self.config,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Done { id } => {
                    task::run_done(task::DoneOptions {
                        id,
                        config: self.config,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Rm { id } => {
                    task::run_rm(task::RmOptions {
                        id,
                        config: self.config,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
            },
            Commands::Dash => {
                let app = session::compose_app(self.config.as_deref(), false)?;
                app.session.restore().await?;
                let handle = tokio::runtime::Handle::current();
                tokio::task::block_in_place(|| crate::ui::dashboard::run(app, handle))
            }
        }
    }
}
