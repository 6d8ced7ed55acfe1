//! Command-line interface.

use clap::{Parser, Subcommand};

/// Marketplace backend with code-gated registration and approvals
#[derive(Parser)]
#[command(name = "marketplace")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API and the maintenance scheduler (default)
    #[command(alias = "daemon", alias = "-d", alias = "--daemon")]
    Serve,

    /// Write a default config.toml in the working directory
    Init,

    /// Print an argon2 hash suitable for admin.password_hash
    HashPassword {
        /// Plaintext password to hash
        plaintext: String,
    },

    /// Delete expired one-time codes once and exit
    PurgeCodes,
}

impl Cli {
    #[must_use]
    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Serve)
    }
}
