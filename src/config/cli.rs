use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "roster")]
#[command(about = "Track time-bounded affiliations of individuals with groups")]
pub struct CliConfig {
    /// TOML file seeding the identity directory
    #[arg(long, default_value = "./roster.toml")]
    pub registry: String,

    /// JSON file holding the enrollment table
    #[arg(long, default_value = "./enrollments.json")]
    pub store: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Enroll an individual in a group over a period
    Enroll {
        /// Main key of the individual
        mk: String,
        /// Group name
        group: String,
        /// Period start (ISO-8601; defaults to the open range minimum)
        #[arg(long)]
        from_date: Option<String>,
        /// Period end (ISO-8601; defaults to the open range maximum)
        #[arg(long)]
        to_date: Option<String>,
        /// Insert even when the period overlaps stored ones; skips merging
        #[arg(long)]
        force: bool,
    },
    /// Remove the enrollment matching the given period exactly
    Withdraw {
        mk: String,
        group: String,
        #[arg(long)]
        from_date: Option<String>,
        #[arg(long)]
        to_date: Option<String>,
    },
    /// List the stored enrollments of an individual in a group
    List { mk: String, group: String },
}
