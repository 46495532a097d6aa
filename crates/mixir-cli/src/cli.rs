//! Command-line interface definition.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use mixir_core::{Gender, MemberFields};

/// mixir - team-building rosters kept in Google Sheets
#[derive(Debug, Parser)]
#[command(name = "mixir")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, global = true, env = "MIXIR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and manage the stored credential
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Groups (one spreadsheet each)
    Group {
        #[command(subcommand)]
        action: GroupAction,
    },

    /// Sub-groups (tabs of a group)
    Subgroup {
        #[command(subcommand)]
        action: SubgroupAction,
    },

    /// Members (rows of a sub-group)
    Member {
        #[command(subcommand)]
        action: MemberAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum AuthAction {
    /// Print the consent URL and remember the pending flow
    Url {
        /// Also open the URL in the default browser
        #[arg(long)]
        open: bool,
    },

    /// Finish sign-in with the code returned to the redirect URI
    Login {
        /// Authorization code from the redirect
        #[arg(long)]
        code: String,

        /// State parameter from the redirect
        #[arg(long)]
        state: String,
    },

    /// Refresh the access token now
    Refresh,

    /// Show the signed-in user
    Whoami,
}

#[derive(Debug, Subcommand)]
pub enum GroupAction {
    /// List groups in the root folder
    List,

    /// Create a group from the template
    Create {
        /// Display name, without the file prefix
        name: String,
    },

    /// Delete a group's spreadsheet
    Delete { group_id: String },

    /// Show a group with its sub-groups
    Info { group_id: String },

    /// Rename a group
    Rename { group_id: String, name: String },

    /// Give another account writer access
    Share { group_id: String, email: String },
}

#[derive(Debug, Subcommand)]
pub enum SubgroupAction {
    /// List the sub-groups of a group
    List { group_id: String },

    /// Add a sub-group with its header row
    Create { group_id: String, name: String },

    /// Rename a sub-group
    Rename {
        group_id: String,
        name: String,
        new_name: String,
    },

    /// Delete a sub-group and its members
    Delete { group_id: String, name: String },
}

#[derive(Debug, Subcommand)]
pub enum MemberAction {
    /// List the members of a sub-group
    List { group_id: String, subgroup: String },

    /// Append a member
    Add {
        group_id: String,
        subgroup: String,
        #[command(flatten)]
        fields: MemberArgs,
    },

    /// Overwrite a member's row
    Edit {
        group_id: String,
        subgroup: String,
        student_id: String,
        #[command(flatten)]
        fields: MemberArgs,
    },

    /// Remove a member
    Delete {
        group_id: String,
        subgroup: String,
        student_id: String,
    },
}

/// Member fields taken from flags.
#[derive(Debug, Clone, Args)]
pub struct MemberArgs {
    /// Member name
    #[arg(long)]
    pub name: String,

    /// male (m) or female (f)
    #[arg(long)]
    pub gender: Gender,

    /// Free-form level
    #[arg(long)]
    pub level: Option<String>,
}

impl From<MemberArgs> for MemberFields {
    fn from(args: MemberArgs) -> Self {
        let fields = MemberFields::new(args.name, args.gender);
        match args.level {
            Some(level) => fields.with_level(level),
            None => fields,
        }
    }
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration and data file paths
    Path,
}
