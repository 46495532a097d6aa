//! mixir CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use mixir_core::{TracingConfig, TracingOutputFormat, init_tracing};

use mixir_cli::cli::{AuthAction, Cli, Command, ConfigAction, GroupAction, MemberAction, SubgroupAction};
use mixir_cli::commands::{self, Context};
use mixir_cli::config::CliConfig;
use mixir_cli::error::CliResult;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut tracing_config = TracingConfig::from_verbosity(cli.verbose);
    if cli.log_json {
        tracing_config = tracing_config.with_format(TracingOutputFormat::Json);
    }
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {e}");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            if let Some(hint) = e.hint() {
                eprintln!("hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = match cli.config {
        Some(ref path) => CliConfig::load_from(path)?,
        None => CliConfig::load()?,
    };
    let ctx = Context::new(config, cli.json);

    match cli.command {
        Command::Auth { action } => match action {
            AuthAction::Url { open } => commands::auth::url(&ctx, open),
            AuthAction::Login { code, state } => commands::auth::login(&ctx, &code, &state).await,
            AuthAction::Refresh => commands::auth::refresh(&ctx).await,
            AuthAction::Whoami => commands::auth::whoami(&ctx),
        },
        Command::Group { action } => match action {
            GroupAction::List => commands::groups::list(&ctx).await,
            GroupAction::Create { name } => commands::groups::create(&ctx, &name).await,
            GroupAction::Delete { group_id } => commands::groups::delete(&ctx, &group_id).await,
            GroupAction::Info { group_id } => commands::groups::info(&ctx, &group_id).await,
            GroupAction::Rename { group_id, name } => {
                commands::groups::rename(&ctx, &group_id, &name).await
            }
            GroupAction::Share { group_id, email } => {
                commands::groups::share(&ctx, &group_id, &email).await
            }
        },
        Command::Subgroup { action } => match action {
            SubgroupAction::List { group_id } => commands::subgroups::list(&ctx, &group_id).await,
            SubgroupAction::Create { group_id, name } => {
                commands::subgroups::create(&ctx, &group_id, &name).await
            }
            SubgroupAction::Rename {
                group_id,
                name,
                new_name,
            } => commands::subgroups::rename(&ctx, &group_id, &name, &new_name).await,
            SubgroupAction::Delete { group_id, name } => {
                commands::subgroups::delete(&ctx, &group_id, &name).await
            }
        },
        Command::Member { action } => match action {
            MemberAction::List { group_id, subgroup } => {
                commands::members::list(&ctx, &group_id, &subgroup).await
            }
            MemberAction::Add {
                group_id,
                subgroup,
                fields,
            } => commands::members::add(&ctx, &group_id, &subgroup, fields.into()).await,
            MemberAction::Edit {
                group_id,
                subgroup,
                student_id,
                fields,
            } => {
                commands::members::edit(&ctx, &group_id, &subgroup, &student_id, fields.into()).await
            }
            MemberAction::Delete {
                group_id,
                subgroup,
                student_id,
            } => commands::members::delete(&ctx, &group_id, &subgroup, &student_id).await,
        },
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&ctx),
            ConfigAction::Validate => commands::config::validate(&ctx),
            ConfigAction::Path => commands::config::path(&ctx),
        },
    }
}
