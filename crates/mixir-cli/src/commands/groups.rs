//! Group commands.

use serde_json::json;

use super::Context;
use crate::error::{CliError, CliResult};

pub async fn list(ctx: &Context) -> CliResult<()> {
    let user = ctx.principal().await?;
    let groups = ctx.store()?.list_groups(&user).await?;
    ctx.emit(&groups, |groups| {
        if groups.is_empty() {
            println!("No groups.");
        }
        for group in groups {
            println!("{}\t{}", group.group_id, group.name);
        }
    })
}

pub async fn create(ctx: &Context, name: &str) -> CliResult<()> {
    if ctx.config.store.template_file_id.trim().is_empty() {
        return Err(CliError::Config(
            "store.template_file_id must be set to create groups".to_string(),
        ));
    }
    let user = ctx.principal().await?;
    let group_id = ctx.store()?.create_group(&user, name).await?;
    ctx.emit(&json!({ "group_id": group_id }), |_| println!("{group_id}"))
}

pub async fn delete(ctx: &Context, group_id: &str) -> CliResult<()> {
    let user = ctx.principal().await?;
    ctx.store()?.delete_group(&user, group_id).await?;
    ctx.done("Group deleted.")
}

pub async fn info(ctx: &Context, group_id: &str) -> CliResult<()> {
    let user = ctx.principal().await?;
    let info = ctx.store()?.get_group_info(&user, group_id).await?;
    ctx.emit(&info, |info| {
        println!("{} ({})", info.name, info.group_id);
        for subgroup in &info.subgroups {
            println!("  {}\t{}", subgroup.sheet_id, subgroup.name);
        }
    })
}

pub async fn rename(ctx: &Context, group_id: &str, name: &str) -> CliResult<()> {
    let user = ctx.principal().await?;
    ctx.store()?.rename_group(&user, group_id, name).await?;
    ctx.done("Group renamed.")
}

pub async fn share(ctx: &Context, group_id: &str, email: &str) -> CliResult<()> {
    let user = ctx.principal().await?;
    ctx.store()?.share_group(&user, group_id, email).await?;
    ctx.done(&format!("Shared with {email}."))
}
