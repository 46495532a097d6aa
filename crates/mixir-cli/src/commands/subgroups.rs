//! Sub-group commands.

use super::Context;
use crate::error::CliResult;

pub async fn list(ctx: &Context, group_id: &str) -> CliResult<()> {
    let user = ctx.principal().await?;
    let subgroups = ctx.store()?.list_subgroups(&user, group_id).await?;
    ctx.emit(&subgroups, |subgroups| {
        for subgroup in subgroups {
            println!("{}\t{}", subgroup.sheet_id, subgroup.name);
        }
    })
}

pub async fn create(ctx: &Context, group_id: &str, name: &str) -> CliResult<()> {
    let user = ctx.principal().await?;
    let subgroup = ctx.store()?.create_subgroup(&user, group_id, name).await?;
    ctx.emit(&subgroup, |s| println!("{}\t{}", s.sheet_id, s.name))
}

pub async fn rename(ctx: &Context, group_id: &str, name: &str, new_name: &str) -> CliResult<()> {
    let user = ctx.principal().await?;
    ctx.store()?
        .rename_subgroup(&user, group_id, name, new_name)
        .await?;
    ctx.done("Sub-group renamed.")
}

pub async fn delete(ctx: &Context, group_id: &str, name: &str) -> CliResult<()> {
    let user = ctx.principal().await?;
    ctx.store()?.delete_subgroup(&user, group_id, name).await?;
    ctx.done("Sub-group deleted.")
}
