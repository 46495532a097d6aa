//! Member commands.

use mixir_core::{MemberFields, Student};

use super::Context;
use crate::error::CliResult;

fn print_student(student: &Student) {
    println!(
        "{}\t{}\t{}\t{}",
        student.student_id,
        student.name,
        student.gender,
        student.level.as_deref().unwrap_or("-")
    );
}

pub async fn list(ctx: &Context, group_id: &str, subgroup: &str) -> CliResult<()> {
    let user = ctx.principal().await?;
    let students = ctx.store()?.list_members(&user, group_id, subgroup).await?;
    ctx.emit(&students, |students| students.iter().for_each(print_student))
}

pub async fn add(ctx: &Context, group_id: &str, subgroup: &str, fields: MemberFields) -> CliResult<()> {
    let user = ctx.principal().await?;
    let student = ctx
        .store()?
        .add_member(&user, group_id, subgroup, fields)
        .await?;
    ctx.emit(&student, print_student)
}

pub async fn edit(
    ctx: &Context,
    group_id: &str,
    subgroup: &str,
    student_id: &str,
    fields: MemberFields,
) -> CliResult<()> {
    let user = ctx.principal().await?;
    let student = ctx
        .store()?
        .edit_member(&user, group_id, subgroup, student_id, fields)
        .await?;
    ctx.emit(&student, print_student)
}

pub async fn delete(ctx: &Context, group_id: &str, subgroup: &str, student_id: &str) -> CliResult<()> {
    let user = ctx.principal().await?;
    ctx.store()?
        .delete_member(&user, group_id, subgroup, student_id)
        .await?;
    ctx.done(&format!("Member {student_id} deleted."))
}
