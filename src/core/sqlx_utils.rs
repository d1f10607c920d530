use sqlx::{
    postgres::{PgArguments, PgRow},
    query::QueryAs,
    Postgres,
};
use uuid::Uuid;

use crate::model::project::ProjectCategory;

#[derive(Clone, Debug, PartialEq)]
pub enum SqlxBinds {
    String(String),
    Uuid(Uuid),
    ProjectCategory(ProjectCategory),
}

pub fn binds_query_as<'a, T: for<'r> sqlx::FromRow<'r, PgRow>>(
    stmt: &'a str,
    binds: Vec<SqlxBinds>,
) -> QueryAs<'a, Postgres, T, PgArguments> {
    let mut q: QueryAs<'_, Postgres, T, PgArguments> = sqlx::query_as(stmt);
    for bind in binds.into_iter() {
        q = match bind {
            SqlxBinds::String(val) => q.bind(val),
            SqlxBinds::Uuid(val) => q.bind(val),
            SqlxBinds::ProjectCategory(val) => q.bind(val),
        };
    }
    q
}

/// Assembles `SELECT .. FROM .. WHERE .. ORDER BY ..`. `from` may be a single
/// table or a join expression; `wheres` are AND-ed.
pub fn query_builder(
    select: Option<String>,
    from: &str,
    wheres: &[String],
    order_by: Vec<String>,
) -> String {
    // Select
    let mut stmt = "SELECT ".to_string();
    if let Some(val) = select {
        stmt.push_str(&val);
    } else {
        stmt.push('*');
    }

    // From
    stmt.push_str(format!(" FROM {}", from).as_str());

    // Where
    if !wheres.is_empty() {
        stmt.push_str(" WHERE ");
        stmt.push_str(&wheres.join(" AND "));
    }

    // order by
    if !order_by.is_empty() {
        stmt.push_str(" ORDER BY ");
        stmt.push_str(&order_by.join(", "));
    }
    stmt
}
