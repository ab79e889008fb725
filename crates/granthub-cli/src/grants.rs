//! Read-only grant listing and school seeding.

use chrono::NaiveDate;
use granthub_db::{GrantFilters, GrantRow};

/// Load `schools.yaml` and upsert every profile.
///
/// # Errors
///
/// Returns an error if the profiles cannot be loaded or written.
pub(crate) async fn run_seed(
    pool: &sqlx::PgPool,
    config: &granthub_core::AppConfig,
) -> anyhow::Result<()> {
    let schools = granthub_core::load_schools(&config.schools_path)?;
    let count = granthub_db::seed_schools(pool, &schools.schools).await?;
    println!(
        "seeded {count} schools from {}",
        config.schools_path.display()
    );
    Ok(())
}

/// Print stored grants, soonest deadline first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub(crate) async fn run_list_grants(
    pool: &sqlx::PgPool,
    school: Option<&str>,
    query: Option<&str>,
) -> anyhow::Result<()> {
    let filters = GrantFilters {
        school_name: school.map(str::trim).filter(|s| !s.is_empty()),
        title_query: query.map(str::trim).filter(|q| !q.is_empty()),
    };
    let rows = granthub_db::list_grants(pool, filters).await?;

    if rows.is_empty() {
        println!("no grants found");
        return Ok(());
    }

    for row in &rows {
        println!("{}", format_row(row));
    }
    println!("{} grants", rows.len());
    Ok(())
}

/// Format an optional date for display, a dash when unknown.
fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(
        || "\u{2014}".to_string(),
        |d| d.format("%Y-%m-%d").to_string(),
    )
}

pub(crate) fn format_row(row: &GrantRow) -> String {
    format!(
        "{:<10}  {}  {:<20}  {}\n            {}",
        fmt_date(row.deadline),
        row.relevance_score,
        row.school_name,
        row.title,
        row.source_url
    )
}
