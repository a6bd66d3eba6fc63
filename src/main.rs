//! Dog Food Calculator (DFC)
//!
//! An MCP server for estimating daily dog food portions.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use dfc::mcp::DfcService;
use dfc::tools::status::{BuildStamp, VERSION};
use dfc::{config, db};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout stays reserved for MCP stdio
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("dfc=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let build = BuildStamp::current();
    tracing::info!(
        version = VERSION,
        build = build.number,
        compiled_at = build.compiled_at,
        "Starting Dog Food Calculator MCP server on stdio"
    );

    let db_path = config::database_path();
    tracing::info!(path = %db_path.display(), "Opening database");

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = db::Database::new(&db_path)?;

    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        tracing::info!(version, "Database schema ready");
        Ok(())
    })?;

    let (tables, tables_source) = config::load_tables()?;
    tracing::info!(source = %tables_source, "Portion tables ready");

    let service = DfcService::new(db_path, database, tables, tables_source);

    let transport = (stdin(), stdout());

    let server = service.serve(transport).await?;

    server.waiting().await?;

    Ok(())
}
