use ::duckdb::Connection;

use crate::TableRef;

struct Migration {
    version: &'static str,
    /// `{schema}`, `{table}` and `{qualified}` are substituted with quoted,
    /// validated identifiers before execution.
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "0001_observations",
        sql: r#"
CREATE TABLE IF NOT EXISTS {qualified} (
    bank TEXT NOT NULL,
    rate DOUBLE NOT NULL CHECK (rate > 0),
    fetched_at TIMESTAMP NOT NULL
);
"#,
    },
    Migration {
        version: "0002_bank_fetched_at_index",
        sql: r#"
CREATE INDEX IF NOT EXISTS "idx_{table}_bank_fetched_at" ON {qualified}(bank, fetched_at);
"#,
    },
];

pub fn apply_migrations(connection: &Connection, target: &TableRef) -> Result<(), ::duckdb::Error> {
    let schema = target.schema();
    connection.execute_batch(&format!(
        r#"
CREATE SCHEMA IF NOT EXISTS "{schema}";
CREATE TABLE IF NOT EXISTS "{schema}".schema_migrations (
    version TEXT NOT NULL,
    target TEXT NOT NULL,
    applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY(version, target)
);
"#
    ))?;

    let ledger = format!(r#""{schema}".schema_migrations"#);
    for migration in MIGRATIONS {
        let applied_count: i64 = connection.query_row(
            &format!("SELECT COUNT(*) FROM {ledger} WHERE version = ? AND target = ?"),
            [migration.version, target.table()],
            |row| row.get(0),
        )?;

        if applied_count == 0 {
            connection.execute_batch(&render(migration.sql, target))?;
            connection.execute(
                &format!("INSERT INTO {ledger} (version, target) VALUES (?, ?)"),
                [migration.version, target.table()],
            )?;
        }
    }

    Ok(())
}

fn render(sql: &str, target: &TableRef) -> String {
    sql.replace("{qualified}", &target.qualified())
        .replace("{schema}", target.schema())
        .replace("{table}", target.table())
}
