//! SQL rendering per backend
//!
//! Every statement is built from the predicate algebra in `query`. The only
//! backend differences are placeholder syntax, the substring function, the
//! identity column and a text cast on PostgreSQL parameters.

use sitesafe_core::models::RecordKind;
use sitesafe_core::DatabaseBackend;

use super::query::{Field, Predicate, RecordQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

impl From<DatabaseBackend> for Dialect {
    fn from(backend: DatabaseBackend) -> Self {
        match backend {
            DatabaseBackend::Postgres => Dialect::Postgres,
            DatabaseBackend::Sqlite => Dialect::Sqlite,
        }
    }
}

/// Rendered SQL plus its positional text parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlStatement {
    pub sql: String,
    pub binds: Vec<String>,
}

impl Dialect {
    pub fn system(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgresql",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Placeholder for the `n`-th parameter, counted from 1.
    pub fn placeholder(&self, n: usize) -> String {
        match self {
            Dialect::Postgres => format!("CAST(${} AS TEXT)", n),
            Dialect::Sqlite => format!("?{}", n),
        }
    }

    /// Case-insensitive matching lowers both sides in SQL. SQLite's `LOWER` only
    /// folds ASCII, so on that backend non-ASCII letters in stored text match
    /// only in their lowercase form; the needle is already lowercased upstream.
    fn contains(&self, column: &str, param: &str, case_sensitive: bool) -> String {
        let function = match self {
            Dialect::Postgres => "strpos",
            Dialect::Sqlite => "instr",
        };
        if case_sensitive {
            format!("{}(COALESCE({}, ''), {}) > 0", function, column, param)
        } else {
            format!(
                "{}(LOWER(COALESCE({}, '')), LOWER({})) > 0",
                function, column, param
            )
        }
    }

    pub fn id_column(&self) -> &'static str {
        match self {
            Dialect::Postgres => "id BIGSERIAL PRIMARY KEY",
            Dialect::Sqlite => "id INTEGER PRIMARY KEY AUTOINCREMENT",
        }
    }

    fn where_clause(&self, query: &RecordQuery, binds: &mut Vec<String>) -> String {
        let mut conditions = Vec::new();
        for predicate in query.predicates() {
            match predicate {
                Predicate::Equals { field, value } => {
                    binds.push(value.clone());
                    conditions.push(format!(
                        "{} = {}",
                        field.column(),
                        self.placeholder(binds.len())
                    ));
                }
                Predicate::Between { field, start, end } => {
                    binds.push(start.clone());
                    let lower = self.placeholder(binds.len());
                    binds.push(end.clone());
                    let upper = self.placeholder(binds.len());
                    conditions.push(format!(
                        "{col} >= {} AND {col} <= {}",
                        lower,
                        upper,
                        col = range_operand(*field)
                    ));
                }
                Predicate::Contains {
                    fields,
                    needle,
                    case_sensitive,
                } => {
                    if fields.is_empty() {
                        continue;
                    }
                    binds.push(needle.clone());
                    let param = self.placeholder(binds.len());
                    let any = fields
                        .iter()
                        .map(|field| self.contains(field.column(), &param, *case_sensitive))
                        .collect::<Vec<_>>()
                        .join(" OR ");
                    conditions.push(format!("({})", any));
                }
            }
        }

        if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        }
    }

    /// Full rows, newest `created_at` first; equal timestamps fall back to the later insert.
    pub fn select(&self, query: &RecordQuery) -> SqlStatement {
        let columns = Field::columns_of(query.kind())
            .iter()
            .map(Field::column)
            .collect::<Vec<_>>()
            .join(", ");
        let mut binds = Vec::new();
        let filter = self.where_clause(query, &mut binds);
        SqlStatement {
            sql: format!(
                "SELECT {} FROM {}{} ORDER BY created_at DESC, id DESC",
                columns,
                query.kind().table(),
                filter
            ),
            binds,
        }
    }

    pub fn count(&self, query: &RecordQuery) -> SqlStatement {
        let mut binds = Vec::new();
        let filter = self.where_clause(query, &mut binds);
        SqlStatement {
            sql: format!("SELECT COUNT(*) FROM {}{}", query.kind().table(), filter),
            binds,
        }
    }

    /// Distinct non-empty values of one column, ascending.
    pub fn distinct(&self, kind: RecordKind, field: Field) -> SqlStatement {
        SqlStatement {
            sql: format!(
                "SELECT DISTINCT {col} FROM {} WHERE {col} IS NOT NULL AND {col} <> '' ORDER BY {col} ASC",
                kind.table(),
                col = field.column()
            ),
            binds: Vec::new(),
        }
    }

    /// Insert of every non-id column, returning the assigned id.
    pub fn insert(&self, kind: RecordKind) -> String {
        let fields = Field::columns_of(kind)
            .iter()
            .filter(|field| **field != Field::Id)
            .collect::<Vec<_>>();
        let columns = fields
            .iter()
            .map(|field| field.column())
            .collect::<Vec<_>>()
            .join(", ");
        let values = (1..=fields.len())
            .map(|n| self.placeholder(n))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING id",
            kind.table(),
            columns,
            values
        )
    }

    pub fn create_table(&self, kind: RecordKind) -> String {
        let columns = Field::columns_of(kind)
            .iter()
            .map(|field| match field {
                Field::Id => self.id_column().to_string(),
                other => format!("{} TEXT", other.column()),
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE IF NOT EXISTS {} ({})", kind.table(), columns)
    }
}

/// Event dates compare on their calendar-day prefix. Older rows may hold a full
/// timestamp in `date_of_event`.
fn range_operand(field: Field) -> String {
    match field {
        Field::DateOfEvent => format!("substr({}, 1, 10)", field.column()),
        other => other.column().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitesafe_core::models::SiteFilters;

    fn tower_a() -> RecordQuery {
        RecordQuery::from(&SiteFilters {
            building: Some("Tower A".to_string()),
            keyword: Some("Rail".to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn empty_query_has_no_where_clause() {
        let stmt = Dialect::Sqlite.select(&RecordQuery::new(RecordKind::SiteIssue));
        assert_eq!(
            stmt.sql,
            "SELECT id, created_at, date_of_event, company, building, floor, risk_level, issue, photo_path \
             FROM site_issues ORDER BY created_at DESC, id DESC"
        );
        assert!(stmt.binds.is_empty());
    }

    #[test]
    fn sqlite_select_numbers_placeholders() {
        let stmt = Dialect::Sqlite.select(&tower_a());
        assert!(stmt.sql.contains(
            " WHERE building = ?1 AND (instr(LOWER(COALESCE(issue, '')), LOWER(?2)) > 0)"
        ));
        assert_eq!(stmt.binds, vec!["Tower A".to_string(), "Rail".to_string()]);
    }

    #[test]
    fn postgres_select_casts_parameters() {
        let stmt = Dialect::Postgres.count(&tower_a());
        assert_eq!(
            stmt.sql,
            "SELECT COUNT(*) FROM site_issues WHERE building = CAST($1 AS TEXT) AND \
             (strpos(LOWER(COALESCE(issue, '')), LOWER(CAST($2 AS TEXT))) > 0)"
        );
    }

    #[test]
    fn case_sensitive_contains_skips_lowering() {
        let query = RecordQuery::new(RecordKind::PersonnelViolation).keyword(Some("PPE"), true);
        let stmt = Dialect::Sqlite.count(&query);
        assert!(stmt.sql.contains("instr(COALESCE(description, ''), ?1) > 0 OR"));
        assert!(!stmt.sql.contains("LOWER"));
    }

    #[test]
    fn between_is_inclusive() {
        let query = RecordQuery::new(RecordKind::PersonnelViolation).between(
            Field::DateOfEvent,
            "2024-01-01".to_string(),
            "2024-01-31".to_string(),
        );
        let stmt = Dialect::Sqlite.count(&query);
        assert!(stmt
            .sql
            .ends_with("WHERE substr(date_of_event, 1, 10) >= ?1 AND substr(date_of_event, 1, 10) <= ?2"));
    }

    #[test]
    fn between_on_other_columns_compares_raw_text() {
        let query = RecordQuery::new(RecordKind::SiteIssue).between(
            Field::CreatedAt,
            "2024-01-01T00:00:00".to_string(),
            "2024-01-31T23:59:59".to_string(),
        );
        let stmt = Dialect::Postgres.count(&query);
        assert!(stmt.sql.ends_with(
            "WHERE created_at >= CAST($1 AS TEXT) AND created_at <= CAST($2 AS TEXT)"
        ));
    }

    #[test]
    fn distinct_skips_blank_values() {
        let stmt = Dialect::Postgres.distinct(RecordKind::SiteIssue, Field::Building);
        assert_eq!(
            stmt.sql,
            "SELECT DISTINCT building FROM site_issues WHERE building IS NOT NULL AND building <> '' ORDER BY building ASC"
        );
    }

    #[test]
    fn insert_returns_id() {
        let sql = Dialect::Sqlite.insert(RecordKind::SiteIssue);
        assert_eq!(
            sql,
            "INSERT INTO site_issues (created_at, date_of_event, company, building, floor, risk_level, issue, photo_path) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) RETURNING id"
        );
    }

    #[test]
    fn identity_column_differs_per_backend() {
        assert!(Dialect::Postgres
            .create_table(RecordKind::PersonnelViolation)
            .contains("id BIGSERIAL PRIMARY KEY, created_at TEXT"));
        assert!(Dialect::Sqlite
            .create_table(RecordKind::SiteIssue)
            .starts_with("CREATE TABLE IF NOT EXISTS site_issues (id INTEGER PRIMARY KEY AUTOINCREMENT"));
    }
}
