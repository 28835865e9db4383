//! Lightweight SQL inspection used to name logged calls.

use once_cell::sync::Lazy;
use regex::Regex;

/// Leading SQL verb of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlOperation {
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Drop,
    Alter,
    Truncate,
    Begin,
    Commit,
    Rollback,
    Set,
    Other,
}

const VERBS: &[(&str, SqlOperation)] = &[
    ("SELECT", SqlOperation::Select),
    ("WITH", SqlOperation::Select),
    ("INSERT", SqlOperation::Insert),
    ("UPDATE", SqlOperation::Update),
    ("DELETE", SqlOperation::Delete),
    ("CREATE", SqlOperation::Create),
    ("DROP", SqlOperation::Drop),
    ("ALTER", SqlOperation::Alter),
    ("TRUNCATE", SqlOperation::Truncate),
    ("BEGIN", SqlOperation::Begin),
    ("START", SqlOperation::Begin),
    ("COMMIT", SqlOperation::Commit),
    ("ROLLBACK", SqlOperation::Rollback),
    ("SET", SqlOperation::Set),
];

// One optionally quoted identifier, captured.
const IDENT: &str = r#"[`"\[]?(\w+)[`"\]]?"#;

static FROM_TABLE: Lazy<Regex> = Lazy::new(|| table_regex(r"\bFROM\s+"));
static INSERT_TABLE: Lazy<Regex> = Lazy::new(|| table_regex(r"\bINSERT\s+INTO\s+"));
static UPDATE_TABLE: Lazy<Regex> = Lazy::new(|| table_regex(r"\bUPDATE\s+"));
static CREATE_TABLE: Lazy<Regex> = Lazy::new(|| {
    table_regex(r"\bCREATE\s+(?:TEMP(?:ORARY)?\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?")
});
static DROP_TABLE: Lazy<Regex> = Lazy::new(|| table_regex(r"\bDROP\s+TABLE\s+(?:IF\s+EXISTS\s+)?"));
static ALTER_TABLE: Lazy<Regex> = Lazy::new(|| table_regex(r"\bALTER\s+TABLE\s+"));
static TRUNCATE_TABLE: Lazy<Regex> = Lazy::new(|| table_regex(r"\bTRUNCATE\s+(?:TABLE\s+)?"));

fn table_regex(prefix: &str) -> Regex {
    Regex::new(&format!("(?i){}{}", prefix, IDENT)).expect("table pattern is valid")
}

impl SqlOperation {
    /// Classify a query by its first keyword.
    pub fn of(sql: &str) -> Self {
        let head: String = sql
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_ascii_uppercase();

        VERBS
            .iter()
            .find(|(verb, _)| *verb == head)
            .map_or(SqlOperation::Other, |(_, op)| *op)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SqlOperation::Select => "SELECT",
            SqlOperation::Insert => "INSERT",
            SqlOperation::Update => "UPDATE",
            SqlOperation::Delete => "DELETE",
            SqlOperation::Create => "CREATE",
            SqlOperation::Drop => "DROP",
            SqlOperation::Alter => "ALTER",
            SqlOperation::Truncate => "TRUNCATE",
            SqlOperation::Begin => "BEGIN",
            SqlOperation::Commit => "COMMIT",
            SqlOperation::Rollback => "ROLLBACK",
            SqlOperation::Set => "SET",
            SqlOperation::Other => "QUERY",
        }
    }

    fn table_regex(&self) -> Option<&'static Regex> {
        match self {
            SqlOperation::Select | SqlOperation::Delete => Some(&*FROM_TABLE),
            SqlOperation::Insert => Some(&*INSERT_TABLE),
            SqlOperation::Update => Some(&*UPDATE_TABLE),
            SqlOperation::Create => Some(&*CREATE_TABLE),
            SqlOperation::Drop => Some(&*DROP_TABLE),
            SqlOperation::Alter => Some(&*ALTER_TABLE),
            SqlOperation::Truncate => Some(&*TRUNCATE_TABLE),
            _ => None,
        }
    }
}

impl std::fmt::Display for SqlOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation and primary table of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSql {
    pub operation: SqlOperation,
    pub table: Option<String>,
}

impl ParsedSql {
    pub fn parse(sql: &str) -> Self {
        let operation = SqlOperation::of(sql);
        let table = operation
            .table_regex()
            .and_then(|re| re.captures(sql))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_lowercase());

        Self { operation, table }
    }

    /// `"SELECT users"`, or just `"SELECT"` when the table is unknown.
    pub fn summary(&self) -> String {
        match &self.table {
            Some(table) => format!("{} {}", self.operation, table),
            None => self.operation.to_string(),
        }
    }
}
