pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS transactions (
    id          INTEGER PRIMARY KEY,
    date        TEXT NOT NULL,
    description TEXT NOT NULL,
    amount      REAL NOT NULL,
    category    TEXT NOT NULL
);
"#;

pub(crate) const SELECT_COLUMNS: &str = "SELECT id, date, description, amount, category FROM transactions";
