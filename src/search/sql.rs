//! Render a predicate as a parameterised SQLite WHERE clause / 生成SQL条件

use super::predicate::Predicate;

/// SQL text with `?` placeholders and their bind values, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
    pub sql: String,
    pub params: Vec<String>,
}

impl Predicate {
    pub fn to_sql(&self) -> SqlFragment {
        let mut fragment = SqlFragment::default();
        self.write_sql(&mut fragment);
        fragment
    }

    fn write_sql(&self, out: &mut SqlFragment) {
        match self {
            Predicate::All(children) => write_group(children, " AND ", "1 = 1", out),
            Predicate::Any(children) => write_group(children, " OR ", "1 = 0", out),
            Predicate::Contains { field, needle } => {
                // plain substring test: no wildcards, no pattern length limit
                out.sql.push_str(&format!("instr({}, ?) > 0", field.column()));
                out.params.push(needle.clone());
            }
            Predicate::Equals { field, value } => {
                out.sql.push_str(&format!("{} = ?", field.column()));
                out.params.push(value.clone());
            }
            Predicate::BornOn(date) => {
                // date_of_birth is stored as RFC 3339 text in UTC
                out.sql.push_str("substr(date_of_birth, 1, 10) = ?");
                out.params.push(date.format("%Y-%m-%d").to_string());
            }
        }
    }
}

fn write_group(children: &[Predicate], joiner: &str, empty: &str, out: &mut SqlFragment) {
    if children.is_empty() {
        out.sql.push_str(empty);
        return;
    }
    out.sql.push('(');
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            out.sql.push_str(joiner);
        }
        child.write_sql(out);
    }
    out.sql.push(')');
}
