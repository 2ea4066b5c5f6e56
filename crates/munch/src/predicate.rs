//! Ordered WHERE-clause accumulation.

use crate::dialect::Dialect;
use crate::format::ElisionPolicy;
use crate::value::Value;

/// One WHERE-clause condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Join with `OR` instead of `AND`. Ignored for the first rendered filter.
    pub disjunctive: bool,
    pub column: String,
    pub comparator: String,
    pub value: Value,
}

impl Filter {
    pub fn new(
        column: impl Into<String>,
        comparator: impl Into<String>,
        value: Value,
        disjunctive: bool,
    ) -> Self {
        Self {
            disjunctive,
            column: column.into(),
            comparator: comparator.into(),
            value,
        }
    }

    /// Comparator used at render time: list values force `IN` (keeping an explicit `NOT IN`).
    pub fn effective_comparator(&self) -> &str {
        if !self.value.is_list() {
            return &self.comparator;
        }
        if self.comparator.trim().eq_ignore_ascii_case("NOT IN") {
            "NOT IN"
        } else {
            "IN"
        }
    }
}

/// `IN` / `NOT IN`, which need a parenthesised operand.
fn is_membership(comparator: &str) -> bool {
    let comparator = comparator.trim();
    comparator.eq_ignore_ascii_case("IN") || comparator.eq_ignore_ascii_case("NOT IN")
}

/// Filters in insertion order, which is also render order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateSet {
    filters: Vec<Filter>,
}

impl PredicateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter. Column and comparator are not validated.
    pub fn push(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Filter> {
        self.filters.iter()
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    /// Append ` WHERE ...` / ` AND ...` / ` OR ...` clauses to `out`.
    ///
    /// Filters whose value the policy omits are skipped entirely, so the first
    /// *rendered* filter gets `WHERE`. Nothing is written when every filter is
    /// omitted.
    pub fn render_into(&self, out: &mut String, dialect: Dialect, policy: ElisionPolicy) {
        let mut first = true;
        for filter in &self.filters {
            let Some(literal) = policy.render(&filter.value, dialect) else {
                continue;
            };

            let keyword = if first {
                "WHERE"
            } else if filter.disjunctive {
                "OR"
            } else {
                "AND"
            };
            first = false;

            out.push(' ');
            out.push_str(keyword);
            out.push(' ');
            dialect.write_ident(out, &filter.column);
            let comparator = filter.effective_comparator();
            out.push(' ');
            out.push_str(comparator);
            out.push(' ');
            if !filter.value.is_list() && is_membership(comparator) {
                out.push('(');
                out.push_str(&literal);
                out.push(')');
            } else {
                out.push_str(&literal);
            }
        }
    }

    /// The rendered clause on its own (leading space included), for inspection.
    pub fn to_sql(&self, dialect: Dialect, policy: ElisionPolicy) -> String {
        let mut out = String::new();
        self.render_into(&mut out, dialect, policy);
        out
    }
}

impl<'a> IntoIterator for &'a PredicateSet {
    type Item = &'a Filter;
    type IntoIter = std::slice::Iter<'a, Filter>;

    fn into_iter(self) -> Self::IntoIter {
        self.filters.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PG: Dialect = Dialect::Postgres;
    const POLICY: ElisionPolicy = ElisionPolicy::EmptyLiteral;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn first_clause_is_where_then_and_or() {
        let mut set = PredicateSet::new();
        set.push(Filter::new("Firstname", "=", text("Test"), false));
        set.push(Filter::new("Email", "=", text("test@test.com"), true));
        set.push(Filter::new("Age", ">", Value::Int(5), false));
        assert_eq!(
            set.to_sql(PG, POLICY),
            " WHERE \"Firstname\" = 'Test' OR \"Email\" = 'test@test.com' AND \"Age\" > 5"
        );
    }

    #[test]
    fn elided_filters_do_not_consume_where() {
        let mut set = PredicateSet::new();
        set.push(Filter::new("Firstname", "=", text(""), false));
        set.push(Filter::new("Lastname", "=", Value::Null, true));
        set.push(Filter::new("Email", "=", text("a@b.c"), true));
        assert_eq!(set.to_sql(PG, POLICY), " WHERE \"Email\" = 'a@b.c'");
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn only_elided_filters_render_nothing() {
        let mut set = PredicateSet::new();
        set.push(Filter::new("Firstname", "=", text(""), false));
        assert_eq!(set.to_sql(PG, POLICY), "");
    }

    #[test]
    fn list_values_force_in() {
        let f = Filter::new("GroupId", "=", Value::List(vec![Value::Int(1)]), false);
        assert_eq!(f.effective_comparator(), "IN");
        let f = Filter::new("GroupId", "not in", Value::List(vec![Value::Int(1)]), false);
        assert_eq!(f.effective_comparator(), "NOT IN");
        let f = Filter::new("GroupId", ">=", Value::Int(1), false);
        assert_eq!(f.effective_comparator(), ">=");
    }

    #[test]
    fn scalar_membership_operand_is_parenthesised() {
        let mut set = PredicateSet::new();
        set.push(Filter::new("UserId", "IN", Value::Int(5), false));
        set.push(Filter::new("Email", "not in", text("a@b.c"), true));
        set.push(Filter::new("GroupId", "IN", Value::List(vec![Value::Int(1)]), false));
        assert_eq!(
            set.to_sql(PG, POLICY),
            " WHERE \"UserId\" IN (5) OR \"Email\" not in ('a@b.c') AND \"GroupId\" IN (1)"
        );
    }
}
