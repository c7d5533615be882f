//! Compile typed filter groups into SQL.
//!
//! Every group becomes one parenthesized `AND` clause whose alternatives are
//! joined with `OR`. All user values are bound, never interpolated.

use bloodlink_core::filter::{DonorField, FilterGroup, Match, RequestField, Value};
use sqlx::{Postgres, QueryBuilder};

/// Maps a filter field to its qualified column.
pub trait Column: Copy {
    fn column(self) -> &'static str;
}

impl Column for RequestField {
    fn column(self) -> &'static str {
        match self {
            RequestField::DonationStatus => "r.donation_status",
            RequestField::BloodGroup => "r.blood_group",
            RequestField::RecipientName => "r.recipient_name",
            RequestField::HospitalName => "r.hospital_name",
            RequestField::AdditionalMessage => "r.additional_message",
            RequestField::LocationAddress => "r.location_address",
            RequestField::LocationCity => "r.location_city",
            RequestField::DonationDate => "r.donation_date",
        }
    }
}

impl Column for DonorField {
    fn column(self) -> &'static str {
        match self {
            DonorField::Status => "u.status",
            DonorField::IsAvailable => "u.is_available",
            DonorField::BloodGroup => "u.blood_group",
            DonorField::District => "u.district",
            DonorField::Upazila => "u.upazila",
        }
    }
}

/// Escape `LIKE` metacharacters and wrap in `%...%`.
pub fn contains_pattern(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('%');
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

/// Append ` AND (...)` for each group. The builder must already contain a
/// `WHERE` clause.
pub fn push_groups<F: Column>(qb: &mut QueryBuilder<'_, Postgres>, groups: &[FilterGroup<F>]) {
    for group in groups {
        qb.push(" AND (");
        for (i, field) in group.fields().iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            push_term(qb, field.column(), group.term());
        }
        qb.push(")");
    }
}

fn push_term(qb: &mut QueryBuilder<'_, Postgres>, column: &str, term: &Match) {
    match term {
        Match::Exact(value) => {
            qb.push(column).push(" = ");
            push_value(qb, value);
        }
        Match::Contains(text) => {
            qb.push(column)
                .push(" ILIKE ")
                .push_bind(contains_pattern(text))
                .push(" ESCAPE '\\'");
        }
        Match::Range { min, max } => {
            qb.push("(");
            let mut first = true;
            if let Some(min) = min {
                qb.push(column).push(" >= ");
                push_value(qb, min);
                first = false;
            }
            if let Some(max) = max {
                if !first {
                    qb.push(" AND ");
                }
                qb.push(column).push(" <= ");
                push_value(qb, max);
            }
            qb.push(")");
        }
    }
}

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: &Value) {
    match value {
        Value::Text(s) => qb.push_bind(s.clone()),
        Value::Bool(b) => qb.push_bind(*b),
        Value::Date(d) => qb.push_bind(*d),
    };
}
