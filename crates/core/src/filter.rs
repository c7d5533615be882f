//! Typed search filters.
//!
//! A filter is a list of [`FilterGroup`]s. Each group targets one dimension
//! (blood group, district, free text, ...) and matches when ANY of its fields
//! matches; the filter matches when ALL groups match. Groups are checked at
//! construction time, so a substring match on a boolean column or an inverted
//! date range cannot be built.
//!
//! Raw query-string input is turned into filters by [`RequestFilter::public`],
//! [`RequestFilter::scoped`] and [`DonorFilter::from_params`].

use serde::Deserialize;

use crate::blood_group::BloodGroup;
use crate::donation::DonationStatus;
use crate::donor::DonorStatus;
use crate::error::CoreError;
use crate::types::{Date, DbId};

/// Sentinel meaning "do not filter on this dimension".
pub const ALL_SENTINEL: &str = "all";

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// What kind of column a field maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text; supports substring matching.
    Text,
    /// Constrained text (blood group, status); exact match only.
    Enumerated,
    Bool,
    Date,
}

/// Implemented by the field enums of each searchable collection.
pub trait FilterField: Copy + std::fmt::Debug {
    fn kind(self) -> FieldKind;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Bool(bool),
    Date(Date),
}

impl Value {
    fn fits(&self, kind: FieldKind) -> bool {
        matches!(
            (self, kind),
            (Value::Text(_), FieldKind::Text | FieldKind::Enumerated)
                | (Value::Bool(_), FieldKind::Bool)
                | (Value::Date(_), FieldKind::Date)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Match {
    Exact(Value),
    /// Case-insensitive substring.
    Contains(String),
    /// Inclusive range; at least one bound is present.
    Range {
        min: Option<Value>,
        max: Option<Value>,
    },
}

/// One filter dimension: OR across `fields`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGroup<F> {
    fields: Vec<F>,
    term: Match,
}

impl<F: FilterField> FilterGroup<F> {
    pub fn new(fields: Vec<F>, term: Match) -> Result<Self, CoreError> {
        if fields.is_empty() {
            return Err(CoreError::Internal("filter group without fields".into()));
        }
        for field in &fields {
            check_term(*field, &term)?;
        }
        Ok(Self { fields, term })
    }

    pub fn exact(field: F, value: Value) -> Result<Self, CoreError> {
        Self::new(vec![field], Match::Exact(value))
    }
}

impl<F> FilterGroup<F> {
    pub fn fields(&self) -> &[F] {
        &self.fields
    }

    pub fn term(&self) -> &Match {
        &self.term
    }
}

fn check_term<F: FilterField>(field: F, term: &Match) -> Result<(), CoreError> {
    let kind = field.kind();
    let ok = match term {
        Match::Exact(value) => value.fits(kind),
        Match::Contains(text) => kind == FieldKind::Text && !text.is_empty(),
        Match::Range { min, max } => {
            let bounds_fit = [min, max]
                .into_iter()
                .flatten()
                .all(|v| v.fits(kind) && kind == FieldKind::Date);
            let ordered = match (min, max) {
                (Some(Value::Date(a)), Some(Value::Date(b))) => a <= b,
                _ => true,
            };
            if !ordered {
                return Err(CoreError::Validation(
                    "Date range start must not be after its end".into(),
                ));
            }
            bounds_fit && (min.is_some() || max.is_some())
        }
    };
    if ok {
        Ok(())
    } else {
        Err(CoreError::Internal(format!(
            "filter {term:?} is not applicable to {field:?}"
        )))
    }
}

/// Trimmed, non-empty, not the `all` sentinel.
fn meaningful(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(ALL_SENTINEL))
}

// ---------------------------------------------------------------------------
// Donation requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestField {
    DonationStatus,
    BloodGroup,
    RecipientName,
    HospitalName,
    AdditionalMessage,
    LocationAddress,
    LocationCity,
    DonationDate,
}

impl FilterField for RequestField {
    fn kind(self) -> FieldKind {
        match self {
            RequestField::DonationStatus | RequestField::BloodGroup => FieldKind::Enumerated,
            RequestField::DonationDate => FieldKind::Date,
            RequestField::RecipientName
            | RequestField::HospitalName
            | RequestField::AdditionalMessage
            | RequestField::LocationAddress
            | RequestField::LocationCity => FieldKind::Text,
        }
    }
}

/// Raw query parameters accepted by the request listing endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestSearchParams {
    pub status: Option<String>,
    #[serde(alias = "bloodGroup")]
    pub blood_group: Option<String>,
    pub district: Option<String>,
    pub search: Option<String>,
    pub date_from: Option<Date>,
    pub date_to: Option<Date>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestFilter {
    pub groups: Vec<FilterGroup<RequestField>>,
    /// Restrict to a single requester's own requests.
    pub requester_id: Option<DbId>,
}

impl RequestFilter {
    /// Filter for the public request board. Status defaults to `pending`.
    pub fn public(params: &RequestSearchParams) -> Result<Self, CoreError> {
        let status = match params.status.as_deref().map(str::trim) {
            None | Some("") => Some(DonationStatus::Pending),
            Some(s) if s.eq_ignore_ascii_case(ALL_SENTINEL) => None,
            Some(s) => Some(s.parse()?),
        };
        Self::build(
            params,
            status,
            &[
                RequestField::RecipientName,
                RequestField::HospitalName,
                RequestField::AdditionalMessage,
            ],
            None,
        )
    }

    /// Filter for the authenticated listing. `requester_id` is `Some` when the
    /// caller may only see their own requests.
    pub fn scoped(
        params: &RequestSearchParams,
        requester_id: Option<DbId>,
    ) -> Result<Self, CoreError> {
        let status = meaningful(params.status.as_deref())
            .map(str::parse::<DonationStatus>)
            .transpose()?;
        Self::build(
            params,
            status,
            &[
                RequestField::RecipientName,
                RequestField::HospitalName,
                RequestField::LocationAddress,
                RequestField::LocationCity,
            ],
            requester_id,
        )
    }

    fn build(
        params: &RequestSearchParams,
        status: Option<DonationStatus>,
        text_fields: &[RequestField],
        requester_id: Option<DbId>,
    ) -> Result<Self, CoreError> {
        let mut groups = Vec::new();

        if let Some(status) = status {
            groups.push(FilterGroup::exact(
                RequestField::DonationStatus,
                Value::Text(status.as_str().to_string()),
            )?);
        }

        if let Some(raw) = meaningful(params.blood_group.as_deref()) {
            let group = BloodGroup::canonicalize(raw)?;
            groups.push(FilterGroup::exact(
                RequestField::BloodGroup,
                Value::Text(group.as_str().to_string()),
            )?);
        }

        if let Some(district) = meaningful(params.district.as_deref()) {
            groups.push(FilterGroup::new(
                vec![RequestField::LocationCity, RequestField::LocationAddress],
                Match::Contains(district.to_string()),
            )?);
        }

        if let Some(text) = meaningful(params.search.as_deref()) {
            groups.push(FilterGroup::new(
                text_fields.to_vec(),
                Match::Contains(text.to_string()),
            )?);
        }

        if params.date_from.is_some() || params.date_to.is_some() {
            groups.push(FilterGroup::new(
                vec![RequestField::DonationDate],
                Match::Range {
                    min: params.date_from.map(Value::Date),
                    max: params.date_to.map(Value::Date),
                },
            )?);
        }

        Ok(Self {
            groups,
            requester_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Donors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonorField {
    Status,
    IsAvailable,
    BloodGroup,
    District,
    Upazila,
}

impl FilterField for DonorField {
    fn kind(self) -> FieldKind {
        match self {
            DonorField::Status | DonorField::BloodGroup => FieldKind::Enumerated,
            DonorField::IsAvailable => FieldKind::Bool,
            DonorField::District | DonorField::Upazila => FieldKind::Text,
        }
    }
}

/// Raw query parameters accepted by donor search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DonorSearchParams {
    #[serde(alias = "bloodGroup")]
    pub blood_group: Option<String>,
    pub district: Option<String>,
    pub upazila: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DonorFilter {
    pub groups: Vec<FilterGroup<DonorField>>,
}

impl DonorFilter {
    /// Only active, available donors are ever eligible; the remaining
    /// dimensions are optional.
    pub fn from_params(params: &DonorSearchParams) -> Result<Self, CoreError> {
        let mut groups = vec![
            FilterGroup::exact(
                DonorField::Status,
                Value::Text(DonorStatus::Active.as_str().to_string()),
            )?,
            FilterGroup::exact(DonorField::IsAvailable, Value::Bool(true))?,
        ];

        if let Some(raw) = meaningful(params.blood_group.as_deref()) {
            let group = BloodGroup::canonicalize(raw)?;
            groups.push(FilterGroup::exact(
                DonorField::BloodGroup,
                Value::Text(group.as_str().to_string()),
            )?);
        }

        if let Some(district) = meaningful(params.district.as_deref()) {
            groups.push(FilterGroup::new(
                vec![DonorField::District],
                Match::Contains(district.to_string()),
            )?);
        }

        if let Some(upazila) = meaningful(params.upazila.as_deref()) {
            groups.push(FilterGroup::new(
                vec![DonorField::Upazila],
                Match::Contains(upazila.to_string()),
            )?);
        }

        Ok(Self { groups })
    }
}
