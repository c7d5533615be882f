//! Repository for the `donation_requests` and `donation_responses` tables.

use std::cmp::Ordering;

use bloodlink_core::donation::{DonationStatus, RespondentStatus};
use bloodlink_core::error::CoreError;
use bloodlink_core::filter::RequestFilter;
use bloodlink_core::geo::Coordinates;
use bloodlink_core::pagination::PageRequest;
use bloodlink_core::types::DbId;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::filters::push_groups;
use crate::models::donation_request::{
    DonationRequest, DonationResponse, NewDonationRequest, RequestListRow, RespondOutcome,
    Respondent,
};

/// Column list shared across queries. Every query aliases the table as `r`.
const COLUMNS: &str = "r.id, r.requester_id, r.recipient_name, r.recipient_phone, \
    r.hospital_name, r.blood_group, r.total_units_needed, r.units_fulfilled, \
    r.location_lng, r.location_lat, r.location_address, r.location_city, \
    r.donation_date, r.donation_time, r.urgency, r.donation_status, \
    r.additional_message, r.created_at, r.updated_at";

const RESPONSE_COLUMNS: &str = "id, request_id, donor_id, status, applied_at";

/// Upper bound on rows pulled from the bounding box before the exact
/// distance cut in [`DonationRequestRepo::find_nearby`].
pub const NEARBY_CANDIDATE_CAP: i64 = 1000;

/// Result of a moderation status change.
#[derive(Debug)]
pub enum TransitionOutcome {
    Updated(DonationRequest),
    NotFound,
    Rejected(CoreError),
}

/// Provides persistence for donation requests and their respondents.
pub struct DonationRequestRepo;

impl DonationRequestRepo {
    /// Insert a new request. Status starts at `pending` with no units fulfilled.
    pub async fn create(
        pool: &PgPool,
        input: &NewDonationRequest,
    ) -> Result<DonationRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO donation_requests AS r
                (requester_id, recipient_name, recipient_phone, hospital_name, blood_group,
                 total_units_needed, location_lng, location_lat, location_address,
                 location_city, donation_date, donation_time, urgency, additional_message)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DonationRequest>(&query)
            .bind(input.requester_id)
            .bind(&input.recipient_name)
            .bind(&input.recipient_phone)
            .bind(&input.hospital_name)
            .bind(input.blood_group.as_str())
            .bind(input.total_units_needed)
            .bind(input.coordinates.lng)
            .bind(input.coordinates.lat)
            .bind(input.location_address.as_deref())
            .bind(input.location_city.as_deref())
            .bind(input.donation_date)
            .bind(&input.donation_time)
            .bind(input.urgency.as_str())
            .bind(input.additional_message.as_deref())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<DonationRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM donation_requests r WHERE r.id = $1");
        sqlx::query_as::<_, DonationRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Filtered, paginated listing, newest first. Returns the page and the
    /// total number of matching rows.
    pub async fn list(
        pool: &PgPool,
        filter: &RequestFilter,
        page: PageRequest,
    ) -> Result<(Vec<RequestListRow>, i64), sqlx::Error> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM donation_requests r");
        push_where(&mut count_qb, filter);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COLUMNS}, u.full_name AS requester_name, u.avatar AS requester_avatar, \
                    (SELECT COUNT(*) FROM donation_responses dr WHERE dr.request_id = r.id) \
                        AS respondent_count \
             FROM donation_requests r \
             JOIN users u ON u.id = r.requester_id"
        ));
        push_where(&mut qb, filter);
        qb.push(" ORDER BY r.created_at DESC, r.id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items = qb
            .build_query_as::<RequestListRow>()
            .fetch_all(pool)
            .await?;
        Ok((items, total))
    }

    /// Open requests within `radius_km` of `center`, nearest first.
    ///
    /// The GiST index narrows candidates to the bounding box; the exact
    /// great-circle cut and ordering happen here.
    pub async fn find_nearby(
        pool: &PgPool,
        center: Coordinates,
        radius_km: f64,
        filter: &RequestFilter,
        page: PageRequest,
    ) -> Result<(Vec<(DonationRequest, f64)>, i64), sqlx::Error> {
        let bbox = center.bounding_box(radius_km);

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COLUMNS} FROM donation_requests r WHERE \
             point(r.location_lng, r.location_lat) <@ box(point("
        ));
        qb.push_bind(bbox.min.lng)
            .push(", ")
            .push_bind(bbox.min.lat)
            .push("), point(")
            .push_bind(bbox.max.lng)
            .push(", ")
            .push_bind(bbox.max.lat)
            .push("))");
        push_groups(&mut qb, &filter.groups);
        qb.push(" LIMIT ").push_bind(NEARBY_CANDIDATE_CAP);

        let candidates = qb
            .build_query_as::<DonationRequest>()
            .fetch_all(pool)
            .await?;

        let mut within: Vec<(DonationRequest, f64)> = candidates
            .into_iter()
            .map(|r| {
                let d = center.distance_km(&r.coordinates());
                (r, d)
            })
            .filter(|(_, d)| *d <= radius_km)
            .collect();
        within.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

        let total = within.len() as i64;
        let items = within
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok((items, total))
    }

    /// Respondents of a request in arrival order.
    pub async fn list_respondents(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<Vec<Respondent>, sqlx::Error> {
        sqlx::query_as::<_, Respondent>(
            "SELECT dr.donor_id, u.full_name, u.avatar, u.phone, u.blood_group, u.district,
                    dr.status, dr.applied_at
             FROM donation_responses dr
             JOIN users u ON u.id = dr.donor_id
             WHERE dr.request_id = $1
             ORDER BY dr.id",
        )
        .bind(request_id)
        .fetch_all(pool)
        .await
    }

    pub async fn has_responded(
        pool: &PgPool,
        request_id: DbId,
        donor_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM donation_responses WHERE request_id = $1 AND donor_id = $2
             )",
        )
        .bind(request_id)
        .bind(donor_id)
        .fetch_one(pool)
        .await
    }

    /// Register `donor_id` as a respondent of `request_id`.
    ///
    /// Runs as one transaction holding the request row lock, so concurrent
    /// responders on the same request are serialized. The unique constraint on
    /// `(request_id, donor_id)` rejects a duplicate even if the lock were
    /// bypassed. The first respondent moves the request from `pending` to
    /// `in-progress`. A donor id with no account yields
    /// [`RespondOutcome::UnknownDonor`].
    pub async fn respond(
        pool: &PgPool,
        request_id: DbId,
        donor_id: DbId,
    ) -> Result<RespondOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let current: Option<String> = sqlx::query_scalar(
            "SELECT donation_status FROM donation_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Ok(RespondOutcome::NotFound);
        };
        let current = parse_status(&current)?;

        let next = match current.after_respondent() {
            Ok(next) => next,
            Err(_) => return Ok(RespondOutcome::Closed(current)),
        };

        // Share-locked so the donor cannot be deleted before the insert lands.
        let donor: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR SHARE")
                .bind(donor_id)
                .fetch_optional(&mut *tx)
                .await?;
        if donor.is_none() {
            return Ok(RespondOutcome::UnknownDonor);
        }

        let query = format!(
            "INSERT INTO donation_responses (request_id, donor_id, status)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_donation_responses_request_donor DO NOTHING
             RETURNING {RESPONSE_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, DonationResponse>(&query)
            .bind(request_id)
            .bind(donor_id)
            .bind(RespondentStatus::Interested.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(response) = inserted else {
            return Ok(RespondOutcome::AlreadyResponded);
        };

        if next != current {
            sqlx::query(
                "UPDATE donation_requests SET donation_status = $2
                 WHERE id = $1 AND donation_status = $3",
            )
            .bind(request_id)
            .bind(next.as_str())
            .bind(current.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(RespondOutcome::Registered {
            response,
            status: next,
        })
    }

    /// Moderation transition. Moving to `success` also marks every needed
    /// unit as fulfilled.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        to: DonationStatus,
    ) -> Result<TransitionOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let current: Option<String> = sqlx::query_scalar(
            "SELECT donation_status FROM donation_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Ok(TransitionOutcome::NotFound);
        };
        if let Err(e) = parse_status(&current)?.validate_transition(to) {
            return Ok(TransitionOutcome::Rejected(e));
        }

        let query = format!(
            "UPDATE donation_requests r SET
                donation_status = $2,
                units_fulfilled = CASE WHEN $3 THEN r.total_units_needed ELSE r.units_fulfilled END
             WHERE r.id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, DonationRequest>(&query)
            .bind(id)
            .bind(to.as_str())
            .bind(to == DonationStatus::Success)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(TransitionOutcome::Updated(updated))
    }
}

fn push_where(qb: &mut QueryBuilder<'_, Postgres>, filter: &RequestFilter) {
    qb.push(" WHERE TRUE");
    if let Some(requester_id) = filter.requester_id {
        qb.push(" AND r.requester_id = ").push_bind(requester_id);
    }
    push_groups(qb, &filter.groups);
}

fn parse_status(raw: &str) -> Result<DonationStatus, sqlx::Error> {
    raw.parse::<DonationStatus>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}
