//! Integration tests for accounts, donor search and donation history.

use assert_matches::assert_matches;
use bloodlink_core::blood_group::BloodGroup;
use bloodlink_core::donor::DonorStatus;
use bloodlink_core::filter::{DonorFilter, DonorSearchParams};
use bloodlink_core::geo::Coordinates;
use bloodlink_core::pagination::{PageRequest, DEFAULT_DONOR_LIMIT};
use bloodlink_core::types::{Date, DbId};
use bloodlink_db::models::donation_history::CreateDonationHistory;
use bloodlink_db::models::user::NewUser;
use bloodlink_db::repositories::{DonationHistoryRepo, SummaryRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_user(email: &str, group: BloodGroup, district: &str, upazila: Option<&str>) -> NewUser {
    NewUser {
        full_name: format!("Donor {email}"),
        email: email.to_string(),
        password_hash: "hash".to_string(),
        avatar: None,
        phone: None,
        blood_group: group,
        coordinates: Coordinates::new(90.4125, 23.8103),
        district: district.to_string(),
        upazila: upazila.map(str::to_string),
    }
}

async fn seed(pool: &PgPool, email: &str, group: BloodGroup, district: &str) -> DbId {
    UserRepo::create(pool, &new_user(email, group, district, None))
        .await
        .unwrap()
        .id
}

async fn record_donation(pool: &PgPool, donor_id: DbId, date: Date) {
    DonationHistoryRepo::create(
        pool,
        donor_id,
        &CreateDonationHistory {
            donated_at: date,
            hospital_name: "Square Hospital".to_string(),
            hospital_address: None,
            receiver_id: None,
            note: None,
        },
    )
    .await
    .unwrap();
}

fn day(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd_opt(y, m, d).unwrap()
}

async fn search(pool: &PgPool, params: DonorSearchParams) -> (Vec<DbId>, i64) {
    let filter = DonorFilter::from_params(&params).unwrap();
    let page = PageRequest::clamped(params.page, params.limit, DEFAULT_DONOR_LIMIT);
    let (rows, total) = UserRepo::search_donors(pool, &filter, page).await.unwrap();
    (rows.into_iter().map(|r| r.id).collect(), total)
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_user_defaults(pool: PgPool) {
    let user = UserRepo::create(
        &pool,
        &new_user("Mixed.Case@Example.com", BloodGroup::BNegative, "Sylhet", None),
    )
    .await
    .unwrap();

    assert_eq!(user.email, "mixed.case@example.com");
    assert_eq!(user.role, "user");
    assert_eq!(user.status, "active");
    assert!(user.is_available);

    let found = UserRepo::find_by_email(&pool, "MIXED.case@example.com")
        .await
        .unwrap();
    assert_eq!(found.map(|u| u.id), Some(user.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_email_violates_unique_constraint(pool: PgPool) {
    seed(&pool, "dup@example.com", BloodGroup::OPositive, "Dhaka").await;
    let err = UserRepo::create(
        &pool,
        &new_user("DUP@example.com", BloodGroup::APositive, "Dhaka", None),
    )
    .await
    .unwrap_err();

    assert_matches!(
        err,
        sqlx::Error::Database(db) if db.constraint() == Some("uq_users_email")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_moderation_updates_and_delete(pool: PgPool) {
    let id = seed(&pool, "m@example.com", BloodGroup::OPositive, "Dhaka").await;

    let blocked = UserRepo::set_status(&pool, id, DonorStatus::Blocked)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(blocked.status, "blocked");

    let promoted = UserRepo::set_role(&pool, id, "volunteer")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(promoted.role, "volunteer");

    assert!(UserRepo::set_role(&pool, 9_999, "admin").await.unwrap().is_none());

    assert!(UserRepo::delete(&pool, id).await.unwrap());
    assert!(!UserRepo::delete(&pool, id).await.unwrap());
    assert!(UserRepo::find_by_id(&pool, id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_by_status(pool: PgPool) {
    let a = seed(&pool, "a@example.com", BloodGroup::OPositive, "Dhaka").await;
    seed(&pool, "b@example.com", BloodGroup::OPositive, "Dhaka").await;
    UserRepo::set_status(&pool, a, DonorStatus::Blocked)
        .await
        .unwrap();

    let page = PageRequest::clamped(None, None, 10);
    let (_, total) = UserRepo::list(&pool, None, page).await.unwrap();
    assert_eq!(total, 2);

    let (items, total) = UserRepo::list(&pool, Some(DonorStatus::Blocked), page)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].id, a);
}

// ---------------------------------------------------------------------------
// Donor search
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_only_returns_active_available_matching_group(pool: PgPool) {
    let match_id = seed(&pool, "o1@example.com", BloodGroup::OPositive, "Dhaka").await;
    let blocked = seed(&pool, "o2@example.com", BloodGroup::OPositive, "Dhaka").await;
    let busy = seed(&pool, "o3@example.com", BloodGroup::OPositive, "Dhaka").await;
    seed(&pool, "a1@example.com", BloodGroup::APositive, "Dhaka").await;

    UserRepo::set_status(&pool, blocked, DonorStatus::Blocked)
        .await
        .unwrap();
    UserRepo::set_availability(&pool, busy, false).await.unwrap();

    let (ids, total) = search(
        &pool,
        DonorSearchParams {
            blood_group: Some("o+".into()),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(ids, vec![match_id]);
    assert_eq!(total, 1);

    // Becoming unavailable removes the donor from later results.
    UserRepo::set_availability(&pool, match_id, false)
        .await
        .unwrap();
    let (ids, _) = search(
        &pool,
        DonorSearchParams {
            blood_group: Some("O+".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(ids.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_sorts_never_donated_first_then_oldest_donation(pool: PgPool) {
    let recent = seed(&pool, "recent@example.com", BloodGroup::OPositive, "Dhaka").await;
    let old = seed(&pool, "old@example.com", BloodGroup::OPositive, "Dhaka").await;
    let never = seed(&pool, "never@example.com", BloodGroup::OPositive, "Dhaka").await;
    seed(&pool, "far@example.com", BloodGroup::OPositive, "Khulna").await;

    record_donation(&pool, recent, day(2026, 9, 1)).await;
    record_donation(&pool, old, day(2025, 1, 10)).await;
    record_donation(&pool, old, day(2025, 6, 10)).await;

    let filter = DonorFilter::from_params(&DonorSearchParams {
        district: Some("Dhaka".into()),
        upazila: Some(String::new()),
        ..Default::default()
    })
    .unwrap();
    let (rows, total) =
        UserRepo::search_donors(&pool, &filter, PageRequest::clamped(None, None, 100))
            .await
            .unwrap();

    assert_eq!(total, 3);
    assert_eq!(
        rows.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![never, old, recent]
    );
    assert_eq!(rows[0].total_donation, 0);
    assert_eq!(rows[0].last_donation, None);
    assert_eq!(rows[1].total_donation, 2);
    assert_eq!(rows[1].last_donation, Some(day(2025, 6, 10)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_matches_upazila_substring(pool: PgPool) {
    let savar = UserRepo::create(
        &pool,
        &new_user("s@example.com", BloodGroup::AbPositive, "Dhaka", Some("Savar")),
    )
    .await
    .unwrap();
    UserRepo::create(
        &pool,
        &new_user("d@example.com", BloodGroup::AbPositive, "Dhaka", Some("Dohar")),
    )
    .await
    .unwrap();

    let (ids, _) = search(
        &pool,
        DonorSearchParams {
            district: Some("dhaka".into()),
            upazila: Some("sav".into()),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(ids, vec![savar.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_pages(pool: PgPool) {
    for i in 0..3 {
        seed(&pool, &format!("p{i}@example.com"), BloodGroup::ONegative, "Dhaka").await;
    }
    let (ids, total) = search(
        &pool,
        DonorSearchParams {
            page: Some(2),
            limit: Some(2),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(total, 3);
    assert_eq!(ids.len(), 1);
}

// ---------------------------------------------------------------------------
// History and summary
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_lists_most_recent_first(pool: PgPool) {
    let donor = seed(&pool, "h@example.com", BloodGroup::OPositive, "Dhaka").await;
    record_donation(&pool, donor, day(2025, 1, 1)).await;
    record_donation(&pool, donor, day(2026, 1, 1)).await;

    let history = DonationHistoryRepo::list_for_donor(&pool, donor)
        .await
        .unwrap();
    assert_eq!(
        history.iter().map(|h| h.donated_at).collect::<Vec<_>>(),
        vec![day(2026, 1, 1), day(2025, 1, 1)]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_summary_counts(pool: PgPool) {
    let admin = seed(&pool, "admin@example.com", BloodGroup::OPositive, "Dhaka").await;
    let vol = seed(&pool, "vol@example.com", BloodGroup::OPositive, "Dhaka").await;
    seed(&pool, "user@example.com", BloodGroup::OPositive, "Dhaka").await;
    UserRepo::set_role(&pool, admin, "admin").await.unwrap();
    UserRepo::set_role(&pool, vol, "volunteer").await.unwrap();

    let summary = SummaryRepo::fetch(&pool).await.unwrap();
    assert_eq!(summary.users.total, 3);
    assert_eq!(summary.users.admins, 1);
    assert_eq!(summary.users.volunteers, 1);
    assert_eq!(summary.users.users, 1);
    assert_eq!(summary.users.available_donors, 3);
    assert_eq!(summary.requests.total, 0);
}
