mod common;

use common::{bug, desk_on, drain, login, seeded, Gated};
use std::sync::Arc;
use zentao_desk::{LoginRequired, Notice, NoticeLevel, SessionState};

#[tokio::test]
async fn bugs_fetch_filters_by_product_in_order() {
    let backend = Arc::new(seeded().logged_in());
    let (desk, mut notices) = desk_on(backend);

    desk.bugs().fetch(vec![1]).await.unwrap();

    let ids: Vec<u32> = desk.bugs().value().iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![11, 13]);
    assert!(!desk.bugs().is_busy());
    assert_eq!(drain(&mut notices), vec![Notice::success("Fetched 2 bugs")]);
    assert_eq!(desk.session().state(), SessionState::Authenticated);
}

#[tokio::test]
async fn bugs_carry_display_timestamps() {
    let backend = Arc::new(seeded().logged_in());
    let (desk, _notices) = desk_on(backend);

    desk.bugs().fetch(vec![2]).await.unwrap();

    assert_eq!(desk.bugs().value()[0].opened_date_formatted, "2024-05-01 10:03:04");
}

#[tokio::test]
async fn empty_bug_list_is_info() {
    let backend = Arc::new(seeded().logged_in());
    let (desk, mut notices) = desk_on(backend);

    desk.bugs().fetch(vec![99]).await.unwrap();

    assert!(desk.bugs().value().is_empty());
    let seen = drain(&mut notices);
    assert_eq!(seen, vec![Notice::info("No bug data")]);
    assert_eq!(seen[0].level, NoticeLevel::Info);
}

#[tokio::test]
async fn products_fetch_announces_count() {
    let backend = Arc::new(seeded().logged_in());
    let (desk, mut notices) = desk_on(backend);

    desk.products().refresh().await.unwrap();

    assert_eq!(desk.products().value().len(), 2);
    assert_eq!(drain(&mut notices), vec![Notice::success("Fetched 2 products")]);
}

#[tokio::test]
async fn busy_while_waiting_on_backend() {
    let gated = Gated::new(Arc::new(seeded().logged_in()));
    let (desk, _notices) = desk_on(gated.clone());
    let desk = Arc::new(desk);

    let fetch = tokio::spawn({
        let desk = Arc::clone(&desk);
        async move { desk.products().refresh().await }
    });
    while !desk.products().is_busy() {
        tokio::task::yield_now().await;
    }
    assert!(desk.products().value().is_empty());

    gated.permits.add_permits(1);
    fetch.await.unwrap().unwrap();

    assert!(!desk.products().is_busy());
    assert_eq!(desk.products().value().len(), 2);
}

#[tokio::test]
async fn unauthorized_keeps_prior_value_and_requires_login() {
    let backend = Arc::new(seeded().logged_in());
    let (desk, mut notices) = desk_on(backend.clone());
    desk.products().refresh().await.unwrap();
    drain(&mut notices);

    backend.fail_next("get_products", "Unauthorized");
    let outcome = desk.products().refresh().await;

    assert_eq!(outcome, Err(LoginRequired));
    assert_eq!(desk.products().value().len(), 2);
    assert!(!desk.products().is_busy());
    assert!(drain(&mut notices).is_empty());
    assert_eq!(desk.session().state(), SessionState::Expired);
}

#[tokio::test]
async fn expired_token_requires_login() {
    let backend = Arc::new(seeded());
    let (desk, _notices) = desk_on(backend);

    assert_eq!(desk.bugs().fetch(vec![1]).await, Err(LoginRequired));
    assert!(desk.bugs().value().is_empty());
}

#[tokio::test]
async fn other_failure_is_reported_and_absorbed() {
    let backend = Arc::new(seeded().logged_in());
    let (desk, mut notices) = desk_on(backend.clone());

    backend.fail_next("get_bugs_by_product", "database is locked");
    desk.bugs().fetch(vec![1]).await.unwrap();

    assert!(desk.bugs().value().is_empty());
    assert!(!desk.bugs().is_busy());
    let seen = drain(&mut notices);
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].level, NoticeLevel::Error);
    assert_eq!(seen[0].message, "Failed to fetch bug list: database is locked");
}

#[tokio::test]
async fn near_miss_sentinel_is_an_ordinary_failure() {
    let backend = Arc::new(seeded().logged_in());
    let (desk, mut notices) = desk_on(backend.clone());

    backend.fail_next("get_products", "token expired");
    desk.products().refresh().await.unwrap();

    assert_ne!(desk.session().state(), SessionState::Expired);
    assert_eq!(
        drain(&mut notices),
        vec![Notice::error("Failed to fetch product list: token expired")]
    );
}

#[tokio::test]
async fn profile_failure_is_quiet() {
    let backend = Arc::new(seeded().logged_in());
    let (desk, mut notices) = desk_on(backend.clone());

    backend.fail_next("get_user_info", "Token expired");
    desk.profile().refresh().await.unwrap();

    assert_eq!(desk.profile().value(), None);
    assert!(!desk.profile().is_busy());
    assert!(drain(&mut notices).is_empty());
    assert_ne!(desk.session().state(), SessionState::Expired);
}

#[tokio::test]
async fn profile_success_is_silent() {
    let backend = Arc::new(seeded().logged_in());
    let (desk, mut notices) = desk_on(backend);

    desk.profile().refresh().await.unwrap();

    assert_eq!(desk.profile().value().map(|u| u.account), Some("admin".to_string()));
    assert!(drain(&mut notices).is_empty());
}

#[tokio::test]
async fn expired_session_skips_backend_until_login() {
    let backend = Arc::new(seeded().logged_in());
    let (desk, _notices) = desk_on(backend.clone());

    backend.expire_session();
    assert_eq!(desk.products().refresh().await, Err(LoginRequired));
    let calls_after_expiry = backend.calls().len();

    assert_eq!(desk.bugs().fetch(vec![1]).await, Err(LoginRequired));
    assert_eq!(desk.profile().refresh().await, Ok(()));
    assert_eq!(backend.calls().len(), calls_after_expiry);

    assert!(desk.login(&login(), false).await.unwrap());
    desk.bugs().fetch(vec![1, 2]).await.unwrap();
    assert_eq!(desk.bugs().value().len(), 3);
}

#[tokio::test]
async fn stale_overlapping_fetch_does_not_overwrite_newer_result() {
    let backend = Arc::new(
        seeded()
            .logged_in()
            .with_bugs(vec![bug(21, 1, "Old"), bug(22, 2, "New")]),
    );
    let gated = Gated::new(backend);
    let (desk, _notices) = desk_on(gated.clone());
    let desk = Arc::new(desk);

    let older = tokio::spawn({
        let desk = Arc::clone(&desk);
        async move { desk.bugs().fetch(vec![1]).await }
    });
    while desk.bugs().in_flight() < 1 {
        tokio::task::yield_now().await;
    }
    let newer = tokio::spawn({
        let desk = Arc::clone(&desk);
        async move { desk.bugs().fetch(vec![2]).await }
    });
    while desk.bugs().in_flight() < 2 {
        tokio::task::yield_now().await;
    }

    // Both calls wait on the gate in arrival order; release both.
    gated.permits.add_permits(2);
    older.await.unwrap().unwrap();
    newer.await.unwrap().unwrap();

    let titles: Vec<String> = desk.bugs().value().into_iter().map(|b| b.title).collect();
    assert_eq!(titles, vec!["New".to_string()]);
    assert!(!desk.bugs().is_busy());
}
