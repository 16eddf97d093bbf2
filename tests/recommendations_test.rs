//! Recommendation ranking over real enrollments.

mod common;

use campus::domain::UserRole;

use common::{create_test_services, create_user, published_course};

#[tokio::test]
async fn peers_and_shared_topics_rank_first() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let me = create_user(&app, "me", UserRole::Student).await;
    let peer = create_user(&app, "peer", UserRole::Student).await;

    let rust = published_course(&app, &teacher, "Rust Basics", Some("programming")).await;
    let async_rust = published_course(&app, &teacher, "Async Rust", Some("programming")).await;
    let pottery = published_course(&app, &teacher, "Pottery", Some("crafts")).await;

    app.enrollment.enroll(&me, &rust.id).await.unwrap();
    app.enrollment.enroll(&peer, &rust.id).await.unwrap();
    app.enrollment.enroll(&peer, &async_rust.id).await.unwrap();

    let recommended = app.recommendation.recommend(&me.user_id).await.unwrap();
    let ids: Vec<&str> = recommended.iter().map(|r| r.course.id.as_str()).collect();

    assert!(!ids.contains(&rust.id.as_str()), "enrolled courses are never recommended");
    assert_eq!(ids.first(), Some(&async_rust.id.as_str()));
    assert!(recommended.windows(2).all(|w| w[0].score >= w[1].score));
    if let Some(pos) = ids.iter().position(|id| *id == pottery.id) {
        assert!(pos > 0);
    }

    // The refreshed list is persisted.
    let stored = app.recommendation.stored(&me.user_id).await.unwrap();
    let stored_ids: Vec<&str> = stored.iter().map(|r| r.course.id.as_str()).collect();
    assert_eq!(stored_ids, ids);
}

#[tokio::test]
async fn cold_start_falls_back_to_popularity() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let newcomer = create_user(&app, "newcomer", UserRole::Student).await;
    let s1 = create_user(&app, "s1", UserRole::Student).await;
    let s2 = create_user(&app, "s2", UserRole::Student).await;

    let quiet = published_course(&app, &teacher, "Quiet", None).await;
    let popular = published_course(&app, &teacher, "Popular", None).await;
    app.enrollment.enroll(&s1, &popular.id).await.unwrap();
    app.enrollment.enroll(&s2, &popular.id).await.unwrap();
    app.enrollment.enroll(&s1, &quiet.id).await.unwrap();

    let recommended = app.recommendation.recommend(&newcomer.user_id).await.unwrap();
    assert_eq!(recommended.first().map(|r| r.course.id.as_str()), Some(popular.id.as_str()));
}
