//! Shared setup for integration tests: in-memory database, wired services
//! and a few fixtures.
#![allow(dead_code)]

use std::sync::Once;

use campus::application::services::courses::{NewCourse, NewLesson};
use campus::application::services::users::Registration;
use campus::domain::course::CourseLevel;
use campus::domain::monetization::MonetizationType;
use campus::domain::{Actor, UserRole};
use campus::infrastructure::database::entities::{course, lesson};
use campus::{init_database, run_migrations, Adapters, AppConfig, AppServices, DatabaseConfig};

static INIT_LOGGER: Once = Once::new();

/// Quiet logging; `TEST_LOG=debug` turns it up.
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let filter = std::env::var("TEST_LOG").unwrap_or_else(|_| "warn".to_string());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
            .with_test_writer()
            .try_init();
    });
}

/// Defaults with the cheapest bcrypt cost so registration stays fast.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.security.bcrypt_cost = 4;
    config.security.jwt_secret = "integration-test-secret".to_string();
    config
}

/// Fresh migrated in-memory database with every service wired.
pub async fn create_test_services() -> AppServices {
    init_test_logging();
    let config = test_config();
    let db = init_database(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory database");
    run_migrations(&db).await.expect("migrations");
    let adapters = Adapters::from_config(&config).expect("adapters");
    AppServices::new(db, &config, adapters)
}

pub async fn create_user(app: &AppServices, name: &str, role: UserRole) -> Actor {
    let user = app
        .users
        .register(Registration {
            email: format!("{}@campus.test", name),
            username: name.to_string(),
            password: "password123".to_string(),
            role,
        })
        .await
        .expect("register user");
    Actor::new(user.id, user.role)
}

pub fn new_course(title: &str, category: Option<&str>) -> NewCourse {
    NewCourse {
        title: title.to_string(),
        description: None,
        category: category.map(str::to_string),
        level: CourseLevel::Beginner,
        language: "en".to_string(),
        price_cents: 0,
        currency: "USD".to_string(),
        monetization_type: MonetizationType::Free,
        capacity: None,
        thumbnail_url: None,
    }
}

pub fn new_lesson(title: &str) -> NewLesson {
    NewLesson {
        title: title.to_string(),
        content: Some("content".to_string()),
        video_uid: None,
        video_url: None,
        duration_seconds: 300,
        is_preview: false,
        price_cents: 0,
    }
}

/// Draft course with one module holding one lesson.
pub async fn draft_course(app: &AppServices, teacher: &Actor, input: NewCourse) -> (course::Model, lesson::Model) {
    let created = app.courses.create_course(teacher, input).await.expect("create course");
    let module = app
        .courses
        .add_module(teacher, &created.id, "Module 1")
        .await
        .expect("add module");
    let first = app
        .courses
        .add_lesson(teacher, &module.id, new_lesson("Lesson 1"))
        .await
        .expect("add lesson");
    (created, first)
}

/// Free published course ready for enrollment.
pub async fn published_course(app: &AppServices, teacher: &Actor, title: &str, category: Option<&str>) -> course::Model {
    let (created, _) = draft_course(app, teacher, new_course(title, category)).await;
    app.courses.publish(teacher, &created.id).await.expect("publish course")
}
