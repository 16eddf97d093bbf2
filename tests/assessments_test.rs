//! Quiz grading and time limits, whiteboard action ordering.

mod common;

use std::collections::HashMap;

use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::json;

use campus::application::services::quizzes::{NewQuestion, NewQuiz};
use campus::domain::quiz::QuestionKind;
use campus::domain::UserRole;
use campus::infrastructure::database::entities::quiz_attempt;
use campus::shared::errors::DomainError;

use common::{create_test_services, create_user, published_course};

fn quiz(time_limit_minutes: Option<i32>, max_attempts: Option<i32>) -> NewQuiz {
    NewQuiz {
        lesson_id: None,
        title: "Ownership".to_string(),
        description: None,
        passing_score: 50,
        max_attempts,
        time_limit_minutes,
    }
}

fn single_choice(prompt: &str, correct: u32) -> NewQuestion {
    NewQuestion {
        prompt: prompt.to_string(),
        kind: QuestionKind::Single,
        options: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        correct: vec![correct],
        points: 1,
    }
}

#[tokio::test]
async fn attempt_is_graded_against_the_answer_key() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let student = create_user(&app, "student", UserRole::Student).await;
    let course = published_course(&app, &teacher, "Rust", None).await;
    app.enrollment.enroll(&student, &course.id).await.unwrap();

    let created = app.quizzes.create_quiz(&teacher, &course.id, quiz(None, None)).await.unwrap();
    let q1 = app.quizzes.add_question(&teacher, &created.id, single_choice("Who owns?", 0)).await.unwrap();
    let q2 = app.quizzes.add_question(&teacher, &created.id, single_choice("Who borrows?", 2)).await.unwrap();
    assert_eq!((q1.position, q2.position), (1, 2));

    // Students never see the key.
    let view = app.quizzes.get(&student, &created.id).await.unwrap();
    assert!(view.questions.iter().all(|q| q.correct.is_none()));

    let attempt = app.quizzes.start_attempt(&student, &created.id).await.unwrap();
    let answers = HashMap::from([(q1.id.clone(), vec![0]), (q2.id.clone(), vec![1])]);
    let result = app.quizzes.submit_attempt(&student, &attempt.id, answers).await.unwrap();

    assert!(!result.timed_out);
    assert_eq!(result.outcome.score_percent, 50);
    assert!(result.outcome.passed);
    assert_eq!(app.quizzes.best_score(&student.user_id, &created.id).await.unwrap(), Some(50));

    let resubmit = app.quizzes.submit_attempt(&student, &attempt.id, HashMap::new()).await;
    assert!(matches!(resubmit, Err(DomainError::Conflict(_))));
}

#[tokio::test]
async fn late_submission_scores_zero() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let student = create_user(&app, "student", UserRole::Student).await;
    let course = published_course(&app, &teacher, "Rust", None).await;
    app.enrollment.enroll(&student, &course.id).await.unwrap();

    let created = app.quizzes.create_quiz(&teacher, &course.id, quiz(Some(10), None)).await.unwrap();
    let q1 = app.quizzes.add_question(&teacher, &created.id, single_choice("Who owns?", 0)).await.unwrap();
    let attempt = app.quizzes.start_attempt(&student, &created.id).await.unwrap();

    // Pretend the attempt was opened an hour ago.
    let stored = quiz_attempt::Entity::find_by_id(attempt.id.clone())
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    let mut backdated: quiz_attempt::ActiveModel = stored.into();
    backdated.started_at = Set(Utc::now() - Duration::hours(1));
    backdated.update(&app.db).await.unwrap();

    let answers = HashMap::from([(q1.id.clone(), vec![0])]);
    let result = app.quizzes.submit_attempt(&student, &attempt.id, answers).await.unwrap();
    assert!(result.timed_out);
    assert_eq!(result.outcome.score_percent, 0);
    assert!(!result.outcome.passed);
    assert!(result.attempt.submitted_at.is_some());
}

#[tokio::test]
async fn attempts_are_capped() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let student = create_user(&app, "student", UserRole::Student).await;
    let course = published_course(&app, &teacher, "Rust", None).await;
    app.enrollment.enroll(&student, &course.id).await.unwrap();

    let created = app.quizzes.create_quiz(&teacher, &course.id, quiz(None, Some(1))).await.unwrap();
    app.quizzes.start_attempt(&student, &created.id).await.unwrap();
    let second = app.quizzes.start_attempt(&student, &created.id).await;
    assert!(matches!(second, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn whiteboard_actions_get_consecutive_sequence_numbers() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let student = create_user(&app, "student", UserRole::Student).await;
    let course = published_course(&app, &teacher, "Rust", None).await;
    app.enrollment.enroll(&student, &course.id).await.unwrap();

    let board = app.whiteboard.create(&teacher, &course.id, "Lecture 1").await.unwrap();
    for i in 0..3 {
        let action = app
            .whiteboard
            .append_action(&teacher, &board.id, "stroke", json!({ "points": [i, i] }))
            .await
            .unwrap();
        assert_eq!(action.seq, i + 1);
    }
    let from_student = app
        .whiteboard
        .append_action(&student, &board.id, "text", json!({ "text": "hi" }))
        .await
        .unwrap();
    assert_eq!(from_student.seq, 4);

    let newer = app.whiteboard.actions_since(&student, &board.id, 2).await.unwrap();
    let seqs: Vec<i64> = newer.iter().map(|a| a.seq).collect();
    assert_eq!(seqs, vec![3, 4]);
}

#[tokio::test]
async fn locked_whiteboard_only_accepts_the_creator() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let student = create_user(&app, "student", UserRole::Student).await;
    let course = published_course(&app, &teacher, "Rust", None).await;
    app.enrollment.enroll(&student, &course.id).await.unwrap();

    let board = app.whiteboard.create(&teacher, &course.id, "Lecture 1").await.unwrap();
    app.whiteboard.set_locked(&teacher, &board.id, true).await.unwrap();

    let denied = app.whiteboard.append_action(&student, &board.id, "stroke", json!({})).await;
    assert!(matches!(denied, Err(DomainError::Forbidden(_))));
    app.whiteboard.append_action(&teacher, &board.id, "stroke", json!({})).await.unwrap();

    assert_eq!(app.whiteboard.clear(&teacher, &board.id).await.unwrap(), 1);
    assert!(app.whiteboard.actions_since(&teacher, &board.id, 0).await.unwrap().is_empty());

    // Seq keeps climbing across a clear.
    let after_clear = app.whiteboard.append_action(&teacher, &board.id, "stroke", json!({})).await.unwrap();
    assert_eq!(after_clear.seq, 2);
    let fresh = app.whiteboard.actions_since(&teacher, &board.id, 1).await.unwrap();
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].id, after_clear.id);
}
