pub mod assignments;
pub mod auth;
pub mod bundles;
pub mod calendar;
pub mod certificates;
pub mod comparison;
pub mod coupons;
pub mod courses;
pub mod dashboard;
pub mod earnings;
pub mod enrollments;
pub mod forum;
pub mod health;
pub mod imports;
pub mod learning;
pub mod media;
pub mod metrics;
pub mod payments;
pub mod prerequisites;
pub mod qa;
pub mod quizzes;
pub mod recommendations;
pub mod referrals;
pub mod request_id;
pub mod reviews;
pub mod share;
pub mod subscriptions;
pub mod tags;
pub mod users;
pub mod video;
pub mod whiteboard;
pub mod wishlist;
