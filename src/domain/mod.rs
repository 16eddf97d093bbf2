//! Domain layer: status enums, value types and the pure rules services apply.

pub mod assignment;
pub mod bundle;
pub mod calendar;
pub mod certificate;
pub mod comparison;
pub mod coupon;
pub mod course;
pub mod course_import;
pub mod earnings;
pub mod enrollment;
pub mod media;
pub mod monetization;
pub mod payment;
pub mod prerequisite;
pub mod qa;
pub mod quiz;
pub mod recommendation;
pub mod referral;
pub mod review;
pub mod share;
pub mod user;
pub mod video;
pub mod waitlist;
pub mod whiteboard;

pub use user::{Actor, UserRole};
