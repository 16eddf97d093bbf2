//! SeaORM entities, one module per table

pub mod assignment;
pub mod bundle;
pub mod bundle_course;
pub mod calendar_event;
pub mod certificate;
pub mod coupon;
pub mod coupon_redemption;
pub mod course;
pub mod course_module;
pub mod course_prerequisite;
pub mod course_tag;
pub mod enrollment;
pub mod forum_post;
pub mod forum_reply;
pub mod import_job;
pub mod instructor_answer;
pub mod instructor_question;
pub mod learning_path;
pub mod learning_path_course;
pub mod lesson;
pub mod lesson_progress;
pub mod media_asset;
pub mod payment;
pub mod quiz;
pub mod quiz_attempt;
pub mod quiz_question;
pub mod recommendation;
pub mod referral;
pub mod referral_code;
pub mod review;
pub mod share_link;
pub mod submission;
pub mod subscription;
pub mod tag;
pub mod teacher_earning;
pub mod user;
pub mod video_bookmark;
pub mod video_note;
pub mod waitlist_entry;
pub mod watch_activity;
pub mod watch_progress;
pub mod whiteboard;
pub mod whiteboard_action;
pub mod wishlist_item;

pub use assignment::Entity as Assignment;
pub use bundle::Entity as Bundle;
pub use bundle_course::Entity as BundleCourse;
pub use calendar_event::Entity as CalendarEvent;
pub use certificate::Entity as Certificate;
pub use coupon::Entity as Coupon;
pub use coupon_redemption::Entity as CouponRedemption;
pub use course::Entity as Course;
pub use course_module::Entity as CourseModule;
pub use course_prerequisite::Entity as CoursePrerequisite;
pub use course_tag::Entity as CourseTag;
pub use enrollment::Entity as Enrollment;
pub use forum_post::Entity as ForumPost;
pub use forum_reply::Entity as ForumReply;
pub use import_job::Entity as ImportJob;
pub use instructor_answer::Entity as InstructorAnswer;
pub use instructor_question::Entity as InstructorQuestion;
pub use learning_path::Entity as LearningPath;
pub use learning_path_course::Entity as LearningPathCourse;
pub use lesson::Entity as Lesson;
pub use lesson_progress::Entity as LessonProgress;
pub use media_asset::Entity as MediaAsset;
pub use payment::Entity as Payment;
pub use quiz::Entity as Quiz;
pub use quiz_attempt::Entity as QuizAttempt;
pub use quiz_question::Entity as QuizQuestion;
pub use recommendation::Entity as Recommendation;
pub use referral::Entity as Referral;
pub use referral_code::Entity as ReferralCode;
pub use review::Entity as Review;
pub use share_link::Entity as ShareLink;
pub use submission::Entity as Submission;
pub use subscription::Entity as Subscription;
pub use tag::Entity as Tag;
pub use teacher_earning::Entity as TeacherEarning;
pub use user::Entity as User;
pub use video_bookmark::Entity as VideoBookmark;
pub use video_note::Entity as VideoNote;
pub use waitlist_entry::Entity as WaitlistEntry;
pub use watch_activity::Entity as WatchActivity;
pub use watch_progress::Entity as WatchProgress;
pub use whiteboard::Entity as Whiteboard;
pub use whiteboard_action::Entity as WhiteboardAction;
pub use wishlist_item::Entity as WishlistItem;
