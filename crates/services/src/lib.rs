#![forbid(unsafe_code)]

pub mod app_services;
pub mod badge_service;
pub mod error;
pub mod game_service;
pub mod progress_store;
pub mod quiz_service;

pub use kidsafe_core::Clock;

pub use app_services::AppServices;
pub use badge_service::{BadgeEvaluator, BadgeStatus};
pub use error::AppServicesError;
pub use game_service::{GameRecorder, GameResult};
pub use progress_store::{InitOutcome, ProgressStore, RecordOutcome, SaveStatus};
pub use quiz_service::QuizRecorder;
