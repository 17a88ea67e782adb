///! Boğaziçi registration site course schedule module
///!
///! Fetches each department's listing page, extracts the course table and
///! normalizes its rows into `CourseSection`s keyed by section code.

pub mod types;
pub mod extractor;
pub mod normalizer;
pub mod fetcher;
pub mod throttle;
pub mod aggregator;
pub mod writer;
pub mod updater;

pub use aggregator::Aggregate;
pub use fetcher::{CourseSource, RegistrationClient};
pub use normalizer::NormalizeOptions;
pub use throttle::RequestThrottle;
pub use updater::{RunOptions, RunReport, ScheduleUpdater};
pub use writer::write_json;
