pub mod collector;
pub mod submission;

pub use submission::SubmissionHandler;
