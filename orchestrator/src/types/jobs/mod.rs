pub mod job_item;
pub mod payload;
pub mod types;

pub use job_item::Job;
pub use types::JobCategory;
