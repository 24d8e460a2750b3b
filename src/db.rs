pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod profile_repo;
pub use profile_repo::ProfileRepository;
pub mod submission_repo;
pub use submission_repo::SubmissionRepository;
pub mod progress_repo;
pub use progress_repo::ProgressRepository;
