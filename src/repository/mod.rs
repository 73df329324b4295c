pub mod lead_repo;
pub mod memory_lead_repo;
pub mod mongo_lead_repo;
pub mod repository_error;
