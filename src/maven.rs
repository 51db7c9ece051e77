pub mod artifact_mapping;
pub mod coordinates;
pub mod layout;
pub mod legacy_paths;
pub mod managed_repo;
pub mod paths;
