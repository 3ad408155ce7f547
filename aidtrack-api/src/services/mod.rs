pub mod importer;
pub mod seed;

pub use importer::ProjectImporter;
pub use seed::seed_initial_data;
