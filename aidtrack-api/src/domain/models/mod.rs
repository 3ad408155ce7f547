mod dashboard;
mod ids;
mod lookup;
mod project;

pub use dashboard::*;
pub use ids::*;
pub use lookup::*;
pub use project::*;
