pub mod analysis;
pub mod analytics;
pub mod filter;
pub mod metrics;
pub mod user;
pub mod validate;
pub mod violation;

pub use analysis::{AnalysisResult, AssessedType, Confidence, LOW_CONFIDENCE_THRESHOLD};
pub use filter::{ITEMS_PER_PAGE, PageWindow, ViolationFilter};
pub use metrics::{DashboardMetrics, format_inr, type_distribution};
pub use user::User;
pub use validate::{ValidationError, is_valid_email, validate_password};
pub use violation::{NewViolation, Violation, ViolationStatus, ViolationType};
