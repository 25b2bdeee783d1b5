// QNXT resource clients
// One type per REST resource; each builds endpoint paths under its base path,
// merges default and call-time parameters and wraps the response.

pub mod appeal_grievance;
pub mod benefit;
pub mod call_tracking;
pub mod member;
pub mod plan_integration;

pub use appeal_grievance::IncidentSearch;
pub use benefit::{BenefitPlan, BenefitResource, CoverageDetailsQuery};
pub use call_tracking::{CallCountQuery, CallIssueSearch, CallResource, CallSearch, CallStatistics};
pub use member::{CopcProviderQuery, CopcProviders, CopcValidationQuery, EnrollmentAccumulators};
pub use plan_integration::{ApplicationLogFilter, ApplicationLogs, ProcessLogs};
