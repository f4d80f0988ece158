pub mod aliases;
pub mod client_rate_limits;
pub mod clients;
pub mod credentials;
pub mod global_config;
pub mod model_families;
pub mod models;
pub mod providers;
pub mod remap_rules;
pub mod request_logs;
pub mod usage_records;

pub use aliases::Entity as Aliases;
pub use client_rate_limits::Entity as ClientRateLimits;
pub use clients::Entity as Clients;
pub use credentials::Entity as Credentials;
pub use global_config::Entity as GlobalConfig;
pub use model_families::Entity as ModelFamilies;
pub use models::Entity as Models;
pub use providers::Entity as Providers;
pub use remap_rules::Entity as RemapRules;
pub use request_logs::Entity as RequestLogs;
pub use usage_records::Entity as UsageRecords;
