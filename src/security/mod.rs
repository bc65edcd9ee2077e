mod cors;
mod ip_allowlist;
mod rate_limit;

pub use cors::CorsPolicy;
pub use ip_allowlist::IpAllowlist;
pub use rate_limit::{RateLimitSettings, RateLimiter};
