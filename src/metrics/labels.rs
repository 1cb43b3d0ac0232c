//! Metric names and label values

/// Completed open calls, by result
pub const OPEN_TOTAL: &str = "pg_rotating_open_total";

/// Individual connect attempts, by slot and outcome
pub const ATTEMPTS_TOTAL: &str = "pg_rotating_attempts_total";

/// Failovers to the other slot after an authentication failure
pub const FAILOVER_TOTAL: &str = "pg_rotating_failover_total";

/// Refresh requests, by action taken
pub const REFRESH_TOTAL: &str = "pg_rotating_refresh_total";

/// Wall time of an open call, by result
pub const OPEN_DURATION_SECONDS: &str = "pg_rotating_open_duration_seconds";

/// Open result: connected with the primary slot
pub const RESULT_PRIMARY: &str = "primary";

/// Open result: connected after failover
pub const RESULT_FAILOVER: &str = "failover";

/// Open result: both slots rejected
pub const RESULT_BOTH_REJECTED: &str = "both_rejected";

/// Open result: non-authentication failure
pub const RESULT_ERROR: &str = "error";
