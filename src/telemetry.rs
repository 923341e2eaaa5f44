//! Telemetry metric name constants.
//!
//! Centralised metric names for saucier operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `saucier_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider`: provider name (e.g. "anthropic")
//! - `status`: outcome: "ok", "error" or "timeout"
//! - `path`: where a cache hit was served: "fast" (no lock taken) or
//!   "after_wait" (found on re-check under the per-key lock)

/// Total cache hits.
///
/// Labels: `path` ("fast" | "after_wait").
pub const CACHE_HITS_TOTAL: &str = "saucier_cache_hits_total";

/// Total cache misses (lookups that ran the compute function).
pub const CACHE_MISSES_TOTAL: &str = "saucier_cache_misses_total";

/// Total compute-function executions triggered by cache misses.
///
/// Labels: `status` ("ok" | "error").
pub const COMPUTATIONS_TOTAL: &str = "saucier_computations_total";

/// Total provider calls.
///
/// Labels: `provider`, `status` ("ok" | "error" | "timeout").
pub const REQUESTS_TOTAL: &str = "saucier_requests_total";

/// Provider call duration in seconds, including admission wait.
///
/// Labels: `provider`.
pub const REQUEST_DURATION_SECONDS: &str = "saucier_request_duration_seconds";

/// Total provider responses that could not be parsed as a structured
/// recipe and were returned in degraded form.
pub const PARSE_DEGRADED_TOTAL: &str = "saucier_parse_degraded_total";
