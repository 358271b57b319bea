//! Prometheus metrics for request volume and provider health.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};

// === Metric Name Constants ===

/// Chat requests counter metric name.
pub const METRIC_CHAT_REQUESTS: &str = "chat_requests_total";
/// Journal writes counter metric name.
pub const METRIC_JOURNAL_WRITES: &str = "journal_writes_total";
/// Emotion fallback counter metric name.
pub const METRIC_EMOTION_FALLBACKS: &str = "emotion_fallbacks_total";
/// Completion fallback counter metric name.
pub const METRIC_COMPLETION_FALLBACKS: &str = "completion_fallbacks_total";
/// Store error counter metric name.
pub const METRIC_STORE_ERRORS: &str = "store_errors_total";
/// XP awarded counter metric name.
pub const METRIC_XP_AWARDED: &str = "xp_awarded_total";
/// Provider request latency metric name.
pub const METRIC_PROVIDER_LATENCY: &str = "provider_request_latency_ms";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(METRIC_CHAT_REQUESTS, "Total number of chat requests");
    describe_counter!(METRIC_JOURNAL_WRITES, "Total number of journal entries created");
    describe_counter!(
        METRIC_EMOTION_FALLBACKS,
        "Emotion analyses degraded to the neutral fallback"
    );
    describe_counter!(
        METRIC_COMPLETION_FALLBACKS,
        "Completions degraded to the canned reply"
    );
    describe_counter!(METRIC_STORE_ERRORS, "Document store operation failures");
    describe_counter!(METRIC_XP_AWARDED, "Total XP awarded across all users");
    describe_histogram!(
        METRIC_PROVIDER_LATENCY,
        "Outbound provider request latency in milliseconds"
    );
}

/// Record one chat request.
pub fn inc_chat_requests() {
    counter!(METRIC_CHAT_REQUESTS).increment(1);
}

/// Record one journal entry creation.
pub fn inc_journal_writes() {
    counter!(METRIC_JOURNAL_WRITES).increment(1);
}

/// Record an emotion analysis that fell back to neutral.
pub fn inc_emotion_fallbacks() {
    counter!(METRIC_EMOTION_FALLBACKS).increment(1);
}

/// Record a completion that fell back to the canned reply.
pub fn inc_completion_fallbacks() {
    counter!(METRIC_COMPLETION_FALLBACKS).increment(1);
}

/// Record a store failure.
pub fn inc_store_errors() {
    counter!(METRIC_STORE_ERRORS).increment(1);
}

/// Record awarded XP.
pub fn record_xp_awarded(amount: i64) {
    counter!(METRIC_XP_AWARDED).increment(amount.max(0) as u64);
}

/// Record latency of one provider round trip.
pub fn record_provider_latency(provider: &'static str, start: Instant) {
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_PROVIDER_LATENCY, "provider" => provider).record(elapsed_ms);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_do_not_panic_without_a_recorder() {
        init_metrics();
        inc_chat_requests();
        inc_journal_writes();
        inc_emotion_fallbacks();
        inc_completion_fallbacks();
        inc_store_errors();
        record_xp_awarded(15);
        record_xp_awarded(-5);
        record_provider_latency("emotion", Instant::now());
    }
}
