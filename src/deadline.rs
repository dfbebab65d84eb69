use std::time::Duration;

use tokio::time::Instant;

use crate::{CallContext, ClientOptions};

// Stand-in for "no deadline" when the budget does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Factor applied to `retry_delay + request_timeout` when a call carries no
/// deadline of its own.
pub const DEADLINE_MULTIPLIER: u32 = 4;

/// Overall budget given to a call that arrives without a deadline.
pub fn synthesized_timeout(options: &ClientOptions) -> Duration {
    options
        .retry_delay
        .saturating_add(options.request_timeout)
        .saturating_mul(DEADLINE_MULTIPLIER)
}

/// Returns a context that is guaranteed to carry a deadline.
///
/// A caller-supplied deadline is kept untouched. Otherwise the result is a
/// child of `ctx` expiring [`synthesized_timeout`] from now; it is released
/// when dropped.
pub fn ensure_deadline(ctx: &CallContext, options: &ClientOptions) -> CallContext {
    if ctx.deadline().is_some() {
        return ctx.clone();
    }
    let now = Instant::now();
    let deadline = now
        .checked_add(synthesized_timeout(options))
        .unwrap_or_else(|| now + FAR_FUTURE);
    ctx.child().with_deadline(deadline)
}
