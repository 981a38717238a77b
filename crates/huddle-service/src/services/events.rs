//! Best-effort event publication shared by the use-cases

use huddle_core::DomainEvent;
use tracing::{debug, warn};

use super::context::ServiceContext;
use crate::request_context::RequestContext;

/// Publish after a successful write. Failures are logged and never surface;
/// a caller context cancelled after the write still gets its event out on a
/// short detached context.
pub(crate) async fn publish_best_effort(
    ctx: &ServiceContext,
    cx: &RequestContext,
    event: DomainEvent,
) {
    let detached;
    let cx = if cx.check().is_err() {
        detached = RequestContext::detached(ctx.config().compensation_timeout());
        &detached
    } else {
        cx
    };

    match ctx.publisher().publish(cx, &event).await {
        Ok(()) => debug!(event_type = event.event_type(), "Event published"),
        Err(e) => warn!(
            event_type = event.event_type(),
            aggregate_id = %event.aggregate_id,
            error = %e,
            "Failed to publish event"
        ),
    }
}
