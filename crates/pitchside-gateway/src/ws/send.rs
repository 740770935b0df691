use pitchside_hub::Outbound;
use tracing::debug;

/// Serialize any value to JSON and queue it on the connection's outbound
/// channel without waiting. Replies share the queue with broadcasts so a
/// viewer sees them in the order they were produced.
pub fn queue_json<T: serde::Serialize>(tx: &Outbound, payload: &T) -> bool {
    let json = match serde_json::to_string(payload) {
        Ok(json) => json,
        Err(e) => {
            debug!(error = %e, "reply serialization failed");
            return false;
        }
    };
    tx.try_send(json).is_ok()
}
