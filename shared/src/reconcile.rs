//! Decides whether a topic has to be created, deleted or left alone and
//! performs at most one broker mutation accordingly.

use tracing::info;

use crate::dto::{Action, DesiredState, ObservedState, Presence, ReconciliationResult};
use crate::error::{MutationOp, Result, TopicError};
use crate::kafka::MutationPort;

fn validate(desired: &DesiredState) -> Result<()> {
    if desired.topic.is_empty() {
        return Err(TopicError::InvalidDesiredState("topic name is empty".into()));
    }
    if desired.partitions <= 0 {
        return Err(TopicError::InvalidDesiredState(format!(
            "partitions must be positive, got {}",
            desired.partitions
        )));
    }
    if desired.replication_factor <= 0 {
        return Err(TopicError::InvalidDesiredState(format!(
            "replication_factor must be positive, got {}",
            desired.replication_factor
        )));
    }
    Ok(())
}

/// Bring the topic to its desired presence given what the broker reported.
///
/// Existing topics are never altered: partition count, replication factor and
/// config drift all yield [`Action::Unchanged`].
pub async fn reconcile<P: MutationPort + ?Sized>(
    desired: &DesiredState,
    observed: ObservedState,
    port: &P,
) -> Result<ReconciliationResult> {
    validate(desired)?;
    decide(desired, observed, port).await
}

/// Observe the topic once, then reconcile it.
pub async fn apply<P: MutationPort + ?Sized>(
    desired: &DesiredState,
    port: &P,
) -> Result<ReconciliationResult> {
    // Invalid input must not reach the broker, not even for the existence check.
    validate(desired)?;
    let exists = port.topic_exists(&desired.topic).await?;
    decide(desired, ObservedState { exists }, port).await
}

async fn decide<P: MutationPort + ?Sized>(
    desired: &DesiredState,
    observed: ObservedState,
    port: &P,
) -> Result<ReconciliationResult> {
    let topic = desired.topic.as_str();
    let action = match (desired.presence, observed.exists) {
        (Presence::Present, false) => {
            port.create(
                topic,
                desired.partitions,
                desired.replication_factor,
                &desired.config,
            )
            .await
            .map_err(|e| TopicError::mutation(MutationOp::Create, e))?;
            Action::Created
        }
        (Presence::Absent, true) => {
            port.delete(topic)
                .await
                .map_err(|e| TopicError::mutation(MutationOp::Delete, e))?;
            Action::Deleted
        }
        _ => Action::Unchanged,
    };
    info!(topic = %topic, %action, "reconciliation finished");
    Ok(ReconciliationResult::new(action, topic))
}
