//! End-to-end module runs: argument file text in, Ansible result out, with the
//! cluster replaced by a scripted port.

#[path = "../src/args.rs"]
mod args;
#[path = "../src/report.rs"]
mod report;

use async_trait::async_trait;
use report::{deliver, AnsibleReporter, ReportSink, Status};
use serde_json::{json, Value};
use shared::dto::TopicPayload;
use shared::error::{Result, TopicError};
use shared::kafka::MutationPort;
use shared::reconcile::apply;
use std::collections::BTreeMap;
use std::sync::Mutex;

struct ScriptedPort {
    exists: bool,
    reject_create: bool,
    unreachable: bool,
    created: Mutex<Vec<(String, i32, i32, BTreeMap<String, String>)>>,
}

impl ScriptedPort {
    fn new(exists: bool, reject_create: bool) -> Self {
        ScriptedPort {
            exists,
            reject_create,
            unreachable: false,
            created: Mutex::new(Vec::new()),
        }
    }

    fn unreachable() -> Self {
        ScriptedPort {
            unreachable: true,
            ..ScriptedPort::new(false, false)
        }
    }
}

#[async_trait]
impl MutationPort for ScriptedPort {
    async fn topic_exists(&self, _topic: &str) -> Result<bool> {
        if self.unreachable {
            return Err(TopicError::connection(
                "failed to check if topic exists",
                "Local: All broker connections are down",
            ));
        }
        Ok(self.exists)
    }

    async fn create(
        &self,
        topic: &str,
        partitions: i32,
        replication_factor: i32,
        config: &BTreeMap<String, String>,
    ) -> Result<()> {
        self.created.lock().unwrap().push((
            topic.to_string(),
            partitions,
            replication_factor,
            config.clone(),
        ));
        if self.reject_create {
            return Err(TopicError::BrokerRejected {
                topic: topic.into(),
                code: "Broker: Invalid replication factor".into(),
            });
        }
        Ok(())
    }

    async fn delete(&self, _topic: &str) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSink {
    succeeded: Vec<String>,
    failed: Vec<String>,
}

impl ReportSink for RecordingSink {
    fn succeed(&mut self, msg: &str, _changed: bool, _payload: &TopicPayload) -> Status {
        self.succeeded.push(msg.to_string());
        Status::Success
    }

    fn fail(&mut self, msg: &str) -> Status {
        self.failed.push(msg.to_string());
        Status::Failure
    }
}

#[tokio::test]
async fn creates_topic_from_argument_file() {
    let module = args::parse(
        r#"zookeeper=kafka-1:9092,kafka-2:9092 topic=orders partitions=3 replication_factor=2 config='{"cleanup.policy": "compact"}'"#,
    )
    .unwrap();
    let port = ScriptedPort::new(false, false);
    let mut reporter = AnsibleReporter::new(Vec::new());

    let status = deliver(apply(&module.desired, &port).await, &mut reporter);

    assert_eq!(status, Status::Success);
    let mut config = BTreeMap::new();
    config.insert("cleanup.policy".to_string(), "compact".to_string());
    assert_eq!(
        *port.created.lock().unwrap(),
        vec![("orders".to_string(), 3, 2, config)]
    );
    let doc: Value = serde_json::from_slice(&reporter.into_inner()).unwrap();
    assert_eq!(
        doc,
        json!({"changed": true, "msg": "created topic", "topic": "orders"})
    );
}

#[tokio::test]
async fn rejected_create_reports_failure_only() {
    let module = args::parse(
        r#"{"zookeeper": "kafka:9092", "topic": "orders", "partitions": "3", "replication_factor": "2"}"#,
    )
    .unwrap();
    let port = ScriptedPort::new(false, true);
    let mut sink = RecordingSink::default();

    let outcome = apply(&module.desired, &port).await;
    assert!(matches!(
        outcome,
        Err(TopicError::MutationFailure {
            op: shared::error::MutationOp::Create,
            ..
        })
    ));
    let status = deliver(outcome, &mut sink);

    assert_eq!(status, Status::Failure);
    assert!(sink.succeeded.is_empty());
    assert_eq!(
        sink.failed,
        vec![
            "failed to create topic: broker rejected request for topic orders: Broker: Invalid replication factor"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn present_topic_reports_unchanged() {
    let module = args::parse(r#"{"zookeeper": "kafka:9092", "topic": "orders"}"#).unwrap();
    let port = ScriptedPort::new(true, false);
    let mut sink = RecordingSink::default();

    let status = deliver(apply(&module.desired, &port).await, &mut sink);

    assert_eq!(status, Status::Success);
    assert_eq!(sink.succeeded, vec!["topic is in the desired state".to_string()]);
    assert!(port.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_cluster_reports_existence_failure() {
    let module = args::parse(r#"{"zookeeper": "kafka:9092", "topic": "orders"}"#).unwrap();
    let port = ScriptedPort::unreachable();
    let mut sink = RecordingSink::default();

    let outcome = apply(&module.desired, &port).await;
    let err = outcome.as_ref().unwrap_err();
    assert!(err.op().is_none());
    assert!(matches!(err, TopicError::Connection { .. }));
    let status = deliver(outcome, &mut sink);

    assert_eq!(status, Status::Failure);
    assert!(sink.succeeded.is_empty());
    assert!(port.created.lock().unwrap().is_empty());
    assert_eq!(
        sink.failed,
        vec!["failed to check if topic exists: Local: All broker connections are down".to_string()]
    );
}
