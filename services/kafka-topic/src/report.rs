//! Ansible result reporting.

use serde::Serialize;
use shared::dto::{ReconciliationResult, TopicPayload};
use shared::error::TopicError;
use std::io::Write;
use std::process::ExitCode;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => ExitCode::SUCCESS,
            Status::Failure => ExitCode::FAILURE,
        }
    }
}

/// Terminal destination of a module run. Exactly one call is made per run.
pub trait ReportSink {
    fn succeed(&mut self, msg: &str, changed: bool, payload: &TopicPayload) -> Status;
    fn fail(&mut self, msg: &str) -> Status;
}

#[derive(Serialize)]
struct Success<'a> {
    changed: bool,
    msg: &'a str,
    #[serde(flatten)]
    payload: &'a TopicPayload,
}

#[derive(Serialize)]
struct Failure<'a> {
    failed: bool,
    msg: &'a str,
}

/// Writes the single-line JSON document Ansible expects from a module.
pub struct AnsibleReporter<W: Write> {
    out: W,
}

impl<W: Write> AnsibleReporter<W> {
    pub fn new(out: W) -> Self {
        AnsibleReporter { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit<T: Serialize>(&mut self, doc: &T) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.out, doc)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> ReportSink for AnsibleReporter<W> {
    fn succeed(&mut self, msg: &str, changed: bool, payload: &TopicPayload) -> Status {
        let doc = Success {
            changed,
            msg,
            payload,
        };
        match self.emit(&doc) {
            Ok(()) => Status::Success,
            Err(e) => {
                error!(%e, "failed to write module result");
                Status::Failure
            }
        }
    }

    fn fail(&mut self, msg: &str) -> Status {
        if let Err(e) = self.emit(&Failure { failed: true, msg }) {
            error!(%e, "failed to write module result");
        }
        Status::Failure
    }
}

/// Hand the reconciliation outcome to the sink.
pub fn deliver<S: ReportSink + ?Sized>(
    outcome: Result<ReconciliationResult, TopicError>,
    sink: &mut S,
) -> Status {
    match outcome {
        Ok(result) => sink.succeed(&result.message, result.action.changed(), &result.payload()),
        Err(err) => {
            error!(%err, "topic reconciliation failed");
            sink.fail(&err.to_string())
        }
    }
}
