use anyhow::Context;
use shared::config::Settings;
use shared::kafka::KafkaAdmin;
use shared::reconcile;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

mod args;
mod report;

use args::ModuleArgs;
use report::{AnsibleReporter, ReportSink};

fn load_args() -> anyhow::Result<ModuleArgs> {
    let path = std::env::args()
        .nth(1)
        .context("usage: kafka_topic <argument file>")?;
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read argument file {path}"))?;
    Ok(args::parse(&text)?)
}

#[tokio::main]
async fn main() -> ExitCode {
    // stdout is reserved for the module result.
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut reporter = AnsibleReporter::new(std::io::stdout());

    let module = match load_args() {
        Ok(module) => module,
        Err(e) => {
            error!(error = %format!("{e:#}"), "invalid module arguments");
            return reporter.fail(&format!("{e:#}")).into();
        }
    };

    let settings = match Settings::new() {
        Ok(settings) => settings,
        Err(e) => {
            error!(%e, "failed to load settings");
            return reporter.fail(&format!("failed to load settings: {e}")).into();
        }
    };

    let admin = match KafkaAdmin::connect(&module.brokers, &settings) {
        Ok(admin) => admin,
        Err(e) => {
            error!(%e, "kafka client unavailable");
            return reporter.fail(&e.to_string()).into();
        }
    };

    info!(
        topic = %module.desired.topic,
        state = %module.desired.presence,
        "reconciling topic"
    );
    let outcome = reconcile::apply(&module.desired, &admin).await;
    drop(admin);

    report::deliver(outcome, &mut reporter).into()
}
