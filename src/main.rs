//! # Formline Main Entry Point
//!
//! Headless driver: loads a form definition, enters values, runs the
//! requested captcha challenges and submits.

use anyhow::{bail, Context, Result};
use formline::cmd_args::CommandLineArgs;
use formline::config::{get_config_path, load_runtime_config};
use formline::runtime::models::FormDefinition;
use formline::runtime::services::{HttpChallengeWidget, HttpTransport};
use formline::runtime::{FormContainer, SubmitOutcome};
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "FORMLINE_LOG";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = CommandLineArgs::parse();

    let config_path = args
        .config()
        .map(str::to_string)
        .unwrap_or_else(get_config_path);
    let config = load_runtime_config(&config_path)?;

    let text = std::fs::read_to_string(args.definition())
        .with_context(|| format!("Failed to read {}", args.definition()))?;
    let definition = FormDefinition::from_json(&text)?;

    let action = args
        .action()
        .map(str::to_string)
        .or_else(|| definition.action.clone());
    let endpoint = args.challenge_endpoint().unwrap_or_default().to_string();

    let form = FormContainer::build(
        &definition,
        config.settings(),
        HttpChallengeWidget::new(endpoint),
        HttpTransport::new(action.clone().unwrap_or_default()),
    )?;

    for (id, value) in args.fill() {
        form.input(id, value).await?;
    }
    for id in args.challenge() {
        let state = form.run_challenge(id).await?;
        println!("{}: {}", id, state.as_str());
    }

    if args.dump_html() {
        println!("{}", form.html());
        return Ok(());
    }
    if action.is_none() {
        bail!("No submission endpoint: pass --action or set \"action\" in the definition");
    }

    match form.submit().await? {
        SubmitOutcome::Succeeded(receipt) => {
            if let Some(message) = form.confirmation_text() {
                print!("{message}");
            }
            if let Some(url) = receipt.redirect_url {
                println!("Redirect: {url}");
            }
            Ok(())
        }
        SubmitOutcome::Rejected(report) => {
            for entry in &report.invalid {
                for error in &entry.errors {
                    eprintln!("{}: {}", entry.id, error);
                }
            }
            bail!("Form is invalid")
        }
        SubmitOutcome::Failed(failure) => bail!("Submission failed: {failure}"),
        SubmitOutcome::Ignored | SubmitOutcome::Discarded => Ok(()),
    }
}
