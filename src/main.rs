use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use workday_autofill::{
    ensure_on_form, extract_all_steps_sequentially, AnswerSet, ApplicantBrowser, Application, Page,
    Timeouts,
};

#[derive(Parser, Debug)]
#[command(name = "workday-autofill", version, about = "Read and fill Workday job applications")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Override the answer file's `headless` setting.
    #[arg(long, global = true)]
    headless: Option<bool>,

    /// Chrome or Chromium executable to launch instead of the detected one.
    #[arg(long, global = true)]
    chrome_path: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and write every step's fields as JSON.
    Extract {
        #[arg(long, default_value = "answers.yml")]
        config: PathBuf,
        #[arg(long, default_value = "extracted_form_data.json")]
        output: PathBuf,
    },
    /// Sign in and fill the wizard with the configured answers.
    Apply {
        #[arg(long, default_value = "answers.yml")]
        config: PathBuf,
        /// Directory for screenshots of failed steps.
        #[arg(long, default_value = ".")]
        screenshots: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config_path = match &cli.command {
        Command::Extract { config, .. } | Command::Apply { config, .. } => config,
    };
    let answers = AnswerSet::load(config_path)
        .with_context(|| format!("failed to load answers from {}", config_path.display()))?;

    let mut builder = ApplicantBrowser::builder().headless(cli.headless.unwrap_or(answers.headless));
    if let Some(path) = &cli.chrome_path {
        builder = builder.chrome_path(path.clone());
    }
    let browser = builder.build().await.context("failed to launch browser")?;

    let outcome = run(&browser, &cli.command, &answers).await;
    browser.close().await.context("failed to close browser")?;
    info!("browser closed");
    outcome
}

async fn run(browser: &ApplicantBrowser, command: &Command, answers: &AnswerSet) -> anyhow::Result<()> {
    let page: Page = browser
        .new_page("about:blank")
        .await
        .context("failed to open a tab")?;
    let timeouts = Timeouts::default();
    ensure_on_form(&page, answers, &timeouts)
        .await
        .context("could not reach the application form")?;
    info!(url = %page.url().await?, "on the application form");

    match command {
        Command::Extract { output, .. } => {
            let snapshot = extract_all_steps_sequentially(&page).await;
            let json = serde_json::to_string_pretty(&snapshot)?;
            tokio::fs::write(output, json)
                .await
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!(steps = snapshot.len(), path = %output.display(), "form data written");
        }
        Command::Apply { screenshots, .. } => {
            let records = Application::new(answers, timeouts)
                .screenshot_dir(screenshots)
                .run(&page)
                .await
                .context("application run stopped")?;
            for record in &records {
                info!(
                    step = %record.step_name,
                    filled = record.report.filled,
                    skipped = record.report.skipped,
                    failed = record.report.failed,
                    "step summary"
                );
            }
        }
    }
    Ok(())
}

fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("WORKDAY_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
