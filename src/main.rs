//! Command-line front end for the SATUSEHAT/DICOM demo forms.
//!
//!   satset-console scenarios
//!   satset-console submit encounter --autofill encounter
//!   satset-console lookup 20250002
//!   satset-console live --page http://127.0.0.1:5000/ --form encounter --autofill encounter

use std::process::ExitCode;
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use satset_console::autofill::FieldValue;
use satset_console::config::DEFAULT_BASE_URL;
use satset_console::{
    ConsoleBrowser, ConsoleBuilder, Form, FormBinder, FormField, FormKind, Outcome,
    RequestDispatcher, Result, Route, Scenario, TerminalUi,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Drive the clinical-data submission forms from the terminal
#[derive(Parser)]
#[command(name = "satset-console", version)]
#[command(about = "Autofill, submit and look up SATUSEHAT/DICOM demo forms", long_about = None)]
struct Cli {
    /// Server the endpoints are joined onto
    #[arg(short, long, env = "SATSET_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Abort requests after this many seconds (default: wait indefinitely)
    #[arg(long, env = "SATSET_REQUEST_TIMEOUT")]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List autofill scenarios and the fields they set
    Scenarios,

    /// List known forms with their endpoints and result slots
    Forms,

    /// Build a form, optionally autofill it, and submit it
    Submit {
        /// Form id or suffix, e.g. `form-encounter` or `encounter`
        form: String,

        /// Autofill scenario to apply before submitting
        #[arg(short, long)]
        autofill: Option<String>,

        /// Extra `name=value` assignments, applied after autofill
        #[arg(short, long = "set")]
        set: Vec<String>,
    },

    /// Look up an imaging study by accession number
    Lookup {
        /// Accession number
        acsn: String,
    },

    /// Fill and submit a form on the live demo page in headless Chrome
    Live {
        /// URL of the demo page
        #[arg(short, long)]
        page: String,

        /// Form id or suffix
        #[arg(short, long)]
        form: String,

        /// Autofill scenario to apply in the page
        #[arg(short, long)]
        autofill: Option<String>,

        /// Show the browser window
        #[arg(long)]
        headed: bool,

        /// Path to the Chrome executable
        #[arg(long, env = "CHROME_PATH")]
        chrome_path: Option<String>,
    },
}

fn builder(cli: &Cli) -> ConsoleBuilder {
    let mut builder = ConsoleBuilder::new().base_url(cli.base_url.clone());
    if let Some(secs) = cli.timeout_secs {
        builder = builder.request_timeout(Duration::from_secs(secs));
    }
    builder
}

fn print_scenarios() {
    for scenario in Scenario::ALL {
        println!("{scenario}");
        for (name, value) in scenario.entries() {
            let shown = match value {
                FieldValue::Literal(literal) => (*literal).to_string(),
                FieldValue::Now => "<now>".to_string(),
                FieldValue::MinutesFromNow(minutes) => format!("<now + {minutes} min>"),
            };
            println!("  {name} = {shown}");
        }
    }
}

fn print_forms() {
    for kind in FormKind::ALL {
        let route = match kind.route() {
            Route::Post(path) => format!("POST {path}"),
            Route::Lookup { prefix, field } => format!("GET  {prefix}{{{field}}}"),
        };
        println!("{:<22} {:<36} {}", kind.form_id(), route, kind.result_slot());
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "satset_console=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let outcome: Outcome = match &cli.command {
        Commands::Scenarios => {
            print_scenarios();
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Forms => {
            print_forms();
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Submit { form, autofill, set } => {
            let kind: FormKind = form.parse()?;
            let mut form = Form::blank(kind);
            if let Some(tag) = autofill {
                tag.parse::<Scenario>()?.apply(&mut form, Utc::now());
            }
            for assignment in set {
                let field: FormField = assignment.parse()?;
                if !form.set(&field.name, field.value.clone()) {
                    form = form.with_field(field.name, field.value);
                }
            }

            let binder = FormBinder::new(builder(&cli).dispatcher(TerminalUi)?);
            binder.submit_as(kind, &form).await?
        }
        Commands::Lookup { acsn } => {
            let kind = FormKind::ImagingLookup;
            let mut form = Form::blank(kind);
            form.set("acsn", acsn.as_str());

            let binder = FormBinder::new(builder(&cli).dispatcher(TerminalUi)?);
            binder.submit_as(kind, &form).await?
        }
        Commands::Live {
            page,
            form,
            autofill,
            headed,
            chrome_path,
        } => {
            let kind: FormKind = form.parse()?;
            let mut console = builder(&cli).headless(!headed);
            if let Some(path) = chrome_path {
                console = console.chrome_path(path.clone());
            }
            let config = console.build_config();
            let browser = ConsoleBrowser::launch(config.clone()).await?;

            let live = browser.open(page).await?;
            let form_id = kind.form_id();
            live.wait_for_selector(&format!("#{form_id}")).await?;

            if let Some(tag) = autofill {
                live.autofill(&form_id, tag.parse()?, Utc::now()).await?;
            }
            let form = live.read_form(&form_id).await?;

            let binder = FormBinder::new(RequestDispatcher::new(&config, live.clone())?);
            let outcome = binder.submit_as(kind, &form).await?;

            match live.text_of(&kind.result_slot()).await? {
                Some(text) => println!("[{}]\n{text}", kind.result_slot()),
                None => tracing::warn!(slot = %kind.result_slot(), "page has no result slot"),
            }

            if let Err(e) = browser.close().await {
                tracing::warn!(error = %e, "browser did not shut down cleanly");
            }
            outcome
        }
    };

    Ok(outcome.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn live_autofill_help_describes_in_page_fill() {
        let command = Cli::command();
        let live = command.find_subcommand("live").expect("live subcommand");
        let autofill = live
            .get_arguments()
            .find(|arg| arg.get_id() == "autofill")
            .expect("autofill flag");
        assert_eq!(
            autofill.get_help().map(|help| help.to_string()),
            Some("Autofill scenario to apply in the page".to_string())
        );
    }
}
