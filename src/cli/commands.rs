//! Command dispatch for `prequal_cli`.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::cli::io::TerminalPrompter;
use crate::cli::output::{self, OutputPreferences};
use crate::cli::runner::{RunOutcome, WizardRunner, INCOMPLETE_MESSAGE, SUCCESS_MESSAGE};
use crate::config::{Config, ConfigManager};
use crate::domain::{Draft, FieldId, FormSchema, Section};
use crate::errors::{CliError, CliResult, WizardError};
use crate::notify::{Notifier, TemplateParams};
use crate::wizard::{FormWizard, SubmitOutcome};

pub const USAGE: &str = "\
Usage: prequal_cli [OPTIONS] [COMMAND]

Options:
  --plain                Print messages without colours or icons
  -q, --quiet            Hide informational messages

Commands:
  wizard                 Fill in the prequalification form interactively (default)
  fields                 List sections, fields and options
  preview <answers.json> Validate an answers file and print the email payload
  send <answers.json>    Validate an answers file and deliver it through EmailJS
  config                 Show the effective configuration
  config set <key> <value>
                         Store service_id, template_id, public_key, endpoint or timeout
  help                   Show this message";

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Wizard,
    Fields,
    Preview(String),
    Send(String),
    ShowConfig,
    SetConfig { key: String, value: String },
    Help,
    Version,
}

impl Command {
    pub fn parse<I>(args: I) -> CliResult<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let Some(command) = args.next() else {
            return Ok(Command::Wizard);
        };

        let command = match command.as_str() {
            "wizard" => Command::Wizard,
            "fields" => Command::Fields,
            "preview" => Command::Preview(required_arg(args.next(), "answers file")?),
            "send" => Command::Send(required_arg(args.next(), "answers file")?),
            "config" => match args.next().as_deref() {
                None => Command::ShowConfig,
                Some("set") => Command::SetConfig {
                    key: required_arg(args.next(), "config key")?,
                    value: required_arg(args.next(), "config value")?,
                },
                Some(other) => {
                    return Err(CliError::Input(format!("unknown config action `{other}`")))
                }
            },
            "help" | "--help" | "-h" => Command::Help,
            "version" | "--version" | "-V" => Command::Version,
            other => return Err(CliError::Input(format!("unknown command `{other}`"))),
        };

        if let Some(extra) = args.next() {
            return Err(CliError::Input(format!("unexpected argument `{extra}`")));
        }
        Ok(command)
    }
}

/// Command line with the output options that precede the command.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub command: Command,
    pub output: OutputPreferences,
}

impl Invocation {
    pub fn parse<I>(args: I) -> CliResult<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter().peekable();
        let mut output = OutputPreferences::default();
        while let Some(flag) = args.next_if(|arg| arg.starts_with('-')) {
            match flag.as_str() {
                "--plain" => output.plain = true,
                "--quiet" | "-q" => output.quiet_mode = true,
                _ => {
                    let command = Command::parse(std::iter::once(flag).chain(args))?;
                    return Ok(Self { command, output });
                }
            }
        }
        Ok(Self {
            command: Command::parse(args)?,
            output,
        })
    }
}

fn required_arg(value: Option<String>, what: &str) -> CliResult<String> {
    value.ok_or_else(|| CliError::Input(format!("missing {what}\n\n{USAGE}")))
}

pub async fn execute(command: Command) -> CliResult<()> {
    match command {
        Command::Wizard => {
            let config = ConfigManager::new()?.load_effective()?;
            run_wizard(&config).await
        }
        Command::Fields => {
            print_fields(FormSchema::prequalification());
            Ok(())
        }
        Command::Preview(path) => {
            let params = load_and_validate(Path::new(&path))?;
            println!("{}", serde_json::to_string_pretty(&params)?);
            Ok(())
        }
        Command::Send(path) => {
            let config = ConfigManager::new()?.load_effective()?;
            let notifier = config.notifier();
            send_answers(Path::new(&path), &notifier, &config).await
        }
        Command::ShowConfig => {
            let manager = ConfigManager::new()?;
            print_config(&manager.load_effective()?, manager.path());
            Ok(())
        }
        Command::SetConfig { key, value } => {
            let manager = ConfigManager::new()?;
            let mut config = manager.load()?;
            set_config_value(&mut config, &key, value)?;
            manager.save(&config)?;
            output::success(format!("Saved `{key}` to {}", manager.path().display()));
            Ok(())
        }
        Command::Help => {
            println!("{USAGE}");
            Ok(())
        }
        Command::Version => {
            println!("{}", version_line());
            Ok(())
        }
    }
}

async fn run_wizard(config: &Config) -> CliResult<()> {
    let notifier = config.notifier();
    if !config.emailjs.is_complete() {
        output::warning("EmailJS credentials are missing; submissions will fail.");
    }
    let mut runner = WizardRunner::new(FormWizard::new(), &notifier, config.submit_timeout());
    let mut prompter = TerminalPrompter::new();
    match runner.run(&mut prompter).await? {
        RunOutcome::Delivered(receipt) => {
            output::detail(format!("Folio: {}", receipt.id));
            Ok(())
        }
        RunOutcome::Abandoned(err) => Err(err.into()),
        RunOutcome::Cancelled => Ok(()),
    }
}

/// Loads an answers file into a fresh wizard.
pub fn load_wizard(path: &Path) -> CliResult<FormWizard> {
    let data = fs::read_to_string(path)
        .map_err(|err| CliError::Input(format!("cannot read {}: {err}", path.display())))?;
    let draft = parse_answers(&data)?;
    info!(path = %path.display(), "Loaded answers file");
    Ok(FormWizard::new().with_draft(draft))
}

/// Parses answers keyed by field wire keys. Unknown keys are rejected with the
/// closest known key as a hint.
fn parse_answers(data: &str) -> CliResult<Draft> {
    let value: serde_json::Value = serde_json::from_str(data)?;
    if let Some(answers) = value.as_object() {
        for key in answers.keys() {
            let field: FieldId = key.parse()?;
            if field.key() != key {
                return Err(WizardError::UnknownField {
                    name: key.clone(),
                    suggestion: Some(field.key()),
                }
                .into());
            }
        }
    }
    Ok(serde_json::from_value(value)?)
}

fn load_and_validate(path: &Path) -> CliResult<TemplateParams> {
    let mut wizard = load_wizard(path)?;
    ensure_complete(&mut wizard)?;
    Ok(TemplateParams::from(wizard.draft()))
}

fn ensure_complete(wizard: &mut FormWizard) -> CliResult<()> {
    if wizard.validate_all() {
        return Ok(());
    }
    let details = wizard
        .errors()
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ");
    Err(CliError::Input(format!(
        "{INCOMPLETE_MESSAGE} (sección {}: {details})",
        wizard.current()
    )))
}

/// Validates an answers file and delivers it through `notifier`.
pub async fn send_answers(
    path: &Path,
    notifier: &dyn Notifier,
    config: &Config,
) -> CliResult<()> {
    let mut wizard = load_wizard(path)?;
    ensure_complete(&mut wizard)?;
    match wizard.submit(notifier, config.submit_timeout()).await {
        SubmitOutcome::Delivered(receipt) => {
            output::success(SUCCESS_MESSAGE);
            output::detail(format!("Folio: {}", receipt.id));
            Ok(())
        }
        SubmitOutcome::Failed(err) => Err(err.into()),
        SubmitOutcome::Incomplete { .. } | SubmitOutcome::Ignored => {
            Err(CliError::Input(INCOMPLETE_MESSAGE.into()))
        }
    }
}

fn print_fields(schema: &FormSchema) {
    for section in Section::all() {
        let spec = schema.section(section);
        output::section(format!("{section}. {}", spec.title));
        for field in &spec.fields {
            let marker = if schema.rule(section, *field).is_some() {
                " *"
            } else {
                ""
            };
            println!("  {:<20}{}{}", field.key(), field.label(), marker);
            for option in field.options() {
                output::detail(format!("    - {option}"));
            }
        }
    }
}

fn print_config(config: &Config, path: &Path) {
    output::section("Configuration");
    println!("  file:         {}", path.display());
    println!("  service_id:   {}", or_unset(&config.emailjs.service_id));
    println!("  template_id:  {}", or_unset(&config.emailjs.template_id));
    println!("  public_key:   {}", or_unset(&config.masked_public_key()));
    println!("  endpoint:     {}", config.endpoint);
    println!("  timeout:      {}s", config.submit_timeout().as_secs());
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(unset)"
    } else {
        value
    }
}

const CONFIG_KEYS: [&str; 6] = [
    "service_id",
    "template_id",
    "public_key",
    "access_token",
    "endpoint",
    "timeout",
];

fn set_config_value(config: &mut Config, key: &str, value: String) -> CliResult<()> {
    match key {
        "service_id" => config.emailjs.service_id = value,
        "template_id" => config.emailjs.template_id = value,
        "public_key" => config.emailjs.public_key = value,
        "access_token" => config.access_token = Some(value).filter(|v| !v.is_empty()),
        "endpoint" => config.endpoint = value,
        "timeout" => {
            config.submit_timeout_secs = value.trim().parse().map_err(|_| {
                CliError::Input(format!("timeout must be whole seconds, got `{value}`"))
            })?;
        }
        other => {
            let hint = CONFIG_KEYS
                .iter()
                .find(|candidate| strsim::levenshtein(candidate, other) <= 2)
                .map(|candidate| format!(" (did you mean `{candidate}`?)"))
                .unwrap_or_default();
            return Err(CliError::Input(format!("unknown config key `{other}`{hint}")));
        }
    }
    Ok(())
}

pub fn version_line() -> String {
    format!(
        "prequal_cli {} ({} {}, {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("PREQUAL_BUILD_HASH"),
        env!("PREQUAL_BUILD_STATUS"),
        env!("PREQUAL_BUILD_TARGET"),
        env!("PREQUAL_BUILD_TIMESTAMP"),
    )
}
