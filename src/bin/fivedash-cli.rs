//! Command-line client for the training backend.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use fivedash::backend::{Action, Backend, HttpBackend};
use fivedash::config::{self, AppSettings};
use fivedash::prediction::{self, FeatureForm};
use fivedash::session::{DatasetInfo, RefreshOutcome, SessionCoordinator};
use fivedash::training::{PollerState, TrainingForm, TrainingPoller};
use fivedash::upload::{self, DatasetSelection};

fn main() {
    if let Err(err) = fivedash::logging::init_stderr() {
        eprintln!("Logging disabled: {err}");
    }
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[derive(Debug, PartialEq)]
struct Cli {
    backend_url: Option<String>,
    command: Command,
}

#[derive(Debug, PartialEq)]
enum Command {
    Health,
    Status,
    Upload(PathBuf),
    Train { overrides: TrainOverrides, watch: bool },
    Predict([String; 5]),
    Reset,
    DeleteModel,
    Config,
    Help,
}

#[derive(Debug, Default, PartialEq)]
struct TrainOverrides {
    epochs: Option<String>,
    batch_size: Option<String>,
    learning_rate: Option<String>,
    hidden_layers: Option<String>,
}

impl TrainOverrides {
    fn apply(self, form: &mut TrainingForm) {
        if let Some(value) = self.epochs {
            form.epochs = value;
        }
        if let Some(value) = self.batch_size {
            form.batch_size = value;
        }
        if let Some(value) = self.learning_rate {
            form.learning_rate = value;
        }
        if let Some(value) = self.hidden_layers {
            form.hidden_layers = value;
        }
    }
}

fn run() -> Result<(), String> {
    let cli = parse_args(std::env::args().skip(1).collect())?;
    if cli.command == Command::Help {
        println!("{}", help_text());
        return Ok(());
    }
    let settings = load_settings(cli.backend_url.as_deref())?;
    if cli.command == Command::Config {
        return print_config(&settings);
    }
    let backend = HttpBackend::new(&settings.backend);
    match cli.command {
        Command::Health => health(&backend),
        Command::Status => status(&backend),
        Command::Upload(path) => upload_dataset(&backend, &path),
        Command::Train { overrides, watch } => train(&backend, &settings, overrides, watch),
        Command::Predict(values) => predict(&backend, &settings, values),
        Command::Reset => reset(&backend),
        Command::DeleteModel => delete_model(&backend),
        Command::Config | Command::Help => Ok(()),
    }
}

fn load_settings(backend_url: Option<&str>) -> Result<AppSettings, String> {
    let mut settings = config::load_or_default().map_err(|err| err.to_string())?;
    config::apply_env_overrides(&mut settings);
    if let Some(url) = backend_url
        && !settings.backend.override_base_url(url)
    {
        return Err(format!("Invalid --backend URL: {url}"));
    }
    Ok(settings)
}

fn print_config(settings: &AppSettings) -> Result<(), String> {
    let path = config::config_path().map_err(|err| err.to_string())?;
    let text = toml::to_string_pretty(settings).map_err(|err| err.to_string())?;
    println!("# {}", path.display());
    print!("{text}");
    Ok(())
}

fn health(backend: &dyn Backend) -> Result<(), String> {
    let health = backend
        .health()
        .map_err(|err| err.user_message(Action::Health))?;
    println!("{}", health.status);
    if health.is_healthy() {
        Ok(())
    } else {
        Err(format!("Backend reports {:?}", health.status))
    }
}

fn status(backend: &dyn Backend) -> Result<(), String> {
    let status = backend
        .status()
        .map_err(|err| err.user_message(Action::Status))?;
    println!(
        "Dataset: {}",
        if status.data_loaded { "loaded" } else { "none" }
    );
    match (&status.model_name, status.model_loaded) {
        (Some(name), true) => println!("Model: trained ({name})"),
        (None, true) => println!("Model: trained"),
        (_, false) => println!("Model: not trained"),
    }
    let training = &status.training_state;
    if training.training {
        println!(
            "Training: running, epoch {}/{}",
            training.current_epoch, training.total_epochs
        );
    } else if let Some(error) = &training.error {
        println!("Training: failed ({error})");
    } else if let Some(loss) = training.final_loss {
        println!("Training: finished, final loss {loss:.6}");
    } else {
        println!("Training: idle");
    }
    Ok(())
}

fn upload_dataset(backend: &dyn Backend, path: &Path) -> Result<(), String> {
    let selection = DatasetSelection::from_path(path).map_err(|err| err.to_string())?;
    println!("Uploading {} ({})", selection.file_name(), selection.size_label());
    let outcome = upload::upload(backend, Some(&selection)).map_err(|err| err.to_string())?;
    println!("{}", outcome.message);
    println!(
        "Features (X): {}",
        DatasetInfo::format_shape(&outcome.info.feature_shape)
    );
    println!(
        "Labels (y): {}",
        DatasetInfo::format_shape(&outcome.info.label_shape)
    );
    Ok(())
}

fn train(
    backend: &dyn Backend,
    settings: &AppSettings,
    overrides: TrainOverrides,
    watch: bool,
) -> Result<(), String> {
    let mut form = settings.training.form();
    overrides.apply(&mut form);
    let mut poller = TrainingPoller::new();
    let request = poller
        .start(&form, &settings.training.bounds())
        .map_err(|err| err.to_string())?;
    match backend.train(&request) {
        Ok(response) => poller.train_accepted(response),
        Err(err) => return Err(err.user_message(Action::Train)),
    }
    if let Some(run) = poller.run() {
        println!("{}", run.message);
    }
    if !watch {
        return Ok(());
    }

    let cancel = AtomicBool::new(false);
    let mut last_epoch = None;
    let state = poller.drive(
        backend,
        settings.polling.training_interval(),
        &cancel,
        |poller| {
            let Some(run) = poller.run() else {
                return;
            };
            if last_epoch == Some(run.current_epoch) {
                return;
            }
            last_epoch = Some(run.current_epoch);
            match run.loss_history.last() {
                Some(point) => println!(
                    "Epoch {}/{}  loss {:.6}",
                    run.current_epoch, run.total_epochs, point.loss
                ),
                None => println!("Epoch {}/{}", run.current_epoch, run.total_epochs),
            }
        },
    );
    match state {
        PollerState::Complete => {
            let loss = poller.run().and_then(|run| run.final_loss).unwrap_or_default();
            println!("Training complete. Final loss: {loss:.6}");
            Ok(())
        }
        PollerState::Failed => Err(poller.error().unwrap_or("Training failed").to_string()),
        other => Err(format!("Training stopped while {other:?}")),
    }
}

fn predict(
    backend: &dyn Backend,
    settings: &AppSettings,
    values: [String; 5],
) -> Result<(), String> {
    let result = prediction::predict(backend, &FeatureForm(values)).map_err(|err| err.to_string())?;
    println!("Prediction: {:.4}", result.prediction);
    match result.confidence_or(settings.prediction.default_confidence()) {
        Some(confidence) => println!("Confidence: {:.1}%", confidence * 100.0),
        None => println!("Confidence: unavailable"),
    }
    Ok(())
}

fn reset(backend: &dyn Backend) -> Result<(), String> {
    let mut session = SessionCoordinator::new();
    let response = session
        .clear_all(backend)
        .map_err(|err| err.user_message(Action::Reset))?;
    println!("{}", non_empty(response.message, "All data and models cleared"));
    Ok(())
}

fn delete_model(backend: &dyn Backend) -> Result<(), String> {
    let mut session = SessionCoordinator::new();
    if session.refresh_status(backend) == RefreshOutcome::Applied && !session.state().model_trained
    {
        println!("No trained model to delete");
        return Ok(());
    }
    let response = session
        .delete_model(backend)
        .map_err(|err| err.user_message(Action::DeleteModel))?;
    println!("{}", non_empty(response.message, "Model deleted"));
    Ok(())
}

fn non_empty(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

fn parse_args(args: Vec<String>) -> Result<Cli, String> {
    let mut backend_url = None;
    let mut idx = 0usize;
    while idx < args.len() && args[idx].starts_with("--") {
        match args[idx].as_str() {
            "--backend" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--backend requires a value".to_string())?;
                backend_url = Some(value.clone());
            }
            "--help" => {
                return Ok(Cli {
                    backend_url,
                    command: Command::Help,
                });
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    let Some(command) = args.get(idx) else {
        return Err(help_text());
    };
    let rest = &args[idx + 1..];
    let command = match command.as_str() {
        "health" => no_arguments(rest, Command::Health)?,
        "status" => no_arguments(rest, Command::Status)?,
        "reset" => no_arguments(rest, Command::Reset)?,
        "delete-model" => no_arguments(rest, Command::DeleteModel)?,
        "config" => no_arguments(rest, Command::Config)?,
        "help" => Command::Help,
        "upload" => match rest {
            [path] => Command::Upload(PathBuf::from(path)),
            _ => return Err("upload takes exactly one file path".to_string()),
        },
        "predict" => {
            let values: [String; 5] = rest
                .to_vec()
                .try_into()
                .map_err(|_| "predict takes exactly 5 feature values".to_string())?;
            Command::Predict(values)
        }
        "train" => parse_train(rest)?,
        unknown => return Err(format!("Unknown command: {unknown}\n\n{}", help_text())),
    };
    Ok(Cli {
        backend_url,
        command,
    })
}

fn no_arguments(rest: &[String], command: Command) -> Result<Command, String> {
    match rest.first() {
        Some(extra) => Err(format!("Unexpected argument: {extra}")),
        None => Ok(command),
    }
}

fn parse_train(args: &[String]) -> Result<Command, String> {
    let mut overrides = TrainOverrides::default();
    let mut watch = true;
    let mut idx = 0usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        if flag == "--no-watch" {
            watch = false;
            idx += 1;
            continue;
        }
        let slot = match flag {
            "--epochs" => &mut overrides.epochs,
            "--batch-size" => &mut overrides.batch_size,
            "--learning-rate" => &mut overrides.learning_rate,
            "--hidden-layers" => &mut overrides.hidden_layers,
            unknown => return Err(format!("Unknown train option: {unknown}")),
        };
        idx += 1;
        let value = args
            .get(idx)
            .ok_or_else(|| format!("{flag} requires a value"))?;
        *slot = Some(value.clone());
        idx += 1;
    }
    Ok(Command::Train { overrides, watch })
}

fn help_text() -> String {
    "Usage: fivedash-cli [--backend URL] <command>\n\n\
Commands:\n\
  health                         Print backend health\n\
  status                         Print dataset, model, and training status\n\
  upload <file.pkl>              Upload a dataset\n\
  train [options]                Start training and watch it finish\n\
      --epochs N                 1-1000\n\
      --batch-size N             1-512\n\
      --learning-rate X\n\
      --hidden-layers L          e.g. 64,32,16\n\
      --no-watch                 Return once the backend accepts the run\n\
  predict <f1> <f2> <f3> <f4> <f5>\n\
  reset                          Clear the dataset and model on the backend\n\
  delete-model                   Delete the trained model\n\
  config                         Print the settings file and effective settings\n\n\
Environment:\n\
  FIVEDASH_BACKEND_URL           Override the backend URL\n\
  FIVEDASH_CONFIG_HOME           Override the settings directory"
        .to_string()
}
