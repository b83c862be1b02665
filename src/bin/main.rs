use std::{error::Error, path::Path, process};

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use initconf::{
    cli::{Cli, Commands, parse_args},
    diagnostics::{Report, Verdict},
    editor,
    integrity::NonInteractive,
    reload::ConfigManager,
    service::{Direction, ServiceDescriptor},
    table::Model,
};

fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args();
    init_logging(&args);

    match args.command {
        Commands::Check => {
            let mut manager = ConfigManager::new(&args.config);
            let report = manager.load(&mut NonInteractive)?;
            for diagnostic in &report.diagnostics {
                println!("{diagnostic}");
            }
            println!("verdict: {}", report.verdict);
            if report.verdict == Verdict::Fatal {
                process::exit(1);
            }
        }
        Commands::List {
            runlevel,
            stop,
            json,
        } => {
            let model = load_model(&args.config)?;
            let runlevel = runlevel.unwrap_or_else(|| model.runlevel().to_string());
            let direction = if stop {
                Direction::Stop
            } else {
                Direction::Start
            };
            let services = model.ordered(&runlevel, direction);

            if json {
                println!("{}", serde_json::to_string_pretty(&services)?);
            } else {
                for service in services {
                    println!(
                        "{:>5}  {:<24} {}",
                        service.priority(direction),
                        service.id,
                        service.description
                    );
                }
            }
        }
        Commands::Show { id, json } => {
            let model = load_model(&args.config)?;
            let Some(service) = model.lookup(&id) else {
                return Err(format!("Service '{id}' not found in configuration").into());
            };

            if json {
                println!("{}", serde_json::to_string_pretty(service)?);
            } else {
                print_service(service, &model);
            }
        }
        Commands::Set {
            id,
            attribute,
            value,
        } => {
            editor::edit_attribute(&args.config, &id, attribute, &value)?;
            println!("{id}: {} = {value}", attribute.keyword());
        }
    }

    Ok(())
}

fn init_logging(args: &Cli) {
    let filter = if let Some(level) = args.log_level {
        EnvFilter::new(level.as_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Loads the configuration, exiting with status 1 when it is rejected.
fn load_model(path: &Path) -> Result<Model, Box<dyn Error>> {
    let mut manager = ConfigManager::new(path);
    let report = manager.load(&mut NonInteractive)?;
    match manager.model() {
        Some(model) => {
            info!(services = model.services.len(), verdict = %report.verdict, "configuration loaded");
            Ok(model.clone())
        }
        None => {
            reject(&report);
            process::exit(1);
        }
    }
}

fn reject(report: &Report) {
    for diagnostic in &report.diagnostics {
        eprintln!("{diagnostic}");
    }
    error!("configuration rejected with verdict {}", report.verdict);
}

fn print_service(service: &ServiceDescriptor, model: &Model) {
    let runlevel = model.runlevel();
    println!("id:             {}", service.id);
    println!("description:    {}", service.description);
    println!("enabled:        {}", service.enabled.as_ref());
    println!("start command:  {}", service.start_command);
    println!("stop mode:      {}", service.stop_mode.as_ref());
    if let Some(pid_file) = &service.pid_file {
        println!("pid file:       {pid_file}");
    }
    if !service.stop_command.is_empty() {
        println!("stop command:   {}", service.stop_command);
    }
    if !service.reload_command.is_empty() {
        println!("reload command: {}", service.reload_command);
    }
    println!(
        "priority:       start {} / stop {}",
        service.start_priority, service.stop_priority
    );
    println!("signal:         {}", service.termination_signal);
    println!("runlevels:      {}", service.runlevels.join(" "));
    println!("member of {runlevel}: {}", model.is_member(service, runlevel));
}
