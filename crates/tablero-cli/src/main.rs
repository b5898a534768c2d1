// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use runtime::ServiceRuntime;
use std::env;
use std::path::PathBuf;
use tablero_app::{DashboardEngine, Role};
use tablero_data::DataService;
use tablero_db::{PersistedState, Store};

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `tablero --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or TABLERO_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;

    if options.reset {
        store.clear_state()?;
        println!("persisted dashboards cleared; next launch reseeds");
        return Ok(());
    }

    let role = options.role_override.unwrap_or_else(|| config.role());
    let service = if options.demo {
        DataService::instant()
    } else {
        DataService::new(
            config.data_latency(),
            config.data_jitter(),
            config.data_error_rate(),
        )
    };

    let mut engine = DashboardEngine::new();
    if options.demo {
        let demo = tablero_testkit::demo_collection(42);
        let first = demo.first().map(|dashboard| dashboard.id.clone());
        engine.restore(demo, first);
    } else if let Some(state) = store.load_state()? {
        engine.restore(state.dashboards, state.active_dashboard_id);
    } else {
        engine.set_initial_state();
        store
            .save_state(&PersistedState {
                dashboards: engine.dashboards().clone(),
                active_dashboard_id: engine.active_dashboard_id().cloned(),
            })
            .context("persist seeded dashboards")?;
    }

    if options.check_only {
        return Ok(());
    }

    let mut runtime = ServiceRuntime::new(&store, service);
    tablero_tui::run_app(role, &mut engine, &mut runtime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    print_example: bool,
    demo: bool,
    check_only: bool,
    reset: bool,
    role_override: Option<Role>,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        print_example: false,
        demo: false,
        check_only: false,
        reset: false,
        role_override: None,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--role" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--role requires editor or viewer"))?;
                let role = Role::parse(value.as_ref()).ok_or_else(|| {
                    anyhow::anyhow!("unknown role {:?}; use editor or viewer", value.as_ref())
                })?;
                options.role_override = Some(role);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--reset" => {
                options.reset = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("tablero");
    println!("  --config <path>          Use a specific config path");
    println!("  --role <editor|viewer>   Override the session role for this run");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch with seeded demo dashboards (in-memory)");
    println!("  --check                  Validate config + DB + startup dependencies");
    println!("  --reset                  Clear persisted dashboards and exit");
    println!("  --help                   Show this help");
}
