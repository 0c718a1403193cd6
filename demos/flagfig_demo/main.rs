//! # flagfig demo application
//!
//! A sample CLI tool that prints its resolved settings. It exists to
//! demonstrate and manually verify flagfig's precedence rules.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example flagfig_demo -- --server-port 8080
//! ```
//!
//! | Feature | How to exercise it |
//! |---------|--------------------|
//! | Declared defaults | `cargo run --example flagfig_demo -- --server-port 1` |
//! | Required field | `cargo run --example flagfig_demo` fails naming `server-port` |
//! | Config file | `cargo run --example flagfig_demo -- --config demo.toml` |
//! | Config path from env | `FLAGFIG_DEMO_CONFIG=demo.json cargo run --example flagfig_demo` |
//! | Env beats flag | `FLAGFIG_DEMO_DISPLAY_COLOR=red cargo run --example flagfig_demo -- --server-port 1 --display-color blue` |
//! | String lists | `cargo run --example flagfig_demo -- --server-port 1 --server-allowed-origins a.com,b.com` |
//! | Help | `cargo run --example flagfig_demo -- --help` |
//! | Resolution trace | `RUST_LOG=flagfig=debug cargo run --example flagfig_demo -- --server-port 1` |

mod config;

use flagfig::{Flagfig, FlagfigError};

use config::DemoConfig;

fn ansi_color_code(name: &str) -> &str {
    match name {
        "red" => "\x1b[31m",
        "green" => "\x1b[32m",
        "yellow" => "\x1b[33m",
        "blue" => "\x1b[34m",
        "magenta" => "\x1b[35m",
        "cyan" => "\x1b[36m",
        "white" => "\x1b[37m",
        _ => "\x1b[0m",
    }
}

const RESET: &str = "\x1b[0m";

fn echo_all(config: &DemoConfig, positional: &[String]) {
    let color = ansi_color_code(&config.display.color);

    if config.verbose {
        println!("{color}[verbose] Resolved settings for {:?}{RESET}", config.name);
        if !positional.is_empty() {
            println!("{color}[verbose] Arguments: {}{RESET}", positional.join(" "));
        }
        println!();
    }

    let entries = [
        ("name", config.name.clone()),
        ("verbose", config.verbose.to_string()),
        ("server.host", config.server.host.clone()),
        ("server.port", config.server.port.to_string()),
        ("server.max_connections", config.server.max_connections.to_string()),
        ("server.allowed_origins", config.server.allowed_origins.join(",")),
        ("display.color", config.display.color.clone()),
        ("display.format", config.display.format.clone()),
    ];

    if config.display.format == "plain" {
        for (key, value) in &entries {
            println!("{key}={value}");
        }
    } else {
        let max_key_len = entries.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in &entries {
            println!("{color}{key:<max_key_len$}{RESET}  {value}");
        }
    }
}

fn main() {
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(rust_log)
        .with_writer(std::io::stderr)
        .init();

    let mut binder = Flagfig::builder::<DemoConfig>()
        .name("flagfig-demo")
        .about("flagfig demo: print settings resolved from flags, env and a config file")
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Failed to set up flags:\n{e}");
            std::process::exit(1);
        });

    let mut config = DemoConfig::default();
    match binder.parse(&mut config) {
        Ok(()) => echo_all(&config, binder.positional()),
        Err(FlagfigError::Cli(e)) => e.exit(),
        Err(e) => {
            eprintln!("Failed to load settings:\n{e}");
            std::process::exit(1);
        }
    }
}
