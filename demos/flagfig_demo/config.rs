//! Settings structs for the flagfig demo application.
//!
//! The root [`DemoConfig`] holds two nested structs, [`ServerConfig`] and
//! [`DisplayConfig`], to show how nesting shapes the derived names.
//!
//! | Field | Flag | Env var |
//! |-------|------|---------|
//! | `name` | `--name` | `FLAGFIG_DEMO_NAME` |
//! | `verbose` | `--verbose` | `FLAGFIG_DEMO_VERBOSE` |
//! | `server.host` | `--server-host` | `FLAGFIG_DEMO_SERVER_HOST` |
//! | `server.port` | `--server-port` | `FLAGFIG_DEMO_SERVER_PORT` |
//! | `server.max_connections` | `--server-max-connections` | `FLAGFIG_DEMO_SERVER_MAX_CONNECTIONS` |
//! | `server.allowed_origins` | `--server-allowed-origins` | `FLAGFIG_DEMO_SERVER_ALLOWED_ORIGINS` |
//! | `display.color` | `--display-color` | `FLAGFIG_DEMO_DISPLAY_COLOR` |
//! | `display.format` | `--display-format` | `FLAGFIG_DEMO_DISPLAY_FORMAT` |

use serde::{Deserialize, Serialize};

use flagfig::{Field, Schema, Settings};

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct DemoConfig {
    pub name: String,
    pub verbose: bool,
    pub server: ServerConfig,
    pub display: DisplayConfig,
}

impl Settings for DemoConfig {
    fn schema() -> Schema {
        Schema::new()
            .field(
                Field::new::<String>("name")
                    .default("flagfig-demo")
                    .description("Application name shown in the echo banner"),
            )
            .field(Field::new::<bool>("verbose").description("Enable verbose output"))
            .field(Field::nested::<ServerConfig>("server"))
            .field(Field::nested::<DisplayConfig>("display"))
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ServerConfig {
    pub host: String,
    pub port: i32,
    pub max_connections: i64,
    pub allowed_origins: Vec<String>,
}

impl Settings for ServerConfig {
    fn schema() -> Schema {
        Schema::new()
            .field(
                Field::new::<String>("host")
                    .default("127.0.0.1")
                    .description("Hostname to bind to"),
            )
            .field(
                Field::new::<i32>("port")
                    .required()
                    .description("Port to listen on"),
            )
            .field(Field::new::<i64>("max_connections").default("100"))
            .field(
                Field::new::<Vec<String>>("allowed_origins")
                    .description("Comma-separated CORS origins"),
            )
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct DisplayConfig {
    pub color: String,
    pub format: String,
}

impl Settings for DisplayConfig {
    fn schema() -> Schema {
        Schema::new()
            .field(
                Field::new::<String>("color")
                    .default("yellow")
                    .description("Output color (red, green, yellow, blue, magenta, cyan)"),
            )
            .field(
                Field::new::<String>("format")
                    .default("table")
                    .description("Output format: \"table\" or \"plain\""),
            )
    }
}
