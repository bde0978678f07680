use std::path::PathBuf;

use clap::Parser;

use crate::constants::{DEFAULT_COMMAND, DEFAULT_PORT};

#[derive(Parser)]
#[command(
    name = "webui-tray",
    version = env!("CARGO_PKG_VERSION"),
    about = "Tray-side supervisor for a local Open WebUI service"
)]
pub struct Cli {
    /// port the service listens on
    #[arg(long, env = "WEBUI_TRAY_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// tray icon image, handed to the platform tray shell
    #[arg(long, env = "WEBUI_TRAY_ICON", default_value = "./icon.png")]
    pub icon: PathBuf,

    /// service executable, launched as `<command> serve --port <port>`
    #[arg(long, env = "WEBUI_TRAY_COMMAND", default_value = DEFAULT_COMMAND)]
    pub command: String,
}
