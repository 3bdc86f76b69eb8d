use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(
    name = "dlnad",
    about = "DLNA/UPnP MediaServer: SSDP discovery, device descriptions and SOAP control",
    long_about = None,
    version = env!("DLNAD_VERSION"),
)]
pub struct Args {
    /// HTTP port to listen on [default: 8200]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Friendly server name shown on DLNA client device lists [default: dlnad@<hostname>]
    #[arg(short, long)]
    pub name: Option<String>,

    /// Network interface to run SSDP on; repeat for several [default: every usable interface]
    #[arg(short, long = "interface", value_name = "IFACE")]
    pub interfaces: Vec<String>,

    /// Seconds between SSDP alive announcements [default: 30]
    #[arg(long, value_name = "SECS")]
    pub notify_interval: Option<u64>,

    /// Path to TOML config file (overrides default search: ./dlnad.toml, ~/.config/dlnad/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
