use std::time::Duration;

use dlnad::cli::Args;
use dlnad::config::{Config, FileConfig};

fn make_args(port: Option<u16>, name: Option<String>, interfaces: Vec<String>) -> Args {
    Args {
        port,
        name,
        interfaces,
        notify_interval: None,
        config: None,
    }
}

#[test]
fn test_defaults_when_nothing_set() {
    let args = make_args(None, None, vec![]);
    let config = Config::resolve(None, &args);
    assert_eq!(config.port, 8200);
    assert_eq!(config.notify_interval, Duration::from_secs(30));
    assert!(config.interfaces.is_empty());
    assert!(
        config.name == "dlnad" || config.name.starts_with("dlnad@"),
        "expected default name to be 'dlnad' or 'dlnad@<hostname>', got: {}",
        config.name
    );
}

#[test]
fn test_cli_flag_overrides_default() {
    let args = make_args(Some(9000), None, vec![]);
    let config = Config::resolve(None, &args);
    assert_eq!(config.port, 9000);
}

#[test]
fn test_toml_overrides_default() {
    let file = FileConfig { port: Some(7777), ..Default::default() };
    let args = make_args(None, None, vec![]);
    let config = Config::resolve(Some(file), &args);
    assert_eq!(config.port, 7777);
}

#[test]
fn test_cli_overrides_toml() {
    let file = FileConfig {
        port: Some(7777),
        name: Some("From File".to_string()),
        interfaces: Some(vec!["eth1".to_string()]),
        notify_interval: Some(60),
    };
    let mut args = make_args(Some(9000), Some("From CLI".to_string()), vec!["eth0".to_string()]);
    args.notify_interval = Some(10);
    let config = Config::resolve(Some(file), &args);
    assert_eq!(config.port, 9000); // CLI wins
    assert_eq!(config.name, "From CLI");
    assert_eq!(config.interfaces, vec!["eth0".to_string()]);
    assert_eq!(config.notify_interval, Duration::from_secs(10));
}

#[test]
fn test_toml_interfaces_used_when_cli_has_none() {
    let file = FileConfig {
        interfaces: Some(vec!["wlan0".to_string(), "eth0".to_string()]),
        ..Default::default()
    };
    let config = Config::resolve(Some(file), &make_args(None, None, vec![]));
    assert_eq!(config.interfaces, vec!["wlan0".to_string(), "eth0".to_string()]);
}

#[test]
fn test_zero_notify_interval_falls_back_to_default() {
    let file = FileConfig { notify_interval: Some(0), ..Default::default() };
    let config = Config::resolve(Some(file), &make_args(None, None, vec![]));
    assert_eq!(config.notify_interval, Duration::from_secs(30));
}

#[test]
fn test_huge_notify_interval_is_capped_at_one_day() {
    let mut args = make_args(None, None, vec![]);
    args.notify_interval = Some(u64::MAX);
    let config = Config::resolve(None, &args);
    assert_eq!(config.notify_interval, Duration::from_secs(86400));

    let file = FileConfig { notify_interval: Some(86400), ..Default::default() };
    let config = Config::resolve(Some(file), &make_args(None, None, vec![]));
    assert_eq!(config.notify_interval, Duration::from_secs(86400));
}

#[test]
fn test_toml_parse() {
    let toml_str = "port = 9000\nname = \"Living Room\"\ninterfaces = [\"eth0\"]\nnotify_interval = 45\n";
    let parsed: FileConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(parsed.port, Some(9000));
    assert_eq!(parsed.name.as_deref(), Some("Living Room"));
    assert_eq!(parsed.interfaces, Some(vec!["eth0".to_string()]));
    assert_eq!(parsed.notify_interval, Some(45));
}

#[test]
fn test_toml_unknown_fields_ignored() {
    // Future keys must not break parsing
    let toml_str = "port = 9000\nunknown_future_key = true\n";
    let parsed: Result<FileConfig, _> = toml::from_str(toml_str);
    assert!(parsed.is_ok());
}

#[test]
fn test_cli_repeated_interface_flag() {
    use clap::Parser;
    let args = Args::try_parse_from(["dlnad", "-i", "eth0", "--interface", "wlan0", "--notify-interval", "5"])
        .unwrap();
    assert_eq!(args.interfaces, vec!["eth0".to_string(), "wlan0".to_string()]);
    assert_eq!(args.notify_interval, Some(5));
}
