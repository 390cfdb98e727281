use super::*;
use clap::CommandFactory;
use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_guard() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

#[test]
fn cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn parses_login_flags() {
    let cli = Cli::try_parse_from(["trainerhub", "login", "--email", "a@b.com", "--password", "pw"]).unwrap();
    match cli.command {
        Command::Login { email, password } => {
            assert_eq!(email, "a@b.com");
            assert_eq!(password, "pw");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_profile_update_partial_fields() {
    let cli = Cli::try_parse_from(["trainerhub", "profile", "update", "--phone", "555-0100"]).unwrap();
    match cli.command {
        Command::Profile(ProfileCommand { command: ProfileSubcommand::Update { name, email, phone } }) => {
            assert_eq!(name, None);
            assert_eq!(email, None);
            assert_eq!(phone.as_deref(), Some("555-0100"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn resolve_config_applies_flag_overrides() {
    let _guard = env_guard();
    let cli = Cli::try_parse_from([
        "trainerhub",
        "--api-url",
        "https://gym.example.test/",
        "--session-file",
        "/tmp/flag-session.json",
        "route",
    ])
    .unwrap();

    let config = resolve_config(&cli).unwrap();
    assert_eq!(config.api_url, "https://gym.example.test");
    assert_eq!(config.session_file, PathBuf::from("/tmp/flag-session.json"));
}

#[test]
fn resolve_config_rejects_bad_flag_url() {
    let _guard = env_guard();
    let cli = Cli::try_parse_from([
        "trainerhub",
        "--api-url",
        "ftp://nope",
        "--session-file",
        "/tmp/flag-session.json",
        "route",
    ])
    .unwrap();
    assert!(matches!(resolve_config(&cli), Err(ConfigError::InvalidApiUrl(_))));
}

#[test]
fn resolve_config_flags_win_over_bad_env() {
    let _guard = env_guard();
    unsafe { std::env::set_var("TRAINERHUB_API_URL", "ftp://bad.example") };

    let cli = Cli::try_parse_from([
        "trainerhub",
        "--api-url",
        "https://gym.example.test",
        "--session-file",
        "/tmp/flag-session.json",
        "route",
    ])
    .unwrap();
    let resolved = resolve_config(&cli);

    unsafe { std::env::remove_var("TRAINERHUB_API_URL") };

    let config = resolved.unwrap();
    assert_eq!(config.api_url, "https://gym.example.test");
    assert_eq!(config.session_file, PathBuf::from("/tmp/flag-session.json"));
}

#[test]
fn role_label_follows_gate() {
    let admin = UserRecord { is_admin: true, is_personal: true, ..UserRecord::default() };
    let coach = UserRecord { is_personal: true, ..UserRecord::default() };
    assert_eq!(role_label(&admin), "admin");
    assert_eq!(role_label(&coach), "personal");
    assert_eq!(role_label(&UserRecord::default()), "client");
}
