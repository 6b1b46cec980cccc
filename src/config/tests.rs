use super::*;
use std::io::Write;

fn defaults_only() -> Figment {
    Figment::new().merge(Toml::string(DEFAULT_CONFIG))
}

#[test]
fn test_embedded_defaults() {
    let config = AppConfig::from_figment(defaults_only()).expect("defaults load");

    assert_eq!(config.github.hostname, "github.com");
    assert_eq!(config.github.page_size, 100);
    assert_eq!(config.github.token, None);
    assert_eq!(config.repositories.on_missing, MissingRepoPolicy::Skip);
}

#[test]
fn test_later_layers_win() {
    let figment = defaults_only()
        .merge(Toml::string(
            "[github]\nhostname = \"ghe.example.com\"\npage_size = 50\n",
        ))
        .merge(Serialized::default("github.page_size", 25));

    let config = AppConfig::from_figment(figment).unwrap();

    assert_eq!(config.github.hostname, "ghe.example.com");
    assert_eq!(config.github.page_size, 25);
    assert_eq!(config.github.user_agent, "gh-environments");
}

#[test]
fn test_page_size_out_of_range_is_rejected() {
    for size in [0u32, 101] {
        let figment = defaults_only().merge(Serialized::default("github.page_size", size));
        assert!(
            matches!(AppConfig::from_figment(figment), Err(Error::Config(_))),
            "page_size {size} accepted"
        );
    }
}

#[test]
fn test_empty_hostname_is_rejected() {
    let figment = defaults_only().merge(Serialized::default("github.hostname", " "));
    assert!(matches!(
        AppConfig::from_figment(figment),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_unknown_policy_is_rejected() {
    let figment =
        defaults_only().merge(Serialized::default("repositories.on_missing", "explode"));
    assert!(AppConfig::from_figment(figment).is_err());
}

#[test]
fn test_custom_file_and_overrides() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    writeln!(
        file,
        "[github]\nhostname = \"from-file.example.com\"\n\n[repositories]\non_missing = \"abort\""
    )
    .unwrap();

    let from_file = AppConfig::load(Some(file.path()), &Overrides::default()).unwrap();
    assert_eq!(from_file.github.hostname, "from-file.example.com");
    assert_eq!(from_file.repositories.on_missing, MissingRepoPolicy::Abort);

    let overrides = Overrides {
        hostname: Some("flag.example.com".to_string()),
        on_missing: Some(MissingRepoPolicy::Skip),
    };
    let overridden = AppConfig::load(Some(file.path()), &overrides).unwrap();
    assert_eq!(overridden.github.hostname, "flag.example.com");
    assert_eq!(overridden.repositories.on_missing, MissingRepoPolicy::Skip);
}

#[test]
fn test_custom_json_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .unwrap();
    write!(file, r#"{{"github": {{"page_size": 10}}}}"#).unwrap();

    let config = AppConfig::load(Some(file.path()), &Overrides::default()).unwrap();
    assert_eq!(config.github.page_size, 10);
}

#[test]
fn test_missing_custom_file_is_an_error() {
    let result = AppConfig::load(
        Some(Path::new("/definitely/not/here.toml")),
        &Overrides::default(),
    );
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_default_struct_is_valid() {
    assert!(AppConfig::default().validate().is_ok());
}
