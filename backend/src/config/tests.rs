//! Environment parsing for [`AppConfig`].

use std::collections::HashMap;

use mockable::MockEnv;
use rstest::{fixture, rstest};

use super::*;

fn env_with(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |name| vars.get(name).cloned());
    env
}

#[fixture]
fn complete() -> HashMap<&'static str, String> {
    HashMap::from([
        (CORS_ORIGIN_ENV, "https://bakery.example".to_owned()),
        (SESSION_SECRET_ENV, "k".repeat(SESSION_SECRET_MIN_LEN)),
        (DATABASE_URL_ENV, "postgres://db/bakery".to_owned()),
        (SQUARE_ACCESS_TOKEN_ENV, "sq-token".to_owned()),
        (SQUARE_LOCATION_ID_ENV, "LOC1".to_owned()),
        (APP_ENV_ENV, "development".to_owned()),
    ])
}

#[rstest]
fn complete_environment_loads(complete: HashMap<&'static str, String>) {
    let config = app_config_from_env(&env_with(complete)).expect("config");
    assert_eq!(config.mode(), RuntimeMode::Development);
    assert_eq!(config.cors_origin(), "https://bakery.example");
    assert_eq!(config.database_url(), "postgres://db/bakery");
    let payments = config.payments().expect("payments");
    assert_eq!(payments.access_token(), "sq-token");
    assert_eq!(payments.location_id(), "LOC1");
}

#[rstest]
#[case(CORS_ORIGIN_ENV)]
#[case(SESSION_SECRET_ENV)]
#[case(DATABASE_URL_ENV)]
fn required_variables_are_fatal(
    mut complete: HashMap<&'static str, String>,
    #[case] name: &'static str,
) {
    complete.remove(name);
    let err = app_config_from_env(&env_with(complete)).expect_err("missing");
    assert_eq!(err, ConfigError::MissingEnv { name });
}

#[rstest]
fn blank_values_count_as_missing(mut complete: HashMap<&'static str, String>) {
    complete.insert(DATABASE_URL_ENV, "   ".to_owned());
    let err = app_config_from_env(&env_with(complete)).expect_err("blank");
    assert_eq!(
        err,
        ConfigError::MissingEnv {
            name: DATABASE_URL_ENV
        }
    );
}

#[rstest]
#[case(SQUARE_ACCESS_TOKEN_ENV)]
#[case(SQUARE_LOCATION_ID_ENV)]
fn payment_variables_are_optional(
    mut complete: HashMap<&'static str, String>,
    #[case] name: &'static str,
) {
    complete.remove(name);
    let config = app_config_from_env(&env_with(complete)).expect("still loads");
    assert!(config.payments().is_none());
}

#[rstest]
fn short_secrets_are_rejected(mut complete: HashMap<&'static str, String>) {
    complete.insert(SESSION_SECRET_ENV, "short".to_owned());
    let err = app_config_from_env(&env_with(complete)).expect_err("short");
    assert_eq!(
        err,
        ConfigError::SecretTooShort {
            length: 5,
            min_len: SESSION_SECRET_MIN_LEN
        }
    );
}

#[rstest]
#[case("*")]
#[case("bakery.example")]
fn origins_must_be_http_urls(mut complete: HashMap<&'static str, String>, #[case] origin: &str) {
    complete.insert(CORS_ORIGIN_ENV, origin.to_owned());
    let err = app_config_from_env(&env_with(complete)).expect_err("bad origin");
    assert!(matches!(
        err,
        ConfigError::InvalidEnv {
            name: CORS_ORIGIN_ENV,
            ..
        }
    ));
}

#[rstest]
#[case(None, Ok(RuntimeMode::Production))]
#[case(Some("production"), Ok(RuntimeMode::Production))]
#[case(Some("Development"), Ok(RuntimeMode::Development))]
#[case(Some("staging"), Err(()))]
fn app_env_selects_the_mode(
    mut complete: HashMap<&'static str, String>,
    #[case] value: Option<&str>,
    #[case] expected: Result<RuntimeMode, ()>,
) {
    match value {
        Some(value) => complete.insert(APP_ENV_ENV, value.to_owned()),
        None => complete.remove(APP_ENV_ENV),
    };
    let outcome = app_config_from_env(&env_with(complete))
        .map(|config| config.mode())
        .map_err(|_| ());
    assert_eq!(outcome, expected);
}

#[rstest]
fn debug_output_redacts_secrets(complete: HashMap<&'static str, String>) {
    let config = app_config_from_env(&env_with(complete)).expect("config");
    let printed = format!("{config:?}");
    assert!(!printed.contains("postgres://"));
    assert!(!printed.contains("sq-token"));
    assert!(!printed.contains(&"k".repeat(SESSION_SECRET_MIN_LEN)));
}
