use course_portal::config::{AppConfig, Env};
use serial_test::serial;

// These tests mutate process-wide environment variables, so they are serialized.
// `set_var`/`remove_var` are unsafe in edition 2024 because of that same
// process-wide effect; the #[serial] guard is what makes the calls sound here.

fn clear_env() {
    for key in [
        "APP_ENV",
        "DATABASE_URL",
        "ACCESS_TOKEN_SECRET",
        "PAYMENT_API_BASE",
        "PAYMENT_SECRET_KEY",
    ] {
        unsafe { std::env::remove_var(key) };
    }
}

#[test]
#[serial]
fn test_load_local_defaults() {
    clear_env();
    unsafe {
        std::env::set_var("DATABASE_URL", "postgres://u:p@localhost:5432/portal");
    }

    let config = AppConfig::load();

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.db_url, "postgres://u:p@localhost:5432/portal");
    // Local falls back to the development secret and the real provider base.
    assert_eq!(config.payment_api_base, "https://api.stripe.com");
    assert!(!config.jwt_secret.is_empty());

    clear_env();
}

#[test]
#[serial]
fn test_load_production_reads_all_secrets() {
    clear_env();
    unsafe {
        std::env::set_var("APP_ENV", "production");
        std::env::set_var("DATABASE_URL", "postgres://u:p@db.internal:5432/portal");
        std::env::set_var("ACCESS_TOKEN_SECRET", "prod-token-secret");
        std::env::set_var("PAYMENT_SECRET_KEY", "sk_live_abc");
        std::env::set_var("PAYMENT_API_BASE", "https://payments.internal");
    }

    let config = AppConfig::load();

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.jwt_secret, "prod-token-secret");
    assert_eq!(config.payment_secret_key, "sk_live_abc");
    assert_eq!(config.payment_api_base, "https://payments.internal");

    clear_env();
}

#[test]
#[serial]
fn test_default_is_non_panicking_test_scaffolding() {
    clear_env();

    // Default must never read the environment, so it works with nothing set.
    let config = AppConfig::default();
    assert_eq!(config.env, Env::Local);
    assert!(!config.jwt_secret.is_empty());
    assert!(!config.db_url.is_empty());
}
