//! Unit tests for session configuration loading.

use super::*;
use mockable::MockEnv;
use rstest::{fixture, rstest};
use std::collections::HashMap;
use tempfile::NamedTempFile;

fn key_file(len: usize) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temporary key file");
    std::fs::write(file.path(), vec![b'a'; len]).expect("write key bytes");
    file
}

#[fixture]
fn valid_key() -> NamedTempFile {
    key_file(SESSION_KEY_MIN_LEN)
}

fn path_of(file: &NamedTempFile) -> String {
    file.path().to_string_lossy().into_owned()
}

fn env_from(vars: &[(&str, &str)]) -> MockEnv {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
        .collect();
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |name| vars.get(name).cloned());
    env
}

fn release_env(key_path: &str, overrides: &[(&str, &str)]) -> MockEnv {
    let mut vars = vec![
        (KEY_FILE_ENV, key_path),
        (COOKIE_SECURE_ENV, "1"),
        (SAMESITE_ENV, "Strict"),
        (ALLOW_EPHEMERAL_ENV, "0"),
    ];
    for (name, value) in overrides {
        vars.retain(|(existing, _)| existing != name);
        vars.push((name, value));
    }
    env_from(&vars)
}

fn load_err(env: &MockEnv, mode: BuildMode) -> SessionConfigError {
    match session_settings_from_env(env, mode) {
        Ok(_) => panic!("expected session configuration to be rejected"),
        Err(error) => error,
    }
}

#[rstest]
fn release_requires_cookie_secure() {
    let err = load_err(&env_from(&[]), BuildMode::Release);
    assert!(matches!(
        err,
        SessionConfigError::MissingEnv {
            name: COOKIE_SECURE_ENV
        }
    ));
}

#[rstest]
#[case("maybe")]
#[case("")]
fn release_rejects_malformed_cookie_secure(valid_key: NamedTempFile, #[case] value: &str) {
    let env = release_env(&path_of(&valid_key), &[(COOKIE_SECURE_ENV, value)]);
    let err = load_err(&env, BuildMode::Release);
    assert!(matches!(
        err,
        SessionConfigError::InvalidEnv {
            name: COOKIE_SECURE_ENV,
            ..
        }
    ));
}

#[rstest]
fn release_requires_same_site(valid_key: NamedTempFile) {
    let path = path_of(&valid_key);
    let env = env_from(&[
        (KEY_FILE_ENV, path.as_str()),
        (COOKIE_SECURE_ENV, "1"),
        (ALLOW_EPHEMERAL_ENV, "0"),
    ]);
    let err = load_err(&env, BuildMode::Release);
    assert!(matches!(
        err,
        SessionConfigError::MissingEnv { name: SAMESITE_ENV }
    ));
}

#[rstest]
fn release_requires_allow_ephemeral(valid_key: NamedTempFile) {
    let path = path_of(&valid_key);
    let env = env_from(&[
        (KEY_FILE_ENV, path.as_str()),
        (COOKIE_SECURE_ENV, "1"),
        (SAMESITE_ENV, "Strict"),
    ]);
    let err = load_err(&env, BuildMode::Release);
    assert!(matches!(
        err,
        SessionConfigError::MissingEnv {
            name: ALLOW_EPHEMERAL_ENV
        }
    ));
}

#[rstest]
fn release_refuses_ephemeral_keys(valid_key: NamedTempFile) {
    let env = release_env(&path_of(&valid_key), &[(ALLOW_EPHEMERAL_ENV, "yes")]);
    let err = load_err(&env, BuildMode::Release);
    assert!(matches!(err, SessionConfigError::EphemeralNotAllowed));
}

#[rstest]
fn release_requires_readable_key_file() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let missing = dir.path().join("absent-key");
    let env = release_env(&missing.to_string_lossy(), &[]);
    let err = load_err(&env, BuildMode::Release);
    assert!(matches!(err, SessionConfigError::KeyRead { .. }));
}

#[rstest]
fn release_rejects_short_keys() {
    let short = key_file(32);
    let err = load_err(&release_env(&path_of(&short), &[]), BuildMode::Release);
    assert!(matches!(
        err,
        SessionConfigError::KeyTooShort { length: 32, .. }
    ));
}

#[rstest]
fn release_rejects_same_site_none_without_secure_cookie(valid_key: NamedTempFile) {
    let env = release_env(
        &path_of(&valid_key),
        &[(COOKIE_SECURE_ENV, "0"), (SAMESITE_ENV, "None")],
    );
    let err = load_err(&env, BuildMode::Release);
    assert!(matches!(err, SessionConfigError::InsecureSameSiteNone));
}

#[rstest]
fn release_accepts_complete_configuration(valid_key: NamedTempFile) {
    let env = release_env(&path_of(&valid_key), &[]);
    let settings =
        session_settings_from_env(&env, BuildMode::Release).expect("valid settings load");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
}

#[rstest]
fn same_key_file_yields_stable_fingerprint(valid_key: NamedTempFile) {
    let env = release_env(&path_of(&valid_key), &[]);
    let first = session_settings_from_env(&env, BuildMode::Release).expect("first load");
    let second = session_settings_from_env(&env, BuildMode::Release).expect("second load");
    assert_eq!(first.key_fingerprint(), second.key_fingerprint());
}

#[rstest]
fn debug_defaults_fill_missing_toggles() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let missing = dir.path().join("absent-key");
    let missing = missing.to_string_lossy().into_owned();
    let env = env_from(&[(KEY_FILE_ENV, missing.as_str())]);
    let settings =
        session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults succeed");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
#[case("unexpected")]
#[case("sideways")]
fn debug_falls_back_to_lax_for_unknown_same_site(valid_key: NamedTempFile, #[case] value: &str) {
    let env = release_env(&path_of(&valid_key), &[(SAMESITE_ENV, value)]);
    let settings =
        session_settings_from_env(&env, BuildMode::Debug).expect("debug falls back to defaults");
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
#[case("TRUE", Some(true))]
#[case(" y ", Some(true))]
#[case("No", Some(false))]
#[case("0", Some(false))]
#[case("2", None)]
fn parse_bool_accepts_common_spellings(#[case] raw: &str, #[case] expected: Option<bool>) {
    assert_eq!(parse_bool(raw), expected);
}
