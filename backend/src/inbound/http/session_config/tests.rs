//! Unit tests for session settings.

use std::collections::HashMap;
use std::io::Write;

use mockable::MockEnv;
use rstest::{fixture, rstest};
use tempfile::NamedTempFile;

use super::*;

#[fixture]
fn long_key() -> NamedTempFile {
    key_file(SESSION_KEY_MIN_LEN)
}

fn key_file(len: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp key file");
    file.write_all(&vec![b'k'; len]).expect("write key");
    file
}

fn path_of(file: &NamedTempFile) -> String {
    file.path().to_string_lossy().into_owned()
}

fn env_with(vars: &[(&str, String)]) -> MockEnv {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(name, value)| ((*name).to_owned(), value.clone()))
        .collect();
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |name| vars.get(name).cloned());
    env
}

fn release_vars(key: &NamedTempFile) -> Vec<(&'static str, String)> {
    vec![
        (KEY_FILE_ENV, path_of(key)),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ]
}

fn without(vars: Vec<(&'static str, String)>, name: &str) -> Vec<(&'static str, String)> {
    vars.into_iter().filter(|(key, _)| *key != name).collect()
}

fn with(
    vars: Vec<(&'static str, String)>,
    name: &'static str,
    value: &str,
) -> Vec<(&'static str, String)> {
    let mut vars = without(vars, name);
    vars.push((name, value.to_owned()));
    vars
}

#[rstest]
fn release_accepts_complete_settings(long_key: NamedTempFile) {
    let env = env_with(&release_vars(&long_key));
    let settings =
        session_settings_from_env(&env, BuildMode::Release).expect("valid release settings");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
}

#[rstest]
#[case(COOKIE_SECURE_ENV)]
#[case(SAMESITE_ENV)]
#[case(ALLOW_EPHEMERAL_ENV)]
fn release_requires_every_toggle(long_key: NamedTempFile, #[case] name: &'static str) {
    let env = env_with(&without(release_vars(&long_key), name));
    let err = session_settings_from_env(&env, BuildMode::Release)
        .err()
        .expect("missing toggle rejected");
    assert!(matches!(err, SessionConfigError::MissingEnv { name: missing } if missing == name));
}

#[rstest]
#[case(COOKIE_SECURE_ENV, "maybe")]
#[case(ALLOW_EPHEMERAL_ENV, "")]
#[case(SAMESITE_ENV, "sideways")]
fn release_rejects_malformed_toggles(
    long_key: NamedTempFile,
    #[case] name: &'static str,
    #[case] value: &str,
) {
    let env = env_with(&with(release_vars(&long_key), name, value));
    let err = session_settings_from_env(&env, BuildMode::Release)
        .err()
        .expect("malformed toggle rejected");
    assert!(matches!(err, SessionConfigError::InvalidEnv { name: bad, .. } if bad == name));
}

#[rstest]
fn release_rejects_ephemeral_keys(long_key: NamedTempFile) {
    let env = env_with(&with(release_vars(&long_key), ALLOW_EPHEMERAL_ENV, "1"));
    let err = session_settings_from_env(&env, BuildMode::Release)
        .err()
        .expect("ephemeral rejected");
    assert!(matches!(err, SessionConfigError::EphemeralNotAllowed));
}

#[rstest]
fn release_rejects_insecure_same_site_none(long_key: NamedTempFile) {
    let vars = with(release_vars(&long_key), COOKIE_SECURE_ENV, "0");
    let env = env_with(&with(vars, SAMESITE_ENV, "None"));
    let err = session_settings_from_env(&env, BuildMode::Release)
        .err()
        .expect("insecure None rejected");
    assert!(matches!(err, SessionConfigError::InsecureSameSiteNone));
}

#[rstest]
fn release_rejects_short_keys() {
    let short = key_file(SESSION_KEY_MIN_LEN - 1);
    let env = env_with(&release_vars(&short));
    let err = session_settings_from_env(&env, BuildMode::Release)
        .err()
        .expect("short key rejected");
    assert!(matches!(
        err,
        SessionConfigError::KeyTooShort { length, .. } if length == SESSION_KEY_MIN_LEN - 1
    ));
}

#[rstest]
fn debug_replaces_short_keys_with_a_temporary_one() {
    let short = key_file(8);
    let env = env_with(&release_vars(&short));
    let first = session_settings_from_env(&env, BuildMode::Debug).expect("debug tolerates");
    let second = session_settings_from_env(&env, BuildMode::Debug).expect("debug tolerates");
    assert_ne!(first.key.master(), second.key.master());
}

#[rstest]
fn release_rejects_unreadable_key_file(long_key: NamedTempFile) {
    let env = env_with(&with(
        release_vars(&long_key),
        KEY_FILE_ENV,
        "/nonexistent/session_key",
    ));
    let err = session_settings_from_env(&env, BuildMode::Release)
        .err()
        .expect("unreadable key rejected");
    assert!(matches!(err, SessionConfigError::KeyRead { .. }));
}

#[rstest]
fn debug_falls_back_to_defaults() {
    let env = env_with(&[(KEY_FILE_ENV, "/nonexistent/session_key".to_owned())]);
    let settings =
        session_settings_from_env(&env, BuildMode::Debug).expect("debug tolerates gaps");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn debug_keeps_insecure_same_site_none(long_key: NamedTempFile) {
    let vars = with(release_vars(&long_key), COOKIE_SECURE_ENV, "no");
    let env = env_with(&with(vars, SAMESITE_ENV, "none"));
    let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug tolerates");
    assert!(!settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::None);
}

#[rstest]
fn same_key_file_derives_same_key(long_key: NamedTempFile) {
    let first = session_settings_from_env(&env_with(&release_vars(&long_key)), BuildMode::Release)
        .expect("first load");
    let second = session_settings_from_env(&env_with(&release_vars(&long_key)), BuildMode::Release)
        .expect("second load");
    assert_eq!(first.key.master(), second.key.master());
}

#[rstest]
fn reads_the_process_environment(long_key: NamedTempFile) {
    let _guard = env_lock::lock_env(
        release_vars(&long_key)
            .into_iter()
            .map(|(name, value)| (name, Some(value))),
    );

    let settings = session_settings_from_env(&mockable::DefaultEnv::new(), BuildMode::Release)
        .expect("settings from the process environment");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
}
