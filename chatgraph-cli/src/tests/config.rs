//! Unit tests for [`RunConfig`](crate::config::RunConfig) and [`RunOptions`](crate::config::RunOptions).
//!
//! Tests that touch the environment share a static lock so they do not run in parallel
//! and overwrite each other's variables.

use std::sync::Mutex;

use chatgraph::ToolChoiceMode;

use crate::config::{RunConfig, RunOptions, DEFAULT_DB_PATH};

static ENV_LOCK: std::sync::OnceLock<Mutex<()>> = std::sync::OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

/// Runs `f` with the given variables set (Some) or removed (None), restoring them afterwards.
fn with_env<T>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> T) -> T {
    let _guard = env_lock();
    let saved: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|(k, _)| (k.to_string(), std::env::var(k).ok()))
        .collect();
    for (k, v) in vars {
        match v {
            Some(v) => std::env::set_var(k, v),
            None => std::env::remove_var(k),
        }
    }
    let out = f();
    for (k, v) in saved {
        match v {
            Some(v) => std::env::set_var(&k, v),
            None => std::env::remove_var(&k),
        }
    }
    out
}

const ALL_VARS: [&str; 8] = [
    "OPENAI_API_BASE",
    "OPENAI_MODEL",
    "OPENAI_TEMPERATURE",
    "OPENAI_TOOL_CHOICE",
    "DB_PATH",
    "THREAD_ID",
    "SYSTEM_PROMPT",
    "RECURSION_LIMIT",
];

fn cleared(extra: &[(&'static str, Option<&'static str>)]) -> Vec<(&'static str, Option<&'static str>)> {
    let mut vars: Vec<(&str, Option<&str>)> = ALL_VARS.iter().map(|k| (*k, None)).collect();
    vars.extend_from_slice(extra);
    vars
}

/// **Scenario**: When OPENAI_API_KEY is not set, from_env returns an error naming it.
#[test]
fn from_env_fails_when_api_key_is_missing() {
    let result = with_env(&[("OPENAI_API_KEY", None)], RunConfig::from_env);
    let err = result.unwrap_err().to_string();
    assert!(err.contains("OPENAI_API_KEY"), "unexpected error: {}", err);
}

/// **Scenario**: With only the key set, defaults apply and no thread is configured.
#[test]
fn from_env_uses_defaults() {
    let config = with_env(&cleared(&[("OPENAI_API_KEY", Some("sk-test"))]), RunConfig::from_env)
        .unwrap();
    assert_eq!(config.api_key, "sk-test");
    assert_eq!(config.api_base, "https://api.openai.com/v1");
    assert_eq!(config.model, "gpt-4o-mini");
    assert_eq!(config.db_path, DEFAULT_DB_PATH);
    assert!(config.thread_id.is_none());
    assert!(config.recursion_limit.is_none());
    assert!(!config.stream);
}

/// **Scenario**: Optional variables are read; a bad RECURSION_LIMIT is an error.
#[test]
fn from_env_reads_optional_vars() {
    let config = with_env(
        &cleared(&[
            ("OPENAI_API_KEY", Some("k")),
            ("OPENAI_TEMPERATURE", Some("0.2")),
            ("OPENAI_TOOL_CHOICE", Some("required")),
            ("THREAD_ID", Some("t-9")),
            ("DB_PATH", Some("/tmp/x.db")),
            ("SYSTEM_PROMPT", Some("be terse")),
            ("RECURSION_LIMIT", Some("7")),
        ]),
        RunConfig::from_env,
    )
    .unwrap();
    assert_eq!(config.temperature, Some(0.2));
    assert_eq!(config.tool_choice, Some(ToolChoiceMode::Required));
    assert_eq!(config.thread_id.as_deref(), Some("t-9"));
    assert_eq!(config.db_path, "/tmp/x.db");
    assert_eq!(config.system_prompt.as_deref(), Some("be terse"));
    assert_eq!(config.recursion_limit, Some(7));

    let result = with_env(
        &cleared(&[("OPENAI_API_KEY", Some("k")), ("RECURSION_LIMIT", Some("many"))]),
        RunConfig::from_env,
    );
    assert!(result.is_err());
}

/// **Scenario**: Only set options override; runnable_config carries thread and limit.
#[test]
fn apply_options_overrides_set_fields() {
    let mut config = with_env(&cleared(&[("OPENAI_API_KEY", Some("k"))]), RunConfig::from_env)
        .unwrap();
    config.system_prompt = Some("from env".into());

    config.apply_options(&RunOptions {
        thread_id: Some("cli-thread".into()),
        db_path: Some("chat.db".into()),
        recursion_limit: Some(3),
        stream: true,
        ..Default::default()
    });
    assert_eq!(config.thread_id.as_deref(), Some("cli-thread"));
    assert_eq!(config.db_path, "chat.db");
    assert_eq!(config.system_prompt.as_deref(), Some("from env"));
    assert!(config.stream);

    let runnable = config.runnable_config();
    assert_eq!(runnable.thread_id.as_deref(), Some("cli-thread"));
    assert_eq!(runnable.effective_recursion_limit(), 3);
}
