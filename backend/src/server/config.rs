//! Application settings and the assembled server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use backend::inbound::http::session_config::SessionSettings;
use backend::outbound::model_store::LoadedModel;
use backend::outbound::persistence::DbPool;
use calorie_model::ArtifactPaths;
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_MODEL_PATH: &str = "model.json";
const DEFAULT_ACCURACY_PATH: &str = "model_accuracy.txt";

/// Settings read from `CALORIES_*` variables, CLI flags and config files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CALORIES")]
pub struct AppSettings {
    /// PostgreSQL connection string; in-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Interface to listen on.
    pub bind_host: Option<IpAddr>,
    /// Port to listen on.
    #[ortho_config(default = 8080)]
    pub bind_port: u16,
    /// Fitted model written by `train-model`.
    pub model_path: Option<String>,
    /// Accuracy file written next to the model.
    pub accuracy_path: Option<String>,
}

impl AppSettings {
    /// Socket address to bind, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.bind_host.unwrap_or(DEFAULT_BIND_HOST),
            self.bind_port,
        )
    }

    /// Model and accuracy file locations.
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::new(
            self.model_path.as_deref().unwrap_or(DEFAULT_MODEL_PATH),
            self.accuracy_path.as_deref().unwrap_or(DEFAULT_ACCURACY_PATH),
        )
    }

    /// Database URL with surrounding whitespace removed; blank counts as unset.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Everything `create_server` needs besides the health state.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) model: LoadedModel,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Start from session settings, the listen address and the loaded model.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, model: LoadedModel) -> Self {
        Self {
            session,
            bind_addr,
            model,
            db_pool: None,
        }
    }

    /// Attach a database pool so the Diesel repositories are used.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}

#[cfg(test)]
mod tests {
    //! Settings loading from the environment.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "CALORIES_DATABASE_URL",
        "CALORIES_BIND_HOST",
        "CALORIES_BIND_PORT",
        "CALORIES_MODEL_PATH",
        "CALORIES_ACCURACY_PATH",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("backend")]).expect("settings should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080".parse().expect("addr"));
        assert!(settings.database_url().is_none());
        let paths = settings.artifact_paths();
        assert_eq!(paths.model().as_str(), DEFAULT_MODEL_PATH);
        assert_eq!(paths.accuracy().as_str(), DEFAULT_ACCURACY_PATH);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "CALORIES_DATABASE_URL",
                Some("postgres://db/calories".to_owned()),
            ),
            ("CALORIES_BIND_HOST", Some("127.0.0.1".to_owned())),
            ("CALORIES_BIND_PORT", Some("9090".to_owned())),
            ("CALORIES_MODEL_PATH", Some("/srv/model.json".to_owned())),
            ("CALORIES_ACCURACY_PATH", Some("/srv/accuracy.txt".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.database_url(), Some("postgres://db/calories"));
        assert_eq!(settings.bind_addr(), "127.0.0.1:9090".parse().expect("addr"));
        let paths = settings.artifact_paths();
        assert_eq!(paths.model().as_str(), "/srv/model.json");
        assert_eq!(paths.accuracy().as_str(), "/srv/accuracy.txt");
    }

    #[rstest]
    fn blank_database_url_counts_as_unset() {
        let _guard = lock_env([
            ("CALORIES_DATABASE_URL", Some("   ".to_owned())),
            ("CALORIES_BIND_HOST", None),
            ("CALORIES_BIND_PORT", None),
            ("CALORIES_MODEL_PATH", None),
            ("CALORIES_ACCURACY_PATH", None),
        ]);

        assert!(load_from_empty_args().database_url().is_none());
    }

    #[rstest]
    fn port_alone_overrides_the_default_layer() {
        let _guard = lock_env([
            ("CALORIES_DATABASE_URL", None),
            ("CALORIES_BIND_HOST", None),
            ("CALORIES_BIND_PORT", Some("3000".to_owned())),
            ("CALORIES_MODEL_PATH", None),
            ("CALORIES_ACCURACY_PATH", None),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_port, 3000);
        assert_eq!(settings.bind_addr(), "0.0.0.0:3000".parse().expect("addr"));
    }
}
