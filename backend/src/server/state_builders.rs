//! Builders selecting the driven adapters behind the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use backend::domain::ports::{CalorieEstimator, PasswordHasher};
use backend::inbound::http::state::{HttpState, HttpStateAdapters};
use backend::outbound::argon2_hasher::Argon2PasswordHasher;
use backend::outbound::memory::{InMemoryHistoryRepository, InMemoryUserRepository};
use backend::outbound::persistence::{DbPool, DieselHistoryRepository, DieselUserRepository};

use super::ServerConfig;

/// Adapters shared by every storage backend.
struct SharedAdapters {
    hasher: Arc<dyn PasswordHasher>,
    estimator: Arc<dyn CalorieEstimator>,
    clock: Arc<dyn Clock>,
}

/// Use the pooled repositories when a pool exists, otherwise process memory.
fn select_state<Pool>(
    pool: Option<&Pool>,
    shared: SharedAdapters,
    with_pool: impl FnOnce(&Pool, SharedAdapters) -> HttpState,
) -> HttpState {
    match pool {
        Some(pool) => {
            info!("using PostgreSQL repositories");
            with_pool(pool, shared)
        }
        None => {
            warn!("no database configured; accounts and history live in memory only");
            in_memory_state(shared)
        }
    }
}

fn in_memory_state(shared: SharedAdapters) -> HttpState {
    let SharedAdapters {
        hasher,
        estimator,
        clock,
    } = shared;
    HttpState::from_adapters(HttpStateAdapters {
        users: Arc::new(InMemoryUserRepository::new()),
        history: Arc::new(InMemoryHistoryRepository::new()),
        hasher,
        estimator,
        clock,
    })
}

fn diesel_state(pool: &DbPool, shared: SharedAdapters) -> HttpState {
    let SharedAdapters {
        hasher,
        estimator,
        clock,
    } = shared;
    HttpState::from_adapters(HttpStateAdapters {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        history: Arc::new(DieselHistoryRepository::new(pool.clone())),
        hasher,
        estimator,
        clock,
    })
}

/// Assemble handler state from the server configuration.
pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let shared = SharedAdapters {
        hasher: Arc::new(Argon2PasswordHasher::new()),
        estimator: Arc::new(config.model),
        clock: Arc::new(DefaultClock),
    };
    web::Data::new(select_state(config.db_pool.as_ref(), shared, diesel_state))
}
