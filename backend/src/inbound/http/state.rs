//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` and only see driving
//! ports, so they can be exercised without a database or model file.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    CalorieEstimator, HistoryQuery, HistoryRepository, LoginService, PasswordHasher,
    PredictionCommand, RegistrationService, UserProfileQuery, UserRepository,
};
use crate::domain::{AccountService, PredictionService};

/// Parameter object bundling the port implementations for handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub prediction: Arc<dyn PredictionCommand>,
    pub history: Arc<dyn HistoryQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub prediction: Arc<dyn PredictionCommand>,
    pub history: Arc<dyn HistoryQuery>,
}

/// Driven adapters needed to assemble the domain services.
pub struct HttpStateAdapters<U, H> {
    pub users: Arc<U>,
    pub history: Arc<H>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub estimator: Arc<dyn CalorieEstimator>,
    pub clock: Arc<dyn Clock>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            registration,
            profile,
            prediction,
            history,
        } = ports;
        Self {
            login,
            registration,
            profile,
            prediction,
            history,
        }
    }

    /// Wire the account and prediction services over one set of adapters.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use backend::inbound::http::state::{HttpState, HttpStateAdapters};
    /// use backend::outbound::argon2_hasher::Argon2PasswordHasher;
    /// use backend::outbound::memory::{InMemoryHistoryRepository, InMemoryUserRepository};
    /// use backend::outbound::model_store::LoadedModel;
    /// use calorie_model::{Accuracy, LinearModel};
    ///
    /// let model = LinearModel::from_parts(0.0, [0.0; 7]);
    /// let state = HttpState::from_adapters(HttpStateAdapters {
    ///     users: Arc::new(InMemoryUserRepository::new()),
    ///     history: Arc::new(InMemoryHistoryRepository::new()),
    ///     hasher: Arc::new(Argon2PasswordHasher::new()),
    ///     estimator: Arc::new(LoadedModel::new(model, Accuracy::from_percent(90.0))),
    ///     clock: Arc::new(mockable::DefaultClock),
    /// });
    /// let _login = state.login.clone();
    /// ```
    pub fn from_adapters<U, H>(adapters: HttpStateAdapters<U, H>) -> Self
    where
        U: UserRepository + 'static,
        H: HistoryRepository + 'static,
    {
        let HttpStateAdapters {
            users,
            history,
            hasher,
            estimator,
            clock,
        } = adapters;
        let accounts = Arc::new(AccountService::new(users.clone(), hasher, clock.clone()));
        let predictions = Arc::new(PredictionService::new(users, history, estimator, clock));
        Self::new(HttpStatePorts {
            login: accounts.clone(),
            registration: accounts.clone(),
            profile: accounts,
            prediction: predictions.clone(),
            history: predictions,
        })
    }
}
