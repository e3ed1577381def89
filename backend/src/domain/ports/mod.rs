//! Domain ports for the hexagonal boundary.
//!
//! Driving ports are called by inbound adapters; driven ports are
//! implemented by outbound adapters and called by domain services.

mod macros;
pub(crate) use macros::define_port_error;

mod calorie_estimator;
mod history_query;
mod history_repository;
mod login_service;
mod password_hasher;
mod prediction_command;
mod registration_service;
mod user_profile_query;
mod user_repository;

pub use calorie_estimator::CalorieEstimator;
#[cfg(test)]
pub use calorie_estimator::MockCalorieEstimator;
pub use history_query::HistoryQuery;
#[cfg(test)]
pub use history_repository::MockHistoryRepository;
pub use history_repository::{HistoryPersistenceError, HistoryRepository};
pub use login_service::LoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
pub use prediction_command::{PredictionCommand, PredictionRequest};
pub use registration_service::RegistrationService;
pub use user_profile_query::UserProfileQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};

#[cfg(test)]
mod tests;
