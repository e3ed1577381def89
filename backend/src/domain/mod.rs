//! Domain primitives, services and ports.
//!
//! Purpose: define strongly typed entities used by the HTTP and persistence
//! adapters, and the services that implement the driving ports. Nothing in
//! this module knows about Actix, Diesel or the model file format.
//!
//! Public surface:
//! - [`Error`] and [`ErrorCode`]: transport-agnostic failure envelope.
//! - [`User`], [`UserId`], [`Username`], [`Email`]: account identity.
//! - [`Measurements`] and [`HistoryEntry`]: prediction inputs and records.
//! - [`AccountService`] and [`PredictionService`]: driving port implementations.

pub mod account_service;
pub mod auth;
pub mod error;
pub mod history;
pub mod measurements;
pub mod ports;
pub mod prediction_service;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{
    LoginCredentials, LoginValidationError, Registration, RegistrationValidationError,
};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::history::{HistoryEntry, Prediction, PredictionOverview, sort_newest_first};
pub use self::measurements::{
    MeasurementError, MeasurementField, MeasurementProblem, Measurements, RawMeasurements,
    RawNumber,
};
pub use self::prediction_service::PredictionService;
pub use self::trace_id::TraceId;
pub use self::user::{
    EMAIL_MAX, Email, PasswordHash, StoredCredentials, USERNAME_MAX, User, UserDraft, UserId,
    UserValidationError, Username,
};
