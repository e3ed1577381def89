//! Session identity for the HTTP adapter.
//!
//! Handlers resolve the signed-in user once through [`SessionContext`] and
//! pass the resulting [`UserId`] into the domain explicitly. The cookie only
//! ever holds the user id; profiles are always re-read from the store.

use actix_session::{Session, SessionExt};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Signed-in identity carried by the cookie session.
#[derive(Clone)]
pub struct SessionContext {
    session: Session,
}

impl SessionContext {
    /// Bind `user_id` to the session, rotating the session key first.
    pub fn sign_in(&self, user_id: &UserId) -> Result<(), Error> {
        self.session.renew();
        self.session
            .insert(USER_ID_KEY, user_id.as_ref())
            .map_err(|err| Error::internal(format!("failed to write session: {err}")))
    }

    /// User id stored in the session; a malformed value counts as signed out.
    pub fn signed_in_user(&self) -> Result<Option<UserId>, Error> {
        let stored = self
            .session
            .get::<String>(USER_ID_KEY)
            .map_err(|err| Error::internal(format!("failed to read session: {err}")))?;
        Ok(stored.and_then(|raw| {
            UserId::new(&raw)
                .inspect_err(|err| warn!(error = %err, "discarding malformed session user id"))
                .ok()
        }))
    }

    /// Signed-in user id, or `unauthorized` with `login required`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.signed_in_user()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Forget the identity and expire the cookie.
    pub fn sign_out(&self) {
        self.session.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self {
            session: req.get_session(),
        }))
    }
}
