//! Running server and shared world for the HTTP behaviour suite.
//!
//! The server runs on a single-threaded Tokio runtime plus a `LocalSet`
//! because Actix spawns with `spawn_local`. Dropping the fixture stops it.

use std::cell::RefCell;
use std::net::TcpListener;
use std::rc::Rc;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use actix_web::dev::ServerHandle;
use actix_web::middleware::from_fn;
use actix_web::{App, HttpServer, web};
use awc::Client;
use awc::http::{Method, header};
use serde_json::Value;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

use backend::trace_requests;
use backend::domain::ports::{PasswordHashError, PasswordHasher};
use backend::domain::{PasswordHash, TRACE_ID_HEADER};
use backend::inbound::http::json_config;
use backend::inbound::http::predict::{predict, prediction_overview};
use backend::inbound::http::session_config::SessionSettings;
use backend::inbound::http::state::{HttpState, HttpStateAdapters};
use backend::inbound::http::users::{current_user, login, logout, register};
use backend::outbound::memory::{InMemoryHistoryRepository, InMemoryUserRepository};
use backend::outbound::model_store::LoadedModel;
use calorie_model::{Accuracy, LinearModel};

/// Accuracy reported by the fixture model.
pub(crate) const MODEL_ACCURACY: f64 = 96.73;

/// Reversible hash keeping scenarios fast.
struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        Ok(PasswordHash::new(format!("plain${password}")))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
        Ok(hash.as_str().strip_prefix("plain$") == Some(password))
    }
}

pub(crate) struct CalorieWorld {
    runtime: Runtime,
    local: LocalSet,
    base_url: String,
    server: ServerHandle,
    pub(crate) last_status: Option<u16>,
    pub(crate) last_body: Option<Value>,
    pub(crate) last_trace_id: Option<String>,
    pub(crate) last_set_cookie: Option<String>,
    pub(crate) session_cookie: Option<String>,
}

pub(crate) type SharedWorld = Rc<RefCell<CalorieWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        let ctx = self.world.borrow();
        let server = ctx.server.clone();
        ctx.local.block_on(&ctx.runtime, async move {
            server.stop(true).await;
        });
    }
}

/// Outgoing request description.
pub(crate) struct RequestSpec<'a> {
    pub(crate) method: Method,
    pub(crate) path: &'a str,
    pub(crate) payload: Option<Value>,
    pub(crate) with_cookie: bool,
}

/// Send a request and record status, body, trace id and `Set-Cookie`.
pub(crate) fn perform(world: &SharedWorld, spec: RequestSpec<'_>) {
    let RequestSpec {
        method,
        path,
        payload,
        with_cookie,
    } = spec;
    let (base_url, cookie) = {
        let ctx = world.borrow();
        let cookie = if with_cookie {
            ctx.session_cookie.clone()
        } else {
            None
        };
        (ctx.base_url.clone(), cookie)
    };

    let (status, trace_id, set_cookie, body) = {
        let ctx = world.borrow();
        ctx.local.block_on(&ctx.runtime, async move {
            let mut request = Client::default().request(method, format!("{base_url}{path}"));
            if let Some(cookie) = cookie {
                request = request.insert_header((header::COOKIE, cookie));
            }
            let mut response = match payload {
                Some(payload) => request.send_json(&payload).await.expect("request"),
                None => request.send().await.expect("request"),
            };
            let header_text = |name: &str| {
                response
                    .headers()
                    .get(name)
                    .and_then(|value| value.to_str().ok())
                    .map(ToOwned::to_owned)
            };
            let trace_id = header_text(TRACE_ID_HEADER);
            let set_cookie = header_text(header::SET_COOKIE.as_str());
            let status = response.status().as_u16();
            let bytes = response.body().await.expect("response body");
            let body = if bytes.is_empty() {
                None
            } else {
                Some(serde_json::from_slice::<Value>(&bytes).expect("json body"))
            };
            (status, trace_id, set_cookie, body)
        })
    };

    let mut ctx = world.borrow_mut();
    ctx.last_status = Some(status);
    ctx.last_trace_id = trace_id;
    ctx.last_body = body;
    ctx.last_set_cookie = set_cookie;
}

/// Keep the `name=value` pair of the last `Set-Cookie` as the session cookie.
pub(crate) fn remember_session_cookie(world: &SharedWorld) {
    let mut ctx = world.borrow_mut();
    let pair = ctx
        .last_set_cookie
        .as_deref()
        .and_then(|cookie| cookie.split(';').next())
        .map(ToOwned::to_owned);
    ctx.session_cookie = pair;
}

fn fixture_state() -> HttpState {
    HttpState::from_adapters(HttpStateAdapters {
        users: Arc::new(InMemoryUserRepository::new()),
        history: Arc::new(InMemoryHistoryRepository::new()),
        hasher: Arc::new(PlainHasher),
        estimator: Arc::new(LoadedModel::new(
            LinearModel::from_parts(10.0, [0.0, 0.0, 0.0, 0.0, 5.0, 0.0, 0.0]),
            Accuracy::from_percent(MODEL_ACCURACY),
        )),
        clock: Arc::new(mockable::DefaultClock),
    })
}

fn spawn_server(state: HttpState) -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    let session = SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    };
    let data = web::Data::new(state);

    let server = HttpServer::new(move || {
        let api = web::scope("/api/v1")
            .wrap(session.middleware())
            .app_data(json_config())
            .service(login)
            .service(register)
            .service(logout)
            .service(current_user)
            .service(prediction_overview)
            .service(predict);
        App::new().app_data(data.clone()).wrap(from_fn(trace_requests)).service(api)
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);
    Ok((format!("http://{addr}"), handle))
}

pub(crate) fn world() -> WorldFixture {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();
    let (base_url, server) = local
        .block_on(&runtime, async { spawn_server(fixture_state()) })
        .expect("server should start");

    WorldFixture {
        world: Rc::new(RefCell::new(CalorieWorld {
            runtime,
            local,
            base_url,
            server,
            last_status: None,
            last_body: None,
            last_trace_id: None,
            last_set_cookie: None,
            session_cookie: None,
        })),
    }
}
