//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AppSettings, ServerConfig};

use state_builders::build_http_state;

use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::from_fn;
use actix_web::{App, HttpServer, web};

use backend::trace_requests;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::json_config;
use backend::inbound::http::predict::{predict, prediction_overview};
use backend::inbound::http::session_config::SessionSettings;
use backend::inbound::http::state::HttpState;
use backend::inbound::http::users::{current_user, login, logout, register};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: SessionSettings,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        session,
    } = deps;

    let api = web::scope("/api/v1")
        .wrap(session.middleware())
        .app_data(json_config())
        .service(login)
        .service(register)
        .service(logout)
        .service(current_user)
        .service(prediction_overview)
        .service(predict);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(from_fn(trace_requests))
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind the HTTP listener and mark the service ready.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);
    let ServerConfig {
        session,
        bind_addr,
        model: _,
        db_pool: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            session: session.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! Route wiring checks over the in-memory stores.

    use super::*;
    use actix_web::cookie::{Key, SameSite};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use backend::domain::TRACE_ID_HEADER;
    use backend::outbound::model_store::LoadedModel;
    use calorie_model::{Accuracy, LinearModel};
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};

    #[fixture]
    fn server_config() -> ServerConfig {
        let session = SessionSettings {
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
        };
        let model = LoadedModel::new(
            LinearModel::from_parts(1.0, [0.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0]),
            Accuracy::from_percent(88.5),
        );
        ServerConfig::new(session, "127.0.0.1:0".parse().expect("addr"), model)
    }

    fn deps(config: &ServerConfig) -> AppDependencies {
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state: build_http_state(config),
            session: config.session.clone(),
        }
    }

    #[rstest]
    #[actix_rt::test]
    async fn create_server_marks_ready(server_config: ServerConfig) {
        let health_state = web::Data::new(HealthState::new());
        assert!(!health_state.is_ready(), "state should start unready");

        let _server =
            create_server(health_state.clone(), server_config).expect("server should bind");

        assert!(health_state.is_ready(), "server creation should mark readiness");
    }

    #[rstest]
    #[case("/api/v1/users/me")]
    #[case("/api/v1/predict")]
    #[case("/api/v1/logout")]
    #[actix_rt::test]
    async fn api_routes_require_a_session(server_config: ServerConfig, #[case] path: &str) {
        let app = test::init_service(build_app(deps(&server_config))).await;
        let res = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().contains_key(TRACE_ID_HEADER));
    }

    #[rstest]
    #[actix_rt::test]
    async fn liveness_is_served_outside_the_api_scope(server_config: ServerConfig) {
        let app = test::init_service(build_app(deps(&server_config))).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/health/live").to_request())
                .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_rt::test]
    async fn malformed_login_body_uses_the_error_envelope(server_config: ServerConfig) {
        let app = test::init_service(build_app(deps(&server_config))).await;
        let req = test::TestRequest::post()
            .uri("/api/v1/login")
            .insert_header(("content-type", "application/json"))
            .set_payload("{")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "invalid_request");
    }

    #[rstest]
    #[actix_rt::test]
    async fn blank_login_is_rejected_before_lookup(server_config: ServerConfig) {
        let app = test::init_service(build_app(deps(&server_config))).await;
        let req = test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"identifier": " ", "password": "x"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
