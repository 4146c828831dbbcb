use crate::api::handlers::{account, health};
use anyhow::{Context, Result, anyhow};
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{
        HeaderName, HeaderValue, Method, Request,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post, put},
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;
use url::Url;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

pub(crate) mod email;
pub(crate) mod handlers;

pub use email::{LogMailer, Mailer, SmtpMailer};
pub use handlers::{AccountConfig, AccountState};

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        account::register::register,
        account::login::login,
        account::login::logout,
        account::reset::forgot_password,
        account::reset::reset_password,
        account::password::change_password,
        account::profile::me,
        account::profile::update,
    ),
    components(schemas(
        account::types::RegisterRequest,
        account::types::LoginRequest,
        account::types::ForgotPasswordRequest,
        account::types::ResetPasswordRequest,
        account::types::UpdatePasswordRequest,
        account::types::ProfileUpdateRequest,
        account::types::Address,
        account::types::PublicAccount,
        account::types::AuthResponse,
        account::types::TokenResponse,
        account::types::MessageResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "anagrafe", description = "Account registry and authentication API")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Build the application router with all account routes registered.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/v1/account/register", post(account::register::register))
        .route("/v1/account/login", post(account::login::login))
        .route("/v1/account/logout", post(account::login::logout))
        .route(
            "/v1/account/forgot-password",
            post(account::reset::forgot_password),
        )
        .route(
            "/v1/account/reset-password/:token",
            put(account::reset::reset_password),
        )
        .route("/v1/account/password", put(account::password::change_password))
        .route("/v1/account/me", get(account::profile::me))
        .route("/v1/account/profile", put(account::profile::update))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, state: Arc<AccountState>) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let frontend_origin = frontend_origin(state.config().frontend_base_url())?;
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_origin(AllowOrigin::exact(frontend_origin))
        .allow_credentials(true);

    let app = router()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(state))
                .layer(Extension(pool)),
        );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn frontend_origin(frontend_base_url: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(frontend_base_url)
        .with_context(|| format!("Invalid frontend base URL: {frontend_base_url}"))?;
    let host = parsed.host_str().ok_or_else(|| {
        anyhow!("Frontend base URL must include a valid host: {frontend_base_url}")
    })?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build frontend origin header")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontend_origin_strips_path_and_keeps_port() -> Result<()> {
        let origin = frontend_origin("https://app.anagrafe.dev/some/path")?;
        assert_eq!(origin, HeaderValue::from_static("https://app.anagrafe.dev"));

        let origin = frontend_origin("http://localhost:5173/")?;
        assert_eq!(origin, HeaderValue::from_static("http://localhost:5173"));
        Ok(())
    }

    #[test]
    fn frontend_origin_rejects_garbage() {
        assert!(frontend_origin("not a url").is_err());
    }

    #[test]
    fn router_builds() {
        let _app: Router = router();
    }

    // The server entry point takes `Arc<AccountState>`, so the state types
    // must be nameable from the crate's public surface.
    #[test]
    fn state_types_are_nameable_from_api_root() {
        use crate::auth::TokenSigner;
        use secrecy::SecretString;

        let config = AccountConfig::new("https://app.anagrafe.dev".to_string());
        let signer = TokenSigner::new(&SecretString::from("secret"), config.session_ttl_seconds());
        let state: Arc<AccountState> = Arc::new(AccountState::new(config, signer, Arc::new(LogMailer)));
        assert_eq!(state.config().frontend_base_url(), "https://app.anagrafe.dev");
    }
}
