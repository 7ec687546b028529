use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Form, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use ecp::{DeviceQuery, EcpError};
use serde::Deserialize;
use storage::config::{default_value, RemoteConfig, ADMIN_PASSWORD, EDITABLE_KEYS};
use storage::env_file::EnvFile;
use tracing::{debug, info, warn};

use crate::pages::{self, AdminView};
use crate::session::{clear_cookie, set_cookie, token_from_headers, Flash};
use crate::{AdminError, AdminState};

type SharedState = Arc<AdminState>;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout))
        .route("/", get(admin_page).post(admin_submit))
        .route("/admin", get(admin_page).post(admin_submit))
}

pub async fn log_request(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    debug!(%method, %path, status = response.status().as_u16(), "admin request");
    response
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    password: Option<String>,
}

async fn login_page() -> Html<String> {
    Html(pages::login(&[]))
}

async fn login_submit(
    State(state): State<SharedState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AdminError> {
    let env = EnvFile::load(&state.env_path)?;
    let expected = env
        .get(ADMIN_PASSWORD)
        .map(str::to_string)
        .or_else(|| default_value(ADMIN_PASSWORD))
        .unwrap_or_default();

    if form.password.as_deref() == Some(expected.as_str()) {
        let token = state.sessions.create();
        info!("admin login");
        return Ok(([(SET_COOKIE, set_cookie(&token))], Redirect::to("/admin")).into_response());
    }

    warn!("admin login rejected");
    Ok(Html(pages::login(&[Flash::danger("Invalid password")])).into_response())
}

async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if let Some(token) = token_from_headers(&headers) {
        state.sessions.remove(&token);
    }
    ([(SET_COOKIE, clear_cookie())], Redirect::to("/login")).into_response()
}

fn describe(e: &EcpError) -> String {
    match e {
        EcpError::Status(code) => code.to_string(),
        other => other.to_string(),
    }
}

async fn admin_page(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Response, AdminError> {
    let Some(token) = state.sessions.authenticated(&headers) else {
        return Ok(Redirect::to("/login").into_response());
    };

    let env = EnvFile::load(&state.env_path)?;
    let cfg = RemoteConfig::from_env_file(&env, false);
    let [tv1_ip, tv2_ip] = cfg.tv_ips.clone();

    let device: &dyn DeviceQuery = state.device.as_ref();
    let (active1, active2, apps) = tokio::join!(
        device.active_app(&tv1_ip),
        device.active_app(&tv2_ip),
        device.apps(&tv1_ip),
    );

    let active_label = |r: Result<ecp::ActiveApp, EcpError>| match r {
        Ok(a) => a.label().to_string(),
        Err(e) => format!("Error: {}", describe(&e)),
    };

    let fields = EDITABLE_KEYS
        .iter()
        .map(|key| {
            let value = env
                .get(key)
                .map(str::to_string)
                .or_else(|| default_value(key))
                .unwrap_or_default();
            (key.to_string(), value)
        })
        .collect();

    let view = AdminView {
        flashes: state.sessions.take_flashes(&token),
        fields,
        tv1_ip,
        tv2_ip,
        active_app_tv1: active_label(active1),
        active_app_tv2: active_label(active2),
        apps: apps.map_err(|e| match e {
            EcpError::Status(code) => format!("HTTP {code}"),
            other => other.to_string(),
        }),
    };
    Ok(Html(pages::admin(&view)).into_response())
}

/// Form values are stored verbatim except for line breaks, which would
/// split the entry in two.
fn single_line(v: &str) -> String {
    v.chars().filter(|c| *c != '\r' && *c != '\n').collect()
}

async fn admin_submit(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, AdminError> {
    let Some(token) = state.sessions.authenticated(&headers) else {
        return Ok(Redirect::to("/login").into_response());
    };

    let mut env = EnvFile::load(&state.env_path)?;
    for key in EDITABLE_KEYS {
        let value = form.get(key).map(|v| single_line(v)).unwrap_or_default();
        env.set(key, value);
    }
    env.save(&state.env_path)?;
    info!(path = %state.env_path.display(), "configuration updated");

    state
        .sessions
        .push_flash(&token, Flash::success("Configuration updated!"));
    Ok(Redirect::to("/admin").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_breaks_are_stripped() {
        assert_eq!(single_line("10.0.0.1\r\nADMIN_PASSWORD=x"), "10.0.0.1ADMIN_PASSWORD=x");
        assert_eq!(single_line("plain"), "plain");
    }

    #[test]
    fn status_errors_show_the_code() {
        assert_eq!(describe(&EcpError::Status(503)), "503");
    }
}
