use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use admin_web::{router, AdminState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use ecp::{ActiveApp, AppEntry, DeviceQuery, EcpError};
use tower::ServiceExt;

#[derive(Default)]
struct FakeTvs {
    app_list_ips: Mutex<Vec<String>>,
}

impl FakeTvs {
    fn app_list_ips(&self) -> Vec<String> {
        self.app_list_ips.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeviceQuery for FakeTvs {
    async fn active_app(&self, ip: &str) -> Result<ActiveApp, EcpError> {
        match ip {
            "10.0.0.1" => Ok(ActiveApp {
                app: Some(AppEntry {
                    id: "12".into(),
                    name: "Netflix".into(),
                }),
            }),
            _ => Err(EcpError::Status(503)),
        }
    }

    async fn apps(&self, ip: &str) -> Result<Vec<AppEntry>, EcpError> {
        self.app_list_ips.lock().unwrap().push(ip.to_string());
        Ok(vec![
            AppEntry {
                id: "13".into(),
                name: "Amazon Video".into(),
            },
            AppEntry {
                id: "12".into(),
                name: "Netflix".into(),
            },
        ])
    }
}

struct Harness {
    _dir: tempfile::TempDir,
    env_path: PathBuf,
    tvs: Arc<FakeTvs>,
    app: Router,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let env_path = dir.path().join(".env");
    fs::write(
        &env_path,
        "TV01_IP=10.0.0.1\nTV02_IP=10.0.0.2\nADMIN_PASSWORD=secret\nFULLSCREEN=1\n",
    )
    .unwrap();
    let tvs = Arc::new(FakeTvs::default());
    let state = Arc::new(AdminState::new(env_path.clone(), tvs.clone()));
    Harness {
        _dir: dir,
        env_path,
        tvs,
        app: router(state),
    }
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn body_text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().method("GET").uri(uri);
    if let Some(c) = cookie {
        b = b.header(COOKIE, c);
    }
    b.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, cookie: Option<&str>, form: &str) -> Request<Body> {
    let mut b = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(c) = cookie {
        b = b.header(COOKIE, c);
    }
    b.body(Body::from(form.to_string())).unwrap()
}

fn location(resp: &Response) -> &str {
    resp.headers().get(LOCATION).unwrap().to_str().unwrap()
}

async fn login(app: &Router) -> String {
    let resp = send(app, post_form("/login", None, "password=secret")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin");
    let set = resp.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    set.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn admin_requires_login() {
    let h = harness();
    for uri in ["/", "/admin"] {
        let resp = send(&h.app, get(uri, None)).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/login");
    }

    let resp = send(&h.app, post_form("/admin", None, "TV01_IP=1.1.1.1")).await;
    assert_eq!(location(&resp), "/login");
    assert!(fs::read_to_string(&h.env_path).unwrap().contains("TV01_IP=10.0.0.1"));

    let resp = send(
        &h.app,
        get("/admin", Some("roku_remote_session=forged")),
    )
    .await;
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn wrong_password_flashes_error() {
    let h = harness();
    let resp = send(&h.app, post_form("/login", None, "password=admin")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(SET_COOKIE).is_none());
    assert!(body_text(resp).await.contains("Invalid password"));
}

#[tokio::test]
async fn login_page_renders() {
    let h = harness();
    let resp = send(&h.app, get("/login", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains(r#"name="password""#));
}

#[tokio::test]
async fn admin_page_shows_config_and_device_state() {
    let h = harness();
    let cookie = login(&h.app).await;

    let resp = send(&h.app, get("/admin", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;

    assert!(html.contains(r#"name="TV01_IP" value="10.0.0.1""#));
    assert!(html.contains(r#"name="APP1_ID" value="app1""#));
    assert!(html.contains("<td>Netflix</td>"));
    assert!(html.contains("<td>Error: 503</td>"));
    let amazon = html.find("Amazon Video").unwrap();
    let netflix_row = html.find("<td>12</td>").unwrap();
    assert!(amazon < netflix_row);
    assert_eq!(h.tvs.app_list_ips(), ["10.0.0.1"]);
}

#[tokio::test]
async fn save_overwrites_editable_keys_and_keeps_others() {
    let h = harness();
    let cookie = login(&h.app).await;

    let form = "TV01_IP=192.168.1.10&TV02_IP=192.168.1.11&APP1_ID=12&APP2_ID=13\
                &APP3_ID=&APP4_ID=2285&ADMIN_PASSWORD=n3w&ICON_DIR=%2Ftmp%2Ficons";
    let resp = send(&h.app, post_form("/", Some(&cookie), form)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin");

    let saved = fs::read_to_string(&h.env_path).unwrap();
    assert_eq!(
        saved,
        "TV01_IP=192.168.1.10\nTV02_IP=192.168.1.11\nADMIN_PASSWORD=n3w\nFULLSCREEN=1\n\
         APP1_ID=12\nAPP2_ID=13\nAPP3_ID=\nAPP4_ID=2285\nICON_DIR=/tmp/icons\n"
    );

    let html = body_text(send(&h.app, get("/admin", Some(&cookie))).await).await;
    assert!(html.contains("Configuration updated!"));
    assert_eq!(h.tvs.app_list_ips(), ["192.168.1.10"]);
    let html = body_text(send(&h.app, get("/admin", Some(&cookie))).await).await;
    assert!(!html.contains("Configuration updated!"));

    // The new password is live for the next login.
    let resp = send(&h.app, post_form("/login", None, "password=n3w")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let h = harness();
    let cookie = login(&h.app).await;

    let resp = send(&h.app, get("/logout", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
    let cleared = resp.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));

    let resp = send(&h.app, get("/admin", Some(&cookie))).await;
    assert_eq!(location(&resp), "/login");
}
