//! HTML for the admin panel. Every interpolated value goes through `escape`.

use std::fmt::Write;

use ecp::AppEntry;

use crate::session::Flash;

const STYLE: &str = r#"
  body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; background: #16181d; color: #e2e4e9; margin: 0; padding: 24px; }
  .container { max-width: 760px; margin: 0 auto; }
  h1 { color: #7aa7ff; margin: 0 0 20px; }
  h2 { font-size: 1.1em; color: #b6bac4; margin-top: 28px; }
  label { display: block; font-size: 0.85em; color: #9da2ad; margin: 12px 0 4px; text-transform: uppercase; letter-spacing: 0.5px; }
  input[type=text], input[type=password] { width: 100%; box-sizing: border-box; background: #0f1115; border: 1px solid #3a3e48; color: #e2e4e9; padding: 8px 10px; border-radius: 4px; }
  button { margin-top: 16px; background: #3b6fe0; color: #fff; border: 0; padding: 9px 18px; border-radius: 4px; cursor: pointer; }
  .flash { padding: 10px 12px; border-radius: 4px; margin-bottom: 12px; }
  .flash.success { background: #153a22; color: #9fe3b4; }
  .flash.danger { background: #461414; color: #ffbaba; }
  table { width: 100%; border-collapse: collapse; }
  td, th { text-align: left; padding: 4px 8px; border-bottom: 1px solid #2a2d35; }
  .error { color: #ff9a9a; }
  .topbar { display: flex; justify-content: space-between; align-items: baseline; }
  a { color: #7aa7ff; }
"#;

/// Minimal HTML escaping for text and attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body><div class="container">
{body}
</div></body>
</html>
"#,
        title = escape(title),
    )
}

fn flashes_html(flashes: &[Flash]) -> String {
    let mut out = String::new();
    for f in flashes {
        let _ = writeln!(
            out,
            r#"<div class="flash {}">{}</div>"#,
            f.kind.css_class(),
            escape(&f.message)
        );
    }
    out
}

pub fn login(flashes: &[Flash]) -> String {
    let body = format!(
        r#"<h1>Admin Login</h1>
{flashes}<form method="post" action="/login">
<label for="password">Password</label>
<input type="password" id="password" name="password" autofocus>
<button type="submit">Log in</button>
</form>"#,
        flashes = flashes_html(flashes),
    );
    layout("Admin Login", &body)
}

/// Everything the config page shows.
#[derive(Debug, Clone)]
pub struct AdminView {
    pub flashes: Vec<Flash>,
    /// Editable keys with their current values, in form order.
    pub fields: Vec<(String, String)>,
    pub tv1_ip: String,
    pub tv2_ip: String,
    pub active_app_tv1: String,
    pub active_app_tv2: String,
    /// Installed apps on TV1, or the error text.
    pub apps: Result<Vec<AppEntry>, String>,
}

pub fn admin(view: &AdminView) -> String {
    let mut fields = String::new();
    for (key, value) in &view.fields {
        let _ = writeln!(
            fields,
            r#"<label for="{k}">{k}</label>
<input type="text" id="{k}" name="{k}" value="{v}">"#,
            k = escape(key),
            v = escape(value),
        );
    }

    let apps = match &view.apps {
        Ok(apps) if apps.is_empty() => "<p>No apps reported.</p>".to_string(),
        Ok(apps) => {
            let mut rows = String::new();
            for app in apps {
                let _ = writeln!(
                    rows,
                    "<tr><td>{}</td><td>{}</td></tr>",
                    escape(&app.id),
                    escape(&app.name)
                );
            }
            format!("<table>\n<tr><th>ID</th><th>Name</th></tr>\n{rows}</table>")
        }
        Err(e) => format!(r#"<p class="error">Error: {}</p>"#, escape(e)),
    };

    let body = format!(
        r#"<div class="topbar"><h1>Remote Configuration</h1><a href="/logout">Log out</a></div>
{flashes}<h2>Active apps</h2>
<table>
<tr><td>TV01 ({tv1})</td><td>{a1}</td></tr>
<tr><td>TV02 ({tv2})</td><td>{a2}</td></tr>
</table>
<h2>Settings</h2>
<form method="post" action="/admin">
{fields}<button type="submit">Save</button>
</form>
<h2>Apps on TV01</h2>
{apps}"#,
        flashes = flashes_html(&view.flashes),
        tv1 = escape(&view.tv1_ip),
        tv2 = escape(&view.tv2_ip),
        a1 = escape(&view.active_app_tv1),
        a2 = escape(&view.active_app_tv2),
    );
    layout("Remote Configuration", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn login_shows_flash() {
        let html = login(&[Flash::danger("Invalid password")]);
        assert!(html.contains(r#"<div class="flash danger">Invalid password</div>"#));
    }

    #[test]
    fn admin_renders_error_in_place_of_apps() {
        let view = AdminView {
            flashes: vec![],
            fields: vec![("TV01_IP".into(), "10.0.0.1\" onfocus=\"x".into())],
            tv1_ip: "10.0.0.1".into(),
            tv2_ip: "10.0.0.2".into(),
            active_app_tv1: "Netflix".into(),
            active_app_tv2: "Error: 503".into(),
            apps: Err("HTTP 500".into()),
        };
        let html = admin(&view);
        assert!(html.contains(r#"<p class="error">Error: HTTP 500</p>"#));
        assert!(html.contains(r#"value="10.0.0.1&quot; onfocus=&quot;x""#));
        assert!(html.contains("<td>Error: 503</td>"));
    }
}
