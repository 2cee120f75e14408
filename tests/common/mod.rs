// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 集成测试共用的站点夹具：临时模板目录 + 预置管理员账号的 [`App`]。

#![allow(dead_code)]

use std::fs;

use tagpage::{
    config::{PageRoute, UserSeed},
    password, App, Config, Request, Response,
};
use tempfile::TempDir;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "secret";
pub const COOKIE: &str = "TagPageAdmin";

pub fn page(path: &str, title: &str, template: Option<&str>, controller: &str) -> PageRoute {
    PageRoute {
        path: path.to_string(),
        title: title.to_string(),
        template: template.map(str::to_string),
        controller: controller.to_string(),
        namespace: None,
    }
}

/// 站点目录在 `TempDir` 被丢弃时删除，调用方必须持有它。
pub fn site() -> (TempDir, App) {
    let dir = TempDir::new().unwrap();
    let public = dir.path().join("template");
    let admin = dir.path().join("admin").join("template");
    fs::create_dir_all(&public).unwrap();
    fs::create_dir_all(&admin).unwrap();

    fs::write(
        public.join("page.tpl"),
        "<title>{TITLE}</title>\
         {ADMINSTYLESHEET}<link href=\"{BASEURL}{ADMINFOLDER}admin.css\">{/ADMINSTYLESHEET}\
         {EXTRASTYLESHEETS}<link href=\"extra.css\">{/EXTRASTYLESHEETS}\
         <main>{PAGE}</main><footer>{THISYEAR}</footer>",
    )
    .unwrap();
    fs::write(public.join("index.tpl"), "public home").unwrap();
    fs::write(public.join("404.tpl"), "nothing here").unwrap();
    fs::write(admin.join("index.tpl"), "hello {USERNAME}").unwrap();
    fs::write(admin.join("login.tpl"), "login form").unwrap();
    fs::write(admin.join("password.tpl"), "password form").unwrap();

    let config = Config::new()
        .with_template_root(&dir.path().to_string_lossy())
        .with_pages(vec![
            page("/", "Home", Some("index"), "IndexPage"),
            page("/plain", "Plain", None, "IndexPage"),
            page("/sneaky", "Sneaky", Some("index"), "AdminIndexPage"),
            page("/admin/", "Admin", Some("index"), "AdminIndexPage"),
            page("/admin/login", "Log In", Some("login"), "AdminLoginPage"),
            page("/admin/password", "Password", Some("password"), "AdminPasswordPage"),
        ])
        .with_users(vec![UserSeed {
            username: ADMIN_USER.to_string(),
            password_hash: password::hash(ADMIN_PASS).unwrap(),
        }]);

    (dir, App::new(config).unwrap())
}

pub fn get(app: &App, path: &str, session: Option<&str>) -> Response {
    send(app, &raw("GET", path, session, ""))
}

pub fn post(app: &App, path: &str, session: Option<&str>, body: &str) -> Response {
    send(app, &raw("POST", path, session, body))
}

pub fn raw(method: &str, path: &str, session: Option<&str>, body: &str) -> String {
    let mut request = format!("{} {} HTTP/1.1\r\nHost: localhost\r\nUser-Agent: Test\r\n", method, path);
    if let Some(id) = session {
        request.push_str(&format!("Cookie: {}={}\r\n", COOKIE, id));
    }
    if !body.is_empty() {
        request.push_str("Content-Type: application/x-www-form-urlencoded\r\n");
        request.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    request.push_str("\r\n");
    request.push_str(body);
    request
}

pub fn send(app: &App, raw: &str) -> Response {
    let request = Request::try_from(raw.as_bytes(), 1).unwrap();
    app.handle(&request, "127.0.0.1", 1)
}

pub fn body(response: &Response) -> String {
    response
        .content()
        .map(|c| String::from_utf8_lossy(c).to_string())
        .unwrap_or_default()
}

/// 从 `Set-Cookie` 中取出会话 ID；清除会话的 Cookie 返回空串。
pub fn session_id(response: &Response) -> Option<String> {
    let cookie = response.cookie()?;
    let pair = cookie.split(';').next()?;
    let (_, value) = pair.split_once('=')?;
    Some(value.to_string())
}

pub fn login(app: &App, password: &str) -> Response {
    post(
        app,
        "/admin/login",
        None,
        &format!("mode=login&username={}&password={}", ADMIN_USER, password),
    )
}
