// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 应用
//!
//! 进程级的共享状态（配置、组件注册表、模板加载器、会话表、用户表）在启动时构造一次，
//! 之后只读地供所有连接使用。[`App::handle`] 把一个已解析的 [`Request`] 变成 [`Response`]：
//!
//! 1. 只有 GET 与 POST 进入页面编排，其余方法直接 405；
//! 2. 按路径查找页面，找不到时使用 `NotFoundPage` 与 `404` 模板；
//! 3. 管理员请求才打开会话，会话 ID 变化时下发 `Set-Cookie`；
//! 4. 编排失败时按异常类别返回状态页，不在响应体中暴露内部细节。

use std::{sync::Arc, time::Duration};

use log::{debug, error, info, warn};

use crate::{
    config::Config,
    context::RequestContext,
    controller::Services,
    controllers::{self, NOT_FOUND_CONTROLLER},
    database::{Database, MemoryDatabase},
    exception::Exception,
    factory::ControllerResolver,
    page::{Page, TemplateLoader},
    param::*,
    request::Request,
    resolver::NamespaceTable,
    response::Response,
    session::{Session, SessionManager, SessionStore},
};

pub struct App {
    config: Arc<Config>,
    resolver: ControllerResolver,
    loader: TemplateLoader,
    sessions: Arc<SessionManager>,
    database: Arc<dyn Database>,
}

impl App {
    /// 构造应用并校验页面配置。命名空间缺失属于配置错误，直接返回 `NotRegistered`。
    pub fn new(config: Config) -> Result<Self, Exception> {
        let namespaces = NamespaceTable::from_entries(config.namespaces());
        let mut resolver = ControllerResolver::new(namespaces, config.admin_folder());
        controllers::install_defaults(&mut resolver)?;

        for page in config.pages() {
            let namespace = page.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE);
            resolver.check_registered(&format!("{}{}", namespace, page.controller))?;
        }
        info!("已载入{}个页面", config.pages().len());

        let database = Arc::new(MemoryDatabase::from_seeds(config.users()));
        let sessions = Arc::new(SessionManager::new(Duration::from_secs(
            config.session_expiry(),
        )));
        let loader = TemplateLoader::new(&config);

        Ok(Self {
            config: Arc::new(config),
            resolver,
            loader,
            sessions,
            database,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn handle(&self, request: &Request, peer_ip: &str, id: u128) -> Response {
        let mut response = self.dispatch(request, peer_ip, id);
        response.set_version(*request.version());
        response
    }

    fn dispatch(&self, request: &Request, peer_ip: &str, id: u128) -> Response {
        let method = request.method();
        let accept_encoding = request.accept_encoding();
        if !ALLOWED_METHODS.contains(&method) {
            debug!("[ID{}]{}请求不进入页面编排，返回405", id, method);
            return Response::from_status_code(405, accept_encoding, id);
        }

        let path = request.route_path();
        let ctx = RequestContext::new(
            id,
            method,
            path,
            self.config.admin_folder(),
            request.form().clone(),
        );

        let (title, template, controller, namespace) = match self.config.find_page(path) {
            Some(page) => (
                page.title.as_str(),
                page.template.as_deref(),
                page.controller.as_str(),
                page.namespace.as_deref(),
            ),
            None => {
                debug!("[ID{}]路径{}没有对应的页面", id, path);
                (NOT_FOUND_TITLE, Some(NOT_FOUND_TEMPLATE), NOT_FOUND_CONTROLLER, None)
            }
        };

        let session = if ctx.is_admin() {
            Some(Arc::new(Session::open(
                Arc::clone(&self.sessions),
                request.cookie(self.config.session_cookie()),
                peer_ip,
                request.user_agent(),
            )))
        } else {
            None
        };
        let services = Services {
            config: Arc::clone(&self.config),
            database: Arc::clone(&self.database),
            session: session.clone().map(|s| s as Arc<dyn SessionStore>),
        };

        let page = Page::new(&self.resolver, &self.loader, &services);
        let mut response = match page.serve(title, template, controller, namespace, &ctx) {
            Ok(Some(rendered)) => {
                Response::from_html(rendered.status, &rendered.body, accept_encoding, id)
            }
            Ok(None) => Response::from_status_code(405, accept_encoding, id),
            Err(e) => {
                match e.status_code() {
                    500 => error!("[ID{}]页面{}处理失败：{}", id, path, e),
                    _ => warn!("[ID{}]页面{}处理失败：{}", id, path, e),
                }
                Response::from_status_code(e.status_code(), accept_encoding, id)
            }
        };

        if let Some(session) = session {
            let cookie_path = format!("/{}", self.config.admin_folder());
            if let Some(cookie) = session.cookie_header(
                self.config.session_cookie(),
                &cookie_path,
                self.config.session_expiry(),
            ) {
                response.set_cookie(&cookie);
            }
        }
        response
    }
}
