// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 控制器核心
//!
//! 每个请求创建一个新的控制器实例，它只处理一个阶段（GET 或 POST）。
//! [`PageController`] 的两个处理方法都以 `Box<Self>` 接收自身，处理完毕实例即被消耗，
//! 因此状态迁移 `Idle → GetHandling/PostHandling → Responded` 由所有权保证，不可能重入。
//!
//! [`BaseController`] 是所有具体控制器内嵌的公共部分：
//! - GET：合并公共标签并清理未使用的逻辑区域；
//! - POST：维护“动作名 → 模型方法 + 成功/失败提示”的动作表，并按 `mode` 字段分发。

use std::{collections::HashMap, fmt, sync::Arc};

use log::{debug, info, warn};

use crate::{
    config::Config,
    context::RequestContext,
    database::Database,
    model::{ArgBag, Model, ModelMethod},
    param::*,
    session::SessionStore,
    template::TemplateEngine,
    util::this_year,
};

/// 处理阶段的规范结果，与 HTTP 状态码一一对应。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(String),
    Reset,
    Redirect,
    BadRequest(String),
    Forbidden,
    NotFound,
}

impl Outcome {
    /// 固定的结果 → 状态码映射。
    ///
    /// `NotFound` 映射为 400 而不是 404，与既有客户端保持兼容。
    pub fn status_code(&self) -> u16 {
        match self {
            Outcome::Success(_) => 200,
            Outcome::Reset => 205,
            Outcome::Redirect => 206,
            Outcome::BadRequest(_) => 400,
            Outcome::Forbidden => 403,
            Outcome::NotFound => 400,
        }
    }

    /// 需要写入响应体的提示语，没有时为空串。
    pub fn message(&self) -> &str {
        match self {
            Outcome::Success(msg) | Outcome::BadRequest(msg) => msg,
            _ => "",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(_) => write!(f, "Success"),
            Outcome::Reset => write!(f, "Reset"),
            Outcome::Redirect => write!(f, "Redirect"),
            Outcome::BadRequest(_) => write!(f, "BadRequest"),
            Outcome::Forbidden => write!(f, "Forbidden"),
            Outcome::NotFound => write!(f, "NotFound"),
        }
    }
}

/// 控制器构造时可以取用的协作者。
#[derive(Clone)]
pub struct Services {
    pub config: Arc<Config>,
    pub database: Arc<dyn Database>,
    /// 只有管理员请求才会打开会话。
    pub session: Option<Arc<dyn SessionStore>>,
}

pub trait PageController {
    /// 处理 GET：就地改写页面缓冲区。返回 `None` 表示按 200 输出页面。
    fn handle_get(self: Box<Self>, ctx: &RequestContext, output: &mut String) -> Option<Outcome>;

    /// 处理 POST：缓冲区初始为空，提示语由返回的 [`Outcome`] 携带。
    fn handle_post(self: Box<Self>, ctx: &RequestContext, output: &mut String) -> Outcome;
}

/// 动作表中的一项：绑定的模型方法、参数包以及两条提示语。
#[derive(Debug, Clone)]
struct PostAction {
    method: ModelMethod,
    args: ArgBag,
    msg_good: String,
    msg_bad: String,
}

pub struct BaseController {
    model: Box<dyn Model>,
    engine: TemplateEngine,
    post_actions: HashMap<String, PostAction>,
    admin_folder: String,
}

impl BaseController {
    pub fn new(model: Box<dyn Model>, config: &Config) -> Self {
        Self {
            model,
            engine: TemplateEngine::new(),
            post_actions: HashMap::new(),
            admin_folder: config.admin_folder().to_string(),
        }
    }

    pub fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    pub fn engine(&self) -> &TemplateEngine {
        &self.engine
    }

    pub fn admin_folder(&self) -> &str {
        &self.admin_folder
    }

    /// 合并所有页面共有的标签。
    ///
    /// 具体控制器若已经填充了额外样式表区域，其分隔标签已被移除，这里的删除就不会生效。
    pub fn handle_get(&mut self, ctx: &RequestContext, output: &mut String) {
        let year = this_year();
        let mut tags = vec![(TAG_BASEURL, self.model.base_url()), (TAG_THISYEAR, year.as_str())];
        if ctx.is_admin() {
            tags.push((TAG_ADMINFOLDER, self.admin_folder.as_str()));
        }
        self.engine.parse_tags(&tags, output);

        self.engine
            .remove_logic_tag(TAG_EXTRASTYLESHEETS, TAG_EXTRASTYLESHEETS_END, output);

        if !ctx.is_admin() {
            self.engine
                .remove_logic_tag(TAG_ADMINSTYLESHEET, TAG_ADMINSTYLESHEET_END, output);
            self.engine.replace_tag(TAG_ADMINFOLDER, "", output);
        }
    }

    /// 默认 POST 处理：不使用页面模板，直接分发动作。
    pub fn handle_post(&mut self, ctx: &RequestContext, output: &mut String) -> Outcome {
        output.clear();
        self.do_post_action(ctx)
    }

    /// 注册一个 POST 动作。同名动作后注册者覆盖先注册者。
    pub fn define_post_action(
        &mut self,
        name: &str,
        method: ModelMethod,
        msg_good: &str,
        msg_bad: &str,
        args: ArgBag,
    ) {
        let action = PostAction {
            method,
            args,
            msg_good: msg_good.to_string(),
            msg_bad: msg_bad.to_string(),
        };
        if self.post_actions.insert(name.to_string(), action).is_some() {
            debug!("POST动作{}被重新注册，旧的定义已被覆盖", name);
        }
    }

    /// 按 `mode` 字段查找并执行动作；未注册的动作一律返回 `BadRequest("")`。
    pub fn do_post_action(&mut self, ctx: &RequestContext) -> Outcome {
        let mode = ctx.post_var(MODE_FIELD).unwrap_or_default();
        let action = match self.post_actions.get(&mode) {
            Some(action) => action,
            None => {
                warn!("[ID{}]未注册的POST动作：'{}'", ctx.id(), mode);
                return Outcome::BadRequest(String::new());
            }
        };

        info!("[ID{}]执行POST动作：{}", ctx.id(), mode);
        if self.model.invoke(action.method, &action.args) {
            Outcome::Success(action.msg_good.clone())
        } else {
            Outcome::BadRequest(action.msg_bad.clone())
        }
    }
}

impl PageController for BaseController {
    fn handle_get(mut self: Box<Self>, ctx: &RequestContext, output: &mut String) -> Option<Outcome> {
        BaseController::handle_get(&mut self, ctx, output);
        None
    }

    fn handle_post(mut self: Box<Self>, ctx: &RequestContext, output: &mut String) -> Outcome {
        BaseController::handle_post(&mut self, ctx, output)
    }
}
