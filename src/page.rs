// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 页面编排
//!
//! 一次请求的完整流程：
//!
//! ```text
//! GET  : 外壳模板 page.tpl ─┬─ {PAGE}  ← 子模板（管理层优先，其次公共层）
//!                          └─ {TITLE} ← "站点名 :: 页面标题"
//!        → 工厂创建控制器 → handle_get(缓冲区) → 输出缓冲区
//! POST : 空缓冲区 → 工厂创建控制器 → handle_post(缓冲区) → 输出缓冲区 + 提示语
//! ```
//!
//! 其他方法不经过控制器，返回 `None`。

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use log::{debug, error, warn};

use crate::{
    cache::TemplateCache,
    config::Config,
    context::RequestContext,
    controller::Services,
    exception::Exception,
    factory::{ControllerFactory, ControllerResolver},
    param::*,
    template::TemplateEngine,
};

/// 从私有目录加载模板，带修改时间校验的 LRU 缓存。
pub struct TemplateLoader {
    root: PathBuf,
    admin_folder: String,
    cache: Mutex<TemplateCache>,
}

impl TemplateLoader {
    pub fn new(config: &Config) -> Self {
        Self {
            root: PathBuf::from(config.template_root()),
            admin_folder: config.admin_folder().to_string(),
            cache: Mutex::new(TemplateCache::from_capacity(config.template_cache_size())),
        }
    }

    fn public_dir(&self) -> PathBuf {
        self.root.join("template")
    }

    fn admin_dir(&self) -> PathBuf {
        self.root.join(&self.admin_folder).join("template")
    }

    /// 外壳模板 `template/page.tpl`。
    pub fn load_page_shell(&self) -> Result<Arc<str>, Exception> {
        let path = self.public_dir().join(PAGE_TEMPLATE);
        self.read(&path)
            .ok_or_else(|| Exception::TemplateNotFound(PAGE_TEMPLATE.to_string()))
    }

    /// 子模板：管理员请求先找 `<admin>/template/`，再找公共的 `template/`。
    pub fn load_sub_template(&self, name: &str, is_admin: bool) -> Result<Arc<str>, Exception> {
        let file = format!("{}{}", name, TEMPLATE_EXT);
        if file.contains("..") {
            warn!("拒绝加载可疑的模板名：{}", name);
            return Err(Exception::TemplateNotFound(file));
        }

        if is_admin {
            if let Some(content) = self.read(&self.admin_dir().join(&file)) {
                return Ok(content);
            }
        }
        self.read(&self.public_dir().join(&file))
            .ok_or(Exception::TemplateNotFound(file))
    }

    fn read(&self, path: &Path) -> Option<Arc<str>> {
        let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
        let key = path.to_string_lossy().to_string();

        let mut cache = match self.cache.lock() {
            Ok(lock) => lock,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(content) = cache.find(&key, modified) {
            debug!("模板缓存命中：{}", key);
            return Some(content);
        }

        match fs::read_to_string(path) {
            Ok(content) => {
                let content: Arc<str> = Arc::from(content);
                cache.push(&key, Arc::clone(&content), modified);
                Some(content)
            }
            Err(e) => {
                error!("读取模板{}失败：{}", key, e);
                None
            }
        }
    }
}

/// 编排结果：状态码与响应体。
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub status: u16,
    pub body: String,
}

pub struct Page<'a> {
    factory: ControllerFactory<'a>,
    loader: &'a TemplateLoader,
    services: &'a Services,
    engine: TemplateEngine,
}

impl<'a> Page<'a> {
    pub fn new(
        resolver: &'a ControllerResolver,
        loader: &'a TemplateLoader,
        services: &'a Services,
    ) -> Self {
        Self {
            factory: ControllerFactory::new(resolver),
            loader,
            services,
            engine: TemplateEngine::new(),
        }
    }

    /// 生成一个页面。`template` 为 `None` 时 GET 不加载任何模板，缓冲区从空串开始。
    pub fn serve(
        &self,
        title: &str,
        template: Option<&str>,
        controller: &str,
        namespace: Option<&str>,
        ctx: &RequestContext,
    ) -> Result<Option<Rendered>, Exception> {
        match ctx.method() {
            HttpRequestMethod::Get => self.serve_get(title, template, controller, namespace, ctx).map(Some),
            HttpRequestMethod::Post => self.serve_post(controller, namespace, ctx).map(Some),
            other => {
                debug!("[ID{}]{}请求不经过页面编排", ctx.id(), other);
                Ok(None)
            }
        }
    }

    fn serve_get(
        &self,
        title: &str,
        template: Option<&str>,
        controller: &str,
        namespace: Option<&str>,
        ctx: &RequestContext,
    ) -> Result<Rendered, Exception> {
        let mut output = String::new();
        if let Some(name) = template {
            output.push_str(&self.loader.load_page_shell()?);
            let sub = self.loader.load_sub_template(name, ctx.is_admin())?;
            let full_title = format!("{} :: {}", self.services.config.site_title(), title);
            // 先填入子模板，子模板中的 {TITLE} 随后一并替换
            self.engine.replace_tag(TAG_PAGE, &sub, &mut output);
            self.engine.replace_tag(TAG_TITLE, &full_title, &mut output);
        }

        let controller = self
            .factory
            .create_controller(controller, namespace, ctx.is_admin(), self.services)?;
        let outcome = controller.handle_get(ctx, &mut output);

        Ok(match outcome {
            Some(outcome) => {
                debug!("[ID{}]GET结果：{}", ctx.id(), outcome);
                output.push_str(outcome.message());
                Rendered {
                    status: outcome.status_code(),
                    body: output,
                }
            }
            None => Rendered {
                status: 200,
                body: output,
            },
        })
    }

    fn serve_post(
        &self,
        controller: &str,
        namespace: Option<&str>,
        ctx: &RequestContext,
    ) -> Result<Rendered, Exception> {
        let mut output = String::new();
        let controller = self
            .factory
            .create_controller(controller, namespace, ctx.is_admin(), self.services)?;
        let outcome = controller.handle_post(ctx, &mut output);
        debug!("[ID{}]POST结果：{}", ctx.id(), outcome);

        output.push_str(outcome.message());
        Ok(Rendered {
            status: outcome.status_code(),
            body: output,
        })
    }
}
