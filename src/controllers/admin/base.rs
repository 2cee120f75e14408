// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use std::sync::Arc;

use crate::{
    context::RequestContext,
    controller::{BaseController, Outcome, PageController, Services},
    exception::Exception,
    model::{BasePageModel, Model},
    param::{TAG_ADMINFOLDER, TAG_ADMINSTYLESHEET, TAG_ADMINSTYLESHEET_END},
    session::SessionStore,
};

/// 所有管理页面的公共部分：在 [`BaseController`] 之上持有会话，并处理管理员专用标签。
pub struct AdminBase {
    base: BaseController,
    session: Arc<dyn SessionStore>,
}

impl AdminBase {
    pub fn new(model: Box<dyn Model>, services: &Services) -> Result<Self, Exception> {
        let session = services
            .session
            .clone()
            .ok_or_else(|| Exception::ConstructionError("管理员控制器缺少会话".to_string()))?;
        Ok(Self {
            base: BaseController::new(model, &services.config),
            session,
        })
    }

    pub fn construct(services: &Services) -> Result<Box<dyn PageController>, Exception> {
        let model = BasePageModel::new(services.config.base_url());
        Ok(Box::new(Self::new(Box::new(model), services)?))
    }

    pub fn base(&self) -> &BaseController {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut BaseController {
        &mut self.base
    }

    pub fn session(&self) -> &dyn SessionStore {
        self.session.as_ref()
    }

    /// 先合并公共标签，再填入管理员目录并去掉管理员样式表的分隔标签（保留其内容）。
    pub fn handle_get(&mut self, ctx: &RequestContext, output: &mut String) {
        self.base.handle_get(ctx, output);

        let engine = *self.base.engine();
        engine.parse_tags(&[(TAG_ADMINFOLDER, self.base.admin_folder())], output);
        engine.remove_tags(&[TAG_ADMINSTYLESHEET, TAG_ADMINSTYLESHEET_END], output);
    }

    pub fn handle_post(&mut self, ctx: &RequestContext, output: &mut String) -> Outcome {
        self.base.handle_post(ctx, output)
    }
}

impl PageController for AdminBase {
    fn handle_get(mut self: Box<Self>, ctx: &RequestContext, output: &mut String) -> Option<Outcome> {
        AdminBase::handle_get(&mut self, ctx, output);
        None
    }

    fn handle_post(mut self: Box<Self>, ctx: &RequestContext, output: &mut String) -> Outcome {
        AdminBase::handle_post(&mut self, ctx, output)
    }
}
