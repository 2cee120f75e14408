// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use log::debug;

use crate::{
    context::RequestContext,
    controller::{BaseController, Outcome, PageController, Services},
    exception::Exception,
    model::BasePageModel,
};

/// 找不到页面时使用。GET 仍然渲染页面，但结果总是 `NotFound`；POST 一律拒绝。
pub struct NotFoundPage {
    base: BaseController,
}

impl NotFoundPage {
    pub fn new(services: &Services) -> Self {
        let model = BasePageModel::new(services.config.base_url());
        Self {
            base: BaseController::new(Box::new(model), &services.config),
        }
    }

    pub fn construct(services: &Services) -> Result<Box<dyn PageController>, Exception> {
        Ok(Box::new(Self::new(services)))
    }
}

impl PageController for NotFoundPage {
    fn handle_get(mut self: Box<Self>, ctx: &RequestContext, output: &mut String) -> Option<Outcome> {
        debug!("[ID{}]页面不存在：{}", ctx.id(), ctx.path());
        self.base.handle_get(ctx, output);
        Some(Outcome::NotFound)
    }

    fn handle_post(self: Box<Self>, _ctx: &RequestContext, output: &mut String) -> Outcome {
        output.clear();
        Outcome::BadRequest(String::new())
    }
}
