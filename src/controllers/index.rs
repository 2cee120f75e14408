// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use crate::{
    context::RequestContext,
    controller::{BaseController, Outcome, PageController, Services},
    exception::Exception,
    model::BasePageModel,
};

/// 普通公共页面：只合并公共标签，没有 POST 动作。
pub struct IndexPage {
    base: BaseController,
}

impl IndexPage {
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

impl PageController for IndexPage {
    fn handle_get(mut self: Box<Self>, ctx: &RequestContext, output: &mut String) -> Option<Outcome> {
        self.base.handle_get(ctx, output);
        None
    }

    fn handle_post(mut self: Box<Self>, ctx: &RequestContext, output: &mut String) -> Outcome {
        self.base.handle_post(ctx, output)
    }
}
