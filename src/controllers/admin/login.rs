// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use log::{info, warn};

use crate::{
    context::RequestContext,
    controller::{Outcome, PageController, Services},
    exception::Exception,
    model::AdminLoginPageModel,
    param::MODE_FIELD,
};

use super::AdminBase;

pub const LOGIN_FAILED: &str = "Incorrect username or password.";

/// 登录页。POST 支持 `login` 与 `logout` 两种模式，其余模式交给动作表（为空）。
pub struct AdminLoginPage {
    admin: AdminBase,
}

impl AdminLoginPage {
    pub fn construct(services: &Services) -> Result<Box<dyn PageController>, Exception> {
        let model = AdminLoginPageModel::new(services.config.base_url(), services.database.clone());
        Ok(Box::new(Self {
            admin: AdminBase::new(Box::new(model), services)?,
        }))
    }

    fn action_login(&self, ctx: &RequestContext) -> Outcome {
        let user = ctx.post_var("username").unwrap_or_default();
        let pass = ctx.post_var("password").unwrap_or_default();

        if !self.admin.base().model().check_credentials(&user, &pass) {
            warn!("[ID{}]用户{}登录失败", ctx.id(), user);
            return Outcome::BadRequest(LOGIN_FAILED.to_string());
        }

        self.admin.session().do_login(&user);
        Outcome::Success(String::new())
    }

    fn action_logout(&self, ctx: &RequestContext) -> Outcome {
        info!("[ID{}]用户登出", ctx.id());
        self.admin.session().do_logout();
        Outcome::Reset
    }
}

impl PageController for AdminLoginPage {
    fn handle_get(mut self: Box<Self>, ctx: &RequestContext, output: &mut String) -> Option<Outcome> {
        self.admin.handle_get(ctx, output);
        None
    }

    fn handle_post(mut self: Box<Self>, ctx: &RequestContext, output: &mut String) -> Outcome {
        match ctx.post_var(MODE_FIELD).as_deref() {
            Some("login") => {
                output.clear();
                self.action_login(ctx)
            }
            Some("logout") => {
                output.clear();
                self.action_logout(ctx)
            }
            _ => self.admin.handle_post(ctx, output),
        }
    }
}
