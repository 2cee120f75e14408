// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use crate::{
    context::RequestContext,
    controller::{Outcome, PageController, Services},
    exception::Exception,
    model::{AdminPasswordPageModel, ArgBag, ModelMethod},
};

use super::AdminBase;

pub const PASSWORD_CHANGED: &str = "Password Changed!";
pub const PASSWORD_FAILED: &str = "Failed. Check passwords match.";

/// 修改口令页。
pub struct AdminPasswordPage {
    admin: AdminBase,
}

impl AdminPasswordPage {
    pub fn construct(services: &Services) -> Result<Box<dyn PageController>, Exception> {
        let model =
            AdminPasswordPageModel::new(services.config.base_url(), services.database.clone());
        Ok(Box::new(Self {
            admin: AdminBase::new(Box::new(model), services)?,
        }))
    }
}

impl PageController for AdminPasswordPage {
    fn handle_get(mut self: Box<Self>, ctx: &RequestContext, output: &mut String) -> Option<Outcome> {
        self.admin.handle_get(ctx, output);
        None
    }

    /// 注册 `changepassword` 动作后先重新生成会话 ID，再交给动作表分发。
    /// 无论修改成功与否，会话 ID 都会更换。
    fn handle_post(mut self: Box<Self>, ctx: &RequestContext, output: &mut String) -> Outcome {
        let mut args = ArgBag::new();
        args.insert("user", self.admin.session().get_var("user"));
        args.insert("currentpassword", ctx.post_var("cp"));
        args.insert("newpassword", ctx.post_var("np"));
        args.insert("confirmpassword", ctx.post_var("cnp"));

        self.admin.base_mut().define_post_action(
            "changepassword",
            ModelMethod::ChangePassword,
            PASSWORD_CHANGED,
            PASSWORD_FAILED,
            args,
        );

        self.admin.session().regenerate_id();

        self.admin.handle_post(ctx, output)
    }
}
