// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use log::warn;

use crate::{
    context::RequestContext,
    controller::{Outcome, PageController, Services},
    exception::Exception,
    model::BasePageModel,
    param::TAG_USERNAME,
};

use super::AdminBase;

/// 管理首页。未登录时返回 `Forbidden`，登录后显示当前用户名。
pub struct AdminIndexPage {
    admin: AdminBase,
}

impl AdminIndexPage {
    pub fn construct(services: &Services) -> Result<Box<dyn PageController>, Exception> {
        let model = BasePageModel::new(services.config.base_url());
        Ok(Box::new(Self {
            admin: AdminBase::new(Box::new(model), services)?,
        }))
    }
}

impl PageController for AdminIndexPage {
    fn handle_get(mut self: Box<Self>, ctx: &RequestContext, output: &mut String) -> Option<Outcome> {
        let user = match self.admin.session().get_var("user") {
            Some(user) => user,
            None => {
                warn!("[ID{}]未登录用户访问管理首页", ctx.id());
                output.clear();
                return Some(Outcome::Forbidden);
            }
        };

        self.admin
            .base()
            .engine()
            .replace_tag(TAG_USERNAME, &user, output);
        self.admin.handle_get(ctx, output);
        None
    }

    fn handle_post(mut self: Box<Self>, ctx: &RequestContext, output: &mut String) -> Outcome {
        self.admin.handle_post(ctx, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        controllers::admin::test_support, database::MemoryDatabase, session::MockSessionStore,
    };
    use mockall::predicate::eq;
    use std::sync::Arc;

    #[test]
    fn test_forbidden_without_login() {
        let mut session = MockSessionStore::new();
        session.expect_get_var().with(eq("user")).return_const(None);
        let services = test_support::services(Arc::new(MemoryDatabase::new()), Arc::new(session));

        let mut output = "Welcome {USERNAME}".to_string();
        let outcome = AdminIndexPage::construct(&services)
            .unwrap()
            .handle_get(&test_support::get(), &mut output);

        assert_eq!(outcome, Some(Outcome::Forbidden));
        assert_eq!(outcome.map(|o| o.status_code()), Some(403));
        assert!(output.is_empty());
    }

    #[test]
    fn test_shows_username() {
        let mut session = MockSessionStore::new();
        session
            .expect_get_var()
            .with(eq("user"))
            .return_const(Some("admin".to_string()));
        let services = test_support::services(Arc::new(MemoryDatabase::new()), Arc::new(session));

        let mut output = "Welcome {USERNAME} to {ADMINFOLDER}".to_string();
        let outcome = AdminIndexPage::construct(&services)
            .unwrap()
            .handle_get(&test_support::get(), &mut output);

        assert_eq!(outcome, None);
        assert_eq!(output, "Welcome admin to admin/");
    }
}
