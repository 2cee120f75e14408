// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 管理层控制器。都内嵌 [`AdminBase`]，并且都需要一个已打开的会话。

mod base;
mod index;
mod login;
mod password;

pub use base::AdminBase;
pub use index::AdminIndexPage;
pub use login::AdminLoginPage;
pub use password::AdminPasswordPage;

#[cfg(test)]
pub(crate) mod test_support {
    use std::{collections::HashMap, sync::Arc};

    use crate::{
        config::Config,
        context::RequestContext,
        controller::Services,
        database::Database,
        param::HttpRequestMethod,
        session::SessionStore,
    };

    pub fn services(database: Arc<dyn Database>, session: Arc<dyn SessionStore>) -> Services {
        Services {
            config: Arc::new(Config::new()),
            database,
            session: Some(session),
        }
    }

    pub fn post(fields: &[(&str, &str)]) -> RequestContext {
        let form: HashMap<String, String> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RequestContext::new(1, HttpRequestMethod::Post, "/admin/", "admin/", form)
    }

    pub fn get() -> RequestContext {
        RequestContext::new(1, HttpRequestMethod::Get, "/admin/", "admin/", HashMap::new())
    }
}
