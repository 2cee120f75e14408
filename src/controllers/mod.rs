// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 内置控制器。
//!
//! 公共层：`IndexPage`、`NotFoundPage`；管理层：`AdminBasePage`、`AdminIndexPage`、
//! `AdminLoginPage`、`AdminPasswordPage`。管理层控制器只有在管理员请求中才能被解析到。

pub mod admin;
mod index;
mod not_found;

pub use admin::{AdminBase, AdminIndexPage, AdminLoginPage, AdminPasswordPage};
pub use index::IndexPage;
pub use not_found::NotFoundPage;

use log::info;

use crate::{
    exception::Exception,
    factory::{Constructor, ControllerResolver},
    param::DEFAULT_NAMESPACE,
    resolver::Tier,
};

/// 未匹配任何页面时使用的控制器。
pub const NOT_FOUND_CONTROLLER: &str = "NotFoundPage";

/// 把内置控制器登记到解析器的默认命名空间下。
pub fn install_defaults(resolver: &mut ControllerResolver) -> Result<(), Exception> {
    let builtins: [(Tier, &str, Constructor); 6] = [
        (Tier::Public, "IndexPage", IndexPage::construct),
        (Tier::Public, NOT_FOUND_CONTROLLER, NotFoundPage::construct),
        (Tier::Admin, "AdminBasePage", AdminBase::construct),
        (Tier::Admin, "AdminIndexPage", AdminIndexPage::construct),
        (Tier::Admin, "AdminLoginPage", AdminLoginPage::construct),
        (Tier::Admin, "AdminPasswordPage", AdminPasswordPage::construct),
    ];

    for (tier, name, constructor) in builtins {
        resolver.install(tier, &format!("{}{}", DEFAULT_NAMESPACE, name), constructor)?;
    }
    info!("已登记{}个内置控制器", builtins.len());
    Ok(())
}
