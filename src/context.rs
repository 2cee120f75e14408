// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 请求上下文：控制器在处理阶段能看到的全部请求信息。
//!
//! 管理员标志在构造时由请求路径一次性推导，请求生命周期内不可变。

use std::collections::HashMap;

use crate::param::HttpRequestMethod;

#[derive(Debug, Clone)]
pub struct RequestContext {
    id: u128,
    method: HttpRequestMethod,
    path: String,
    is_admin: bool,
    form: HashMap<String, String>,
}

impl RequestContext {
    pub fn new(
        id: u128,
        method: HttpRequestMethod,
        path: &str,
        admin_folder: &str,
        form: HashMap<String, String>,
    ) -> Self {
        Self {
            id,
            method,
            path: path.to_string(),
            is_admin: is_admin_path(path, admin_folder),
            form,
        }
    }

    pub fn id(&self) -> u128 {
        self.id
    }

    pub fn method(&self) -> HttpRequestMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// 读取一个 POST 字段。
    pub fn post_var(&self, name: &str) -> Option<String> {
        self.form.get(name).cloned()
    }
}

/// 路径（去掉开头的 `/`）以管理员目录开头即视为管理员请求。
pub fn is_admin_path(path: &str, admin_folder: &str) -> bool {
    let folder = admin_folder.trim_matches('/');
    if folder.is_empty() {
        return false;
    }
    let path = path.split('?').next().unwrap_or(path).trim_start_matches('/');
    match path.strip_prefix(folder) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_detection() {
        assert!(is_admin_path("/admin/", "admin/"));
        assert!(is_admin_path("/admin", "admin/"));
        assert!(is_admin_path("/admin/login?x=1", "admin/"));
        assert!(!is_admin_path("/", "admin/"));
        assert!(!is_admin_path("/administrator", "admin/"));
        assert!(!is_admin_path("/blog/admin/", "admin/"));
        assert!(!is_admin_path("/admin/", ""));
    }

    #[test]
    fn test_post_var() {
        let mut form = HashMap::new();
        form.insert("mode".to_string(), "login".to_string());
        let ctx = RequestContext::new(1, HttpRequestMethod::Post, "/admin/login", "admin/", form);
        assert!(ctx.is_admin());
        assert_eq!(ctx.post_var("mode").as_deref(), Some("login"));
        assert_eq!(ctx.post_var("username"), None);
    }
}
