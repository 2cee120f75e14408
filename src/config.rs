use num_cpus;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use core::str;
use log::{error, warn};
use std::fs::File;
use std::io::prelude::*;

use crate::param::DEFAULT_NAMESPACE;

/// 命名空间前缀到组件根路径的映射项。按出现顺序注册。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NamespaceEntry {
    pub prefix: String,
    pub path: String,
}

/// 一个可访问的页面：请求路径 → (标题, 内容模板, 控制器)。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PageRoute {
    pub path: String,
    pub title: String,
    #[serde(default)]
    pub template: Option<String>,
    pub controller: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

/// 内存用户表的种子数据，`password_hash` 为 argon2 PHC 串。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserSeed {
    pub username: String,
    pub password_hash: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_template_root")]
    template_root: String,
    #[serde(default = "default_admin_folder")]
    admin_folder: String,
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default = "default_site_title")]
    site_title: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    worker_threads: usize,
    #[serde(default = "default_template_cache_size")]
    template_cache_size: usize,
    #[serde(default = "default_local")]
    local: bool,
    #[serde(default = "default_max_body_size")]
    max_body_size: usize,
    #[serde(default = "default_session_cookie")]
    session_cookie: String,
    #[serde(default = "default_session_expiry")]
    session_expiry: u64,
    #[serde(default = "default_namespaces")]
    namespaces: Vec<NamespaceEntry>,
    #[serde(default)]
    pages: Vec<PageRoute>,
    #[serde(default)]
    users: Vec<UserSeed>,
}

fn default_template_root() -> String {
    "private".to_string()
}

fn default_admin_folder() -> String {
    "admin/".to_string()
}

fn default_base_url() -> String {
    "http://localhost:7878/".to_string()
}

fn default_site_title() -> String {
    "TagPage".to_string()
}

fn default_port() -> u16 {
    7878
}

fn default_template_cache_size() -> usize {
    5
}

fn default_local() -> bool {
    true
}

fn default_max_body_size() -> usize {
    65536 // 64KB
}

fn default_session_cookie() -> String {
    "TagPageAdmin".to_string()
}

fn default_session_expiry() -> u64 {
    3600
}

fn default_namespaces() -> Vec<NamespaceEntry> {
    vec![NamespaceEntry {
        prefix: DEFAULT_NAMESPACE.to_string(),
        path: "src/controllers/".to_string(),
    }]
}

impl Config {
    pub fn new() -> Self {
        Self {
            template_root: default_template_root(),
            admin_folder: default_admin_folder(),
            base_url: default_base_url(),
            site_title: default_site_title(),
            port: default_port(),
            worker_threads: 0,
            template_cache_size: default_template_cache_size(),
            local: default_local(),
            max_body_size: default_max_body_size(),
            session_cookie: default_session_cookie(),
            session_expiry: default_session_expiry(),
            namespaces: default_namespaces(),
            pages: Vec::new(),
            users: Vec::new(),
        }
    }

    /// 读取配置文件。文件不存在或无法读取时记录错误并使用默认配置。
    pub fn from_toml(filename: &str) -> Self {
        let mut file = match File::open(filename) {
            Ok(f) => f,
            Err(e) => {
                error!("无法打开配置文件{}，使用默认配置：{}", filename, e);
                return Self::from_toml_str("");
            }
        };
        let mut str_val = String::new();
        if let Err(e) = file.read_to_string(&mut str_val) {
            error!("读取配置文件{}失败，使用默认配置：{}", filename, e);
            return Self::from_toml_str("");
        }
        Self::from_toml_str(&str_val)
    }

    pub fn from_toml_str(source: &str) -> Self {
        let mut raw_config: Config = match toml::from_str(source) {
            Ok(t) => t,
            Err(e) => {
                error!("无法成功从配置文件构建配置对象，使用默认配置：{}", e);
                Config::new()
            }
        };
        if raw_config.worker_threads == 0 {
            raw_config.worker_threads = num_cpus::get();
        }
        if raw_config.template_cache_size == 0 {
            warn!("template_cache_size被设置为0，但目前尚不支持禁用模板缓存，因此该值将被改为5。");
            raw_config.template_cache_size = default_template_cache_size();
        }
        if !raw_config.admin_folder.ends_with('/') {
            raw_config.admin_folder.push('/');
        }
        raw_config
    }

    /// 构造测试或嵌入场景使用的配置。
    pub fn with_template_root(mut self, root: &str) -> Self {
        self.template_root = root.to_string();
        self
    }

    pub fn with_pages(mut self, pages: Vec<PageRoute>) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_users(mut self, users: Vec<UserSeed>) -> Self {
        self.users = users;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn template_root(&self) -> &str {
        &self.template_root
    }

    pub fn admin_folder(&self) -> &str {
        &self.admin_folder
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn site_title(&self) -> &str {
        &self.site_title
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn template_cache_size(&self) -> usize {
        self.template_cache_size
    }

    pub fn local(&self) -> bool {
        self.local
    }

    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    pub fn session_cookie(&self) -> &str {
        &self.session_cookie
    }

    pub fn session_expiry(&self) -> u64 {
        self.session_expiry
    }

    pub fn namespaces(&self) -> &[NamespaceEntry] {
        &self.namespaces
    }

    pub fn pages(&self) -> &[PageRoute] {
        &self.pages
    }

    pub fn users(&self) -> &[UserSeed] {
        &self.users
    }

    /// 按请求路径查找页面（忽略查询串）。
    pub fn find_page(&self, path: &str) -> Option<&PageRoute> {
        let path = path.split('?').next().unwrap_or(path);
        self.pages.iter().find(|page| page.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        template_root = "site/private"
        admin_folder = "manage"
        site_title = "Example"
        worker_threads = 2

        [[namespaces]]
        prefix = "tagpage::controllers::"
        path = "src/controllers/"

        [[pages]]
        path = "/"
        title = "Home"
        template = "index"
        controller = "IndexPage"

        [[pages]]
        path = "/manage/login"
        title = "Login"
        template = "login"
        controller = "AdminLoginPage"
    "#;

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_toml_str(SAMPLE);
        assert_eq!(config.template_root(), "site/private");
        assert_eq!(config.admin_folder(), "manage/");
        assert_eq!(config.site_title(), "Example");
        assert_eq!(config.worker_threads(), 2);
        assert_eq!(config.pages().len(), 2);
        assert_eq!(config.port(), 7878);
    }

    #[test]
    fn test_find_page_ignores_query() {
        let config = Config::from_toml_str(SAMPLE);
        let page = config.find_page("/manage/login?next=/").unwrap();
        assert_eq!(page.controller, "AdminLoginPage");
        assert!(config.find_page("/missing").is_none());
    }

    #[test]
    fn test_invalid_toml_falls_back_to_defaults() {
        let config = Config::from_toml_str("port = \"not a number\"");
        assert_eq!(config.port(), 7878);
        assert_eq!(config.namespaces(), default_namespaces().as_slice());
        assert!(config.worker_threads() > 0);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("absent.toml");
        let config = Config::from_toml(&missing.to_string_lossy());
        assert_eq!(config.port(), 7878);
        assert_eq!(config.admin_folder(), "admin/");
        assert!(config.pages().is_empty());
        assert!(config.worker_threads() > 0);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("site.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = Config::from_toml(&path.to_string_lossy());
        assert_eq!(config.site_title(), "Example");
        assert_eq!(config.pages().len(), 2);
    }

    #[test]
    fn test_zero_cache_size_is_replaced() {
        let config = Config::from_toml_str("template_cache_size = 0");
        assert_eq!(config.template_cache_size(), 5);
    }
}
