// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

mod common;

use common::*;

#[cfg(test)]
mod security_tests {
    //! # 安全回归测试套件
    //!
    //! 覆盖范围包括：
    //! - 组件层级隔离（公共请求不能触达管理员控制器）
    //! - 模板路径遍历
    //! - 错误页不泄露内部路径
    //! - 畸形报文与表单

    use super::*;
    use std::fs;
    use tagpage::{App, Config, Exception, Request};

    /// 公共路径即使配置了管理员控制器，也只在公共层查找，结果是 400。
    #[test]
    fn test_public_path_cannot_reach_admin_controller() {
        let (_dir, app) = site();
        let response = get(&app, "/sneaky", None);
        assert_eq!(response.status_code(), 400);
        assert!(!body(&response).contains("hello"));
    }

    #[test]
    fn test_public_path_ignores_session_cookie() {
        let (_dir, app) = site();
        let id = session_id(&login(&app, ADMIN_PASS)).unwrap();

        let response = get(&app, "/sneaky", Some(&id));
        assert_eq!(response.status_code(), 400);
        assert!(response.cookie().is_none());
    }

    #[test]
    fn test_template_traversal_is_refused() {
        let (dir, _) = site();
        fs::write(dir.path().join("secret.tpl"), "top secret").unwrap();
        let config = Config::new()
            .with_template_root(&dir.path().to_string_lossy())
            .with_pages(vec![page("/leak", "Leak", Some("../secret"), "IndexPage")]);
        let app = App::new(config).unwrap();

        let response = get(&app, "/leak", None);
        assert_eq!(response.status_code(), 500);
        assert!(!body(&response).contains("top secret"));
    }

    #[test]
    fn test_missing_template_does_not_leak_paths() {
        let (dir, app) = site();
        fs::remove_file(dir.path().join("admin").join("template").join("login.tpl")).unwrap();

        let response = get(&app, "/admin/login", None);
        let html = body(&response);
        assert_eq!(response.status_code(), 500);
        assert!(!html.contains(&*dir.path().to_string_lossy()));
        assert!(!html.contains("login.tpl"));
    }

    #[test]
    fn test_missing_page_shell_is_server_error() {
        let (dir, app) = site();
        fs::remove_file(dir.path().join("template").join("page.tpl")).unwrap();
        assert_eq!(get(&app, "/", None).status_code(), 500);
        // POST 不加载模板，不受影响
        assert_eq!(post(&app, "/", None, "mode=x").status_code(), 400);
    }

    #[test]
    fn test_template_edits_are_picked_up() {
        let (dir, app) = site();
        assert!(body(&get(&app, "/", None)).contains("public home"));

        let index = dir.path().join("template").join("index.tpl");
        fs::write(&index, "edited home").unwrap();
        // 保证修改时间发生变化
        let later = std::time::SystemTime::now() + std::time::Duration::from_secs(5);
        fs::File::options()
            .write(true)
            .open(&index)
            .unwrap()
            .set_modified(later)
            .unwrap();

        assert!(body(&get(&app, "/", None)).contains("edited home"));
    }

    #[test]
    fn test_malformed_form_is_rejected() {
        let raw = raw("POST", "/admin/login", None, "mode=%zz");
        let err = Request::try_from(raw.as_bytes(), 1).unwrap_err();
        assert!(matches!(err, Exception::ValidationFailure(_)));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_malformed_request_line() {
        let attacks: [&[u8]; 4] = [
            b"GET /\r\n\r\n",
            b"GET / HTTP/2.0\r\n\r\n",
            b"DELETE / HTTP/1.1\r\n\r\n",
            b"GET / HTTP/1.1\r\nUser-Agent: \xff\xfe\r\n\r\n",
        ];
        for attack in attacks {
            let err = Request::try_from(attack, 1).unwrap_err();
            assert_eq!(err.status_code(), 400, "{}", err);
        }
    }

    #[test]
    fn test_crlf_in_form_does_not_reach_headers() {
        let (_dir, app) = site();
        let response = post(
            &app,
            "/admin/login",
            None,
            "mode=login&username=admin%0D%0ASet-Cookie:%20x=y&password=secret",
        );
        assert_eq!(response.status_code(), 400);
        assert!(response.cookie().is_none());
    }
}
