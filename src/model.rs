// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 模型层
//!
//! 控制器通过 [`Model`] 能力访问业务数据。POST 动作在注册时绑定一个 [`ModelMethod`]
//! 与一个参数包 [`ArgBag`]，分发时由 [`Model::invoke`] 统一解释执行。

use std::{collections::BTreeMap, sync::Arc};

use log::{debug, warn};

use crate::{
    database::{Database, QueryParams, SELECT_PASSWORD, UPDATE_PASSWORD},
    password,
};

/// POST 动作的参数包。值为 `None` 表示该字段在请求中缺失。
pub type ArgBag = BTreeMap<&'static str, Option<String>>;

/// 可被 POST 动作绑定的模型方法。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelMethod {
    ChangePassword,
}

pub trait Model: Send {
    fn base_url(&self) -> &str;

    fn check_credentials(&self, _username: &str, _password: &str) -> bool {
        false
    }

    /// 执行一个绑定的模型方法，返回是否成功。
    fn invoke(&mut self, method: ModelMethod, _args: &ArgBag) -> bool {
        warn!("模型不支持方法{:?}", method);
        false
    }
}

/// 所有页面共用的基础模型。
pub struct BasePageModel {
    base_url: String,
}

impl BasePageModel {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }
}

impl Model for BasePageModel {
    fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// 按用户名取出存储的哈希并校验口令。空用户名或空口令直接拒绝。
fn verify_user(database: &dyn Database, username: &str, password: &str) -> bool {
    if username.is_empty() || password.is_empty() {
        return false;
    }

    let params: QueryParams = vec![(":username", username.to_string())];
    let result = match database.run_query(SELECT_PASSWORD, &params) {
        Ok(result) => result,
        Err(e) => {
            warn!("查询用户{}失败：{}", username, e);
            return false;
        }
    };

    if result.num_rows() != 1 {
        debug!("用户{}不存在或不唯一", username);
        return false;
    }
    match result.row(0).and_then(|row| row.get("password")) {
        Some(hash) => password::verify(password, hash),
        None => false,
    }
}

fn field<'a>(args: &'a ArgBag, name: &str) -> Option<&'a str> {
    args.get(name).and_then(|value| value.as_deref())
}

/// 登录页模型。
pub struct AdminLoginPageModel {
    base: BasePageModel,
    database: Arc<dyn Database>,
}

impl AdminLoginPageModel {
    pub fn new(base_url: &str, database: Arc<dyn Database>) -> Self {
        Self {
            base: BasePageModel::new(base_url),
            database,
        }
    }
}

impl Model for AdminLoginPageModel {
    fn base_url(&self) -> &str {
        self.base.base_url()
    }

    fn check_credentials(&self, username: &str, password: &str) -> bool {
        verify_user(self.database.as_ref(), username, password)
    }
}

/// 修改口令页模型。
pub struct AdminPasswordPageModel {
    base: BasePageModel,
    database: Arc<dyn Database>,
}

impl AdminPasswordPageModel {
    pub fn new(base_url: &str, database: Arc<dyn Database>) -> Self {
        Self {
            base: BasePageModel::new(base_url),
            database,
        }
    }

    /// 依次校验：字段齐全、新口令与确认一致、当前口令正确；全部通过后写入新哈希。
    pub fn change_password(&self, args: &ArgBag) -> bool {
        let (user, current, new, confirm) = match (
            field(args, "user"),
            field(args, "currentpassword"),
            field(args, "newpassword"),
            field(args, "confirmpassword"),
        ) {
            (Some(u), Some(c), Some(n), Some(cn)) => (u, c, n, cn),
            _ => return false,
        };

        if new != confirm {
            return false;
        }

        if !self.check_credentials(user, current) {
            return false;
        }

        let hash = match password::hash(new) {
            Ok(hash) => hash,
            Err(_) => return false,
        };
        let params: QueryParams = vec![(":hash", hash), (":user", user.to_string())];
        match self.database.run_query(UPDATE_PASSWORD, &params) {
            Ok(_) => true,
            Err(e) => {
                warn!("更新用户{}的口令失败：{}", user, e);
                false
            }
        }
    }
}

impl Model for AdminPasswordPageModel {
    fn base_url(&self) -> &str {
        self.base.base_url()
    }

    fn check_credentials(&self, username: &str, password: &str) -> bool {
        verify_user(self.database.as_ref(), username, password)
    }

    fn invoke(&mut self, method: ModelMethod, args: &ArgBag) -> bool {
        match method {
            ModelMethod::ChangePassword => self.change_password(args),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MockDatabase, ResultSet, Row};
    use crate::exception::Exception;

    fn password_args(user: Option<&str>, cp: &str, np: &str, cnp: &str) -> ArgBag {
        let mut args = ArgBag::new();
        args.insert("user", user.map(str::to_string));
        args.insert("currentpassword", Some(cp.to_string()));
        args.insert("newpassword", Some(np.to_string()));
        args.insert("confirmpassword", Some(cnp.to_string()));
        args
    }

    fn db_with_user(hash: String) -> MockDatabase {
        let mut db = MockDatabase::new();
        db.expect_run_query()
            .withf(|sql, params| sql == SELECT_PASSWORD && params[0].1 == "admin")
            .returning(move |_, _| Ok(ResultSet::from_rows(vec![Row::new().with("password", &hash)])));
        db
    }

    #[test]
    fn test_base_model_rejects_everything() {
        let mut model = BasePageModel::new("http://x/");
        assert_eq!(model.base_url(), "http://x/");
        assert!(!model.check_credentials("a", "b"));
        assert!(!model.invoke(ModelMethod::ChangePassword, &ArgBag::new()));
    }

    #[test]
    fn test_check_credentials() {
        let db = db_with_user(password::hash("right").unwrap());
        let model = AdminLoginPageModel::new("/", Arc::new(db));
        assert!(model.check_credentials("admin", "right"));
        assert!(!model.check_credentials("admin", "wrong"));
    }

    #[test]
    fn test_empty_credentials_skip_database() {
        let mut db = MockDatabase::new();
        db.expect_run_query().never();
        let model = AdminLoginPageModel::new("/", Arc::new(db));
        assert!(!model.check_credentials("", "x"));
        assert!(!model.check_credentials("admin", ""));
    }

    #[test]
    fn test_database_failure_is_rejection() {
        let mut db = MockDatabase::new();
        db.expect_run_query()
            .returning(|_, _| Err(Exception::DatabaseError("down".into())));
        let model = AdminLoginPageModel::new("/", Arc::new(db));
        assert!(!model.check_credentials("admin", "x"));
    }

    #[test]
    fn test_change_password_missing_field() {
        let mut db = MockDatabase::new();
        db.expect_run_query().never();
        let mut model = AdminPasswordPageModel::new("/", Arc::new(db));
        let args = password_args(None, "old", "new", "new");
        assert!(!model.invoke(ModelMethod::ChangePassword, &args));
    }

    #[test]
    fn test_change_password_mismatch() {
        let mut db = MockDatabase::new();
        db.expect_run_query().never();
        let mut model = AdminPasswordPageModel::new("/", Arc::new(db));
        let args = password_args(Some("admin"), "old", "new", "other");
        assert!(!model.invoke(ModelMethod::ChangePassword, &args));
    }

    #[test]
    fn test_change_password_wrong_current() {
        let db = db_with_user(password::hash("old").unwrap());
        let mut model = AdminPasswordPageModel::new("/", Arc::new(db));
        let args = password_args(Some("admin"), "bad", "new", "new");
        assert!(!model.invoke(ModelMethod::ChangePassword, &args));
    }

    #[test]
    fn test_change_password_persists_new_hash() {
        let old = password::hash("old").unwrap();
        let mut db = MockDatabase::new();
        db.expect_run_query()
            .withf(|sql, _| sql == SELECT_PASSWORD)
            .times(1)
            .returning(move |_, _| Ok(ResultSet::from_rows(vec![Row::new().with("password", &old)])));
        db.expect_run_query()
            .withf(|sql, params| {
                sql == UPDATE_PASSWORD
                    && params[1].1 == "admin"
                    && password::verify("new", &params[0].1)
            })
            .times(1)
            .returning(|_, _| Ok(ResultSet::empty()));

        let mut model = AdminPasswordPageModel::new("/", Arc::new(db));
        let args = password_args(Some("admin"), "old", "new", "new");
        assert!(model.invoke(ModelMethod::ChangePassword, &args));
    }
}
