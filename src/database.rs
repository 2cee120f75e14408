// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 持久化协作者
//!
//! 分发核心只通过 [`Database`] 这个不透明接口访问持久化层：
//! 执行带命名参数的查询，拿回一个结果集，再按行读取。
//!
//! [`MemoryDatabase`] 是服务器二进制默认使用的实现，只认识管理员模型发出的两条语句，
//! 用户数据来自配置文件中的 `[[users]]`。

use std::{collections::HashMap, sync::RwLock};

use log::{debug, warn};

use crate::{config::UserSeed, exception::Exception};

/// 按用户名查询口令哈希
pub const SELECT_PASSWORD: &str = "SELECT password FROM site_users WHERE username = :username";

/// 更新口令哈希
pub const UPDATE_PASSWORD: &str = "UPDATE site_users SET password = :hash WHERE username = :user";

/// 命名参数列表，例如 `[(":username", "admin")]`。
pub type QueryParams = Vec<(&'static str, String)>;

/// 结果集中的一行。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: HashMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: &str) -> Self {
        self.columns.insert(column.to_string(), value.to_string());
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }
}

/// 查询返回的结果集。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    rows: Vec<Row>,
}

impl ResultSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait Database: Send + Sync {
    fn run_query(&self, sql: &str, params: &QueryParams) -> Result<ResultSet, Exception>;
}

/// 以 `site_users` 表为模型的内存实现。
pub struct MemoryDatabase {
    users: RwLock<HashMap<String, String>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_seeds(seeds: &[UserSeed]) -> Self {
        let db = Self::new();
        for seed in seeds {
            db.insert_user(&seed.username, &seed.password_hash);
        }
        db
    }

    pub fn insert_user(&self, username: &str, password_hash: &str) {
        let mut users = match self.users.write() {
            Ok(lock) => lock,
            Err(poisoned) => {
                warn!("用户表写锁被污染，恢复并继续");
                poisoned.into_inner()
            }
        };
        users.insert(username.to_string(), password_hash.to_string());
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

fn param<'a>(params: &'a QueryParams, name: &str) -> Result<&'a str, Exception> {
    params
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.as_str())
        .ok_or_else(|| Exception::DatabaseError(format!("missing parameter {}", name)))
}

impl Database for MemoryDatabase {
    fn run_query(&self, sql: &str, params: &QueryParams) -> Result<ResultSet, Exception> {
        debug!("执行查询：{}", sql);
        match sql {
            SELECT_PASSWORD => {
                let username = param(params, ":username")?;
                let users = self
                    .users
                    .read()
                    .map_err(|_| Exception::DatabaseError("user table lock poisoned".into()))?;
                Ok(match users.get(username) {
                    Some(hash) => ResultSet::from_rows(vec![Row::new().with("password", hash)]),
                    None => ResultSet::empty(),
                })
            }
            UPDATE_PASSWORD => {
                let hash = param(params, ":hash")?;
                let username = param(params, ":user")?;
                let mut users = self
                    .users
                    .write()
                    .map_err(|_| Exception::DatabaseError("user table lock poisoned".into()))?;
                if let Some(stored) = users.get_mut(username) {
                    *stored = hash.to_string();
                }
                Ok(ResultSet::empty())
            }
            _ => Err(Exception::DatabaseError("unsupported statement".into())),
        }
    }
}
