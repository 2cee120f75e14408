// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 会话协作者
//!
//! 控制器只通过 [`SessionStore`] 使用会话：登录、登出、读写变量、重新生成会话 ID。
//!
//! - [`SessionManager`]：进程级的会话表，`Mutex` 保护，按过期时间淘汰。
//! - [`Session`]：绑定到某个请求 Cookie 的句柄，生命周期与请求相同。
//!   请求结束后由调用方读取 [`Session::cookie_header`] 决定是否下发 `Set-Cookie`。

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use log::{debug, info, warn};
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
pub trait SessionStore: Send + Sync {
    fn do_login(&self, username: &str);
    fn do_logout(&self);
    fn get_var(&self, name: &str) -> Option<String>;
    fn set_var(&self, name: &str, value: &str);
    fn regenerate_id(&self);
}

struct SessionData {
    vars: HashMap<String, String>,
    last_seen: Instant,
}

pub struct SessionManager {
    sessions: Mutex<HashMap<String, SessionData>>,
    expiry: Duration,
}

impl SessionManager {
    pub fn new(expiry: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            expiry,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionData>> {
        match self.sessions.lock() {
            Ok(lock) => lock,
            Err(poisoned) => {
                warn!("会话表锁被污染，恢复并继续");
                poisoned.into_inner()
            }
        }
    }

    /// 淘汰过期会话，返回被淘汰的数量。
    pub fn purge_expired(&self) -> usize {
        let expiry = self.expiry;
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, data| data.last_seen.elapsed() < expiry);
        before - sessions.len()
    }

    /// 当前存活的会话数量。
    pub fn active(&self) -> usize {
        self.lock().len()
    }

    /// 若会话存在且未过期，刷新其活跃时间并返回 true。
    fn touch(&self, id: &str) -> bool {
        let mut sessions = self.lock();
        let alive = match sessions.get(id) {
            Some(data) => data.last_seen.elapsed() < self.expiry,
            None => return false,
        };
        if alive {
            if let Some(data) = sessions.get_mut(id) {
                data.last_seen = Instant::now();
            }
        } else {
            sessions.remove(id);
        }
        alive
    }
}

/// 请求级会话句柄。
pub struct Session {
    manager: Arc<SessionManager>,
    id: Mutex<Option<String>>,
    original_id: Option<String>,
    ip: String,
    user_agent: String,
}

impl Session {
    /// 根据请求携带的会话 Cookie 打开会话。Cookie 无效或已过期时以空会话开始。
    pub fn open(
        manager: Arc<SessionManager>,
        cookie: Option<&str>,
        ip: &str,
        user_agent: &str,
    ) -> Self {
        let purged = manager.purge_expired();
        if purged > 0 {
            debug!("淘汰了{}个过期会话", purged);
        }
        let original_id = cookie
            .filter(|id| manager.touch(id))
            .map(|id| id.to_string());
        Self {
            manager,
            id: Mutex::new(original_id.clone()),
            original_id,
            ip: ip.to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    fn current_id(&self) -> MutexGuard<'_, Option<String>> {
        match self.id.lock() {
            Ok(lock) => lock,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn id(&self) -> Option<String> {
        self.current_id().clone()
    }

    /// 会话 ID 在本次请求中发生变化时返回需要下发的 `Set-Cookie` 值。
    pub fn cookie_header(&self, name: &str, path: &str, max_age: u64) -> Option<String> {
        let current = self.id();
        if current == self.original_id {
            return None;
        }
        Some(match current {
            Some(id) => format!(
                "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite=Strict",
                name, id, path, max_age
            ),
            None => format!("{}=; Path={}; Max-Age=0; HttpOnly; SameSite=Strict", name, path),
        })
    }
}

impl SessionStore for Session {
    /// 客户端带来的会话 ID 先被更换，再写入登录信息。
    fn do_login(&self, username: &str) {
        self.regenerate_id();
        self.set_var("user", username);
        self.set_var("ip", &self.ip);
        self.set_var("ua", &self.user_agent);
        info!("用户{}登录成功", username);
    }

    fn do_logout(&self) {
        let mut id = self.current_id();
        if let Some(old) = id.take() {
            self.manager.lock().remove(&old);
        }
    }

    fn get_var(&self, name: &str) -> Option<String> {
        let id = self.current_id();
        let id = id.as_ref()?;
        self.manager
            .lock()
            .get(id)
            .and_then(|data| data.vars.get(name).cloned())
    }

    fn set_var(&self, name: &str, value: &str) {
        let mut id = self.current_id();
        let key = id.get_or_insert_with(|| Uuid::new_v4().to_string()).clone();
        let mut sessions = self.manager.lock();
        let data = sessions.entry(key).or_insert_with(|| SessionData {
            vars: HashMap::new(),
            last_seen: Instant::now(),
        });
        data.vars.insert(name.to_string(), value.to_string());
        data.last_seen = Instant::now();
    }

    fn regenerate_id(&self) {
        let mut id = self.current_id();
        let old = match id.as_ref() {
            Some(old) => old.clone(),
            None => return,
        };
        let fresh = Uuid::new_v4().to_string();
        let mut sessions = self.manager.lock();
        if let Some(data) = sessions.remove(&old) {
            sessions.insert(fresh.clone(), data);
        }
        *id = Some(fresh);
    }
}
