// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 页面服务器
//!
//! 基于 Tokio 多线程运行时的页面服务器。
//! 核心功能包括：
//! - 每个连接一个任务，请求在任务内同步地走完分发管线
//! - 请求体按 `Content-Length` 读满，超过 `max_body_size` 时返回 413
//! - 后台管理控制台（CLI 指令交互），可生成口令哈希用于配置用户表

use tagpage::{password, request::check_length, App, Config, Exception, Request, Response};

use log::{debug, error, info};
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    runtime::Builder,
};

use std::{
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    sync::{
        atomic::{AtomicBool, AtomicU32, Ordering},
        Arc,
    },
    time::Instant,
};

const READ_CHUNK: usize = 1024;

/// # 程序入口点
///
/// 初始化日志、加载配置、构造应用并启动主事件循环。
fn main() {
    // 1. 初始化日志系统：通过外部 YAML 配置级别与输出目的地
    if let Err(e) = log4rs::init_file("config/log4rs.yaml", Default::default()) {
        eprintln!("无法初始化日志系统：{}", e);
    }

    // 2. 环境配置加载：从 TOML 文件读取运行参数
    let config = Config::from_toml("config/development.toml");
    info!("配置文件已载入");
    info!("模板根目录: {}", config.template_root());

    // 3. 异步运行时定制：根据配置文件分配工作线程数
    let runtime = match Builder::new_multi_thread()
        .worker_threads(config.worker_threads())
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("无法创建异步运行时：{}", e);
            return;
        }
    };

    // 4. 共享状态初始化：命名空间或页面配置有误时拒绝启动
    let app = match App::new(config) {
        Ok(app) => Arc::new(app),
        Err(e) => {
            error!("应用初始化失败：{}", e);
            return;
        }
    };

    runtime.block_on(serve(app));
}

async fn serve(app: Arc<App>) {
    // 网络层初始化：支持全地址监听 (0.0.0.0) 或本地回环监听 (127.0.0.1)
    let port: u16 = app.config().port();
    let address = match app.config().local() {
        true => Ipv4Addr::new(127, 0, 0, 1),
        false => Ipv4Addr::new(0, 0, 0, 0),
    };
    info!("服务端将在{}:{}上监听Socket连接", address, port);
    let socket = SocketAddrV4::new(address, port);

    let listener = match TcpListener::bind(socket).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("无法绑定端口：{}，错误：{}", port, e);
            return;
        }
    };
    info!("端口{}绑定完成", port);

    // 服务器状态与生命周期管理
    let shutdown_flag = Arc::new(AtomicBool::new(false));
    let active_connection = Arc::new(AtomicU32::new(0));

    // 启动交互式管理控制台任务
    tokio::spawn(console(
        Arc::clone(&app),
        Arc::clone(&shutdown_flag),
        Arc::clone(&active_connection),
    ));

    let mut id: u128 = 0;

    // 主事件循环 (Accept Loop)
    loop {
        if shutdown_flag.load(Ordering::SeqCst) {
            info!("主循环接收到停机指令，正在退出...");
            break;
        }

        let (mut stream, addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("接受连接失败：{}", e);
                continue;
            }
        };
        debug!("[ID{}]TCP连接已建立：{}", id, addr);

        let app = Arc::clone(&app);
        let active_connection = Arc::clone(&active_connection);
        tokio::spawn(async move {
            active_connection.fetch_add(1, Ordering::SeqCst);
            handle_connection(&mut stream, addr, id, &app).await;
            active_connection.fetch_sub(1, Ordering::SeqCst);
        });
        id += 1;
    }
}

/// 后台管理控制台。
async fn console(app: Arc<App>, shutdown_flag: Arc<AtomicBool>, active_connection: Arc<AtomicU32>) {
    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin);
    let mut input = String::new();
    loop {
        input.clear();
        match reader.read_line(&mut input).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let cmd = input.trim();
        let (name, arg) = cmd.split_once(' ').unwrap_or((cmd, ""));
        match name {
            "stop" => {
                shutdown_flag.store(true, Ordering::SeqCst);
                println!("停机指令已激活，服务器将在处理完下一个请求后关闭...");
                break;
            }
            "help" => {
                println!("== TagPage Help ==");
                println!("stop            - 发出停机信号");
                println!("status          - 查看当前服务器运行状态");
                println!("hash <password> - 生成口令哈希，用于配置文件的 users 表");
                println!("help            - 显示此帮助信息");
                println!("==================");
            }
            "status" => {
                println!("== TagPage 状态 ==");
                println!("当前活跃连接数: {}", active_connection.load(Ordering::SeqCst));
                println!("当前会话数: {}", app.sessions().active());
                println!("==================");
            }
            "hash" if !arg.is_empty() => match password::hash(arg) {
                Ok(hash) => println!("{}", hash),
                Err(e) => println!("生成哈希失败：{}", e),
            },
            _ => {
                println!("无效的命令：{}", cmd);
            }
        }
    }
}

/// # 连接处理器
///
/// 负责单个 TCP 流的生命周期，包括读取解析请求、执行分发管线、以及发送响应。
async fn handle_connection(stream: &mut TcpStream, addr: SocketAddr, id: u128, app: &App) {
    let max_body_size = app.config().max_body_size();
    let mut buffer = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    // 读满标头与 Content-Length 指定的请求体
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) => {
                if buffer.is_empty() {
                    return;
                }
                break;
            }
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
            Err(e) => {
                error!("[ID{}]读取TCPStream时遇到错误: {}", id, e);
                return;
            }
        }
        match check_length(&buffer, max_body_size) {
            Ok(Some(total)) if buffer.len() >= total => break,
            Ok(_) => {}
            Err(e) => {
                error!("[ID{}]请求超过上限{}字节", id, max_body_size);
                reject(stream, e, id).await;
                return;
            }
        }
    }
    debug!("[ID{}]HTTP请求接收完毕，共{}字节", id, buffer.len());

    let start_time = Instant::now();

    // 1. 协议解析阶段
    let request = match Request::try_from(&buffer, id) {
        Ok(req) => req,
        Err(e) => {
            error!("[ID{}]解析HTTP请求失败: {}", id, e);
            reject(stream, e, id).await;
            return;
        }
    };

    // 2. 分发管线
    let response = app.handle(&request, &addr.ip().to_string(), id);

    debug!(
        "[ID{}]HTTP响应构建完成，服务端用时{}ms。",
        id,
        start_time.elapsed().as_millis()
    );

    // 3. 访问日志
    info!(
        "[ID{}] {}, {}, {}, {}, {}, {}, ",
        id,
        request.version(),
        request.path(),
        request.method(),
        response.status_code(),
        response.information(),
        request.user_agent(),
    );

    let response_bytes = response.as_bytes();
    debug!("[ID{}]发送响应，长度: {}", id, response_bytes.len());
    let _ = stream.write_all(&response_bytes).await;
    let _ = stream.flush().await;
}

/// 请求无法进入分发管线时，按异常类别直接回复状态页。
async fn reject(stream: &mut TcpStream, e: Exception, id: u128) {
    let response = Response::from_status_code(e.status_code(), &[], id);
    info!("[ID{}] {}, {}", id, response.status_code(), response.information());
    let _ = stream.write_all(&response.as_bytes()).await;
    let _ = stream.flush().await;
}
