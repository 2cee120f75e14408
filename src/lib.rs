pub mod app;
pub mod cache;
pub mod config;
pub mod context;
pub mod controller;
pub mod controllers;
pub mod database;
pub mod exception;
pub mod factory;
pub mod model;
pub mod page;
pub mod param;
pub mod password;
pub mod request;
pub mod resolver;
pub mod response;
pub mod session;
pub mod template;
pub mod util;

pub use app::App;
pub use cache::TemplateCache;
pub use config::Config;
pub use controller::{BaseController, Outcome, PageController, Services};
pub use exception::Exception;
pub use factory::{ControllerFactory, ControllerResolver};
pub use page::{Page, Rendered, TemplateLoader};
pub use param::{HttpEncoding, HttpRequestMethod, HttpVersion};
pub use request::Request;
pub use resolver::{NamespaceTable, Resolver, Tier};
pub use response::Response;
pub use template::TemplateEngine;
pub use util::HtmlBuilder;
