//! Module graph and project host for Cascade.
//!
//! A [`Project`] owns every file it has seen together with the dependency
//! edges between them:
//! - Requests are resolved through an ordered [`Resolver`] chain
//! - Sources come from a [`SourceLoader`]
//! - Walks are memoised by path, so diamond imports load once
//! - Invalidation follows reverse edges to every dependent
//! - Output is ordered by dependency tiers

mod config;
mod error;
mod loader;
mod node;
mod output;
mod project;
mod resolve;

pub use config::{Naming, ProjectConfig, ScopeMode};
pub use error::GraphError;
pub use loader::{FsLoader, MemoryLoader, SourceLoader};
pub use node::{ContentHash, GraphStats};
pub use output::OutputOptions;
pub use project::{DuplicatePath, Project, ProjectBuilder};
pub use resolve::{PathResolver, Resolution, ResolveContext, Resolver, resolver_fn};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`. Does nothing when
/// `RUST_LOG` is unset or on later calls.
/// 安装按 `RUST_LOG` 过滤的 `tracing` 订阅器；未设置 `RUST_LOG` 时不做任何事。
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
