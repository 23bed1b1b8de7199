//! # Dispatcher
//!
//! 紧急求助告警分发模块。
//!
//! 负责：
//! - 以触发位置为中心，按半径筛选直接联系人
//! - 无直接联系人在范围内时，回退到二度联系人
//! - 告警与通知在同一事务中写入，失败即回滚
//! - 读取并标记未读通知

pub mod dispatcher;
pub mod error;
pub mod events;
pub mod fanout;
pub mod inbox;
pub mod metrics;
pub mod stores;

mod transaction;

pub use contracts::{AlertStore, ContactDirectory, DistressEvent, InboxEntry};
pub use dispatcher::{create_dispatcher, DispatchReport, DispatcherBuilder, ProximityDispatcher};
pub use error::{DispatcherError, ErrorKind};
pub use fanout::{AlertPlan, FanoutPlanner, FanoutTier, PlannedAlert};
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use stores::{
    open_store, ConfiguredStore, FileAlertStore, FileStoreConfig, MemoryAlertStore,
    MemoryDirectory,
};
