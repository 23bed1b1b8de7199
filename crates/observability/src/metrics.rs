//! 告警分发指标收集模块
//!
//! 记录每次分发的结果，并在内存中聚合，便于演练结束后输出摘要。

use std::collections::HashMap;

use metrics::{counter, gauge, histogram};

/// 记录一次成功分发
///
/// `tier` 取值 `direct` / `second_degree` / `none`。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_dispatch;
///
/// let report = dispatcher.dispatch(event).await?;
/// record_dispatch(report.tier.as_str(), report.notified_count, report.nearest_km);
/// ```
pub fn record_dispatch(tier: &str, notified: usize, nearest_km: Option<f64>) {
    counter!("safe_route_dispatch_total", "tier" => tier.to_string()).increment(1);
    counter!("safe_route_notifications_total").increment(notified as u64);
    histogram!("safe_route_recipients_per_alert").record(notified as f64);

    if let Some(distance) = nearest_km {
        gauge!("safe_route_nearest_recipient_km").set(distance);
        histogram!("safe_route_nearest_recipient_km_hist").record(distance);
    }
}

/// 记录分发失败
pub fn record_dispatch_failure(kind: &str) {
    counter!("safe_route_dispatch_failures_total", "kind" => kind.to_string()).increment(1);
}

/// 记录收件箱读取
pub fn record_inbox_read(count: usize) {
    counter!("safe_route_inbox_read_total").increment(count as u64);
}

/// 分发指标聚合器
#[derive(Debug, Clone, Default)]
pub struct AlertMetricsAggregator {
    /// 成功分发次数
    pub total_dispatches: u64,

    /// 通知总数
    pub total_notified: u64,

    /// 回退到二度联系人的次数
    pub fallback_dispatches: u64,

    /// 无人可通知的次数
    pub silent_dispatches: u64,

    /// 每次分发的收件人数
    pub recipient_stats: RunningStats,

    /// 最近收件人距离 (km)
    pub nearest_stats: RunningStats,

    /// 各类失败次数
    pub failure_counts: HashMap<String, u64>,
}

impl AlertMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, tier: &str, notified: usize, nearest_km: Option<f64>) {
        self.total_dispatches += 1;
        self.total_notified += notified as u64;
        match tier {
            "second_degree" => self.fallback_dispatches += 1,
            "none" => self.silent_dispatches += 1,
            _ => {}
        }

        self.recipient_stats.push(notified as f64);
        if let Some(distance) = nearest_km {
            self.nearest_stats.push(distance);
        }
    }

    /// 记录一次失败
    pub fn record_failure(&mut self, kind: &str) {
        *self.failure_counts.entry(kind.to_string()).or_insert(0) += 1;
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        let rate = |n: u64| {
            if self.total_dispatches > 0 {
                n as f64 / self.total_dispatches as f64 * 100.0
            } else {
                0.0
            }
        };
        MetricsSummary {
            total_dispatches: self.total_dispatches,
            total_notified: self.total_notified,
            fallback_dispatches: self.fallback_dispatches,
            silent_dispatches: self.silent_dispatches,
            fallback_rate: rate(self.fallback_dispatches),
            silent_rate: rate(self.silent_dispatches),
            recipients_per_alert: StatsSummary::from(&self.recipient_stats),
            nearest_km: StatsSummary::from(&self.nearest_stats),
            failure_counts: self.failure_counts.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_dispatches: u64,
    pub total_notified: u64,
    pub fallback_dispatches: u64,
    pub silent_dispatches: u64,
    pub fallback_rate: f64,
    pub silent_rate: f64,
    pub recipients_per_alert: StatsSummary,
    pub nearest_km: StatsSummary,
    pub failure_counts: HashMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Alert Dispatch Summary ===")?;
        writeln!(f, "Dispatches: {}", self.total_dispatches)?;
        writeln!(f, "Notifications: {}", self.total_notified)?;
        writeln!(
            f,
            "Second-degree fallbacks: {} ({:.2}%)",
            self.fallback_dispatches, self.fallback_rate
        )?;
        writeln!(
            f,
            "Nobody in range: {} ({:.2}%)",
            self.silent_dispatches, self.silent_rate
        )?;
        writeln!(f, "Recipients per alert: {}", self.recipients_per_alert)?;
        writeln!(f, "Nearest recipient (km): {}", self.nearest_km)?;

        if !self.failure_counts.is_empty() {
            writeln!(f, "Failures:")?;
            let mut kinds: Vec<_> = self.failure_counts.iter().collect();
            kinds.sort();
            for (kind, count) in kinds {
                writeln!(f, "  {}: {}", kind, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计 (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
