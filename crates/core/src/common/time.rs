/// 提供"当前交易日"的环境变量名
pub const TODAY_DATE_VAR: &str = "TODAY_DATE";

/// # Summary
/// 当前日期供给器接口，用于判定某次查询是否落在尚未收盘的交易日。
///
/// 所有的查询服务必须通过此接口获取当前日期，而不是直接读取系统时钟，
/// 以便回放和测试时指定任意"今天"。
pub trait TodayProvider: Send + Sync {
    /// 返回当前日期字符串，未配置时返回 None
    fn today(&self) -> Option<String>;

    /// 判断请求的日期字符串是否与当前日期完全相等
    fn is_today(&self, date: &str) -> bool {
        self.today().as_deref() == Some(date)
    }
}

/// # Summary
/// 固定值日期供给器，值在构造时确定。
pub struct FixedToday {
    date: Option<String>,
}

impl FixedToday {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
        }
    }

    /// 不设置当前日期，所有查询都不会被视为"今天"
    pub fn unset() -> Self {
        Self { date: None }
    }
}

impl TodayProvider for FixedToday {
    fn today(&self) -> Option<String> {
        self.date.clone()
    }
}

/// # Summary
/// 基于环境变量的日期供给器。
///
/// # Invariants
/// - 每次调用都重新读取环境变量，外部调度器可在运行期间推进日期。
pub struct EnvToday {
    var: String,
}

impl EnvToday {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvToday {
    fn default() -> Self {
        Self::new(TODAY_DATE_VAR)
    }
}

impl TodayProvider for EnvToday {
    fn today(&self) -> Option<String> {
        std::env::var(&self.var).ok().filter(|v| !v.is_empty())
    }
}
