//! 运行时配置
//!
//! 浏览器里没有进程环境变量，配置在构建时通过 `option_env!` 注入；
//! 未定义或无法解析的值一律回退到默认值。

use std::time::Duration;

use crate::gateway::RetryPolicy;

// =========================================================
// 默认值
// =========================================================

const DEFAULT_API_BASE: &str = "/api";
const DEFAULT_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;

/// 身份提供方配置
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityConfig {
    pub endpoint: String,
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// 后端 REST 根路径，例如 `/api` 或 `https://campus.example.com/api`
    pub api_base: String,
    /// 单次请求超时
    pub request_timeout: Duration,
    /// GET 请求的重试策略
    pub retry: RetryPolicy,
    pub identity: IdentityConfig,
    pub log_level: log::LevelFilter,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            retry: RetryPolicy {
                max_attempts: DEFAULT_RETRY_ATTEMPTS,
                ..RetryPolicy::default()
            },
            identity: IdentityConfig {
                endpoint: DEFAULT_IDENTITY_ENDPOINT.to_string(),
                api_key: String::new(),
            },
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

impl AppConfig {
    /// 从任意键值来源读取配置
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            api_base: non_empty("CAMPUS_API_BASE")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),

            request_timeout: non_empty("CAMPUS_TIMEOUT_MS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),

            retry: RetryPolicy {
                max_attempts: non_empty("CAMPUS_RETRY_ATTEMPTS")
                    .and_then(|v| v.trim().parse::<u32>().ok())
                    .filter(|n| *n >= 1)
                    .unwrap_or(defaults.retry.max_attempts),
                ..defaults.retry
            },

            identity: IdentityConfig {
                endpoint: non_empty("CAMPUS_IDENTITY_ENDPOINT")
                    .map(|v| v.trim().trim_end_matches('/').to_string())
                    .unwrap_or(defaults.identity.endpoint),
                api_key: non_empty("CAMPUS_IDENTITY_API_KEY").unwrap_or(defaults.identity.api_key),
            },

            log_level: non_empty("CAMPUS_LOG_LEVEL")
                .and_then(|v| v.trim().parse::<log::LevelFilter>().ok())
                .unwrap_or(defaults.log_level),
        }
    }

    /// 读取构建时注入的配置
    pub fn from_build_env() -> Self {
        Self::from_lookup(|key| {
            let value = match key {
                "CAMPUS_API_BASE" => option_env!("CAMPUS_API_BASE"),
                "CAMPUS_TIMEOUT_MS" => option_env!("CAMPUS_TIMEOUT_MS"),
                "CAMPUS_RETRY_ATTEMPTS" => option_env!("CAMPUS_RETRY_ATTEMPTS"),
                "CAMPUS_IDENTITY_ENDPOINT" => option_env!("CAMPUS_IDENTITY_ENDPOINT"),
                "CAMPUS_IDENTITY_API_KEY" => option_env!("CAMPUS_IDENTITY_API_KEY"),
                "CAMPUS_LOG_LEVEL" => option_env!("CAMPUS_LOG_LEVEL"),
                _ => None,
            };
            value.map(str::to_string)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api_base, "/api");
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup(&[
            ("CAMPUS_API_BASE", "https://campus.example.com/api/"),
            ("CAMPUS_TIMEOUT_MS", "2500"),
            ("CAMPUS_RETRY_ATTEMPTS", "5"),
            ("CAMPUS_LOG_LEVEL", "debug"),
        ]));
        assert_eq!(config.api_base, "https://campus.example.com/api");
        assert_eq!(config.request_timeout, Duration::from_millis(2500));
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.log_level, log::LevelFilter::Debug);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = AppConfig::from_lookup(lookup(&[
            ("CAMPUS_TIMEOUT_MS", "soon"),
            ("CAMPUS_RETRY_ATTEMPTS", "0"),
            ("CAMPUS_LOG_LEVEL", "loud"),
            ("CAMPUS_API_BASE", "  "),
        ]));
        assert_eq!(config, AppConfig::default());
    }
}
