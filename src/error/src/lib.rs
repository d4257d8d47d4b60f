//! 游戏错误处理模块
//!
//! Only data-integrity problems are errors here. Blocked moves, empty
//! selections and unknown keys are ordinary control flow and never reach
//! this type.

use thiserror::Error;

/// Errors raised while building the game world from its data tables.
#[derive(Debug, Error)]
pub enum GameError {
    /// 模板不存在
    #[error("Unknown entity template: {0}")]
    UnknownTemplate(String),

    /// 模板引用了未注册的能力模块
    #[error("Template '{template}' lists unknown capability '{capability}'")]
    UnknownCapability { template: String, capability: String },

    /// 模板键重复注册（模板注册后只读）
    #[error("Template '{0}' is already defined")]
    DuplicateTemplate(String),

    /// 模板字段无效
    #[error("Invalid template '{key}': {reason}")]
    InvalidTemplate { key: String, reason: String },

    /// 模板 JSON 解析失败
    #[error("Template data error: {0}")]
    TemplateParse(#[from] serde_json::Error),

    /// 配置错误
    #[error("Config error: {0}")]
    Config(String),

    /// IO操作错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 地图层上没有可放置实体的空格子
    #[error("No free floor cell on depth {depth}")]
    NoFreeCell { depth: i32 },
}

pub type GameResult<T> = Result<T, GameError>;

/// 处理游戏错误并转换为用户友好的消息
pub fn handle_error(error: &GameError) -> String {
    match error {
        GameError::UnknownTemplate(key) => {
            format!("No entity named '{}' in the template data", key)
        }
        GameError::Io(e) => match e.kind() {
            std::io::ErrorKind::NotFound => "Data file not found".to_string(),
            std::io::ErrorKind::PermissionDenied => {
                "Permission denied reading data file".to_string()
            }
            _ => format!("IO error: {}", e),
        },
        _ => error.to_string(),
    }
}
