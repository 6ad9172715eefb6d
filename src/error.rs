//! # 错误类型模块
//!
//! 库层面的所有失败都归入 [`StegoError`]。命令处理层 (`handler`) 再用
//! `anyhow::Context` 为其附加文件路径等上下文。

use std::io;
use thiserror::Error;

/// 隐写库的统一错误类型。
///
/// 每一种错误都会终止当前操作，库内部不做任何重试或恢复。
#[derive(Debug, Error)]
pub enum StegoError {
    /// 文件头或像素数据格式错误：魔数不符、尺寸无法解析、像素数据被截断等。
    #[error("Malformed PPM image: {0}")]
    Format(String),

    /// 文本加结束标记所需的 bit 数超过了图像的像素字节数。
    #[error(
        "Not enough space in the image to hide the text. Required: {required} bytes, Available: {available} bytes"
    )]
    Capacity { required: usize, available: usize },

    /// 字符超出单字节范围 (U+0000..=U+00FF)，无法按 8 bits 编码。
    #[error("Character {character:?} (U+{code:04X}) at position {position} cannot be encoded in a single byte")]
    Encoding {
        character: char,
        code: u32,
        position: usize,
    },

    /// 结束标记无效 (为空)。
    #[error("Invalid sentinel: {0}")]
    Sentinel(String),

    /// 底层读写失败，原样向上传递。
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl StegoError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }
}
