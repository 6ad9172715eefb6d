//! # ppm_hide 库
//!
//! 本库包含 PPM 图像 LSB 隐写工具的核心逻辑：
//! * [`container`] 读写二进制 P6 像素图；
//! * [`steganography`] 把文本 (加结束标记) 写入像素字节最低位，并按标记恢复；
//! * [`operations`] 组合二者，提供基于文件路径的操作。

// 声明库包含的所有模块。

pub mod cli;
pub mod constants;
pub mod container;
pub mod error;
pub mod handler;
pub mod operations;
pub mod steganography;

pub use container::PixelMap;
pub use error::StegoError;
pub use operations::{capacity, create_sample_image, extract, hide, sample_image, Capacity};
pub use steganography::{Extraction, Sentinel};
