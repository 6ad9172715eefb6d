//! # 基于文件路径的公共操作
//!
//! 将容器编解码与 bit 通道编解码组合成一次性的文件级操作。每次调用独占自己的
//! 图像缓冲，调用之间没有共享状态。

use crate::container::PixelMap;
use crate::error::StegoError;
use crate::steganography::{self, Extraction, Sentinel};
use image::{ImageBuffer, Rgb};
use std::path::Path;

/// 图像的隐写容量概况。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub width: u32,
    pub height: u32,
    /// 可用于存储 bit 的像素字节数。
    pub bytes: usize,
    /// 在给定结束标记下最多能隐藏的字符数。
    pub max_chars: usize,
}

/// 读取 `input_path` 的图像，隐藏 `text` 后写入 `output_path` (已存在则覆盖)。
///
/// 容量或编码检查失败时不会写出任何文件。
///
/// # Errors
///
/// 输入格式错误、容量不足、字符无法编码或读写失败时返回对应的 [`StegoError`]。
pub fn hide(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    text: &str,
    sentinel: &Sentinel,
) -> Result<(), StegoError> {
    let mut image = PixelMap::open(input_path)?;
    let bits = steganography::encode(text, sentinel)?;
    steganography::modify(image.pixels_mut(), &bits)?;
    image.save(output_path)
}

/// 从 `image_path` 的图像中恢复隐藏文本。
pub fn extract(image_path: impl AsRef<Path>, sentinel: &Sentinel) -> Result<Extraction, StegoError> {
    let image = PixelMap::open(image_path)?;
    Ok(steganography::extract(&image, sentinel))
}

/// 生成边长为 `size` 的确定性测试图像，像素 `(x, y)` 的值为
/// `(x mod 256, y mod 256, (x + y) mod 256)`。
pub fn sample_image(size: u32) -> Result<PixelMap, StegoError> {
    if size == 0 {
        return Err(StegoError::Format("sample size must be positive".into()));
    }
    let raster = ImageBuffer::from_fn(size, size, |x, y| {
        Rgb([x as u8, y as u8, (x as u8).wrapping_add(y as u8)])
    });
    PixelMap::try_from(raster)
}

/// 将 [`sample_image`] 的结果写入 `path`。
pub fn create_sample_image(path: impl AsRef<Path>, size: u32) -> Result<(), StegoError> {
    sample_image(size)?.save(path)
}

pub fn capacity(image_path: impl AsRef<Path>, sentinel: &Sentinel) -> Result<Capacity, StegoError> {
    let image = PixelMap::open(image_path)?;
    Ok(Capacity {
        width: image.width(),
        height: image.height(),
        bytes: image.capacity(),
        max_chars: steganography::max_payload_chars(image.capacity(), sentinel),
    })
}
