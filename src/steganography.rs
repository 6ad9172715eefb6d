use crate::constants::{BITS_PER_CHAR, DEFAULT_SENTINEL};
use crate::container::PixelMap;
use crate::error::StegoError;
use std::fmt;
use std::str::FromStr;

/// 追加在文本之后的结束标记。恢复时一旦解码出的文本以它结尾即停止。
///
/// 标记的每个字符都必须落在单字节范围内，且不能为空。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentinel(Vec<u8>);

impl Sentinel {
    pub fn new(marker: &str) -> Result<Self, StegoError> {
        if marker.is_empty() {
            return Err(StegoError::Sentinel("the marker must not be empty".into()));
        }
        Ok(Self(to_bytes(marker)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Sentinel {
    fn default() -> Self {
        Self(DEFAULT_SENTINEL.as_bytes().to_vec())
    }
}

impl FromStr for Sentinel {
    type Err = StegoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&from_bytes(&self.0))
    }
}

/// 恢复结果。
///
/// `Found` 表示匹配到了结束标记，文本已去掉标记；`Exhausted` 表示读完全部像素
/// 也没有遇到标记，其中是尽力解码出的原始文本 (可能是图像本身的噪声)。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Found(String),
    Exhausted(String),
}

impl Extraction {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Found(text) | Self::Exhausted(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Found(text) | Self::Exhausted(text) => text,
        }
    }

    /// 只有匹配到结束标记时才返回文本。
    pub fn found(self) -> Option<String> {
        match self {
            Self::Found(text) => Some(text),
            Self::Exhausted(_) => None,
        }
    }
}

/// 将文本按字符转为单字节序列 (码点即字节值)。
pub fn to_bytes(text: &str) -> Result<Vec<u8>, StegoError> {
    text.chars()
        .enumerate()
        .map(|(position, character)| {
            u8::try_from(character).map_err(|_| StegoError::Encoding {
                character,
                code: character as u32,
                position,
            })
        })
        .collect()
}

/// [`to_bytes`] 的逆操作：每个字节解码为同码点的字符。
pub fn from_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// 嵌入 `payload` 需要的 bit 数 (含结束标记)。
pub fn required_bits(payload: &str, sentinel: &Sentinel) -> usize {
    (payload.chars().count() + sentinel.len()) * BITS_PER_CHAR
}

/// 在 `capacity` 个像素字节中最多能隐藏的字符数。
pub fn max_payload_chars(capacity: usize, sentinel: &Sentinel) -> usize {
    (capacity / BITS_PER_CHAR).saturating_sub(sentinel.len())
}

/// 文本加结束标记，展开为高位在前的 bit 序列，每个元素为 0 或 1。
pub fn encode(payload: &str, sentinel: &Sentinel) -> Result<Vec<u8>, StegoError> {
    let mut bytes = to_bytes(payload)?;
    bytes.extend_from_slice(sentinel.as_bytes());

    Ok(bytes
        .iter()
        .flat_map(|&byte| (0..BITS_PER_CHAR).rev().map(move |shift| (byte >> shift) & 1))
        .collect())
}

/// 用 `bits` 依次替换 `pix` 前若干字节的最低位。
///
/// 先检查容量再修改：失败时 `pix` 保持原样。超出 `bits` 长度的字节不受影响。
pub fn modify(pix: &mut [u8], bits: &[u8]) -> Result<(), StegoError> {
    if bits.len() > pix.len() {
        return Err(StegoError::Capacity {
            required: bits.len(),
            available: pix.len(),
        });
    }

    for (byte, &bit) in pix.iter_mut().zip(bits) {
        *byte = (*byte & 0xFE) | (bit & 1);
    }

    Ok(())
}

/// 读取每个字节的最低位，按 8 位一组 (高位在前) 解码，直到文本以结束标记结尾。
///
/// 末尾不足 8 位的部分被丢弃。
pub fn recover(pix: &[u8], sentinel: &Sentinel) -> Extraction {
    let marker = sentinel.as_bytes();
    let mut buffer = Vec::with_capacity(pix.len() / BITS_PER_CHAR);

    for unit in pix.chunks_exact(BITS_PER_CHAR) {
        let byte = unit.iter().fold(0u8, |acc, &b| (acc << 1) | (b & 1));
        buffer.push(byte);

        if buffer.ends_with(marker) {
            buffer.truncate(buffer.len() - marker.len());
            return Extraction::Found(from_bytes(&buffer));
        }
    }

    Extraction::Exhausted(from_bytes(&buffer))
}

/// 返回隐藏了 `payload` 的新图像，`cover` 本身不被修改。
///
/// # Errors
///
/// * 文本含有超出单字节范围的字符时返回 [`StegoError::Encoding`]。
/// * 图像容量不足时返回 [`StegoError::Capacity`]。
pub fn embed(cover: &PixelMap, payload: &str, sentinel: &Sentinel) -> Result<PixelMap, StegoError> {
    let bits = encode(payload, sentinel)?;
    if bits.len() > cover.capacity() {
        return Err(StegoError::Capacity {
            required: bits.len(),
            available: cover.capacity(),
        });
    }

    let mut stego = cover.clone();
    modify(stego.pixels_mut(), &bits)?;
    Ok(stego)
}

pub fn extract(image: &PixelMap, sentinel: &Sentinel) -> Extraction {
    recover(image.pixels(), sentinel)
}
