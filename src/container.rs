//! # PPM 容器编解码模块
//!
//! 读写二进制 P6 像素图：文本文件头 (魔数、宽、高、最大通道值) 之后紧跟
//! `width * height * 3` 个按扫描顺序交错排列的 RGB 字节，无行填充。
//! 像素字节不做任何通道重排或位深转换，隐写算法直接在原始字节上操作。

use crate::constants::{CHANNELS, PPM_MAGIC, PPM_MAX_VALUE};
use crate::error::StegoError;
use image::RgbImage;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

// 文件头中单个字段的最大长度，防止畸形输入无限读取。
const MAX_TOKEN_LEN: usize = 32;

/// 内存中的 P6 图像：尺寸加上扁平的像素字节序列。
///
/// 始终满足 `pixels.len() == width * height * 3`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelMap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelMap {
    /// 由尺寸和像素字节构造图像。
    ///
    /// # Errors
    ///
    /// 宽或高为 0，或像素字节数与 `width * height * 3` 不一致时返回 [`StegoError::Format`]。
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, StegoError> {
        let expected = byte_len(width, height)?;
        if pixels.len() != expected {
            return Err(StegoError::format(format!(
                "{width}x{height} image needs {expected} pixel bytes, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 按扫描顺序排列的像素字节。
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// 可变的像素字节视图。长度固定，不会破坏尺寸不变量。
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// 隐写容量：可存储的 bit 数，等于像素字节总数。
    pub fn capacity(&self) -> usize {
        self.pixels.len()
    }

    /// 从任意缓冲读取源解析 P6 图像。
    ///
    /// 文件头字段以空白分隔，字段之间允许 `#` 注释。最大通道值只读取不校验，
    /// 其后恰好一个空白字节之后即为像素数据。只读取 `width * height * 3` 个字节，
    /// 多余的尾部字节被忽略。
    ///
    /// # Errors
    ///
    /// * 魔数不是 `P6`、宽高不是正整数、像素数据不足时返回 [`StegoError::Format`]。
    /// * 底层读取失败时返回 [`StegoError::Io`]。
    pub fn read_from<R: BufRead>(mut reader: R) -> Result<Self, StegoError> {
        let magic = read_token(&mut reader, "magic number")?;
        if magic != PPM_MAGIC {
            return Err(StegoError::format(format!(
                "unsupported magic number '{magic}', only {PPM_MAGIC} is supported"
            )));
        }

        let width = read_dimension(&mut reader, "width")?;
        let height = read_dimension(&mut reader, "height")?;
        read_token(&mut reader, "max color value")?;

        let expected = byte_len(width, height)?;
        let mut pixels = Vec::new();
        reader.take(expected as u64).read_to_end(&mut pixels)?;
        if pixels.len() < expected {
            return Err(StegoError::format(format!(
                "truncated pixel data: expected {expected} bytes, found {}",
                pixels.len()
            )));
        }

        Self::new(width, height, pixels)
    }

    /// 打开并解析磁盘上的 P6 图像。文件句柄在任何返回路径上都会被释放。
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StegoError> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }

    /// 将文件头和原始像素字节写入 `writer`，不附加任何填充或元数据。
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), StegoError> {
        write!(
            writer,
            "{PPM_MAGIC}\n{} {}\n{PPM_MAX_VALUE}\n",
            self.width, self.height
        )?;
        writer.write_all(&self.pixels)?;
        writer.flush()?;
        Ok(())
    }

    /// 创建或覆盖 `path` 处的文件。
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StegoError> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }
}

impl TryFrom<RgbImage> for PixelMap {
    type Error = StegoError;

    fn try_from(image: RgbImage) -> Result<Self, Self::Error> {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw())
    }
}

fn byte_len(width: u32, height: u32) -> Result<usize, StegoError> {
    if width == 0 || height == 0 {
        return Err(StegoError::format(format!(
            "dimensions must be positive, got {width}x{height}"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or_else(|| StegoError::format(format!("{width}x{height} image is too large")))
}

fn read_dimension<R: BufRead>(reader: &mut R, name: &str) -> Result<u32, StegoError> {
    let token = read_token(reader, name)?;
    match token.parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(StegoError::format(format!(
            "{name} must be a positive integer, got '{token}'"
        ))),
    }
}

fn next_byte<R: BufRead>(reader: &mut R) -> Result<Option<u8>, StegoError> {
    let byte = match reader.fill_buf()? {
        [] => return Ok(None),
        [first, ..] => *first,
    };
    reader.consume(1);
    Ok(Some(byte))
}

/// 读取一个文件头字段，并消费紧随其后的单个空白字节。
fn read_token<R: BufRead>(reader: &mut R, name: &str) -> Result<String, StegoError> {
    let mut token = Vec::new();

    while let Some(byte) = next_byte(reader)? {
        match byte {
            b'#' if token.is_empty() => {
                let mut comment = Vec::new();
                reader.read_until(b'\n', &mut comment)?;
            }
            b if b.is_ascii_whitespace() => {
                if !token.is_empty() {
                    break;
                }
            }
            b => {
                token.push(b);
                if token.len() > MAX_TOKEN_LEN {
                    return Err(StegoError::format(format!("{name} field is too long")));
                }
            }
        }
    }

    if token.is_empty() {
        return Err(StegoError::format(format!("missing {name} in header")));
    }
    String::from_utf8(token)
        .map_err(|_| StegoError::format(format!("{name} field is not valid text")))
}
