/// P6 (二进制 RGB 像素图) 文件头中的魔数。
pub const PPM_MAGIC: &str = "P6";

/// 写入文件头的最大通道值。读取时只跳过，不做校验。
pub const PPM_MAX_VALUE: u32 = 255;

/// 每个像素的颜色通道数 (R, G, B)，行与行之间没有填充。
pub const CHANNELS: usize = 3;

/// 每个字符编码为 8 bits，每个像素字节的最低位存储 1 bit，
/// 因此每个字符占用 8 个像素字节。
pub const BITS_PER_CHAR: usize = 8;

/// 默认的结束标记，隐写时追加在文本之后，恢复时遇到它即停止。
pub const DEFAULT_SENTINEL: &str = "###END###";

/// `sample` 子命令默认生成的图像文件名。
pub const DEFAULT_SAMPLE_PATH: &str = "sample.ppm";

/// `sample` 子命令默认生成的正方形图像边长 (像素)。
pub const DEFAULT_SAMPLE_SIZE: u32 = 100;

/// 未指定输出路径时，隐写结果图像的文件名前缀。
pub const DOCTORED_PREFIX: &str = "doctored_";
