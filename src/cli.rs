//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use crate::constants::{DEFAULT_SAMPLE_PATH, DEFAULT_SAMPLE_SIZE};
use crate::steganography::Sentinel;
use clap::{Args, Parser};
use std::path::PathBuf;

/// 一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在二进制 PPM (P6) 图像中隐藏或恢复文本。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在二进制 PPM (P6) 图像中隐藏或恢复文本。\n文本之后追加结束标记，恢复时遇到该标记即停止。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 在 PPM 图像中隐藏文本。
    Hide(HideArgs),

    /// 从经过隐写的 PPM 图像中恢复隐藏的文本。
    Extract(ExtractArgs),

    /// 生成一张确定性的 PPM 测试图像。
    Sample(SampleArgs),

    /// 显示图像的隐写容量。
    Capacity(CapacityArgs),
}

/// 要隐藏的文本来源：直接给出，或从文件读取。
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct TextSource {
    /// 要隐藏的文本内容。
    #[arg(short, long)]
    pub text: Option<String>,

    /// 要隐藏的文本内容的文件路径。
    #[arg(short = 'f', long)]
    pub text_file: Option<PathBuf>,
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 用于隐写的输入图像文件路径 (P6 PPM)。
    #[arg(short, long)]
    pub image: PathBuf,

    #[command(flatten)]
    pub source: TextSource,

    /// 隐写完成后，保存结果图像的输出路径。默认为输入文件旁的 `doctored_<name>.ppm`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 目标文件已存在时强制覆盖。
    #[arg(long)]
    pub force: bool,

    /// 追加在文本之后的结束标记。
    #[arg(long, default_value_t = Sentinel::default())]
    pub sentinel: Sentinel,
}

/// 'extract' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// 已隐藏文本数据的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复文本后，保存文本内容的输出路径。省略时直接打印到终端。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 目标文件已存在时强制覆盖。
    #[arg(long)]
    pub force: bool,

    /// 隐写时使用的结束标记。
    #[arg(long, default_value_t = Sentinel::default())]
    pub sentinel: Sentinel,

    /// 未找到结束标记时报错，而不是输出尽力解码的文本。
    #[arg(long)]
    pub strict: bool,
}

/// 'sample' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct SampleArgs {
    /// 生成图像的保存路径。
    #[arg(short, long, default_value = DEFAULT_SAMPLE_PATH)]
    pub output: PathBuf,

    /// 正方形图像的边长 (像素)。
    #[arg(short, long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    pub size: u32,

    /// 目标文件已存在时强制覆盖。
    #[arg(long)]
    pub force: bool,
}

/// 'capacity' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CapacityArgs {
    /// 要检查的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 计算可用字符数时考虑的结束标记。
    #[arg(long, default_value_t = Sentinel::default())]
    pub sentinel: Sentinel,
}
