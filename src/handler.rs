//! # 命令处理逻辑模块
//!
//! 包含处理各个子命令的高级业务逻辑。
//! 本模块负责解析默认路径、防止意外覆盖、调用核心隐写操作以及向用户报告结果。

use crate::cli::{CapacityArgs, ExtractArgs, HideArgs, SampleArgs, TextSource};
use crate::constants::{DOCTORED_PREFIX, PPM_MAGIC};
use crate::operations::{self, Capacity};
use crate::steganography::Extraction;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// 在输入文件所在目录中，以 `prefix + 文件名主干 + 扩展名` 构造默认输出路径。
fn default_path(input: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{prefix}{stem}.{extension}"))
}

/// 未指定 `--force` 时，拒绝覆盖已存在的文件。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

fn read_text(source: TextSource) -> Result<String> {
    match (source.text, source.text_file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => fs::read_to_string(&path).with_context(|| {
            format!(
                "Unable to read text file: {}",
                path.to_string_lossy().red().bold()
            )
        }),
        (None, None) => anyhow::bail!("No text to hide. \nUse --text or --text-file."),
    }
}

/// 处理 'Hide' 命令的执行逻辑。
///
/// 读取文本、确定输出路径并检查是否允许覆盖，然后调用 [`operations::hide`]
/// 把文本隐藏到图像中并写出结果。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`。
/// * 无法读取输入图像或文本文件，或图像不是 P6 格式。
/// * 图像没有足够的空间来隐藏文本，或文本含有无法按单字节编码的字符。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let text = read_text(args.source)?;
    let dest = args
        .dest
        .unwrap_or_else(|| default_path(&args.image, DOCTORED_PREFIX, "ppm"));
    ensure_writable(&dest, args.force)?;

    operations::hide(&args.image, &dest, &text, &args.sentinel).with_context(|| {
        format!(
            "Failed to hide the text from {} into {}",
            args.image.to_string_lossy().red().bold(),
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text ({} characters) has been successfully hidden and saved: {}",
        text.chars().count().to_string().green(),
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Extract' 命令的执行逻辑。
///
/// 恢复隐藏文本后，写入 `--text` 指定的文件，或直接打印到终端。
/// 未找到结束标记时，会给出警告并照常输出尽力解码的文本；指定 `--strict` 时则报错。
///
/// # Errors
///
/// * 无法读取或解析输入图像。
/// * 指定了 `--strict` 但图像中没有找到结束标记。
/// * 目标文本文件已存在且未指定 `--force`，或无法写入。
pub fn handle_extract(args: ExtractArgs) -> Result<()> {
    let extraction = operations::extract(&args.image, &args.sentinel).with_context(|| {
        format!(
            "Failed to read hidden data from {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    if let Extraction::Exhausted(_) = extraction {
        anyhow::ensure!(
            !args.strict,
            "No end marker {} found in {}. \nThe image may not contain a hidden message or is corrupted.",
            args.sentinel.to_string().red().bold(),
            args.image.to_string_lossy().red().bold()
        );
        eprintln!(
            "{} end marker {} not found; the output below is a best-effort decode.",
            "warning:".yellow().bold(),
            args.sentinel.to_string().yellow()
        );
    }

    let text = extraction.into_text();

    match args.text {
        Some(path) => {
            ensure_writable(&path, args.force)?;
            fs::write(&path, &text).with_context(|| {
                format!(
                    "Unable to write to target text file: {}",
                    path.to_string_lossy().red().bold()
                )
            })?;
            println!(
                "The text has been successfully recovered and saved: {}",
                path.to_string_lossy().green().bold()
            );
        }
        None => println!("{} {}", "Extracted:".green().bold(), text),
    }

    Ok(())
}

/// 处理 'Sample' 命令的执行逻辑。
pub fn handle_sample(args: SampleArgs) -> Result<()> {
    ensure_writable(&args.output, args.force)?;

    operations::create_sample_image(&args.output, args.size).with_context(|| {
        format!(
            "Unable to create sample image: {}",
            args.output.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "Created {}x{} {PPM_MAGIC} sample image: {}",
        args.size,
        args.size,
        args.output.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Capacity' 命令的执行逻辑。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let Capacity {
        width,
        height,
        bytes,
        max_chars,
    } = operations::capacity(&args.image, &args.sentinel).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "{}: {width}x{height}, {} pixel bytes, up to {} characters with end marker {}",
        args.image.to_string_lossy().bold(),
        bytes.to_string().green(),
        max_chars.to_string().green().bold(),
        args.sentinel.to_string().yellow()
    );
    Ok(())
}
