use image::ImageFormat;
use ppm_hide::{
    Extraction, PixelMap, Sentinel, StegoError,
    cli::{CapacityArgs, ExtractArgs, HideArgs, SampleArgs, TextSource},
    handler::{handle_capacity, handle_extract, handle_hide, handle_sample},
    steganography::{embed, extract, required_bits},
};
use rand::distr::Alphanumeric;
use rand::{Rng, RngCore};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// 一个辅助函数，用于创建一个带有随机像素的测试图像
fn random_image(width: u32, height: u32) -> PixelMap {
    let mut pixels = vec![0u8; (width * height * 3) as usize];
    rand::rng().fill_bytes(&mut pixels);
    PixelMap::new(width, height, pixels).expect("Failed to create test image.")
}

fn random_text(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn stego_error(err: &anyhow::Error) -> Option<&StegoError> {
    err.chain().find_map(|cause| cause.downcast_ref::<StegoError>())
}

/// 验证 100x100 样例图像上从隐藏到恢复的完整流程
#[test]
fn test_hide_and_extract_hello_on_sample() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let sample = dir.path().join("sample.ppm");
    let secret = dir.path().join("secret.ppm");
    let sentinel = Sentinel::default();

    ppm_hide::create_sample_image(&sample, 100)?;
    assert_eq!(fs::metadata(&sample)?.len(), 15 + 30_000);
    assert_eq!(required_bits("hello", &sentinel), 112);

    ppm_hide::hide(&sample, &secret, "hello", &sentinel)?;
    assert_eq!(
        ppm_hide::extract(&secret, &sentinel)?,
        Extraction::Found("hello".to_string())
    );

    // 只有前 112 个字节可能被改动
    let before = PixelMap::open(&sample)?;
    let after = PixelMap::open(&secret)?;
    assert_eq!(before.pixels()[112..], after.pixels()[112..]);

    Ok(())
}

/// 验证样例图像的像素值公式
#[test]
fn test_sample_image_pixels() -> anyhow::Result<()> {
    let image = ppm_hide::sample_image(300)?;
    let pixel = |x: usize, y: usize| {
        let offset = (y * 300 + x) * 3;
        &image.pixels()[offset..offset + 3]
    };
    assert_eq!(pixel(0, 0), &[0, 0, 0]);
    assert_eq!(pixel(5, 7), &[5, 7, 12]);
    assert_eq!(pixel(200, 100), &[200, 100, 44]);
    assert_eq!(pixel(299, 258), &[43, 2, 45]);

    assert!(matches!(
        ppm_hide::sample_image(0),
        Err(StegoError::Format(_))
    ));
    Ok(())
}

/// 未隐藏任何内容的图像：恢复不报错，但结果标记为未找到结束标记
#[test]
fn test_degraded_extraction_on_clean_image() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let sample = dir.path().join("clean.ppm");
    ppm_hide::create_sample_image(&sample, 100)?;

    let result = ppm_hide::extract(&sample, &Sentinel::default())?;
    assert!(!result.is_found());
    // 30000 个字节 -> 3750 个完整字符
    assert_eq!(result.text().chars().count(), 3_750);
    Ok(())
}

/// 随机图像与随机文本的往返、高位保留与尾部不变
#[test]
fn test_round_trip_preserves_high_bits_and_tail() {
    let sentinel = Sentinel::default();
    for _ in 0..16 {
        let cover = random_image(17, 9);
        let len = rand::rng().random_range(0..=10);
        let text = format!("{}é·ÿ", random_text(len));

        let stego = embed(&cover, &text, &sentinel).unwrap();
        let used = required_bits(&text, &sentinel);

        for (i, (&a, &b)) in cover.pixels().iter().zip(stego.pixels()).enumerate() {
            assert_eq!(a & 0xFE, b & 0xFE, "high bits changed at {i}");
            if i >= used {
                assert_eq!(a, b, "tail byte changed at {i}");
            }
        }
        assert_eq!(extract(&stego, &sentinel), Extraction::Found(text));
    }
}

/// 容量边界：恰好填满时成功，多一个字符时失败且图像不变
#[test]
fn test_capacity_boundary() {
    let sentinel = Sentinel::new("#").unwrap();
    // 8x3 像素 = 72 字节 = 9 个字符，其中 1 个是结束标记
    let cover = random_image(8, 3);

    let exact = random_text(8);
    assert_eq!(required_bits(&exact, &sentinel), cover.capacity());
    let stego = embed(&cover, &exact, &sentinel).unwrap();
    assert_eq!(extract(&stego, &sentinel), Extraction::Found(exact));

    let snapshot = cover.clone();
    let err = embed(&cover, &random_text(9), &sentinel).unwrap_err();
    assert!(matches!(
        err,
        StegoError::Capacity {
            required: 80,
            available: 72
        }
    ));
    assert_eq!(cover, snapshot);
}

/// 写出的文件应能被 `image` 库识别为同样的 RGB 像素
#[test]
fn test_written_file_decodes_with_image_crate() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("random.ppm");
    let original = random_image(31, 7);
    original.save(&path)?;

    let decoded = image::load_from_memory_with_format(&fs::read(&path)?, ImageFormat::Pnm)?;
    assert_eq!((decoded.width(), decoded.height()), (31, 7));
    assert_eq!(decoded.to_rgb8().into_raw(), original.pixels());

    assert_eq!(PixelMap::open(&path)?, original);
    Ok(())
}

/// 格式错误与截断的文件
#[test]
fn test_malformed_files_are_rejected() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cases: [(&str, &[u8]); 3] = [
        ("ascii.ppm", b"P3\n1 1\n255\n0 0 0\n"),
        ("dims.ppm", b"P6\nwide 1\n255\n\0\0\0"),
        ("short.ppm", b"P6\n2 2\n255\n\0\0\0"),
    ];

    for (name, bytes) in cases {
        let path = dir.path().join(name);
        fs::write(&path, bytes)?;
        let err = ppm_hide::extract(&path, &Sentinel::default()).unwrap_err();
        assert!(matches!(err, StegoError::Format(_)), "{name}: {err}");
    }

    let missing = ppm_hide::extract(dir.path().join("missing.ppm"), &Sentinel::default());
    assert!(matches!(missing, Err(StegoError::Io(_))));
    Ok(())
}

/// 超出单字节范围的字符被拒绝，且不会写出文件
#[test]
fn test_non_latin1_text_is_rejected() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let sample = dir.path().join("sample.ppm");
    let dest = dir.path().join("dest.ppm");
    ppm_hide::create_sample_image(&sample, 20)?;

    let err = ppm_hide::hide(&sample, &dest, "这是一个测试", &Sentinel::default()).unwrap_err();
    assert!(matches!(err, StegoError::Encoding { position: 0, .. }));
    assert!(!dest.exists());
    Ok(())
}

/// 自定义结束标记：隐藏与恢复必须使用同一个标记
#[test]
fn test_custom_sentinel() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let sample = dir.path().join("sample.ppm");
    let secret = dir.path().join("secret.ppm");
    ppm_hide::create_sample_image(&sample, 40)?;

    let sentinel: Sentinel = "<<EOF>>".parse()?;
    ppm_hide::hide(&sample, &secret, "custom marker ###END### inside", &sentinel)?;

    assert_eq!(
        ppm_hide::extract(&secret, &sentinel)?.found().as_deref(),
        Some("custom marker ###END### inside")
    );
    // 默认标记会在文本中间提前命中
    assert_eq!(
        ppm_hide::extract(&secret, &Sentinel::default())?,
        Extraction::Found("custom marker ".to_string())
    );
    Ok(())
}

/// 验证命令处理层的完整流程，以及默认输出路径
#[test]
fn test_handle_hide_and_extract_with_defaults() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image = dir.path().join("original.ppm");
    let source_text = dir.path().join("source.txt");
    let recovered_text = dir.path().join("recovered.txt");

    handle_sample(SampleArgs {
        output: image.clone(),
        size: 64,
        force: false,
    })?;

    let original_text = "This is a test message for the handler! Ça marche.";
    fs::write(&source_text, original_text)?;

    handle_hide(HideArgs {
        image: image.clone(),
        source: TextSource {
            text: None,
            text_file: Some(source_text),
        },
        dest: None,
        force: false,
        sentinel: Sentinel::default(),
    })?;

    let expected_hidden = dir.path().join("doctored_original.ppm");
    assert!(
        expected_hidden.exists(),
        "Default hidden image should be created at: {:?}",
        expected_hidden
    );

    handle_extract(ExtractArgs {
        image: expected_hidden.clone(),
        text: Some(recovered_text.clone()),
        force: false,
        sentinel: Sentinel::default(),
        strict: true,
    })?;
    assert_eq!(fs::read_to_string(&recovered_text)?, original_text);

    handle_capacity(CapacityArgs {
        image: expected_hidden,
        sentinel: Sentinel::default(),
    })?;

    Ok(())
}

/// 验证覆盖保护机制以及 `--force` 标志是否按预期工作
#[test]
fn test_overwrite_protection_and_force_flag() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image = dir.path().join("image.ppm");
    let dest = dir.path().join("dest.ppm");
    ppm_hide::create_sample_image(&image, 30)?;
    fs::write(&dest, "this is a dummy file to be overwritten")?;

    let args = |force| HideArgs {
        image: image.clone(),
        source: TextSource {
            text: Some("some text".to_string()),
            text_file: None,
        },
        dest: Some(dest.clone()),
        force,
        sentinel: Sentinel::default(),
    };

    let result = handle_hide(args(false));
    assert!(result.is_err(), "Execution should fail without --force when file exists.");
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }
    assert_eq!(fs::read(&dest)?, b"this is a dummy file to be overwritten");

    handle_hide(args(true))?;
    assert_eq!(
        ppm_hide::extract(&dest, &Sentinel::default())?.found().as_deref(),
        Some("some text")
    );
    Ok(())
}

/// 验证空间不足时的错误处理
#[test]
fn test_handle_hide_not_enough_space() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image = dir.path().join("small.ppm");
    let dest = dir.path().join("dest.ppm");
    ppm_hide::create_sample_image(&image, 10)?;

    let result = handle_hide(HideArgs {
        image,
        source: TextSource {
            text: Some("a".repeat(5000)),
            text_file: None,
        },
        dest: Some(dest.clone()),
        force: false,
        sentinel: Sentinel::default(),
    });

    let err = result.expect_err("hiding 5000 characters in a 10x10 image must fail");
    assert!(matches!(
        stego_error(&err),
        Some(StegoError::Capacity {
            required: 40_072,
            available: 300
        })
    ));
    assert!(format!("{err:#}").contains("Not enough space"));
    assert!(!dest.exists());
    Ok(())
}

/// `--strict` 时未找到结束标记应报错
#[test]
fn test_strict_extract_fails_without_marker() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image = dir.path().join("clean.ppm");
    ppm_hide::create_sample_image(&image, 16)?;

    let args = |strict| ExtractArgs {
        image: image.clone(),
        text: None,
        force: false,
        sentinel: Sentinel::default(),
        strict,
    };

    handle_extract(args(false))?;
    let err = handle_extract(args(true)).unwrap_err();
    assert!(err.to_string().contains("No end marker"));
    Ok(())
}

#[test]
fn test_cli_parses_subcommands() {
    use clap::Parser;
    use ppm_hide::cli::{Cli, Commands};

    let cli = Cli::try_parse_from(["ppm_hide", "hide", "-i", "in.ppm", "-t", "hi", "--sentinel", "@@"])
        .unwrap();
    match cli.command {
        Commands::Hide(args) => {
            assert_eq!(args.source.text.as_deref(), Some("hi"));
            assert_eq!(args.sentinel.as_bytes(), b"@@");
            assert!(args.dest.is_none());
        }
        other => panic!("unexpected command: {other:?}"),
    }

    // 文本来源必须且只能给出一个
    assert!(Cli::try_parse_from(["ppm_hide", "hide", "-i", "in.ppm"]).is_err());
    assert!(
        Cli::try_parse_from(["ppm_hide", "hide", "-i", "a", "-t", "x", "-f", "b.txt"]).is_err()
    );
    assert!(Cli::try_parse_from(["ppm_hide", "extract", "-i", "a", "--sentinel", ""]).is_err());

    let cli = Cli::try_parse_from(["ppm_hide", "sample"]).unwrap();
    match cli.command {
        Commands::Sample(args) => {
            assert_eq!(args.size, 100);
            assert_eq!(args.output, Path::new("sample.ppm"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}
