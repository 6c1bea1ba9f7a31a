//! 用紙画像の収集と送信用データの作成

use crate::error::{KitScanError, Result};
use base64::Engine;
use image::{imageops::FilterType, DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
}

/// OCRへ送る画像データ
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub mime_type: String,
    /// Base64エンコード済み
    pub data: String,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext)
}

fn image_info(path: &Path) -> ImageInfo {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    ImageInfo {
        path: path.to_path_buf(),
        file_name,
    }
}

/// 画像ファイル、またはフォルダ直下の画像を収集
pub fn collect_images(target: &Path) -> Result<Vec<ImageInfo>> {
    if target.is_file() {
        let ext = target
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        if !is_image_extension(&ext) {
            return Err(KitScanError::ImageLoad(format!(
                "対応していない形式です: {}",
                target.display()
            )));
        }
        return Ok(vec![image_info(target)]);
    }

    if !target.exists() {
        return Err(KitScanError::FolderNotFound(target.display().to_string()));
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(target)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if let Some(ext) = path.extension() {
            if is_image_extension(&ext.to_string_lossy()) {
                images.push(image_info(path));
            }
        }
    }

    // ファイル名でソート
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

/// 画像を読み込み、長辺を `max_size` 以下に縮小してJPEGで返す
pub fn load_image_payload(path: &Path, max_size: u32) -> Result<ImagePayload> {
    let img = image::open(path)
        .map_err(|e| KitScanError::ImageLoad(format!("{}: {}", path.display(), e)))?;

    let img = if img.width() > max_size || img.height() > max_size {
        img.resize(max_size, max_size, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEGはアルファチャンネル非対応
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buffer = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
        .map_err(|e| KitScanError::ImageLoad(format!("JPEG変換エラー: {}", e)))?;

    Ok(ImagePayload {
        mime_type: "image/jpeg".to_string(),
        data: base64::engine::general_purpose::STANDARD.encode(&buffer),
    })
}
