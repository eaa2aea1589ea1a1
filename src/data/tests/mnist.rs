//! MNIST 数据集单元测试
//!
//! 在临时目录中写出小型 IDX 文件，不依赖真实数据。

use std::io::Write;
use std::path::Path;

use approx::assert_abs_diff_eq;
use flate2::Compression;
use flate2::write::GzEncoder;

use crate::data::{DataError, MnistDataset, default_data_dir};

fn idx_images(pixels: &[u8], count: u32, rows: u32, cols: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&2051u32.to_be_bytes());
    bytes.extend_from_slice(&count.to_be_bytes());
    bytes.extend_from_slice(&rows.to_be_bytes());
    bytes.extend_from_slice(&cols.to_be_bytes());
    bytes.extend_from_slice(pixels);
    bytes
}

fn idx_labels(labels: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&2049u32.to_be_bytes());
    bytes.extend_from_slice(&(labels.len() as u32).to_be_bytes());
    bytes.extend_from_slice(labels);
    bytes
}

fn write_gz(path: &Path, bytes: &[u8]) {
    let mut encoder = GzEncoder::new(std::fs::File::create(path).unwrap(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap();
}

#[test]
fn test_default_data_dir() {
    let dir = default_data_dir();
    assert!(dir.to_string_lossy().contains("gancoder"));
    assert!(dir.to_string_lossy().contains("datasets"));
}

#[test]
fn test_mnist_load_uncompressed() {
    let dir = tempfile::tempdir().unwrap();
    // 3 张 2x2 图像
    let pixels = [0, 255, 51, 102, 255, 255, 0, 0, 1, 2, 3, 4];
    std::fs::write(
        dir.path().join("train-images-idx3-ubyte"),
        idx_images(&pixels, 3, 2, 2),
    )
    .unwrap();
    std::fs::write(dir.path().join("train-labels-idx1-ubyte"), idx_labels(&[7, 2, 9])).unwrap();

    let dataset = MnistDataset::load(Some(dir.path()), true).unwrap();
    assert_eq!(dataset.len(), 3);
    assert!(!dataset.is_empty());
    assert_eq!(dataset.image_dims(), (2, 2));
    assert_eq!(dataset.labels(), &[7, 2, 9]);
    assert_eq!(dataset.images().shape(), &[3, 4]);

    let images = dataset.images();
    assert_abs_diff_eq!(images[[0, 0]], 0.0);
    assert_abs_diff_eq!(images[[0, 1]], 1.0);
    assert_abs_diff_eq!(images[[0, 2]], 0.2, epsilon = 1e-6);
    assert_abs_diff_eq!(images[[2, 3]], 4.0 / 255.0, epsilon = 1e-6);
}

#[test]
fn test_mnist_load_gz() {
    let dir = tempfile::tempdir().unwrap();
    write_gz(
        &dir.path().join("t10k-images-idx3-ubyte.gz"),
        &idx_images(&[10; 18], 2, 3, 3),
    );
    write_gz(&dir.path().join("t10k-labels-idx1-ubyte.gz"), &idx_labels(&[1, 0]));

    let dataset = MnistDataset::load(Some(dir.path()), false).unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.image_dims(), (3, 3));
    assert_eq!(dataset.images().shape(), &[2, 9]);
}

#[test]
fn test_mnist_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = MnistDataset::load(Some(dir.path()), true);
    assert!(matches!(result, Err(DataError::FileNotFound(_))));
}

#[test]
fn test_mnist_bad_magic() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("train-images-idx3-ubyte"),
        idx_labels(&[1, 2, 3]),
    )
    .unwrap();
    std::fs::write(dir.path().join("train-labels-idx1-ubyte"), idx_labels(&[1, 2, 3])).unwrap();
    let result = MnistDataset::load(Some(dir.path()), true);
    assert!(matches!(result, Err(DataError::FormatError(_))));
}

#[test]
fn test_mnist_truncated_pixels() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("train-images-idx3-ubyte"),
        idx_images(&[0; 5], 2, 2, 2),
    )
    .unwrap();
    std::fs::write(dir.path().join("train-labels-idx1-ubyte"), idx_labels(&[1, 2])).unwrap();
    let result = MnistDataset::load(Some(dir.path()), true);
    assert!(matches!(result, Err(DataError::FormatError(_))));
}

#[test]
fn test_mnist_label_count_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("train-images-idx3-ubyte"),
        idx_images(&[0; 8], 2, 2, 2),
    )
    .unwrap();
    std::fs::write(dir.path().join("train-labels-idx1-ubyte"), idx_labels(&[1, 2, 3])).unwrap();
    let result = MnistDataset::load(Some(dir.path()), true);
    assert!(matches!(result, Err(DataError::ShapeMismatch { .. })));
}
