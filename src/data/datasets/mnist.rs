//! MNIST 手写数字数据集
//!
//! 支持：
//! - IDX 二进制格式解析（支持 .gz 压缩）
//! - 像素归一化 (0-255 → 0-1)
//!
//! 不做自动下载，数据文件需事先放在数据目录下（解压或 .gz 均可）。

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::data::error::DataError;
use crate::tensor::Tensor;

/// 图像文件的 magic number
const IDX_IMAGES_MAGIC: u32 = 2051;
/// 标签文件的 magic number
const IDX_LABELS_MAGIC: u32 = 2049;

/// MNIST 手写数字数据集
///
/// 训练集 60,000 个样本，测试集 10,000 个样本；
/// 每个样本展平为一行 `rows * cols` 个像素，标签为 0-9。
#[derive(Debug, Clone)]
pub struct MnistDataset {
    /// 图像数据 [N, rows * cols]，已归一化到 [0, 1]
    images: Tensor,
    labels: Vec<u8>,
    /// 单张图像的 (高, 宽)
    image_dims: (usize, usize),
}

impl MnistDataset {
    /// 从 `root` 目录加载
    ///
    /// # 参数
    /// - `root`: 数据目录，None 则使用默认 (~/.cache/gancoder/datasets/mnist)
    /// - `train`: true=训练集, false=测试集
    pub fn load(root: Option<&Path>, train: bool) -> Result<Self, DataError> {
        let data_dir = root
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_data_dir().join("mnist"));

        let (images_file, labels_file) = if train {
            ("train-images-idx3-ubyte", "train-labels-idx1-ubyte")
        } else {
            ("t10k-images-idx3-ubyte", "t10k-labels-idx1-ubyte")
        };

        let images_path = locate_file(&data_dir, images_file)?;
        let labels_path = locate_file(&data_dir, labels_file)?;

        let (pixels, num_images, rows, cols) = parse_idx_images(&images_path)?;
        let labels = parse_idx_labels(&labels_path)?;
        if labels.len() != num_images {
            return Err(DataError::ShapeMismatch {
                expected: vec![num_images],
                got: vec![labels.len()],
            });
        }

        tracing::debug!(
            "已读取{}：{}张{}x{}图像",
            images_path.display(),
            num_images,
            rows,
            cols
        );
        Self::from_raw(&pixels, labels, (rows, cols))
    }

    /// 由原始像素（0-255，逐图展平后首尾相接）构造
    pub fn from_raw(pixels: &[u8], labels: Vec<u8>, image_dims: (usize, usize)) -> Result<Self, DataError> {
        let width = image_dims.0 * image_dims.1;
        let expected = labels.len() * width;
        if pixels.len() != expected {
            return Err(DataError::ShapeMismatch {
                expected: vec![labels.len(), width],
                got: vec![pixels.len()],
            });
        }
        let data: Vec<f32> = pixels.iter().map(|&p| f32::from(p) / 255.0).collect();
        Ok(Self {
            images: Tensor::new(&data, &[labels.len(), width]),
            labels,
            image_dims,
        })
    }

    /// 返回数据集中的样本数量
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// 数据集是否为空
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn images(&self) -> &Tensor {
        &self.images
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    pub const fn image_dims(&self) -> (usize, usize) {
        self.image_dims
    }

    /// 拆成 (图像, 标签)
    pub fn into_parts(self) -> (Tensor, Vec<u8>) {
        (self.images, self.labels)
    }
}

/// 获取默认数据目录
pub fn default_data_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gancoder")
        .join("datasets")
}

/// 优先使用解压后的文件，其次 .gz
fn locate_file(data_dir: &Path, base_name: &str) -> Result<PathBuf, DataError> {
    let uncompressed_path = data_dir.join(base_name);
    if uncompressed_path.exists() {
        return Ok(uncompressed_path);
    }

    let gz_path = data_dir.join(format!("{base_name}.gz"));
    if gz_path.exists() {
        return Ok(gz_path);
    }

    Err(DataError::FileNotFound(uncompressed_path))
}

fn open_idx(path: &Path) -> Result<Box<dyn Read>, DataError> {
    let file = File::open(path).map_err(|_| DataError::FileNotFound(path.to_path_buf()))?;
    Ok(if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    })
}

fn read_be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// 解析 IDX 图像文件，返回 (像素, 图像数, 行数, 列数)
///
/// IDX 格式：
/// - [0-3] magic number (0x00000803 = 2051)
/// - [4-7] number of images
/// - [8-11] number of rows
/// - [12-15] number of columns
/// - [16+] pixel data (unsigned byte)
fn parse_idx_images(path: &Path) -> Result<(Vec<u8>, usize, usize, usize), DataError> {
    let mut reader = open_idx(path)?;
    let mut header = [0u8; 16];
    reader
        .read_exact(&mut header)
        .map_err(|e| DataError::FormatError(format!("读取头部失败: {e}")))?;

    // 解析头部（大端序）
    let magic = read_be_u32(&header[0..4]);
    if magic != IDX_IMAGES_MAGIC {
        return Err(DataError::FormatError(format!(
            "无效的 magic number: {magic} (期望 {IDX_IMAGES_MAGIC})"
        )));
    }

    let num_images = read_be_u32(&header[4..8]) as usize;
    let num_rows = read_be_u32(&header[8..12]) as usize;
    let num_cols = read_be_u32(&header[12..16]) as usize;

    let mut pixels = vec![0u8; num_images * num_rows * num_cols];
    reader
        .read_exact(&mut pixels)
        .map_err(|e| DataError::FormatError(format!("读取像素数据失败: {e}")))?;

    Ok((pixels, num_images, num_rows, num_cols))
}

/// 解析 IDX 标签文件
///
/// IDX 格式：
/// - [0-3] magic number (0x00000801 = 2049)
/// - [4-7] number of labels
/// - [8+] label data (unsigned byte, 0-9)
fn parse_idx_labels(path: &Path) -> Result<Vec<u8>, DataError> {
    let mut reader = open_idx(path)?;
    let mut header = [0u8; 8];
    reader
        .read_exact(&mut header)
        .map_err(|e| DataError::FormatError(format!("读取头部失败: {e}")))?;

    let magic = read_be_u32(&header[0..4]);
    if magic != IDX_LABELS_MAGIC {
        return Err(DataError::FormatError(format!(
            "无效的 magic number: {magic} (期望 {IDX_LABELS_MAGIC})"
        )));
    }

    let num_labels = read_be_u32(&header[4..8]) as usize;
    let mut labels = vec![0u8; num_labels];
    reader
        .read_exact(&mut labels)
        .map_err(|e| DataError::FormatError(format!("读取标签数据失败: {e}")))?;

    Ok(labels)
}
