/*
 * @Date         : 2026-10-19
 * @Description  : 训练数据源：切分（Split）、按 epoch 打乱的采样器（ShuffledSplit）
 *                 以及组合三者的 Datasets
 *
 * 采样行为：
 * - 第一个 epoch 开始前打乱一次
 * - 当前 epoch 剩余样本不够一个 batch 时，先取完剩余样本，
 *   再重新打乱并从新 epoch 开头补足
 */

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::{DataError, MnistDataset};
use crate::tensor::Tensor;

/// 一个批次：`images` 为 [n, D]，`labels` 与行一一对应
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub images: Tensor,
    pub labels: Vec<u8>,
}

/// 训练循环所需的数据源
pub trait DataSource {
    /// 取下一批 `batch_size` 个训练样本
    fn next_batch(&mut self, batch_size: usize) -> Result<Batch, DataError>;

    /// 训练结束后用于导出隐空间的评估集
    fn eval_split(&self) -> &Split;
}

/// 固定的一份样本
#[derive(Debug, Clone)]
pub struct Split {
    images: Tensor,
    labels: Vec<u8>,
}

impl Split {
    pub fn new(images: Tensor, labels: Vec<u8>) -> Result<Self, DataError> {
        if images.rows() != labels.len() {
            return Err(DataError::ShapeMismatch {
                expected: vec![labels.len(), images.cols()],
                got: images.shape().to_vec(),
            });
        }
        Ok(Self { images, labels })
    }

    pub fn images(&self) -> &Tensor {
        &self.images
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    pub fn num_examples(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// 每个样本的特征数
    pub fn width(&self) -> usize {
        self.images.cols()
    }

    /// 按行号取出子集
    fn select(&self, indices: &[usize]) -> Self {
        Self {
            images: self.images.select_rows(indices),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    /// 在 `at` 处一分为二
    fn split_at(&self, at: usize) -> (Self, Self) {
        let head: Vec<usize> = (0..at).collect();
        let tail: Vec<usize> = (at..self.num_examples()).collect();
        (self.select(&head), self.select(&tail))
    }
}

/// 按 epoch 循环打乱的采样器
pub struct ShuffledSplit {
    split: Split,
    order: Vec<usize>,
    index_in_epoch: usize,
    epochs_completed: usize,
    rng: StdRng,
}

impl ShuffledSplit {
    pub fn new(split: Split, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut order: Vec<usize> = (0..split.num_examples()).collect();
        order.shuffle(&mut rng);
        Self {
            split,
            order,
            index_in_epoch: 0,
            epochs_completed: 0,
            rng,
        }
    }

    pub fn split(&self) -> &Split {
        &self.split
    }

    pub const fn epochs_completed(&self) -> usize {
        self.epochs_completed
    }

    pub fn next_batch(&mut self, batch_size: usize) -> Result<Batch, DataError> {
        let len = self.split.num_examples();
        if len == 0 {
            return Err(DataError::EmptyDataset("训练集".to_string()));
        }
        if batch_size > len {
            return Err(DataError::BatchTooLarge { batch_size, len });
        }

        let start = self.index_in_epoch;
        let mut indices = Vec::with_capacity(batch_size);
        if start + batch_size > len {
            // 本 epoch 的剩余样本
            indices.extend_from_slice(&self.order[start..]);
            self.epochs_completed += 1;
            self.order.shuffle(&mut self.rng);
            self.index_in_epoch = batch_size - indices.len();
            indices.extend_from_slice(&self.order[..self.index_in_epoch]);
        } else {
            self.index_in_epoch += batch_size;
            indices.extend_from_slice(&self.order[start..self.index_in_epoch]);
        }

        let picked = self.split.select(&indices);
        Ok(Batch {
            images: picked.images,
            labels: picked.labels,
        })
    }
}

/// train / validation / test 三份切分
pub struct Datasets {
    pub train: ShuffledSplit,
    pub validation: Split,
    pub test: Split,
}

impl Datasets {
    /// 读取 MNIST，训练集开头的 `validation_size` 个样本划作验证集
    pub fn read_mnist(
        root: Option<&Path>,
        validation_size: usize,
        seed: Option<u64>,
    ) -> Result<Self, DataError> {
        let (train_images, train_labels) = MnistDataset::load(root, true)?.into_parts();
        let (test_images, test_labels) = MnistDataset::load(root, false)?.into_parts();
        let datasets = Self::from_splits(
            Split::new(train_images, train_labels)?,
            Split::new(test_images, test_labels)?,
            validation_size,
            seed,
        )?;
        tracing::info!(
            "MNIST 已加载：训练{}，验证{}，测试{}",
            datasets.train.split().num_examples(),
            datasets.validation.num_examples(),
            datasets.test.num_examples()
        );
        Ok(datasets)
    }

    /// 由已在内存中的数据构造（训练集开头划出验证集）
    pub fn from_splits(
        train: Split,
        test: Split,
        validation_size: usize,
        seed: Option<u64>,
    ) -> Result<Self, DataError> {
        if validation_size > train.num_examples() {
            return Err(DataError::BatchTooLarge {
                batch_size: validation_size,
                len: train.num_examples(),
            });
        }
        let (validation, train) = train.split_at(validation_size);
        if train.is_empty() {
            return Err(DataError::EmptyDataset("划出验证集后的训练集".to_string()));
        }
        Ok(Self {
            train: ShuffledSplit::new(train, seed),
            validation,
            test,
        })
    }
}

impl DataSource for Datasets {
    fn next_batch(&mut self, batch_size: usize) -> Result<Batch, DataError> {
        self.train.next_batch(batch_size)
    }

    fn eval_split(&self) -> &Split {
        &self.test
    }
}
