//! Split / ShuffledSplit / Datasets 单元测试

use std::collections::HashSet;

use crate::data::{DataError, DataSource, Datasets, ShuffledSplit, Split};
use crate::tensor::Tensor;

/// 第 i 个样本的特征全为 i，标签为 i
fn numbered_split(n: usize, width: usize) -> Split {
    let data: Vec<f32> = (0..n)
        .flat_map(|i| std::iter::repeat_n(i as f32, width))
        .collect();
    let labels = (0..n).map(|i| i as u8).collect();
    Split::new(Tensor::new(&data, &[n, width]), labels).unwrap()
}

#[test]
fn test_split_rejects_mismatched_labels() {
    let result = Split::new(Tensor::zeros(&[3, 2]), vec![0, 1]);
    assert!(matches!(result, Err(DataError::ShapeMismatch { .. })));
}

#[test]
fn test_batch_rows_match_labels() {
    let mut sampler = ShuffledSplit::new(numbered_split(10, 3), Some(1));
    for _ in 0..7 {
        let batch = sampler.next_batch(4).unwrap();
        assert_eq!(batch.images.shape(), &[4, 3]);
        for (row, &label) in batch.labels.iter().enumerate() {
            assert_eq!(batch.images.row(row), vec![f32::from(label); 3]);
        }
    }
}

#[test]
fn test_one_epoch_visits_every_example_once() {
    let mut sampler = ShuffledSplit::new(numbered_split(12, 1), Some(7));
    let mut seen = HashSet::new();
    for _ in 0..3 {
        for label in sampler.next_batch(4).unwrap().labels {
            assert!(seen.insert(label), "样本{label}在同一 epoch 中出现两次");
        }
    }
    assert_eq!(seen.len(), 12);
    assert_eq!(sampler.epochs_completed(), 0);
}

#[test]
fn test_batch_wraps_across_epochs() {
    let mut sampler = ShuffledSplit::new(numbered_split(5, 1), Some(3));
    let first = sampler.next_batch(3).unwrap();
    // 剩余2个 + 新 epoch 的1个
    let second = sampler.next_batch(3).unwrap();
    assert_eq!(sampler.epochs_completed(), 1);

    let first_epoch: HashSet<u8> = first
        .labels
        .iter()
        .chain(&second.labels[..2])
        .copied()
        .collect();
    assert_eq!(first_epoch.len(), 5);
}

#[test]
fn test_shuffle_is_reproducible_with_seed() {
    let mut a = ShuffledSplit::new(numbered_split(20, 2), Some(42));
    let mut b = ShuffledSplit::new(numbered_split(20, 2), Some(42));
    for _ in 0..10 {
        assert_eq!(a.next_batch(6).unwrap(), b.next_batch(6).unwrap());
    }
}

#[test]
fn test_batch_larger_than_split() {
    let mut sampler = ShuffledSplit::new(numbered_split(3, 1), Some(0));
    assert!(matches!(
        sampler.next_batch(4),
        Err(DataError::BatchTooLarge {
            batch_size: 4,
            len: 3
        })
    ));
}

#[test]
fn test_datasets_carve_validation_from_start() {
    let datasets = Datasets::from_splits(numbered_split(10, 2), numbered_split(4, 2), 3, Some(0))
        .unwrap();
    assert_eq!(datasets.validation.labels(), &[0, 1, 2]);
    assert_eq!(datasets.train.split().labels(), &[3, 4, 5, 6, 7, 8, 9]);
    assert_eq!(datasets.eval_split().num_examples(), 4);
    assert_eq!(datasets.eval_split().width(), 2);
}

#[test]
fn test_datasets_validation_too_large() {
    let result = Datasets::from_splits(numbered_split(3, 1), numbered_split(1, 1), 3, None);
    assert!(matches!(result, Err(DataError::EmptyDataset(_))));
    let result = Datasets::from_splits(numbered_split(3, 1), numbered_split(1, 1), 4, None);
    assert!(matches!(result, Err(DataError::BatchTooLarge { .. })));
}
