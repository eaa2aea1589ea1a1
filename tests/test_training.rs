/*
 * @Date         : 2026-10-19
 * @Description  : 训练驱动的集成测试：用内存中的小数据集（4x4 图像、batch 4、2x2 网格）
 *                 跑完整的 INIT → LOOP → DONE 流程，检查产物和损失走势
 */

use std::path::Path;

use gancoder::Error;
use gancoder::data::{Datasets, Split};
use gancoder::model::{Objective, Variant};
use gancoder::nn::Graph;
use gancoder::summary::{Event, read_events};
use gancoder::tensor::Tensor;
use gancoder::train::{Losses, TrainConfig, Trainer};

const SIDE: usize = 4;
const WIDTH: usize = SIDE * SIDE;

fn small_config(dir: &Path, variant: Variant, steps: u64) -> TrainConfig {
    TrainConfig {
        variant,
        batch_size: 4,
        grid_rows: 2,
        grid_cols: 2,
        image_height: SIDE,
        image_width: SIDE,
        training_steps: steps,
        model_file: dir.join("model").join("model.ckpt"),
        gan_model_file: dir.join("gan_model").join("model.ckpt"),
        log_dir: dir.join("logs"),
        image_dir: dir.join("images"),
        latent_file: dir.join("latent_relu.csv"),
        validation_size: 2,
        seed: Some(42),
        ..TrainConfig::default()
    }
}

/// 第 i 个样本：像素在 [0, 1] 之间按 i 错位排列
fn patterned_split(n: usize) -> Split {
    let data: Vec<f32> = (0..n * WIDTH)
        .map(|k| ((k / WIDTH + k % WIDTH) % 7) as f32 / 6.0)
        .collect();
    let labels = (0..n).map(|i| (i % 10) as u8).collect();
    Split::new(Tensor::new(&data, &[n, WIDTH]), labels).unwrap()
}

fn constant_split(n: usize, value: f32) -> Split {
    Split::new(Tensor::full(&[n, WIDTH], value), vec![0; n]).unwrap()
}

fn param_values(trainer: &Trainer, name: &str) -> Vec<f32> {
    let graph = trainer.graph();
    let id = graph.get_node_by_name(name).unwrap();
    graph.get_node_value(id).unwrap().unwrap().to_vec()
}

fn max_abs_delta(before: &[f32], after: &[f32]) -> f32 {
    before
        .iter()
        .zip(after)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f32::max)
}

fn loss_steps(log_dir: &Path) -> Vec<u64> {
    read_events(log_dir)
        .unwrap()
        .into_iter()
        .filter_map(|e| match e {
            Event::Scalar { step, tag, .. } if tag == "Loss" => Some(step),
            _ => None,
        })
        .collect()
}

#[test]
fn test_zero_steps_writes_all_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path(), Variant::Autoencoder, 0);
    let mut data = Datasets::from_splits(patterned_split(14), patterned_split(6), 2, Some(1)).unwrap();

    let mut trainer = Trainer::new(config.clone()).unwrap();
    let report = trainer.run(&mut data).unwrap();

    assert_eq!(report.start_step, 0);
    assert_eq!(report.last_step, 0);
    assert_eq!(report.history.len(), 1);
    assert!(matches!(report.history[0], (0, Losses::Autoencoder { .. })));

    assert!(config.model_file.exists());
    assert!(!config.gan_model_file.exists());
    assert!(config.image_dir.join("input.jpg").exists());
    assert!(config.image_dir.join("output_000000.jpg").exists());

    let latent = std::fs::read_to_string(&config.latent_file).unwrap();
    assert_eq!(report.latent_rows, 6);
    assert_eq!(latent.lines().count(), 6);
    for line in latent.lines() {
        // 2 维隐向量 + 标签
        assert_eq!(line.split(' ').count(), 3);
    }

    let tags: Vec<String> = read_events(&config.log_dir)
        .unwrap()
        .into_iter()
        .map(|e| match e {
            Event::Scalar { tag, .. } | Event::Image { tag, .. } => tag,
        })
        .collect();
    assert_eq!(tags, vec!["Loss", "Input", "Encoder", "Output"]);
}

#[test]
fn test_resume_continues_from_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path(), Variant::Autoencoder, 3);
    let mut data = Datasets::from_splits(patterned_split(14), patterned_split(6), 2, Some(1)).unwrap();
    let mut trainer = Trainer::new(config.clone()).unwrap();
    let first = trainer.run(&mut data).unwrap();
    assert_eq!(first.last_step, 3);
    let trained = trainer.encode(data.test.images()).unwrap();

    // 检查点记录的是下一步（4），超过 training_steps 时不再训练
    let resumed_config = TrainConfig {
        resume: true,
        seed: Some(999),
        ..config
    };
    let mut resumed = Trainer::new(resumed_config).unwrap();
    let report = resumed.run(&mut data).unwrap();
    assert_eq!(report.start_step, 4);
    assert!(report.history.is_empty());
    assert_eq!(resumed.encode(data.test.images()).unwrap(), trained);
}

#[test]
fn test_resume_without_checkpoint_starts_over() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainConfig {
        resume: true,
        ..small_config(dir.path(), Variant::Autoencoder, 0)
    };
    let mut data = Datasets::from_splits(patterned_split(8), patterned_split(2), 0, Some(1)).unwrap();
    let report = Trainer::new(config).unwrap().run(&mut data).unwrap();
    assert_eq!(report.start_step, 0);
}

#[test]
fn test_constant_inputs_loss_decreases() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainConfig {
        learning_rate: 1e-2,
        summary_interval: 100,
        ..small_config(dir.path(), Variant::Autoencoder, 300)
    };
    let mut data = Datasets::from_splits(
        constant_split(20, 0.5),
        constant_split(4, 0.5),
        0,
        Some(2),
    )
    .unwrap();

    let report = Trainer::new(config).unwrap().run(&mut data).unwrap();
    let losses: Vec<f32> = report
        .history
        .iter()
        .map(|(_, losses)| losses.reconstruction())
        .collect();
    assert_eq!(losses.len(), 4);
    assert!(
        losses[3] < losses[0],
        "重建损失应当下降，实际为{losses:?}"
    );
}

#[test]
fn test_gancoder_short_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainConfig {
        summary_interval: 10,
        checkpoint_interval: 10,
        ..small_config(dir.path(), Variant::Gancoder, 20)
    };
    let mut data = Datasets::from_splits(patterned_split(14), patterned_split(6), 2, Some(3)).unwrap();

    let mut trainer = Trainer::new(config.clone()).unwrap();
    let report = trainer.run(&mut data).unwrap();
    assert_eq!(report.history.len(), 3);
    for (_, losses) in &report.history {
        match *losses {
            Losses::Gancoder { g_loss, d_loss } => {
                assert!(g_loss.is_finite() && g_loss >= 0.0);
                assert!(d_loss.is_finite() && d_loss >= 0.0);
            }
            Losses::Autoencoder { .. } => panic!("gancoder 不应产生普通自编码器的损失"),
        }
    }

    assert!(config.gan_model_file.exists());
    for step in [0, 10, 20] {
        assert!(config.image_dir.join(format!("output_{step:06}.jpg")).exists());
    }
    let scalar_tags: Vec<String> = read_events(&config.log_dir)
        .unwrap()
        .into_iter()
        .filter_map(|e| match e {
            Event::Scalar { tag, .. } => Some(tag),
            Event::Image { .. } => None,
        })
        .collect();
    assert_eq!(scalar_tags[..2], ["GenLoss".to_string(), "DisLoss".to_string()]);

    let reconstructed = trainer.reconstruct(data.test.images()).unwrap();
    assert_eq!(reconstructed.shape(), &[6, WIDTH]);
}

#[test]
fn test_discriminator_steps_per_generator_step() {
    let mut moves = Vec::new();
    for discriminator_steps in [0, 1, 3] {
        let dir = tempfile::tempdir().unwrap();
        let config = TrainConfig {
            discriminator_steps,
            ..small_config(dir.path(), Variant::Gancoder, 4)
        };
        let mut data = Datasets::from_splits(patterned_split(14), patterned_split(6), 2, Some(3)).unwrap();
        let mut trainer = Trainer::new(config).unwrap();
        let discriminator_before = param_values(&trainer, "discriminator_1_W");
        let encoder_before = param_values(&trainer, "encoder_1_W");

        trainer.run(&mut data).unwrap();
        moves.push((
            max_abs_delta(&discriminator_before, &param_values(&trainer, "discriminator_1_W")),
            max_abs_delta(&encoder_before, &param_values(&trainer, "encoder_1_W")),
        ));
    }

    // 生成器更新不触碰判别器参数
    assert_eq!(moves[0].0, 0.0, "{moves:?}");
    for &(_, encoder_move) in &moves {
        assert!(encoder_move > 0.0, "{moves:?}");
    }
    assert!(moves[1].0 > 0.0, "{moves:?}");
    assert!(moves[2].0 > moves[1].0, "{moves:?}");
}

#[test]
fn test_resume_does_not_repeat_written_summary() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainConfig {
        summary_interval: 5,
        checkpoint_interval: 5,
        ..small_config(dir.path(), Variant::Autoencoder, 5)
    };
    let mut data = Datasets::from_splits(patterned_split(14), patterned_split(6), 2, Some(1)).unwrap();
    Trainer::new(config.clone()).unwrap().run(&mut data).unwrap();
    assert_eq!(loss_steps(&config.log_dir), vec![0, 5]);

    // 模拟在第 5 步保存检查点后中断：检查点记录的下一步为 5
    let mut graph = Graph::new();
    Objective::build(
        &mut graph,
        config.variant,
        config.coder_dims(),
        config.generator_loss_weight,
    )
    .unwrap();
    assert_eq!(graph.load_params(config.checkpoint_path()).unwrap(), 6);
    graph.save_params(config.checkpoint_path(), 5).unwrap();

    let resumed_config = TrainConfig {
        resume: true,
        training_steps: 10,
        ..config.clone()
    };
    let report = Trainer::new(resumed_config).unwrap().run(&mut data).unwrap();
    assert_eq!(report.start_step, 5);
    let summarized: Vec<u64> = report.history.iter().map(|(step, _)| *step).collect();
    assert_eq!(summarized, vec![10]);
    assert_eq!(loss_steps(&config.log_dir), vec![0, 5, 10]);
}

#[test]
fn test_resume_writes_summary_not_yet_written() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainConfig {
        summary_interval: 5,
        checkpoint_interval: 5,
        ..small_config(dir.path(), Variant::Autoencoder, 4)
    };
    let mut data = Datasets::from_splits(patterned_split(14), patterned_split(6), 2, Some(1)).unwrap();
    Trainer::new(config.clone()).unwrap().run(&mut data).unwrap();

    // 最终检查点记录第 5 步，此前没有第 5 步的摘要
    let resumed_config = TrainConfig {
        resume: true,
        training_steps: 5,
        ..config.clone()
    };
    let report = Trainer::new(resumed_config).unwrap().run(&mut data).unwrap();
    assert_eq!(report.start_step, 5);
    assert_eq!(report.history.len(), 1);
    assert_eq!(loss_steps(&config.log_dir), vec![0, 5]);
}

#[test]
fn test_data_width_must_match_image_dims() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path(), Variant::Autoencoder, 0);
    let narrow = |n| Split::new(Tensor::zeros(&[n, 9]), vec![0; n]).unwrap();
    let mut data = Datasets::from_splits(narrow(10), narrow(2), 0, None).unwrap();
    let result = Trainer::new(config).unwrap().run(&mut data);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainConfig {
        batch_size: 3,
        ..small_config(dir.path(), Variant::Gancoder, 0)
    };
    assert!(matches!(Trainer::new(config), Err(Error::Config(_))));
}
