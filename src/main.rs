/*
 * @Date         : 2026-10-19
 * @Description  : 命令行入口：读取配置、加载 MNIST、训练并导出结果
 */

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gancoder::data::Datasets;
use gancoder::model::Variant;
use gancoder::train::{TrainConfig, Trainer};
use tracing::Level;

#[derive(Debug, Parser)]
#[command(name = "gancoder", version, about = "训练全连接自编码器 / gancoder")]
struct Cli {
    /// 训练哪一种模型
    #[arg(long, value_enum)]
    variant: Option<Variant>,

    /// JSON 配置文件，缺省字段取默认值
    #[arg(long)]
    config: Option<PathBuf>,

    /// 训练步数（实际执行 0..=N）
    #[arg(long)]
    steps: Option<u64>,

    /// MNIST 文件所在目录
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[arg(long)]
    seed: Option<u64>,

    /// 若检查点存在则从中继续训练
    #[arg(long)]
    resume: bool,

    /// 日志级别：error / warn / info / debug / trace
    #[arg(long, default_value = "info")]
    verbosity: Level,
}

impl Cli {
    fn into_config(self) -> gancoder::Result<TrainConfig> {
        let mut config = match &self.config {
            Some(path) => TrainConfig::from_json_file(path)?,
            None => TrainConfig::default(),
        };
        if let Some(variant) = self.variant {
            config.variant = variant;
        }
        if let Some(steps) = self.steps {
            config.training_steps = steps;
        }
        if self.data_dir.is_some() {
            config.data_dir = self.data_dir;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.resume |= self.resume;
        Ok(config)
    }
}

fn run(cli: Cli) -> gancoder::Result<()> {
    let config = cli.into_config()?;
    config.validate()?;

    let mut data = Datasets::read_mnist(
        config.data_dir.as_deref(),
        config.validation_size,
        config.seed,
    )?;
    let mut trainer = Trainer::new(config)?;
    let report = trainer.run(&mut data)?;

    tracing::info!(
        "训练完成：第{}到{}步，检查点{}，隐向量{}行写入{}",
        report.start_step,
        report.last_step,
        report.checkpoint.display(),
        report.latent_rows,
        report.latent_file.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_target(false)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
