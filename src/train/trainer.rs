/*
 * @Date         : 2026-10-19
 * @Description  : 训练驱动
 *
 * INIT：构图、校验参数分组、创建优化器、（可选）从检查点恢复、取固定的首批样本并输出 input.jpg
 * LOOP：step 取 start..=training_steps
 *       - step % summary_interval == 0：在当前批次上计算损失，记日志和摘要
 *         （恢复训练时若摘要里已有起始步的记录则跳过该步，避免重复）
 *       - step % checkpoint_interval == 0：用首批样本输出重建图，保存检查点
 *       - 每步：一次生成器更新；gancoder 再做 discriminator_steps 次判别器更新
 * DONE：在评估集上导出隐向量，保存最终检查点
 */

use std::path::PathBuf;

use super::config::TrainConfig;
use super::export::write_latent;
use crate::data::{Batch, DataSource};
use crate::errors::{Error, Result};
use crate::model::{Objective, Variant};
use crate::nn::{Adam, Graph, GraphError, NodeId, Optimizer};
use crate::summary::{SummaryWriter, read_events};
use crate::tensor::Tensor;
use crate::vision::Vision;

/// 某一步评估得到的损失
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Losses {
    Autoencoder { loss: f32 },
    Gancoder { g_loss: f32, d_loss: f32 },
}

impl Losses {
    /// 重建损失（gancoder 中即 g_loss）
    pub const fn reconstruction(&self) -> f32 {
        match *self {
            Self::Autoencoder { loss } => loss,
            Self::Gancoder { g_loss, .. } => g_loss,
        }
    }
}

/// 一次 `run` 的结果
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub start_step: u64,
    /// 最后执行的一步
    pub last_step: u64,
    /// 每次摘要时的 (step, 损失)
    pub history: Vec<(u64, Losses)>,
    pub checkpoint: PathBuf,
    pub latent_file: PathBuf,
    pub latent_rows: usize,
}

pub struct Trainer {
    config: TrainConfig,
    graph: Graph,
    objective: Objective,
    generator_optimizer: Adam,
    /// 仅 gancoder 有
    discriminator_optimizer: Option<Adam>,
}

impl Trainer {
    /// 构图并初始化参数；参数分组不满足“两两不相交且覆盖全部参数”时返回错误
    pub fn new(config: TrainConfig) -> Result<Self> {
        config.validate()?;
        let mut graph = match config.seed {
            Some(seed) => Graph::new_with_seed(seed),
            None => Graph::new(),
        };
        let objective = Objective::build(
            &mut graph,
            config.variant,
            config.coder_dims(),
            config.generator_loss_weight,
        )?;
        objective.groups().verify_partition(&graph)?;

        let adam = |params: &[NodeId]| {
            Adam::new(
                params,
                config.learning_rate,
                config.beta1,
                config.beta2,
                config.epsilon,
            )
        };
        let groups = objective.groups();
        let generator_optimizer = adam(&groups.generator());
        let discriminator_optimizer = match objective.variant() {
            Variant::Autoencoder => None,
            Variant::Gancoder => Some(adam(&groups.discriminator)),
        };

        tracing::info!(
            "已构建{}：{}个节点，生成器参数{}个，判别器参数{}个",
            config.variant,
            graph.nodes_count(),
            groups.generator().len(),
            groups.discriminator.len()
        );

        Ok(Self {
            config,
            graph,
            objective,
            generator_optimizer,
            discriminator_optimizer,
        })
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn run<D: DataSource>(&mut self, data: &mut D) -> Result<TrainReport> {
        let input_width = self.config.input_width();
        if data.eval_split().width() != input_width {
            return Err(Error::Config(format!(
                "数据每个样本有{}个特征，而配置的图像尺寸为{}x{}",
                data.eval_split().width(),
                self.config.image_height,
                self.config.image_width
            )));
        }

        let start_step = self.restore()?;
        let mut summary = SummaryWriter::new(&self.config.log_dir)?;
        let skip_summary_at = self.already_summarized(start_step)?;

        let first_batch = data.next_batch(self.config.batch_size)?;
        Vision::save_grid_jpeg(
            &first_batch.images,
            self.config.grid(),
            self.config.image_dims(),
            self.config.image_dir.join("input.jpg"),
        )?;

        let mut history = Vec::new();
        let mut last_step = start_step;
        for step in start_step..=self.config.training_steps {
            last_step = step;
            let batch = data.next_batch(self.config.batch_size)?;
            self.feed(&batch.images)?;

            if skip_summary_at == Some(step) {
                tracing::debug!("第{step}步的摘要已存在，跳过");
            } else if step % self.config.summary_interval == 0 {
                let losses = self.write_summary(&mut summary, &batch, step)?;
                history.push((step, losses));
            }

            if step % self.config.checkpoint_interval == 0 {
                self.render_output(&first_batch, step)?;
                self.save_checkpoint(step)?;
                self.feed(&batch.images)?;
            }

            self.train_step()?;
        }

        let eval = data.eval_split();
        let latent = self.encode(eval.images())?;
        write_latent(&self.config.latent_file, &latent, eval.labels())?;
        let final_step = if start_step > self.config.training_steps {
            start_step
        } else {
            last_step + 1
        };
        self.save_checkpoint(final_step)?;

        Ok(TrainReport {
            start_step,
            last_step,
            history,
            checkpoint: self.config.checkpoint_path().to_path_buf(),
            latent_file: self.config.latent_file.clone(),
            latent_rows: latent.rows(),
        })
    }

    /// 需要恢复且检查点存在时载入参数，返回起始步
    fn restore(&mut self) -> Result<u64> {
        if !self.config.resume {
            return Ok(0);
        }
        let path = self.config.checkpoint_path();
        if !path.exists() {
            tracing::warn!("检查点{}不存在，从头开始训练", path.display());
            return Ok(0);
        }
        let step = self.graph.load_params(path)?;
        tracing::info!("已从{}恢复，继续第{}步", path.display(), step);
        Ok(step)
    }

    /// 从中断处恢复时，起始步的摘要可能在保存检查点前已经写过
    fn already_summarized(&self, start_step: u64) -> Result<Option<u64>> {
        if start_step == 0 || start_step % self.config.summary_interval != 0 {
            return Ok(None);
        }
        let written = read_events(&self.config.log_dir)?
            .iter()
            .any(|event| event.step() == start_step);
        Ok(written.then_some(start_step))
    }

    fn feed(&mut self, images: &Tensor) -> Result<()> {
        self.graph.set_node_value(self.objective.input(), images)?;
        Ok(())
    }

    /// 一次生成器更新，gancoder 接着做判别器更新
    fn train_step(&mut self) -> Result<()> {
        self.generator_optimizer
            .minimize(&mut self.graph, self.objective.generator_objective())?;
        if let (Objective::Gancoder(o), Some(optimizer)) =
            (&self.objective, self.discriminator_optimizer.as_mut())
        {
            for _ in 0..self.config.discriminator_steps {
                optimizer.minimize(&mut self.graph, o.d_loss)?;
            }
        }
        Ok(())
    }

    /// 在当前喂入的批次上计算损失、隐向量和重建
    fn evaluate(&mut self) -> Result<Losses> {
        let (encoded, decoded) = (self.objective.encoded(), self.objective.decoded());
        let losses = match &self.objective {
            Objective::Autoencoder(o) => {
                self.graph.forward_nodes(&[o.loss, encoded, decoded])?;
                Losses::Autoencoder {
                    loss: self.scalar(o.loss)?,
                }
            }
            Objective::Gancoder(o) => {
                self.graph
                    .forward_nodes(&[o.g_loss, o.d_loss, encoded, decoded])?;
                Losses::Gancoder {
                    g_loss: self.scalar(o.g_loss)?,
                    d_loss: self.scalar(o.d_loss)?,
                }
            }
        };
        Ok(losses)
    }

    fn scalar(&self, id: NodeId) -> Result<f32> {
        let value = self.graph.expect_node_value(id)?;
        value.get_data_number().ok_or_else(|| {
            GraphError::ComputationError(format!("损失节点的值应为标量，实际形状为{:?}", value.shape()))
                .into()
        })
    }

    fn write_summary(&mut self, summary: &mut SummaryWriter, batch: &Batch, step: u64) -> Result<Losses> {
        let losses = self.evaluate()?;
        match losses {
            Losses::Autoencoder { loss } => {
                tracing::info!("step {step}, training loss: {loss}");
                summary.add_scalar("Loss", loss, step)?;
            }
            Losses::Gancoder { g_loss, d_loss } => {
                tracing::info!("step {step}, g loss: {g_loss}, d loss: {d_loss}");
                summary.add_scalar("GenLoss", g_loss, step)?;
                summary.add_scalar("DisLoss", d_loss, step)?;
            }
        }

        let grid = self.config.grid();
        let image_dims = self.config.image_dims();
        let encoded = self.graph.expect_node_value(self.objective.encoded())?;
        let decoded = self.graph.expect_node_value(self.objective.decoded())?;
        summary.add_image(
            "Input",
            &Vision::form_image_grid(&batch.images, grid, image_dims)?,
            step,
        )?;
        summary.add_image(
            "Encoder",
            &Vision::form_image_grid(encoded, grid, (self.config.encoding_size, 1))?,
            step,
        )?;
        summary.add_image("Output", &Vision::form_image_grid(decoded, grid, image_dims)?, step)?;
        summary.flush()?;
        Ok(losses)
    }

    /// 首批样本的重建图 `output_{step:06}.jpg`
    fn render_output(&mut self, first_batch: &Batch, step: u64) -> Result<()> {
        self.feed(&first_batch.images)?;
        let decoded = self.objective.decoded();
        self.graph.forward(decoded)?;
        Vision::save_grid_jpeg(
            self.graph.expect_node_value(decoded)?,
            self.config.grid(),
            self.config.image_dims(),
            self.config.image_dir.join(format!("output_{step:06}.jpg")),
        )?;
        Ok(())
    }

    /// 检查点记录的是恢复后应执行的第一步
    fn save_checkpoint(&self, next_step: u64) -> Result<()> {
        let path = self.config.checkpoint_path();
        self.graph.save_params(path, next_step)?;
        tracing::info!("已保存检查点{}（下一步为{}）", path.display(), next_step);
        Ok(())
    }

    /// 对任意一批输入计算隐向量
    pub fn encode(&mut self, images: &Tensor) -> Result<Tensor> {
        self.feed(images)?;
        let encoded = self.objective.encoded();
        self.graph.forward(encoded)?;
        Ok(self.graph.expect_node_value(encoded)?.clone())
    }

    /// 对任意一批输入计算重建
    pub fn reconstruct(&mut self, images: &Tensor) -> Result<Tensor> {
        self.feed(images)?;
        let decoded = self.objective.decoded();
        self.graph.forward(decoded)?;
        Ok(self.graph.expect_node_value(decoded)?.clone())
    }
}
