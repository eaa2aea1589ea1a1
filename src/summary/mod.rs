/*
 * @Date         : 2026-10-19
 * @Description  : 训练摘要：标量和图像网格按步记录到 `{log_dir}/events.jsonl`（每行一条 JSON），
 *                 图像本身另存为 `{log_dir}/images/{tag}_{step:06}.png`
 */

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::tensor::Tensor;
use crate::vision::Vision;

pub const EVENTS_FILE: &str = "events.jsonl";

/// events.jsonl 中的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Event {
    Scalar {
        step: u64,
        wall_time: f64,
        tag: String,
        value: f32,
    },
    Image {
        step: u64,
        wall_time: f64,
        tag: String,
        /// 相对于 log_dir 的路径
        path: PathBuf,
        height: usize,
        width: usize,
    },
}

impl Event {
    pub const fn step(&self) -> u64 {
        match self {
            Self::Scalar { step, .. } | Self::Image { step, .. } => *step,
        }
    }
}

/// 追加写入的摘要记录器；重复打开同一目录时接着已有内容写
pub struct SummaryWriter {
    log_dir: PathBuf,
    writer: BufWriter<File>,
}

impl SummaryWriter {
    pub fn new<P: AsRef<Path>>(log_dir: P) -> Result<Self> {
        let log_dir = log_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(log_dir.join("images"))?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_dir.join(EVENTS_FILE))?;
        Ok(Self {
            log_dir,
            writer: BufWriter::new(file),
        })
    }

    pub fn add_scalar(&mut self, tag: &str, value: f32, step: u64) -> Result<()> {
        self.write_event(&Event::Scalar {
            step,
            wall_time: wall_time(),
            tag: tag.to_string(),
            value,
        })
    }

    /// `image` 为已拼好的二维网格
    pub fn add_image(&mut self, tag: &str, image: &Tensor, step: u64) -> Result<()> {
        let relative = PathBuf::from("images").join(format!("{tag}_{step:06}.png"));
        Vision::save_image(image, self.log_dir.join(&relative), ImageFormat::Png)?;
        self.write_event(&Event::Image {
            step,
            wall_time: wall_time(),
            tag: tag.to_string(),
            path: relative,
            height: image.rows(),
            width: image.cols(),
        })
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn write_event(&mut self, event: &Event) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

fn wall_time() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64())
}

/// 读回全部记录
pub fn read_events<P: AsRef<Path>>(log_dir: P) -> Result<Vec<Event>> {
    let text = std::fs::read_to_string(log_dir.as_ref().join(EVENTS_FILE))?;
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| Ok(serde_json::from_str(line)?))
        .collect()
}
