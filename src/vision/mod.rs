/*
 * @Date         : 2026-10-19
 * @Description  : 本模块提供训练过程的可视化：把一批展平的图像拼成网格，
 *                 再按 IntensityMapping 映射为 8 位灰度图写到本地（JPEG 或 PNG）。
 */

mod error;
mod intensity;

pub use error::VisionError;
pub use intensity::{IntensityMapping, ZERO_THRESHOLD};

use crate::tensor::Tensor;
use image::{GrayImage, ImageFormat, Luma};
use std::path::Path;


pub struct Vision;

impl Vision {
    /// 把 `[rows * cols, h * w]` 的一批图像按行优先拼成 `[rows * h, cols * w]` 的网格：
    /// 第 `i` 张图像位于第 `i / cols` 行、第 `i % cols` 列
    pub fn form_image_grid(
        images: &Tensor,
        grid: (usize, usize),
        image_dims: (usize, usize),
    ) -> Result<Tensor, VisionError> {
        let (grid_rows, grid_cols) = grid;
        let (height, width) = image_dims;
        if images.rows() != grid_rows * grid_cols {
            return Err(VisionError::GridSizeMismatch {
                expected: grid_rows * grid_cols,
                got: images.rows(),
            });
        }
        if images.cols() != height * width {
            return Err(VisionError::ImageSizeMismatch {
                expected: height * width,
                got: images.cols(),
            });
        }

        let mut out = Tensor::zeros(&[grid_rows * height, grid_cols * width]);
        for tile in 0..images.rows() {
            let (top, left) = ((tile / grid_cols) * height, (tile % grid_cols) * width);
            for y in 0..height {
                for x in 0..width {
                    out[[top + y, left + x]] = images[[tile, y * width + x]];
                }
            }
        }
        Ok(out)
    }

    /// 按张量自身的取值范围转换为灰度图
    pub fn to_gray_image(tensor: &Tensor) -> GrayImage {
        let mapping = IntensityMapping::for_tensor(tensor);
        let view = tensor.view();
        GrayImage::from_fn(tensor.cols() as u32, tensor.rows() as u32, |x, y| {
            Luma([mapping.apply(view[[y as usize, x as usize]])])
        })
    }

    /// 保存为图像文件（父目录不存在时自动创建）
    pub fn save_image<P: AsRef<Path>>(
        tensor: &Tensor,
        path: P,
        format: ImageFormat,
    ) -> Result<(), VisionError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::to_gray_image(tensor).save_with_format(path, format)?;
        tracing::debug!("已写入图像{}", path.display());
        Ok(())
    }

    /// 拼网格并保存为 JPEG
    pub fn save_grid_jpeg<P: AsRef<Path>>(
        images: &Tensor,
        grid: (usize, usize),
        image_dims: (usize, usize),
        path: P,
    ) -> Result<(), VisionError> {
        let grid = Self::form_image_grid(images, grid, image_dims)?;
        Self::save_image(&grid, path, ImageFormat::Jpeg)
    }
}
