/*
 * @Date         : 2026-10-19
 * @Description  : 二维张量（矩阵）。本crate里所有数据都是 [行, 列] 形式：
 *                 行对应batch中的样本，列对应特征。
 */

use ndarray::{Array2, ArrayView2, Axis, concatenate};
use rand::Rng;
use serde::{Deserialize, Serialize};

mod ops;

#[cfg(test)]
mod tests;

/// 行优先的 `f32` 矩阵
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    data: Array2<f32>,
}

impl Tensor {
    /// 由扁平数据和形状 `[rows, cols]` 创建张量。
    /// `data` 的长度必须等于 `rows * cols`，否则panic。
    pub fn new(data: &[f32], shape: &[usize]) -> Self {
        assert_eq!(shape.len(), 2, "张量形状必须是 [rows, cols]，实际为{shape:?}");
        let data = Array2::from_shape_vec((shape[0], shape[1]), data.to_vec())
            .expect("数据长度与形状不符");
        Self { data }
    }

    pub fn from_array(data: Array2<f32>) -> Self {
        Self { data }
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(shape, 0.0)
    }

    pub fn ones(shape: &[usize]) -> Self {
        Self::full(shape, 1.0)
    }

    pub fn full(shape: &[usize], value: f32) -> Self {
        assert_eq!(shape.len(), 2, "张量形状必须是 [rows, cols]，实际为{shape:?}");
        Self {
            data: Array2::from_elem((shape[0], shape[1]), value),
        }
    }

    /// 截断正态分布：偏离均值超过2个标准差的样本会被丢弃重采
    pub fn truncated_normal<R: Rng>(mean: f32, std_dev: f32, shape: &[usize], rng: &mut R) -> Self {
        let data_len = shape.iter().product::<usize>();
        let mut data = Vec::with_capacity(data_len);

        // Box-Muller 变换
        while data.len() < data_len {
            let u1: f32 = rng.gen_range(f32::EPSILON..1.0);
            let u2: f32 = rng.gen_range(0.0..1.0);
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            for z in [r * theta.cos(), r * theta.sin()] {
                if data.len() < data_len && z.is_finite() && z.abs() <= 2.0 {
                    data.push(mean + std_dev * z);
                }
            }
        }

        Self::new(&data, shape)
    }
}

// 属性
impl Tensor {
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    /// 按行优先顺序拷贝出全部元素
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }

    pub fn row(&self, index: usize) -> Vec<f32> {
        self.data.row(index).to_vec()
    }

    /// 若张量只有一个元素，返回该元素
    pub fn get_data_number(&self) -> Option<f32> {
        if self.size() == 1 {
            self.data.iter().next().copied()
        } else {
            None
        }
    }

    /// 空张量返回 `None`
    pub fn min(&self) -> Option<f32> {
        self.data.iter().copied().reduce(f32::min)
    }

    pub fn max(&self) -> Option<f32> {
        self.data.iter().copied().reduce(f32::max)
    }

    /// 空张量的均值视为0
    pub fn mean(&self) -> f32 {
        if self.size() == 0 {
            return 0.0;
        }
        self.data.sum() / self.size() as f32
    }
}

// 运算
impl Tensor {
    /// 矩阵乘法。调用方负责保证 `self.cols() == other.rows()`
    pub fn mat_mul(&self, other: &Self) -> Self {
        Self {
            data: self.data.dot(&other.data),
        }
    }

    pub fn transpose(&self) -> Self {
        Self {
            data: self.data.t().to_owned(),
        }
    }

    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            data: self.data.mapv(f),
        }
    }

    pub fn tanh(&self) -> Self {
        self.map(f32::tanh)
    }

    pub fn relu(&self) -> Self {
        self.map(|x| x.max(0.0))
    }

    pub fn sqrt(&self) -> Self {
        self.map(f32::sqrt)
    }

    /// 沿行方向求和：[n, m] -> [1, m]
    pub fn sum_rows(&self) -> Self {
        Self {
            data: self.data.sum_axis(Axis(0)).insert_axis(Axis(0)),
        }
    }

    /// 按行拼接：[n, m] + [k, m] -> [n + k, m]。列数不同时返回 `None`
    pub fn concat_rows(top: &Self, bottom: &Self) -> Option<Self> {
        concatenate(Axis(0), &[top.data.view(), bottom.data.view()])
            .ok()
            .map(Self::from_array)
    }

    /// 取出第 `[start, end)` 行
    pub fn slice_rows(&self, start: usize, end: usize) -> Self {
        Self {
            data: self.data.slice(ndarray::s![start..end, ..]).to_owned(),
        }
    }

    /// 按给定行号（可重复、可乱序）组成新张量
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            data: self.data.select(Axis(0), indices),
        }
    }

    /// `reshape` 成新的 [rows, cols]，元素总数须一致
    pub fn reshape(&self, shape: &[usize]) -> Self {
        Self::new(&self.to_vec(), shape)
    }
}
