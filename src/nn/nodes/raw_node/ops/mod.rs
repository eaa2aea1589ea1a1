mod add_bias;
mod concat_rows;
mod mat_mul;
mod real_fake_labels;
mod relu;
mod tanh;
mod weighted_sum;

pub(in crate::nn) use add_bias::AddBias;
pub(in crate::nn) use concat_rows::ConcatRows;
pub(in crate::nn) use mat_mul::MatMul;
pub(in crate::nn) use real_fake_labels::RealFakeLabels;
pub use real_fake_labels::{FAKE_LABEL, REAL_LABEL};
pub(in crate::nn) use relu::Relu;
pub(in crate::nn) use tanh::Tanh;
pub(in crate::nn) use weighted_sum::WeightedSum;
