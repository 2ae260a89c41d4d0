/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 数据格式（通道位置）的定义与相互转换
 *
 * 不同框架对图像类张量的通道位置约定不同：
 * - channels_last  ：(N, H, W, C)，如 TensorFlow 的默认格式
 * - channels_first ：(N, C, H, W)，如 PyTorch
 * 阶数小于3的张量（如全连接层的 (N, D)）没有通道维，转换时保持不变。
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-18
 */

use std::fmt::{self, Display};
use std::ops::Range;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{NetworkError, TensorError};
use crate::tensor::Tensor;

#[cfg(test)]
mod tests;

/// 通道维在张量中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFormat {
    /// (N, C, H, W)
    ChannelsFirst,
    /// (N, H, W, C)
    #[default]
    ChannelsLast,
}

impl DataFormat {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ChannelsFirst => "channels_first",
            Self::ChannelsLast => "channels_last",
        }
    }

    /// 给定阶数的张量中通道维的索引；阶数小于3时没有通道维
    pub fn channel_axis(&self, rank: usize) -> Option<usize> {
        if rank < 3 {
            return None;
        }
        match self {
            Self::ChannelsFirst => Some(1),
            Self::ChannelsLast => Some(rank - 1),
        }
    }

    /// 给定阶数（含batch维）的张量中空间维的索引范围
    pub fn spatial_axes(&self, rank: usize) -> Range<usize> {
        if rank < 3 {
            return 1..rank.max(1);
        }
        match self {
            Self::ChannelsFirst => 2..rank,
            Self::ChannelsLast => 1..rank - 1,
        }
    }

    /// 从`self`转换到`target`所需的维度排列；无需转换时返回None
    fn permutation_to(&self, target: DataFormat, rank: usize) -> Option<Vec<usize>> {
        if *self == target || rank < 3 {
            return None;
        }
        let axes = match self {
            // (N, H, W, C) -> (N, C, H, W)
            Self::ChannelsLast => std::iter::once(0)
                .chain(std::iter::once(rank - 1))
                .chain(1..rank - 1)
                .collect(),
            // (N, C, H, W) -> (N, H, W, C)
            Self::ChannelsFirst => std::iter::once(0)
                .chain(2..rank)
                .chain(std::iter::once(1))
                .collect(),
        };
        Some(axes)
    }
}

impl Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DataFormat {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "channels_first" | "NCHW" => Ok(Self::ChannelsFirst),
            "channels_last" | "NHWC" => Ok(Self::ChannelsLast),
            _ => Err(NetworkError::InvalidArgument(format!(
                "未知的数据格式`{s}`，应为channels_first或channels_last"
            ))),
        }
    }
}

/// 将张量从`input_format`转换为`output_format`，即把通道维在第1维与最后一维之间移动。
/// 格式相同或阶数小于3时原样返回。
///
/// # 示例
/// ```
/// use only_adapter::{DataFormat, Tensor, convert_data_format};
///
/// let nhwc = Tensor::zeros(&[2, 28, 28, 3]);
/// let nchw = convert_data_format(&nhwc, DataFormat::ChannelsLast, DataFormat::ChannelsFirst).unwrap();
/// assert_eq!(nchw.shape(), &[2, 3, 28, 28]);
/// ```
pub fn convert_data_format(
    tensor: &Tensor,
    input_format: DataFormat,
    output_format: DataFormat,
) -> Result<Tensor, TensorError> {
    match input_format.permutation_to(output_format, tensor.dimension()) {
        Some(axes) => {
            debug!(
                "数据格式转换 {input_format} -> {output_format}：{:?} 按 {axes:?} 重排",
                tensor.shape()
            );
            tensor.permute(&axes)
        }
        None => Ok(tensor.clone()),
    }
}

/// 对形状做与[`convert_data_format`]相同的维度重排
pub fn convert_shape<T: Copy>(
    shape: &[T],
    input_format: DataFormat,
    output_format: DataFormat,
) -> Vec<T> {
    match input_format.permutation_to(output_format, shape.len()) {
        Some(axes) => axes.iter().map(|&a| shape[a]).collect(),
        None => shape.to_vec(),
    }
}
