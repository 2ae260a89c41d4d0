/*
 * DynamicShape: 层输入/输出形状的表示
 *
 * 类似 Keras/TensorFlow 的 (None, 28, 28, 1) 设计，允许某些维度未知。
 * 框架绑定给出的层形状通常带有一个未设定的 batch 维。
 *
 * # 示例
 * ```
 * use only_adapter::DynamicShape;
 *
 * let fixed = DynamicShape::fixed(&[32, 128]);
 * assert_eq!(fixed.to_string(), "[32, 128]");
 *
 * let dynamic_batch = DynamicShape::with_dynamic_batch(&[28, 28, 1]);
 * assert_eq!(dynamic_batch.to_string(), "[?, 28, 28, 1]");
 * ```
 */

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::format::{DataFormat, convert_shape};

/// 维度值：Some(n) 表示固定值 n，None 表示未设定（任意值）
pub type Dim = Option<usize>;

/// 带可选未知维度的形状
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicShape {
    dims: Vec<Dim>,
}

impl DynamicShape {
    pub fn new(dims: &[Dim]) -> Self {
        Self {
            dims: dims.to_vec(),
        }
    }

    /// 从固定形状创建（所有维度都是确定的）
    pub fn fixed(dims: &[usize]) -> Self {
        Self {
            dims: dims.iter().map(|&d| Some(d)).collect(),
        }
    }

    /// 创建一个 batch 维未设定的形状：第一维是 None，其余维度固定。
    ///
    /// # 示例
    /// ```
    /// use only_adapter::DynamicShape;
    ///
    /// let shape = DynamicShape::with_dynamic_batch(&[128, 64]);
    /// assert_eq!(shape.to_string(), "[?, 128, 64]");
    /// ```
    pub fn with_dynamic_batch(feature_dims: &[usize]) -> Self {
        let mut dims = vec![None];
        dims.extend(feature_dims.iter().map(|&d| Some(d)));
        Self { dims }
    }

    /// 获取维度数量
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// 获取指定维度的值：固定时为 Some(n)，未设定或越界时为 None
    pub fn dim(&self, index: usize) -> Dim {
        self.dims.get(index).copied().flatten()
    }

    pub fn last(&self) -> Dim {
        self.dims.last().copied().flatten()
    }

    /// 检查指定维度是否未设定
    pub fn is_dynamic(&self, index: usize) -> bool {
        self.dims.get(index).map(|d| d.is_none()).unwrap_or(false)
    }

    pub fn has_dynamic_dims(&self) -> bool {
        self.dims.iter().any(|d| d.is_none())
    }

    /// 获取单个样本的形状（去掉第一维 batch）
    pub fn feature_shape(&self) -> DynamicShape {
        if self.dims.len() > 1 {
            DynamicShape::new(&self.dims[1..])
        } else {
            self.clone()
        }
    }

    /// 取出`range`范围内的维度组成新形状
    pub fn slice(&self, range: std::ops::Range<usize>) -> DynamicShape {
        let end = range.end.min(self.dims.len());
        let start = range.start.min(end);
        DynamicShape::new(&self.dims[start..end])
    }

    /// 检查此形状是否与实际张量形状兼容：维度数相同，且每个固定维度都相等
    ///
    /// # 示例
    /// ```
    /// use only_adapter::DynamicShape;
    ///
    /// let shape = DynamicShape::new(&[None, Some(128)]);
    /// assert!(shape.is_compatible_with_tensor(&[32, 128]));
    /// assert!(!shape.is_compatible_with_tensor(&[32, 64]));
    /// assert!(!shape.is_compatible_with_tensor(&[32, 128, 10]));
    /// ```
    pub fn is_compatible_with_tensor(&self, tensor_shape: &[usize]) -> bool {
        if self.dims.len() != tensor_shape.len() {
            return false;
        }
        self.dims
            .iter()
            .zip(tensor_shape.iter())
            .all(|(expected, &actual)| match expected {
                None => true,
                Some(n) => *n == actual,
            })
    }

    /// 单元数：所有维度之积。若 batch 维未设定则不计入；其余维度有未设定的则返回 None
    ///
    /// # 示例
    /// ```
    /// use only_adapter::DynamicShape;
    ///
    /// assert_eq!(DynamicShape::with_dynamic_batch(&[28, 28, 1]).units(), Some(784));
    /// assert_eq!(DynamicShape::fixed(&[2, 10]).units(), Some(20));
    /// assert_eq!(DynamicShape::new(&[None, None, Some(3)]).units(), None);
    /// ```
    pub fn units(&self) -> Option<usize> {
        let dims = match self.dims.first() {
            Some(None) => &self.dims[1..],
            _ => &self.dims[..],
        };
        dims.iter().copied().try_fold(1usize, |acc, d| d.map(|n| acc * n))
    }

    /// 按数据格式重排维度，见[`crate::format::convert_shape`]
    pub fn convert(&self, input_format: DataFormat, output_format: DataFormat) -> DynamicShape {
        DynamicShape {
            dims: convert_shape(&self.dims, input_format, output_format),
        }
    }

    /// 转换为固定形状向量；若有任何未设定的维度，返回 None
    pub fn to_vec_fixed(&self) -> Option<Vec<usize>> {
        self.dims.iter().copied().collect()
    }

    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }
}

impl fmt::Display for DynamicShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .dims
            .iter()
            .map(|d| match d {
                Some(n) => n.to_string(),
                None => "?".to_string(),
            })
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

impl From<&[usize]> for DynamicShape {
    fn from(shape: &[usize]) -> Self {
        DynamicShape::fixed(shape)
    }
}

impl From<Vec<usize>> for DynamicShape {
    fn from(shape: Vec<usize>) -> Self {
        DynamicShape::fixed(&shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_shape_creation() {
        let fixed = DynamicShape::fixed(&[32, 128]);
        assert_eq!(fixed.ndim(), 2);
        assert!(!fixed.has_dynamic_dims());
        assert_eq!(fixed.dim(0), Some(32));
        assert_eq!(fixed.dim(1), Some(128));
        assert_eq!(fixed.dim(2), None);

        let dynamic_batch = DynamicShape::with_dynamic_batch(&[128]);
        assert_eq!(dynamic_batch.ndim(), 2);
        assert!(dynamic_batch.has_dynamic_dims());
        assert!(dynamic_batch.is_dynamic(0));
        assert!(!dynamic_batch.is_dynamic(1));
        assert_eq!(dynamic_batch.last(), Some(128));
    }

    #[test]
    fn test_dynamic_shape_display() {
        assert_eq!(DynamicShape::fixed(&[32, 128]).to_string(), "[32, 128]");
        assert_eq!(
            DynamicShape::new(&[None, Some(10), None]).to_string(),
            "[?, 10, ?]"
        );
    }

    #[test]
    fn test_feature_shape_and_slice() {
        let shape = DynamicShape::with_dynamic_batch(&[28, 28, 3]);
        assert_eq!(shape.feature_shape().to_string(), "[28, 28, 3]");
        assert_eq!(shape.slice(1..3).to_string(), "[28, 28]");
        // 越界的范围被截断
        assert_eq!(shape.slice(3..6).to_string(), "[3]");
    }

    #[test]
    fn test_units() {
        // 未设定的batch维不计入
        assert_eq!(DynamicShape::with_dynamic_batch(&[4, 4, 8]).units(), Some(128));
        // 固定的batch维计入
        assert_eq!(DynamicShape::fixed(&[2, 4, 4, 8]).units(), Some(256));
        // 其余维度未设定时无法计算
        assert_eq!(DynamicShape::new(&[None, Some(4), None]).units(), None);
    }

    #[test]
    fn test_convert() {
        let nhwc = DynamicShape::with_dynamic_batch(&[32, 16, 3]);
        let nchw = nhwc.convert(DataFormat::ChannelsLast, DataFormat::ChannelsFirst);
        assert_eq!(nchw.to_string(), "[?, 3, 32, 16]");
        assert_eq!(
            nchw.convert(DataFormat::ChannelsFirst, DataFormat::ChannelsLast),
            nhwc
        );
    }

    #[test]
    fn test_serde_is_plain_list() {
        let shape = DynamicShape::with_dynamic_batch(&[10]);
        let json = serde_json::to_string(&shape).unwrap();
        assert_eq!(json, "[null,10]");
        let back: DynamicShape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, shape);
    }
}
