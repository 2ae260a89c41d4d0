use super::Tensor;
use crate::errors::TensorError;
use ndarray::Axis;
use std::collections::HashSet;

impl Tensor {
    /// 若为向量，`shape`可以是[n]、[1,n]、[n,1]；
    /// 若为矩阵，`shape`可以是[n,m]；
    /// 若为更高维度的数组，`shape`可以是[c,n,m,...]。
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// 张量的维（dim）数、阶（rank）数
    /// 即`shape()`的元素个数--如：形状为`[]`的标量阶数为0，向量阶数为1，矩阵阶数为2，以此类推
    pub fn dimension(&self) -> usize {
        self.data.ndim()
    }

    /// 计算张量中所有元素的数量
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 判断两个张量的形状是否严格一致。如：形状为 [1, 4]，[1, 4]和[4]是不一致的，会返回false
    pub fn is_same_shape(&self, other: &Self) -> bool {
        self.shape() == other.shape()
    }

    pub fn reshape(&self, shape: &[usize]) -> Result<Self, TensorError> {
        let new_total_elements: usize = shape.iter().product();
        if self.size() != new_total_elements {
            return Err(TensorError::IncompatibleShape);
        }
        let data = self
            .data
            .as_standard_layout()
            .into_owned()
            .into_shape(shape)
            .map_err(|_| TensorError::IncompatibleShape)?;
        Ok(Self { data })
    }

    /// 在指定维度上增加一个长度为1的维度。
    ///
    /// * `dim` - 要增加维度的索引。若`dim`为正数或零，则从头开始计数；
    /// 若`dim`为负数，则从末尾开始计数。例如，-1表示在最后一个维度后增加。
    ///
    /// # 示例
    ///
    /// ```
    /// use only_adapter::Tensor;
    ///
    /// let tensor = Tensor::new(&[1.0, 2.0, 3.0], &[3]);
    /// assert_eq!(tensor.unsqueeze(0).unwrap().shape(), &[1, 3]);
    /// assert_eq!(tensor.unsqueeze(-1).unwrap().shape(), &[3, 1]);
    /// ```
    pub fn unsqueeze(&self, dim: isize) -> Result<Self, TensorError> {
        let rank = self.dimension();
        let axis = if dim < 0 {
            rank as isize + dim + 1
        } else {
            dim
        };
        if axis < 0 || axis as usize > rank {
            return Err(TensorError::DimOutOfRange { dim, rank });
        }
        Ok(Self {
            data: self.data.clone().insert_axis(Axis(axis as usize)),
        })
    }

    /// 按`axes`给出的顺序重排张量的维度，并将其返回（不影响原张量）
    pub fn permute(&self, axes: &[usize]) -> Result<Self, TensorError> {
        if axes.len() < 2 {
            return Err(TensorError::PermuteNeedAtLeast2Dims);
        }
        // 检查axes中的所有元素必须是唯一且在[0, <张量维数>)范围内
        let unique_axes = axes.iter().copied().collect::<HashSet<_>>();
        if axes.len() != self.dimension()
            || unique_axes.len() != axes.len()
            || !unique_axes.iter().all(|&a| a < self.dimension())
        {
            return Err(TensorError::PermuteNeedUniqueAndInRange);
        }

        let permuted = self.data.clone().permuted_axes(axes);
        Ok(Self {
            data: permuted.as_standard_layout().into_owned(),
        })
    }
}
