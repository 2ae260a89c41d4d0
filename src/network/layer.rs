/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 层元数据（LayerInfo）及按插入顺序保存的层字典（LayerDict）
 *
 * LayerInfo 由框架绑定在构建网络时一次性给出，此后不再修改。
 * 卷积层权重的排列约定为 (kH, kW, C_in, C_out)，即空间维在前、输入/输出通道在后。
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-18
 */

use std::collections::HashMap;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use super::DynamicShape;
use crate::errors::NetworkError;
use crate::tensor::Tensor;

/// 卷积运算的几何参数，均为 (纵向, 横向)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvGeometry {
    pub stride: (usize, usize),
    pub dilation: (usize, usize),
    pub padding: (usize, usize),
    /// 仅转置卷积有意义
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_padding: Option<(usize, usize)>,
}

impl Default for ConvGeometry {
    fn default() -> Self {
        Self {
            stride: (1, 1),
            dilation: (1, 1),
            padding: (0, 0),
            output_padding: None,
        }
    }
}

/// 单个层的元数据
#[derive(Debug, Clone)]
pub struct LayerInfo {
    id: String,
    input_shape: DynamicShape,
    output_shape: DynamicShape,
    weights: Option<Tensor>,
    bias: Option<Tensor>,
    num_parameters: Option<usize>,
    conv_geometry: Option<ConvGeometry>,
}

impl LayerInfo {
    pub fn new(id: &str, input_shape: DynamicShape, output_shape: DynamicShape) -> Self {
        Self {
            id: id.to_string(),
            input_shape,
            output_shape,
            weights: None,
            bias: None,
            num_parameters: None,
            conv_geometry: None,
        }
    }

    pub fn with_weights(mut self, weights: Tensor) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn with_bias(mut self, bias: Tensor) -> Self {
        self.bias = Some(bias);
        self
    }

    /// 显式给出参数数量（如框架还统计了权重与偏置以外的可学习参数）
    pub fn with_num_parameters(mut self, num_parameters: usize) -> Self {
        self.num_parameters = Some(num_parameters);
        self
    }

    pub fn with_conv_geometry(mut self, geometry: ConvGeometry) -> Self {
        self.conv_geometry = Some(geometry);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn input_shape(&self) -> &DynamicShape {
        &self.input_shape
    }

    pub fn output_shape(&self) -> &DynamicShape {
        &self.output_shape
    }

    pub fn weights(&self) -> Option<&Tensor> {
        self.weights.as_ref()
    }

    /// 没有权重的层（如 dropout、flatten）返回 None
    pub fn weights_shape(&self) -> Option<&[usize]> {
        self.weights.as_ref().map(|w| w.shape())
    }

    pub fn bias(&self) -> Option<&Tensor> {
        self.bias.as_ref()
    }

    /// 可学习参数数量；未显式给出时为权重与偏置元素数之和
    pub fn num_parameters(&self) -> usize {
        self.num_parameters.unwrap_or_else(|| {
            self.weights.as_ref().map_or(0, Tensor::size) + self.bias.as_ref().map_or(0, Tensor::size)
        })
    }

    pub fn conv_geometry(&self) -> Option<&ConvGeometry> {
        self.conv_geometry.as_ref()
    }

    /// 权重阶数大于2即视为卷积层
    pub fn is_convolutional(&self) -> bool {
        self.weights_shape().is_some_and(|shape| shape.len() > 2)
    }
}

/// 层id到层元数据的映射，保持插入顺序，且id唯一
#[derive(Debug, Clone, Default)]
pub struct LayerDict {
    layers: Vec<LayerInfo>,
    index: HashMap<String, usize>,
}

impl LayerDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, layer: LayerInfo) -> Result<(), NetworkError> {
        if self.index.contains_key(layer.id()) {
            return Err(NetworkError::DuplicateLayer(layer.id().to_string()));
        }
        self.index.insert(layer.id().to_string(), self.layers.len());
        self.layers.push(layer);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&LayerInfo> {
        self.index.get(id).map(|&i| &self.layers[i])
    }

    /// 按插入顺序的位置获取层
    pub fn get_index(&self, index: usize) -> Option<&LayerInfo> {
        self.layers.get(index)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(LayerInfo::id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LayerInfo> {
        self.layers.iter()
    }
}

impl TryFrom<Vec<LayerInfo>> for LayerDict {
    type Error = NetworkError;

    fn try_from(layers: Vec<LayerInfo>) -> Result<Self, Self::Error> {
        let mut dict = LayerDict::new();
        for layer in layers {
            dict.insert(layer)?;
        }
        Ok(dict)
    }
}

impl Index<usize> for LayerDict {
    type Output = LayerInfo;

    fn index(&self, index: usize) -> &Self::Output {
        &self.layers[index]
    }
}

impl<'a> IntoIterator for &'a LayerDict {
    type Item = &'a LayerInfo;
    type IntoIter = std::slice::Iter<'a, LayerInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}
