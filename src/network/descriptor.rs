/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 网络描述符（Network Descriptor）
 *                 把层元数据整理成可序列化的摘要，用于保存、比较与调试输出
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-18
 */

use serde::{Deserialize, Serialize};

use super::{ConvGeometry, DynamicShape, LayerInfo};
use crate::errors::NetworkError;
use crate::format::DataFormat;

/// 网络的可序列化描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    /// 格式版本（用于向后兼容）
    pub version: String,
    pub data_format: DataFormat,
    pub layers: Vec<LayerDescriptor>,
}

/// 层描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    pub id: String,
    pub input_shape: DynamicShape,
    pub output_shape: DynamicShape,
    pub weights_shape: Option<Vec<usize>>,
    pub bias_shape: Option<Vec<usize>>,
    pub num_parameters: usize,
    pub is_convolutional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conv_geometry: Option<ConvGeometry>,
}

impl NetworkDescriptor {
    pub fn new(data_format: DataFormat) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_format,
            layers: Vec::new(),
        }
    }

    pub fn add_layer(&mut self, layer: LayerDescriptor) {
        self.layers.push(layer);
    }

    /// 获取总参数量
    pub fn total_params(&self) -> usize {
        self.layers.iter().map(|l| l.num_parameters).sum()
    }

    pub fn to_json(&self) -> Result<String, NetworkError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, NetworkError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<&LayerInfo> for LayerDescriptor {
    fn from(layer: &LayerInfo) -> Self {
        Self {
            id: layer.id().to_string(),
            input_shape: layer.input_shape().clone(),
            output_shape: layer.output_shape().clone(),
            weights_shape: layer.weights_shape().map(<[usize]>::to_vec),
            bias_shape: layer.bias().map(|b| b.shape().to_vec()),
            num_parameters: layer.num_parameters(),
            is_convolutional: layer.is_convolutional(),
            conv_geometry: layer.conv_geometry().copied(),
        }
    }
}
