/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 参考框架绑定
 *
 * 一个纯内存的顺序模型，层类型只有 Dense、Conv2d 与 Flatten，数据格式为 channels_last。
 * 用来演示并测试 Backend 的实现方式：元数据一次性给出，激活值/净输入按需前向计算。
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-18
 */

mod model;
mod ops;


use std::collections::HashMap;

use log::debug;

pub use model::{Activation, LayerSpec, ModelSpec};

use self::model::{BuiltLayer, Op, build_layers};
use crate::errors::NetworkError;
use crate::format::DataFormat;
use crate::network::{Backend, DynamicShape, LayerDict, LayerInfo};
use crate::tensor::Tensor;

/// 前向计算时需要取出的中间结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// 激活函数之前
    NetInput,
    /// 激活函数之后
    Activation,
}

/// 参考框架绑定
///
/// ```
/// use only_adapter::reference::{ModelSpec, ReferenceBackend};
/// use only_adapter::{DataFormat, Network, Tensor};
///
/// let spec = ModelSpec::from_json(r#"{
///     "input_shape": [4],
///     "layers": [{"type": "dense", "name": "fc", "units": 2, "activation": "relu"}]
/// }"#).unwrap();
/// let network = Network::new(ReferenceBackend::new(spec).unwrap()).unwrap();
/// let output = network
///     .get_activations("fc", &Tensor::zeros(&[4]), DataFormat::ChannelsLast)
///     .unwrap()
///     .into_single()
///     .unwrap();
/// assert_eq!(output.shape(), &[1, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct ReferenceBackend {
    input_shape: Vec<usize>,
    layers: Vec<BuiltLayer>,
}

impl ReferenceBackend {
    pub fn new(spec: ModelSpec) -> Result<Self, NetworkError> {
        if spec.layers.is_empty() {
            return Err(NetworkError::EmptyNetwork);
        }
        let layers = build_layers(&spec)?;
        Ok(Self {
            input_shape: spec.input_shape,
            layers,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, NetworkError> {
        Self::new(ModelSpec::from_json(json)?)
    }

    /// 替换某层的权重与偏置，形状须与原来的一致
    pub fn set_parameters(
        &mut self,
        layer_name: &str,
        weights: Tensor,
        bias: Option<Tensor>,
    ) -> Result<(), NetworkError> {
        let layer = self
            .layers
            .iter_mut()
            .find(|l| l.name == layer_name)
            .ok_or_else(|| NetworkError::LayerNotFound(layer_name.to_string()))?;

        let weights_match = layer
            .weights
            .as_ref()
            .is_some_and(|w| w.is_same_shape(&weights));
        if !weights_match {
            return Err(NetworkError::InvalidArgument(format!(
                "层{layer_name}的权重形状应为{:?}，得到{:?}",
                layer.weights.as_ref().map(Tensor::shape),
                weights.shape()
            )));
        }
        let bias_match = match (&layer.bias, &bias) {
            (Some(old), Some(new)) => old.is_same_shape(new),
            (None, None) => true,
            _ => false,
        };
        if !bias_match {
            return Err(NetworkError::InvalidArgument(format!(
                "层{layer_name}的偏置形状应为{:?}，得到{:?}",
                layer.bias.as_ref().map(Tensor::shape),
                bias.as_ref().map(Tensor::shape)
            )));
        }

        layer.weights = Some(weights);
        layer.bias = bias;
        Ok(())
    }

    /// 前向计算，依次取出`layer_ids`中各层在`stage`阶段的值
    fn forward_collect(
        &self,
        layer_ids: &[String],
        input: &Tensor,
        stage: Stage,
    ) -> Result<Vec<Tensor>, NetworkError> {
        if input.shape().get(1..) != Some(&self.input_shape[..]) {
            return Err(NetworkError::InvalidArgument(format!(
                "输入形状须为[N, {}]，得到{:?}",
                self.input_shape
                    .iter()
                    .map(usize::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
                input.shape()
            )));
        }

        let mut pending = layer_ids.len();
        let mut collected: HashMap<&str, Tensor> = HashMap::new();
        let mut x = input.clone();
        for layer in &self.layers {
            if pending == 0 {
                break;
            }
            let z = match &layer.op {
                Op::Dense => ops::dense(
                    &x,
                    Self::weights_of(layer)?,
                    layer.bias.as_ref(),
                )?,
                Op::Conv2d(geometry) => ops::conv2d(
                    &x,
                    Self::weights_of(layer)?,
                    layer.bias.as_ref(),
                    geometry,
                )?,
                Op::Flatten => ops::flatten(&x)?,
            };
            let a = ops::activate(&z, layer.activation);
            debug!("参考前向：{} {:?} -> {:?}", layer.name, x.shape(), a.shape());

            if layer_ids.iter().any(|id| *id == layer.name) {
                let value = match stage {
                    Stage::NetInput => z,
                    Stage::Activation => a.clone(),
                };
                collected.insert(layer.name.as_str(), value);
                pending = layer_ids.len() - collected.len();
            }
            x = a;
        }

        layer_ids
            .iter()
            .map(|id| {
                collected
                    .get(id.as_str())
                    .cloned()
                    .ok_or_else(|| NetworkError::LayerNotFound(id.clone()))
            })
            .collect()
    }

    fn weights_of(layer: &BuiltLayer) -> Result<&Tensor, NetworkError> {
        layer
            .weights
            .as_ref()
            .ok_or_else(|| NetworkError::InvalidArgument(format!("层{}缺少权重", layer.name)))
    }
}

impl Backend for ReferenceBackend {
    fn data_format(&self) -> DataFormat {
        DataFormat::ChannelsLast
    }

    fn create_layer_dict(&self) -> Result<LayerDict, NetworkError> {
        let mut dict = LayerDict::new();
        for layer in &self.layers {
            let mut info = LayerInfo::new(
                &layer.name,
                DynamicShape::with_dynamic_batch(&layer.input_shape),
                DynamicShape::with_dynamic_batch(&layer.output_shape),
            );
            if let Some(weights) = &layer.weights {
                info = info.with_weights(weights.clone());
            }
            if let Some(bias) = &layer.bias {
                info = info.with_bias(bias.clone());
            }
            if let Op::Conv2d(geometry) = layer.op {
                info = info.with_conv_geometry(geometry);
            }
            dict.insert(info)?;
        }
        Ok(dict)
    }

    fn compute_activations(
        &self,
        layer_ids: &[String],
        input: &Tensor,
    ) -> Result<Vec<Tensor>, NetworkError> {
        self.forward_collect(layer_ids, input, Stage::Activation)
    }

    fn compute_net_input(
        &self,
        layer_ids: &[String],
        input: &Tensor,
    ) -> Result<Vec<Tensor>, NetworkError> {
        self.forward_collect(layer_ids, input, Stage::NetInput)
    }
}
