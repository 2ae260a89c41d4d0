/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 参考实现所用的模型描述（可从 JSON 加载）及其形状推断
 *
 * 所有形状均不含 batch 维，且为通道在后：
 * - Dense 的输入/输出为 [D]
 * - Conv2d 的输入/输出为 [H, W, C]，权重为 [kH, kW, C_in, C_out]
 *
 * Conv2d 输出尺寸计算：
 * H' = (H + 2*padding_h - dilation_h*(kernel_h-1) - 1) / stride_h + 1
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-18
 */

use serde::{Deserialize, Serialize};

use crate::errors::{ComparisonOperator, NetworkError, TensorError};
use crate::network::ConvGeometry;
use crate::tensor::Tensor;

/// 激活函数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    pub fn apply(&self, x: f32) -> f32 {
        match self {
            Self::Linear => x,
            Self::Relu => x.max(0.0),
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Tanh => x.tanh(),
        }
    }
}

const fn one_pair() -> (usize, usize) {
    (1, 1)
}

const fn default_true() -> bool {
    true
}

/// 单个层的描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerSpec {
    Dense {
        name: String,
        units: usize,
        #[serde(default)]
        activation: Activation,
        #[serde(default = "default_true")]
        use_bias: bool,
    },
    Conv2d {
        name: String,
        filters: usize,
        kernel_size: (usize, usize),
        #[serde(default = "one_pair")]
        stride: (usize, usize),
        #[serde(default)]
        padding: (usize, usize),
        #[serde(default = "one_pair")]
        dilation: (usize, usize),
        #[serde(default)]
        activation: Activation,
        #[serde(default = "default_true")]
        use_bias: bool,
    },
    Flatten {
        name: String,
    },
}

impl LayerSpec {
    pub fn name(&self) -> &str {
        match self {
            Self::Dense { name, .. } | Self::Conv2d { name, .. } | Self::Flatten { name } => name,
        }
    }
}

/// 顺序模型的描述
///
/// ```
/// use only_adapter::reference::ModelSpec;
///
/// let spec = ModelSpec::from_json(r#"{
///     "input_shape": [8, 8, 1],
///     "layers": [
///         {"type": "conv2d", "name": "conv", "filters": 2, "kernel_size": [3, 3], "activation": "relu"},
///         {"type": "flatten", "name": "flat"},
///         {"type": "dense", "name": "out", "units": 3}
///     ]
/// }"#).unwrap();
/// assert_eq!(spec.layers.len(), 3);
/// assert_eq!(spec.layers[2].name(), "out");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// 单个样本的输入形状（不含 batch 维，通道在后）
    pub input_shape: Vec<usize>,
    pub layers: Vec<LayerSpec>,
    /// 随机初始化权重所用的种子
    #[serde(default)]
    pub seed: u64,
}

impl ModelSpec {
    pub fn from_json(json: &str) -> Result<Self, NetworkError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// 层的运算
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum Op {
    Dense,
    Conv2d(ConvGeometry),
    Flatten,
}

/// 已完成形状推断与权重初始化的层
#[derive(Debug, Clone)]
pub(super) struct BuiltLayer {
    pub name: String,
    pub op: Op,
    pub activation: Activation,
    pub input_shape: Vec<usize>,
    pub output_shape: Vec<usize>,
    pub weights: Option<Tensor>,
    pub bias: Option<Tensor>,
}

pub(super) fn build_layers(spec: &ModelSpec) -> Result<Vec<BuiltLayer>, NetworkError> {
    let mut layers = Vec::with_capacity(spec.layers.len());
    let mut shape = spec.input_shape.clone();
    for (i, layer_spec) in spec.layers.iter().enumerate() {
        let seed = spec.seed.wrapping_add(i as u64);
        let layer = build_layer(layer_spec, &shape, seed)?;
        shape = layer.output_shape.clone();
        layers.push(layer);
    }
    Ok(layers)
}

fn build_layer(spec: &LayerSpec, input_shape: &[usize], seed: u64) -> Result<BuiltLayer, NetworkError> {
    match spec {
        LayerSpec::Dense {
            name,
            units,
            activation,
            use_bias,
        } => {
            let [in_features] = input_shape else {
                return Err(NetworkError::InvalidArgument(format!(
                    "Dense层{name}的输入须为1阶 [D]，得到{input_shape:?}，请先接Flatten层"
                )));
            };
            Ok(BuiltLayer {
                name: name.clone(),
                op: Op::Dense,
                activation: *activation,
                input_shape: input_shape.to_vec(),
                output_shape: vec![*units],
                weights: Some(glorot_uniform(&[*in_features, *units], *in_features, *units, seed)),
                bias: use_bias.then(|| Tensor::zeros(&[*units])),
            })
        }
        LayerSpec::Conv2d {
            name,
            filters,
            kernel_size,
            stride,
            padding,
            dilation,
            activation,
            use_bias,
        } => {
            let [in_h, in_w, in_c] = input_shape else {
                return Err(NetworkError::InvalidArgument(format!(
                    "Conv2d层{name}的输入须为3阶 [H, W, C]，得到{input_shape:?}"
                )));
            };
            for (value_name, value) in [
                ("stride", stride),
                ("dilation", dilation),
                ("kernel_size", kernel_size),
            ] {
                if value.0 < 1 || value.1 < 1 {
                    return Err(TensorError::ValueMustSatisfyComparison {
                        value_name: format!("{name}的{value_name}"),
                        operator: ComparisonOperator::GreaterOrEqual,
                        threshold: 1,
                    }
                    .into());
                }
            }
            let out_h = conv_output_size(*in_h, kernel_size.0, stride.0, padding.0, dilation.0);
            let out_w = conv_output_size(*in_w, kernel_size.1, stride.1, padding.1, dilation.1);
            let (Some(out_h), Some(out_w)) = (out_h, out_w) else {
                return Err(NetworkError::InvalidArgument(format!(
                    "Conv2d层{name}输出尺寸无效：输入 {in_h}x{in_w}，核 {kernel_size:?}，步长 {stride:?}，填充 {padding:?}，膨胀率 {dilation:?}"
                )));
            };

            let fan_in = kernel_size.0 * kernel_size.1 * in_c;
            let fan_out = kernel_size.0 * kernel_size.1 * filters;
            Ok(BuiltLayer {
                name: name.clone(),
                op: Op::Conv2d(ConvGeometry {
                    stride: *stride,
                    dilation: *dilation,
                    padding: *padding,
                    output_padding: None,
                }),
                activation: *activation,
                input_shape: input_shape.to_vec(),
                output_shape: vec![out_h, out_w, *filters],
                weights: Some(glorot_uniform(
                    &[kernel_size.0, kernel_size.1, *in_c, *filters],
                    fan_in,
                    fan_out,
                    seed,
                )),
                bias: use_bias.then(|| Tensor::zeros(&[*filters])),
            })
        }
        LayerSpec::Flatten { name } => Ok(BuiltLayer {
            name: name.clone(),
            op: Op::Flatten,
            activation: Activation::Linear,
            input_shape: input_shape.to_vec(),
            output_shape: vec![input_shape.iter().product()],
            weights: None,
            bias: None,
        }),
    }
}

/// 单个空间维的卷积输出尺寸；卷积核（含膨胀）比填充后的输入还大时返回 None
fn conv_output_size(
    input: usize,
    kernel: usize,
    stride: usize,
    padding: usize,
    dilation: usize,
) -> Option<usize> {
    let effective_kernel = dilation * (kernel - 1) + 1;
    let padded = input + 2 * padding;
    (padded >= effective_kernel).then(|| (padded - effective_kernel) / stride + 1)
}

/// Glorot（Xavier）均匀分布初始化
fn glorot_uniform(shape: &[usize], fan_in: usize, fan_out: usize, seed: u64) -> Tensor {
    let limit = (6.0 / (fan_in + fan_out).max(1) as f32).sqrt();
    Tensor::new_random_seeded(-limit, limit, shape, seed)
}
