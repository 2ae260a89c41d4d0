/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 与框架无关的网络适配器
 *
 * 对调用方而言，输入可以是：
 * - 单张灰度图 (H, W)
 * - 缺 batch 维或缺通道维的 3 阶张量
 * - 完整的 4 阶批次 (N, H, W, C) 或 (N, C, H, W)
 * - 全连接网络的 (D) 或 (N, D)
 * 适配器先补全秩，再转换为网络原生的数据格式后交给框架绑定；结果再转换回调用方的格式。
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-18
 */

use std::ops::Index;

use log::{debug, info, warn};

use super::{
    Backend, DynamicShape, LayerDescriptor, LayerDict, LayerInfo, LayerOutput, LayerSelection,
    NetworkConfig, NetworkDescriptor,
};
use crate::errors::NetworkError;
use crate::format::{DataFormat, convert_data_format};
use crate::tensor::Tensor;

/// 已加载的网络
pub struct Network<B: Backend> {
    backend: B,
    data_format: DataFormat,
    layer_dict: LayerDict,
}

impl<B: Backend> Network<B> {
    /// 使用框架绑定声明的数据格式创建网络
    pub fn new(backend: B) -> Result<Self, NetworkError> {
        Self::with_config(backend, NetworkConfig::default())
    }

    /// 按配置创建网络。配置中的数据格式与框架绑定的原生格式不一致时返回错误
    pub fn with_config(backend: B, config: NetworkConfig) -> Result<Self, NetworkError> {
        let data_format = backend.data_format();
        if let Some(expected) = config.data_format {
            if expected != data_format {
                return Err(NetworkError::InvalidArgument(format!(
                    "配置的数据格式{expected}与框架绑定的原生格式{data_format}不一致"
                )));
            }
        }

        let layer_dict = backend.create_layer_dict()?;
        if layer_dict.is_empty() {
            return Err(NetworkError::EmptyNetwork);
        }
        info!(
            "创建网络：{}层，数据格式{}，输入形状{}",
            layer_dict.len(),
            data_format,
            layer_dict[0].input_shape()
        );
        Ok(Self {
            backend,
            data_format,
            layer_dict,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn data_format(&self) -> DataFormat {
        self.data_format
    }

    pub fn layer_dict(&self) -> &LayerDict {
        &self.layer_dict
    }

    pub fn layer_ids(&self) -> Vec<&str> {
        self.layer_dict.ids().collect()
    }

    pub fn len(&self) -> usize {
        self.layer_dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layer_dict.is_empty()
    }

    /// 按位置获取层
    pub fn layer(&self, index: usize) -> Result<&LayerInfo, NetworkError> {
        self.layer_dict
            .get_index(index)
            .ok_or(NetworkError::LayerIndexOutOfRange {
                index,
                len: self.layer_dict.len(),
            })
    }

    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓激活值/净输入↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    /// 计算给定层在输入`input_samples`下的激活值。
    ///
    /// * `layer_ids` - 单个层id，或层id列表
    /// * `input_samples` - 输入数据，其格式由`data_format`说明，可缺省 batch 维或通道维
    /// * `data_format` - 输入数据的格式，返回值也使用该格式
    ///
    /// 以单个层id请求时返回[`LayerOutput::Single`]，否则返回[`LayerOutput::Many`]。
    pub fn get_activations(
        &self,
        layer_ids: impl Into<LayerSelection>,
        input_samples: &Tensor,
        data_format: DataFormat,
    ) -> Result<LayerOutput, NetworkError> {
        self.compute_with(layer_ids.into(), input_samples, data_format, |ids, input| {
            self.backend.compute_activations(ids, input)
        })
    }

    /// 计算给定层的净输入（加权和 + 偏置），参数与返回值同[`Network::get_activations`]
    pub fn get_net_input(
        &self,
        layer_ids: impl Into<LayerSelection>,
        input_samples: &Tensor,
        data_format: DataFormat,
    ) -> Result<LayerOutput, NetworkError> {
        self.compute_with(layer_ids.into(), input_samples, data_format, |ids, input| {
            self.backend.compute_net_input(ids, input)
        })
    }

    fn compute_with<F>(
        &self,
        selection: LayerSelection,
        input_samples: &Tensor,
        data_format: DataFormat,
        compute: F,
    ) -> Result<LayerOutput, NetworkError>
    where
        F: FnOnce(&[String], &Tensor) -> Result<Vec<Tensor>, NetworkError>,
    {
        let (layer_ids, is_list) = selection.into_ids();
        if let Some(missing) = layer_ids.iter().find(|id| !self.layer_dict.contains(id)) {
            return Err(NetworkError::LayerNotFound(missing.clone()));
        }

        let input = self.transform_input(input_samples, data_format)?;
        let outputs = compute(&layer_ids, &input)?;
        if outputs.len() != layer_ids.len() {
            return Err(NetworkError::InvalidArgument(format!(
                "框架绑定返回了{}个结果，但请求了{}层",
                outputs.len(),
                layer_ids.len()
            )));
        }

        let outputs = outputs
            .iter()
            .map(|output| self.transform_output(output, data_format))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LayerOutput::collapse(outputs, is_list))
    }
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑激活值/净输入↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓输入/输出的归一化↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    /// 补全输入的秩，并将其从`data_format`转换为网络原生的数据格式
    pub fn transform_input(
        &self,
        inputs: &Tensor,
        data_format: DataFormat,
    ) -> Result<Tensor, NetworkError> {
        let inputs = self.fill_up_ranks(inputs, data_format)?;
        Ok(convert_data_format(&inputs, data_format, self.data_format)?)
    }

    fn transform_output(
        &self,
        outputs: &Tensor,
        data_format: DataFormat,
    ) -> Result<Tensor, NetworkError> {
        Ok(convert_data_format(outputs, self.data_format, data_format)?)
    }

    /// 在缺少 batch 维或通道维时补全输入的秩，结果仍是`data_format`格式。
    ///
    /// 对图像类网络（首层输入为3阶以上）：
    /// - 2阶 (H, W)：视为单张灰度图，补上 batch 维与通道维
    /// - 3阶：与网络单样本形状一致则说明带了通道维，补 batch 维；
    ///   否则空间维一致则说明带了 batch 维，补通道维；都不一致则报错
    /// - 4阶：原样返回
    /// - 超过4阶：报错
    ///
    /// 对全连接网络（首层输入为 (N, D)）：1阶补 batch 维，2阶原样返回，其余阶数报错。
    pub fn fill_up_ranks(
        &self,
        inputs: &Tensor,
        data_format: DataFormat,
    ) -> Result<Tensor, NetworkError> {
        let network_input_shape = self
            .network_input_shape()
            .convert(self.data_format, data_format);
        let rank = inputs.dimension();
        if rank > 4 {
            return Err(NetworkError::TooManyInputDims(rank));
        }

        let filled = if network_input_shape.ndim() <= 2 {
            match rank {
                1 => inputs.unsqueeze(0)?,
                2 => inputs.clone(),
                _ => return Err(self.non_matching(inputs, &network_input_shape)),
            }
        } else {
            match rank {
                0 | 1 => return Err(self.non_matching(inputs, &network_input_shape)),
                // 只有高和宽，说明是单张灰度图
                2 => inputs
                    .unsqueeze(0)?
                    .unsqueeze(Self::channel_insert_position(data_format))?,
                3 => {
                    if Self::is_channel_provided(inputs.shape(), &network_input_shape) {
                        inputs.unsqueeze(0)?
                    } else if Self::is_batch_provided(
                        inputs.shape(),
                        &network_input_shape,
                        data_format,
                    ) {
                        inputs.unsqueeze(Self::channel_insert_position(data_format))?
                    } else {
                        return Err(self.non_matching(inputs, &network_input_shape));
                    }
                }
                _ => inputs.clone(),
            }
        };

        if filled.dimension() != rank {
            debug!("补全输入维度：{:?} -> {:?}", inputs.shape(), filled.shape());
        }
        Ok(filled)
    }

    /// 3阶输入与网络单样本形状（去掉 batch 维）完全一致，说明提供了通道维
    fn is_channel_provided(input_sample_shape: &[usize], network_input_shape: &DynamicShape) -> bool {
        network_input_shape
            .feature_shape()
            .is_compatible_with_tensor(input_sample_shape)
    }

    /// 3阶输入的后两维与网络的空间维一致，说明提供了 batch 维（缺通道维）
    fn is_batch_provided(
        input_sample_shape: &[usize],
        network_input_shape: &DynamicShape,
        data_format: DataFormat,
    ) -> bool {
        if network_input_shape.ndim() != 4 || input_sample_shape.len() != 3 {
            return false;
        }
        network_input_shape
            .slice(data_format.spatial_axes(4))
            .is_compatible_with_tensor(&input_sample_shape[1..3])
    }

    /// 在3阶张量上插入通道维的位置，使结果符合`data_format`
    fn channel_insert_position(data_format: DataFormat) -> isize {
        match data_format {
            DataFormat::ChannelsFirst => 1,
            DataFormat::ChannelsLast => -1,
        }
    }

    fn non_matching(&self, inputs: &Tensor, expected: &DynamicShape) -> NetworkError {
        NetworkError::NonMatchingInputDims {
            input_shape: inputs.shape().to_vec(),
            expected: expected.to_string(),
        }
    }
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑输入/输出的归一化↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

    /// 首层的输入形状（网络原生格式）
    pub fn network_input_shape(&self) -> &DynamicShape {
        self.layer_dict[0].input_shape()
    }

    /// 网络每个输入应有的通道数，通常就是首层输入的通道数。
    /// 网络输入没有通道维（阶数不超过2）或通道数未设定时返回0。
    pub fn number_of_input_channels(&self) -> usize {
        let shape = self.network_input_shape();
        match self.data_format.channel_axis(shape.ndim()) {
            Some(axis) => shape.dim(axis).unwrap_or_else(|| {
                warn!("网络输入形状{shape}的通道数未设定");
                0
            }),
            None => 0,
        }
    }

    /// 将单个样本（或批次）的形状规范为通道在后的 (N, H, W, C)。
    /// 用于那些无法直接给出层形状的框架推断实际的层形状。
    ///
    /// - 2阶 (H, W)：补上 batch 维与网络的通道数
    /// - 3阶：最后一维等于网络通道数则补 batch 维，否则补通道维
    /// - 4阶：最后一维必须等于网络通道数
    pub fn canonical_input_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, NetworkError> {
        let channels = self.number_of_input_channels();
        if channels == 0 {
            return Err(NetworkError::InvalidArgument(format!(
                "网络输入{}没有通道维，无法规范为(N, H, W, C)",
                self.network_input_shape()
            )));
        }
        let expected = || format!("(N, H, W, {channels})");

        match input_shape {
            [h, w] => Ok(vec![1, *h, *w, channels]),
            [.., last] if input_shape.len() == 3 => {
                let mut shape = input_shape.to_vec();
                if *last == channels {
                    // 已带通道维，补 batch 维
                    shape.insert(0, 1);
                } else {
                    shape.push(channels);
                }
                Ok(shape)
            }
            [.., last] if input_shape.len() == 4 => {
                if *last == channels {
                    Ok(input_shape.to_vec())
                } else {
                    Err(NetworkError::NonMatchingInputDims {
                        input_shape: input_shape.to_vec(),
                        expected: expected(),
                    })
                }
            }
            _ => Err(NetworkError::NonMatchingInputDims {
                input_shape: input_shape.to_vec(),
                expected: expected(),
            }),
        }
    }

    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓层属性↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    fn get_layer(&self, layer_id: &str) -> Result<&LayerInfo, NetworkError> {
        self.layer_dict
            .get(layer_id)
            .ok_or_else(|| NetworkError::LayerNotFound(layer_id.to_string()))
    }

    /// 层的输入形状。对卷积层而言为通道在后
    pub fn layer_input_shape(&self, layer_id: &str) -> Result<&DynamicShape, NetworkError> {
        Ok(self.get_layer(layer_id)?.input_shape())
    }

    pub fn layer_output_shape(&self, layer_id: &str) -> Result<&DynamicShape, NetworkError> {
        Ok(self.get_layer(layer_id)?.output_shape())
    }

    /// 流入该层的权重，卷积层为 (H, W, C_in, C_out)
    pub fn layer_weights(&self, layer_id: &str) -> Result<Option<&Tensor>, NetworkError> {
        Ok(self.get_layer(layer_id)?.weights())
    }

    pub fn layer_weights_shape(&self, layer_id: &str) -> Result<Option<&[usize]>, NetworkError> {
        Ok(self.get_layer(layer_id)?.weights_shape())
    }

    /// 一维的偏置：全连接层每个输出单元一个，卷积层每个通道一个
    pub fn layer_biases(&self, layer_id: &str) -> Result<Option<&Tensor>, NetworkError> {
        Ok(self.get_layer(layer_id)?.bias())
    }

    /// 可学习参数的数量，通常即权重与偏置的元素数之和
    pub fn layer_number_of_parameters(&self, layer_id: &str) -> Result<usize, NetworkError> {
        Ok(self.get_layer(layer_id)?.num_parameters())
    }

    /// 输入单元数。对卷积层而言是所有通道中所有单元的总数
    pub fn layer_input_units(&self, layer_id: &str) -> Result<usize, NetworkError> {
        let layer = self.get_layer(layer_id)?;
        Self::units_of(layer_id, layer.input_shape())
    }

    /// 输出单元数。对卷积层而言是所有通道中所有单元的总数
    pub fn layer_output_units(&self, layer_id: &str) -> Result<usize, NetworkError> {
        let layer = self.get_layer(layer_id)?;
        Self::units_of(layer_id, layer.output_shape())
    }

    fn units_of(layer_id: &str, shape: &DynamicShape) -> Result<usize, NetworkError> {
        shape.units().ok_or_else(|| NetworkError::UnknownDimension {
            layer: layer_id.to_string(),
            shape: shape.to_string(),
        })
    }

    /// 卷积运算的输入通道数
    pub fn layer_input_channels(&self, layer_id: &str) -> Result<usize, NetworkError> {
        let shape = self.check_layer_is_convolutional(layer_id)?;
        Ok(shape[shape.len() - 2])
    }

    /// 卷积运算的输出通道数
    pub fn layer_output_channels(&self, layer_id: &str) -> Result<usize, NetworkError> {
        let shape = self.check_layer_is_convolutional(layer_id)?;
        Ok(shape[shape.len() - 1])
    }
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑层属性↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓卷积层专有属性↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    /// 卷积核的空间尺寸，不含通道数
    pub fn layer_kernel_size(&self, layer_id: &str) -> Result<Vec<usize>, NetworkError> {
        let shape = self.check_layer_is_convolutional(layer_id)?;
        Ok(shape[..shape.len() - 2].to_vec())
    }

    /// 卷积运算的步长。框架绑定未提供卷积几何参数时返回未实现错误
    pub fn layer_stride(&self, layer_id: &str) -> Result<(usize, usize), NetworkError> {
        self.conv_attribute(layer_id, "步长", |g| Some(g.stride))
    }

    /// 卷积运算的膨胀率，即卷积核相邻行/列在输入上的间隔
    pub fn layer_dilation(&self, layer_id: &str) -> Result<(usize, usize), NetworkError> {
        self.conv_attribute(layer_id, "膨胀率", |g| Some(g.dilation))
    }

    /// 卷积运算前在输入两侧各补零的行/列数
    pub fn layer_padding(&self, layer_id: &str) -> Result<(usize, usize), NetworkError> {
        self.conv_attribute(layer_id, "填充", |g| Some(g.padding))
    }

    /// 转置卷积的输出填充
    pub fn layer_output_padding(&self, layer_id: &str) -> Result<(usize, usize), NetworkError> {
        self.conv_attribute(layer_id, "输出填充", |g| g.output_padding)
    }

    fn conv_attribute<F>(
        &self,
        layer_id: &str,
        attribute: &str,
        pick: F,
    ) -> Result<(usize, usize), NetworkError>
    where
        F: FnOnce(&super::ConvGeometry) -> Option<(usize, usize)>,
    {
        self.check_layer_is_convolutional(layer_id)?;
        self.get_layer(layer_id)?
            .conv_geometry()
            .and_then(pick)
            .ok_or_else(|| {
                NetworkError::NotImplemented(format!("框架绑定未提供卷积层{layer_id}的{attribute}"))
            })
    }

    /// 判断是否为卷积层。若是，可进一步通过`layer_kernel_size`、`layer_stride`等获取卷积的几何信息
    pub fn layer_is_convolutional(&self, layer_id: &str) -> Result<bool, NetworkError> {
        Ok(self.get_layer(layer_id)?.is_convolutional())
    }

    /// 确保给定层是卷积层，并返回其权重形状
    fn check_layer_is_convolutional(&self, layer_id: &str) -> Result<&[usize], NetworkError> {
        let layer = self.get_layer(layer_id)?;
        match layer.weights_shape() {
            Some(shape) if shape.len() > 2 => Ok(shape),
            _ => Err(NetworkError::NotConvolutional(layer_id.to_string())),
        }
    }
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑卷积层专有属性↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

    /// 单个层的可序列化摘要
    pub fn layer_info(&self, layer_id: &str) -> Result<LayerDescriptor, NetworkError> {
        Ok(LayerDescriptor::from(self.get_layer(layer_id)?))
    }

    /// 整个网络的可序列化描述
    pub fn describe(&self) -> NetworkDescriptor {
        let mut descriptor = NetworkDescriptor::new(self.data_format);
        for layer in &self.layer_dict {
            descriptor.add_layer(LayerDescriptor::from(layer));
        }
        descriptor
    }
}

impl<B: Backend> Index<usize> for Network<B> {
    type Output = LayerInfo;

    fn index(&self, index: usize) -> &Self::Output {
        &self.layer_dict[index]
    }
}
