//! 网络适配器的单元测试
//!
//! 使用一个只给出元数据、按输出形状生成确定性数据的假框架绑定。

mod convolutional;
mod descriptor;

use std::cell::RefCell;

use crate::errors::NetworkError;
use crate::format::DataFormat;
use crate::network::{Backend, ConvGeometry, DynamicShape, LayerDict, LayerInfo, Network};
use crate::tensor::Tensor;

/// 测试用框架绑定：记录收到的输入形状，激活值按层输出形状随机生成
struct MockBackend {
    layers: Vec<LayerInfo>,
    data_format: DataFormat,
    last_input_shape: RefCell<Option<Vec<usize>>>,
}

impl MockBackend {
    fn new(layers: Vec<LayerInfo>, data_format: DataFormat) -> Self {
        Self {
            layers,
            data_format,
            last_input_shape: RefCell::new(None),
        }
    }

    fn last_input_shape(&self) -> Option<Vec<usize>> {
        self.last_input_shape.borrow().clone()
    }
}

impl Backend for MockBackend {
    fn data_format(&self) -> DataFormat {
        self.data_format
    }

    fn create_layer_dict(&self) -> Result<LayerDict, NetworkError> {
        LayerDict::try_from(self.layers.clone())
    }

    fn compute_activations(
        &self,
        layer_ids: &[String],
        input: &Tensor,
    ) -> Result<Vec<Tensor>, NetworkError> {
        *self.last_input_shape.borrow_mut() = Some(input.shape().to_vec());
        let batch = input.shape()[0];
        layer_ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let layer = self
                    .layers
                    .iter()
                    .find(|l| l.id() == id)
                    .ok_or_else(|| NetworkError::LayerNotFound(id.clone()))?;
                let mut shape = vec![batch];
                shape.extend(layer.output_shape().feature_shape().to_vec_fixed().unwrap());
                Ok(Tensor::new_random_seeded(-1.0, 1.0, &shape, i as u64))
            })
            .collect()
    }
}

/// 一个通道在后的小型卷积网络：conv1 -> pool -> flatten -> dense
fn image_layers() -> Vec<LayerInfo> {
    vec![
        LayerInfo::new(
            "conv1",
            DynamicShape::with_dynamic_batch(&[28, 28, 1]),
            DynamicShape::with_dynamic_batch(&[26, 26, 8]),
        )
        .with_weights(Tensor::zeros(&[3, 3, 1, 8]))
        .with_bias(Tensor::zeros(&[8]))
        .with_conv_geometry(ConvGeometry::default()),
        LayerInfo::new(
            "pool",
            DynamicShape::with_dynamic_batch(&[26, 26, 8]),
            DynamicShape::with_dynamic_batch(&[13, 13, 8]),
        ),
        LayerInfo::new(
            "flatten",
            DynamicShape::with_dynamic_batch(&[13, 13, 8]),
            DynamicShape::with_dynamic_batch(&[1352]),
        ),
        LayerInfo::new(
            "dense",
            DynamicShape::with_dynamic_batch(&[1352]),
            DynamicShape::with_dynamic_batch(&[10]),
        )
        .with_weights(Tensor::zeros(&[1352, 10]))
        .with_bias(Tensor::zeros(&[10])),
    ]
}

/// 与`image_layers`相同的网络，但形状是通道在前的
fn image_layers_channels_first() -> Vec<LayerInfo> {
    let convert = |s: &DynamicShape| s.convert(DataFormat::ChannelsLast, DataFormat::ChannelsFirst);
    image_layers()
        .into_iter()
        .map(|l| {
            let mut layer = LayerInfo::new(
                l.id(),
                convert(l.input_shape()),
                convert(l.output_shape()),
            );
            if let Some(w) = l.weights() {
                layer = layer.with_weights(w.clone());
            }
            if let Some(b) = l.bias() {
                layer = layer.with_bias(b.clone());
            }
            layer
        })
        .collect()
}

fn dense_layers() -> Vec<LayerInfo> {
    vec![
        LayerInfo::new(
            "fc1",
            DynamicShape::with_dynamic_batch(&[4]),
            DynamicShape::with_dynamic_batch(&[3]),
        )
        .with_weights(Tensor::zeros(&[4, 3]))
        .with_bias(Tensor::zeros(&[3])),
        LayerInfo::new(
            "fc2",
            DynamicShape::with_dynamic_batch(&[3]),
            DynamicShape::with_dynamic_batch(&[2]),
        )
        .with_weights(Tensor::zeros(&[3, 2])),
    ]
}

fn image_network() -> Network<MockBackend> {
    Network::new(MockBackend::new(image_layers(), DataFormat::ChannelsLast)).unwrap()
}

fn image_network_channels_first() -> Network<MockBackend> {
    Network::new(MockBackend::new(
        image_layers_channels_first(),
        DataFormat::ChannelsFirst,
    ))
    .unwrap()
}

fn dense_network() -> Network<MockBackend> {
    Network::new(MockBackend::new(dense_layers(), DataFormat::ChannelsLast)).unwrap()
}
