//! # Only Adapter
//!
//! `only_adapter`为已加载的神经网络提供一层与具体框架无关的查询接口：
//! 层的输入/输出形状、权重、偏置、参数数量、卷积核几何信息，以及给定输入下的激活值/净输入。
//! 不同框架对张量的通道位置约定不同（`channels_first`/`channels_last`），
//! 本库负责输入秩的补全与数据格式的互相转换，真正的计算则交给实现了[`network::Backend`]的框架绑定。
//!

pub mod errors;
pub mod format;
pub mod network;
pub mod reference;
pub mod tensor;
pub mod utils;

pub use errors::{ErrorKind, NetworkError, TensorError};
pub use format::{DataFormat, convert_data_format};
pub use network::{
    Backend, ConvGeometry, DynamicShape, LayerDescriptor, LayerDict, LayerInfo, LayerOutput,
    LayerSelection, Network, NetworkConfig, NetworkDescriptor,
};
pub use tensor::Tensor;
