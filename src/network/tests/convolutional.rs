use super::{MockBackend, dense_network, image_network};
use crate::assert_err;
use crate::errors::{ErrorKind, NetworkError};
use crate::format::DataFormat;
use crate::network::{ConvGeometry, DynamicShape, LayerInfo, Network};
use crate::tensor::Tensor;

#[test]
fn test_layer_is_convolutional_iff_weights_rank_above_2() {
    let network = image_network();
    assert!(network.layer_is_convolutional("conv1").unwrap());
    assert!(!network.layer_is_convolutional("dense").unwrap());
    assert!(!network.layer_is_convolutional("pool").unwrap());

    // 1维卷积的权重 (k, C_in, C_out) 也是卷积层
    let layers = vec![
        LayerInfo::new(
            "conv1d",
            DynamicShape::with_dynamic_batch(&[100, 4]),
            DynamicShape::with_dynamic_batch(&[96, 16]),
        )
        .with_weights(Tensor::zeros(&[5, 4, 16])),
    ];
    let network = Network::new(MockBackend::new(layers, DataFormat::ChannelsLast)).unwrap();
    assert!(network.layer_is_convolutional("conv1d").unwrap());
    assert_eq!(network.layer_kernel_size("conv1d").unwrap(), vec![5]);
}

#[test]
fn test_conv_kernel_and_channels() {
    let network = image_network();
    assert_eq!(network.layer_kernel_size("conv1").unwrap(), vec![3, 3]);
    assert_eq!(network.layer_input_channels("conv1").unwrap(), 1);
    assert_eq!(network.layer_output_channels("conv1").unwrap(), 8);
}

#[test]
fn test_conv_attributes_on_non_conv_layer_fail() {
    let network = image_network();
    for result in [
        network.layer_input_channels("dense"),
        network.layer_output_channels("pool"),
    ] {
        assert_err!(result, NetworkError::NotConvolutional(_));
    }
    assert_err!(network.layer_kernel_size("dense"), NetworkError::NotConvolutional("dense"));
    let err = network.layer_stride("flatten").unwrap_err();
    assert_eq!(err, NetworkError::NotConvolutional("flatten".to_string()));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    assert_err!(
        dense_network().layer_padding("fc1"),
        NetworkError::NotConvolutional("fc1")
    );
}

#[test]
fn test_conv_geometry_from_backend() {
    let network = image_network();
    assert_eq!(network.layer_stride("conv1").unwrap(), (1, 1));
    assert_eq!(network.layer_dilation("conv1").unwrap(), (1, 1));
    assert_eq!(network.layer_padding("conv1").unwrap(), (0, 0));
    // 普通卷积没有输出填充
    let err = network.layer_output_padding("conv1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotImplemented);

    let layers = vec![
        LayerInfo::new(
            "deconv",
            DynamicShape::with_dynamic_batch(&[7, 7, 16]),
            DynamicShape::with_dynamic_batch(&[14, 14, 8]),
        )
        .with_weights(Tensor::zeros(&[3, 3, 16, 8]))
        .with_conv_geometry(ConvGeometry {
            stride: (2, 2),
            dilation: (1, 1),
            padding: (1, 1),
            output_padding: Some((1, 1)),
        }),
    ];
    let network = Network::new(MockBackend::new(layers, DataFormat::ChannelsLast)).unwrap();
    assert_eq!(network.layer_stride("deconv").unwrap(), (2, 2));
    assert_eq!(network.layer_output_padding("deconv").unwrap(), (1, 1));
}

#[test]
fn test_conv_geometry_missing_is_not_implemented() {
    let layers = vec![
        LayerInfo::new(
            "conv",
            DynamicShape::with_dynamic_batch(&[8, 8, 3]),
            DynamicShape::with_dynamic_batch(&[6, 6, 4]),
        )
        .with_weights(Tensor::zeros(&[3, 3, 3, 4])),
    ];
    let network = Network::new(MockBackend::new(layers, DataFormat::ChannelsLast)).unwrap();
    // 卷积核尺寸可从权重形状推出
    assert_eq!(network.layer_kernel_size("conv").unwrap(), vec![3, 3]);
    for result in [
        network.layer_stride("conv"),
        network.layer_dilation("conv"),
        network.layer_padding("conv"),
        network.layer_output_padding("conv"),
    ] {
        assert_err!(result, NetworkError::NotImplemented(msg) if msg.contains("conv"));
    }
}
