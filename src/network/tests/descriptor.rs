use super::image_network;
use crate::format::DataFormat;
use crate::network::NetworkDescriptor;

#[test]
fn test_layer_info() {
    let network = image_network();
    let info = network.layer_info("conv1").unwrap();
    assert_eq!(info.id, "conv1");
    assert_eq!(info.weights_shape, Some(vec![3, 3, 1, 8]));
    assert_eq!(info.bias_shape, Some(vec![8]));
    assert_eq!(info.num_parameters, 80);
    assert!(info.is_convolutional);
    assert!(info.conv_geometry.is_some());

    let info = network.layer_info("pool").unwrap();
    assert_eq!(info.weights_shape, None);
    assert_eq!(info.num_parameters, 0);
    assert!(!info.is_convolutional);
    assert!(network.layer_info("nope").is_err());
}

#[test]
fn test_describe_and_json_round_trip() {
    let network = image_network();
    let descriptor = network.describe();
    assert_eq!(descriptor.data_format, DataFormat::ChannelsLast);
    assert_eq!(descriptor.layers.len(), 4);
    assert_eq!(descriptor.total_params(), 80 + 13530);

    let json = descriptor.to_json().unwrap();
    assert!(json.contains("\"data_format\": \"channels_last\""));
    // 非卷积层不输出卷积几何参数
    assert_eq!(json.matches("conv_geometry").count(), 1);
    let back = NetworkDescriptor::from_json(&json).unwrap();
    assert_eq!(back, descriptor);
}

#[test]
fn test_descriptor_from_invalid_json() {
    let err = NetworkDescriptor::from_json("{\"version\": 1}").unwrap_err();
    assert!(matches!(err, crate::errors::NetworkError::Config(_)));
}
