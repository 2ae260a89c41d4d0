use super::{DataFormat, convert_data_format, convert_shape};
use crate::assert_err;
use crate::errors::NetworkError;
use crate::tensor::Tensor;

#[test]
fn test_data_format_parse_and_display() {
    assert_eq!(
        "channels_first".parse::<DataFormat>().unwrap(),
        DataFormat::ChannelsFirst
    );
    assert_eq!("NHWC".parse::<DataFormat>().unwrap(), DataFormat::ChannelsLast);
    assert_eq!(DataFormat::ChannelsLast.to_string(), "channels_last");
    assert_eq!(DataFormat::default(), DataFormat::ChannelsLast);
    assert_err!(
        "channels_middle".parse::<DataFormat>(),
        NetworkError::InvalidArgument(msg) if msg.contains("channels_middle")
    );
}

#[test]
fn test_data_format_serde() {
    let json = serde_json::to_string(&DataFormat::ChannelsFirst).unwrap();
    assert_eq!(json, "\"channels_first\"");
    let format: DataFormat = serde_json::from_str("\"channels_last\"").unwrap();
    assert_eq!(format, DataFormat::ChannelsLast);
}

#[test]
fn test_channel_and_spatial_axes() {
    assert_eq!(DataFormat::ChannelsLast.channel_axis(4), Some(3));
    assert_eq!(DataFormat::ChannelsFirst.channel_axis(4), Some(1));
    assert_eq!(DataFormat::ChannelsLast.channel_axis(2), None);
    assert_eq!(DataFormat::ChannelsLast.spatial_axes(4), 1..3);
    assert_eq!(DataFormat::ChannelsFirst.spatial_axes(4), 2..4);
}

#[test]
fn test_convert_shape() {
    let nhwc = [8, 28, 28, 3];
    let nchw = convert_shape(&nhwc, DataFormat::ChannelsLast, DataFormat::ChannelsFirst);
    assert_eq!(nchw, vec![8, 3, 28, 28]);
    let back = convert_shape(&nchw, DataFormat::ChannelsFirst, DataFormat::ChannelsLast);
    assert_eq!(back, nhwc.to_vec());

    // 含未知batch维的形状同样适用
    let dynamic = [None, Some(32), Some(32), Some(16)];
    assert_eq!(
        convert_shape(&dynamic, DataFormat::ChannelsLast, DataFormat::ChannelsFirst),
        vec![None, Some(16), Some(32), Some(32)]
    );

    // 无通道维时不变
    assert_eq!(
        convert_shape(&[4, 10], DataFormat::ChannelsLast, DataFormat::ChannelsFirst),
        vec![4, 10]
    );
}

#[test]
fn test_convert_data_format_moves_channel_values() {
    // 1x1x2x2 的 NHWC：像素(0,0)=[1,2]，(0,1)=[3,4]
    let nhwc = Tensor::new(&[1., 2., 3., 4.], &[1, 1, 2, 2]);
    let nchw = convert_data_format(&nhwc, DataFormat::ChannelsLast, DataFormat::ChannelsFirst)
        .unwrap();
    assert_eq!(nchw.shape(), &[1, 2, 1, 2]);
    // 通道0依次为1、3，通道1依次为2、4
    assert_eq!(nchw, Tensor::new(&[1., 3., 2., 4.], &[1, 2, 1, 2]));
}

#[test]
fn test_convert_data_format_round_trip() {
    let original = Tensor::new_random_seeded(0.0, 1.0, &[2, 5, 4, 3], 1);
    let nchw = convert_data_format(&original, DataFormat::ChannelsLast, DataFormat::ChannelsFirst)
        .unwrap();
    assert_eq!(nchw.shape(), &[2, 3, 5, 4]);
    let back =
        convert_data_format(&nchw, DataFormat::ChannelsFirst, DataFormat::ChannelsLast).unwrap();
    assert_eq!(back, original);
}

#[test]
fn test_convert_data_format_same_format_or_low_rank_is_identity() {
    let t = Tensor::new_random_seeded(0.0, 1.0, &[2, 3, 4], 3);
    let same = convert_data_format(&t, DataFormat::ChannelsFirst, DataFormat::ChannelsFirst).unwrap();
    assert_eq!(same, t);

    let dense = Tensor::new(&[1., 2., 3., 4.], &[2, 2]);
    let converted =
        convert_data_format(&dense, DataFormat::ChannelsLast, DataFormat::ChannelsFirst).unwrap();
    assert_eq!(converted, dense);
}
