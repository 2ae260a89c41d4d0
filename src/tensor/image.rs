use super::Tensor;
use crate::errors::TensorError;
use image::DynamicImage;

impl Tensor {
    /// 将`image`库的图像转换为张量：灰度图为（H,W），彩色图为通道在后的（H,W,C）。
    /// 像素值保持[0,255]的原始取值，不做归一化。
    pub fn from_image(img: &DynamicImage) -> Result<Tensor, TensorError> {
        let (height, width) = (img.height() as usize, img.width() as usize);
        let (raw, shape) = match img.color().channel_count() {
            1 => (img.to_luma8().into_raw(), vec![height, width]),
            3 => (img.to_rgb8().into_raw(), vec![height, width, 3]),
            4 => (img.to_rgba8().into_raw(), vec![height, width, 4]),
            n => return Err(TensorError::UnsupportedImageChannels(n as usize)),
        };
        let data = raw.iter().map(|&v| f32::from(v)).collect::<Vec<_>>();
        Tensor::try_new(&data, &shape)
    }
}
