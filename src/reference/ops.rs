/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 参考实现的前向运算（通道在后）
 *
 * - dense  ：[N, D] @ [D, U] + b -> [N, U]
 * - conv2d ：[N, H, W, C_in] * [kH, kW, C_in, C_out] + b -> [N, H', W', C_out]
 * - flatten：[N, ...] -> [N, prod(...)]
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-18
 */

use ndarray::{Ix1, Ix2, Ix4};
use rayon::prelude::*;

use super::model::Activation;
use crate::errors::NetworkError;
use crate::network::ConvGeometry;
use crate::tensor::Tensor;

fn shape_error(op: &str, expected: &str, got: &[usize]) -> NetworkError {
    NetworkError::InvalidArgument(format!("{op}的输入形状须为{expected}，得到{got:?}"))
}

pub(super) fn dense(
    input: &Tensor,
    weights: &Tensor,
    bias: Option<&Tensor>,
) -> Result<Tensor, NetworkError> {
    let x = input
        .view()
        .into_dimensionality::<Ix2>()
        .map_err(|_| shape_error("Dense", "[N, D]", input.shape()))?;
    let w = weights
        .view()
        .into_dimensionality::<Ix2>()
        .map_err(|_| shape_error("Dense权重", "[D, U]", weights.shape()))?;
    if x.ncols() != w.nrows() {
        return Err(shape_error(
            "Dense",
            &format!("[N, {}]", w.nrows()),
            input.shape(),
        ));
    }

    let mut z = x.dot(&w);
    if let Some(bias) = bias {
        let b = bias
            .view()
            .into_dimensionality::<Ix1>()
            .map_err(|_| shape_error("Dense偏置", "[U]", bias.shape()))?;
        z += &b;
    }
    Ok(Tensor::from_array(z.into_dyn()))
}

/// 二维卷积，batch 内各样本并行计算
pub(super) fn conv2d(
    input: &Tensor,
    kernel: &Tensor,
    bias: Option<&Tensor>,
    geometry: &ConvGeometry,
) -> Result<Tensor, NetworkError> {
    let x = input
        .view()
        .into_dimensionality::<Ix4>()
        .map_err(|_| shape_error("Conv2d", "[N, H, W, C]", input.shape()))?;
    let k = kernel
        .view()
        .into_dimensionality::<Ix4>()
        .map_err(|_| shape_error("Conv2d卷积核", "[kH, kW, C_in, C_out]", kernel.shape()))?;

    let (batch_size, in_h, in_w, in_c) = x.dim();
    let (k_h, k_w, k_c, out_c) = k.dim();
    if in_c != k_c {
        return Err(NetworkError::InvalidArgument(format!(
            "输入通道数 {in_c} 与卷积核输入通道数 {k_c} 不匹配"
        )));
    }
    let bias = bias.map(|b| b.data().iter().copied().collect::<Vec<f32>>());
    if let Some(b) = &bias {
        if b.len() != out_c {
            return Err(shape_error("Conv2d偏置", &format!("[{out_c}]"), &[b.len()]));
        }
    }

    let (stride_h, stride_w) = geometry.stride;
    let (pad_h, pad_w) = geometry.padding;
    let (dil_h, dil_w) = geometry.dilation;
    let out_h = (in_h + 2 * pad_h - (dil_h * (k_h - 1) + 1)) / stride_h + 1;
    let out_w = (in_w + 2 * pad_w - (dil_w * (k_w - 1) + 1)) / stride_w + 1;
    let single_sample_size = out_h * out_w * out_c;

    // 填充区域视为0，直接跳过
    let batch_results: Vec<Vec<f32>> = (0..batch_size)
        .into_par_iter()
        .map(|b| {
            let mut sample_data = vec![0.0f32; single_sample_size];
            for oh in 0..out_h {
                for ow in 0..out_w {
                    for oc in 0..out_c {
                        let mut sum = bias.as_ref().map_or(0.0, |bias| bias[oc]);
                        for kh in 0..k_h {
                            let ih = (oh * stride_h + kh * dil_h) as isize - pad_h as isize;
                            if ih < 0 || ih as usize >= in_h {
                                continue;
                            }
                            for kw in 0..k_w {
                                let iw = (ow * stride_w + kw * dil_w) as isize - pad_w as isize;
                                if iw < 0 || iw as usize >= in_w {
                                    continue;
                                }
                                for ic in 0..in_c {
                                    sum += x[[b, ih as usize, iw as usize, ic]] * k[[kh, kw, ic, oc]];
                                }
                            }
                        }
                        sample_data[(oh * out_w + ow) * out_c + oc] = sum;
                    }
                }
            }
            sample_data
        })
        .collect();

    let all_data: Vec<f32> = batch_results.into_iter().flatten().collect();
    Tensor::try_new(&all_data, &[batch_size, out_h, out_w, out_c]).map_err(NetworkError::from)
}

pub(super) fn flatten(input: &Tensor) -> Result<Tensor, NetworkError> {
    let batch_size = *input
        .shape()
        .first()
        .ok_or_else(|| shape_error("Flatten", "[N, ...]", input.shape()))?;
    let features = input.shape()[1..].iter().product::<usize>();
    Ok(input.reshape(&[batch_size, features])?)
}

pub(super) fn activate(z: &Tensor, activation: Activation) -> Tensor {
    if activation == Activation::Linear {
        return z.clone();
    }
    Tensor::from_array(z.data().mapv(|v| activation.apply(v)))
}
