/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 框架绑定需要实现的能力接口
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-18
 */

use super::LayerDict;
use crate::errors::NetworkError;
use crate::format::DataFormat;
use crate::tensor::Tensor;

/// 框架绑定（backend）
///
/// 每个深度学习框架各自实现本 trait，[`crate::Network`]负责在调用前后做输入秩补全与数据格式转换，
/// 因此这里收到的输入总是4阶（图像类网络）或已带 batch 维的2阶（全连接网络），
/// 且已经是[`Backend::data_format`]所声明的格式；返回值也应为该格式。
///
/// # 使用示例
/// ```ignore
/// struct MyFramework { /* 已加载的模型 */ }
///
/// impl Backend for MyFramework {
///     fn create_layer_dict(&self) -> Result<LayerDict, NetworkError> {
///         /* 遍历模型的各层，构造 LayerInfo */
///     }
///
///     fn compute_activations(&self, layer_ids: &[String], input: &Tensor)
///         -> Result<Vec<Tensor>, NetworkError> {
///         /* 前向计算并取出各层输出 */
///     }
/// }
/// ```
pub trait Backend {
    /// 框架原生的数据格式
    fn data_format(&self) -> DataFormat {
        DataFormat::ChannelsLast
    }

    /// 构造层id到层元数据的映射，仅在创建网络时调用一次
    fn create_layer_dict(&self) -> Result<LayerDict, NetworkError>;

    /// 计算`layer_ids`中各层的激活值，返回值与`layer_ids`一一对应
    fn compute_activations(
        &self,
        layer_ids: &[String],
        input: &Tensor,
    ) -> Result<Vec<Tensor>, NetworkError> {
        let _ = (layer_ids, input);
        Err(NetworkError::NotImplemented(
            "该框架绑定不支持计算激活值".to_string(),
        ))
    }

    /// 计算`layer_ids`中各层的净输入（加权和 + 偏置，激活函数之前），返回值与`layer_ids`一一对应
    fn compute_net_input(
        &self,
        layer_ids: &[String],
        input: &Tensor,
    ) -> Result<Vec<Tensor>, NetworkError> {
        let _ = (layer_ids, input);
        Err(NetworkError::NotImplemented(
            "该框架绑定不支持计算净输入".to_string(),
        ))
    }
}
