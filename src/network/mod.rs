/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 与框架无关的网络接口：层元数据、框架绑定trait以及网络适配器本身
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-18
 */

mod backend;
mod config;
mod descriptor;
mod layer;
#[allow(clippy::module_inception)]
mod network;
mod selection;
mod shape;

pub use backend::Backend;
pub use config::NetworkConfig;
pub use descriptor::{LayerDescriptor, NetworkDescriptor};
pub use layer::{ConvGeometry, LayerDict, LayerInfo};
pub use network::Network;
pub use selection::{LayerOutput, LayerSelection};
pub use shape::{Dim, DynamicShape};

#[cfg(test)]
mod tests;
