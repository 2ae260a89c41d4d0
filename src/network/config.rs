use serde::{Deserialize, Serialize};

use crate::errors::NetworkError;
use crate::format::DataFormat;

/// 创建网络时的配置
///
/// `data_format`是调用方对网络数据格式的预期。框架绑定的原生格式始终是唯一依据：
/// 未给出时直接采用绑定的格式，给出且与绑定不一致时创建网络会失败。
///
/// ```
/// use only_adapter::{DataFormat, NetworkConfig};
///
/// let config = NetworkConfig::from_json(r#"{"data_format": "channels_first"}"#).unwrap();
/// assert_eq!(config.data_format, Some(DataFormat::ChannelsFirst));
/// assert_eq!(NetworkConfig::from_json("{}").unwrap(), NetworkConfig::default());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_format: Option<DataFormat>,
}

impl NetworkConfig {
    pub fn new(data_format: DataFormat) -> Self {
        Self {
            data_format: Some(data_format),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, NetworkError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, NetworkError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
