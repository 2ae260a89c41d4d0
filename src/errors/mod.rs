use thiserror::Error;
mod ops;
pub use self::ops::*;

/// 错误的大类：调用方传入了不合法的参数，或框架绑定尚未实现对应功能
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotImplemented,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
    // 数字比较用
    #[error("{value_name}须{operator}{threshold}")]
    ValueMustSatisfyComparison {
        value_name: String,
        operator: ComparisonOperator,
        threshold: usize,
    },
    #[error("数据长度{data_len}与形状{shape:?}不符")]
    DataShapeMismatch { data_len: usize, shape: Vec<usize> },
    #[error("张量形状不兼容")]
    IncompatibleShape,
    #[error("交换张量时，输入的维度数至少需要2个")]
    PermuteNeedAtLeast2Dims,
    #[error("需要交换的维度必须是唯一且在[0, <张量维数>)范围内")]
    PermuteNeedUniqueAndInRange,
    #[error("维度{dim}超出范围，张量阶数为{rank}")]
    DimOutOfRange { dim: isize, rank: usize },
    #[error("图像通道数只可能是1、3或4，实际为{0}")]
    UnsupportedImageChannels(usize),
}

/// 网络适配层的错误类型
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NetworkError {
    #[error("输入维度不匹配：输入形状为{input_shape:?}，网络期望的输入形状为{expected}")]
    NonMatchingInputDims {
        input_shape: Vec<usize>,
        expected: String,
    },
    #[error("输入维度过多：最多应为4个，实际为{0}个")]
    TooManyInputDims(usize),
    #[error("不是卷积层：{0}")]
    NotConvolutional(String),
    #[error("网络中不存在层：{0}")]
    LayerNotFound(String),
    #[error("层索引{index}越界，网络共有{len}层")]
    LayerIndexOutOfRange { index: usize, len: usize },
    #[error("网络不含任何层")]
    EmptyNetwork,
    #[error("层id重复：{0}")]
    DuplicateLayer(String),
    #[error("层{layer}的形状{shape}含有未知维度，无法计算单元数")]
    UnknownDimension { layer: String, shape: String },
    #[error("无效参数：{0}")]
    InvalidArgument(String),
    #[error("未实现：{0}")]
    NotImplemented(String),
    #[error("配置解析失败：{0}")]
    Config(String),
    #[error(transparent)]
    Tensor(#[from] TensorError),
}

impl NetworkError {
    /// 该错误属于哪一大类
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
