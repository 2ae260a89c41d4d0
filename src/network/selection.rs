use crate::tensor::Tensor;

/// 查询激活值时选中的层：单个层id，或一组层id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSelection {
    Single(String),
    Many(Vec<String>),
}

impl LayerSelection {
    /// 展开为层id列表，并返回是否以列表形式请求
    pub(crate) fn into_ids(self) -> (Vec<String>, bool) {
        match self {
            Self::Single(id) => (vec![id], false),
            Self::Many(ids) => (ids, true),
        }
    }
}

impl From<&str> for LayerSelection {
    fn from(id: &str) -> Self {
        Self::Single(id.to_string())
    }
}

impl From<String> for LayerSelection {
    fn from(id: String) -> Self {
        Self::Single(id)
    }
}

impl From<Vec<String>> for LayerSelection {
    fn from(ids: Vec<String>) -> Self {
        Self::Many(ids)
    }
}

impl From<Vec<&str>> for LayerSelection {
    fn from(ids: Vec<&str>) -> Self {
        Self::Many(ids.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for LayerSelection {
    fn from(ids: &[&str]) -> Self {
        Self::Many(ids.iter().map(|id| id.to_string()).collect())
    }
}

/// 激活值/净输入的查询结果。以单个层id请求时为`Single`，以列表请求时（即使只有一个元素）为`Many`
#[derive(Debug, Clone, PartialEq)]
pub enum LayerOutput {
    Single(Tensor),
    Many(Vec<Tensor>),
}

impl LayerOutput {
    pub(crate) fn collapse(mut outputs: Vec<Tensor>, is_list: bool) -> Self {
        if !is_list && outputs.len() == 1 {
            if let Some(output) = outputs.pop() {
                return Self::Single(output);
            }
        }
        Self::Many(outputs)
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Many(outputs) => outputs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 以单个层id请求时取出结果
    pub fn into_single(self) -> Option<Tensor> {
        match self {
            Self::Single(output) => Some(output),
            Self::Many(_) => None,
        }
    }

    pub fn into_vec(self) -> Vec<Tensor> {
        match self {
            Self::Single(output) => vec![output],
            Self::Many(outputs) => outputs,
        }
    }
}
