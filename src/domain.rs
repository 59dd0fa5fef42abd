pub mod core;

use serde::{de::DeserializeOwned, Serialize};
use std::{
    fmt::{Debug, Display},
    hash::Hash,
    ops::Deref,
};

/// 外部システムから渡される識別子
///
/// バックエンドは数値と文字列の両方で ID を返すため、内部では文字列として保持する。
pub trait Id:
    Clone
    + Eq
    + Hash
    + Deref<Target = String>
    + From<String>
    + Display
    + Debug
    + Serialize
    + DeserializeOwned
{
    fn new(value: impl ToString) -> Self {
        Self::from(value.to_string().trim().to_owned())
    }

    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}
