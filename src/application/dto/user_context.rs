//! # User Context DTO
//!
//! 呼び出し元ユーザーのコンテキスト（注入される識別情報）

/// ユーザーコンテキスト
///
/// HTTP呼び出しに付与するユーザーID。モジュール定数ではなく、起動時に構成から注入する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    user_id: String,
}

impl UserContext {
    /// 新しいコンテキストを作成します。
    ///
    /// # 例
    ///
    /// ```
    /// use symptoscan::application::dto::user_context::UserContext;
    ///
    /// let context = UserContext::new("test123");
    /// assert_eq!(context.user_id(), "test123");
    /// ```
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}
