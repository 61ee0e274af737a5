//! UseCase: 識別情報の設定（`configure-identity`）
//!
//! 表示名・ユーザー ID・プラットフォームのうち指定されたものを更新します。
//! 設定イベントは切断と競合しうるため、未登録の接続に対しては何もしません。

use std::sync::Arc;

use crate::domain::{Connection, ConnectionId, ConnectionRepository, IdentityUpdate};

/// 識別情報設定のユースケース
pub struct ConfigureIdentityUseCase {
    /// User Registry
    connections: Arc<dyn ConnectionRepository>,
}

impl ConfigureIdentityUseCase {
    pub fn new(connections: Arc<dyn ConnectionRepository>) -> Self {
        Self { connections }
    }

    /// 識別情報を更新する
    ///
    /// # Returns
    ///
    /// * `Some(Connection)` - 更新後の接続
    /// * `None` - 接続が登録されていない（既に切断済み）
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        update: IdentityUpdate,
    ) -> Option<Connection> {
        let connection = self
            .connections
            .configure_connection(connection_id, update)
            .await;
        if connection.is_none() {
            tracing::warn!(
                "Connection '{}' configured after disconnect, ignoring",
                connection_id
            );
        }
        connection
    }
}
