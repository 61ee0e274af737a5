//! UseCase: 外部ユーザー ID を指定した通知（`POST /notification`）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - NotifyUsersUseCase::execute() メソッド
//! - userId から接続への解決と、解決された接続への送信
//!
//! ### なぜこのテストが必要か
//! - 1 件も解決できない場合に、黙って成功とせず失敗を返すことを保証するため
//!
//! ### どのような状況を想定しているか
//! - 正常系：一部の userId が解決できる
//! - 異常系：どの userId も解決できない

use std::sync::Arc;

use crate::domain::{ConnectionRepository, MessagePusher, Platform, ResolvedRecipients, UserId};

use super::error::NotifyUsersError;

/// 対象ユーザーへの通知のユースケース
pub struct NotifyUsersUseCase {
    /// User Registry
    connections: Arc<dyn ConnectionRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl NotifyUsersUseCase {
    pub fn new(
        connections: Arc<dyn ConnectionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            connections,
            message_pusher,
        }
    }

    /// 解決できた接続へメッセージを送信
    ///
    /// # Returns
    ///
    /// 解決された送信先
    pub async fn execute(
        &self,
        user_ids: &[UserId],
        platform: &Platform,
        message: &str,
    ) -> Result<ResolvedRecipients, NotifyUsersError> {
        let recipients = self.connections.resolve_user_ids(user_ids, platform).await;
        if recipients.is_empty() {
            tracing::info!(
                "No active connections for {} user id(s) on platform '{}'",
                user_ids.len(),
                platform
            );
            return Err(NotifyUsersError::NoActiveConnections);
        }

        if let Err(e) = self
            .message_pusher
            .broadcast(recipients.connection_ids.clone(), message)
            .await
        {
            tracing::warn!("Failed to deliver notification: {}", e);
        }
        Ok(recipients)
    }
}
