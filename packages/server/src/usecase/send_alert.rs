//! UseCase: プラットフォーム単位のアラート送信（`POST /alert`）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendAlertUseCase::execute() メソッド
//! - プラットフォームの全接続へのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - ルームへの参加状況に関係なく、プラットフォームの全接続へ届くことを保証するため
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数プラットフォームが混在する状態でのアラート送信
//! - 準正常系：対象の接続が 0 件

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRepository, MessagePushError, MessagePusher, Platform};

/// アラート送信のユースケース
pub struct SendAlertUseCase {
    /// User Registry
    connections: Arc<dyn ConnectionRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl SendAlertUseCase {
    pub fn new(
        connections: Arc<dyn ConnectionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            connections,
            message_pusher,
        }
    }

    /// プラットフォームの全接続へメッセージを送信
    ///
    /// # Returns
    ///
    /// 送信対象の接続 ID
    pub async fn execute(
        &self,
        platform: &Platform,
        message: &str,
    ) -> Result<Vec<ConnectionId>, MessagePushError> {
        let targets: Vec<ConnectionId> = self
            .connections
            .list_by_platform(platform)
            .await
            .into_iter()
            .map(|connection| connection.id)
            .collect();

        tracing::info!(
            "Sending alert to {} connection(s) on platform '{}'",
            targets.len(),
            platform
        );
        self.message_pusher
            .broadcast(targets.clone(), message)
            .await?;
        Ok(targets)
    }
}
