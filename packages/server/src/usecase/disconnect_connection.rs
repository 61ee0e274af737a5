//! UseCase: 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectConnectionUseCase::execute() メソッド
//! - User Registry・チャンネル・全ルームからの削除
//!
//! ### なぜこのテストが必要か
//! - 切断した接続が編集者だった場合、残りのメンバーに権限が引き継がれる必要がある
//! - 空になったルームは即座に破棄される必要がある
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数ルームに参加していた接続の切断
//! - 異常系：登録されていない接続の切断

use std::sync::Arc;

use crate::domain::{
    Connection, ConnectionId, ConnectionRepository, MessagePusher, RoomId, RoomRepository,
    RoomSweep,
};

use super::error::DisconnectError;

/// 切断処理の結果
#[derive(Debug, Clone, PartialEq)]
pub struct DisconnectOutcome {
    /// 削除された接続（プラットフォームをブロードキャストに使う）
    pub connection: Connection,
    /// 購読していたチャンネル
    pub left_channels: Vec<RoomId>,
    /// 変更・破棄されたルーム
    pub sweep: RoomSweep,
}

/// 切断処理のユースケース
pub struct DisconnectConnectionUseCase {
    /// User Registry
    connections: Arc<dyn ConnectionRepository>,
    /// Room Registry
    rooms: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectConnectionUseCase {
    pub fn new(
        connections: Arc<dyn ConnectionRepository>,
        rooms: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            connections,
            rooms,
            message_pusher,
        }
    }

    /// 切断処理を実行
    ///
    /// 送信キューの登録解除は接続の有無にかかわらず行う。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<DisconnectOutcome, DisconnectError> {
        self.message_pusher.unregister_client(connection_id).await;
        let left_channels = self.message_pusher.leave_all_channels(connection_id).await;

        let connection = self
            .connections
            .remove_connection(connection_id)
            .await
            .map_err(|_| DisconnectError::ConnectionNotFound(connection_id.to_string()))?;

        let sweep = self
            .rooms
            .remove_connection_from_all_rooms(connection_id)
            .await;

        Ok(DisconnectOutcome {
            connection,
            left_channels,
            sweep,
        })
    }
}
