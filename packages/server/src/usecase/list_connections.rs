//! UseCase: 接続一覧の取得（`GET /users`, `GET /users/{platform}`）

use std::sync::Arc;

use crate::domain::{Connection, ConnectionRepository, Platform};

pub struct ListConnectionsUseCase {
    connections: Arc<dyn ConnectionRepository>,
}

impl ListConnectionsUseCase {
    pub fn new(connections: Arc<dyn ConnectionRepository>) -> Self {
        Self { connections }
    }

    /// 接続順の全接続
    pub async fn all(&self) -> Vec<Connection> {
        self.connections.list_all().await
    }

    pub async fn by_platform(&self, platform: &Platform) -> Vec<Connection> {
        self.connections.list_by_platform(platform).await
    }
}
